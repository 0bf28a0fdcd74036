pub mod auth;
pub mod navigate;

// Internal "interpreter" for `Action`.
// We keep the match in a separate module so `mod.rs` stays small as more actions are added.
mod run;

use crate::cli::globals::GlobalArgs;
use std::path::PathBuf;

#[derive(Debug)]
pub enum Action {
    Login(auth::LoginArgs),
    Register(auth::RegisterArgs),
    Logout(PathBuf),
    Whoami(GlobalArgs),
    Visit(navigate::VisitArgs),
    Routes,
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
