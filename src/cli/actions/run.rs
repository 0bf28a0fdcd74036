use crate::cli::actions::{auth, navigate, Action};
use anyhow::Result;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    match action {
        Action::Login(args) => auth::login(args).await,
        Action::Register(args) => auth::register(args).await,
        Action::Logout(token_file) => auth::logout(&token_file),
        Action::Whoami(globals) => auth::whoami(&globals).await,
        Action::Visit(args) => navigate::visit(args).await,
        Action::Routes => {
            navigate::routes();
            Ok(())
        }
    }
}
