//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action to execute. Backend settings are
//! only required by subcommands that talk to the backend.

use crate::cli::actions::{
    auth::{LoginArgs, RegisterArgs},
    navigate::VisitArgs,
    Action,
};
use crate::cli::commands::{api, session::*};
use crate::cli::globals::GlobalArgs;
use anyhow::{anyhow, Result};
use clap::ArgMatches;
use secrecy::SecretString;

fn read_required(matches: &ArgMatches, id: &str) -> Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| anyhow!("missing required argument: --{id}"))
}

/// Map validated CLI matches to an action.
///
/// # Errors
/// Returns an error if required arguments are missing or invalid.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let globals = || -> Result<GlobalArgs> { Ok(api::Options::parse(matches)?.into()) };

    match matches.subcommand() {
        Some((CMD_LOGIN, sub)) => Ok(Action::Login(LoginArgs {
            globals: globals()?,
            email: read_required(sub, ARG_EMAIL)?,
            password: SecretString::from(read_required(sub, ARG_PASSWORD)?),
            admin: sub.get_flag(ARG_ADMIN),
        })),
        Some((CMD_REGISTER, sub)) => Ok(Action::Register(RegisterArgs {
            globals: globals()?,
            email: read_required(sub, ARG_EMAIL)?,
            password: SecretString::from(read_required(sub, ARG_PASSWORD)?),
            name: read_required(sub, ARG_NAME)?,
        })),
        Some((CMD_LOGOUT, _)) => Ok(Action::Logout(api::token_file(matches))),
        Some((CMD_WHOAMI, _)) => Ok(Action::Whoami(globals()?)),
        Some((CMD_VISIT, sub)) => Ok(Action::Visit(VisitArgs {
            globals: globals()?,
            path: read_required(sub, ARG_PATH)?,
        })),
        Some((CMD_ROUTES, _)) => Ok(Action::Routes),
        Some((other, _)) => Err(anyhow!("unknown command: {other}")),
        None => Err(anyhow!("missing command")),
    }
}
