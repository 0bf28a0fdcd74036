use crate::cli::globals::GlobalArgs;
use crate::session::{error::LOGIN_FAILED, FileTokenStore, TokenStore, UserRecord};
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug)]
pub struct LoginArgs {
    pub globals: GlobalArgs,
    pub email: String,
    pub password: SecretString,
    pub admin: bool,
}

#[derive(Debug)]
pub struct RegisterArgs {
    pub globals: GlobalArgs,
    pub email: String,
    pub password: SecretString,
    pub name: String,
}

fn describe(user: &UserRecord) -> String {
    let role = if user.is_admin { " [admin]" } else { "" };
    format!(
        "{} <{}>{role}, {} island(s) visited",
        user.display_name(),
        user.email,
        user.visited_islands.len()
    )
}

/// # Errors
/// Returns the session's message if the login is refused.
#[instrument(skip_all, fields(admin = args.admin))]
pub async fn login(args: LoginArgs) -> Result<()> {
    let session = args.globals.session()?;

    let ok = if args.admin {
        session.admin_login(&args.email, &args.password).await
    } else {
        session.login(&args.email, &args.password).await
    };

    if !ok {
        return Err(anyhow!(session
            .error()
            .unwrap_or_else(|| LOGIN_FAILED.to_string())));
    }

    if let Some(user) = session.current_user() {
        println!("Logged in as {}", describe(&user));
    }
    Ok(())
}

/// # Errors
/// Returns the session's message if registration or the follow-up login fails.
#[instrument(skip_all)]
pub async fn register(args: RegisterArgs) -> Result<()> {
    let session = args.globals.session()?;

    if !session
        .register(&args.email, &args.password, &args.name)
        .await
    {
        return Err(anyhow!(session
            .error()
            .unwrap_or_else(|| LOGIN_FAILED.to_string())));
    }

    if let Some(user) = session.current_user() {
        println!("Welcome, {}", describe(&user));
    }
    Ok(())
}

/// Remove the stored token. Needs no backend.
///
/// # Errors
/// Returns an error if the token file cannot be cleared.
pub fn logout(token_file: &Path) -> Result<()> {
    FileTokenStore::new(token_file)
        .clear()
        .with_context(|| format!("failed to clear session file {}", token_file.display()))?;
    info!("logged out");
    println!("Logged out");
    Ok(())
}

/// # Errors
/// Returns an error if a stored session could not be verified.
#[instrument(skip_all)]
pub async fn whoami(globals: &GlobalArgs) -> Result<()> {
    let session = globals.session()?;
    session.hydrate().await;

    match (session.current_user(), session.error()) {
        (Some(user), _) => println!("{}", describe(&user)),
        (None, Some(message)) => return Err(anyhow!(message)),
        (None, None) => println!("Not logged in"),
    }
    Ok(())
}
