use crate::cli::globals::GlobalArgs;
use crate::session::{
    routes::{self, ROUTES},
    RouteGuard, View,
};
use anyhow::{Context, Result};
use tracing::{debug, instrument};

#[derive(Debug)]
pub struct VisitArgs {
    pub globals: GlobalArgs,
    pub path: String,
}

fn render(path: &str, view: &View) -> String {
    match view {
        View::Loading => format!("{path}: loading"),
        View::Children => format!("{path}: granted"),
        View::Redirect(redirect) => match &redirect.notice {
            Some(notice) => format!("{path}: redirect to {} ({notice})", redirect.to),
            None => format!("{path}: redirect to {}", redirect.to),
        },
    }
}

/// Resolve `path`, mount a guard for it and describe where navigation ends
/// up. The guard's check is the only verification performed.
///
/// # Errors
/// Returns an error if the session cannot be built or the guard never settles.
#[instrument(skip_all, fields(path = %args.path))]
pub async fn outcome(args: &VisitArgs) -> Result<String> {
    let resolved = routes::resolve(&args.path);
    debug!(
        pattern = resolved.pattern.unwrap_or("<fallback>"),
        requirement = resolved.requirement.label(),
        "route resolved"
    );

    let session = args.globals.session()?;
    let guard = RouteGuard::mount(session, resolved.requirement);
    tokio::time::timeout(args.globals.timeout * 2, guard.settled())
        .await
        .context("route guard did not settle")?;

    Ok(render(&args.path, &guard.view()))
}

/// # Errors
/// Returns an error if the outcome cannot be determined.
pub async fn visit(args: VisitArgs) -> Result<()> {
    println!("{}", outcome(&args).await?);
    Ok(())
}

/// Print the navigation map.
pub fn routes() {
    let width = ROUTES
        .iter()
        .map(|route| route.pattern.len())
        .max()
        .unwrap_or_default();

    for route in ROUTES {
        println!(
            "{:width$}  {}",
            route.pattern,
            route.requirement.label(),
            width = width
        );
    }
    println!("{:width$}  admin", "/admin/*", width = width);
}
