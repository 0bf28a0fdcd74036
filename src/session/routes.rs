//! IslandLogger navigation map.
//!
//! Patterns use `:name` for a required segment and a trailing `:name?` for an
//! optional one. Unknown paths under `/admin/` require admin.

use crate::session::types::RouteRequirement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub pattern: &'static str,
    pub requirement: RouteRequirement,
}

const fn route(pattern: &'static str, requirement: RouteRequirement) -> Route {
    Route {
        pattern,
        requirement,
    }
}

const PUBLIC: RouteRequirement = RouteRequirement::PUBLIC;
const AUTHENTICATED: RouteRequirement = RouteRequirement::AUTHENTICATED;
const ADMIN: RouteRequirement = RouteRequirement::ADMIN;

pub const ROUTES: &[Route] = &[
    route("/", PUBLIC),
    route("/map", PUBLIC),
    route("/islands", PUBLIC),
    route("/islands/:id", PUBLIC),
    route("/blog", PUBLIC),
    route("/blog/:slug", PUBLIC),
    route("/login", PUBLIC),
    route("/register", PUBLIC),
    route("/admin/login", PUBLIC),
    route("/dashboard", AUTHENTICATED),
    route("/log-visit/:islandId?", AUTHENTICATED),
    route("/challenges", AUTHENTICATED),
    route("/admin", ADMIN),
    route("/admin/dashboard", ADMIN),
    route("/admin/islands", ADMIN),
    route("/admin/islands/new", ADMIN),
    route("/admin/islands/edit/:id", ADMIN),
    route("/admin/users", ADMIN),
    route("/admin/users/new", ADMIN),
    route("/admin/users/edit/:id", ADMIN),
    route("/admin/blog", ADMIN),
    route("/admin/blog/new", ADMIN),
    route("/admin/challenges", ADMIN),
    route("/admin/challenges/new", ADMIN),
    route("/admin/challenges/edit/:id", ADMIN),
    route("/admin/ads", ADMIN),
    route("/admin/ads/new", ADMIN),
    route("/admin/visits", ADMIN),
];

/// A path matched against the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Matched pattern, `None` when the fallback rule applied.
    pub pattern: Option<&'static str>,
    pub requirement: RouteRequirement,
    pub params: Vec<(&'static str, String)>,
}

impl Resolved {
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[must_use]
pub fn resolve(path: &str) -> Resolved {
    let path = strip_query(path);

    for route in ROUTES {
        if let Some(params) = match_pattern(route.pattern, path) {
            return Resolved {
                pattern: Some(route.pattern),
                requirement: route.requirement,
                params,
            };
        }
    }

    let requirement = if segments(path).next() == Some("admin") {
        ADMIN
    } else {
        PUBLIC
    };

    Resolved {
        pattern: None,
        requirement,
        params: Vec::new(),
    }
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or_default()
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

fn match_pattern(pattern: &'static str, path: &str) -> Option<Vec<(&'static str, String)>> {
    let mut params = Vec::new();
    let mut actual = segments(path);

    for expected in segments(pattern) {
        let segment = actual.next();
        match (expected.strip_prefix(':'), segment) {
            (Some(name), _) if name.ends_with('?') => {
                if let Some(value) = segment {
                    params.push((name.trim_end_matches('?'), value.to_string()));
                }
            }
            (Some(name), Some(value)) => params.push((name, value.to_string())),
            (None, Some(value)) if value == expected => {}
            _ => return None,
        }
    }

    actual.next().is_none().then_some(params)
}
