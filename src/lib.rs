//! Client-side session gate for IslandLogger.mv.
//!
//! The [`session`] module owns the persisted bearer token, verification
//! against the backend, the login/register/logout state machine and the route
//! guard. The [`cli`] module wraps it in the `islandlogger` command.

pub mod cli;
pub mod session;
