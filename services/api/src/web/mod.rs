pub mod attendance;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod rest;
pub mod rooms;
pub mod state;
pub mod students;
pub mod users;

// Re-export what the binary needs to build the web server router.
pub use middleware::require_auth;
pub use rest::{api_router, ApiDoc};
pub use state::AppState;

#[cfg(test)]
pub(crate) mod test_helpers;
