pub mod auth;
pub mod feedback;
pub mod middleware;
pub mod photos;
pub mod protocol;
pub mod rest;
pub mod schedules;
pub mod state;
pub mod users;

// Re-export what the binary needs to build the web server.
pub use rest::{build_router, ApiDoc};
pub use state::AppState;
