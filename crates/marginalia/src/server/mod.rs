//! HTTP boundary of the reading assistant
//!
//! axum routes for health, version, API description and chat. Wire types
//! carry schemars annotations so `/api` can describe them.

pub mod handlers;
pub mod middleware;
pub mod routing;
pub mod startup;
pub mod state;
pub mod types;

pub use routing::create_router;
pub use startup::start_server;
pub use state::AppState;
