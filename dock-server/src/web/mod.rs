//! Web layer for the nearest-dock finder.
//!
//! Serves the single HTML page plus a health check and static assets.

mod routes;
mod state;
pub mod templates;


pub use routes::{AppError, client_address, create_router};
pub use state::AppState;
pub use templates::*;
