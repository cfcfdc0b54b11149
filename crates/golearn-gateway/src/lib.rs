//! golearn-gateway — HTTP API for lessons, quizzes, progress, and code runs
//!
//! Serves the JSON API under `/api` and the embedded single-page UI for
//! everything else.

pub mod assets;
pub mod error;
pub mod protocol;
pub mod routes;
pub mod server;
pub mod state;

pub use error::AppError;
pub use server::GatewayServer;
pub use state::AppState;
