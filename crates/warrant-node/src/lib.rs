//! Warrant Node
//!
//! HTTP service exposing the delegation engine, plus its configuration and
//! startup wiring.

pub mod api;
pub mod config;
pub mod error;
pub mod extractors;
pub mod state;

pub use api::{build_router, start_api_server};
pub use config::WarrantConfig;
pub use error::ApiError;
pub use state::AppState;
