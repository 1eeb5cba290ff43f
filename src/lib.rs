//! Recipe gateway library.
//!
//! Sits in front of the recipe backend: relays AI recipe generation with an
//! extended wait-time bound and rewrites the rest of the API prefix onto the
//! backend.

pub mod config;
pub mod generation;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod state;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
