//! Recipe generation proxy.
//!
//! Relays `POST` generation requests to the backend with an extended
//! wait-time bound and normalizes every failure into a JSON [`ProxyError`].

pub mod credential;
pub mod error;
pub mod handler;

pub use credential::Credential;
pub use error::ProxyError;
pub use handler::generate_recipe;
