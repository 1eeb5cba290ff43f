//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, route limits)
//!     → request.rs (request ID, forwarded headers)
//!     → generation route → generation::generate_recipe
//!     → everything else under the API prefix → passthrough.rs
//!     → Send to client
//! ```

pub mod passthrough;
pub mod request;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::{HttpServer, ServerError};
