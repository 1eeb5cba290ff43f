//! Typed client for the recipe gateway.
//!
//! ```no_run
//! use recipe_sdk::{RecipeClient, Session};
//!
//! # async fn run() -> recipe_sdk::Result<()> {
//! let client = RecipeClient::new("http://localhost:8080");
//! let mut session = Session::anonymous();
//! client.login(&mut session, "asha", "hunter2").await?;
//! let recipe = client.generate_from_prompt(&session, "a quick vegan curry").await?;
//! println!("{}", recipe.title);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod session;
pub mod types;

pub use client::RecipeClient;
pub use error::{Result, SdkError};
pub use session::Session;
