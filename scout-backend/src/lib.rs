//! # scout-backend
//!
//! Reads the `products` and `sessions` tables of a Supabase project over its
//! REST API.
//!
//! ```rust,no_run
//! # async fn f() -> Result<(), scout_backend::BackendError> {
//! use scout_backend::{BackendConfig, ProductSource, SupabaseClient};
//!
//! let client = SupabaseClient::sign_in(BackendConfig {
//!     url:      "https://example.supabase.co".into(),
//!     api_key:  "anon-key".to_string().into(),
//!     email:    "bot@example.com".into(),
//!     password: "secret".to_string().into(),
//! }).await?;
//! for product in client.products().await? {
//!     println!("{product}");
//! }
//! # Ok(()) }
//! ```

#![deny(unsafe_code)]

mod errors;
pub mod client;
pub mod model;
pub mod source;

pub use client::{BackendConfig, SupabaseClient};
pub use errors::{BackendError, Result};
pub use model::{Product, Session};
pub use source::ProductSource;
