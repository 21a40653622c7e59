//! Domain models and types for the relay.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Entities** ([`Entity`]) - one record of an inbound batch
//! - **Call outcomes** ([`TransformResult`]) and the [`EndpointMode`] they are judged by
//! - **Error types** ([`RelayError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, RelayError>`]:
//!
//! ```rust
//! use transform_relay::domain::{RelayError, Result};
//!
//! fn example() -> Result<()> {
//!     let _value: serde_json::Value = serde_json::from_str("[]")?;
//!     Ok(())
//! }
//! ```

pub mod entity;
pub mod errors;
pub mod result;

// Re-export commonly used types for convenience
pub use entity::{entity_id, is_ok_status, EndpointMode, Entity, TransformResult};
pub use errors::{failure_body, RelayError};
pub use result::Result;
