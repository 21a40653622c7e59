//! The per-entity transform pipeline.
//!
//! # Modules
//!
//! - [`resolve`] - merge process defaults with an entity's override object
//! - [`execute`] - perform one outbound call and normalize its result
//! - [`outcome`] - accept, tolerate or abort, per endpoint mode
//! - [`stream`] - drive a whole batch and assemble the JSON array
//!
//! # Flow
//!
//! For each entity of a batch, in order:
//!
//! 1. **Resolve** the effective configuration
//! 2. **Render** the URL template against the entity
//! 3. **Execute** the call through the batch's session
//! 4. **Judge** the result; write it back, or abort the batch
//! 5. **Emit** the serialized entity
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use transform_relay::adapters::session::build_session_provider;
//! use transform_relay::config::load_config;
//! use transform_relay::core::stream::Pipeline;
//! use transform_relay::domain::EndpointMode;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config(None::<&str>)?;
//! let sessions = build_session_provider(&config)?;
//! let pipeline = Arc::new(Pipeline::new(&config, sessions)?);
//!
//! let batch = serde_json::from_str(r#"[{"_id": "1"}]"#)?;
//! let options = pipeline.options(EndpointMode::Transform, None, None);
//! let body = pipeline.collect(batch, options).await?;
//! println!("{body}");
//! # Ok(())
//! # }
//! ```

pub mod execute;
pub mod outcome;
pub mod resolve;
pub mod stream;
