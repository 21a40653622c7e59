//! External system integrations for the relay.
//!
//! - [`session`] - outbound HTTP sessions with static or OAuth2 credentials
//! - [`template`] - URL template rendering (Jinja syntax, two conventions)
//!
//! # Design Pattern
//!
//! Adapters isolate third-party crates (reqwest, minijinja) from the pipeline
//! in [`crate::core`]. Session strategies sit behind the
//! [`session::SessionProvider`] trait and token acquisition behind
//! [`session::TokenFetcher`], so both can be replaced in tests.

pub mod session;
pub mod template;
