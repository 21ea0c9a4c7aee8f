//! Craton API interaction module
//!
//! This module provides the connection side of the client: the per-invocation
//! [`session::Session`] carrying identity and project scope, and the
//! [`client::Client`] that bundles one resource manager per entity type.
//!
//! # Module Structure
//!
//! - [`session`] - Credentials, scope headers and the HTTP transport
//! - [`client`] - Aggregates resource managers for a service endpoint
//!
//! # Example
//!
//! ```ignore
//! use craton::craton::{client::Client, session::Session};
//!
//! async fn example() -> craton::CratonResult<()> {
//!     let session = Session::new(Some("demo".into()), Some("password".into()), 1)?;
//!     let client = Client::new(session, "http://craton.example.com:8080/v1")?;
//!     let region = client.regions.get(1).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod session;
