//! Backend REST API client.
//!
//! The backend owns moderator and product documents and answers role
//! lookups. Every call goes through [`BackendClient::send`], which maps
//! transport failures, unparseable bodies, and `{ "error": ... }` replies to
//! distinct [`BackendError`] variants.

mod client;
mod error;
mod moderators;
mod products;

pub use client::{BackendClient, WriteAck};
pub use error::BackendError;
