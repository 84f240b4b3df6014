//! Identity provider (Firebase Identity Toolkit REST API).
//!
//! - [`IdentityClient`] talks to the provider: sign-in, account creation on
//!   an isolated session, profile/email/password updates, account deletion,
//!   and password-reset mail.
//! - [`AuthInstance`] is one browser's signed-in state. It publishes every
//!   sign-in and sign-out to its [`SessionSubscription`]s.

mod client;
mod error;
mod instance;
mod types;

pub use client::IdentityClient;
pub use error::IdentityError;
pub use instance::{AuthInstance, SessionSubscription};
pub use types::IdentitySession;
