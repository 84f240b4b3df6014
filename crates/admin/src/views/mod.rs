//! Resource views and the operations behind the admin pages.
//!
//! Each view owns the last collection it fetched. Mutations only touch
//! local state after the backend acknowledged them, and every failure is
//! converted into a [`ViewError`] at the operation boundary.

pub mod error;
pub mod login;
pub mod moderators;
pub mod notify;
pub mod products;
pub mod profile;
pub mod resource;

pub use error::ViewError;
pub use notify::{Notice, NoticeLevel};
pub use resource::{Confirmation, DeleteOutcome, LoadState, Record, ResourceView};
