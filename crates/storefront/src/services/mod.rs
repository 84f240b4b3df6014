//! External services used by storefront pages.
//!
//! - [`emailjs`] - Contact form delivery through the EmailJS REST API

pub mod emailjs;

pub use emailjs::{ContactError, ContactMessage, EmailJsClient};
