//! Core types for MS Apparels.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod image;
pub mod moderator;
pub mod password;
pub mod price;
pub mod product;
pub mod role;

pub use email::{Email, EmailError};
pub use id::*;
pub use image::{ImageData, ImageError};
pub use moderator::{Moderator, ModeratorDraft};
pub use password::{Password, PasswordError};
pub use price::{Price, PriceError};
pub use product::{Product, ProductDraft};
pub use role::{Role, UnknownRole};
