//! MS Apparels Core - Shared types library.
//!
//! This crate provides common types used across all MS Apparels components:
//! - `storefront` - Public catalog and marketing site
//! - `admin` - Moderator and product back-office
//!
//! # Architecture
//!
//! The core crate contains only types and validation rules - no I/O, no HTTP
//! clients. Records mirror the JSON documents served by the backend API, and
//! drafts are the validated payloads the admin sends back.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for ids, prices, emails, roles, passwords,
//!   inline images, and the moderator/product records

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
