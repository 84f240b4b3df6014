//! Per-browser client state for admin.
//!
//! - [`session`] - cookie session keys and the durable role store
//! - [`workspace`] - the auth instance and resource views owned by one
//!   browser, kept in an in-process registry

pub mod session;
pub mod workspace;

pub use session::{MemoryMirror, MirrorError, RoleMirror, RoleStore, keys as session_keys};
pub use workspace::{Workspace, Workspaces};
