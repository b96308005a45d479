//! Home Care Core - Shared types library.
//!
//! This crate provides common types used across all Home Care components:
//! - `web` - The Snap and Track web application (snap, tasks, admin pages)
//! - `cli` - Command-line tools for seeding and inspecting a local profile
//!
//! # Architecture
//!
//! The core crate contains only types and small pure helpers - no I/O, no
//! storage access, no HTTP. This keeps it lightweight and allows it to be
//! used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Typed IDs, emails, statuses, catalogs, costs and the
//!   persisted records (tasks, users, sessions, analysis results)

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
