//! Business logic on top of the profile store.
//!
//! Services borrow a [`LocalStore`](crate::store::LocalStore) for the current
//! profile and are created per request.

pub mod analyses;
pub mod auth;
pub mod classifier;
pub mod explorer;
pub mod registry;
pub mod reminders;
pub mod task_templates;
pub mod tasks;
