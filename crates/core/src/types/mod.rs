//! Core types for Home Care.
//!
//! This module provides type-safe wrappers for common domain concepts and
//! the records mirrored into a profile's local store.

pub mod analysis;
pub mod catalog;
pub mod cost;
pub mod email;
pub mod id;
pub mod session;
pub mod status;
pub mod task;
pub mod user;

pub use analysis::{AnalysisResult, SuggestedTask};
pub use catalog::{Area, Category, Frequency};
pub use cost::{Cost, CostError};
pub use email::{Email, EmailError};
pub use id::*;
pub use session::{ADMIN_EMAIL, Session, SessionUser, display_name_from_email};
pub use status::*;
pub use task::Task;
pub use user::UserRecord;
