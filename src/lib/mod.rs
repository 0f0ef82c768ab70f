//! Client toolkit for the school management backend.
//!
//! The REST backend owns every entity; this crate only keeps transient,
//! per-command copies and implements the view rules on top of them:
//! the attendance calendar, result entry with locking, leave approval,
//! the announcement feed and pending attendance reminders.
pub mod announcements;
pub mod api;
pub mod attendance;
pub mod batch;
pub mod leaves;
pub mod models;
pub mod reminder;
pub mod results;
pub mod session;
