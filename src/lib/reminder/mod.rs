//! Emails class teachers the days they still owe attendance for.
pub mod helpers;
pub mod letter_sender;
pub mod models;
pub mod pending_getter;
pub mod run_tool;
