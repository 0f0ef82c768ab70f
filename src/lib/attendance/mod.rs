//! Attendance calendar and daily marking.
pub mod calendar;
pub mod dates;
pub mod sheet;
pub mod source;

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
