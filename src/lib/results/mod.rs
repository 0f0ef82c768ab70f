//! Subject result entry with server-side locking.
pub mod entry;
pub mod models;

#[cfg(test)]
#[path = "tests/tests.rs"]
mod tests;
