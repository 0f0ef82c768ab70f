use log::{info, warn};
use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Api(#[from] ApiError),
    /// Carries the user-facing summary line.
    #[error("{0}")]
    Incomplete(String),
}

/// Result of a fan-out of independent backend calls.
///
/// Nothing is rolled back: whatever succeeded stays done.
#[derive(Debug)]
pub struct BatchOutcome<K, T> {
    pub succeeded: Vec<(K, T)>,
    pub failed: Vec<(K, ApiError)>,
}

impl<K: std::fmt::Debug, T> BatchOutcome<K, T> {
    pub fn collect<I>(results: I) -> Self
    where
        I: IntoIterator<Item = (K, Result<T, ApiError>)>,
    {
        let mut succeeded = Vec::new();
        let mut failed = Vec::new();
        for (key, result) in results {
            match result {
                Ok(value) => succeeded.push((key, value)),
                Err(err) => {
                    warn!("Operation for {:?} failed: {}", key, err);
                    failed.push((key, err));
                }
            }
        }
        info!(
            "Batch finished: {} succeeded, {} failed",
            succeeded.len(),
            failed.len()
        );
        Self { succeeded, failed }
    }

    pub fn len(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True only when every sub-call succeeded.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// One line for the user; failures are never itemised.
    pub fn summary(&self, what: &str) -> String {
        if self.is_complete() {
            format!("All {} {} succeeded", self.len(), what)
        } else {
            format!("Some {} failed, please reload to see the current state", what)
        }
    }

    /// Any failure that should end the session for the caller.
    pub fn unauthorized(&self) -> bool {
        self.failed.iter().any(|(_, err)| err.is_unauthorized())
    }

    /// The summary line, or an error when anything failed.
    pub fn into_summary(self, what: &str) -> Result<String, BatchError> {
        if self.unauthorized() {
            return Err(ApiError::Unauthorized.into());
        }
        if !self.is_complete() {
            return Err(BatchError::Incomplete(self.summary(what)));
        }
        Ok(self.summary(what))
    }
}
