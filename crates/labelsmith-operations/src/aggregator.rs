use std::collections::HashMap;

use labelsmith_core::{error::LabelsmithError, ApiError};

/// Errors collected for one repository. An empty list means success.
#[derive(Debug, Clone, PartialEq)]
pub struct RepoResult {
    pub repo: String,
    pub errors: Vec<ApiError>,
}

impl RepoResult {
    pub fn new(repo: impl Into<String>, errors: Vec<ApiError>) -> Self {
        Self {
            repo: repo.into(),
            errors,
        }
    }

    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Folds per-repository results into the verdict of a whole batch.
#[derive(Debug, Default)]
pub struct ExecutionResult {
    results: HashMap<String, Vec<ApiError>>,
}

impl ExecutionResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `result`, replacing any earlier result for the same repository.
    pub fn add(&mut self, result: RepoResult) {
        self.results.insert(result.repo, result.errors);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn failed(&self) -> usize {
        self.results.values().filter(|errors| !errors.is_empty()).count()
    }

    pub fn succeeded(&self) -> usize {
        self.len() - self.failed()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }

    pub fn summary(&self) -> String {
        let failed = self.failed();
        if failed == 0 {
            "Summary: all operations completed successfully".to_string()
        } else {
            format!(
                "Summary: {} repositories succeeded, {failed} failed",
                self.succeeded()
            )
        }
    }

    /// The batch's terminal error, if any repository failed.
    pub fn into_error(self) -> Option<LabelsmithError> {
        self.has_failures()
            .then_some(LabelsmithError::OperationsFailed)
    }
}
