//! Checking a batch of query files

use sqlvet_core::{
    QueryEngine, Severity, TemplateVars, ValidationError, ValidationResult, ValidatorRegistry,
};

/// How a `check` run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Every file was validated and none reported an error
    Passed,
    /// At least one error-severity result was reported
    Failed,
    /// Validation did not run for at least one file
    NotRun,
}

impl CheckStatus {
    pub fn exit_code(self) -> u8 {
        match self {
            CheckStatus::Passed => 0,
            CheckStatus::Failed => 1,
            CheckStatus::NotRun => 2,
        }
    }
}

/// Outcome for one query file
#[derive(Debug)]
pub struct FileReport {
    pub file_name: String,
    pub source: String,
    pub outcome: Result<Vec<ValidationResult>, ValidationError>,
}

impl FileReport {
    /// Results for a validated file; nothing for one that did not run
    pub fn results(&self) -> &[ValidationResult] {
        match &self.outcome {
            Ok(results) => results,
            Err(_) => &[],
        }
    }

    pub fn error(&self) -> Option<&ValidationError> {
        self.outcome.as_ref().err()
    }
}

/// Outcomes for every file of a run, in input order
#[derive(Debug, Default)]
pub struct CheckReport {
    pub files: Vec<FileReport>,
}

impl CheckReport {
    pub fn count(&self, severity: Severity) -> usize {
        self.files
            .iter()
            .flat_map(|file| file.results())
            .filter(|result| result.severity == severity)
            .count()
    }

    pub fn not_run(&self) -> usize {
        self.files.iter().filter(|file| file.error().is_some()).count()
    }

    pub fn status(&self) -> CheckStatus {
        if self.not_run() > 0 {
            CheckStatus::NotRun
        } else if self
            .files
            .iter()
            .flat_map(|file| file.results())
            .any(ValidationResult::is_error)
        {
            CheckStatus::Failed
        } else {
            CheckStatus::Passed
        }
    }
}

/// Validate each `(file name, source)` pair against `engine`
pub fn check_sources(
    registry: &ValidatorRegistry,
    engine: &QueryEngine,
    sources: Vec<(String, String)>,
    uid: i64,
    vars: &TemplateVars,
) -> CheckReport {
    let files = sources
        .into_iter()
        .map(|(file_name, source)| {
            let outcome = registry.check_query(engine, &source, uid, vars);
            match &outcome {
                Ok(results) => tracing::debug!(file = %file_name, results = results.len(), "file checked"),
                Err(err) => tracing::warn!(file = %file_name, error = %err, "validation did not run"),
            }
            FileReport {
                file_name,
                source,
                outcome,
            }
        })
        .collect();
    CheckReport { files }
}
