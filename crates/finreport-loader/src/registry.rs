//! Registry of report definitions with a per-statement-type selection.

use crate::error::RegistryError;
use finreport_core::{ReportDefinition, StatementType};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// Registry of report definitions keyed by `reportId`.
///
/// Each statement type has a selected report. Without an explicit
/// selection the registered report with the smallest id is the default.
#[derive(Debug, Default)]
pub struct ReportRegistry {
    reports: BTreeMap<String, Arc<ReportDefinition>>,
    selection: BTreeMap<StatementType, String>,
}

impl ReportRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a report, returning the one it replaced.
    pub fn register(
        &mut self,
        report: impl Into<Arc<ReportDefinition>>,
    ) -> Option<Arc<ReportDefinition>> {
        let report = report.into();
        debug!(report_id = %report.report_id, "registered report");
        self.reports.insert(report.report_id.clone(), report)
    }

    /// Look up a report by id.
    #[must_use]
    pub fn get(&self, report_id: &str) -> Option<Arc<ReportDefinition>> {
        self.reports.get(report_id).cloned()
    }

    /// Remove a report and any selection pointing at it.
    pub fn remove(&mut self, report_id: &str) -> Option<Arc<ReportDefinition>> {
        self.selection.retain(|_, selected| *selected != report_id);
        self.reports.remove(report_id)
    }

    /// Registered ids in ascending order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.reports.keys().map(String::as_str).collect()
    }

    /// Number of registered reports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.reports.len()
    }

    /// Whether no report is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Reports rendering `statement_type`, ordered by id.
    #[must_use]
    pub fn for_statement_type(&self, statement_type: StatementType) -> Vec<Arc<ReportDefinition>> {
        self.reports
            .values()
            .filter(|r| r.statement_type == Some(statement_type))
            .cloned()
            .collect()
    }

    /// Select the report used for `statement_type`.
    ///
    /// # Errors
    ///
    /// Fails when the id is not registered or the report renders another
    /// statement type.
    pub fn select(
        &mut self,
        statement_type: StatementType,
        report_id: &str,
    ) -> Result<(), RegistryError> {
        let report = self
            .reports
            .get(report_id)
            .ok_or_else(|| RegistryError::UnknownReport(report_id.to_string()))?;
        if report.statement_type != Some(statement_type) {
            return Err(RegistryError::StatementTypeMismatch {
                report_id: report_id.to_string(),
                expected: statement_type,
                actual: report
                    .statement_type
                    .map_or_else(|| "untyped".to_string(), |t| t.to_string()),
            });
        }
        self.selection.insert(statement_type, report_id.to_string());
        Ok(())
    }

    /// The selected report for `statement_type`, falling back to the default.
    #[must_use]
    pub fn selected(&self, statement_type: StatementType) -> Option<Arc<ReportDefinition>> {
        self.selection
            .get(&statement_type)
            .and_then(|id| self.get(id))
            .or_else(|| self.for_statement_type(statement_type).into_iter().next())
    }

    /// Write the explicit selections to `path` as JSON.
    pub fn save_selection(&self, path: &Path) -> Result<(), RegistryError> {
        let json = serde_json::to_string_pretty(&self.selection).map_err(|error| {
            RegistryError::Json {
                path: path.to_path_buf(),
                error,
            }
        })?;
        fs::write(path, json).map_err(|error| RegistryError::Io {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Restore selections saved by [`save_selection`](Self::save_selection).
    ///
    /// A missing file restores nothing. Selections naming a report that is no
    /// longer registered, or that renders another statement type, are dropped.
    /// Returns the number of selections applied.
    pub fn load_selection(&mut self, path: &Path) -> Result<usize, RegistryError> {
        let json = match fs::read_to_string(path) {
            Ok(json) => json,
            Err(error) if error.kind() == IoErrorKind::NotFound => return Ok(0),
            Err(error) => {
                return Err(RegistryError::Io {
                    path: path.to_path_buf(),
                    error,
                });
            }
        };
        let saved: BTreeMap<StatementType, String> =
            serde_json::from_str(&json).map_err(|error| RegistryError::Json {
                path: path.to_path_buf(),
                error,
            })?;

        let mut applied = 0;
        for (statement_type, report_id) in saved {
            match self.select(statement_type, &report_id) {
                Ok(()) => applied += 1,
                Err(e) => warn!(%statement_type, %report_id, "dropping saved selection: {e}"),
            }
        }
        Ok(applied)
    }
}
