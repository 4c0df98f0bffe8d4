//! Diagnostics collected while reading or writing element tables.
//!
//! Operations in this workspace are lenient in a few documented places (most
//! notably a per-unit conversion whose voltage-level join finds no target).
//! Instead of silently producing missing values, those places push an issue
//! into a [`Diagnostics`] collection that the caller can inspect afterwards.
//!
//! # Example
//!
//! ```
//! use gridframe_core::diagnostics::{DiagnosticIssue, Diagnostics, Severity};
//!
//! let mut diag = Diagnostics::new();
//! diag.add(
//!     DiagnosticIssue::new(Severity::Warning, "per-unit", "voltage level 'VL9' not found")
//!         .with_entity("line/L1"),
//! );
//!
//! assert_eq!(diag.warning_count(), 1);
//! assert_eq!(diag.summary(), "1 warning");
//! ```

use serde::Serialize;

/// Severity level for diagnostic issues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Unusual but the operation continued (e.g. a cell was set to NaN)
    Warning,
}

/// A single diagnostic issue
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticIssue {
    pub severity: Severity,
    /// Category for grouping (e.g. "per-unit", "dispatch")
    pub category: String,
    pub message: String,
    /// Optional element reference (e.g. "line/LINE_S2S3")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
    /// Optional column the issue refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
}

impl DiagnosticIssue {
    pub fn new(
        severity: Severity,
        category: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category: category.into(),
            message: message.into(),
            entity: None,
            column: None,
        }
    }

    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }
}

impl std::fmt::Display for DiagnosticIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Warning => "warning",
        };

        write!(f, "[{}:{}] {}", severity, self.category, self.message)?;

        if let Some(entity) = &self.entity {
            write!(f, " ({})", entity)?;
        }
        if let Some(column) = &self.column {
            write!(f, " in column '{}'", column)?;
        }

        Ok(())
    }
}

/// Collection of diagnostic issues for one operation
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<DiagnosticIssue>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, issue: DiagnosticIssue) {
        self.issues.push(issue);
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == Severity::Warning)
            .count()
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    pub fn clear(&mut self) {
        self.issues.clear();
    }

    pub fn summary(&self) -> String {
        match self.warning_count() {
            0 => "No issues".to_string(),
            1 => "1 warning".to_string(),
            w => format!("{} warnings", w),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warning(entity: &str) -> DiagnosticIssue {
        DiagnosticIssue::new(Severity::Warning, "per-unit", "missing base").with_entity(entity)
    }

    #[test]
    fn test_diagnostics_counts() {
        let mut diag = Diagnostics::new();
        assert!(!diag.has_issues());
        diag.add(warning("bus/B1"));
        diag.add(warning("bus/B2"));

        assert_eq!(diag.warning_count(), 2);
        assert!(diag.has_issues());
    }

    #[test]
    fn test_diagnostics_serialization() {
        let mut diag = Diagnostics::new();
        diag.add(
            DiagnosticIssue::new(Severity::Warning, "per-unit", "voltage level not found")
                .with_entity("load/LOAD")
                .with_column("i"),
        );

        let json = serde_json::to_string_pretty(&diag).unwrap();
        assert!(json.contains("\"warning\""));
        assert!(json.contains("\"entity\": \"load/LOAD\""));
        assert!(json.contains("\"column\": \"i\""));
    }

    #[test]
    fn test_diagnostic_issue_display() {
        let issue = DiagnosticIssue::new(Severity::Warning, "per-unit", "no nominal voltage")
            .with_entity("generator/GEN")
            .with_column("target_v");

        let display = format!("{}", issue);
        assert!(display.contains("warning"));
        assert!(display.contains("per-unit"));
        assert!(display.contains("generator/GEN"));
        assert!(display.contains("column 'target_v'"));
    }

    #[test]
    fn test_diagnostics_summary() {
        let mut diag = Diagnostics::new();
        assert_eq!(diag.summary(), "No issues");

        diag.add(warning("generator/G1"));
        assert_eq!(diag.summary(), "1 warning");

        diag.add(warning("generator/G2"));
        assert_eq!(diag.summary(), "2 warnings");
    }

    #[test]
    fn test_clear() {
        let mut diag = Diagnostics::new();
        diag.add(warning("load/LOAD"));
        diag.clear();
        assert!(!diag.has_issues());
        assert_eq!(diag.summary(), "No issues");
    }
}
