use std::fmt;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use crate::data::entry::{NAME_FIELD, URL_FIELD};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub entry_count: usize,
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }

    pub fn count(&self, severity: ValidationSeverity) -> usize {
        self.diagnostics
            .iter()
            .filter(|diag| diag.severity == severity)
            .count()
    }
}

/// Checks a registry file without going through the registry, so every
/// problem is reported instead of stopping at the first one.
pub fn validate_registry_file(path: &Path) -> Result<ValidationReport, String> {
    let raw = fs::read_to_string(path)
        .map_err(|err| format!("unable to read '{}': {err}", path.display()))?;
    let payload: Value = serde_json::from_str(&raw)
        .map_err(|err| format!("unable to parse json '{}': {err}", path.display()))?;
    Ok(validate_registry_value(&payload))
}

pub fn validate_registry_value(payload: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();

    let Some(entries) = payload.as_object() else {
        report.push(
            ValidationSeverity::Error,
            "$",
            "top level must be a JSON object mapping dataset names to entries",
        );
        return report;
    };

    report.entry_count = entries.len();
    for (key, entry) in entries {
        let context = format!("datasets.{key}");
        match entry.as_object() {
            Some(fields) => validate_entry(&mut report, &context, key, fields),
            None => report.push(
                ValidationSeverity::Error,
                context,
                "entry must be a JSON object",
            ),
        }
    }

    report
}

fn validate_entry(
    report: &mut ValidationReport,
    context: &str,
    key: &str,
    fields: &Map<String, Value>,
) {
    let name = required_string(report, context, fields, NAME_FIELD);
    let url = required_string(report, context, fields, URL_FIELD);

    if let Some(name) = name {
        if !name.trim().is_empty() && name != key {
            report.push(
                ValidationSeverity::Warning,
                format!("{context}.{NAME_FIELD}"),
                format!("'{name}' differs from the registry key '{key}'"),
            );
        }
    }

    if let Some(url) = url {
        if !url.trim().is_empty() && !(url.starts_with("http://") || url.starts_with("https://")) {
            report.push(
                ValidationSeverity::Warning,
                format!("{context}.{URL_FIELD}"),
                "should be an http:// or https:// URL",
            );
        }
    }
}

fn required_string<'a>(
    report: &mut ValidationReport,
    context: &str,
    fields: &'a Map<String, Value>,
    field: &str,
) -> Option<&'a str> {
    let context = format!("{context}.{field}");
    match fields.get(field) {
        None => {
            report.push(ValidationSeverity::Error, context, "missing required field");
            None
        }
        Some(Value::String(value)) => {
            if value.trim().is_empty() {
                report.push(ValidationSeverity::Warning, context, "must not be blank");
            }
            Some(value.as_str())
        }
        Some(_) => {
            report.push(ValidationSeverity::Error, context, "must be a string");
            None
        }
    }
}
