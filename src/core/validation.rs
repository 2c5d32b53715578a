/// Represents an issue found during workflow validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// A hard error: the workflow cannot succeed as declared.
    Error(String),
    /// A warning: the workflow may run, but something looks off.
    Warning(String),
}

/// The result of a workflow data-flow validation pass.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, msg: impl Into<String>) {
        self.issues.push(ValidationIssue::Error(msg.into()));
    }

    pub fn add_warning(&mut self, msg: impl Into<String>) {
        self.issues.push(ValidationIssue::Warning(msg.into()));
    }

    pub fn is_safe(&self) -> bool {
        !self.issues.iter().any(|i| matches!(i, ValidationIssue::Error(_)))
    }

    pub fn has_warnings(&self) -> bool {
        self.issues
            .iter()
            .any(|i| matches!(i, ValidationIssue::Warning(_)))
    }

    pub fn errors(&self) -> impl Iterator<Item = &str> {
        self.issues.iter().filter_map(|i| match i {
            ValidationIssue::Error(msg) => Some(msg.as_str()),
            ValidationIssue::Warning(_) => None,
        })
    }

    /// Emits every issue through the `log` facade.
    pub fn log_summary(&self) {
        if self.is_safe() && !self.has_warnings() {
            log::info!("Workflow validation passed: all data-flow contracts are satisfied.");
            return;
        }

        for issue in &self.issues {
            match issue {
                ValidationIssue::Error(msg) => log::error!("Workflow validation error: {}", msg),
                ValidationIssue::Warning(msg) => log::warn!("Workflow validation warning: {}", msg),
            }
        }
    }
}
