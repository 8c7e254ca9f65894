use crate::Span;

/// Diagnostic kinds ordered by priority (highest priority first).
///
/// Every kind is non-fatal: fatal conditions are [`crate::Error`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DiagnosticKind {
    // Manifest consistency
    DuplicateClaim,
    EmptyManifest,

    // Metadata the back end cannot fully honor
    UnknownAttributeProperty,
    InvalidAttributeValue,
    UnresolvedCall,

    // Informational
    UnusedDefinition,
    InlinedDefinition,
}

impl DiagnosticKind {
    pub fn default_severity(&self) -> Severity {
        match self {
            Self::UnusedDefinition | Self::InlinedDefinition => Severity::Note,
            _ => Severity::Warning,
        }
    }

    /// Base message for this diagnostic kind, used when no custom message is provided.
    pub fn fallback_message(&self) -> &'static str {
        match self {
            Self::DuplicateClaim => "definition is already claimed by another trace",
            Self::EmptyManifest => "trace manifest claims nothing",
            Self::UnknownAttributeProperty => "unknown attribute property",
            Self::InvalidAttributeValue => "invalid attribute value",
            Self::UnresolvedCall => "call target does not exist",
            Self::UnusedDefinition => "definition is unused and will not be emitted",
            Self::InlinedDefinition => "method is inlined at every call site",
        }
    }

    /// Template for custom messages. Contains `{}` placeholder for caller-provided detail.
    pub fn custom_message(&self) -> String {
        match self {
            Self::DuplicateClaim => "{}".to_string(),
            Self::EmptyManifest => "trace `{}` claims nothing".to_string(),
            Self::UnresolvedCall => "call target `{}` does not exist".to_string(),
            Self::UnusedDefinition => "`{}` is unused and will not be emitted".to_string(),
            Self::InlinedDefinition => "`{}` is inlined at every call site".to_string(),
            _ => format!("{}: {{}}", self.fallback_message()),
        }
    }

    /// Render the final message.
    ///
    /// - `None` → returns `fallback_message()`
    /// - `Some(detail)` → returns `custom_message()` with `{}` replaced by detail
    pub fn message(&self, detail: Option<&str>) -> String {
        match detail {
            None => self.fallback_message().to_string(),
            Some(detail) => self.custom_message().replace("{}", detail),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Severity {
    #[default]
    Warning,
    Note,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub(crate) span: Span,
    pub(crate) message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticMessage {
    pub(crate) kind: DiagnosticKind,
    pub(crate) severity: Severity,
    /// Manifest range, when the diagnostic comes from a manifest.
    pub(crate) span: Option<Span>,
    pub(crate) message: String,
    pub(crate) related: Vec<RelatedInfo>,
}

impl DiagnosticMessage {
    pub(crate) fn with_default_message(kind: DiagnosticKind) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            span: None,
            message: kind.fallback_message().to_string(),
            related: Vec::new(),
        }
    }

    pub fn kind(&self) -> DiagnosticKind {
        self.kind
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn span(&self) -> Option<&Span> {
        self.span.as_ref()
    }

    pub(crate) fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl std::fmt::Display for DiagnosticMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)?;
        for related in &self.related {
            write!(f, " ({})", related.message)?;
        }
        Ok(())
    }
}
