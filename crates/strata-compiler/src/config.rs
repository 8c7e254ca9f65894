//! Compilation options.

use crate::slots::SlotStyle;

/// How definitions are packaged into output artifacts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CompileMode {
    /// One artifact per assembly, everything defined inline.
    #[default]
    Monolithic,
    /// One artifact per assembly, every definition behind a lazily-run builder.
    OnDemand,
    /// Definitions partitioned across trace bundles selected by manifests.
    Traced,
}

impl CompileMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Monolithic => "monolithic",
            Self::OnDemand => "on-demand",
            Self::Traced => "traced",
        }
    }
}

/// Options for one compilation session.
#[derive(Clone, Debug)]
pub struct CompileOptions {
    pub(crate) mode: CompileMode,
    /// Friendly slot names, member name tables, no top-level error handler.
    pub(crate) debug: bool,
    pub(crate) inline_threshold: u32,
    pub(crate) inlining: bool,
    /// Name of the catch-all trace; anonymous when `None`.
    pub(crate) remainder_name: Option<String>,
    pub(crate) max_friendly_len: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            mode: CompileMode::default(),
            debug: false,
            inline_threshold: 24,
            inlining: true,
            remainder_name: None,
            max_friendly_len: 15,
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(mut self, mode: CompileMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn debug(mut self, value: bool) -> Self {
        self.debug = value;
        self
    }

    pub fn inline_threshold(mut self, value: u32) -> Self {
        self.inline_threshold = value;
        self
    }

    pub fn inlining(mut self, value: bool) -> Self {
        self.inlining = value;
        self
    }

    pub fn remainder_name(mut self, name: Option<String>) -> Self {
        self.remainder_name = name;
        self
    }

    pub fn max_friendly_len(mut self, value: usize) -> Self {
        self.max_friendly_len = value;
        self
    }

    pub fn get_mode(&self) -> CompileMode {
        self.mode
    }

    pub fn is_debug(&self) -> bool {
        self.debug
    }

    /// Slot style for assembly and type scopes.
    ///
    /// Traced builds name per-type artifacts after slots, so slots must
    /// survive case-insensitive file systems there.
    pub fn scope_style(&self) -> SlotStyle {
        match self.mode {
            CompileMode::Traced => SlotStyle::Lowercase,
            _ => SlotStyle::CaseSensitive,
        }
    }

    /// Friendly-name length cap, or `None` when friendly names are off.
    pub fn friendly_len(&self) -> Option<usize> {
        self.debug.then_some(self.max_friendly_len)
    }

    /// Stable digest of everything that changes generated output.
    pub fn digest(&self) -> u32 {
        let text = format!(
            "{}|{}|{}|{}|{}|{}",
            self.mode.name(),
            self.debug,
            self.inline_threshold,
            self.inlining,
            self.remainder_name.as_deref().unwrap_or(""),
            self.max_friendly_len,
        );
        crc32fast::hash(text.as_bytes())
    }
}
