//! The diagnostic sink: a plain struct owned by the call frame rather than a hidden global,
//! generalizing the source's mutable-context-threaded error collector (see SPEC_FULL.md §4.10,
//! §9).

use std::collections::HashMap;

use crate::provenance::TileProvenance;

/// Every warning kind the core can emit. `tile-index-out-of-range` and `palette-index-out-of-range`
/// are only ever pushed by the decompiler in `gbatiles-io`, but the kind (and its configurable
/// mode) lives here so the whole taxonomy is in one place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WarningKind {
    ColorPrecisionLoss,
    KeyFrameNoMatchingTile,
    UsedTrueColorMode,
    AttributeFormatMismatch,
    MissingAttributesCsv,
    UnusedAttribute,
    TransparencyCollapse,
    AssignCacheOverride,
    InvalidAssignCache,
    MissingAssignCache,
    TileIndexOutOfRange,
    PaletteIndexOutOfRange,
}

impl WarningKind {
    pub const ALL: [WarningKind; 12] = [
        WarningKind::ColorPrecisionLoss,
        WarningKind::KeyFrameNoMatchingTile,
        WarningKind::UsedTrueColorMode,
        WarningKind::AttributeFormatMismatch,
        WarningKind::MissingAttributesCsv,
        WarningKind::UnusedAttribute,
        WarningKind::TransparencyCollapse,
        WarningKind::AssignCacheOverride,
        WarningKind::InvalidAssignCache,
        WarningKind::MissingAssignCache,
        WarningKind::TileIndexOutOfRange,
        WarningKind::PaletteIndexOutOfRange,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WarningKind::ColorPrecisionLoss => "color-precision-loss",
            WarningKind::KeyFrameNoMatchingTile => "key-frame-no-matching-tile",
            WarningKind::UsedTrueColorMode => "used-true-color-mode",
            WarningKind::AttributeFormatMismatch => "attribute-format-mismatch",
            WarningKind::MissingAttributesCsv => "missing-attributes-csv",
            WarningKind::UnusedAttribute => "unused-attribute",
            WarningKind::TransparencyCollapse => "transparency-collapse",
            WarningKind::AssignCacheOverride => "assign-cache-override",
            WarningKind::InvalidAssignCache => "invalid-assign-cache",
            WarningKind::MissingAssignCache => "missing-assign-cache",
            WarningKind::TileIndexOutOfRange => "tile-index-out-of-range",
            WarningKind::PaletteIndexOutOfRange => "palette-index-out-of-range",
        }
    }
}

/// Recoverable errors accumulate at normalization / attribute-parsing time; each kind also has a
/// stable name for the assignment-cache / CLI flag surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecoverableKind {
    TooManyUniqueColors,
    InvalidAlphaValue,
}

impl RecoverableKind {
    pub fn name(self) -> &'static str {
        match self {
            RecoverableKind::TooManyUniqueColors => "too-many-unique-colors",
            RecoverableKind::InvalidAlphaValue => "invalid-alpha-value",
        }
    }
}

/// `{off, warn, error}`, independently configurable per warning kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningMode {
    Off,
    Warn,
    Error,
}

impl Default for WarningMode {
    fn default() -> Self {
        WarningMode::Warn
    }
}

/// A structured diagnostic event. Rendering this to human text is `gbatiles-cli`'s job, not the
/// core's (see SPEC_FULL.md Non-goals).
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    pub location: Option<TileProvenance>,
    pub message: DiagnosticMessage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    RecoverableError,
}

#[derive(Debug, Clone)]
pub enum DiagnosticMessage {
    Warning(WarningKind, String),
    Recoverable(RecoverableKind, String),
}

/// Which compile phase a boundary check belongs to; carried only for error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Normalization,
    PaletteAssignment,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Normalization => write!(f, "normalization"),
            Phase::PaletteAssignment => write!(f, "palette assignment"),
        }
    }
}

#[derive(Debug, snafu::Snafu)]
pub enum CompileError {
    #[snafu(display("internal compiler error: {message}"))]
    Internal { message: String },

    #[snafu(display("{count} error(s) after {phase}"))]
    ErrorCount { phase: Phase, count: usize },

    #[snafu(display(
        "tile at {location} has more than 16 unique colors, cannot fit in one palette"
    ))]
    TooManyUniqueColorsInTile { location: TileProvenance },

    #[snafu(display(
        "too many unique colors across the whole tileset: found more than {budget} total"
    ))]
    TooManyUniqueColorsTotal { budget: usize },

    #[snafu(display("no palette assignment satisfies every tile's color set"))]
    NoPossiblePaletteAssignment,

    #[snafu(display("palette assignment search was cut off before finding a solution"))]
    ExploreCutoffReached,

    #[snafu(display(
        "tile bank would hold {actual} tiles, exceeding the configured budget of {budget}"
    ))]
    TileBudgetExceeded { actual: usize, budget: usize },

    #[snafu(display("key frame tile at {location} is identical to the fully transparent tile"))]
    KeyFrameIsTransparent { location: TileProvenance },

    #[snafu(display("key frame tile at {location} duplicates an earlier key frame in this tileset"))]
    DuplicateKeyFrame { location: TileProvenance },

    #[snafu(display(
        "key frame tile at {location} already exists in the paired primary tileset, and would be masked"
    ))]
    KeyFrameMasksPrimary { location: TileProvenance },
}

/// Owns every diagnostic emitted during one compile, plus the recoverable-error counter and the
/// per-kind warning mode table.
#[derive(Debug, Clone)]
pub struct ErrorsAndWarnings {
    diagnostics: Vec<Diagnostic>,
    recoverable_error_count: usize,
    warning_modes: HashMap<WarningKind, WarningMode>,
}

impl ErrorsAndWarnings {
    pub fn new(warning_modes: HashMap<WarningKind, WarningMode>) -> Self {
        ErrorsAndWarnings {
            diagnostics: Vec::new(),
            recoverable_error_count: 0,
            warning_modes,
        }
    }

    fn mode_for(&self, kind: WarningKind) -> WarningMode {
        self.warning_modes.get(&kind).copied().unwrap_or_default()
    }

    /// Always records a recoverable error, and counts it unless the caller has silenced its
    /// kind... recoverable user errors (`too-many-unique-colors`, `invalid-alpha-value`) have no
    /// `off` mode in the source; they always count. Kept distinct from `push_warning`, whose kind
    /// *can* be turned off.
    pub fn push_recoverable(
        &mut self,
        kind: RecoverableKind,
        location: Option<TileProvenance>,
        message: impl Into<String>,
    ) {
        self.recoverable_error_count += 1;
        self.diagnostics.push(Diagnostic {
            severity: Severity::RecoverableError,
            location,
            message: DiagnosticMessage::Recoverable(kind, message.into()),
        });
    }

    pub fn push_warning(
        &mut self,
        kind: WarningKind,
        location: Option<TileProvenance>,
        message: impl Into<String>,
    ) {
        let mode = self.mode_for(kind);
        if mode == WarningMode::Off {
            return;
        }

        if mode == WarningMode::Error {
            self.recoverable_error_count += 1;
        }

        self.diagnostics.push(Diagnostic {
            severity: Severity::Warning,
            location,
            message: DiagnosticMessage::Warning(kind, message.into()),
        });
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn recoverable_error_count(&self) -> usize {
        self.recoverable_error_count
    }

    /// Checks the well-defined phase boundary: terminates the compile if any recoverable error
    /// (or error-mode warning) has accumulated so far.
    pub fn check_phase_boundary(&self, phase: Phase) -> Result<(), CompileError> {
        if self.recoverable_error_count > 0 {
            Err(CompileError::ErrorCount {
                phase,
                count: self.recoverable_error_count,
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_mode_suppresses_warning_but_not_count_reset() {
        let mut modes = HashMap::new();
        modes.insert(WarningKind::TransparencyCollapse, WarningMode::Off);
        let mut sink = ErrorsAndWarnings::new(modes);

        sink.push_warning(WarningKind::TransparencyCollapse, None, "collapsed");
        assert!(sink.diagnostics().is_empty());
        assert_eq!(sink.recoverable_error_count(), 0);
    }

    #[test]
    fn error_mode_warning_counts_toward_phase_boundary() {
        let mut modes = HashMap::new();
        modes.insert(WarningKind::ColorPrecisionLoss, WarningMode::Error);
        let mut sink = ErrorsAndWarnings::new(modes);

        sink.push_warning(WarningKind::ColorPrecisionLoss, None, "lossy");
        assert_eq!(sink.recoverable_error_count(), 1);
        assert!(sink.check_phase_boundary(Phase::Normalization).is_err());
    }

    #[test]
    fn recoverable_error_always_counts() {
        let mut sink = ErrorsAndWarnings::new(HashMap::new());
        sink.push_recoverable(RecoverableKind::InvalidAlphaValue, None, "bad alpha");
        assert_eq!(sink.recoverable_error_count(), 1);
        assert!(sink.check_phase_boundary(Phase::Normalization).is_err());
    }
}
