//! Non-fatal conditions recorded during a load.

use std::fmt;
use std::path::PathBuf;

/// Something the loader recovered from.
///
/// Warnings never prevent a document from being returned. Each one is also
/// logged at `warn` level when it is recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadWarning {
    /// Pressure values did not match the segment count; the stroke keeps
    /// all its points and falls back to its uniform width.
    PressureMismatch {
        page: usize,
        layer: usize,
        points: usize,
        pressures: usize,
    },
    /// A payload failed to decode and the element was dropped (lenient mode).
    InvalidPayload {
        element: &'static str,
        page: usize,
        layer: usize,
        reason: String,
    },
    /// Unrecognised `tool` value; the stroke is loaded as a pen stroke.
    UnknownTool { value: String },
    /// Unrecognised color; black (or white for backgrounds) is used.
    UnknownColor { element: &'static str, value: String },
    /// Unrecognised background ruling; plain is used.
    UnknownBackgroundStyle { value: String },
    /// A pixmap background file does not exist.
    MissingPixmap { path: PathBuf },
    /// The background PDF does not exist.
    MissingPdf { path: PathBuf },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::PressureMismatch {
                page,
                layer,
                points,
                pressures,
            } => write!(
                f,
                "page {} layer {}: stroke with {} points has {} pressure values, pressure ignored",
                page + 1,
                layer + 1,
                points,
                pressures
            ),
            LoadWarning::InvalidPayload {
                element,
                page,
                layer,
                reason,
            } => write!(
                f,
                "page {} layer {}: <{}> dropped: {}",
                page + 1,
                layer + 1,
                element,
                reason
            ),
            LoadWarning::UnknownTool { value } => {
                write!(f, "unknown stroke tool \"{}\", assuming pen", value)
            }
            LoadWarning::UnknownColor { element, value } => {
                write!(f, "unknown color \"{}\" on <{}>", value, element)
            }
            LoadWarning::UnknownBackgroundStyle { value } => {
                write!(f, "unknown background style \"{}\", assuming plain", value)
            }
            LoadWarning::MissingPixmap { path } => {
                write!(f, "background image {} not found", path.display())
            }
            LoadWarning::MissingPdf { path } => {
                write!(f, "background PDF {} not found", path.display())
            }
        }
    }
}

/// Collects warnings for one load.
#[derive(Debug, Default)]
pub(crate) struct Warnings {
    items: Vec<LoadWarning>,
}

impl Warnings {
    pub fn push(&mut self, warning: LoadWarning) {
        log::warn!("{}", warning);
        self.items.push(warning);
    }

    pub fn into_vec(self) -> Vec<LoadWarning> {
        self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_one_based() {
        let warning = LoadWarning::PressureMismatch {
            page: 0,
            layer: 1,
            points: 3,
            pressures: 5,
        };
        assert_eq!(
            warning.to_string(),
            "page 1 layer 2: stroke with 3 points has 5 pressure values, pressure ignored"
        );
    }

    #[test]
    fn test_collect() {
        let mut warnings = Warnings::default();
        warnings.push(LoadWarning::UnknownTool {
            value: "brush".to_string(),
        });
        assert_eq!(warnings.into_vec().len(), 1);
    }
}
