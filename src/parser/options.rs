//! Parsing options and configuration.

/// Options for loading documents.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Error handling mode for recoverable element failures
    pub error_mode: ErrorMode,

    /// What to extract from the document
    pub extract_mode: ExtractMode,

    /// Whether to check that referenced PDF and image files exist
    pub check_attachments: bool,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set error mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Enable lenient mode (drop elements with broken payloads).
    pub fn lenient(mut self) -> Self {
        self.error_mode = ErrorMode::Lenient;
        self
    }

    /// Set extract mode.
    pub fn with_extract_mode(mut self, mode: ExtractMode) -> Self {
        self.extract_mode = mode;
        self
    }

    /// Read structure only, skipping payload decoding.
    pub fn structure_only(mut self) -> Self {
        self.extract_mode = ExtractMode::StructureOnly;
        self
    }

    /// Enable or disable attachment existence checks.
    pub fn with_attachment_check(mut self, check: bool) -> Self {
        self.check_attachments = check;
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            error_mode: ErrorMode::Strict,
            extract_mode: ExtractMode::Full,
            check_attachments: true,
        }
    }
}

/// Error handling mode during parsing.
///
/// Only inline payload failures are recoverable; structural errors are
/// fatal in every mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Fail the whole load
    #[default]
    Strict,
    /// Drop the broken element, keep its siblings, record a warning
    Lenient,
}

/// What content to extract from the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractMode {
    /// Decode everything, including image payloads
    #[default]
    Full,
    /// Build the element tree but leave payloads empty
    StructureOnly,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options_builder() {
        let options = ParseOptions::new()
            .lenient()
            .structure_only()
            .with_attachment_check(false);

        assert_eq!(options.error_mode, ErrorMode::Lenient);
        assert_eq!(options.extract_mode, ExtractMode::StructureOnly);
        assert!(!options.check_attachments);
    }

    #[test]
    fn test_default_options() {
        let options = ParseOptions::default();
        assert_eq!(options.error_mode, ErrorMode::Strict);
        assert_eq!(options.extract_mode, ExtractMode::Full);
        assert!(options.check_attachments);
    }
}
