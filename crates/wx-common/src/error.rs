//! Error types for the weather overlay pipeline.

use thiserror::Error;

/// Result type alias using OverlayError.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Primary error type shared by all pipeline stages.
#[derive(Debug, Error)]
pub enum OverlayError {
    // === Recoverable (resolved locally by a fallback) ===
    #[error("No data available for '{subject}': {message}")]
    MissingData { subject: String, message: String },

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("Failed to write tile {tile}: {message}")]
    RenderIo { tile: String, message: String },

    // === Input Errors ===
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    // === Infrastructure Errors ===
    #[error("I/O error: {0}")]
    Io(String),

    #[error("JSON error: {0}")]
    Json(String),
}

impl OverlayError {
    pub fn missing_data(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MissingData {
            subject: subject.into(),
            message: message.into(),
        }
    }

    pub fn render_io(tile: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RenderIo {
            tile: tile.into(),
            message: message.into(),
        }
    }

    /// Whether a stage may degrade locally instead of failing.
    ///
    /// Missing data falls back to hulls or "Other Airports", degenerate
    /// geometry is handled by small-N branches, and a failed tile write only
    /// loses that tile.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            OverlayError::MissingData { .. }
                | OverlayError::DegenerateGeometry(_)
                | OverlayError::RenderIo { .. }
        )
    }
}

impl From<std::io::Error> for OverlayError {
    fn from(err: std::io::Error) -> Self {
        OverlayError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for OverlayError {
    fn from(err: serde_json::Error) -> Self {
        OverlayError::Json(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_taxonomy() {
        assert!(OverlayError::missing_data("NCT A", "no facility").is_recoverable());
        assert!(OverlayError::DegenerateGeometry("2 points".into()).is_recoverable());
        assert!(OverlayError::render_io("7/20/49", "disk full").is_recoverable());
        assert!(!OverlayError::InvalidInput("lat".into()).is_recoverable());
        assert!(!OverlayError::Config("zoom".into()).is_recoverable());
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: OverlayError = io.into();
        assert!(matches!(err, OverlayError::Io(_)));
        assert!(err.to_string().contains("gone"));
    }
}
