/// Errors that can occur while building a print-view URL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrintUrlError {
    /// The button declares no print URL.
    #[error("no print view is configured for this button")]
    NotConfigured,

    /// The declared print URL cannot be resolved.
    #[error("invalid print URL {base:?}: {source}")]
    InvalidBase {
        base: String,
        #[source]
        source: url::ParseError,
    },
}
