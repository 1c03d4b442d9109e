/// Transport-level failures of a save attempt.
///
/// Everything the server can answer is a [`SaveResult`](super::SaveResult);
/// this type covers only the cases where no answer arrived.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The HTTP client could not be constructed.
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request could not be sent (network unreachable, connection refused, ...).
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The response arrived but its body could not be read.
    #[error("could not read response body: {0}")]
    Body(#[source] reqwest::Error),
}
