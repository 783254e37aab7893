//! Error taxonomy shared by the whole crate.

use thiserror::Error;

/// Everything that can go wrong between a caller and the renderer.
#[derive(Debug, Error)]
pub enum Error {
    /// The color specification matched no known grammar, or matched one
    /// with the wrong channel count or out-of-range channels. A caller
    /// error; never retried.
    #[error("invalid color specification: {0:?}")]
    InvalidColorSpec(String),

    /// The request text does not fit the single line-count byte of the
    /// wire format. A caller error; the count is never clamped.
    #[error("text has {0} lines, the wire format carries at most 255")]
    TooManyLines(usize),

    /// The renderer could not be reached or an exchange timed out.
    /// Surfaced to the blocked caller; retryable by the caller, never
    /// retried internally.
    #[error("renderer unavailable: {0}")]
    BackendUnavailable(String),

    /// The renderer answered with a malformed or truncated frame. Fatal
    /// to the connection; reconnect before issuing further operations.
    #[error("protocol framing error: {0}")]
    Protocol(String),
}
