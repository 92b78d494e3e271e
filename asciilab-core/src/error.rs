//! Typed error kinds for the render pipeline (made by FontLab https://www.fontlab.com/)
//!
//! Only [`AsciiLabError::FatalRenderFailure`] ever reaches the preview; the
//! other kinds are recovered where they occur and show up as a warning
//! string or a log line.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AsciiLabError {
    /// The probe for a typeface definition failed or returned non-success.
    #[error("typeface '{name}' is unavailable: {reason}")]
    TypefaceUnavailable { name: String, reason: String },

    /// The engine rejected the input for a non-default typeface.
    #[error("typeface '{typeface}' failed to render: {message}")]
    RenderFailure { typeface: String, message: String },

    /// The default typeface itself failed; nothing left to fall back to.
    #[error("default typeface '{typeface}' failed to render: {message}")]
    FatalRenderFailure { typeface: String, message: String },

    /// A persisted record was absent or could not be parsed.
    #[error("could not read stored '{key}': {message}")]
    PersistenceReadFailure { key: String, message: String },

    /// A field of the shareable state could not be used as-is.
    #[error("ignoring shared state field '{key}={value}'")]
    SerializedStateDecodeFailure { key: String, value: String },
}

pub type Result<T> = std::result::Result<T, AsciiLabError>;
