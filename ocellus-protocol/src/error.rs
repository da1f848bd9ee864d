//! Malformed command errors

use thiserror::Error;

/// A record that could not be turned into a command
///
/// Always non-fatal: the reader logs it and moves on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("invalid JSON: {0}")]
    Json(String),
    #[error("no JSON payload after topic")]
    MissingPayload,
    #[error("unknown topic {0:?}")]
    UnknownTopic(String),
    #[error("field {0:?} missing or of the wrong type")]
    BadField(&'static str),
    #[error("unknown command kind {0:?}")]
    UnknownKind(String),
    #[error("channel {0} outside 0..=15")]
    ChannelOutOfRange(i64),
    #[error("{field} = {value} outside 0..=4095")]
    ValueOutOfRange { field: &'static str, value: i64 },
    #[error("range low {low} above high {high}")]
    InvertedRange { low: i64, high: i64 },
    #[error("{0} is not a finite number")]
    NonFinite(&'static str),
    #[error("{0} image is empty")]
    EmptyImage(&'static str),
    #[error("repeat count must be at least 1")]
    ZeroRepeat,
}
