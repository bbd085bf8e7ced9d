use shared::domain::TimeError;
use thiserror::Error;

/// Failures surfaced by the fetch operations. Transport errors and
/// malformed JSON arrive through `Http`; numeric time fields that
/// decode but encode an impossible time arrive through `Time`. No
/// retry policy lives here; callers decide what to do with a failure.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed time in server payload: {0}")]
    Time(#[from] TimeError),
}
