use thiserror::Error;

/// Failures the codec (C1) can surface. Parse errors never abort an entire
/// series — the codec folds them into an `Error` response element per
/// element instead — this type exists for the handful of cases that really
/// are all-or-nothing (the envelope itself is not a JSON object, or `series`
/// is missing/not an array).
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("response envelope was not a JSON object")]
    NotAnObject,
    #[error("response envelope is missing a `series` array")]
    MissingSeries,
    #[error("response envelope's `series` field is not an array")]
    SeriesNotArray,
}
