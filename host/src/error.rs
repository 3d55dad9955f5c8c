use thiserror::Error;

/// Errors the host's own surface can raise. Transport-level failures are
/// not represented here — they travel back as a [`crate::ResponsePayload`]
/// with `error: true` and are turned into a [`crate::TransportError`] at
/// the engine's `send()` call site, not raised from this trait.
#[derive(Error, Debug)]
pub enum Error {
    #[error("no strategy named \"{0}\" is known to the host")]
    UnknownStrategy(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Url(#[from] url::ParseError),
    #[error("host event stream closed")]
    StreamClosed,
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool { std::mem::discriminant(self) == std::mem::discriminant(other) }
}

pub type Result<T> = core::result::Result<T, Error>;
