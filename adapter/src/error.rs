use thiserror::Error;

/// Errors raised while parsing an adapter-facing request, as opposed to
/// [`engine::TransportError`] which covers a failed round-trip once a
/// request has actually been sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("unknown market type \"{0}\" (expected \"spot\" or \"swap\")")]
    UnknownMarketType(String),
    #[error("malformed market identifier \"{0}\" (expected \"<market_type>:<BASE>/<QUOTE>\")")]
    MalformedMarketId(String),
}
