//! The platform contract the engine consumes, specified only at its
//! interface: the HTTP transport, authentication/signing, retry on
//! transport errors and rate limiting all live on the concrete
//! implementation, not here.

pub mod error;
pub mod event;
pub mod host;
pub mod level;
pub mod mock;
pub mod request;

pub use error::{Error, Result};
pub use event::{Event, FetcherResponse, ResponsePayload, SendResponse, Signal, Token};
pub use host::Host;
pub use level::Level;
pub use mock::MockHost;
pub use request::{Method, Request, SignRequest};
