/// Opaque identifier correlating a [`crate::Request`] sent on-demand with
/// its eventual [`SendResponse`]. Out-of-order completions are explicitly
/// supported — the only contract is that a token is unique among
/// in-flight sends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Token(pub uuid::Uuid);

impl Token {
    pub fn new() -> Self { Self(uuid::Uuid::new_v4()) }
}

impl Default for Token {
    fn default() -> Self { Self::new() }
}

/// The wire shape a response arrives in (spec.md §6). Signals are carried
/// inside a response payload with `restart` or `terminate` set; the
/// host's `next_event` is responsible for recognizing that and producing
/// a [`Signal`] [`Event`] instead of a data event, so nothing downstream
/// of the host has to special-case it.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ResponsePayload {
    pub url: String,
    pub env_suffix: Option<String>,
    pub status: u16,
    pub content: String,
    pub error: bool,
    #[serde(default)]
    pub restart: bool,
    #[serde(default)]
    pub terminate: bool,
}

impl ResponsePayload {
    pub fn fingerprint(&self) -> String {
        match &self.env_suffix {
            Some(suffix) => format!("{}:{}", self.url, suffix),
            None => self.url.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    Terminate,
    Restart,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FetcherResponse {
    pub url: String,
    pub env_suffix: Option<String>,
    pub content: String,
    pub status: u16,
    pub error: bool,
}

impl FetcherResponse {
    pub fn fingerprint(&self) -> String {
        match &self.env_suffix {
            Some(suffix) => format!("{}:{}", self.url, suffix),
            None => self.url.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SendResponse {
    pub token: Token,
    pub content: String,
    pub status: u16,
    pub error: bool,
}

/// The tagged variant the executor's main loop drains (spec.md §3).
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Signal(Signal),
    FetcherResponse(FetcherResponse),
    SendResponse(SendResponse),
}

impl Event {
    /// Build the right [`Event`] variant from a raw wire payload,
    /// recognizing an embedded signal before treating it as data.
    pub fn from_fetcher_payload(payload: ResponsePayload) -> Self {
        if payload.terminate {
            return Self::Signal(Signal::Terminate);
        }
        if payload.restart {
            return Self::Signal(Signal::Restart);
        }
        Self::FetcherResponse(FetcherResponse {
            url: payload.url,
            env_suffix: payload.env_suffix,
            content: payload.content,
            status: payload.status,
            error: payload.error,
        })
    }

    pub fn from_send_response(token: Token, payload: ResponsePayload) -> Self {
        if payload.terminate {
            return Self::Signal(Signal::Terminate);
        }
        if payload.restart {
            return Self::Signal(Signal::Restart);
        }
        Self::SendResponse(SendResponse {
            token,
            content: payload.content,
            status: payload.status,
            error: payload.error,
        })
    }
}
