use std::collections::HashMap;

/// HTTP verbs the host's transport understands (spec.md §6).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Get,
    Post,
    Delete,
    Put,
}

/// What an adapter emits and the host's transport consumes.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Request {
    pub url: String,
    pub method: Method,
    pub body: Option<String>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    /// Adapter name requesting request signing, or a plain bool for
    /// "sign with the default credentials".
    pub sign: Option<SignRequest>,
    /// Disambiguates otherwise-identical URLs served under different
    /// credential environments (spec.md §4.D).
    pub env_suffix: Option<String>,
    /// When true, route only to the primary account/session instead of
    /// fanning out across replicas.
    #[serde(default)]
    pub primary_only: bool,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(untagged)]
pub enum SignRequest {
    Default(bool),
    Adapter(String),
}

impl Request {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            body: None,
            headers: HashMap::new(),
            sign: None,
            env_suffix: None,
            primary_only: false,
        }
    }

    pub fn with_env_suffix(mut self, env_suffix: impl Into<String>) -> Self {
        self.env_suffix = Some(env_suffix.into());
        self
    }

    /// `fingerprint = url [+ ':' + env_suffix]` (spec.md §4.D), the key a
    /// subscription registers under.
    pub fn fingerprint(&self) -> String {
        match &self.env_suffix {
            Some(suffix) => format!("{}:{}", self.url, suffix),
            None => self.url.clone(),
        }
    }
}
