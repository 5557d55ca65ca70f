use std::time;

use serde::Deserialize;
use url::Url;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub api: Api,
    #[serde(default)]
    pub auth: Auth,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Api {
    pub base_url: Url,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: time::Duration,
}

impl Api {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: default_timeout(),
        }
    }
}

fn default_timeout() -> time::Duration {
    time::Duration::from_secs(10)
}

/// Credentials attached to every request.
///
/// The bearer token has been stored under several key names over time, so
/// all of them are accepted and checked in declaration order.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Auth {
    pub access_token: Option<String>,
    pub token: Option<String>,
    pub auth_token: Option<String>,
    /// `Set-Cookie` style strings, e.g. `csrftoken=abc; Path=/`.
    #[serde(default)]
    pub cookies: Vec<String>,
}

impl Auth {
    pub fn bearer_token(&self) -> Option<&str> {
        [&self.access_token, &self.token, &self.auth_token]
            .into_iter()
            .filter_map(Option::as_deref)
            .find(|token| !token.is_empty())
    }
}
