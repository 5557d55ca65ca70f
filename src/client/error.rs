use std::error::Error as StdError;

use derive_more::{Display, From};
use reqwest::StatusCode;
use url::Url;

use crate::api::ticket;

#[derive(Debug, Display, From)]
pub enum Error {
    /// A page of a listing came back with a non-success status. Nothing
    /// collected before it is returned.
    #[display("failed to fetch ({status}) from {url}")]
    FetchAborted { url: Url, status: StatusCode },

    /// The API refused a status change.
    #[display("failed to update ticket #{id} ({status}){}", detail(body))]
    RequestFailed {
        id: ticket::Id,
        status: StatusCode,
        body: String,
    },

    /// No response at all, or a body that is not JSON.
    #[display("network error: {_0}")]
    #[from]
    Network(reqwest::Error),

    #[display("unexpected item in {url}: {source}")]
    Decode {
        url: Url,
        source: serde_json::Error,
    },

    #[display("invalid url: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),

    #[display("ticket #{_0} is not loaded")]
    NotLoaded(ticket::Id),
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Network(e) => Some(e),
            Self::Decode { source, .. } => Some(source),
            Self::InvalidUrl(e) => Some(e),
            Self::FetchAborted { .. }
            | Self::RequestFailed { .. }
            | Self::NotLoaded(_) => None,
        }
    }
}

fn detail(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        String::new()
    } else {
        format!(": {body}")
    }
}
