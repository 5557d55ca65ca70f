use derive_more::Display;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{
    reference::{self, Reference},
    text,
};

/// Status written when a ticket is toggled away from pending.
pub const RECEIVED: &str = "received";

/// Status written when a ticket is toggled back.
///
/// Capitalized unlike [`RECEIVED`]: the backend has always been sent these
/// exact literals and its case sensitivity is unknown.
pub const PENDING: &str = "Pending";

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Ticket {
    pub id: Id,
    #[serde(
        default,
        deserialize_with = "reference::lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub order: Option<Reference>,
    #[serde(default, deserialize_with = "text::lenient")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "text::lenient")]
    pub passport_name: Option<String>,
    #[serde(default, deserialize_with = "text::lenient")]
    pub facebook_name: Option<String>,
    #[serde(default, deserialize_with = "text::lenient")]
    pub member_code: Option<String>,
    #[serde(default, deserialize_with = "text::lenient")]
    pub priority_date: Option<String>,
    #[serde(default)]
    pub fst_pt: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Ticket {
    pub fn status(&self) -> &str {
        self.status.as_deref().unwrap_or_default()
    }

    pub fn is_pending(&self) -> bool {
        status_matches(self.status(), PENDING)
    }

    /// Status a row toggle moves this ticket to.
    pub fn toggled_status(&self) -> &'static str {
        if self.is_pending() {
            RECEIVED
        } else {
            PENDING
        }
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
pub struct Id(i64);

impl From<i64> for Id {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Ticket enriched with the email of the customer who placed its order.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct JoinedTicket {
    #[serde(flatten)]
    pub ticket: Ticket,
    pub customer_email: Option<String>,
}

/// Statuses are free-form, so equality ignores case everywhere.
pub fn status_matches(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
