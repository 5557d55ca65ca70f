use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::reference::{self, Reference};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Order {
    #[serde(default, deserialize_with = "reference::lenient")]
    pub id: Option<Reference>,
    #[serde(default, deserialize_with = "reference::lenient")]
    pub customer: Option<Reference>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
