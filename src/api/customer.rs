use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{
    reference::{self, Reference},
    text,
};

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Customer {
    #[serde(default, deserialize_with = "reference::lenient")]
    pub id: Option<Reference>,
    #[serde(default, deserialize_with = "text::lenient")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
