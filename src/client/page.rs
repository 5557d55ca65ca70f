use serde_json::Value;

/// One response of a listing endpoint.
#[derive(Clone, Debug, PartialEq)]
pub enum Page<T> {
    /// Flat, unpaginated listing.
    List(Vec<T>),

    /// `{ "results": [...], "next": "..." }` envelope.
    Paginated { results: Vec<T>, next: Option<String> },

    /// A lone resource standing in for a listing.
    Single(T),
}

impl Page<Value> {
    /// Recognizes the shape of a decoded response body, or `None` when it is
    /// none of the supported ones.
    ///
    /// An object is an envelope when `results` is an array, and a single
    /// resource when `results` is missing or empty-ish (`null`, `false`, `0`,
    /// `""`). Any other `results` value is unsupported.
    pub fn classify(body: Value) -> Option<Self> {
        let mut object = match body {
            Value::Array(items) => return Some(Self::List(items)),
            Value::Object(object) => object,
            _ => return None,
        };

        match object.remove("results") {
            Some(Value::Array(results)) => {
                let next = match object.remove("next") {
                    Some(Value::String(next)) if !next.is_empty() => Some(next),
                    _ => None,
                };
                Some(Self::Paginated { results, next })
            }
            Some(results) if !is_blank(&results) => None,
            results => {
                if let Some(results) = results {
                    object.insert("results".to_owned(), results);
                }
                Some(Self::Single(Value::Object(object)))
            }
        }
    }
}

impl<T> Page<T> {
    /// Items of this page and the cursor of the following one.
    pub fn into_parts(self) -> (Vec<T>, Option<String>) {
        match self {
            Self::List(items) => (items, None),
            Self::Paginated { results, next } => (results, next),
            Self::Single(item) => (vec![item], None),
        }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}
