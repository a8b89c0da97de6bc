use serde_json::{Map, Value};
use std::fmt::Display;

/// Ordered parameter set with unique keys.
///
/// Insertion order is preserved. Re-inserting an existing key replaces its
/// value in place, and absent (`None`) values are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Display) -> Self {
        self.insert(key, value);
        self
    }

    /// Builder-style insert that skips `None`
    #[must_use]
    pub fn with_opt<V: Display>(mut self, key: impl Into<String>, value: Option<V>) -> Self {
        if let Some(value) = value {
            self.insert(key, value);
        }
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Display) {
        let key = key.into();
        let value = value.to_string();
        match self.pairs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.pairs.push((key, value)),
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pairs sorted by key
    pub fn sorted(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<_> = self.iter().collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        pairs
    }

    /// Flatten a JSON object into a parameter set.
    ///
    /// Nulls are skipped, strings are taken verbatim, booleans and numbers use
    /// their JSON spelling and nested values their compact JSON encoding.
    pub fn from_json_object(object: &Map<String, Value>) -> Self {
        let mut params = Self::new();
        for (key, value) in object {
            if let Some(rendered) = render_json_value(value) {
                params.insert(key.as_str(), rendered);
            }
        }
        params
    }

    /// JSON object with every value as a string, in insertion order
    pub fn to_json_object(&self) -> Map<String, Value> {
        self.pairs
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect()
    }

    /// Parse an `&`-joined `key=value` string, percent-decoding values;
    /// pieces without `=` are skipped
    pub fn parse_encoded(encoded: &str) -> Self {
        let mut params = Self::new();
        for piece in encoded.split('&') {
            if let Some((k, v)) = piece.split_once('=') {
                match urlencoding::decode(v) {
                    Ok(decoded) => params.insert(k, decoded),
                    Err(_) => params.insert(k, v),
                }
            }
        }
        params
    }
}

impl<K: Into<String>, V: Display> FromIterator<(K, V)> for Params {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = Self::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}

fn render_json_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_replaces_in_place() {
        let params = Params::new()
            .with("symbol", "BTCUSDT")
            .with("side", "BUY")
            .with("symbol", "ETHUSDT");
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("symbol", "ETHUSDT"), ("side", "BUY")]);
    }

    #[test]
    fn test_with_opt_skips_none() {
        let params = Params::new()
            .with_opt("limit", None::<u32>)
            .with_opt("symbol", Some("SOL_USDC"));
        assert_eq!(params.len(), 1);
        assert!(!params.contains("limit"));
    }

    #[test]
    fn test_from_json_object_renders_scalars() {
        let body = json!({
            "symbol": "SOL_USDC",
            "quantity": 1.5,
            "postOnly": true,
            "clientId": null,
        });
        let params = Params::from_json_object(body.as_object().unwrap());
        assert_eq!(params.get("symbol"), Some("SOL_USDC"));
        assert_eq!(params.get("quantity"), Some("1.5"));
        assert_eq!(params.get("postOnly"), Some("true"));
        assert!(!params.contains("clientId"));
    }

    #[test]
    fn test_sorted_is_alphabetical() {
        let params = Params::new().with("b", 2).with("a", 1).with("c", 3);
        let keys: Vec<_> = params.sorted().into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_parse_encoded_decodes_values() {
        let params = Params::parse_encoded("id=a%2Bb%20c&flag&symbol=BTCUSDT");
        assert_eq!(params.get("id"), Some("a+b c"));
        assert_eq!(params.get("symbol"), Some("BTCUSDT"));
        assert!(!params.contains("flag"));
    }
}
