//! Schema-tolerant lookups over loosely structured upstream JSON.
//!
//! The upstream site changes field names and nesting between releases, so
//! every accessor here takes a list of aliases and degrades to `None`
//! instead of failing.

use serde_json::{Map, Value};

/// JSON object as produced by `serde_json`
pub type Object = Map<String, Value>;

/// Depth-first search for the first object satisfying `pred`.
///
/// The object passed in is tested before its children, and children are
/// visited in document order.
pub fn find_object<'a, F>(value: &'a Value, pred: &F) -> Option<&'a Object>
where
    F: Fn(&Object) -> bool,
{
    match value {
        Value::Object(obj) => {
            if pred(obj) {
                return Some(obj);
            }
            obj.values().find_map(|v| find_object(v, pred))
        }
        Value::Array(items) => items.iter().find_map(|v| find_object(v, pred)),
        _ => None,
    }
}

/// Depth-first search for the first key containing any of `needles`
/// (case-insensitive). All keys of an object are checked before descending.
pub fn find_key_containing<'a>(value: &'a Value, needles: &[&str]) -> Option<(&'a str, &'a Value)> {
    match value {
        Value::Object(obj) => {
            let hit = obj.iter().find(|(k, _)| {
                let k = k.to_lowercase();
                needles.iter().any(|n| k.contains(&n.to_lowercase()))
            });
            if let Some((k, v)) = hit {
                return Some((k.as_str(), v));
            }
            obj.values().find_map(|v| find_key_containing(v, needles))
        }
        Value::Array(items) => items.iter().find_map(|v| find_key_containing(v, needles)),
        _ => None,
    }
}

/// First alias present on the object with a non-null value
pub fn first_of<'a>(obj: &'a Object, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|a| obj.get(*a))
        .find(|v| !v.is_null())
}

/// Numeric value from a JSON number or a numeric string ("1,250.5")
pub fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s.chars().filter(|c| *c != ',').collect();
            cleaned.trim().parse::<f64>().ok()
        }
        _ => None,
    }
    .filter(|f| f.is_finite())
}

/// Float field, `0.0` when missing, null or unparseable
pub fn f64_field(obj: &Object, aliases: &[&str]) -> f64 {
    first_of(obj, aliases).and_then(as_f64).unwrap_or(0.0)
}

/// Signed integer field, truncating fractional values; `0` by default
pub fn i64_field(obj: &Object, aliases: &[&str]) -> i64 {
    first_of(obj, aliases)
        .and_then(|v| v.as_i64().or_else(|| as_f64(v).map(|f| f.trunc() as i64)))
        .unwrap_or(0)
}

/// Non-negative integer field; negatives clamp to `0`
pub fn u64_field(obj: &Object, aliases: &[&str]) -> u64 {
    i64_field(obj, aliases).max(0) as u64
}

/// String field, accepting numbers as their textual form
pub fn str_field(obj: &Object, aliases: &[&str]) -> Option<String> {
    first_of(obj, aliases).and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_find_object_depth_first() {
        let doc = json!({
            "data": [
                {"indexName": "NIFTY BANK", "last": 1},
                {"group": [{"indexName": "NIFTY 50", "last": 2}]}
            ]
        });

        let found = find_object(&doc, &|o: &Object| {
            o.get("indexName").and_then(Value::as_str) == Some("NIFTY 50")
        });
        assert_eq!(found.and_then(|o| o.get("last")), Some(&json!(2)));
    }

    #[test]
    fn test_find_object_none() {
        let doc = json!([1, "x", {"a": {"b": null}}]);
        assert!(find_object(&doc, &|o: &Object| o.contains_key("zzz")).is_none());
    }

    #[test]
    fn test_find_key_containing_prefers_shallow_keys() {
        let doc = json!({
            "outer": {"Advances": 30},
            "advanceCount": 12
        });
        let (key, value) = find_key_containing(&doc, &["adv"]).unwrap();
        assert_eq!(key, "advanceCount");
        assert_eq!(value, &json!(12));
    }

    #[test]
    fn test_first_of_skips_nulls() {
        let obj = json!({"a": null, "b": 5}).as_object().cloned().unwrap();
        assert_eq!(first_of(&obj, &["a", "b"]), Some(&json!(5)));
        assert_eq!(first_of(&obj, &["c"]), None);
    }

    #[test]
    fn test_numeric_coercion() {
        let obj = json!({
            "n": 12.75,
            "s": "1,250.5",
            "bad": "abc",
            "neg": -4,
            "nil": null
        })
        .as_object()
        .cloned()
        .unwrap();

        assert_eq!(f64_field(&obj, &["n"]), 12.75);
        assert_eq!(f64_field(&obj, &["s"]), 1250.5);
        assert_eq!(f64_field(&obj, &["bad"]), 0.0);
        assert_eq!(f64_field(&obj, &["nil"]), 0.0);
        assert_eq!(i64_field(&obj, &["n"]), 12);
        assert_eq!(i64_field(&obj, &["neg"]), -4);
        assert_eq!(u64_field(&obj, &["neg"]), 0);
        assert_eq!(u64_field(&obj, &["missing"]), 0);
    }
}
