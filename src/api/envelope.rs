use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use super::ApiError;

/// Accepts a bare array or an object wrapping the array under one of `keys`.
pub(crate) fn list_in(body: Value, keys: &[&str]) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            for key in keys {
                if let Some(Value::Array(items)) = map.remove(*key) {
                    return items;
                }
            }
            warn!(expected = ?keys, "response carried no list; treating as empty");
            Vec::new()
        }
        _ => {
            warn!("response is neither array nor object; treating as empty");
            Vec::new()
        }
    }
}

/// Decodes each entry, skipping the ones that do not fit `T`.
pub(crate) fn decode_each<T: DeserializeOwned>(items: Vec<Value>, what: &str) -> Vec<T> {
    items
        .into_iter()
        .filter_map(|v| match serde_json::from_value(v) {
            Ok(t) => Some(t),
            Err(e) => {
                warn!(error = %e, what, "malformed entry skipped");
                None
            }
        })
        .collect()
}

/// Reads `body[key]` as `T`.
pub(crate) fn field<T: DeserializeOwned>(body: &Value, key: &str) -> Result<T, ApiError> {
    let value = body
        .get(key)
        .filter(|v| !v.is_null())
        .ok_or_else(|| ApiError::Decode(format!("missing `{key}`")))?;
    serde_json::from_value(value.clone()).map_err(|e| ApiError::Decode(format!("`{key}`: {e}")))
}

/// Like [`field`], but an absent or null `body[key]` is `None`.
pub(crate) fn optional_field<T: DeserializeOwned>(
    body: &Value,
    key: &str,
) -> Result<Option<T>, ApiError> {
    match body.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(_) => field(body, key).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_shapes() {
        assert_eq!(list_in(json!([1, 2]), &["orders"]).len(), 2);
        assert_eq!(list_in(json!({"orders": [1]}), &["orders"]).len(), 1);
        assert_eq!(list_in(json!({"menu": [1, 2, 3]}), &["menuItems", "menu"]).len(), 3);
        assert!(list_in(json!({"other": [1]}), &["orders"]).is_empty());
        assert!(list_in(json!("x"), &["orders"]).is_empty());
    }

    #[test]
    fn field_requires_presence() {
        let body = json!({"token": "abc", "nothing": null});
        assert_eq!(field::<String>(&body, "token").unwrap(), "abc");
        assert!(matches!(field::<String>(&body, "nothing"), Err(ApiError::Decode(_))));
        assert!(matches!(field::<u32>(&body, "token"), Err(ApiError::Decode(_))));
    }

    #[test]
    fn optional_field_allows_absence_only() {
        let body = json!({"token": "abc", "nothing": null});
        assert_eq!(optional_field::<String>(&body, "token").unwrap().as_deref(), Some("abc"));
        assert_eq!(optional_field::<String>(&body, "nothing").unwrap(), None);
        assert_eq!(optional_field::<String>(&body, "order").unwrap(), None);
        assert!(matches!(optional_field::<u32>(&body, "token"), Err(ApiError::Decode(_))));
    }
}
