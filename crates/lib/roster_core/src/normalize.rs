//! JSON key normalization between the backend and the client.
//!
//! The backend speaks `snake_case`; every consumer of this workspace reads
//! `camelCase`. [`camel_case_keys`] rewrites response keys recursively and
//! leaves array structure and primitive values alone. [`snake_case_keys`]
//! does the reverse for request bodies.

use serde_json::{Map, Value};

/// Convert a single key from `snake_case` to `camelCase`.
///
/// Only an underscore followed by a lowercase ASCII letter is rewritten;
/// any other underscore is kept as-is.
pub fn to_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '_'
            && let Some(&next) = chars.peek()
            && next.is_ascii_lowercase()
        {
            out.push(next.to_ascii_uppercase());
            chars.next();
            continue;
        }
        out.push(c);
    }

    out
}

/// Recursively rewrite every object key in `value` to `camelCase`.
pub fn camel_case_keys(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(camel_case_keys).collect()),
        Value::Object(fields) => {
            let mut out = Map::with_capacity(fields.len());
            for (key, inner) in fields {
                out.insert(to_camel_case(&key), camel_case_keys(inner));
            }
            Value::Object(out)
        }
        other => other,
    }
}

/// Convert a single key from `camelCase` to `snake_case`.
pub fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Recursively rewrite every object key in `value` to `snake_case`.
pub fn snake_case_keys(value: Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.into_iter().map(snake_case_keys).collect()),
        Value::Object(fields) => Value::Object(
            fields
                .into_iter()
                .map(|(key, inner)| (to_snake_case(&key), snake_case_keys(inner)))
                .collect(),
        ),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn converts_simple_keys() {
        assert_eq!(to_camel_case("server_id"), "serverId");
        assert_eq!(to_camel_case("has_medical_card"), "hasMedicalCard");
    }

    #[test]
    fn key_without_underscore_is_unchanged() {
        assert_eq!(to_camel_case("name"), "name");
        assert_eq!(to_camel_case("serverId"), "serverId");
    }

    #[test]
    fn underscore_before_non_letter_is_kept() {
        assert_eq!(to_camel_case("slot_1"), "slot_1");
        assert_eq!(to_camel_case("trailing_"), "trailing_");
        assert_eq!(to_camel_case("_private"), "Private");
        assert_eq!(to_camel_case("double__x"), "double_X");
        assert_eq!(to_camel_case("upper_X"), "upper_X");
    }

    #[test]
    fn rewrites_nested_objects_and_arrays() {
        let input = json!({"server_id": 1, "items": [{"has_pet": true}]});
        let expected = json!({"serverId": 1, "items": [{"hasPet": true}]});
        assert_eq!(camel_case_keys(input), expected);
    }

    #[test]
    fn recurses_into_arrays_of_arrays() {
        let input = json!([[{"vip_status": {"expires_at": null}}], 3, "a_b"]);
        let expected = json!([[{"vipStatus": {"expiresAt": null}}], 3, "a_b"]);
        assert_eq!(camel_case_keys(input), expected);
    }

    #[test]
    fn primitives_pass_through() {
        assert_eq!(camel_case_keys(json!("snake_value")), json!("snake_value"));
        assert_eq!(camel_case_keys(json!(null)), json!(null));
        assert_eq!(camel_case_keys(json!(4.5)), json!(4.5));
    }

    #[test]
    fn normalization_is_idempotent() {
        let camel = json!({
            "serverId": 7,
            "createdAt": "2024-01-01T00:00:00Z",
            "apartment": {"hasApartment": true, "expiresAt": null},
            "list": [{"userId": 1}]
        });
        assert_eq!(camel_case_keys(camel.clone()), camel);

        let once = camel_case_keys(json!({"medical_card": {"has_medical_card": false}}));
        assert_eq!(camel_case_keys(once.clone()), once);
    }

    #[test]
    fn snake_case_reverses_camel_case() {
        assert_eq!(to_snake_case("hasMedicalCard"), "has_medical_card");
        assert_eq!(to_snake_case("server_id"), "server_id");

        let camel = json!({"medicalCard": {"hasMedicalCard": true, "expiresAt": null}, "name": "N"});
        let expected = json!({"medical_card": {"has_medical_card": true, "expires_at": null}, "name": "N"});
        assert_eq!(snake_case_keys(camel), expected);
    }
}
