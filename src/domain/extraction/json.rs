//! JSON extraction from free-text completions

use serde_json::{Map, Value};

/// Parse the outermost JSON object embedded in a completion
///
/// Markdown code fences are removed first. Returns `None` when no object parses.
pub fn extract_json_object(text: &str) -> Option<Map<String, Value>> {
    let unfenced: String = text
        .lines()
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect::<Vec<_>>()
        .join("\n");

    let start = unfenced.find('{')?;
    let end = unfenced.rfind('}')?;

    if start >= end {
        return None;
    }

    match serde_json::from_str(&unfenced[start..=end]) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Interpret a model-reported yes/no flag
pub fn parse_flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.trim().to_uppercase().as_str() {
            "Y" | "YES" | "TRUE" | "1" => Some(true),
            "N" | "NO" | "FALSE" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// A field as text; null, empty strings, and missing fields are `None`
pub fn string_field(map: &Map<String, Value>, name: &str) -> Option<String> {
    match map.get(name)? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_plain_object() {
        let map = extract_json_object(r#"{"success": "Y", "param_value": "USD"}"#).unwrap();
        assert_eq!(map["param_value"], "USD");
    }

    #[test]
    fn test_extract_from_surrounding_text_and_fences() {
        let text = "Here is the result:\n```json\n{\"success\": \"N\",\n \"justification\": \"absent\"}\n```\nDone.";
        let map = extract_json_object(text).unwrap();

        assert_eq!(map["success"], "N");
        assert_eq!(map["justification"], "absent");
    }

    #[test]
    fn test_extract_keeps_nested_objects() {
        let map = extract_json_object(r#"x {"a": {"b": 1}} y"#).unwrap();
        assert_eq!(map["a"], json!({"b": 1}));
    }

    #[test]
    fn test_extract_failures() {
        assert!(extract_json_object("no braces").is_none());
        assert!(extract_json_object("} reversed {").is_none());
        assert!(extract_json_object("{not json}").is_none());
        assert!(extract_json_object("[1, 2]").is_none());
    }

    #[test]
    fn test_parse_flag() {
        for truthy in [json!("Y"), json!("yes"), json!("TRUE"), json!("1"), json!(true), json!(1)] {
            assert_eq!(parse_flag(&truthy), Some(true), "{}", truthy);
        }
        for falsy in [json!("N"), json!("no"), json!("false"), json!("0"), json!(false), json!(0)] {
            assert_eq!(parse_flag(&falsy), Some(false), "{}", falsy);
        }
        assert_eq!(parse_flag(&json!("maybe")), None);
        assert_eq!(parse_flag(&json!(null)), None);
    }

    #[test]
    fn test_string_field() {
        let map = extract_json_object(r#"{"a": "x", "b": "", "c": null, "d": 3.5}"#).unwrap();

        assert_eq!(string_field(&map, "a").as_deref(), Some("x"));
        assert_eq!(string_field(&map, "b"), None);
        assert_eq!(string_field(&map, "c"), None);
        assert_eq!(string_field(&map, "d").as_deref(), Some("3.5"));
        assert_eq!(string_field(&map, "missing"), None);
    }
}
