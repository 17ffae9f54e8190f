//! Shared YAML parsing infrastructure.
//!
//! Provides serde_yaml deserialization with proper error context (file
//! path), converting documents to `serde_json::Value` for uniform
//! processing. `serde_json` is built with `preserve_order`, so mapping key
//! order survives the conversion — the include-order rule depends on it.
//!
//! ## Tag Handling
//!
//! ESPHome YAML leans on custom tags: `!secret wifi_password`,
//! `!include common/base.yaml`, `!lambda "return x;"`. Tags are folded into
//! their value (`!secret wifi_password` becomes the string
//! `"!secret wifi_password"`) instead of being stripped, so rules can tell
//! a secret reference from a hardcoded literal.

use std::path::Path;

use serde_json::Value;

use crate::error::{PackError, PackResult};

/// Load a YAML file and return it as a `serde_json::Value`.
///
/// Mapping key order is preserved. Returns [`PackError::FileNotFound`] for
/// a missing file and [`PackError::YamlParse`] for malformed YAML.
pub fn load_yaml_as_value(path: &Path) -> PackResult<Value> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            PackError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            PackError::Io(e)
        }
    })?;
    let yaml_value: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|e| PackError::YamlParse {
            path: path.to_path_buf(),
            source: e,
        })?;
    Ok(yaml_to_json_value(yaml_value))
}

/// Convert a serde_yaml::Value to a serde_json::Value.
///
/// Handles the type-model differences between YAML and JSON. Tagged scalars
/// are folded into strings carrying their tag; tagged collections recurse
/// into the inner value.
pub fn yaml_to_json_value(yaml: serde_yaml::Value) -> Value {
    match yaml {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(serde_json::Number::from(i))
            } else if let Some(u) = n.as_u64() {
                Value::Number(serde_json::Number::from(u))
            } else {
                let f = n.as_f64().unwrap_or(0.0);
                Value::Number(
                    serde_json::Number::from_f64(f).unwrap_or_else(|| serde_json::Number::from(0)),
                )
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(seq) => {
            Value::Array(seq.into_iter().map(yaml_to_json_value).collect())
        }
        serde_yaml::Value::Mapping(map) => {
            let mut obj = serde_json::Map::new();
            for (k, v) in map {
                let key = match k {
                    serde_yaml::Value::String(s) => s,
                    serde_yaml::Value::Number(n) => n.to_string(),
                    serde_yaml::Value::Bool(b) => b.to_string(),
                    serde_yaml::Value::Null => "null".to_string(),
                    other => format!("{other:?}"),
                };
                obj.insert(key, yaml_to_json_value(v));
            }
            Value::Object(obj)
        }
        serde_yaml::Value::Tagged(tagged) => {
            let tag = tagged.tag.to_string();
            let tag = tag.trim_start_matches('!');
            match yaml_to_json_value(tagged.value) {
                Value::String(s) => Value::String(format!("!{tag} {s}")),
                Value::Null => Value::String(format!("!{tag}")),
                other => other,
            }
        }
    }
}

/// Collect every `${name}` substitution reference in a document.
///
/// Scans all string values recursively; names are `[A-Za-z0-9_]+`. Returns
/// references in document order, duplicates included — callers dedupe if
/// they need to.
pub fn collect_substitution_refs(value: &Value) -> Vec<String> {
    let mut refs = Vec::new();
    walk_for_refs(value, &mut refs);
    refs
}

fn walk_for_refs(value: &Value, acc: &mut Vec<String>) {
    match value {
        Value::String(s) => scan_string_refs(s, acc),
        Value::Array(arr) => {
            for item in arr {
                walk_for_refs(item, acc);
            }
        }
        Value::Object(map) => {
            for v in map.values() {
                walk_for_refs(v, acc);
            }
        }
        _ => {}
    }
}

fn scan_string_refs(s: &str, acc: &mut Vec<String>) {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i + 1 < bytes.len() {
        if bytes[i] == b'$' && bytes[i + 1] == b'{' {
            let start = i + 2;
            if let Some(end) = s[start..].find('}') {
                let name = &s[start..start + end];
                if !name.is_empty()
                    && name
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '_')
                {
                    acc.push(name.to_string());
                }
                i = start + end + 1;
                continue;
            }
        }
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(yaml: &str) -> Value {
        yaml_to_json_value(serde_yaml::from_str(yaml).unwrap())
    }

    #[test]
    fn secret_tag_folds_into_string() {
        let value = parse("wifi:\n  ssid: !secret wifi_ssid\n  password: !secret wifi_password\n");
        assert_eq!(value["wifi"]["ssid"], json!("!secret wifi_ssid"));
        assert_eq!(value["wifi"]["password"], json!("!secret wifi_password"));
    }

    #[test]
    fn include_tag_folds_into_string() {
        let value = parse("packages:\n  base: !include common/base.yaml\n");
        assert_eq!(value["packages"]["base"], json!("!include common/base.yaml"));
    }

    #[test]
    fn mapping_order_is_preserved() {
        let value = parse("packages:\n  zeta: a.yaml\n  alpha: b.yaml\n  mid: c.yaml\n");
        let keys: Vec<&String> = value["packages"].as_object().unwrap().keys().collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn load_yaml_as_value_missing_file() {
        let err = load_yaml_as_value(Path::new("/tmp/packlint-no-such-file.yaml")).unwrap_err();
        assert!(matches!(err, PackError::FileNotFound { .. }));
    }

    #[test]
    fn load_yaml_as_value_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "{unbalanced: [").unwrap();
        let err = load_yaml_as_value(&path).unwrap_err();
        assert!(matches!(err, PackError::YamlParse { .. }));
    }

    #[test]
    fn collect_refs_finds_names_in_nested_values() {
        let value = parse(
            "esphome:\n  name: ${device_name}\nsensor:\n  - platform: uptime\n    name: \"${friendly_name} Uptime\"\n",
        );
        let refs = collect_substitution_refs(&value);
        assert_eq!(refs, ["device_name", "friendly_name"]);
    }

    #[test]
    fn collect_refs_ignores_malformed_references() {
        let value = json!({"a": "${", "b": "${not closed", "c": "$x", "d": "${bad-name}"});
        assert!(collect_substitution_refs(&value).is_empty());
    }

    #[test]
    fn collect_refs_keeps_duplicates_in_order() {
        let value = json!(["${x}", "${y}", "prefix ${x} suffix"]);
        assert_eq!(collect_substitution_refs(&value), ["x", "y", "x"]);
    }
}
