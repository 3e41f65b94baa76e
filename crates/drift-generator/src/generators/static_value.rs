//! Static value generator and YAML to [`Value`] conversion.

use drift_core::Value;
use serde_yaml::Value as YamlValue;

/// Convert a YAML scalar to a [`Value`].
///
/// Sequences and mappings become JSON documents, since the only column
/// types that can hold them are `json`/`jsonb`.
pub fn yaml_to_value(yaml: &YamlValue) -> Value {
    match yaml {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(*b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int64(i)
            } else if let Some(f) = n.as_f64() {
                Value::Float64(f)
            } else {
                Value::Text(n.to_string())
            }
        }
        YamlValue::String(s) => Value::Text(s.clone()),
        YamlValue::Sequence(_) | YamlValue::Mapping(_) => Value::Json(yaml_to_json(yaml)),
        YamlValue::Tagged(tagged) => yaml_to_value(&tagged.value),
    }
}

fn yaml_to_json(yaml: &YamlValue) -> serde_json::Value {
    use serde_json::Value as Json;

    match yaml {
        YamlValue::Null => Json::Null,
        YamlValue::Bool(b) => Json::Bool(*b),
        YamlValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Json::from(i)
            } else if let Some(f) = n.as_f64() {
                Json::from(f)
            } else {
                Json::String(n.to_string())
            }
        }
        YamlValue::String(s) => Json::String(s.clone()),
        YamlValue::Sequence(items) => Json::Array(items.iter().map(yaml_to_json).collect()),
        YamlValue::Mapping(map) => Json::Object(
            map.iter()
                .filter_map(|(k, v)| Some((k.as_str()?.to_string(), yaml_to_json(v))))
                .collect(),
        ),
        YamlValue::Tagged(tagged) => yaml_to_json(&tagged.value),
    }
}
