//! JSON canónico: claves de objetos ordenadas, sin espacios.

use serde_json::Value;
use std::collections::BTreeMap;

pub fn to_canonical_json(value: &Value) -> String {
    match value {
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(to_canonical_json).collect();
            format!("[{}]", items.join(","))
        }
        Value::Object(map) => {
            let sorted: BTreeMap<&String, String> = map.iter().map(|(k, v)| (k, to_canonical_json(v))).collect();
            let items: Vec<String> = sorted.into_iter()
                                           .map(|(k, v)| format!("{}:{}", Value::String(k.clone()), v))
                                           .collect();
            format!("{{{}}}", items.join(","))
        }
        scalar => scalar.to_string(),
    }
}
