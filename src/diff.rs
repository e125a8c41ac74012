use serde_json::{Map, Value};

/// A single leaf difference between two payloads, addressed by JSON pointer.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Change {
    pub path: String,
    pub old: Value,
    pub new: Value,
}

pub(crate) fn diff_json(previous: &Value, current: &Value, pointer: &str, changes: &mut Vec<Change>) {
    match (previous, current) {
        (Value::Object(prev_map), Value::Object(curr_map)) => {
            for (key, curr_val) in curr_map {
                let path = format!("{pointer}/{key}");
                match prev_map.get(key) {
                    Some(prev_val) => diff_json(prev_val, curr_val, &path, changes),
                    None if curr_val.is_object() => {
                        diff_json(&Value::Object(Map::new()), curr_val, &path, changes);
                    }
                    None => changes.push(Change {
                        path,
                        old: Value::Null,
                        new: curr_val.clone(),
                    }),
                }
            }
            for (key, prev_val) in prev_map {
                if !curr_map.contains_key(key) {
                    changes.push(Change {
                        path: format!("{pointer}/{key}"),
                        old: prev_val.clone(),
                        new: Value::Null,
                    });
                }
            }
        }
        (Value::Array(prev_arr), Value::Array(curr_arr)) if prev_arr.len() == curr_arr.len() => {
            for (idx, (prev_val, curr_val)) in prev_arr.iter().zip(curr_arr).enumerate() {
                diff_json(prev_val, curr_val, &format!("{pointer}/{idx}"), changes);
            }
        }
        (prev, curr) if prev != curr => changes.push(Change {
            path: pointer.to_string(),
            old: prev.clone(),
            new: curr.clone(),
        }),
        _ => {}
    }
}
