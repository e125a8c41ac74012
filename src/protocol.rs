use std::time::Duration;

use serde_json::{json, Value};

pub const DEFAULT_API_URL: &str = "https://emodul.eu/api/v1/";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_secs(1);

pub const AUTHENTICATION_PATH: &str = "authentication";
pub const CONSTANT_TEMP_MODE: &str = "constantTemp";

pub fn modules_path(user_id: i64) -> String {
    format!("users/{user_id}/modules")
}

pub fn directory_path(user_id: i64, udid: &str) -> String {
    format!("users/{user_id}/modules/{udid}")
}

pub fn zones_path(directory: &str) -> String {
    format!("{directory}/zones")
}

pub fn authentication_data(username: &str, password: &str) -> Value {
    json!({
        "username": username,
        "password": password,
    })
}

/// Body for switching a zone to a constant setpoint.
pub fn constant_temperature_data(mode_id: i64, parent_id: i64, set_temperature: i64) -> Value {
    json!({
        "mode": {
            "id": mode_id,
            "parentId": parent_id,
            "mode": CONSTANT_TEMP_MODE,
            "constTempTime": 0,
            "setTemperature": set_temperature,
            "scheduleIndex": 0
        }
    })
}

/// Find the zone object with `zone.id == zone_id` whose `field` is not an
/// explicit null. Zones mid-update report null temperatures and are skipped;
/// a zone that omits the field still matches.
pub fn find_zone<'a>(directory: &'a Value, zone_id: i64, field: &str) -> Option<&'a Value> {
    let elements = match directory.pointer("/zones/elements") {
        Some(Value::Array(elements)) => elements,
        _ => return None,
    };
    elements
        .iter()
        .filter_map(|element| element.get("zone"))
        .find(|zone| {
            zone.get("id").and_then(|v| v.as_i64()) == Some(zone_id)
                && zone.get(field).is_none_or(|v| !v.is_null())
        })
}

pub fn relay_state(zone: &Value) -> Option<&str> {
    zone.pointer("/flags/relayState").and_then(|v| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn directory() -> Value {
        json!({
            "zones": {
                "elements": [
                    {"zone": {"id": 4, "parentId": 1, "currentTemperature": null, "setTemperature": 200}},
                    {"zone": {"id": 5, "parentId": 1, "currentTemperature": 215, "setTemperature": 220,
                              "flags": {"relayState": "on"}}}
                ]
            }
        })
    }

    #[test]
    fn paths() {
        assert_eq!(modules_path(7), "users/7/modules");
        assert_eq!(directory_path(7, "abc"), "users/7/modules/abc");
        assert_eq!(zones_path("users/7/modules/abc"), "users/7/modules/abc/zones");
    }

    #[test]
    fn constant_temperature_structure() {
        let body = constant_temperature_data(42, 1, 225);
        assert_eq!(body["mode"]["id"], 42);
        assert_eq!(body["mode"]["parentId"], 1);
        assert_eq!(body["mode"]["mode"], "constantTemp");
        assert_eq!(body["mode"]["constTempTime"], 0);
        assert_eq!(body["mode"]["setTemperature"], 225);
        assert_eq!(body["mode"]["scheduleIndex"], 0);
    }

    #[test]
    fn find_zone_matches_id() {
        let dir = directory();
        let zone = find_zone(&dir, 5, "currentTemperature").unwrap();
        assert_eq!(zone["currentTemperature"], 215);
        assert_eq!(relay_state(zone), Some("on"));
    }

    #[test]
    fn find_zone_skips_null_field() {
        let dir = directory();
        assert!(find_zone(&dir, 4, "currentTemperature").is_none());
        assert!(find_zone(&dir, 4, "setTemperature").is_some());
    }

    #[test]
    fn find_zone_matches_when_field_absent() {
        let dir = json!({"zones": {"elements": [
            {"zone": {"id": 5, "setTemperature": 220, "flags": {"relayState": "on"}}}
        ]}});
        let zone = find_zone(&dir, 5, "currentTemperature").unwrap();
        assert_eq!(relay_state(zone), Some("on"));
    }

    #[test]
    fn find_zone_tolerates_malformed_payload() {
        assert!(find_zone(&json!({}), 5, "currentTemperature").is_none());
        assert!(find_zone(&json!({"zones": {"elements": {}}}), 5, "currentTemperature").is_none());
        assert!(find_zone(&Value::Null, 5, "currentTemperature").is_none());
    }
}
