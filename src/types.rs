use std::fmt;

use serde::{Deserialize, Serialize};

/// Temperature stored as Celsius internally.
/// The eModul API speaks in tenths of a degree Celsius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Temperature(f64);

impl Temperature {
    pub fn from_celsius(c: f64) -> Self {
        Self(c)
    }

    /// Construct from a raw vendor value (tenths of a degree).
    pub fn from_tenths(raw: f64) -> Self {
        Self(raw / 10.0)
    }

    pub fn celsius(&self) -> f64 {
        self.0
    }

    pub fn fahrenheit(&self) -> f64 {
        self.0 * (9.0 / 5.0) + 32.0
    }

    /// Round to the vendor's integer tenths.
    pub fn to_tenths(&self) -> i64 {
        (self.0 * 10.0).round() as i64
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}\u{00b0}C", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeatingCoolingState {
    #[default]
    Off,
    Heat,
    Cool,
    Auto,
}

impl HeatingCoolingState {
    pub fn as_hap_value(&self) -> u8 {
        match self {
            HeatingCoolingState::Off => 0,
            HeatingCoolingState::Heat => 1,
            HeatingCoolingState::Cool => 2,
            HeatingCoolingState::Auto => 3,
        }
    }

    pub fn from_hap_value(v: u8) -> Option<Self> {
        match v {
            0 => Some(HeatingCoolingState::Off),
            1 => Some(HeatingCoolingState::Heat),
            2 => Some(HeatingCoolingState::Cool),
            3 => Some(HeatingCoolingState::Auto),
            _ => None,
        }
    }

    /// Map the zone relay flag. Anything other than `"on"` is off.
    pub fn from_relay_state(s: &str) -> Self {
        if s == "on" {
            HeatingCoolingState::Heat
        } else {
            HeatingCoolingState::Off
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemperatureDisplayUnits {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureDisplayUnits {
    pub fn as_hap_value(&self) -> u8 {
        match self {
            TemperatureDisplayUnits::Celsius => 0,
            TemperatureDisplayUnits::Fahrenheit => 1,
        }
    }
}

/// Thermostat characteristics exposed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Characteristic {
    CurrentHeatingCoolingState,
    TargetHeatingCoolingState,
    CurrentTemperature,
    TargetTemperature,
    TemperatureDisplayUnits,
}

impl Characteristic {
    pub fn is_writable(&self) -> bool {
        matches!(
            self,
            Characteristic::TargetHeatingCoolingState
                | Characteristic::TargetTemperature
                | Characteristic::TemperatureDisplayUnits
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CharacteristicValue {
    State(HeatingCoolingState),
    Temperature(f64),
    Units(TemperatureDisplayUnits),
}

/// Static accessory information service values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessoryInformation {
    pub manufacturer: String,
    pub model: String,
    pub serial_number: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticationResponse {
    pub token: String,
    pub user_id: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Module {
    #[serde(rename = "type")]
    pub module_type: Option<String>,
    pub controller_status: Option<String>,
    pub module_status: Option<String>,
    pub additional_information: Option<String>,
    pub phone_number: Option<String>,
    pub zip_code: Option<String>,
    pub tag: Option<String>,
    pub country: Option<String>,
    pub gmt_id: Option<i64>,
    pub gmt_time: Option<i64>,
    pub postcode_policy_accepted: Option<bool>,
    pub style: Option<String>,
    pub version: Option<String>,
    pub company: Option<String>,
    pub udid: String,
}

/// Per-module detail resource listing its zones.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Directory {
    pub zones: Zones,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Zones {
    pub elements: Vec<ZoneElement>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneElement {
    pub description: ZoneDescription,
    pub zone: ZoneState,
    pub mode: Option<ZoneMode>,
}

impl ZoneElement {
    /// Key handed to the host's UUID generator.
    pub fn identity_key(&self) -> String {
        format!("{}_{}", self.zone.id, self.zone.parent_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneDescription {
    pub id: i64,
    pub name: Option<String>,
}

impl ZoneDescription {
    /// Zone label, empty when the controller reports none.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZoneState {
    pub id: i64,
    pub parent_id: i64,
    pub current_temperature: Option<f64>,
    pub set_temperature: Option<f64>,
    pub flags: ZoneFlags,
}

impl ZoneState {
    pub fn temperature(&self) -> Option<Temperature> {
        self.current_temperature.map(Temperature::from_tenths)
    }

    pub fn setpoint(&self) -> Option<Temperature> {
        self.set_temperature.map(Temperature::from_tenths)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZoneFlags {
    pub relay_state: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ZoneMode {
    pub id: i64,
    pub parent_id: i64,
    pub mode: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_parses_vendor_shape() {
        let body = serde_json::json!({
            "zones": {
                "elements": [{
                    "description": { "id": 11, "name": "Salon" },
                    "zone": {
                        "id": 5,
                        "parentId": 1,
                        "currentTemperature": 215,
                        "setTemperature": 220,
                        "flags": { "relayState": "on" }
                    },
                    "mode": { "id": 42, "parentId": 5, "mode": "timeLimit" }
                }]
            }
        });
        let dir: Directory = serde_json::from_value(body).unwrap();
        let element = &dir.zones.elements[0];
        assert_eq!(element.description.display_name(), "Salon");
        assert_eq!(element.zone.parent_id, 1);
        assert_eq!(element.zone.flags.relay_state.as_deref(), Some("on"));
        assert_eq!(element.mode.as_ref().unwrap().id, 42);
        assert_eq!(element.identity_key(), "5_1");
    }

    #[test]
    fn null_zone_name_reads_as_empty() {
        let body = serde_json::json!({
            "zones": {
                "elements": [
                    { "description": { "id": 11, "name": null }, "zone": { "id": 5, "parentId": 1 } },
                    { "description": { "id": 12, "name": "Kuchnia" }, "zone": { "id": 6, "parentId": 1 } }
                ]
            }
        });
        let dir: Directory = serde_json::from_value(body).unwrap();
        assert_eq!(dir.zones.elements.len(), 2);
        assert_eq!(dir.zones.elements[0].description.display_name(), "");
        assert_eq!(dir.zones.elements[1].description.display_name(), "Kuchnia");
    }

    #[test]
    fn null_temperature_is_none() {
        let zone: ZoneState =
            serde_json::from_value(serde_json::json!({"id": 2, "currentTemperature": null}))
                .unwrap();
        assert!(zone.temperature().is_none());
        assert!(zone.setpoint().is_none());
    }

    #[test]
    fn module_tolerates_missing_fields() {
        let module: Module =
            serde_json::from_value(serde_json::json!({"udid": "abc", "version": "1.2"})).unwrap();
        assert_eq!(module.udid, "abc");
        assert_eq!(module.version.as_deref(), Some("1.2"));
        assert!(module.company.is_none());
    }

    #[test]
    fn relay_state_mapping() {
        assert_eq!(HeatingCoolingState::from_relay_state("on"), HeatingCoolingState::Heat);
        assert_eq!(HeatingCoolingState::from_relay_state("off"), HeatingCoolingState::Off);
        assert_eq!(HeatingCoolingState::from_relay_state(""), HeatingCoolingState::Off);
    }

    #[test]
    fn writable_characteristics() {
        assert!(Characteristic::TargetTemperature.is_writable());
        assert!(!Characteristic::CurrentTemperature.is_writable());
        assert!(!Characteristic::CurrentHeatingCoolingState.is_writable());
    }
}
