use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::host::{DeviceAdapter, PlatformAccessory};
use crate::poller::Refresher;
use crate::protocol::{constant_temperature_data, find_zone, relay_state, DEFAULT_REFRESH_DELAY};
use crate::scheduler::TaskHandle;
use crate::types::*;
use crate::{Error, Result};

pub const MANUFACTURER: &str = "Tech-Sterowniki";
pub const MODEL: &str = "Unknown";

/// Reported when the zone is missing from the cache.
const DEFAULT_TEMPERATURE: f64 = 10.0;

const CHARACTERISTICS: &[Characteristic] = &[
    Characteristic::CurrentHeatingCoolingState,
    Characteristic::TargetHeatingCoolingState,
    Characteristic::CurrentTemperature,
    Characteristic::TargetTemperature,
    Characteristic::TemperatureDisplayUnits,
];

/// Thermostat view of one zone.
///
/// Reads go through the module's cached directory; the zone snapshot in the
/// accessory context is only used for identity and for the write payload.
#[derive(Clone)]
pub struct ThermostatAccessory {
    accessory: PlatformAccessory,
    device: ZoneElement,
    directory: String,
    refresher: Refresher,
    refresh_delay: Duration,
}

impl ThermostatAccessory {
    pub fn new(
        accessory: PlatformAccessory,
        refresher: Refresher,
        directory: impl Into<String>,
    ) -> Result<Self> {
        let device = accessory.context.device.clone().ok_or_else(|| {
            Error::Protocol(format!("accessory {} has no zone context", accessory.uuid))
        })?;
        Ok(Self {
            accessory,
            device,
            directory: directory.into(),
            refresher,
            refresh_delay: DEFAULT_REFRESH_DELAY,
        })
    }

    pub fn refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    pub fn uuid(&self) -> Uuid {
        self.accessory.uuid
    }

    pub fn accessory(&self) -> &PlatformAccessory {
        &self.accessory
    }

    pub fn name(&self) -> &str {
        self.device.description.display_name()
    }

    pub fn zone_id(&self) -> i64 {
        self.device.zone.id
    }

    pub fn directory(&self) -> &str {
        &self.directory
    }

    pub fn information(&self) -> AccessoryInformation {
        AccessoryInformation {
            manufacturer: MANUFACTURER.to_string(),
            model: MODEL.to_string(),
            serial_number: self.device.description.id.to_string(),
            name: self.device.description.display_name().to_string(),
        }
    }

    pub fn current_heating_cooling_state(&self) -> HeatingCoolingState {
        self.heating_state()
    }

    pub fn target_heating_cooling_state(&self) -> HeatingCoolingState {
        self.heating_state()
    }

    /// Accepted and logged; the zone's heating state is driven by the controller.
    pub fn set_target_heating_cooling_state(&self, state: HeatingCoolingState) {
        debug!(name = self.name(), ?state, "triggered SET TargetHeatingCoolingState");
    }

    pub fn current_temperature(&self) -> f64 {
        self.lookup("currentTemperature", |zone| zone.get("currentTemperature")?.as_f64())
            .map(|raw| Temperature::from_tenths(raw).celsius())
            .unwrap_or(DEFAULT_TEMPERATURE)
    }

    pub fn target_temperature(&self) -> f64 {
        self.lookup("setTemperature", |zone| zone.get("setTemperature")?.as_f64())
            .map(|raw| Temperature::from_tenths(raw).celsius())
            .unwrap_or(DEFAULT_TEMPERATURE)
    }

    /// Switch the zone to a constant setpoint of `value` degrees Celsius and
    /// schedule one refresh of the directory to pick up the acknowledged state.
    pub async fn set_target_temperature(&self, value: f64) -> Result<TaskHandle> {
        let mode_id = self
            .device
            .mode
            .as_ref()
            .map(|m| m.id)
            .ok_or_else(|| Error::Protocol(format!("zone {} has no mode", self.zone_id())))?;
        let target = Temperature::from_celsius(value);
        let body =
            constant_temperature_data(mode_id, self.device.zone.parent_id, target.to_tenths());

        self.refresher
            .client()
            .set_zone_mode(&self.directory, &body)
            .await?;
        info!(name = self.name(), %target, "set temperature success");

        Ok(self
            .refresher
            .refresh_after(self.directory.clone(), self.refresh_delay))
    }

    pub fn temperature_display_units(&self) -> TemperatureDisplayUnits {
        TemperatureDisplayUnits::Celsius
    }

    pub fn set_temperature_display_units(&self, units: TemperatureDisplayUnits) {
        debug!(name = self.name(), ?units, "triggered SET TemperatureDisplayUnits");
    }

    fn heating_state(&self) -> HeatingCoolingState {
        self.lookup("currentTemperature", |zone| {
            Some(HeatingCoolingState::from_relay_state(relay_state(zone).unwrap_or_default()))
        })
        .unwrap_or(HeatingCoolingState::Off)
    }

    fn lookup<T>(&self, field: &str, read: impl FnOnce(&Value) -> Option<T>) -> Option<T> {
        let payload = self.refresher.cache().get(&self.directory)?;
        let zone = find_zone(&payload, self.device.zone.id, field)?;
        read(zone)
    }
}

impl DeviceAdapter for ThermostatAccessory {
    fn characteristics(&self) -> &'static [Characteristic] {
        CHARACTERISTICS
    }

    fn get(&self, characteristic: Characteristic) -> CharacteristicValue {
        match characteristic {
            Characteristic::CurrentHeatingCoolingState => {
                CharacteristicValue::State(self.current_heating_cooling_state())
            }
            Characteristic::TargetHeatingCoolingState => {
                CharacteristicValue::State(self.target_heating_cooling_state())
            }
            Characteristic::CurrentTemperature => {
                CharacteristicValue::Temperature(self.current_temperature())
            }
            Characteristic::TargetTemperature => {
                CharacteristicValue::Temperature(self.target_temperature())
            }
            Characteristic::TemperatureDisplayUnits => {
                CharacteristicValue::Units(self.temperature_display_units())
            }
        }
    }

    async fn set(&self, characteristic: Characteristic, value: CharacteristicValue) -> Result<()> {
        match (characteristic, value) {
            (Characteristic::TargetHeatingCoolingState, CharacteristicValue::State(state)) => {
                self.set_target_heating_cooling_state(state);
            }
            (Characteristic::TargetTemperature, CharacteristicValue::Temperature(t)) => {
                if let Err(e) = self.set_target_temperature(t).await {
                    error!(name = self.name(), error = %e, "set temperature error");
                }
            }
            (Characteristic::TemperatureDisplayUnits, CharacteristicValue::Units(units)) => {
                self.set_temperature_display_units(units);
            }
            (c, _) if !c.is_writable() => return Err(Error::ReadOnlyCharacteristic(c)),
            (c, _) => return Err(Error::InvalidValue(c)),
        }
        Ok(())
    }
}
