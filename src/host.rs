//! Seams towards the home-automation host.
//!
//! The host owns the accessory object model and persists accessories between
//! runs. This crate only needs to mint identities, register new accessories,
//! re-link restored ones, and answer characteristic reads and writes.

use std::future::Future;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Characteristic, CharacteristicValue, ZoneElement};
use crate::Result;

/// Data the host persists alongside an accessory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessoryContext {
    /// Zone snapshot captured when the accessory was created.
    pub device: Option<ZoneElement>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformAccessory {
    pub uuid: Uuid,
    pub display_name: String,
    pub context: AccessoryContext,
}

impl PlatformAccessory {
    pub fn new(display_name: impl Into<String>, uuid: Uuid) -> Self {
        Self {
            uuid,
            display_name: display_name.into(),
            context: AccessoryContext::default(),
        }
    }
}

pub trait Host: Send + Sync {
    /// Deterministic identity for a string key. Hosts with their own scheme
    /// override this.
    fn generate_uuid(&self, key: &str) -> Uuid {
        Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes())
    }

    fn register_accessories(&self, accessories: &[PlatformAccessory]);

    fn update_accessories(&self, accessories: &[PlatformAccessory]);
}

/// A device whose characteristics the host can read and write.
pub trait DeviceAdapter: Send + Sync {
    fn characteristics(&self) -> &'static [Characteristic];

    fn get(&self, characteristic: Characteristic) -> CharacteristicValue;

    fn set(
        &self,
        characteristic: Characteristic,
        value: CharacteristicValue,
    ) -> impl Future<Output = Result<()>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullHost;

    impl Host for NullHost {
        fn register_accessories(&self, _accessories: &[PlatformAccessory]) {}
        fn update_accessories(&self, _accessories: &[PlatformAccessory]) {}
    }

    #[test]
    fn default_uuid_is_stable() {
        let host = NullHost;
        assert_eq!(host.generate_uuid("5_1"), host.generate_uuid("5_1"));
        assert_ne!(host.generate_uuid("5_1"), host.generate_uuid("1_5"));
    }

    #[test]
    fn context_survives_serde() {
        let mut accessory = PlatformAccessory::new("Salon", Uuid::nil());
        accessory.context.device = Some(ZoneElement::default());
        let json = serde_json::to_value(&accessory).unwrap();
        let back: PlatformAccessory = serde_json::from_value(json).unwrap();
        assert_eq!(back, accessory);
    }
}
