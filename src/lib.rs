mod accessory;
mod cache;
mod client;
mod config;
mod diff;
mod error;
mod host;
mod logger;
mod platform;
mod poller;
mod protocol;
mod scheduler;
mod types;

pub use accessory::{ThermostatAccessory, MANUFACTURER, MODEL};
pub use cache::ResponseCache;
pub use client::{EmodulClient, EmodulClientBuilder};
pub use config::{MessageLogConfig, ModuleFailurePolicy, PlatformConfig};
pub use error::{Error, Result};
pub use host::{AccessoryContext, DeviceAdapter, Host, PlatformAccessory};
pub use logger::MessageLogMode;
pub use platform::Platform;
pub use poller::Refresher;
pub use protocol::{DEFAULT_API_URL, DEFAULT_POLL_INTERVAL, DEFAULT_REFRESH_DELAY};
pub use scheduler::{spawn_delayed, spawn_repeating, TaskHandle};
pub use types::*;
