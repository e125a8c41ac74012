use std::collections::HashMap;
use std::slice;
use std::sync::Arc;

use tracing::{debug, error, info};
use uuid::Uuid;

use crate::accessory::ThermostatAccessory;
use crate::cache::ResponseCache;
use crate::client::EmodulClient;
use crate::config::{ModuleFailurePolicy, PlatformConfig};
use crate::host::{Host, PlatformAccessory};
use crate::poller::Refresher;
use crate::scheduler::TaskHandle;
use crate::types::{Directory, Module, ZoneElement};
use crate::Result;

/// Discovers eModul zones and keeps one thermostat adapter per zone.
pub struct Platform<H: Host> {
    config: PlatformConfig,
    host: H,
    client: Arc<EmodulClient>,
    refresher: Refresher,
    accessories: Vec<PlatformAccessory>,
    adapters: Vec<ThermostatAccessory>,
    pollers: HashMap<String, TaskHandle>,
}

impl<H: Host> Platform<H> {
    pub fn new(config: PlatformConfig, host: H) -> Result<Self> {
        let client = Arc::new(config.client()?);
        Ok(Self::with_client(config, host, client))
    }

    pub fn with_client(config: PlatformConfig, host: H, client: Arc<EmodulClient>) -> Self {
        debug!(name = ?config.name, "finished initializing platform");
        let refresher = Refresher::new(client.clone(), ResponseCache::new());
        Self {
            config,
            host,
            client,
            refresher,
            accessories: Vec::new(),
            adapters: Vec::new(),
            pollers: HashMap::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn client(&self) -> &Arc<EmodulClient> {
        &self.client
    }

    pub fn cache(&self) -> &ResponseCache {
        self.refresher.cache()
    }

    /// Accessories known to the host, restored or registered by discovery.
    pub fn accessories(&self) -> &[PlatformAccessory] {
        &self.accessories
    }

    pub fn adapters(&self) -> &[ThermostatAccessory] {
        &self.adapters
    }

    pub fn adapter(&self, uuid: Uuid) -> Option<&ThermostatAccessory> {
        self.adapters.iter().find(|a| a.uuid() == uuid)
    }

    pub fn is_polling(&self, directory: &str) -> bool {
        self.pollers.get(directory).is_some_and(|h| !h.is_finished())
    }

    /// Host callback for an accessory restored from its cache at startup.
    pub fn configure_accessory(&mut self, accessory: PlatformAccessory) {
        info!(name = %accessory.display_name, "loading accessory from cache");
        self.accessories.push(accessory);
    }

    /// Log in, then discover. A failed login is logged and skips discovery.
    pub async fn launch(&mut self) {
        debug!("executed launch");
        if let Err(e) = self
            .client
            .authenticate(&self.config.login, &self.config.password)
            .await
        {
            error!(error = %e, "authentication error");
            return;
        }
        if let Err(e) = self.discover().await {
            error!(error = %e, "discover devices error");
        }
    }

    pub async fn discover(&mut self) -> Result<()> {
        let modules = self.client.modules().await?;
        for module in &modules {
            debug!(udid = %module.udid, version = ?module.version, "module discovered");
            if let Err(e) = self.process_module(module).await {
                match self.config.module_failure {
                    ModuleFailurePolicy::Continue => {
                        error!(udid = %module.udid, error = %e, "module discovery error");
                    }
                    ModuleFailurePolicy::Abort => return Err(e),
                }
            }
        }
        Ok(())
    }

    /// Cancel every poll task. Adapters keep answering from the last cached state.
    pub fn shutdown(&mut self) {
        for (directory, handle) in self.pollers.drain() {
            debug!(directory = %directory, "stopping poll");
            handle.cancel();
        }
    }

    async fn process_module(&mut self, module: &Module) -> Result<()> {
        let directory = self.client.directory_path(&module.udid)?;
        let listing: Directory = self.client.get(&directory).await?;

        self.ensure_polling(&directory);

        for element in listing.zones.elements {
            if element.description.display_name().is_empty() {
                continue;
            }
            self.bind_zone(element, &directory)?;
        }
        Ok(())
    }

    fn bind_zone(&mut self, element: ZoneElement, directory: &str) -> Result<()> {
        let uuid = self.host.generate_uuid(&element.identity_key());
        let name = element.description.display_name().to_string();
        debug!(
            name = %name,
            temperature = ?element.zone.temperature().map(|t| t.celsius()),
            setpoint = ?element.zone.setpoint().map(|t| t.celsius()),
            "element discovered"
        );

        let existing = self.accessories.iter_mut().find(|a| a.uuid == uuid);
        let (accessory, is_new) = match existing {
            Some(existing) => {
                info!(name = %name, "restoring accessory");
                if existing.context.device.is_none() {
                    existing.context.device = Some(element);
                }
                self.host.update_accessories(slice::from_ref(existing));
                (existing.clone(), false)
            }
            None => {
                info!(name = %name, %uuid, "adding new accessory");
                let mut accessory = PlatformAccessory::new(name, uuid);
                accessory.context.device = Some(element);
                (accessory, true)
            }
        };

        let adapter = ThermostatAccessory::new(accessory.clone(), self.refresher.clone(), directory)?
            .refresh_delay(self.config.refresh_delay());

        if is_new {
            self.host.register_accessories(slice::from_ref(&accessory));
            self.accessories.push(accessory);
        }

        match self.adapters.iter_mut().find(|a| a.uuid() == uuid) {
            Some(slot) => *slot = adapter,
            None => self.adapters.push(adapter),
        }
        Ok(())
    }

    fn ensure_polling(&mut self, directory: &str) {
        if self.is_polling(directory) {
            return;
        }
        let handle = self
            .refresher
            .start_polling(directory.to_string(), self.config.poll_interval());
        self.pollers.insert(directory.to_string(), handle);
    }
}
