use std::sync::Arc;
use std::time::Duration;

use tracing::{error, trace};

use crate::cache::ResponseCache;
use crate::client::EmodulClient;
use crate::scheduler::{spawn_delayed, spawn_repeating, TaskHandle};

/// Fetches module directories into the shared [`ResponseCache`].
#[derive(Clone)]
pub struct Refresher {
    client: Arc<EmodulClient>,
    cache: ResponseCache,
}

impl Refresher {
    pub fn new(client: Arc<EmodulClient>, cache: ResponseCache) -> Self {
        Self { client, cache }
    }

    pub fn client(&self) -> &Arc<EmodulClient> {
        &self.client
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// GET `path` and replace its cache entry. Failures are logged and the
    /// previous entry stays in place.
    pub async fn refresh(&self, path: &str) {
        match self.client.get_json(path).await {
            Ok(body) => {
                trace!(path, "refreshed");
                self.cache.store(path, body);
            }
            Err(e) => error!(path, error = %e, "refresh data error"),
        }
    }

    /// Refresh now, then every `period` until the handle is cancelled.
    pub fn start_polling(&self, path: String, period: Duration) -> TaskHandle {
        let refresher = self.clone();
        spawn_repeating(period, move || {
            let refresher = refresher.clone();
            let path = path.clone();
            async move { refresher.refresh(&path).await }
        })
    }

    /// One refresh after `delay`.
    pub fn refresh_after(&self, path: String, delay: Duration) -> TaskHandle {
        let refresher = self.clone();
        spawn_delayed(delay, async move { refresher.refresh(&path).await })
    }
}
