use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;

use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::diff::diff_json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLogMode {
    #[default]
    Full,
    Diffed,
}

/// NDJSON trace of API traffic.
///
/// In `Diffed` mode the first response per path is written in full and
/// later responses only carry the changed leaves.
pub(crate) struct MessageLogger {
    mode: MessageLogMode,
    file: File,
    previous: HashMap<String, Value>,
}

impl MessageLogger {
    pub fn new(mode: MessageLogMode, path: &str) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            mode,
            file,
            previous: HashMap::new(),
        })
    }

    pub fn log_request(&mut self, method: &str, path: &str) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "req",
            "method": method,
            "path": path,
        });
        self.write_line(&entry);
    }

    pub fn log_command(&mut self, path: &str, body: &Value) {
        let entry = json!({
            "ts": Utc::now().to_rfc3339(),
            "dir": "cmd",
            "path": path,
            "body": body,
        });
        self.write_line(&entry);
    }

    pub fn log_response(&mut self, path: &str, status: u16, body: &Value) {
        let ts = Utc::now().to_rfc3339();
        let entry = match (self.mode, self.previous.get(path)) {
            (MessageLogMode::Diffed, Some(prev)) => {
                let mut changes = Vec::new();
                diff_json(prev, body, "", &mut changes);
                let changes: Vec<Value> = changes
                    .into_iter()
                    .map(|c| json!({ "path": c.path, "old": c.old, "new": c.new }))
                    .collect();
                json!({
                    "ts": ts,
                    "dir": "resp",
                    "path": path,
                    "status": status,
                    "changes": changes,
                })
            }
            (MessageLogMode::Diffed, None) => json!({
                "ts": ts,
                "dir": "resp",
                "path": path,
                "status": status,
                "full": true,
                "body": body,
            }),
            (MessageLogMode::Full, _) => json!({
                "ts": ts,
                "dir": "resp",
                "path": path,
                "status": status,
                "body": body,
            }),
        };
        self.write_line(&entry);

        if self.mode == MessageLogMode::Diffed {
            self.previous.insert(path.to_string(), body.clone());
        }
    }

    fn write_line(&mut self, entry: &Value) {
        if let Ok(line) = serde_json::to_string(entry)
            && let Err(e) = writeln!(self.file, "{line}")
        {
            warn!("failed to write log entry: {e}");
        }
    }
}
