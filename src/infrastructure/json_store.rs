use crate::domain::entities::alert::AlertRecord;
use crate::domain::error::DomainError;
use crate::domain::ports::alert_store::{AlertFilter, AlertStore};
use chrono::NaiveDate;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Alert store backed by a single JSON file holding a list of alerts.
///
/// A missing file reads as an empty list. Appends rewrite the list into a
/// sibling temp file and rename it over the original, so a failed write
/// leaves the previous list intact.
pub struct JsonFileAlertStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileAlertStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<AlertRecord>, DomainError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(DomainError::Store(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|e| {
            DomainError::Store(format!("Corrupt alert file {}: {e}", self.path.display()))
        })
    }

    fn save(&self, alerts: &[AlertRecord]) -> Result<(), DomainError> {
        let body = serde_json::to_string_pretty(alerts)
            .map_err(|e| DomainError::Store(format!("Failed to encode alerts: {e}")))?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| {
                DomainError::Store(format!("Failed to create {}: {e}", dir.display()))
            })?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let write = || -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(body.as_bytes())?;
            file.sync_all()?;
            fs::rename(&tmp, &self.path)
        };
        write().map_err(|e| {
            let _ = fs::remove_file(&tmp);
            DomainError::Store(format!("Failed to write {}: {e}", self.path.display()))
        })
    }
}

impl AlertStore for JsonFileAlertStore {
    fn append(&self, alert: &AlertRecord) -> Result<(), DomainError> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|e| DomainError::Store(e.to_string()))?;
        let mut alerts = self.load()?;
        alerts.push(alert.clone());
        self.save(&alerts)?;
        tracing::debug!(path = %self.path.display(), total = alerts.len(), "alert appended");
        Ok(())
    }

    fn query_day(&self, city: &str, day: NaiveDate) -> Result<Vec<AlertRecord>, DomainError> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|a| same_city(&a.city, city) && a.generated_at.date() == day)
            .collect())
    }

    fn list(&self, filter: &AlertFilter) -> Result<Vec<AlertRecord>, DomainError> {
        let mut alerts: Vec<AlertRecord> = self
            .load()?
            .into_iter()
            .rev()
            .filter(|a| filter.city.as_deref().map_or(true, |c| same_city(&a.city, c)))
            .filter(|a| filter.since.map_or(true, |d| a.generated_at.date() >= d))
            .collect();
        if let Some(limit) = filter.limit {
            alerts.truncate(limit);
        }
        Ok(alerts)
    }
}

fn same_city(stored: &str, requested: &str) -> bool {
    stored.trim().eq_ignore_ascii_case(requested.trim())
}
