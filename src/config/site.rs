//! Site configuration: e-paper and ETA settings edited from the management page
//!
//! Stored as a flat JSON object. Only a fixed set of keys is accepted.

use serde::Serialize;
use serde_json::{Map, Value};
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::forms::EpaperSettings;

/// Keys a site configuration may hold
pub const KEYS: [&str; 5] = ["epd_brand", "epd_model", "eta_locale", "dry_run", "degree"];

#[derive(Debug, Error)]
pub enum SiteConfigError {
    #[error("unknown configuration key(s): {}", .0.join(", "))]
    UnknownKey(Vec<String>),
    #[error("configuration must be a JSON object")]
    NotAnObject,
    #[error("configuration I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("configuration is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct SiteConfiguration {
    path: PathBuf,
    data: Map<String, Value>,
}

impl SiteConfiguration {
    /// Load from `path`; a missing file yields an empty configuration
    pub fn load(path: &Path) -> Result<Self, SiteConfigError> {
        let data = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            match serde_json::from_str::<Value>(&content)? {
                Value::Object(map) => map,
                _ => return Err(SiteConfigError::NotAnObject),
            }
        } else {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            Map::new()
        };

        tracing::debug!(
            "Loaded site configuration from {} ({} keys)",
            path.display(),
            data.len()
        );
        Ok(Self {
            path: path.to_path_buf(),
            data,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.data.iter()
    }

    pub fn epd_brand(&self) -> Option<&str> {
        self.get("epd_brand").and_then(Value::as_str)
    }

    pub fn epd_model(&self) -> Option<&str> {
        self.get("epd_model").and_then(Value::as_str)
    }

    pub fn dry_run(&self) -> bool {
        self.get("dry_run").and_then(Value::as_bool).unwrap_or(false)
    }

    /// Set one key and persist
    pub fn update(&mut self, key: &str, value: Value) -> Result<(), SiteConfigError> {
        if !KEYS.contains(&key) {
            return Err(SiteConfigError::UnknownKey(vec![key.to_string()]));
        }

        self.data.insert(key.to_string(), value);
        self.persist()
    }

    /// Merge `mapping` and persist. Nothing is written if any key is unknown.
    pub fn updates(&mut self, mapping: Map<String, Value>) -> Result<(), SiteConfigError> {
        let unknown: Vec<String> = mapping
            .keys()
            .filter(|k| !KEYS.contains(&k.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            return Err(SiteConfigError::UnknownKey(unknown));
        }

        self.data.extend(mapping);
        self.persist()
    }

    /// Every key is present and non-null
    pub fn is_configured(&self) -> bool {
        !self.data.is_empty()
            && KEYS
                .iter()
                .all(|k| self.data.get(*k).is_some_and(|v| !v.is_null()))
    }

    /// Store validated e-paper settings.
    ///
    /// Returns true when the brand or model changed, which invalidates
    /// existing refresh schedules.
    pub fn apply_settings(&mut self, settings: &EpaperSettings) -> Result<bool, SiteConfigError> {
        let display_changed = self.epd_brand() != Some(settings.epd_brand.as_str())
            || self.epd_model() != Some(settings.epd_model.as_str());

        match serde_json::to_value(settings)? {
            Value::Object(map) => self.updates(map)?,
            _ => return Err(SiteConfigError::NotAnObject),
        }

        if display_changed {
            tracing::info!(
                "E-paper display changed to {} {}",
                settings.epd_brand,
                settings.epd_model
            );
        }
        Ok(display_changed)
    }

    /// Pretty JSON for download
    pub fn export(&self) -> Result<String, SiteConfigError> {
        Ok(to_pretty_json(&self.data)?)
    }

    /// Merge an exported configuration back in
    pub fn import<R: Read>(&mut self, reader: R) -> Result<(), SiteConfigError> {
        match serde_json::from_reader::<_, Value>(reader)? {
            Value::Object(map) => self.updates(map),
            _ => Err(SiteConfigError::NotAnObject),
        }
    }

    fn persist(&self) -> Result<(), SiteConfigError> {
        std::fs::write(&self.path, to_pretty_json(&self.data)?)?;
        tracing::debug!("Site configuration saved to {}", self.path.display());
        Ok(())
    }
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut ser)?;
    // serde_json only ever writes valid UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
