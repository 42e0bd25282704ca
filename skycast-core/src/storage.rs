//! Durable key/value storage for the last searched city and the
//! recent-searches list.
//!
//! Two string-valued keys backed by small files in the platform data
//! directory: `last_city` holds a plain string, `recent_searches.json` a
//! JSON-encoded ordered list (most recent first, max 5 by the search flow).

use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use std::{fs, path::PathBuf};

const LAST_CITY_FILE: &str = "last_city";
const RECENT_SEARCHES_FILE: &str = "recent_searches.json";

#[derive(Debug, Clone)]
pub struct LocalStore {
    dir: PathBuf,
}

impl LocalStore {
    /// Open the store in the platform data directory, creating it if needed.
    pub fn open() -> Result<Self> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

        Self::at(dirs.data_dir().to_path_buf())
    }

    /// Open the store rooted at an explicit directory (used by tests).
    pub fn at(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;

        Ok(Self { dir })
    }

    /// Last successfully searched city, if one was persisted. Unreadable or
    /// empty entries count as absent.
    pub fn last_city(&self) -> Option<String> {
        let raw = fs::read_to_string(self.dir.join(LAST_CITY_FILE)).ok()?;
        let city = raw.trim();
        if city.is_empty() { None } else { Some(city.to_string()) }
    }

    pub fn set_last_city(&self, city: &str) -> Result<()> {
        let path = self.dir.join(LAST_CITY_FILE);
        fs::write(&path, city)
            .with_context(|| format!("Failed to write last city to {}", path.display()))
    }

    pub fn clear_last_city(&self) -> Result<()> {
        let path = self.dir.join(LAST_CITY_FILE);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("Failed to remove last city at {}", path.display()))
            }
        }
    }

    /// Persisted recent-search list, most recent first. Missing or corrupt
    /// data degrades to an empty list.
    pub fn recent_searches(&self) -> Vec<String> {
        let Ok(raw) = fs::read_to_string(self.dir.join(RECENT_SEARCHES_FILE)) else {
            return Vec::new();
        };

        serde_json::from_str(&raw).unwrap_or_default()
    }

    pub fn set_recent_searches(&self, searches: &[String]) -> Result<()> {
        let path = self.dir.join(RECENT_SEARCHES_FILE);
        let json =
            serde_json::to_string(searches).context("Failed to encode recent searches")?;

        fs::write(&path, json)
            .with_context(|| format!("Failed to write recent searches to {}", path.display()))
    }

    pub fn clear_recent_searches(&self) -> Result<()> {
        let path = self.dir.join(RECENT_SEARCHES_FILE);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove recent searches at {}", path.display())),
        }
    }
}
