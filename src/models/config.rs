use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::utils::path::{get_config_path, get_database_path};

/// Applikationsinställningar som läses från `settings.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database_path: PathBuf,
    /// trace, debug, info, warn eller error
    pub log_level: String,
    /// Avvisa uppdateringar som gör en person till sin egen förfader
    pub reject_ancestry_cycles: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: get_database_path(),
            log_level: "info".to_string(),
            reject_ancestry_cycles: true,
        }
    }
}

impl Settings {
    /// Ladda från standardplatsen, eller defaults om filen saknas eller är trasig
    pub fn load() -> Self {
        let config_path = get_config_path();
        match Self::load_from(&config_path) {
            Ok(settings) => settings,
            Err(e) => {
                if config_path.exists() {
                    tracing::warn!("Kunde inte läsa {:?}: {:#}", config_path, e);
                }
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Kunde inte läsa {}", path.display()))?;
        let settings = toml::from_str(&content)
            .with_context(|| format!("Ogiltig TOML i {}", path.display()))?;
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn tracing_level(&self) -> tracing::Level {
        self.log_level
            .parse()
            .unwrap_or(tracing::Level::INFO)
    }
}
