//! Application configuration.
//!
//! Values come from three layers, later ones winning: built-in defaults,
//! an optional YAML file, then command-line flags (applied by the binary).
//!
//! ```yaml
//! root: graphs            # relative to this file
//! families: families.yml  # optional, defaults to .FAMILIES.* under root
//! title: Dashboard
//! keep: 0.2
//! raw: false
//! headless: false
//! ```

use crate::load::find_default_families_file;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_norway::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Keys accepted in a configuration file
const KNOWN_KEYS: &[&str] = &[
    "root",
    "families",
    "title",
    "subtitle",
    "placeholder",
    "header",
    "footer",
    "show_family_numbers",
    "showfamilynumbers",
    "show_graph_numbers",
    "showgraphnumbers",
    "theme",
    "keep",
    "logfile",
    "raw",
    "verbose",
    "debug",
    "headless",
    "port",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Data root holding the records
    pub root: PathBuf,
    /// Families file; `None` means look for `.FAMILIES.*` under the root
    pub families: Option<PathBuf>,
    pub title: String,
    pub subtitle: String,
    pub placeholder: String,
    pub header: String,
    pub footer: String,
    #[serde(alias = "showfamilynumbers")]
    pub show_family_numbers: bool,
    #[serde(alias = "showgraphnumbers")]
    pub show_graph_numbers: bool,
    pub theme: String,
    /// Share of distinct words kept as autocomplete tags
    pub keep: f64,
    pub logfile: PathBuf,
    /// Index every image under the root instead of reading records
    pub raw: bool,
    pub verbose: bool,
    pub debug: bool,
    /// Only count matches, never build result bodies
    pub headless: bool,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            root: PathBuf::from("default_graph_dir"),
            families: None,
            title: "Default title".to_string(),
            subtitle: "Default subtitle".to_string(),
            placeholder: "Free text and #keywords".to_string(),
            header: String::new(),
            footer: String::new(),
            show_family_numbers: true,
            show_graph_numbers: true,
            theme: "dark".to_string(),
            keep: 0.20,
            logfile: PathBuf::from("webapp.log"),
            raw: false,
            verbose: false,
            debug: false,
            headless: false,
            port: 5555,
        }
    }
}

impl Config {
    /// Load a configuration file over the defaults.
    ///
    /// A missing or unreadable file, or one that is not a YAML mapping, is a
    /// warning and yields the defaults. Relative `root` and `families` are
    /// resolved against the file's directory.
    pub fn load(path: &Path) -> Self {
        info!(file = %path.display(), "loading configuration");

        if !path.is_file() {
            warn!(file = %path.display(), "configuration file does not exist");
            return Self::default();
        }

        let mut config = match Self::from_file(path) {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %format!("{:#}", err), "using default configuration");
                return Self::default();
            }
        };

        let base = path.parent().unwrap_or(Path::new(""));
        config.root = resolve(base, &config.root);
        config.families = config.families.map(|families| resolve(base, &families));
        config
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid configuration {}", path.display()))
    }

    /// Parse a YAML mapping; unknown keys are reported and ignored
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let document: Value = serde_norway::from_str(yaml).context("YAML parsing failed")?;

        let mapping = match document {
            Value::Mapping(mapping) => mapping,
            Value::Null => Mapping::new(),
            _ => bail!("document is not a YAML dict"),
        };

        let known: Mapping = mapping
            .into_iter()
            .filter(|(key, _)| {
                let is_known = key.as_str().is_some_and(|key| KNOWN_KEYS.contains(&key));
                if !is_known {
                    warn!(key = ?key, known = ?KNOWN_KEYS, "unknown configuration key ignored");
                }
                is_known
            })
            .collect();

        let config: Config = serde_norway::from_value(Value::Mapping(known))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.keep) {
            bail!("keep must be within [0, 1], got {}", self.keep);
        }
        Ok(())
    }

    /// Configured families file, else the default one under the root
    pub fn families_file(&self) -> Option<PathBuf> {
        self.families
            .clone()
            .or_else(|| find_default_families_file(&self.root))
    }

    /// Write this configuration as YAML. An existing file is left untouched.
    pub fn export(&self, path: &Path) -> Result<()> {
        if path.is_file() {
            warn!(file = %path.display(), "file exists, skipping export");
            return Ok(());
        }

        let yaml = serde_norway::to_string(self).context("Failed to serialize configuration")?;
        fs::write(path, yaml).with_context(|| format!("Failed to write {}", path.display()))?;

        info!(file = %path.display(), "configuration file created");
        Ok(())
    }
}

fn resolve(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
