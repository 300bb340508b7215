//! Layered configuration and path helpers.
//!
//! Uses Figment to merge built-in defaults + `config.toml` +
//! `config.<env>.toml` + an optional explicit file + `MEDLIST_*` env vars.
//! Relative paths are resolved against the directory of the explicit file,
//! or the working directory when there is none.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::extract::MarkerSpec;
use crate::types::StemLanguage;

/// Tantivy refuses writer budgets below this per indexing thread.
pub const MIN_WRITER_MEMORY_BYTES: usize = 15_000_000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data: DataSettings,
    pub extraction: ExtractionSettings,
    pub fetch: FetchSettings,
    pub index: IndexSettings,
    pub search: SearchSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    pub registry_xml: PathBuf,
    pub export_csv: PathBuf,
    pub index_dir: PathBuf,
    pub downloads_dir: PathBuf,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            registry_xml: PathBuf::from("resources/rejestr_produktow_leczniczych.xml"),
            export_csv: PathBuf::from("medications.csv"),
            index_dir: PathBuf::from("indexdir"),
            downloads_dir: PathBuf::from("downloads"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    pub start_marker: String,
    pub end_marker: String,
    pub min_length: usize,
    /// `rodzajPreparatu` value of products whose leaflets are processed.
    pub human_kind: String,
    /// Emit the other products too, always with an empty description.
    pub include_non_human: bool,
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            start_marker: "w jakim celu się go stosuje".to_string(),
            end_marker: "Informacje ważne przed".to_string(),
            min_length: 20,
            human_kind: "ludzki".to_string(),
            include_non_human: false,
        }
    }
}

impl ExtractionSettings {
    pub fn markers(&self) -> MarkerSpec {
        MarkerSpec::new(self.start_marker.clone(), self.end_marker.clone(), self.min_length)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self { timeout_secs: 10, user_agent: concat!("medlist/", env!("CARGO_PKG_VERSION")).to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    pub language: StemLanguage,
    pub writer_memory_bytes: usize,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self { language: StemLanguage::English, writer_memory_bytes: 50_000_000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self { default_limit: 10, max_limit: 100 }
    }
}

impl SearchSettings {
    /// Caps a requested limit at `max_limit`, defaulting when absent. Zero is
    /// kept so the query returns nothing.
    pub fn effective_limit(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_limit).min(self.max_limit)
    }
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if !self.extraction.markers().is_usable() {
            return Err(Error::InvalidConfig("extraction markers must not be empty".into()));
        }
        if self.search.max_limit == 0 {
            return Err(Error::InvalidConfig("search.max_limit must be at least 1".into()));
        }
        if self.search.default_limit > self.search.max_limit {
            return Err(Error::InvalidConfig(format!(
                "search.default_limit {} exceeds search.max_limit {}",
                self.search.default_limit, self.search.max_limit
            )));
        }
        if self.index.writer_memory_bytes < MIN_WRITER_MEMORY_BYTES {
            return Err(Error::InvalidConfig(format!(
                "index.writer_memory_bytes must be at least {MIN_WRITER_MEMORY_BYTES}"
            )));
        }
        Ok(())
    }
}

pub struct Config {
    figment: Figment,
    base_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Loads the layered configuration; `explicit` is merged after the
    /// environment-specific file and before environment variables.
    pub fn load_from(explicit: Option<&Path>) -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        let base_dir = match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(Error::InvalidConfig(format!("config file {} not found", path.display())));
                }
                figment = figment.merge(Toml::file(path));
                path.parent().map(Path::to_path_buf).unwrap_or_default()
            }
            None => PathBuf::from("."),
        };
        figment = figment.merge(Env::prefixed("MEDLIST_").split("__"));

        Ok(Self { figment, base_dir })
    }

    /// Wraps an already assembled figment. Defaults are layered underneath.
    pub fn from_figment(figment: Figment, base_dir: impl Into<PathBuf>) -> Self {
        let figment = Figment::from(Serialized::defaults(Settings::default())).merge(figment);
        Self { figment, base_dir: base_dir.into() }
    }

    pub fn get<T>(&self, key: &str) -> Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| Error::InvalidConfig(format!("Failed to get '{}': {}", key, e)))
    }

    /// Typed, validated settings with every data path resolved.
    pub fn settings(&self) -> Result<Settings> {
        let mut settings: Settings = self
            .figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        settings.validate()?;
        let data = &mut settings.data;
        for path in [&mut data.registry_xml, &mut data.export_csv, &mut data.index_dir, &mut data.downloads_dir] {
            let raw = path.to_string_lossy().into_owned();
            *path = resolve_with_base(&self.base_dir, raw);
        }
        Ok(settings)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
