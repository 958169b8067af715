//! Configuration loading and root folder resolution
//!
//! Root folder resolution follows a fixed priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`RANKPOLL_ROOT_FOLDER`)
//! 3. TOML config file (`root_folder` key)
//! 4. OS-dependent compiled default (fallback)

use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Compiled-in defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        let root_folder = if cfg!(target_os = "linux") {
            // ~/.local/share/rankpoll (or /var/lib/rankpoll for system-wide)
            dirs::data_local_dir()
                .map(|d| d.join("rankpoll"))
                .unwrap_or_else(|| PathBuf::from("/var/lib/rankpoll"))
        } else if cfg!(target_os = "macos") {
            dirs::data_dir()
                .map(|d| d.join("rankpoll"))
                .unwrap_or_else(|| PathBuf::from("/Library/Application Support/rankpoll"))
        } else if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .map(|d| d.join("rankpoll"))
                .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\rankpoll"))
        } else {
            PathBuf::from("./rankpoll_data")
        };

        Self {
            root_folder,
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

/// Logging configuration from the TOML file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// One catalog item as declared in the TOML `[[survey.items]]` tables
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyItemToml {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Optional `[survey]` section overriding the compiled-in catalog
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurveySection {
    /// How many items a respondent must select (K)
    #[serde(default)]
    pub max_selections: Option<usize>,
    /// Replacement catalog; omitted means the compiled-in default
    #[serde(default)]
    pub items: Option<Vec<SurveyItemToml>>,
}

/// Parsed TOML configuration file
///
/// All fields are optional; a missing or unreadable file yields the default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub root_folder: Option<PathBuf>,
    #[serde(default)]
    pub listen_port: Option<u16>,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
    #[serde(default)]
    pub results_password: Option<String>,
    #[serde(default)]
    pub admin_password: Option<String>,
    #[serde(default)]
    pub admin_email: Option<String>,
    #[serde(default)]
    pub survey: Option<SurveySection>,
}

impl TomlConfig {
    /// Load the configuration file for the current platform.
    ///
    /// A missing file is not an error; it yields the all-default config so
    /// the service can start with zero configuration.
    pub fn load() -> Self {
        match config_file_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => TomlConfig::default(),
        }
    }

    /// Load and parse a specific TOML file, falling back to defaults on error
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str::<TomlConfig>(&content) {
                Ok(config) => {
                    info!("Loaded config file: {}", path.display());
                    config
                }
                Err(e) => {
                    warn!("Failed to parse config file {}: {}", path.display(), e);
                    TomlConfig::default()
                }
            },
            Err(e) => {
                warn!("Failed to read config file {}: {}", path.display(), e);
                TomlConfig::default()
            }
        }
    }
}

/// Platform-dependent path of the configuration file
fn config_file_path() -> Option<PathBuf> {
    if cfg!(target_os = "linux") {
        // ~/.config/rankpoll/config.toml first, then /etc/rankpoll/config.toml
        if let Some(user_config) = dirs::config_dir().map(|d| d.join("rankpoll").join("config.toml"))
        {
            if user_config.exists() {
                return Some(user_config);
            }
        }
        let system_config = PathBuf::from("/etc/rankpoll/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
        None
    } else {
        dirs::config_dir().map(|d| d.join("rankpoll").join("config.toml"))
    }
}

/// Resolves the service root folder from the four configuration tiers
#[derive(Debug)]
pub struct RootFolderResolver {
    cli_arg: Option<PathBuf>,
    toml_config: TomlConfig,
}

impl RootFolderResolver {
    pub fn new(cli_arg: Option<&str>, toml_config: &TomlConfig) -> Self {
        Self {
            cli_arg: cli_arg.map(PathBuf::from),
            toml_config: toml_config.clone(),
        }
    }

    /// Resolve the root folder using the priority order documented above
    pub fn resolve(&self) -> PathBuf {
        // Priority 1: Command-line argument
        if let Some(path) = &self.cli_arg {
            return path.clone();
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var("RANKPOLL_ROOT_FOLDER") {
            return PathBuf::from(path);
        }

        // Priority 3: TOML config file
        if let Some(path) = &self.toml_config.root_folder {
            return path.clone();
        }

        // Priority 4: OS-dependent compiled default
        CompiledDefaults::for_current_platform().root_folder
    }
}

/// Prepares the resolved root folder for use
#[derive(Debug)]
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder directory tree if it does not exist yet
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root_folder.exists() {
            std::fs::create_dir_all(&self.root_folder)?;
            info!("Created root folder: {}", self.root_folder.display());
        }
        Ok(())
    }

    /// Path of the SQLite database inside the root folder
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join("rankpoll.db")
    }
}
