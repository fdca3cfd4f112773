//! Configuration loading and validation.
//!
//! The route table and tuning knobs are read once at startup from the
//! built-in defaults, an optional config file, and per-route environment
//! overrides, then validated. Submodules provide the data model and the
//! validation logic.

pub mod model;
pub mod validation;

use std::path::{Path, PathBuf};

use crate::error::GatewayError;
use model::Config;

/// File names probed in the working directory when no path is given.
pub const AUTO_DETECT_CANDIDATES: &[&str] = &[
    "gateway.yaml",
    "gateway.yml",
    "gateway.json",
    "gateway.toml",
];

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOrigin {
    Defaults,
    File(PathBuf),
}

impl std::fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Defaults => f.write_str("defaults"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Parse a config string based on file extension.
pub fn parse_config_str(
    ext: &str,
    content: &str,
    path_display: &str,
) -> Result<Config, GatewayError> {
    match ext {
        #[cfg(feature = "yaml")]
        "yaml" | "yml" => serde_yml::from_str(content).map_err(|e| GatewayError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "json")]
        "json" => serde_json::from_str(content).map_err(|e| GatewayError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        #[cfg(feature = "toml")]
        "toml" => toml::from_str(content).map_err(|e| GatewayError::ConfigParse {
            path: path_display.to_string(),
            source: Box::new(e),
        }),

        other => Err(GatewayError::UnsupportedFormat(other.to_string())),
    }
}

/// Read and parse a config file. Does not validate.
pub async fn load_file(path: &Path) -> Result<Config, GatewayError> {
    let content = tokio::fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            GatewayError::ConfigFileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            GatewayError::Io(e)
        }
    })?;

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    parse_config_str(ext, &content, &path.display().to_string())
}

/// Resolve the startup configuration.
///
/// An explicit path must exist. Without one, the working directory is
/// probed for [`AUTO_DETECT_CANDIDATES`] and the built-in defaults are used
/// when none is found. Environment overrides are applied through `lookup`
/// and the result is validated.
pub async fn resolve<F>(
    explicit: Option<&Path>,
    lookup: F,
) -> Result<(Config, ConfigOrigin), GatewayError>
where
    F: Fn(&str) -> Option<String>,
{
    let (mut config, origin) = match explicit {
        Some(path) => (load_file(path).await?, ConfigOrigin::File(path.to_path_buf())),
        None => match auto_detect().await {
            Some(path) => {
                tracing::info!(path = %path.display(), "auto-detected config file");
                (load_file(&path).await?, ConfigOrigin::File(path))
            }
            None => (Config::default(), ConfigOrigin::Defaults),
        },
    };

    config.apply_env_overrides(lookup);

    if let Err(errors) = validation::validate(&config) {
        return Err(GatewayError::ConfigValidation { errors });
    }

    Ok((config, origin))
}

async fn auto_detect() -> Option<PathBuf> {
    for name in AUTO_DETECT_CANDIDATES {
        let path = PathBuf::from(name);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            return Some(path);
        }
    }
    None
}
