pub mod generate;
pub mod parse;
pub mod types;

use regex::Regex;
use std::path::{Path, PathBuf};

pub use parse::{load_config, parse_config, ConfigError};
pub use types::{Config, WebConfig};

const ENV_VAR_PATTERN: &str = r"\$env\{([A-Za-z_][A-Za-z0-9_]*)\}";

const USER_CONFIG: &str = ".config/logwell/config.yml";
const SYSTEM_CONFIG: &str = "/etc/logwell/config.yml";

/// Config text after `$env{VAR}` substitution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvExpansion {
    pub text: String,
    /// Referenced variables that are not set, sorted and deduplicated.
    /// Their references are left in `text` as written.
    pub unset: Vec<String>,
}

pub fn expand_env_vars(text: &str) -> Result<EnvExpansion, regex::Error> {
    let re = Regex::new(ENV_VAR_PATTERN)?;
    let mut unset = Vec::new();

    let text = re
        .replace_all(text, |caps: &regex::Captures| {
            let reference = &caps[0];
            let name = &caps[1];
            std::env::var(name).unwrap_or_else(|_| {
                unset.push(name.to_string());
                reference.to_string()
            })
        })
        .into_owned();

    unset.sort();
    unset.dedup();
    Ok(EnvExpansion { text, unset })
}

/// `~` or `~/rest` becomes the home directory; anything else is unchanged.
pub fn expand_tilde(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Default config locations, most specific first. `config init` writes to
/// the first; `run` loads the first that exists.
pub fn config_search_paths() -> Vec<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(USER_CONFIG))
        .into_iter()
        .chain(std::iter::once(PathBuf::from(SYSTEM_CONFIG)))
        .collect()
}

/// An explicit `--config` path wins (tilde-expanded, existing or not);
/// otherwise the first default location present on disk.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(expand_tilde(path)),
        None => config_search_paths().into_iter().find(|path| path.exists()),
    }
}
