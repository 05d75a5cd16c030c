use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Default, Deserialize, Serialize, Clone, PartialEq)]
pub struct ConfigFile {
    pub source: Option<String>,
    #[serde(alias = "econ")]
    pub econ_threshold: Option<f64>,
    #[serde(alias = "prem")]
    pub prem_threshold: Option<f64>,
    pub page_size: Option<usize>,
    pub sort: Option<String>,
    pub categories: Option<String>,
    pub output: Option<String>,
    pub output_format: Option<String>,
    pub theme: Option<String>,
    pub currency_symbol: Option<String>,
    pub no_color: Option<bool>,
    pub timeout: Option<u64>,
}

pub fn default_config_path() -> Option<PathBuf> {
    Some(dirs::home_dir()?.join(".coursedeck").join("config.yml"))
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/").or_else(|| path.strip_prefix("~\\")) {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

pub fn load_config(path: &Path, allow_missing: bool) -> Result<ConfigFile, String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => serde_yaml::from_str::<ConfigFile>(&contents)
            .map_err(|e| format!("failed to parse config '{}': {e}", path.display())),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound && allow_missing => {
            Ok(ConfigFile::default())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(format!("config file not found '{}'", path.display()))
        }
        Err(e) => Err(format!("failed to read config '{}': {e}", path.display())),
    }
}

fn default_config_yaml() -> String {
    r#"# coursedeck config
#
# Location (default):
#   ~/.coursedeck/config.yml

# Catalog to load: a JSON file, a cursos.dat record file, or an http(s) URL.
source: cursos.json
timeout: 10

# Tier thresholds: economy < econ_threshold <= standard < prem_threshold <= premium
econ_threshold: 20000
prem_threshold: 60000

# Initial view
page_size: 10
sort: name-asc
# categories: economy,standard,premium

# Output (optional)
# output: ./catalog.html
# output_format: html
theme: dark
currency_symbol: "$"
no_color: false
"#
    .to_string()
}

pub fn ensure_default_config_file(path: &Path) -> Result<bool, String> {
    if path.exists() {
        return Ok(false);
    }
    let parent = path
        .parent()
        .ok_or_else(|| format!("invalid config path '{}'", path.display()))?;
    std::fs::create_dir_all(parent).map_err(|e| {
        format!(
            "failed to create config directory '{}': {e}",
            parent.display()
        )
    })?;
    std::fs::write(path, default_config_yaml())
        .map_err(|e| format!("failed to write config file '{}': {e}", path.display()))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_file_round_trips_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yml");
        assert!(ensure_default_config_file(&path).unwrap());
        assert!(!ensure_default_config_file(&path).unwrap());

        let cfg = load_config(&path, false).unwrap();
        assert_eq!(cfg.source.as_deref(), Some("cursos.json"));
        assert_eq!(cfg.econ_threshold, Some(20000.0));
        assert_eq!(cfg.prem_threshold, Some(60000.0));
        assert_eq!(cfg.page_size, Some(10));
        assert_eq!(cfg.sort.as_deref(), Some("name-asc"));
        assert_eq!(cfg.theme.as_deref(), Some("dark"));
        assert_eq!(cfg.categories, None);
    }

    #[test]
    fn missing_file_is_only_ok_when_allowed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.yml");
        assert_eq!(load_config(&path, true).unwrap(), ConfigFile::default());
        assert!(load_config(&path, false)
            .unwrap_err()
            .starts_with("config file not found"));
    }

    #[test]
    fn tilde_paths_expand_to_home() {
        assert_eq!(expand_tilde("cursos.json"), PathBuf::from("cursos.json"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/data/cursos.dat"), home.join("data/cursos.dat"));
            assert_eq!(
                default_config_path().unwrap(),
                home.join(".coursedeck").join("config.yml")
            );
        }
    }

    #[test]
    fn short_threshold_aliases() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.yml");
        std::fs::write(&path, "econ: 100\nprem: 900\n").unwrap();
        let cfg = load_config(&path, false).unwrap();
        assert_eq!(cfg.econ_threshold, Some(100.0));
        assert_eq!(cfg.prem_threshold, Some(900.0));
    }

    #[test]
    fn malformed_yaml_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yml");
        std::fs::write(&path, "page_size: [").unwrap();
        let err = load_config(&path, false).unwrap_err();
        assert!(err.contains("failed to parse config"));
        assert!(err.contains("bad.yml"));
    }
}
