// config/types.rs
use serde::{Deserialize, Serialize};
use std::{fs, io, path::PathBuf};

pub const DEFAULT_NAMESPACE: &str = "kube-system";
pub const DEFAULT_ADDR: &str = "10.96.10.96:9844";

/// Image tag stamped at build time, `canary` for untagged builds.
pub fn default_image_tag() -> String {
    option_env!("GUARD_VERSION").unwrap_or("canary").to_string()
}

fn default_pki_dir() -> String {
    dirs::home_dir()
        .map(|home| home.join(".guard"))
        .unwrap_or_else(|| PathBuf::from(".guard"))
        .to_string_lossy()
        .to_string()
}

/// Settings shared by every command. Built once in `main` and passed down.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub pki_dir: String,
    pub namespace: String,
    pub addr: String,
    pub image_tag: String,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            pki_dir: default_pki_dir(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            addr: DEFAULT_ADDR.to_string(),
            image_tag: default_image_tag(),
        }
    }
}

impl GuardConfig {
    pub fn load_from_file(path: &str) -> io::Result<Self> {
        let config_str = fs::read_to_string(&*shellexpand::tilde(path))?;
        serde_json::from_str(&config_str).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub fn with_pki_dir(mut self, pki_dir: Option<&str>) -> Self {
        if let Some(dir) = pki_dir {
            self.pki_dir = dir.to_string();
        }
        self
    }

    /// Directory the certificate store lives in: `<pki-dir>/pki`.
    pub fn pki_root(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.pki_dir).to_string()).join("pki")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_installer_flags() {
        let config = GuardConfig::default();
        assert_eq!(config.namespace, "kube-system");
        assert_eq!(config.addr, "10.96.10.96:9844");
        assert!(config.pki_root().ends_with(".guard/pki"));
    }

    #[test]
    fn partial_file_keeps_defaults() -> io::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("guard.json");
        fs::write(&path, r#"{ "pki_dir": "/srv/guard", "namespace": "auth" }"#)?;

        let config = GuardConfig::load_from_file(path.to_str().unwrap())?;
        assert_eq!(config.pki_root(), PathBuf::from("/srv/guard/pki"));
        assert_eq!(config.namespace, "auth");
        assert_eq!(config.addr, DEFAULT_ADDR);
        Ok(())
    }

    #[test]
    fn round_trip_and_override() -> io::Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("guard.json");
        let mut config = GuardConfig::default();
        config.addr = "10.0.0.1:443".to_string();
        fs::write(&path, serde_json::to_string_pretty(&config).unwrap())?;

        let loaded = GuardConfig::load_from_file(path.to_str().unwrap())?
            .with_pki_dir(Some("/tmp/other"));
        assert_eq!(loaded.addr, "10.0.0.1:443");
        assert_eq!(loaded.pki_root(), PathBuf::from("/tmp/other/pki"));
        Ok(())
    }

    #[test]
    fn malformed_file_is_invalid_data() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("guard.json");
        fs::write(&path, "not json").unwrap();
        let err = GuardConfig::load_from_file(path.to_str().unwrap()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
