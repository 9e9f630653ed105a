// src/installer/mod.rs
mod address;
mod objects;
mod synth;
mod token_file;

pub use address::{AddrError, ServerAddr};
pub use synth::{synthesize, PkiMaterial, SynthesisInput};
pub use token_file::{TokenAuthFile, TokenFileError};

use crate::config::GuardConfig;
use crate::pki::{CertStore, StoreError, CA_NAME, SERVER_NAME};
use crate::utils::logging::Logger;
use std::{fmt, path::PathBuf};

#[derive(Debug)]
pub enum InstallerError {
    Addr(AddrError),
    Store(StoreError),
    MissingPair {
        what: &'static str,
        location: String,
        hint: &'static str,
    },
    TokenFile(TokenFileError),
    Serialize(serde_yaml::Error),
}

impl fmt::Display for InstallerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Addr(e) => write!(f, "{}", e),
            Self::Store(e) => write!(f, "Failed to load certificates. Reason: {}.", e),
            Self::MissingPair {
                what,
                location,
                hint,
            } => write!(f, "{} not found in {}. Run `{}`", what, location, hint),
            Self::TokenFile(e) => write!(f, "Invalid token auth file. Reason: {}.", e),
            Self::Serialize(e) => write!(f, "Failed to serialize manifest. Reason: {}.", e),
        }
    }
}

impl std::error::Error for InstallerError {}

impl From<AddrError> for InstallerError {
    fn from(error: AddrError) -> Self {
        InstallerError::Addr(error)
    }
}

impl From<StoreError> for InstallerError {
    fn from(error: StoreError) -> Self {
        InstallerError::Store(error)
    }
}

impl From<TokenFileError> for InstallerError {
    fn from(error: TokenFileError) -> Self {
        InstallerError::TokenFile(error)
    }
}

impl From<serde_yaml::Error> for InstallerError {
    fn from(error: serde_yaml::Error) -> Self {
        InstallerError::Serialize(error)
    }
}

#[derive(Debug, Clone)]
pub struct InstallerOptions {
    pub namespace: String,
    pub addr: String,
    pub enable_rbac: bool,
    pub token_auth_file: Option<PathBuf>,
    pub image_tag: String,
}

impl InstallerOptions {
    pub fn from_config(config: &GuardConfig) -> Self {
        Self {
            namespace: config.namespace.clone(),
            addr: config.addr.clone(),
            enable_rbac: false,
            token_auth_file: None,
            image_tag: config.image_tag.clone(),
        }
    }
}

/// Reads `ca` and `server` from the store and renders the full manifest stream.
pub fn run_installer(
    config: &GuardConfig,
    options: &InstallerOptions,
    logger: &mut dyn Logger,
) -> Result<String, InstallerError> {
    let addr = ServerAddr::parse(&options.addr)?;

    let store = CertStore::open(config.pki_root(), &[])?;
    if !store.pair_exists(CA_NAME) {
        return Err(InstallerError::MissingPair {
            what: "CA certificates",
            location: store.location(),
            hint: "guard init ca",
        });
    }
    if !store.pair_exists(SERVER_NAME) {
        return Err(InstallerError::MissingPair {
            what: "Server certificate",
            location: store.location(),
            hint: "guard init server",
        });
    }

    let (ca_cert, _) = store.read_bytes(CA_NAME)?;
    let (server_cert, server_key) = store.read_bytes(SERVER_NAME)?;
    let pki = PkiMaterial {
        ca_cert,
        server_cert,
        server_key,
    };

    let token_auth = match &options.token_auth_file {
        Some(path) => {
            let file = TokenAuthFile::load(path)?;
            logger.debug_log(&format!(
                "Loaded {} token(s) from {}",
                file.entries.len(),
                path.display()
            ));
            for entry in &file.entries {
                logger.debug_log(&format!(
                    "  user {} (uid {}, groups [{}])",
                    entry.username,
                    entry.uid,
                    entry.groups.join(", ")
                ));
            }
            Some(file)
        }
        None => None,
    };

    let output = synthesize(&SynthesisInput {
        namespace: &options.namespace,
        addr: &addr,
        enable_rbac: options.enable_rbac,
        image_tag: &options.image_tag,
        pki: &pki,
        token_auth: token_auth.as_ref(),
    })?;
    logger.debug_log(&format!(
        "Rendered installer for namespace {} (rbac: {}, token auth: {})",
        options.namespace,
        options.enable_rbac,
        token_auth.is_some()
    ));
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pki::{init_ca, init_server};
    use crate::utils::{logging::MemoryLogger, prompt::FixedAnswer};
    use std::fs;
    use tempfile::TempDir;

    fn options(namespace: &str, addr: &str) -> InstallerOptions {
        InstallerOptions {
            namespace: namespace.to_string(),
            addr: addr.to_string(),
            enable_rbac: false,
            token_auth_file: None,
            image_tag: "canary".to_string(),
        }
    }

    fn initialized(temp_dir: &TempDir) -> GuardConfig {
        let config = GuardConfig::default().with_pki_dir(temp_dir.path().to_str());
        let mut confirm = FixedAnswer::new(true);
        let mut logger = MemoryLogger::default();
        init_ca(&config, &mut confirm, &mut logger).unwrap();
        init_server(&config, &[], &[], &mut confirm, &mut logger).unwrap();
        config
    }

    #[test]
    fn bad_port_fails_before_touching_disk() {
        let temp_dir = TempDir::new().unwrap();
        let config = GuardConfig::default().with_pki_dir(temp_dir.path().to_str());
        let result = run_installer(
            &config,
            &options("kube-system", "10.96.10.96:http"),
            &mut MemoryLogger::default(),
        );
        assert!(matches!(
            result,
            Err(InstallerError::Addr(AddrError::InvalidPort { .. }))
        ));
        assert!(!config.pki_root().exists());
    }

    #[test]
    fn missing_ca_points_at_init_ca() {
        let temp_dir = TempDir::new().unwrap();
        let config = GuardConfig::default().with_pki_dir(temp_dir.path().to_str());
        let err = run_installer(
            &config,
            &options("kube-system", "10.96.10.96:9844"),
            &mut MemoryLogger::default(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Run `guard init ca`"));
    }

    #[test]
    fn missing_server_points_at_init_server() {
        let temp_dir = TempDir::new().unwrap();
        let config = GuardConfig::default().with_pki_dir(temp_dir.path().to_str());
        init_ca(
            &config,
            &mut FixedAnswer::new(true),
            &mut MemoryLogger::default(),
        )
        .unwrap();
        let err = run_installer(
            &config,
            &options("kube-system", "10.96.10.96:9844"),
            &mut MemoryLogger::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            InstallerError::MissingPair {
                hint: "guard init server",
                ..
            }
        ));
    }

    #[test]
    fn renders_from_real_store() {
        let temp_dir = TempDir::new().unwrap();
        let config = initialized(&temp_dir);
        let mut logger = MemoryLogger::default();

        let first = run_installer(&config, &options("kube-system", "10.96.10.96:9844"), &mut logger)
            .unwrap();
        let second = run_installer(&config, &options("kube-system", "10.96.10.96:9844"), &mut logger)
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(first.matches("---\n").count(), 2);
        assert!(first.contains("kind: Secret"));
        assert!(first.contains("kind: Deployment"));
        assert!(first.contains("kind: Service"));
    }

    #[test]
    fn token_file_is_validated_before_embedding() {
        let temp_dir = TempDir::new().unwrap();
        let config = initialized(&temp_dir);
        let token_path = temp_dir.path().join("token.csv");
        fs::write(&token_path, "only-a-token\n").unwrap();

        let mut opts = options("auth", "10.96.10.96:9844");
        opts.token_auth_file = Some(token_path.clone());
        let result = run_installer(&config, &opts, &mut MemoryLogger::default());
        assert!(matches!(
            result,
            Err(InstallerError::TokenFile(TokenFileError::TooFewFields { .. }))
        ));

        fs::write(&token_path, "t1,alice,1001,\"a,b\"\n").unwrap();
        let output = run_installer(&config, &opts, &mut MemoryLogger::default()).unwrap();
        assert!(output.contains("name: guard-token-auth"));
        assert!(output.contains("--token-auth-file=/etc/guard/auth/token.csv"));
    }

    #[test]
    fn unreadable_token_file_is_an_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let config = initialized(&temp_dir);
        let mut opts = options("kube-system", "10.96.10.96:9844");
        opts.token_auth_file = Some(temp_dir.path().join("absent.csv"));
        let result = run_installer(&config, &opts, &mut MemoryLogger::default());
        assert!(matches!(
            result,
            Err(InstallerError::TokenFile(TokenFileError::Io(_)))
        ));
    }
}
