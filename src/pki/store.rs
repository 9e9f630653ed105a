// src/pki/store.rs
use super::openssl::{fingerprint, self_signed_ca, sign_certificate};
use super::types::{AltNames, CertRequest, ExtKeyUsage};
use crate::utils::logging::Logger;
use openssl::{
    error::ErrorStack,
    pkey::{PKey, Private},
    x509::X509,
};
use std::{
    fmt, fs, io,
    path::{Path, PathBuf},
};
use uuid::Uuid;

pub const CA_NAME: &str = "ca";
pub const SERVER_NAME: &str = "server";

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    OpenSsl(ErrorStack),
    NotFound(String),
    CaNotFound(String),
    CaNotLoaded,
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO Error: {}", e),
            Self::OpenSsl(e) => write!(f, "OpenSSL Error: {}", e),
            Self::NotFound(name) => write!(f, "certificate pair {} not found", name),
            Self::CaNotFound(location) => write!(f, "CA certificates not found in {}", location),
            Self::CaNotLoaded => write!(f, "CA certificate is not loaded"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<io::Error> for StoreError {
    fn from(error: io::Error) -> Self {
        StoreError::Io(error)
    }
}

impl From<ErrorStack> for StoreError {
    fn from(error: ErrorStack) -> Self {
        StoreError::OpenSsl(error)
    }
}

/// PEM key pairs kept as `<name>.crt` / `<name>.key` under one directory.
pub struct CertStore {
    dir: PathBuf,
    organization: Vec<String>,
    ca: Option<(X509, PKey<Private>)>,
}

impl CertStore {
    pub fn open(dir: impl Into<PathBuf>, organization: &[&str]) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            organization: organization.iter().map(|org| org.to_string()).collect(),
            ca: None,
        })
    }

    pub fn location(&self) -> String {
        self.dir.display().to_string()
    }

    pub fn cert_file(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.crt", name))
    }

    pub fn key_file(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.key", name))
    }

    /// True if either half of the pair is on disk.
    pub fn exists(&self, name: &str) -> bool {
        self.cert_file(name).exists() || self.key_file(name).exists()
    }

    pub fn pair_exists(&self, name: &str) -> bool {
        self.cert_file(name).exists() && self.key_file(name).exists()
    }

    pub fn load_ca(&mut self, logger: &mut dyn Logger) -> Result<(), StoreError> {
        if !self.pair_exists(CA_NAME) {
            return Err(StoreError::CaNotFound(self.location()));
        }
        let (crt, key) = self.read_bytes(CA_NAME)?;
        let cert = X509::from_pem(&crt)?;
        let key = PKey::private_key_from_pem(&key)?;
        logger.debug_log(&format!("Loaded CA certificate {}", fingerprint(&cert)?));
        self.ca = Some((cert, key));
        Ok(())
    }

    /// Creates a fresh CA and makes it the signing CA of this handle.
    pub fn new_ca(&mut self, logger: &mut dyn Logger) -> Result<(Vec<u8>, Vec<u8>), StoreError> {
        let (cert, key) = self_signed_ca(CA_NAME, &self.organization)?;
        logger.debug_log(&format!("Generated CA certificate {}", fingerprint(&cert)?));
        let pem = (cert.to_pem()?, key.private_key_to_pem_pkcs8()?);
        self.ca = Some((cert, key));
        Ok(pem)
    }

    pub fn new_cert_pair(
        &self,
        request: &CertRequest,
        logger: &mut dyn Logger,
    ) -> Result<(Vec<u8>, Vec<u8>), StoreError> {
        let (ca_cert, ca_key) = self.ca.as_ref().ok_or(StoreError::CaNotLoaded)?;
        let (cert, key) = sign_certificate(request, ca_cert, ca_key)?;
        logger.debug_log(&format!(
            "Signed certificate for {} ({})",
            request.common_name,
            fingerprint(&cert)?
        ));
        Ok((cert.to_pem()?, key.private_key_to_pem_pkcs8()?))
    }

    pub fn new_server_cert_pair(
        &self,
        common_name: &str,
        alt_names: AltNames,
        logger: &mut dyn Logger,
    ) -> Result<(Vec<u8>, Vec<u8>), StoreError> {
        let request = CertRequest {
            common_name: common_name.to_string(),
            organization: self.organization.clone(),
            usages: vec![ExtKeyUsage::ServerAuth],
            alt_names,
        };
        self.new_cert_pair(&request, logger)
    }

    pub fn write_bytes(&self, name: &str, crt: &[u8], key: &[u8]) -> Result<(), StoreError> {
        write_file(&self.cert_file(name), crt, 0o644)?;
        write_file(&self.key_file(name), key, 0o600)?;
        Ok(())
    }

    pub fn read_bytes(&self, name: &str) -> Result<(Vec<u8>, Vec<u8>), StoreError> {
        if !self.pair_exists(name) {
            return Err(StoreError::NotFound(name.to_string()));
        }
        let crt = fs::read(self.cert_file(name))?;
        let key = fs::read(self.key_file(name))?;
        // Reject truncated or foreign files before anyone embeds them.
        X509::from_pem(&crt)?;
        PKey::private_key_from_pem(&key)?;
        Ok((crt, key))
    }
}

// Temp file + rename, so a reader never sees half a PEM block.
fn write_file(path: &Path, data: &[u8], mode: u32) -> io::Result<()> {
    let tmp = path.with_extension(format!("{}.tmp", Uuid::new_v4()));
    fs::write(&tmp, data)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp, fs::Permissions::from_mode(mode))?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::logging::MemoryLogger;
    use tempfile::TempDir;

    #[test]
    fn open_creates_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("nested/pki");
        let store = CertStore::open(&root, &[]).unwrap();
        assert!(root.is_dir());
        assert_eq!(store.location(), root.display().to_string());
    }

    #[test]
    fn exists_vs_pair_exists() {
        let temp_dir = TempDir::new().unwrap();
        let store = CertStore::open(temp_dir.path(), &[]).unwrap();
        assert!(!store.exists("half"));

        fs::write(store.key_file("half"), b"key").unwrap();
        assert!(store.exists("half"));
        assert!(!store.pair_exists("half"));
        assert!(matches!(store.read_bytes("half"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn load_ca_fails_on_empty_store() {
        let temp_dir = TempDir::new().unwrap();
        let mut store = CertStore::open(temp_dir.path(), &[]).unwrap();
        let mut logger = MemoryLogger::default();
        assert!(matches!(store.load_ca(&mut logger), Err(StoreError::CaNotFound(_))));
    }

    #[test]
    fn signing_requires_loaded_ca() {
        let temp_dir = TempDir::new().unwrap();
        let store = CertStore::open(temp_dir.path(), &[]).unwrap();
        let mut logger = MemoryLogger::default();
        let result = store.new_server_cert_pair("server", AltNames::default(), &mut logger);
        assert!(matches!(result, Err(StoreError::CaNotLoaded)));
    }

    #[test]
    fn written_pair_reads_back_and_reloads_as_ca() {
        let temp_dir = TempDir::new().unwrap();
        let mut logger = MemoryLogger::default();

        let mut store = CertStore::open(temp_dir.path(), &[]).unwrap();
        let (crt, key) = store.new_ca(&mut logger).unwrap();
        store.write_bytes(CA_NAME, &crt, &key).unwrap();
        assert!(store.pair_exists(CA_NAME));
        assert_eq!(store.read_bytes(CA_NAME).unwrap(), (crt, key));

        let mut reopened = CertStore::open(temp_dir.path(), &["Google"]).unwrap();
        reopened.load_ca(&mut logger).unwrap();
        let (server_crt, _) = reopened
            .new_server_cert_pair("server", AltNames::default(), &mut logger)
            .unwrap();
        assert!(X509::from_pem(&server_crt).is_ok());

        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|entry| entry.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn corrupt_pem_is_rejected_on_read() {
        let temp_dir = TempDir::new().unwrap();
        let store = CertStore::open(temp_dir.path(), &[]).unwrap();
        store.write_bytes("broken", b"not a cert", b"not a key").unwrap();
        assert!(matches!(store.read_bytes("broken"), Err(StoreError::OpenSsl(_))));
    }

    #[cfg(unix)]
    #[test]
    fn key_file_is_private() {
        use std::os::unix::fs::PermissionsExt;
        let temp_dir = TempDir::new().unwrap();
        let store = CertStore::open(temp_dir.path(), &[]).unwrap();
        store.write_bytes("x", b"c", b"k").unwrap();
        let mode = fs::metadata(store.key_file("x")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
