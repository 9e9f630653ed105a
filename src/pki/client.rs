use super::store::{CertStore, StoreError};
use super::types::{AltNames, CertRequest, ExtKeyUsage};
use crate::config::GuardConfig;
use crate::types::{ClientOrg, OrgError};
use crate::utils::{logging::Logger, prompt::Confirm};
use std::{fmt, io};

#[derive(Debug)]
pub enum IssueError {
    MissingName,
    MultipleNames,
    InvalidName(String),
    Org(OrgError),
    Store(StoreError),
    Prompt(io::Error),
    OverwriteDeclined(String),
}

impl fmt::Display for IssueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingName => write!(f, "Missing client name."),
            Self::MultipleNames => write!(f, "Multiple client name found."),
            Self::InvalidName(name) => write!(
                f,
                "Invalid client name {:?}. Names must be non-empty and must not contain path separators.",
                name
            ),
            Self::Org(e) => write!(f, "{}", e),
            Self::Store(e) => write!(f, "{}", e),
            Self::Prompt(e) => write!(f, "Failed to read confirmation: {}", e),
            Self::OverwriteDeclined(location) => {
                write!(f, "Kept existing certificates in {}", location)
            }
        }
    }
}

impl std::error::Error for IssueError {}

impl From<OrgError> for IssueError {
    fn from(error: OrgError) -> Self {
        IssueError::Org(error)
    }
}

impl From<StoreError> for IssueError {
    fn from(error: StoreError) -> Self {
        IssueError::Store(error)
    }
}

/// Exactly one positional name is accepted. It becomes part of a file name in the store.
pub fn single_name(names: &[String]) -> Result<&str, IssueError> {
    let name = match names {
        [] => return Err(IssueError::MissingName),
        [name] => name.as_str(),
        _ => return Err(IssueError::MultipleNames),
    };
    if name.trim().is_empty() || name.contains(['/', '\\']) || name.contains("..") {
        return Err(IssueError::InvalidName(name.to_string()));
    }
    Ok(name)
}

/// Validates arguments and builds the request; touches nothing on disk.
pub fn client_request(names: &[String], org: &str) -> Result<CertRequest, IssueError> {
    let common_name = single_name(names)?;
    let org = ClientOrg::parse(org)?;
    Ok(CertRequest {
        common_name: common_name.to_string(),
        organization: vec![org.canonical_name().to_string()],
        usages: vec![ExtKeyUsage::ClientAuth],
        alt_names: AltNames::default(),
    })
}

/// Asks before replacing `name`; a "no" leaves the store untouched.
pub fn confirm_overwrite(
    store: &CertStore,
    name: &str,
    what: &str,
    confirm: &mut dyn Confirm,
) -> Result<(), IssueError> {
    if !store.exists(name) {
        return Ok(());
    }
    let question = format!(
        "{} found at {}. Do you want to overwrite?",
        what,
        store.location()
    );
    if confirm.ask(&question, false).map_err(IssueError::Prompt)? {
        Ok(())
    } else {
        Err(IssueError::OverwriteDeclined(store.location()))
    }
}

pub fn issue_client_certificate(
    config: &GuardConfig,
    names: &[String],
    org: &str,
    confirm: &mut dyn Confirm,
    logger: &mut dyn Logger,
) -> Result<(), IssueError> {
    let request = client_request(names, org)?;
    let scope: Vec<&str> = request.organization.iter().map(String::as_str).collect();

    let mut store = CertStore::open(config.pki_root(), &scope)?;
    let filename = request.filename();
    logger.debug_log(&format!("Issuing client certificate {}", filename));

    confirm_overwrite(&store, &filename, "Client certificate", confirm)?;

    store.load_ca(logger)?;
    let (crt, key) = store.new_cert_pair(&request, logger)?;
    store.write_bytes(&filename, &crt, &key)?;

    logger.log(&format!("Wrote client certificates in {}", store.location()));
    Ok(())
}
