use super::client::{confirm_overwrite, IssueError};
use super::store::{CertStore, CA_NAME, SERVER_NAME};
use super::types::AltNames;
use crate::config::GuardConfig;
use crate::utils::{logging::Logger, prompt::Confirm};
use std::net::IpAddr;

pub fn init_ca(
    config: &GuardConfig,
    confirm: &mut dyn Confirm,
    logger: &mut dyn Logger,
) -> Result<(), IssueError> {
    let mut store = CertStore::open(config.pki_root(), &[])?;
    confirm_overwrite(&store, CA_NAME, "CA certificate", confirm)?;

    let (crt, key) = store.new_ca(logger)?;
    store.write_bytes(CA_NAME, &crt, &key)?;

    logger.log(&format!("Wrote ca certificates in {}", store.location()));
    Ok(())
}

pub fn init_server(
    config: &GuardConfig,
    domains: &[String],
    ips: &[IpAddr],
    confirm: &mut dyn Confirm,
    logger: &mut dyn Logger,
) -> Result<(), IssueError> {
    let mut store = CertStore::open(config.pki_root(), &[])?;
    confirm_overwrite(&store, SERVER_NAME, "Server certificate", confirm)?;

    store.load_ca(logger)?;

    let mut alt_names = AltNames {
        dns_names: vec![SERVER_NAME.to_string()],
        ips: vec![IpAddr::from([127, 0, 0, 1])],
    };
    for domain in domains {
        if !alt_names.dns_names.contains(domain) {
            alt_names.dns_names.push(domain.clone());
        }
    }
    for ip in ips {
        if !alt_names.ips.contains(ip) {
            alt_names.ips.push(*ip);
        }
    }

    let (crt, key) = store.new_server_cert_pair(SERVER_NAME, alt_names, logger)?;
    store.write_bytes(SERVER_NAME, &crt, &key)?;

    logger.log(&format!("Wrote server certificates in {}", store.location()));
    Ok(())
}
