// pki/types.rs
use std::net::IpAddr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtKeyUsage {
    ServerAuth,
    ClientAuth,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AltNames {
    pub dns_names: Vec<String>,
    pub ips: Vec<IpAddr>,
}

impl AltNames {
    pub fn is_empty(&self) -> bool {
        self.dns_names.is_empty() && self.ips.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertRequest {
    pub common_name: String,
    pub organization: Vec<String>,
    pub usages: Vec<ExtKeyUsage>,
    pub alt_names: AltNames,
}

impl CertRequest {
    /// Logical store name: `cn@Org` when an organization is set, plain `cn` otherwise.
    pub fn filename(&self) -> String {
        match self.organization.first() {
            Some(org) => format!("{}@{}", self.common_name, org),
            None => self.common_name.clone(),
        }
    }
}
