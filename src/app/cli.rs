use crate::token::LdapTokenOptions;
use clap::{Args, Subcommand};
use std::{net::IpAddr, path::PathBuf};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Init PKI
    #[command(subcommand)]
    Init(InitCommand),
    /// Get PKI
    #[command(subcommand)]
    Get(GetCommand),
}

#[derive(Subcommand, Debug)]
pub enum InitCommand {
    /// Init CA
    Ca(PkiDirArgs),
    /// Generate server certificate pair
    Server(InitServerArgs),
    /// Generate client certificate pair
    Client(InitClientArgs),
}

#[derive(Subcommand, Debug)]
pub enum GetCommand {
    /// Get tokens for Github/Gitlab/Google/Appscode/LDAP
    Token(TokenArgs),
    /// Prints Kubernetes objects for deploying guard server
    Installer(InstallerArgs),
    /// Prints authentication token webhook config file
    WebhookConfig(WebhookConfigArgs),
}

#[derive(Args, Debug)]
pub struct PkiDirArgs {
    /// Path to directory where pki files are stored.
    #[arg(long)]
    pub pki_dir: Option<String>,
}

#[derive(Args, Debug)]
pub struct InitServerArgs {
    #[command(flatten)]
    pub pki: PkiDirArgs,

    /// Alternative domain names
    #[arg(long, value_delimiter = ',')]
    pub domains: Vec<String>,

    /// Alternative IP addresses
    #[arg(long, value_delimiter = ',', default_value = "10.96.10.96")]
    pub ips: Vec<IpAddr>,
}

#[derive(Args, Debug)]
pub struct InitClientArgs {
    /// Client common name
    pub names: Vec<String>,

    /// Name of Organization (Github, Google or Appscode).
    #[arg(short = 'o', long = "organization", default_value = "")]
    pub org: String,

    #[command(flatten)]
    pub pki: PkiDirArgs,
}

#[derive(Args, Debug)]
pub struct TokenArgs {
    /// Name of Organization (Github/Gitlab/Google/Appscode/LDAP).
    #[arg(short = 'o', long = "organization", default_value = "")]
    pub org: String,

    #[command(flatten)]
    pub ldap: LdapTokenOptions,
}

#[derive(Args, Debug)]
pub struct InstallerArgs {
    /// Name of Kubernetes namespace used to run guard server. [default: kube-system]
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Address (host:port) of guard server. [default: 10.96.10.96:9844]
    #[arg(long)]
    pub addr: Option<String>,

    /// If true, uses RBAC with operator and database objects
    #[arg(long)]
    pub rbac: bool,

    /// Path to the token file
    #[arg(long)]
    pub token_auth_file: Option<PathBuf>,

    #[command(flatten)]
    pub pki: PkiDirArgs,
}

#[derive(Args, Debug)]
pub struct WebhookConfigArgs {
    /// Client common name
    pub names: Vec<String>,

    /// Name of Organization (Github, Google or Appscode).
    #[arg(short = 'o', long = "organization", default_value = "")]
    pub org: String,

    /// Address (host:port) of guard server. [default: 10.96.10.96:9844]
    #[arg(long)]
    pub addr: Option<String>,

    #[command(flatten)]
    pub pki: PkiDirArgs,
}
