// src/pki/mod.rs
pub mod client;
pub mod init;
mod openssl;
pub mod store;
pub mod types;

pub use client::{issue_client_certificate, IssueError};
pub use init::{init_ca, init_server};
pub use store::{CertStore, StoreError, CA_NAME, SERVER_NAME};
