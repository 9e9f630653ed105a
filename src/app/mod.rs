pub mod cli;
mod run;

pub use cli::Command;
pub use run::run;

use crate::installer::InstallerError;
use crate::kubeconfig::WebhookConfigError;
use crate::pki::IssueError;
use crate::token::DispatchError;
use std::{fmt, io};

/// Every way a command can fail; `main` turns it into a message and exit status 1.
#[derive(Debug)]
pub enum AppError {
    Config(io::Error),
    Issue(IssueError),
    Installer(InstallerError),
    Token(DispatchError),
    WebhookConfig(WebhookConfigError),
    Output(io::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Failed to load configuration. Reason: {}.", e),
            Self::Issue(IssueError::Store(e)) => {
                write!(f, "Failed to issue certificate pair. Reason: {}.", e)
            }
            Self::Issue(e) => write!(f, "{}", e),
            Self::Installer(e) => write!(f, "{}", e),
            Self::Token(e) => write!(f, "{}", e),
            Self::WebhookConfig(e) => write!(f, "{}", e),
            Self::Output(e) => write!(f, "Failed to write output: {}", e),
        }
    }
}

impl std::error::Error for AppError {}

impl From<IssueError> for AppError {
    fn from(error: IssueError) -> Self {
        AppError::Issue(error)
    }
}

impl From<InstallerError> for AppError {
    fn from(error: InstallerError) -> Self {
        AppError::Installer(error)
    }
}

impl From<DispatchError> for AppError {
    fn from(error: DispatchError) -> Self {
        AppError::Token(error)
    }
}

impl From<WebhookConfigError> for AppError {
    fn from(error: WebhookConfigError) -> Self {
        AppError::WebhookConfig(error)
    }
}
