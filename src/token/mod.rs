// src/token/mod.rs
pub mod ldap;
mod providers;

pub use ldap::LdapTokenOptions;
pub use providers::BrowserProviders;

use crate::types::{OrgError, TokenOrg};
use crate::utils::logging::Logger;
use std::{fmt, io};

#[derive(Debug)]
pub enum TokenError {
    Browser(io::Error),
    InvalidOptions(String),
    Unsupported(String),
}

impl fmt::Display for TokenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Browser(e) => write!(f, "failed to open browser: {}", e),
            Self::InvalidOptions(s) => write!(f, "invalid options: {}", s),
            Self::Unsupported(s) => write!(f, "not supported: {}", s),
        }
    }
}

impl std::error::Error for TokenError {}

#[derive(Debug)]
pub enum DispatchError {
    Org(OrgError),
    Issuance { org: TokenOrg, source: TokenError },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Org(e) => write!(f, "{}", e),
            Self::Issuance {
                org: TokenOrg::Ldap,
                source,
            } => write!(f, "For LDAP: {}", source),
            Self::Issuance { org, source } => {
                write!(f, "Failed to issue {} token: {}", org.display_name(), source)
            }
        }
    }
}

impl std::error::Error for DispatchError {}

impl From<OrgError> for DispatchError {
    fn from(error: OrgError) -> Self {
        DispatchError::Org(error)
    }
}

/// External token issuers, one entry point per provider.
///
/// GitHub and GitLab have no failure path: once they return the command is done.
pub trait TokenProviders {
    fn github(&mut self, logger: &mut dyn Logger);
    fn gitlab(&mut self, logger: &mut dyn Logger);
    fn google(&mut self, logger: &mut dyn Logger) -> Result<(), TokenError>;
    fn appscode(&mut self, logger: &mut dyn Logger) -> Result<(), TokenError>;
    fn ldap(&mut self, options: &LdapTokenOptions, logger: &mut dyn Logger) -> Result<(), TokenError>;
}

#[derive(Debug, Clone, Default)]
pub struct TokenOptions {
    pub org: String,
    pub ldap: LdapTokenOptions,
}

pub fn dispatch(
    options: &TokenOptions,
    providers: &mut dyn TokenProviders,
    logger: &mut dyn Logger,
) -> Result<(), DispatchError> {
    let org = TokenOrg::parse(&options.org)?;
    logger.debug_log(&format!("Dispatching token request to {}", org.display_name()));

    let result = match org {
        TokenOrg::Github => {
            providers.github(logger);
            Ok(())
        }
        TokenOrg::Gitlab => {
            providers.gitlab(logger);
            Ok(())
        }
        TokenOrg::Google => providers.google(logger),
        TokenOrg::Appscode => providers.appscode(logger),
        TokenOrg::Ldap => providers.ldap(&options.ldap, logger),
    };
    result.map_err(|source| DispatchError::Issuance { org, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::logging::MemoryLogger;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
        fail: bool,
    }

    impl Recorder {
        fn outcome(&self) -> Result<(), TokenError> {
            if self.fail {
                Err(TokenError::Unsupported("test".to_string()))
            } else {
                Ok(())
            }
        }
    }

    impl TokenProviders for Recorder {
        fn github(&mut self, _: &mut dyn Logger) {
            self.calls.push("github");
        }
        fn gitlab(&mut self, _: &mut dyn Logger) {
            self.calls.push("gitlab");
        }
        fn google(&mut self, _: &mut dyn Logger) -> Result<(), TokenError> {
            self.calls.push("google");
            self.outcome()
        }
        fn appscode(&mut self, _: &mut dyn Logger) -> Result<(), TokenError> {
            self.calls.push("appscode");
            self.outcome()
        }
        fn ldap(&mut self, options: &LdapTokenOptions, _: &mut dyn Logger) -> Result<(), TokenError> {
            self.calls.push("ldap");
            options.issue_token().map(|_| ())
        }
    }

    fn run(org: &str, recorder: &mut Recorder) -> Result<(), DispatchError> {
        let options = TokenOptions {
            org: org.to_string(),
            ..Default::default()
        };
        dispatch(&options, recorder, &mut MemoryLogger::default())
    }

    #[test]
    fn each_org_reaches_exactly_one_provider() {
        for (org, expected) in [
            ("github", "github"),
            ("GitLab", "gitlab"),
            ("Google", "google"),
            ("APPSCODE", "appscode"),
        ] {
            let mut recorder = Recorder::default();
            run(org, &mut recorder).unwrap();
            assert_eq!(recorder.calls, vec![expected]);
        }
    }

    #[test]
    fn unknown_or_missing_org_calls_nobody() {
        let mut recorder = Recorder::default();
        assert!(matches!(
            run("bitbucket", &mut recorder),
            Err(DispatchError::Org(OrgError::Unknown(_)))
        ));
        assert!(matches!(
            run("", &mut recorder),
            Err(DispatchError::Org(OrgError::Missing { .. }))
        ));
        assert!(recorder.calls.is_empty());
    }

    #[test]
    fn provider_failures_are_reported() {
        let mut recorder = Recorder {
            fail: true,
            ..Default::default()
        };
        let err = run("google", &mut recorder).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Issuance {
                org: TokenOrg::Google,
                ..
            }
        ));
        assert!(run("github", &mut recorder).is_ok());
    }

    #[test]
    fn ldap_gets_its_options_and_prefixed_errors() {
        let mut recorder = Recorder::default();
        let err = run("ldap", &mut recorder).unwrap_err();
        assert!(err.to_string().starts_with("For LDAP: "));

        let options = TokenOptions {
            org: "ldap".to_string(),
            ldap: LdapTokenOptions {
                username: "user".to_string(),
                password: "pass".to_string(),
                ..Default::default()
            },
        };
        dispatch(&options, &mut recorder, &mut MemoryLogger::default()).unwrap();
        assert_eq!(recorder.calls, vec!["ldap", "ldap"]);
    }
}
