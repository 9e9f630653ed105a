use super::TokenError;
use base64::{engine::general_purpose, Engine as _};
use clap::{Args, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AuthChoice {
    #[default]
    Simple,
    Kerberos,
}

#[derive(Debug, Clone, Default, Args)]
pub struct LdapTokenOptions {
    /// LDAP user authentication mechanism
    #[arg(long = "ldap.auth-choice", value_enum, default_value_t = AuthChoice::Simple)]
    pub auth_choice: AuthChoice,

    /// Username for LDAP simple authentication
    #[arg(long = "ldap.username", default_value = "")]
    pub username: String,

    /// Password for LDAP simple authentication
    #[arg(long = "ldap.password", default_value = "")]
    pub password: String,

    /// Service principal name used for Kerberos
    #[arg(long = "ldap.spn", default_value = "")]
    pub spn: String,

    /// Path to the krb5 configuration file
    #[arg(long = "ldap.krb5-config", default_value = "/etc/krb5.conf")]
    pub krb5_config: String,
}

impl LdapTokenOptions {
    /// Bearer token for simple authentication: base64 of `username:password`.
    pub fn issue_token(&self) -> Result<String, TokenError> {
        match self.auth_choice {
            AuthChoice::Simple => {
                if self.username.is_empty() {
                    return Err(TokenError::InvalidOptions("username must be non-empty".to_string()));
                }
                if self.password.is_empty() {
                    return Err(TokenError::InvalidOptions("password must be non-empty".to_string()));
                }
                Ok(general_purpose::STANDARD
                    .encode(format!("{}:{}", self.username, self.password)))
            }
            AuthChoice::Kerberos => {
                if self.spn.is_empty() {
                    return Err(TokenError::InvalidOptions("spn must be non-empty".to_string()));
                }
                Err(TokenError::Unsupported(format!(
                    "kerberos token issuance for {} (krb5 config {})",
                    self.spn, self.krb5_config
                )))
            }
        }
    }
}
