// types.rs
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrgError {
    Missing { supported: String },
    Unknown(String),
}

impl fmt::Display for OrgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { supported } => {
                write!(f, "Missing organization name. Set flag -o {}.", supported)
            }
            Self::Unknown(org) => write!(f, "Unknown organization {}.", org),
        }
    }
}

impl std::error::Error for OrgError {}

// Case-insensitive exact match against the flag values of `all`.
fn parse_org<T: Copy>(
    input: &str,
    all: &[T],
    flag_value: fn(T) -> &'static str,
    supported: fn() -> String,
) -> Result<T, OrgError> {
    if input.is_empty() {
        return Err(OrgError::Missing {
            supported: supported(),
        });
    }
    let org = input.to_lowercase();
    all.iter()
        .copied()
        .find(|candidate| flag_value(*candidate) == org)
        .ok_or(OrgError::Unknown(org))
}

/// Organizations a client certificate can be issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientOrg {
    Github,
    Google,
    Appscode,
}

impl ClientOrg {
    pub const ALL: [ClientOrg; 3] = [ClientOrg::Github, ClientOrg::Google, ClientOrg::Appscode];

    pub fn parse(input: &str) -> Result<Self, OrgError> {
        parse_org(input, &Self::ALL, Self::flag_value, Self::supported_print_form)
    }

    pub fn supported_print_form() -> String {
        Self::ALL
            .iter()
            .map(|org| org.canonical_name())
            .collect::<Vec<_>>()
            .join("|")
    }

    pub fn flag_value(self) -> &'static str {
        match self {
            ClientOrg::Github => "github",
            ClientOrg::Google => "google",
            ClientOrg::Appscode => "appscode",
        }
    }

    /// Name written into the certificate subject's O field.
    pub fn canonical_name(self) -> &'static str {
        match self {
            ClientOrg::Github => "Github",
            ClientOrg::Google => "Google",
            ClientOrg::Appscode => "Appscode",
        }
    }
}

/// Identity providers the `token` command can hand off to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenOrg {
    Github,
    Gitlab,
    Google,
    Appscode,
    Ldap,
}

impl TokenOrg {
    pub const ALL: [TokenOrg; 5] = [
        TokenOrg::Github,
        TokenOrg::Gitlab,
        TokenOrg::Google,
        TokenOrg::Appscode,
        TokenOrg::Ldap,
    ];

    pub fn parse(input: &str) -> Result<Self, OrgError> {
        parse_org(input, &Self::ALL, Self::flag_value, Self::supported_print_form)
    }

    pub fn flag_value(self) -> &'static str {
        match self {
            TokenOrg::Github => "github",
            TokenOrg::Gitlab => "gitlab",
            TokenOrg::Google => "google",
            TokenOrg::Appscode => "appscode",
            TokenOrg::Ldap => "ldap",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            TokenOrg::Github => "Github",
            TokenOrg::Gitlab => "Gitlab",
            TokenOrg::Google => "Google",
            TokenOrg::Appscode => "Appscode",
            TokenOrg::Ldap => "LDAP",
        }
    }

    pub fn supported_print_form() -> String {
        Self::ALL
            .iter()
            .map(|org| org.display_name())
            .collect::<Vec<_>>()
            .join("/")
    }
}
