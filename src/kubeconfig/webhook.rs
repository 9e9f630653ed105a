use crate::config::GuardConfig;
use crate::installer::{AddrError, ServerAddr};
use crate::pki::{
    client::{client_request, IssueError},
    CertStore, StoreError, CA_NAME,
};
use crate::utils::logging::Logger;
use base64::{engine::general_purpose, Engine as _};
use serde::Serialize;
use std::fmt;
use url::Url;

const CLUSTER_NAME: &str = "guard-server";
const CONTEXT_NAME: &str = "webhook";

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct KubeConfig {
    #[serde(rename = "apiVersion")]
    api_version: String,
    kind: String,
    clusters: Vec<NamedCluster>,
    users: Vec<NamedUser>,
    contexts: Vec<NamedContext>,
    current_context: String,
}

#[derive(Serialize)]
struct NamedCluster {
    name: String,
    cluster: Cluster,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct Cluster {
    certificate_authority_data: String,
    server: String,
}

#[derive(Serialize)]
struct NamedUser {
    name: String,
    user: User,
}

#[derive(Serialize)]
#[serde(rename_all = "kebab-case")]
struct User {
    client_certificate_data: String,
    client_key_data: String,
}

#[derive(Serialize)]
struct NamedContext {
    name: String,
    context: Context,
}

#[derive(Serialize)]
struct Context {
    cluster: String,
    user: String,
}

#[derive(Debug)]
pub enum WebhookConfigError {
    Request(IssueError),
    Addr(AddrError),
    Url(url::ParseError),
    Store(StoreError),
    MissingPair { name: String, location: String, hint: String },
    Serialize(serde_yaml::Error),
}

impl fmt::Display for WebhookConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request(e) => write!(f, "{}", e),
            Self::Addr(e) => write!(f, "{}", e),
            Self::Url(e) => write!(f, "Guard server address is invalid. Reason: {}.", e),
            Self::Store(e) => write!(f, "Failed to load certificates. Reason: {}.", e),
            Self::MissingPair {
                name,
                location,
                hint,
            } => write!(f, "{} certificate not found in {}. Run `{}`", name, location, hint),
            Self::Serialize(e) => write!(f, "Failed to serialize webhook config. Reason: {}.", e),
        }
    }
}

impl std::error::Error for WebhookConfigError {}

impl From<IssueError> for WebhookConfigError {
    fn from(error: IssueError) -> Self {
        WebhookConfigError::Request(error)
    }
}

impl From<AddrError> for WebhookConfigError {
    fn from(error: AddrError) -> Self {
        WebhookConfigError::Addr(error)
    }
}

impl From<url::ParseError> for WebhookConfigError {
    fn from(error: url::ParseError) -> Self {
        WebhookConfigError::Url(error)
    }
}

impl From<StoreError> for WebhookConfigError {
    fn from(error: StoreError) -> Self {
        WebhookConfigError::Store(error)
    }
}

impl From<serde_yaml::Error> for WebhookConfigError {
    fn from(error: serde_yaml::Error) -> Self {
        WebhookConfigError::Serialize(error)
    }
}

/// Token review endpoint the API server calls: `https://<addr>/tokenreviews`.
pub fn token_review_url(addr: &ServerAddr) -> Result<Url, url::ParseError> {
    Url::parse(&format!("https://{}", addr))?.join("tokenreviews")
}

/// Kubeconfig for the API server's `--authentication-token-webhook-config-file`.
pub fn webhook_config(
    config: &GuardConfig,
    names: &[String],
    org: &str,
    addr: &str,
    logger: &mut dyn Logger,
) -> Result<String, WebhookConfigError> {
    let request = client_request(names, org)?;
    let addr = ServerAddr::parse(addr)?;
    let server = token_review_url(&addr)?;

    let store = CertStore::open(config.pki_root(), &[])?;
    let client_name = request.filename();
    let user = org.to_lowercase();
    for (name, hint) in [
        (CA_NAME.to_string(), "guard init ca".to_string()),
        (
            client_name.clone(),
            format!("guard init client {} -o {}", request.common_name, user),
        ),
    ] {
        if !store.pair_exists(&name) {
            return Err(WebhookConfigError::MissingPair {
                name,
                location: store.location(),
                hint,
            });
        }
    }

    let (ca_cert, _) = store.read_bytes(CA_NAME)?;
    let (client_cert, client_key) = store.read_bytes(&client_name)?;
    logger.debug_log(&format!("Using client certificate {} for {}", client_name, server));

    let kubeconfig = KubeConfig {
        api_version: "v1".to_string(),
        kind: "Config".to_string(),
        clusters: vec![NamedCluster {
            name: CLUSTER_NAME.to_string(),
            cluster: Cluster {
                certificate_authority_data: general_purpose::STANDARD.encode(ca_cert),
                server: server.to_string(),
            },
        }],
        users: vec![NamedUser {
            name: user.clone(),
            user: User {
                client_certificate_data: general_purpose::STANDARD.encode(client_cert),
                client_key_data: general_purpose::STANDARD.encode(client_key),
            },
        }],
        contexts: vec![NamedContext {
            name: CONTEXT_NAME.to_string(),
            context: Context {
                cluster: CLUSTER_NAME.to_string(),
                user,
            },
        }],
        current_context: CONTEXT_NAME.to_string(),
    };

    Ok(serde_yaml::to_string(&kubeconfig)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pki::{init_ca, issue_client_certificate};
    use crate::utils::{logging::MemoryLogger, prompt::FixedAnswer};
    use tempfile::TempDir;
    use yaml_rust::YamlLoader;

    fn names(name: &str) -> Vec<String> {
        vec![name.to_string()]
    }

    #[test]
    fn review_url_for_ipv4_and_ipv6() {
        let v4 = ServerAddr::parse("10.96.10.96:9844").unwrap();
        assert_eq!(
            token_review_url(&v4).unwrap().as_str(),
            "https://10.96.10.96:9844/tokenreviews"
        );
        let v6 = ServerAddr::parse("[fd00::a]:443").unwrap();
        assert_eq!(token_review_url(&v6).unwrap().as_str(), "https://[fd00::a]/tokenreviews");
    }

    #[test]
    fn embeds_ca_and_client_pair() {
        let temp_dir = TempDir::new().unwrap();
        let config = GuardConfig::default().with_pki_dir(temp_dir.path().to_str());
        let mut confirm = FixedAnswer::new(true);
        let mut logger = MemoryLogger::default();
        init_ca(&config, &mut confirm, &mut logger).unwrap();
        issue_client_certificate(&config, &names("alice"), "github", &mut confirm, &mut logger)
            .unwrap();

        let yaml = webhook_config(&config, &names("alice"), "GitHub", "10.96.10.96:9844", &mut logger)
            .unwrap();
        let docs = YamlLoader::load_from_str(&yaml).unwrap();
        let doc = &docs[0];

        assert_eq!(doc["kind"].as_str(), Some("Config"));
        assert_eq!(doc["current-context"].as_str(), Some("webhook"));
        let cluster = &doc["clusters"][0];
        assert_eq!(cluster["name"].as_str(), Some("guard-server"));
        assert_eq!(
            cluster["cluster"]["server"].as_str(),
            Some("https://10.96.10.96:9844/tokenreviews")
        );

        let store = CertStore::open(config.pki_root(), &[]).unwrap();
        let (ca, _) = store.read_bytes(CA_NAME).unwrap();
        let (crt, key) = store.read_bytes("alice@Github").unwrap();
        let decode = |field: &yaml_rust::Yaml| {
            general_purpose::STANDARD
                .decode(field.as_str().unwrap())
                .unwrap()
        };
        assert_eq!(decode(&cluster["cluster"]["certificate-authority-data"]), ca);
        let user = &doc["users"][0];
        assert_eq!(user["name"].as_str(), Some("github"));
        assert_eq!(decode(&user["user"]["client-certificate-data"]), crt);
        assert_eq!(decode(&user["user"]["client-key-data"]), key);
        assert_eq!(doc["contexts"][0]["context"]["user"].as_str(), Some("github"));
    }

    #[test]
    fn missing_client_pair_names_the_init_command() {
        let temp_dir = TempDir::new().unwrap();
        let config = GuardConfig::default().with_pki_dir(temp_dir.path().to_str());
        init_ca(&config, &mut FixedAnswer::new(true), &mut MemoryLogger::default()).unwrap();

        let err = webhook_config(
            &config,
            &names("bob"),
            "google",
            "10.96.10.96:9844",
            &mut MemoryLogger::default(),
        )
        .unwrap_err();
        assert!(err
            .to_string()
            .ends_with("Run `guard init client bob -o google`"));
    }

    #[test]
    fn bad_org_fails_before_store() {
        let temp_dir = TempDir::new().unwrap();
        let config = GuardConfig::default().with_pki_dir(temp_dir.path().to_str());
        let err = webhook_config(
            &config,
            &names("bob"),
            "ldap",
            "10.96.10.96:9844",
            &mut MemoryLogger::default(),
        )
        .unwrap_err();
        assert!(matches!(err, WebhookConfigError::Request(IssueError::Org(_))));
        assert!(!config.pki_root().exists());
    }
}
