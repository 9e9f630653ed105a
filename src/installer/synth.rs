use super::{address::ServerAddr, objects, token_file::TokenAuthFile};
use k8s_openapi::{
    api::{
        apps::v1::Deployment,
        core::v1::{Namespace, Secret, Service, ServiceAccount},
        rbac::v1::{ClusterRole, ClusterRoleBinding},
    },
    Resource,
};

pub const DOCUMENT_SEPARATOR: &str = "---\n";

/// Namespaces that already exist in every cluster.
const BUILTIN_NAMESPACES: [&str; 2] = ["kube-system", "default"];

pub enum Manifest {
    Namespace(Namespace),
    ServiceAccount(ServiceAccount),
    ClusterRole(ClusterRole),
    ClusterRoleBinding(ClusterRoleBinding),
    Secret(Secret),
    Deployment(Deployment),
    Service(Service),
}

impl Manifest {
    pub fn kind(&self) -> &'static str {
        match self {
            Manifest::Namespace(_) => Namespace::KIND,
            Manifest::ServiceAccount(_) => ServiceAccount::KIND,
            Manifest::ClusterRole(_) => ClusterRole::KIND,
            Manifest::ClusterRoleBinding(_) => ClusterRoleBinding::KIND,
            Manifest::Secret(_) => Secret::KIND,
            Manifest::Deployment(_) => Deployment::KIND,
            Manifest::Service(_) => Service::KIND,
        }
    }

    /// Serializes with the object's own `apiVersion`/`kind` header.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        match self {
            Manifest::Namespace(o) => serde_yaml::to_string(o),
            Manifest::ServiceAccount(o) => serde_yaml::to_string(o),
            Manifest::ClusterRole(o) => serde_yaml::to_string(o),
            Manifest::ClusterRoleBinding(o) => serde_yaml::to_string(o),
            Manifest::Secret(o) => serde_yaml::to_string(o),
            Manifest::Deployment(o) => serde_yaml::to_string(o),
            Manifest::Service(o) => serde_yaml::to_string(o),
        }
    }
}

pub struct PkiMaterial {
    pub ca_cert: Vec<u8>,
    pub server_cert: Vec<u8>,
    pub server_key: Vec<u8>,
}

pub struct SynthesisInput<'a> {
    pub namespace: &'a str,
    pub addr: &'a ServerAddr,
    pub enable_rbac: bool,
    pub image_tag: &'a str,
    pub pki: &'a PkiMaterial,
    pub token_auth: Option<&'a TokenAuthFile>,
}

impl SynthesisInput<'_> {
    fn needs_namespace(&self) -> bool {
        !BUILTIN_NAMESPACES.contains(&self.namespace)
    }

    fn token_auth_enabled(&self) -> bool {
        self.token_auth.is_some()
    }
}

pub struct Step {
    pub name: &'static str,
    pub enabled: fn(&SynthesisInput) -> bool,
    pub build: fn(&SynthesisInput) -> Vec<Manifest>,
}

/// Emission order of the installer. Steps are skipped, never reordered.
pub const STEPS: [Step; 6] = [
    Step {
        name: "namespace",
        enabled: |input| input.needs_namespace(),
        build: |input| vec![Manifest::Namespace(objects::new_namespace(input.namespace))],
    },
    Step {
        name: "rbac",
        enabled: |input| input.enable_rbac,
        build: |input| {
            vec![
                Manifest::ServiceAccount(objects::new_service_account(input.namespace)),
                Manifest::ClusterRole(objects::new_cluster_role()),
                Manifest::ClusterRoleBinding(objects::new_cluster_role_binding(input.namespace)),
            ]
        },
    },
    Step {
        name: "pki-secret",
        enabled: |_| true,
        build: |input| {
            vec![Manifest::Secret(objects::new_pki_secret(
                input.namespace,
                &input.pki.server_cert,
                &input.pki.server_key,
                &input.pki.ca_cert,
            ))]
        },
    },
    Step {
        name: "token-auth-secret",
        enabled: |input| input.token_auth_enabled(),
        build: |input| {
            input
                .token_auth
                .map(|file| {
                    Manifest::Secret(objects::new_token_auth_secret(input.namespace, &file.raw))
                })
                .into_iter()
                .collect()
        },
    },
    Step {
        name: "deployment",
        enabled: |_| true,
        build: |input| {
            vec![Manifest::Deployment(objects::new_deployment(
                input.namespace,
                input.image_tag,
                input.enable_rbac,
                input.token_auth_enabled(),
            ))]
        },
    },
    Step {
        name: "service",
        enabled: |_| true,
        build: |input| {
            vec![Manifest::Service(objects::new_service(
                input.namespace,
                &input.addr.host,
                input.addr.port,
            ))]
        },
    },
];

pub fn build_manifests(input: &SynthesisInput) -> Vec<Manifest> {
    STEPS
        .iter()
        .filter(|step| (step.enabled)(input))
        .flat_map(|step| (step.build)(input))
        .collect()
}

/// Whole stream or nothing: the first serialization failure discards all output.
pub fn render(manifests: &[Manifest]) -> Result<String, serde_yaml::Error> {
    let documents = manifests
        .iter()
        .map(Manifest::to_yaml)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(documents.join(DOCUMENT_SEPARATOR))
}

pub fn synthesize(input: &SynthesisInput) -> Result<String, serde_yaml::Error> {
    render(&build_manifests(input))
}
