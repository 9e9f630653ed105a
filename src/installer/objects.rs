// src/installer/objects.rs
use k8s_openapi::{
    api::{
        apps::v1::{Deployment, DeploymentSpec},
        core::v1::{
            Container, ContainerPort, Namespace, PodSpec, PodTemplateSpec, Secret,
            SecretVolumeSource, Service, ServiceAccount, ServicePort, ServiceSpec, Volume,
            VolumeMount,
        },
        rbac::v1::{ClusterRole, ClusterRoleBinding, PolicyRule, RoleRef, Subject},
    },
    apimachinery::pkg::{
        apis::meta::v1::{LabelSelector, ObjectMeta},
        util::intstr::IntOrString,
    },
    ByteString,
};
use std::collections::BTreeMap;

pub const APP_NAME: &str = "guard";
pub const PKI_SECRET: &str = "guard-pki";
pub const TOKEN_AUTH_SECRET: &str = "guard-token-auth";
pub const WEB_PORT_NAME: &str = "web";
pub const OPS_PORT_NAME: &str = "ops";
pub const WEB_PORT: i32 = 9844;
pub const OPS_PORT: i32 = 56790;

pub const CA_CERT_KEY: &str = "ca.crt";
pub const TLS_CERT_KEY: &str = "tls.crt";
pub const TLS_KEY_KEY: &str = "tls.key";
pub const TOKEN_CSV_KEY: &str = "token.csv";

const PKI_MOUNT_PATH: &str = "/etc/guard/pki";
const TOKEN_AUTH_MOUNT_PATH: &str = "/etc/guard/auth";
const SECRET_DEFAULT_MODE: i32 = 0o555;

pub fn labels() -> BTreeMap<String, String> {
    BTreeMap::from([("app".to_string(), APP_NAME.to_string())])
}

fn meta(name: &str, namespace: Option<&str>) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: namespace.map(str::to_string),
        labels: Some(labels()),
        ..Default::default()
    }
}

fn secret_volume(name: &str) -> Volume {
    Volume {
        name: name.to_string(),
        secret: Some(SecretVolumeSource {
            secret_name: Some(name.to_string()),
            default_mode: Some(SECRET_DEFAULT_MODE),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn tcp_port(name: &str, port: i32) -> ContainerPort {
    ContainerPort {
        name: Some(name.to_string()),
        container_port: port,
        protocol: Some("TCP".to_string()),
        ..Default::default()
    }
}

pub fn new_namespace(namespace: &str) -> Namespace {
    Namespace {
        metadata: meta(namespace, None),
        ..Default::default()
    }
}

pub fn new_service_account(namespace: &str) -> ServiceAccount {
    ServiceAccount {
        metadata: meta(APP_NAME, Some(namespace)),
        ..Default::default()
    }
}

/// Read-only: guard only needs to list nodes.
pub fn new_cluster_role() -> ClusterRole {
    ClusterRole {
        metadata: meta(APP_NAME, None),
        rules: Some(vec![PolicyRule {
            api_groups: Some(vec![String::new()]),
            resources: Some(vec!["nodes".to_string()]),
            verbs: vec!["list".to_string()],
            ..Default::default()
        }]),
        ..Default::default()
    }
}

pub fn new_cluster_role_binding(namespace: &str) -> ClusterRoleBinding {
    ClusterRoleBinding {
        metadata: meta(APP_NAME, None),
        role_ref: RoleRef {
            api_group: "rbac.authorization.k8s.io".to_string(),
            kind: "ClusterRole".to_string(),
            name: APP_NAME.to_string(),
        },
        subjects: Some(vec![Subject {
            kind: "ServiceAccount".to_string(),
            name: APP_NAME.to_string(),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        }]),
    }
}

pub fn new_pki_secret(namespace: &str, cert: &[u8], key: &[u8], ca_cert: &[u8]) -> Secret {
    Secret {
        metadata: meta(PKI_SECRET, Some(namespace)),
        data: Some(BTreeMap::from([
            (CA_CERT_KEY.to_string(), ByteString(ca_cert.to_vec())),
            (TLS_CERT_KEY.to_string(), ByteString(cert.to_vec())),
            (TLS_KEY_KEY.to_string(), ByteString(key.to_vec())),
        ])),
        ..Default::default()
    }
}

pub fn new_token_auth_secret(namespace: &str, token_file: &[u8]) -> Secret {
    Secret {
        metadata: meta(TOKEN_AUTH_SECRET, Some(namespace)),
        data: Some(BTreeMap::from([(
            TOKEN_CSV_KEY.to_string(),
            ByteString(token_file.to_vec()),
        )])),
        ..Default::default()
    }
}

pub fn new_deployment(
    namespace: &str,
    image_tag: &str,
    enable_rbac: bool,
    enable_token_auth: bool,
) -> Deployment {
    let mut args = vec![
        "run".to_string(),
        "--v=3".to_string(),
        format!("--ca-cert-file={}/{}", PKI_MOUNT_PATH, CA_CERT_KEY),
        format!("--cert-file={}/{}", PKI_MOUNT_PATH, TLS_CERT_KEY),
        format!("--key-file={}/{}", PKI_MOUNT_PATH, TLS_KEY_KEY),
    ];
    let mut volume_mounts = vec![VolumeMount {
        name: PKI_SECRET.to_string(),
        mount_path: PKI_MOUNT_PATH.to_string(),
        ..Default::default()
    }];
    let mut volumes = vec![secret_volume(PKI_SECRET)];

    if enable_token_auth {
        args.push(format!(
            "--token-auth-file={}/{}",
            TOKEN_AUTH_MOUNT_PATH, TOKEN_CSV_KEY
        ));
        volume_mounts.push(VolumeMount {
            name: TOKEN_AUTH_SECRET.to_string(),
            mount_path: TOKEN_AUTH_MOUNT_PATH.to_string(),
            ..Default::default()
        });
        volumes.push(secret_volume(TOKEN_AUTH_SECRET));
    }

    let container = Container {
        name: APP_NAME.to_string(),
        image: Some(format!("appscode/guard:{}", image_tag)),
        args: Some(args),
        ports: Some(vec![
            tcp_port(WEB_PORT_NAME, WEB_PORT),
            tcp_port(OPS_PORT_NAME, OPS_PORT),
        ]),
        volume_mounts: Some(volume_mounts),
        ..Default::default()
    };

    Deployment {
        metadata: meta(APP_NAME, Some(namespace)),
        spec: Some(DeploymentSpec {
            replicas: Some(1),
            selector: LabelSelector {
                match_labels: Some(labels()),
                ..Default::default()
            },
            template: PodTemplateSpec {
                metadata: Some(ObjectMeta {
                    labels: Some(labels()),
                    ..Default::default()
                }),
                spec: Some(PodSpec {
                    containers: vec![container],
                    volumes: Some(volumes),
                    service_account_name: enable_rbac.then(|| APP_NAME.to_string()),
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    }
}

pub fn new_service(namespace: &str, host: &str, port: u16) -> Service {
    Service {
        metadata: meta(APP_NAME, Some(namespace)),
        spec: Some(ServiceSpec {
            type_: Some("ClusterIP".to_string()),
            cluster_ip: Some(host.to_string()),
            ports: Some(vec![ServicePort {
                name: Some(WEB_PORT_NAME.to_string()),
                port: i32::from(port),
                protocol: Some("TCP".to_string()),
                target_port: Some(IntOrString::String(WEB_PORT_NAME.to_string())),
                ..Default::default()
            }]),
            selector: Some(labels()),
            ..Default::default()
        }),
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deployment_without_options() {
        let deployment = new_deployment("kube-system", "canary", false, false);
        let spec = deployment.spec.unwrap();
        let pod = spec.template.spec.unwrap();
        let container = &pod.containers[0];

        assert_eq!(container.image.as_deref(), Some("appscode/guard:canary"));
        assert_eq!(container.args.as_ref().unwrap().len(), 5);
        assert_eq!(pod.volumes.as_ref().unwrap().len(), 1);
        assert!(pod.service_account_name.is_none());
    }

    #[test]
    fn token_auth_adds_flag_mount_and_volume_together() {
        let deployment = new_deployment("auth", "v0.1.0", true, true);
        let pod = deployment.spec.unwrap().template.spec.unwrap();
        let container = &pod.containers[0];

        assert_eq!(
            container.args.as_ref().unwrap().last().map(String::as_str),
            Some("--token-auth-file=/etc/guard/auth/token.csv")
        );
        let mounts: Vec<&str> = container
            .volume_mounts
            .as_ref()
            .unwrap()
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(mounts, vec![PKI_SECRET, TOKEN_AUTH_SECRET]);

        let volumes = pod.volumes.unwrap();
        for volume in &volumes {
            let secret = volume.secret.as_ref().unwrap();
            assert_eq!(secret.secret_name.as_deref(), Some(volume.name.as_str()));
            assert_eq!(secret.default_mode, Some(0o555));
        }
        assert_eq!(pod.service_account_name.as_deref(), Some("guard"));
    }

    #[test]
    fn service_targets_named_port() {
        let service = new_service("kube-system", "10.96.10.96", 9844);
        let spec = service.spec.unwrap();
        let port = &spec.ports.unwrap()[0];
        assert_eq!(spec.cluster_ip.as_deref(), Some("10.96.10.96"));
        assert_eq!(port.port, 9844);
        assert_eq!(
            port.target_port,
            Some(IntOrString::String("web".to_string()))
        );
        assert_eq!(spec.selector, Some(labels()));
    }

    #[test]
    fn binding_points_at_role_and_service_account() {
        let role = new_cluster_role();
        let binding = new_cluster_role_binding("auth");
        let account = new_service_account("auth");

        assert_eq!(binding.role_ref.name, role.metadata.name.clone().unwrap());
        let subject = &binding.subjects.unwrap()[0];
        assert_eq!(Some(subject.name.clone()), account.metadata.name);
        assert_eq!(subject.namespace, account.metadata.namespace);
        assert!(role.metadata.namespace.is_none());
    }
}
