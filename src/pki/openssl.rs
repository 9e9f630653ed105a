// src/pki/openssl.rs
use super::types::{CertRequest, ExtKeyUsage};
use openssl::{
    asn1::{Asn1Integer, Asn1Time},
    bn::{BigNum, MsbOption},
    error::ErrorStack,
    hash::MessageDigest,
    nid::Nid,
    pkey::{PKey, PKeyRef, Private},
    rsa::Rsa,
    x509::{
        extension::{
            AuthorityKeyIdentifier, BasicConstraints, ExtendedKeyUsage, KeyUsage,
            SubjectAlternativeName, SubjectKeyIdentifier,
        },
        X509Builder, X509Name, X509NameBuilder, X509Ref, X509,
    },
};

pub const KEY_SIZE: u32 = 2048;
pub const CERT_VALIDITY_DAYS: u32 = 365;
pub const CA_VALIDITY_DAYS: u32 = 3650;

pub fn generate_private_key() -> Result<PKey<Private>, ErrorStack> {
    PKey::from_rsa(Rsa::generate(KEY_SIZE)?)
}

fn random_serial() -> Result<Asn1Integer, ErrorStack> {
    let mut serial = BigNum::new()?;
    serial.rand(128, MsbOption::MAYBE_ZERO, false)?;
    serial.to_asn1_integer()
}

fn subject_name(common_name: &str, organization: &[String]) -> Result<X509Name, ErrorStack> {
    let mut name = X509NameBuilder::new()?;
    for org in organization {
        name.append_entry_by_nid(Nid::ORGANIZATIONNAME, org)?;
    }
    name.append_entry_by_nid(Nid::COMMONNAME, common_name)?;
    Ok(name.build())
}

fn new_builder(
    subject: &X509Name,
    key: &PKeyRef<Private>,
    validity_days: u32,
) -> Result<X509Builder, ErrorStack> {
    let mut builder = X509Builder::new()?;
    builder.set_version(2)?;
    let serial = random_serial()?;
    builder.set_serial_number(&serial)?;
    builder.set_subject_name(subject)?;
    builder.set_pubkey(key)?;
    let not_before = Asn1Time::days_from_now(0)?;
    let not_after = Asn1Time::days_from_now(validity_days)?;
    builder.set_not_before(&not_before)?;
    builder.set_not_after(&not_after)?;
    Ok(builder)
}

/// Self-signed CA certificate and its key.
pub fn self_signed_ca(
    common_name: &str,
    organization: &[String],
) -> Result<(X509, PKey<Private>), ErrorStack> {
    let key = generate_private_key()?;
    let name = subject_name(common_name, organization)?;

    let mut builder = new_builder(&name, &key, CA_VALIDITY_DAYS)?;
    builder.set_issuer_name(&name)?;
    builder.append_extension(BasicConstraints::new().critical().ca().build()?)?;
    builder.append_extension(
        KeyUsage::new()
            .critical()
            .digital_signature()
            .key_encipherment()
            .key_cert_sign()
            .crl_sign()
            .build()?,
    )?;
    let ski = SubjectKeyIdentifier::new().build(&builder.x509v3_context(None, None))?;
    builder.append_extension(ski)?;

    builder.sign(&key, MessageDigest::sha256())?;
    Ok((builder.build(), key))
}

/// Leaf certificate for `request`, signed by the given CA.
pub fn sign_certificate(
    request: &CertRequest,
    ca_cert: &X509Ref,
    ca_key: &PKeyRef<Private>,
) -> Result<(X509, PKey<Private>), ErrorStack> {
    let key = generate_private_key()?;
    let name = subject_name(&request.common_name, &request.organization)?;

    let mut builder = new_builder(&name, &key, CERT_VALIDITY_DAYS)?;
    builder.set_issuer_name(ca_cert.subject_name())?;
    builder.append_extension(BasicConstraints::new().critical().build()?)?;
    builder.append_extension(
        KeyUsage::new()
            .critical()
            .digital_signature()
            .key_encipherment()
            .build()?,
    )?;

    if !request.usages.is_empty() {
        let mut eku = ExtendedKeyUsage::new();
        for usage in &request.usages {
            match usage {
                ExtKeyUsage::ServerAuth => eku.server_auth(),
                ExtKeyUsage::ClientAuth => eku.client_auth(),
            };
        }
        builder.append_extension(eku.build()?)?;
    }

    if !request.alt_names.is_empty() {
        let mut san = SubjectAlternativeName::new();
        for dns in &request.alt_names.dns_names {
            san.dns(dns);
        }
        for ip in &request.alt_names.ips {
            san.ip(&ip.to_string());
        }
        let san = san.build(&builder.x509v3_context(Some(ca_cert), None))?;
        builder.append_extension(san)?;
    }

    let aki = AuthorityKeyIdentifier::new()
        .keyid(false)
        .issuer(false)
        .build(&builder.x509v3_context(Some(ca_cert), None))?;
    builder.append_extension(aki)?;

    builder.sign(ca_key, MessageDigest::sha256())?;
    Ok((builder.build(), key))
}

/// Hex SHA-256 of the DER encoding, as shown in log lines.
pub fn fingerprint(cert: &X509Ref) -> Result<String, ErrorStack> {
    let digest = cert.digest(MessageDigest::sha256())?;
    Ok(hex::encode(&*digest))
}
