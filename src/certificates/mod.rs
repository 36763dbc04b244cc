//! Unmanaged webhook certificates for local development
//!
//! Generates a one-off CA and a server certificate signed by it, and writes the
//! server key pair to a directory. Nothing is cached: each call creates a new CA.

mod config;
mod disk;
mod inspect;
mod webhook;

use std::path::Path;

use log::info;

pub use config::{
    CertType, Certificate, CertificateConfig, DATA_KEY_CERTIFICATE, DATA_KEY_CERTIFICATE_CA,
    DATA_KEY_PRIVATE_KEY, DATA_KEY_PRIVATE_KEY_CA, DEFAULT_VALIDITY,
};
pub use disk::write_certificates_to_disk;
pub use inspect::{CertificateSummary, SubjectAltNames, inspect_certificate_pem, verify_signed_by};
pub use webhook::{CA_CERTIFICATE_VALIDITY, Mode, NAME_PREFIX, ca_config, prefixed_name, server_config};

use crate::error::CertError;

/// Generate a one-off CA and server certificate for a webhook server.
///
/// The server certificate and key are written to `cert_dir` as `tls.crt` and
/// `tls.key`. Returns the CA certificate PEM so the caller can register it with
/// whatever calls the webhook.
pub fn generate_unmanaged_certificates(
    provider_name: &str,
    cert_dir: &Path,
    mode: Mode,
    url: &str,
) -> Result<Vec<u8>, CertError> {
    generate_unmanaged_certificates_in_namespace(provider_name, "", cert_dir, mode, url)
}

/// Like [`generate_unmanaged_certificates`], with the namespace used for
/// service DNS names in [`Mode::Service`]
pub fn generate_unmanaged_certificates_in_namespace(
    provider_name: &str,
    namespace: &str,
    cert_dir: &Path,
    mode: Mode,
    url: &str,
) -> Result<Vec<u8>, CertError> {
    let ca_cert = ca_config(provider_name).generate()?;

    let server_cert = server_config(provider_name, namespace, provider_name, mode, url)?
        .signed_by(ca_cert.clone())
        .generate()?;

    write_certificates_to_disk(
        cert_dir,
        &server_cert.certificate_pem,
        &server_cert.private_key_pem,
    )?;

    info!(
        "Generated unmanaged webhook certificates for '{}' ({} mode) in {}",
        provider_name,
        mode,
        cert_dir.display()
    );
    Ok(ca_cert.certificate_pem)
}
