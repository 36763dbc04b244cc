//! Read back generated certificates: names, validity and issuer checks

use std::net::IpAddr;

use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::GeneralName;

use crate::error::CertError;

/// Subject alternative names in certificate order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectAltNames {
    pub dns_names: Vec<String>,
    pub ip_addresses: Vec<IpAddr>,
}

/// Parsed view of a PEM certificate
#[derive(Debug, Clone)]
pub struct CertificateSummary {
    pub common_name: Option<String>,
    pub is_ca: bool,
    /// Unix timestamp
    pub not_before: i64,
    /// Unix timestamp
    pub not_after: i64,
    pub subject_alt_names: SubjectAltNames,
}

/// Parse a PEM certificate and collect its identity and validity
pub fn inspect_certificate_pem(cert_pem: &[u8]) -> Result<CertificateSummary, CertError> {
    let der = decode_certificate_pem(cert_pem)?;
    let cert = parse_der(&der)?;

    let common_name = cert
        .subject()
        .iter_common_name()
        .next()
        .and_then(|cn| cn.as_str().ok())
        .map(str::to_string);

    Ok(CertificateSummary {
        common_name,
        is_ca: cert.is_ca(),
        not_before: cert.validity().not_before.timestamp(),
        not_after: cert.validity().not_after.timestamp(),
        subject_alt_names: extract_sans(&cert)?,
    })
}

/// Check that `leaf_pem` was issued and signed by `ca_pem`
pub fn verify_signed_by(leaf_pem: &[u8], ca_pem: &[u8]) -> Result<(), CertError> {
    let leaf_der = decode_certificate_pem(leaf_pem)?;
    let ca_der = decode_certificate_pem(ca_pem)?;
    let leaf = parse_der(&leaf_der)?;
    let ca = parse_der(&ca_der)?;

    if leaf.issuer().as_raw() != ca.subject().as_raw() {
        return Err(CertError::SignatureMismatch(format!(
            "issuer '{}' does not match CA subject '{}'",
            leaf.issuer(),
            ca.subject()
        )));
    }

    leaf.verify_signature(Some(ca.public_key()))
        .map_err(|e| CertError::SignatureMismatch(e.to_string()))
}

fn decode_certificate_pem(cert_pem: &[u8]) -> Result<Vec<u8>, CertError> {
    let block = pem::parse(cert_pem)?;
    if block.tag() != "CERTIFICATE" {
        return Err(CertError::UnexpectedPemTag(block.tag().to_string()));
    }
    Ok(block.into_contents())
}

fn parse_der(der: &[u8]) -> Result<X509Certificate<'_>, CertError> {
    x509_parser::parse_x509_certificate(der)
        .map(|(_, cert)| cert)
        .map_err(|e| CertError::X509(e.to_string()))
}

fn extract_sans(cert: &X509Certificate<'_>) -> Result<SubjectAltNames, CertError> {
    let mut sans = SubjectAltNames::default();

    let Some(san_ext) = cert
        .subject_alternative_name()
        .map_err(|e| CertError::X509(e.to_string()))?
    else {
        return Ok(sans);
    };

    for name in &san_ext.value.general_names {
        match name {
            GeneralName::DNSName(dns) => sans.dns_names.push((*dns).to_string()),
            GeneralName::IPAddress(bytes) => {
                if let Some(addr) = ip_from_bytes(bytes) {
                    sans.ip_addresses.push(addr);
                }
            }
            _ => {}
        }
    }
    Ok(sans)
}

fn ip_from_bytes(bytes: &[u8]) -> Option<IpAddr> {
    match bytes.len() {
        4 => <[u8; 4]>::try_from(bytes).ok().map(IpAddr::from),
        16 => <[u8; 16]>::try_from(bytes).ok().map(IpAddr::from),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::certificates::config::{CertType, CertificateConfig};

    #[test]
    fn reads_dns_and_ip_sans_in_order() {
        let cert = CertificateConfig::new("c", "example", CertType::Server)
            .add_dns_name("a.example")
            .add_dns_name("b.example")
            .add_ip_address("127.0.0.1".parse().unwrap())
            .add_ip_address("::1".parse().unwrap())
            .generate()
            .unwrap();

        let summary = inspect_certificate_pem(&cert.certificate_pem).unwrap();
        assert_eq!(summary.common_name.as_deref(), Some("example"));
        assert_eq!(summary.subject_alt_names.dns_names, vec!["a.example", "b.example"]);
        assert_eq!(
            summary.subject_alt_names.ip_addresses,
            vec![
                "127.0.0.1".parse::<IpAddr>().unwrap(),
                "::1".parse::<IpAddr>().unwrap()
            ]
        );
        assert!(summary.not_before < summary.not_after);
    }

    #[test]
    fn rejects_private_key_pem() {
        let cert = CertificateConfig::new("c", "c", CertType::Server)
            .generate()
            .unwrap();
        let err = inspect_certificate_pem(&cert.private_key_pem).unwrap_err();
        assert!(matches!(err, CertError::UnexpectedPemTag(tag) if tag == "PRIVATE KEY"));
    }

    #[test]
    fn rejects_garbage() {
        assert!(matches!(
            inspect_certificate_pem(b"not a certificate"),
            Err(CertError::Pem(_))
        ));
    }

    #[test]
    fn verification_fails_against_unrelated_ca() {
        let ca = CertificateConfig::new("ca", "ca", CertType::Ca).generate().unwrap();
        let other_ca = CertificateConfig::new("other", "other", CertType::Ca)
            .generate()
            .unwrap();
        let leaf = CertificateConfig::new("leaf", "leaf", CertType::Server)
            .signed_by(ca)
            .generate()
            .unwrap();

        let err = verify_signed_by(&leaf.certificate_pem, &other_ca.certificate_pem).unwrap_err();
        assert!(matches!(err, CertError::SignatureMismatch(_)));
    }

    #[test]
    fn verification_fails_against_same_named_ca_with_other_key() {
        let ca = CertificateConfig::new("ca", "ca", CertType::Ca).generate().unwrap();
        let impostor = CertificateConfig::new("ca", "ca", CertType::Ca).generate().unwrap();
        let leaf = CertificateConfig::new("leaf", "leaf", CertType::Server)
            .signed_by(ca.clone())
            .generate()
            .unwrap();

        verify_signed_by(&leaf.certificate_pem, &ca.certificate_pem).unwrap();
        assert!(verify_signed_by(&leaf.certificate_pem, &impostor.certificate_pem).is_err());
    }
}
