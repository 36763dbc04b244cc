//! Certificate configuration and generation
//!
//! A [`CertificateConfig`] describes a single certificate: its names, its type,
//! how long it is valid and optionally the CA that signs it. Calling
//! [`CertificateConfig::generate`] produces PEM encoded certificate and key.

use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};
use rcgen::string::Ia5String;
use rcgen::{
    BasicConstraints, CertificateParams, DistinguishedName, DnType, ExtendedKeyUsagePurpose, IsCa,
    Issuer, KeyPair, KeyUsagePurpose, SanType,
};
use time::OffsetDateTime;

use crate::error::CertError;

/// File/data key of a leaf private key
pub const DATA_KEY_PRIVATE_KEY: &str = "tls.key";
/// File/data key of a leaf certificate
pub const DATA_KEY_CERTIFICATE: &str = "tls.crt";
/// File/data key of a CA certificate
pub const DATA_KEY_CERTIFICATE_CA: &str = "ca.crt";
/// File/data key of a CA private key
pub const DATA_KEY_PRIVATE_KEY_CA: &str = "ca.key";

/// Validity used when a config leaves it unset (10 years)
pub const DEFAULT_VALIDITY: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// Kind of certificate to issue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertType {
    /// Certificate authority able to sign other certificates
    Ca,
    /// TLS server certificate
    Server,
    /// TLS client certificate
    Client,
    /// Certificate usable for both server and client authentication
    ServerClient,
}

impl CertType {
    pub fn is_ca(self) -> bool {
        matches!(self, CertType::Ca)
    }

    fn key_usages(self) -> Vec<KeyUsagePurpose> {
        match self {
            CertType::Ca => vec![
                KeyUsagePurpose::KeyCertSign,
                KeyUsagePurpose::CrlSign,
                KeyUsagePurpose::DigitalSignature,
            ],
            CertType::Server | CertType::Client | CertType::ServerClient => vec![
                KeyUsagePurpose::DigitalSignature,
                KeyUsagePurpose::KeyEncipherment,
            ],
        }
    }

    fn extended_key_usages(self) -> Vec<ExtendedKeyUsagePurpose> {
        match self {
            CertType::Ca => Vec::new(),
            CertType::Server => vec![ExtendedKeyUsagePurpose::ServerAuth],
            CertType::Client => vec![ExtendedKeyUsagePurpose::ClientAuth],
            CertType::ServerClient => vec![
                ExtendedKeyUsagePurpose::ServerAuth,
                ExtendedKeyUsagePurpose::ClientAuth,
            ],
        }
    }
}

/// Description of a certificate to generate
#[derive(Debug, Clone)]
pub struct CertificateConfig {
    pub name: String,
    pub common_name: String,
    pub organization: Option<String>,
    pub dns_names: Vec<String>,
    pub ip_addresses: Vec<IpAddr>,
    pub cert_type: CertType,
    pub validity: Option<Duration>,
    pub signing_ca: Option<Certificate>,
    pub skip_publishing_ca_certificate: bool,
}

impl CertificateConfig {
    /// Create a config with no SANs, default validity and no signing CA
    pub fn new(name: impl Into<String>, common_name: impl Into<String>, cert_type: CertType) -> Self {
        Self {
            name: name.into(),
            common_name: common_name.into(),
            organization: None,
            dns_names: Vec::new(),
            ip_addresses: Vec::new(),
            cert_type,
            validity: None,
            signing_ca: None,
            skip_publishing_ca_certificate: false,
        }
    }

    /// Set organization
    pub fn organization(mut self, org: impl Into<String>) -> Self {
        self.organization = Some(org.into());
        self
    }

    /// Append a DNS SAN
    pub fn add_dns_name(mut self, dns_name: impl Into<String>) -> Self {
        self.dns_names.push(dns_name.into());
        self
    }

    /// Add an IP SAN, ignoring duplicates
    pub fn add_ip_address(mut self, addr: IpAddr) -> Self {
        if !self.ip_addresses.contains(&addr) {
            self.ip_addresses.push(addr);
        }
        self
    }

    /// Set validity period
    pub fn validity(mut self, validity: Duration) -> Self {
        self.validity = Some(validity);
        self
    }

    /// Attach the CA that signs this certificate
    pub fn signed_by(mut self, ca: Certificate) -> Self {
        self.signing_ca = Some(ca);
        self
    }

    /// Keep the signing CA out of the generated certificate's data
    pub fn skip_publishing_ca_certificate(mut self, skip: bool) -> Self {
        self.skip_publishing_ca_certificate = skip;
        self
    }

    /// Generate the certificate and a fresh key pair.
    ///
    /// Signs with `signing_ca` when set and self-signs otherwise.
    pub fn generate(&self) -> Result<Certificate, CertError> {
        let params = self.certificate_params()?;
        let key_pair = KeyPair::generate()?;

        let cert = match &self.signing_ca {
            Some(ca) => {
                let signer = ca
                    .signer
                    .as_ref()
                    .ok_or_else(|| CertError::NotACertificateAuthority(ca.name.clone()))?;
                let issuer = Issuer::from_params(&signer.params, &signer.key_pair);
                params.signed_by(&key_pair, &issuer)?
            }
            None => params.self_signed(&key_pair)?,
        };

        info!(
            "Generated {:?} certificate '{}' (CN={})",
            self.cert_type, self.name, self.common_name
        );

        let ca = match &self.signing_ca {
            Some(ca) if !self.skip_publishing_ca_certificate => Some(Box::new(ca.clone())),
            _ => None,
        };

        let certificate_pem = cert.pem().into_bytes();
        let private_key_pem = key_pair.serialize_pem().into_bytes();
        let signer = self
            .cert_type
            .is_ca()
            .then(|| Arc::new(CaSigner { params, key_pair }));

        Ok(Certificate {
            name: self.name.clone(),
            certificate_pem,
            private_key_pem,
            ca,
            signer,
        })
    }

    fn certificate_params(&self) -> Result<CertificateParams, CertError> {
        let mut params = CertificateParams::default();

        let mut dn = DistinguishedName::new();
        dn.push(DnType::CommonName, self.common_name.as_str());
        if let Some(org) = &self.organization {
            dn.push(DnType::OrganizationName, org.as_str());
        }
        params.distinguished_name = dn;

        let mut sans = Vec::with_capacity(self.dns_names.len() + self.ip_addresses.len());
        for dns_name in &self.dns_names {
            sans.push(SanType::DnsName(Ia5String::try_from(dns_name.as_str())?));
        }
        sans.extend(self.ip_addresses.iter().copied().map(SanType::IpAddress));
        debug!(
            "Certificate '{}' SANs: dns={:?} ip={:?}",
            self.name, self.dns_names, self.ip_addresses
        );
        params.subject_alt_names = sans;

        let validity = self.validity.unwrap_or(DEFAULT_VALIDITY);
        let seconds =
            i64::try_from(validity.as_secs()).map_err(|_| CertError::InvalidValidity(validity))?;
        let now = OffsetDateTime::now_utc();
        params.not_before = now;
        params.not_after = now
            .checked_add(time::Duration::seconds(seconds))
            .ok_or(CertError::InvalidValidity(validity))?;

        params.is_ca = if self.cert_type.is_ca() {
            IsCa::Ca(BasicConstraints::Unconstrained)
        } else {
            IsCa::NoCa
        };
        params.key_usages = self.cert_type.key_usages();
        params.extended_key_usages = self.cert_type.extended_key_usages();

        Ok(params)
    }
}

/// Parameters and key a generated CA keeps to sign leaf certificates
struct CaSigner {
    params: CertificateParams,
    key_pair: KeyPair,
}

/// Generated certificate material
#[derive(Clone)]
pub struct Certificate {
    pub name: String,
    pub certificate_pem: Vec<u8>,
    pub private_key_pem: Vec<u8>,
    /// Signing CA, unless publishing it was skipped
    pub ca: Option<Box<Certificate>>,
    signer: Option<Arc<CaSigner>>,
}

impl Certificate {
    /// Whether this certificate can sign others
    pub fn is_ca(&self) -> bool {
        self.signer.is_some()
    }

    /// Certificate material keyed by its conventional file names
    pub fn secret_data(&self) -> BTreeMap<&'static str, Vec<u8>> {
        let mut data = BTreeMap::new();
        if self.is_ca() {
            data.insert(DATA_KEY_PRIVATE_KEY_CA, self.private_key_pem.clone());
            data.insert(DATA_KEY_CERTIFICATE_CA, self.certificate_pem.clone());
            return data;
        }

        data.insert(DATA_KEY_PRIVATE_KEY, self.private_key_pem.clone());
        data.insert(DATA_KEY_CERTIFICATE, self.certificate_pem.clone());
        if let Some(ca) = &self.ca {
            data.insert(DATA_KEY_CERTIFICATE_CA, ca.certificate_pem.clone());
        }
        data
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("name", &self.name)
            .field("is_ca", &self.is_ca())
            .field("ca", &self.ca.as_ref().map(|ca| ca.name.as_str()))
            .finish_non_exhaustive()
    }
}
