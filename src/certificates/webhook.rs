//! Certificate configs for webhook servers
//!
//! Picks the names a webhook server certificate is issued for, based on how the
//! webhook is reached: through a literal URL/address or through an in-cluster
//! service.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::time::Duration;

use log::debug;
use serde::{Deserialize, Serialize};
use url::{Host, Url};

use super::config::{CertType, CertificateConfig};
use crate::error::CertError;

/// Prefix of every extension component name
pub const NAME_PREFIX: &str = "gardener-extension-";

/// Validity of the webhook CA. There is no renewal, so it is long.
pub const CA_CERTIFICATE_VALIDITY: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

/// How the webhook server is addressed by its clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Reached through a literal URL, hostname or IP address
    #[default]
    Url,
    /// Reached through an in-cluster service DNS name
    Service,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Url => "url",
            Mode::Service => "service",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = CertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "url" => Ok(Mode::Url),
            "service" => Ok(Mode::Service),
            other => Err(CertError::InvalidMode(other.to_string())),
        }
    }
}

/// Prepend [`NAME_PREFIX`] unless the name already carries it
pub fn prefixed_name(name: &str) -> String {
    if name.starts_with(NAME_PREFIX) {
        name.to_string()
    } else {
        format!("{NAME_PREFIX}{name}")
    }
}

/// CA config for the webhook server of `name`
pub fn ca_config(name: &str) -> CertificateConfig {
    CertificateConfig::new(name, name, CertType::Ca).validity(CA_CERTIFICATE_VALIDITY)
}

/// Server certificate config for a webhook.
///
/// The returned config has no signing CA; callers attach one before generating.
pub fn server_config(
    name: &str,
    namespace: &str,
    component_name: &str,
    mode: Mode,
    url: &str,
) -> Result<CertificateConfig, CertError> {
    let mut config = CertificateConfig::new(name, component_name, CertType::Server)
        .skip_publishing_ca_certificate(true);

    match mode {
        Mode::Url => {
            let server_name = server_name(url)?;
            config = match server_name.parse::<IpAddr>() {
                Ok(addr) => config.add_ip_address(addr),
                Err(_) => config.add_dns_name(server_name),
            };
        }
        Mode::Service => {
            let service_name = prefixed_name(component_name);
            config = config.add_dns_name(service_name.as_str());
            if !namespace.is_empty() {
                config = config
                    .add_dns_name(format!("{service_name}.{namespace}"))
                    .add_dns_name(format!("{service_name}.{namespace}.svc"));
            }
        }
    }

    debug!(
        "Webhook server certificate for '{}' in {} mode: dns={:?} ip={:?}",
        name, mode, config.dns_names, config.ip_addresses
    );
    Ok(config)
}

/// Host portion of a webhook URL.
///
/// `host:port` yields `host`; a bare host, IP or IPv6 literal is returned as is.
/// An empty host is a [`CertError::MissingHost`].
fn server_name(url: &str) -> Result<String, CertError> {
    if url.contains("://") {
        let parsed = Url::parse(url).map_err(|source| CertError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;
        return match parsed.host() {
            Some(Host::Domain(domain)) => Ok(domain.to_string()),
            Some(Host::Ipv4(addr)) => Ok(addr.to_string()),
            Some(Host::Ipv6(addr)) => Ok(addr.to_string()),
            None => Err(CertError::MissingHost(url.to_string())),
        };
    }

    // [::1]:8443
    let host = match url.strip_prefix('[').and_then(|rest| rest.split_once(']')) {
        Some((addr, _)) => addr,
        None => match url.splitn(3, ':').collect::<Vec<_>>().as_slice() {
            [host, _port] => *host,
            _ => url,
        },
    };

    if host.is_empty() {
        return Err(CertError::MissingHost(url.to_string()));
    }
    Ok(host.to_string())
}
