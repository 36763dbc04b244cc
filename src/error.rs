//! Error type shared by the certificate generation pipeline

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Errors raised while building, generating, persisting or inspecting certificates
#[derive(Debug, Error)]
pub enum CertError {
    #[error("certificate generation failed: {0}")]
    Generation(#[from] rcgen::Error),

    #[error("invalid webhook mode '{0}' (expected 'url' or 'service')")]
    InvalidMode(String),

    #[error("invalid webhook url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("webhook url '{0}' has no host")]
    MissingHost(String),

    #[error("validity of {0:?} does not fit into a certificate")]
    InvalidValidity(Duration),

    #[error("signing certificate '{0}' is not a certificate authority")]
    NotACertificateAuthority(String),

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse PEM: {0}")]
    Pem(#[from] pem::PemError),

    #[error("unexpected PEM block '{0}', expected CERTIFICATE")]
    UnexpectedPemTag(String),

    #[error("failed to parse X.509 certificate: {0}")]
    X509(String),

    #[error("certificate signature check failed: {0}")]
    SignatureMismatch(String),
}

impl CertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CertError::Io {
            path: path.into(),
            source,
        }
    }
}
