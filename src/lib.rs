//! One-off certificate authority and server certificates for webhook servers
//!
//! Intended for running a webhook server locally: a fresh CA is generated on
//! every call, the server certificate is written to disk and the CA certificate
//! is handed back to register with the webhook's clients.

pub mod certificates;
pub mod error;

pub use certificates::{Mode, generate_unmanaged_certificates, generate_unmanaged_certificates_in_namespace};
pub use error::CertError;
