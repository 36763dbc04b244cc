//! Writes server certificate material to a directory

use std::fs;
use std::path::Path;

use log::info;

use super::config::{DATA_KEY_CERTIFICATE, DATA_KEY_PRIVATE_KEY};
use crate::error::CertError;

#[cfg(unix)]
const DIR_MODE: u32 = 0o755;
#[cfg(unix)]
const FILE_MODE: u32 = 0o666;

/// Write `tls.key` and `tls.crt` into `cert_dir`, creating the directory if needed.
///
/// Existing files are overwritten. A failed write leaves whatever was already
/// written in place.
pub fn write_certificates_to_disk(
    cert_dir: &Path,
    server_cert: &[u8],
    server_key: &[u8],
) -> Result<(), CertError> {
    let server_key_path = cert_dir.join(DATA_KEY_PRIVATE_KEY);
    let server_cert_path = cert_dir.join(DATA_KEY_CERTIFICATE);

    create_cert_dir(cert_dir)?;
    write_file(&server_key_path, server_key)?;
    write_file(&server_cert_path, server_cert)?;

    info!(
        "Wrote server certificate to {} and key to {}",
        server_cert_path.display(),
        server_key_path.display()
    );
    Ok(())
}

fn create_cert_dir(dir: &Path) -> Result<(), CertError> {
    cfg_if::cfg_if! {
        if #[cfg(unix)] {
            create_dir_with_mode(dir)
        } else {
            fs::create_dir_all(dir).map_err(|e| CertError::io(dir, e))
        }
    }
}

fn write_file(path: &Path, contents: &[u8]) -> Result<(), CertError> {
    cfg_if::cfg_if! {
        if #[cfg(unix)] {
            write_file_with_mode(path, contents)
        } else {
            fs::write(path, contents).map_err(|e| CertError::io(path, e))
        }
    }
}

#[cfg(unix)]
fn create_dir_with_mode(dir: &Path) -> Result<(), CertError> {
    use std::os::unix::fs::DirBuilderExt;

    fs::DirBuilder::new()
        .recursive(true)
        .mode(DIR_MODE)
        .create(dir)
        .map_err(|e| CertError::io(dir, e))
}

#[cfg(unix)]
fn write_file_with_mode(path: &Path, contents: &[u8]) -> Result<(), CertError> {
    use std::io::Write;
    use std::os::unix::fs::OpenOptionsExt;

    let mut file = fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .mode(FILE_MODE)
        .open(path)
        .map_err(|e| CertError::io(path, e))?;
    file.write_all(contents)
        .map_err(|e| CertError::io(path, e))
}
