mod cli;
mod config;

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use webhook_certs::certificates::inspect_certificate_pem;

fn main() {
    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {} {}:{}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(e) = real_main() {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<()> {
    let args = cli::Args::parse();

    match args.sub.unwrap_or_else(cli::Cmd::default_generate) {
        cli::Cmd::Generate {
            provider,
            cert_dir,
            mode,
            url,
            namespace,
            ca_out,
            config,
        } => {
            let mut cfg = config::CertgenConfig::load(config.as_deref())?;
            if let Some(provider) = provider {
                cfg.provider_name = provider;
            }
            if let Some(cert_dir) = cert_dir {
                cfg.cert_dir = Some(cert_dir);
            }
            if let Some(mode) = mode {
                cfg.mode = mode;
            }
            if let Some(url) = url {
                cfg.url = url;
            }
            if let Some(namespace) = namespace {
                cfg.namespace = namespace;
            }
            handle_generate(&cfg, ca_out)
        }
        cli::Cmd::Inspect { cert } => handle_inspect(&cert),
    }
}

/// Handle generate command - write the server pair and emit the CA
fn handle_generate(cfg: &config::CertgenConfig, ca_out: Option<PathBuf>) -> Result<()> {
    let cert_dir = cfg.resolved_cert_dir();
    info!(
        "Generating webhook certificates for '{}' in {} mode",
        cfg.provider_name, cfg.mode
    );

    let ca_pem = webhook_certs::generate_unmanaged_certificates_in_namespace(
        &cfg.provider_name,
        &cfg.namespace,
        &cert_dir,
        cfg.mode,
        &cfg.url,
    )
    .context("Failed to generate webhook certificates")?;

    match ca_out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).context("Failed to create CA output directory")?;
            }
            fs::write(&path, &ca_pem)
                .with_context(|| format!("Failed to write CA certificate to {}", path.display()))?;
            info!("Wrote CA certificate to {}", path.display());
        }
        None => {
            std::io::stdout()
                .write_all(&ca_pem)
                .context("Failed to write CA certificate to stdout")?;
        }
    }
    Ok(())
}

/// Handle inspect command - print what a certificate is valid for
fn handle_inspect(cert_path: &Path) -> Result<()> {
    let cert_pem = fs::read(cert_path)
        .with_context(|| format!("Failed to read certificate {}", cert_path.display()))?;
    let summary = inspect_certificate_pem(&cert_pem)
        .with_context(|| format!("Failed to inspect certificate {}", cert_path.display()))?;

    let not_after = time::OffsetDateTime::from_unix_timestamp(summary.not_after)
        .context("Certificate expiry out of range")?;

    println!(
        "common name: {}",
        summary.common_name.as_deref().unwrap_or("<none>")
    );
    println!("ca:          {}", summary.is_ca);
    println!("not after:   {not_after}");
    for dns in &summary.subject_alt_names.dns_names {
        println!("dns:         {dns}");
    }
    for ip in &summary.subject_alt_names.ip_addresses {
        println!("ip:          {ip}");
    }
    Ok(())
}
