use std::path::PathBuf;

use clap::builder::{PossibleValuesParser, TypedValueParser};
use clap::{Parser, Subcommand};
use webhook_certs::Mode;

#[derive(Parser, Debug)]
#[command(version, about = "one-off webhook certificates for local development")]
pub struct Args {
    /// Sub‑commands (generate, inspect)
    #[command(subcommand)]
    pub sub: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Generate a CA and server certificate (default if no sub‑command)
    Generate {
        /// Provider name, used for the CA and the service DNS names
        #[arg(long)]
        provider: Option<String>,

        /// Directory receiving tls.key and tls.crt
        #[arg(long)]
        cert_dir: Option<PathBuf>,

        /// How the webhook is reached
        #[arg(long, value_parser = mode_parser())]
        mode: Option<Mode>,

        /// Webhook address in url mode (host, host:port, IP or full URL)
        #[arg(long)]
        url: Option<String>,

        /// Namespace of the webhook service in service mode
        #[arg(long)]
        namespace: Option<String>,

        /// Write the CA certificate here instead of stdout
        #[arg(long)]
        ca_out: Option<PathBuf>,

        /// Path to configuration file
        #[arg(long, short = 'c')]
        config: Option<PathBuf>,
    },
    /// Print common name, CA flag, expiry and SANs of a PEM certificate
    Inspect {
        /// Certificate file
        cert: PathBuf,
    },
}

impl Cmd {
    pub fn default_generate() -> Self {
        Cmd::Generate {
            provider: None,
            cert_dir: None,
            mode: None,
            url: None,
            namespace: None,
            ca_out: None,
            config: None,
        }
    }
}

fn mode_parser() -> impl TypedValueParser<Value = Mode> {
    PossibleValuesParser::new([Mode::Url.as_str(), Mode::Service.as_str()])
        .try_map(|mode| mode.parse::<Mode>())
}
