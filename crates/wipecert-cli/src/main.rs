//! wipecert - verify a scanned wipe certificate
//!
//! Reads a certificate token from an argument, a file, or stdin, verifies it
//! offline against the key compiled into `wipecert`, and prints the result.

use std::fmt::Write as _;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use wipecert::{Certificate, CertificateVerifier, ClaimsValidation, VerificationResult};

const EXIT_VALID: u8 = 0;
const EXIT_INVALID: u8 = 1;
const EXIT_ERROR: u8 = 2;

/// wipecert - offline wipe certificate verifier
#[derive(Parser, Debug)]
#[command(name = "wipecert")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Certificate token (read from stdin when neither TOKEN nor --file is given)
    #[arg(conflicts_with = "file")]
    token: Option<String>,

    /// Read the token from a file
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Additional payload claim that must be present (repeatable)
    #[arg(long = "require-claim", value_name = "NAME")]
    require_claims: Vec<String>,

    /// Tolerated clock skew for the issued-at claim, in seconds (at most 3600)
    #[arg(long, value_name = "SECS")]
    clock_skew: Option<u64>,

    /// Reject certificates issued more than this many seconds ago
    #[arg(long, value_name = "SECS")]
    max_age: Option<u64>,

    /// Print the verification result as JSON
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error), overridden by RUST_LOG
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn run(cli: &Cli) -> Result<u8> {
    let token = read_token(cli)?;
    let verifier = build_verifier(cli);

    let result = verifier.verify_token(&token);
    if cli.json {
        println!("{}", result.to_json());
    } else {
        print!("{}", render_summary(&result));
    }

    Ok(if result.is_valid() {
        EXIT_VALID
    } else {
        EXIT_INVALID
    })
}

fn read_token(cli: &Cli) -> Result<String> {
    if let Some(token) = &cli.token {
        return Ok(token.clone());
    }

    let raw = if let Some(path) = &cli.file {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read token from {}", path.display()))?
    } else {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read token from stdin")?;
        raw
    };

    tracing::debug!(bytes = raw.len(), "token read");
    Ok(strip_trailing_newline(raw))
}

/// Drop one trailing `\n` or `\r\n` left by editors and shells
fn strip_trailing_newline(mut raw: String) -> String {
    if raw.ends_with('\n') {
        raw.pop();
        if raw.ends_with('\r') {
            raw.pop();
        }
    }
    raw
}

fn build_verifier(cli: &Cli) -> CertificateVerifier {
    let mut claims = ClaimsValidation::new();
    for claim in &cli.require_claims {
        claims = claims.require_claim(claim.as_str());
    }
    if let Some(skew) = cli.clock_skew {
        claims = claims.clock_skew(skew);
    }
    if let Some(max_age) = cli.max_age {
        claims = claims.max_age(max_age);
    }

    CertificateVerifier::new().validate(claims).build()
}

fn render_summary(result: &VerificationResult) -> String {
    let mut out = String::new();

    let Some(cert) = result.certificate() else {
        let kind = result
            .error_kind()
            .map_or("Unknown", |kind| kind.as_str());
        let _ = writeln!(
            out,
            "INVALID certificate ({kind}): {}",
            result.message().unwrap_or_default()
        );
        return out;
    };

    let _ = writeln!(out, "VALID certificate");
    write_field(&mut out, "Device type", cert.device_type());
    write_field(&mut out, "Device ID", cert.device_id());
    write_field(
        &mut out,
        "Issued at",
        cert.issued_at().map(format_timestamp).as_deref(),
    );
    write_field(&mut out, "Issuer", cert.issuer());
    write_field(&mut out, "Certificate", cert.display_id().as_deref());
    write_wipe_details(&mut out, &cert);
    out
}

fn write_wipe_details(out: &mut String, cert: &Certificate<'_>) {
    if let Some(method) = cert.wipe_method() {
        write_field(out, "Wipe method", Some(method));
    }
    if let Some(status) = cert.wipe_status() {
        write_field(out, "Wipe status", Some(status));
    }
    if let Some(ts) = cert.wipe_timestamp() {
        write_field(out, "Wiped at", Some(&format_timestamp(ts)));
    }
}

fn write_field(out: &mut String, label: &str, value: Option<&str>) {
    let _ = writeln!(out, "  {:<13} {}", format!("{label}:"), value.unwrap_or("-"));
}

/// RFC 3339 in UTC, falling back to the raw number outside chrono's range
fn format_timestamp(secs: i64) -> String {
    DateTime::<Utc>::from_timestamp(secs, 0)
        .map_or_else(|| secs.to_string(), |dt| dt.to_rfc3339())
}
