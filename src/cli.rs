//! Ephemeral CLI: request, answer and receive secrets as text envelopes
//!
//! Usage:
//!   ephemeral request [-v <PRIVATE>] [-b <PUBLIC>] [-d <DESCRIPTION>]
//!   ephemeral respond [-b <PUBLIC>] [-d <DATA>] [-r <RESPONSE>]
//!   ephemeral receive [-v <PRIVATE>] [-r <RESPONSE>] [-s <SECRET>]
//!
//! A path of `-` means stdin or stdout.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::{Envelope, PrivateRequest, PublicRequest, Response};

const STDIO: &str = "-";
const DEFAULT_PRIVATE: &str = "request_private.txt";

#[derive(Parser, Debug)]
#[command(name = "ephemeral")]
#[command(about = "A way of requesting and sending secret info on public channels")]
#[command(
    long_about = "Uses elliptic-curve Diffie-Hellman to request secret information \
over a public channel and AES-256 to answer that request.\n\n\
First, make a request:\n    ephemeral request -v secret.txt -b request.txt -d \"The database password\"\n\n\
Share request.txt anywhere. The recipient answers with:\n    ephemeral respond -b request.txt -d password.txt -r response.txt\n\n\
Share response.txt back. The requester, who kept secret.txt, decrypts with:\n    ephemeral receive -v secret.txt -r response.txt -s password.txt"
)]
#[command(version)]
pub struct Cli {
    /// Turn on verbose logging
    #[arg(short = 'g', long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a request for secret data
    Request(RequestArgs),

    /// Reply to a request for secret information
    Respond(RespondArgs),

    /// Decrypt a response with the private request that prompted it
    Receive(ReceiveArgs),
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// Private request file, kept to decode the response
    #[arg(short = 'v', long = "private", default_value = DEFAULT_PRIVATE)]
    pub private: PathBuf,

    /// Public request file, to be shared over public channels
    #[arg(short = 'b', long = "public", default_value = STDIO)]
    pub public: PathBuf,

    /// Description of the secret being requested
    #[arg(short = 'd', long, default_value = "Secret Information")]
    pub description: String,
}

#[derive(Args, Debug)]
pub struct RespondArgs {
    /// Public request file received over a public channel
    #[arg(short = 'b', long = "public", default_value = STDIO)]
    pub public: PathBuf,

    /// Data file to encrypt in the response
    #[arg(short = 'd', long = "data", default_value = STDIO)]
    pub data: PathBuf,

    /// File to write the response to
    #[arg(short = 'r', long = "response", default_value = STDIO)]
    pub response: PathBuf,
}

#[derive(Args, Debug)]
pub struct ReceiveArgs {
    /// Private request file written by `request`
    #[arg(short = 'v', long = "private", default_value = DEFAULT_PRIVATE)]
    pub private: PathBuf,

    /// Response file written by `respond`
    #[arg(short = 'r', long = "response", default_value = STDIO)]
    pub response: PathBuf,

    /// Where to write the decrypted secret
    #[arg(short = 's', long = "secret", default_value = STDIO)]
    pub secret: PathBuf,
}

/// Install the stderr subscriber. `RUST_LOG` wins unless `--debug` is set.
pub fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // A subscriber may already be installed (tests); keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Request(args) => cmd_request(&args),
        Command::Respond(args) => cmd_respond(&args),
        Command::Receive(args) => cmd_receive(&args),
    }
}

fn cmd_request(args: &RequestArgs) -> Result<()> {
    let request = PrivateRequest::new(args.description.clone()).context("could not create a new request")?;

    let private = Envelope::sealed(&request, request.description.clone())
        .context("could not encode private request")?;
    let public = Envelope::sealed(&request.public(), request.description.clone())
        .context("could not encode public request")?;

    write_envelope(&args.private, &private, true).context("could not write private request file")?;
    write_envelope(&args.public, &public, false).context("could not write public request file")?;

    tracing::info!(
        id = %request.id,
        curve = %request.curve(),
        fingerprint = %request.key.public_key().fingerprint(),
        private = %args.private.display(),
        "request written"
    );
    Ok(())
}

fn cmd_respond(args: &RespondArgs) -> Result<()> {
    let request: PublicRequest = read_envelope(&args.public)
        .context("could not read public request file")?
        .open()
        .context("could not open public request envelope")?;

    let mut secret = Vec::new();
    open_input(&args.data)
        .and_then(|mut r| r.read_to_end(&mut secret))
        .context("could not read data file")?;

    let response = request.encode(&secret).context("could not encode response")?;
    let envelope = Envelope::sealed(&response, request.description.clone())
        .context("could not stuff response envelope")?;
    write_envelope(&args.response, &envelope, false).context("could not write response file")?;

    tracing::info!(id = %request.id, bytes = secret.len(), "response written");
    Ok(())
}

fn cmd_receive(args: &ReceiveArgs) -> Result<()> {
    let request: PrivateRequest = read_envelope(&args.private)
        .context("could not read private request file")?
        .open()
        .context("could not open private request envelope")?;
    let response: Response = read_envelope(&args.response)
        .context("could not read response file")?
        .open()
        .context("could not open response envelope")?;

    if !request.answered_by(&response) {
        tracing::warn!(
            request = %request.id,
            response = %response.id,
            "response was not made for this request; output will be garbage"
        );
    }

    let secret = request.decode(&response).context("could not decode secret")?;
    let mut out = open_output(&args.secret, true).context("could not open secret file")?;
    out.write_all(&secret).context("could not write secret file")?;
    out.flush()?;
    Ok(())
}

// ---------------------------------------------------------------------------
// File plumbing
// ---------------------------------------------------------------------------

fn is_stdio(path: &Path) -> bool {
    path.as_os_str() == STDIO
}

fn open_input(path: &Path) -> io::Result<Box<dyn Read>> {
    if is_stdio(path) {
        Ok(Box::new(io::stdin().lock()))
    } else {
        Ok(Box::new(File::open(path)?))
    }
}

/// Open for writing, truncating. `restricted` files get mode 600 on Unix.
fn open_output(path: &Path, restricted: bool) -> io::Result<Box<dyn Write>> {
    if is_stdio(path) {
        return Ok(Box::new(io::stdout().lock()));
    }
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(if restricted { 0o600 } else { 0o644 });
    }
    #[cfg(not(unix))]
    let _ = restricted;
    let file = options.open(path)?;
    // mode() only applies on creation; tighten files that already existed
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if restricted {
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }
    }
    Ok(Box::new(file))
}

fn read_envelope(path: &Path) -> Result<Envelope> {
    let reader = open_input(path).with_context(|| format!("open {}", path.display()))?;
    Ok(Envelope::read_from(reader)?)
}

fn write_envelope(path: &Path, envelope: &Envelope, restricted: bool) -> Result<()> {
    let writer = open_output(path, restricted).with_context(|| format!("open {}", path.display()))?;
    envelope.write_to(writer)?;
    Ok(())
}
