//! NASPIP CLI
//!
//! Command-line interface for generating keys and creating, inspecting and
//! reading NASPIP payment instruction tokens.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

mod commands;
mod ui;

#[derive(Parser)]
#[command(name = "naspip")]
#[command(about = "NASPIP CLI - Create and read signed payment instruction tokens", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a new Ed25519 signing key pair
    Keygen {
        /// Key encoding (paserk or keyobject)
        #[arg(short, long, default_value = "paserk")]
        format: String,

        /// Write the key pair as JSON to this file
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Create a signed token
    Create {
        #[command(subcommand)]
        kind: CreateKind,
    },

    /// Split a token into its envelope fields without verifying it
    Decode {
        /// NASPIP token string
        token: String,
    },

    /// Decode a token and its claims without verifying the signature
    Inspect {
        /// NASPIP token string
        token: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Verify a token and validate its claims
    Read {
        /// NASPIP token string
        token: String,

        #[command(flatten)]
        args: ReadArgs,
    },
}

#[derive(Subcommand)]
enum CreateKind {
    /// Direct payment instruction
    Payment {
        #[command(flatten)]
        args: CreateArgs,
    },

    /// Redirect to a service that issues the payment instruction
    Url {
        #[command(flatten)]
        args: CreateArgs,
    },
}

#[derive(Args)]
pub struct CreateArgs {
    /// Payload JSON file, or "-" for stdin
    #[arg(short, long, default_value = "-")]
    pub input: String,

    /// Create options JSON file; flags below override its fields
    #[arg(long)]
    pub options: Option<String>,

    /// Secret key (PASERK or raw base64url)
    #[arg(long, env = "NASPIP_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// Signing key id
    #[arg(long)]
    pub kid: Option<String>,

    /// Signing key issuer
    #[arg(long)]
    pub kis: Option<String>,

    /// Signing key expiration (RFC3339)
    #[arg(long)]
    pub kep: Option<String>,

    /// Token lifetime, e.g. 5m or 1h30m
    #[arg(long)]
    pub expires_in: Option<String>,

    /// Delay before the token becomes valid
    #[arg(long)]
    pub not_before: Option<String>,

    /// Token issuer (iss)
    #[arg(long)]
    pub issuer: Option<String>,

    /// Token subject (sub)
    #[arg(long)]
    pub subject: Option<String>,

    /// Token audience (aud)
    #[arg(long)]
    pub audience: Option<String>,

    /// Token id (jti)
    #[arg(long)]
    pub jti: Option<String>,

    /// Footer text carried in the clear
    #[arg(long)]
    pub footer: Option<String>,

    /// Render the token as a QR code
    #[arg(long)]
    pub qr: bool,

    /// Print only the token
    #[arg(long)]
    pub raw: bool,
}

#[derive(Args)]
pub struct ReadArgs {
    /// Public key (PASERK or raw base64url)
    #[arg(long, env = "NASPIP_PUBLIC_KEY")]
    pub public_key: String,

    /// Read options JSON file; flags below override its fields
    #[arg(long)]
    pub options: Option<String>,

    /// Expected signing key id
    #[arg(long)]
    pub kid: Option<String>,

    /// Expected signing key issuer
    #[arg(long)]
    pub kis: Option<String>,

    /// Expected token issuer (iss)
    #[arg(long)]
    pub issuer: Option<String>,

    /// Expected token subject (sub)
    #[arg(long)]
    pub subject: Option<String>,

    /// Expected token audience (aud)
    #[arg(long)]
    pub audience: Option<String>,

    /// Reject tokens issued longer ago than this
    #[arg(long)]
    pub max_token_age: Option<String>,

    /// Expected footer text
    #[arg(long)]
    pub footer: Option<String>,

    /// Accept tokens whose not-before time has not arrived
    #[arg(long)]
    pub ignore_nbf: bool,

    /// Accept tokens signed by an expired key
    #[arg(long)]
    pub ignore_key_expiration: bool,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("naspip_cli=debug,naspip_lib=debug")
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("naspip_cli=info,naspip_lib=warn")
            .with_writer(std::io::stderr)
            .init();
    }

    let result = match cli.command {
        Commands::Keygen { format, output } => {
            commands::keygen::run(&format, output.as_deref(), cli.verbose)
        }
        Commands::Create { kind } => match kind {
            CreateKind::Payment { args } => commands::create::run_payment(args, cli.verbose),
            CreateKind::Url { args } => commands::create::run_url(args, cli.verbose),
        },
        Commands::Decode { token } => commands::decode::run(&token),
        Commands::Inspect { token, json } => commands::inspect::run(&token, json),
        Commands::Read { token, args } => commands::read::run(&token, args, cli.verbose),
    };

    if let Err(err) = &result {
        ui::error(&format!("{err:#}"));
        std::process::exit(1);
    }
    Ok(())
}
