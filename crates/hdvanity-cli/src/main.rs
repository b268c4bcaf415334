//! HDVanity CLI
//!
//! Brain-wallet HD address generator with vanity search.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use hdvanity_core::{
    combined_difficulty, export_to_path, format_difficulty, read_path, write_records, Credentials,
    Network, Pattern, PatternMatcher, Progress, ProtectedKey, RunMode, Session, SessionConfig, StretchParams, WalletRecord,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

const BASE58_SIZE: usize = 58;
const P2PKH_ADDRESS_LEN: usize = 34;

#[derive(Parser)]
#[command(name = "hdvanity")]
#[command(author = "HDVanity Team")]
#[command(version = "0.1.0")]
#[command(about = "Brain-wallet HD address generator with vanity search", long_about = None)]
struct Cli {
    /// Vanity pattern: address characters are a prefix, anything else a regex
    #[arg(short, long, num_args = 1..)]
    vanity: Vec<String>,

    /// Case insensitive vanity search
    #[arg(short = 'i', long)]
    ignore_case: bool,

    /// Number of wallets (or vanity matches) to produce
    #[arg(short, long, default_value = "1")]
    number: u32,

    /// Write records to this file
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Replace an existing export file
    #[arg(long)]
    force: bool,

    /// Number of search threads (0 = auto)
    #[arg(long)]
    threads: Option<usize>,

    /// Use the built-in test credentials
    #[arg(long, conflicts_with = "trace")]
    debug: bool,

    /// Log the entered credentials at debug level
    #[arg(long)]
    trace: bool,

    /// Encryption passphrase (defaults to the salt)
    #[arg(long)]
    passphrase: Option<String>,

    /// Emit labelled plaintext keys if encryption fails
    #[arg(long)]
    allow_plaintext: bool,

    /// Testnet addresses and keys
    #[arg(long)]
    testnet: bool,

    /// Cheap seed stretching, for testing only
    #[arg(long)]
    fast_kdf: bool,

    /// JSON session config; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// List the records of an exported file instead of deriving
    #[arg(long, value_name = "FILE", conflicts_with_all = ["vanity", "export"])]
    open: Option<PathBuf>,

    /// With --open, decrypt private keys
    #[arg(long, requires = "open")]
    decrypt: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    xpub: Option<String>,
    wallets: &'a [WalletRecord],
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = build_config(&cli)?;

    // Initialize logging
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(log_directives(
            rust_log.as_deref(),
            config.run_mode == RunMode::Trace,
        )))
        .with_writer(io::stderr)
        .init();

    match &cli.open {
        Some(path) => cmd_open(&cli, config, path),
        None => cmd_derive(&cli, config),
    }
}

/// `RUST_LOG` when set, `info` otherwise; trace mode adds the engine's
/// debug events, where the credentials are echoed
fn log_directives(rust_log: Option<&str>, trace: bool) -> String {
    let mut directives = match rust_log.map(str::trim) {
        Some(env) if !env.is_empty() => env.to_string(),
        _ => "info".to_string(),
    };
    if trace {
        directives.push_str(",hdvanity_core=debug");
    }
    directives
}

/// Patterns from `-v`; empty strings mean no vanity search
fn vanity_patterns(cli: &Cli, valid_chars: &str) -> Vec<Pattern> {
    cli.vanity
        .iter()
        .filter(|input| !input.is_empty())
        .map(|input| Pattern::parse(input, valid_chars, cli.ignore_case))
        .collect()
}

fn build_config(cli: &Cli) -> Result<SessionConfig> {
    let mut config = match &cli.config {
        Some(path) => SessionConfig::from_json_file(path)?,
        None => SessionConfig::default(),
    };

    if cli.debug {
        config.run_mode = RunMode::Debug;
    } else if cli.trace {
        config.run_mode = RunMode::Trace;
    }
    if cli.fast_kdf {
        config.stretch = StretchParams::fast();
    }
    if cli.testnet {
        config.network = Network::Testnet;
    }
    if let Some(threads) = cli.threads {
        config.search.threads = threads;
    }
    if cli.passphrase.is_some() {
        config.passphrase = cli.passphrase.clone();
    }
    if cli.allow_plaintext {
        config.allow_plaintext_fallback = true;
    }
    Ok(config)
}

fn cmd_derive(cli: &Cli, config: SessionConfig) -> Result<()> {
    let session = Session::new(config);
    let credentials = match session.config().run_mode {
        RunMode::Debug => None,
        RunMode::Standard | RunMode::Trace => Some(Credentials::new(prompt("Secret: ")?, prompt("Salt: ")?)),
    };

    if !cli.json {
        eprintln!("HDVanity v0.1.0");
        eprintln!("Mode: {}", session.config().run_mode);
        eprintln!("Network: {}", session.config().network);
        eprintln!();
    }

    let opened = session.open(credentials)?;
    let xpub = session.account_xpub(&opened);

    let encoder = session.encoder();
    let patterns = vanity_patterns(cli, encoder.valid_address_chars());

    let records = if patterns.is_empty() {
        session.wallets(&opened, cli.number)?
    } else {
        let labels: Vec<String> = patterns.iter().map(|p| p.value.clone()).collect();
        let difficulty =
            combined_difficulty(&patterns, encoder.address_prefix(), BASE58_SIZE, P2PKH_ADDRESS_LEN);
        let matcher = PatternMatcher::new(patterns)?
            .with_address_prefix(encoder.address_prefix())
            .with_valid_chars(encoder.valid_address_chars());

        if !cli.json {
            eprintln!("Patterns: {}", labels.join(", "));
            eprintln!("Threads: {}", session.config().search.worker_count());
            if let Some(difficulty) = difficulty {
                eprintln!("Difficulty: {}", format_difficulty(difficulty));
            }
            eprintln!();
        }

        let json = cli.json;
        let records = session.vanity(&opened, &matcher, cli.number, |progress: Progress| {
            if !json {
                eprint!("\r{}", progress.format(difficulty));
            }
        })?;
        if !json {
            eprintln!();
        }
        records
    };

    if cli.json {
        let report = Report { xpub: Some(xpub), wallets: &records };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("account: {}", xpub);
        write_records(io::stdout().lock(), &records)?;
    }

    if let Some(path) = &cli.export {
        export_to_path(path, &records, cli.force)
            .with_context(|| format!("exporting to {}", path.display()))?;
        eprintln!("Exported {} wallet(s) to {}", records.len(), path.display());
    }

    Ok(())
}

fn cmd_open(cli: &Cli, config: SessionConfig, path: &Path) -> Result<()> {
    let records = read_path(path).with_context(|| format!("opening {}", path.display()))?;

    let records = if cli.decrypt {
        let passphrase = match &config.passphrase {
            Some(passphrase) => passphrase.clone(),
            None => prompt("Passphrase (salt): ")?,
        };
        let session = Session::new(config);
        records
            .iter()
            .map(|record| {
                let wif = session.reveal(record, &passphrase)?;
                Ok(WalletRecord {
                    private_key: ProtectedKey::Plaintext(wif.as_str().to_string()),
                    ..record.clone()
                })
            })
            .collect::<Result<Vec<_>>>()
            .context("decrypting records")?
    } else {
        records
    };

    if cli.json {
        let report = Report { xpub: None, wallets: &records };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        write_records(io::stdout().lock(), &records)?;
    }
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    eprint!("{}", label);
    io::stderr().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let value = line.trim_end_matches(['\r', '\n']).to_string();
    if value.is_empty() {
        anyhow::bail!("{} is required", label.trim_end_matches([':', ' ']));
    }
    Ok(value)
}
