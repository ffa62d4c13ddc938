use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use osslinit_core::init::{ENV_CONF_APPNAME, ENV_MAX_LOCK_SLOTS};
use osslinit_core::InitOptions;

#[derive(Parser)]
#[command(name = "osslinit-probe", version, about = "Inspect OpenSSL setup and error reporting")]
struct Cli {
    /// Config file section to apply during init (library default when unset)
    #[arg(long, global = true, env = ENV_CONF_APPNAME)]
    conf_appname: Option<String>,

    /// Upper bound on the lock count OpenSSL may request
    #[arg(long, global = true, env = ENV_MAX_LOCK_SLOTS, default_value_t = InitOptions::DEFAULT_MAX_LOCK_SLOTS)]
    max_lock_slots: usize,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    // Initialize and report library version, state and lock count.
    Init,

    // Feed a DER file (or built-in garbage) to the certificate parser and print the drained errors.
    Errors {
        /// DER file to parse; defaults to bytes that are not a certificate
        #[arg(long)]
        der: Option<std::path::PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let options = build_options(cli.conf_appname, cli.max_lock_slots)?;

    match cli.cmd {
        Command::Init => run_init(options),
        Command::Errors { der } => run_errors(options, der),
    }
}

fn build_options(conf_appname: Option<String>, max_lock_slots: usize) -> Result<InitOptions> {
    let mut options = InitOptions::default()
        .with_max_lock_slots(max_lock_slots)
        .context("invalid --max-lock-slots")?;

    if let Some(name) = conf_appname {
        options = options
            .with_config_appname(name)
            .context("invalid --conf-appname")?;
    }

    Ok(options)
}

fn run_init(options: InitOptions) -> Result<()> {
    let bridge = osslinit_openssl::init_with(options);

    println!("openssl version: {:#x}", osslinit_openssl::version_number());
    println!("state:           {:?}", osslinit_openssl::state());
    println!("lock slots:      {}", bridge.bank().len());

    Ok(())
}

fn run_errors(options: InitOptions, der: Option<std::path::PathBuf>) -> Result<()> {
    osslinit_openssl::init_with(options);

    let bytes = match &der {
        Some(path) => std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?,
        None => b"not a certificate".to_vec(),
    };
    tracing::debug!(bytes = bytes.len(), "probing DER input");

    match osslinit_openssl::probe_der_certificate(&bytes) {
        Ok(()) => println!("parsed OK, no errors queued"),
        Err(err) => {
            println!("{} queued error(s):", err.len());
            for record in err.records() {
                println!("  [{}] {record}", record.code);
            }
        }
    }

    Ok(())
}
