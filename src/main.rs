//! CLI entry point for kvtree

use std::io::IsTerminal;
use std::process;

use clap::{Parser, ValueEnum};
use kvtree::output::DEFAULT_PASSWORD_LENGTH;
use kvtree::{DEFAULT_ROOT, DisplayFlags, VaultClient, VaultConfig, parse_roots};
use termcolor::{BufferedStandardStream, ColorChoice};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            std::io::stdout().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "kvtree")]
#[command(about = "Recursively list secrets from Vault's KV v2 engine")]
#[command(disable_version_flag = true)]
struct Args {
    /// Engine paths to list (repeat the flag or separate with commas)
    #[arg(short = 'p', long = "path", value_delimiter = ',', default_value = DEFAULT_ROOT)]
    paths: Vec<String>,

    /// Print only the field names found across all secrets
    #[arg(long = "only-keys")]
    only_keys: bool,

    /// Print only the secret paths
    #[arg(long = "only-paths")]
    only_paths: bool,

    /// Print secret values instead of masking them
    #[arg(long = "show-secrets")]
    show_secrets: bool,

    /// Include version metadata for each secret
    #[arg(long = "show-metadata")]
    show_metadata: bool,

    /// Length of the placeholder printed for masked values
    #[arg(short = 'm', long = "max-password-length", default_value_t = DEFAULT_PASSWORD_LENGTH)]
    max_password_length: usize,

    /// Print secrets as JSON
    #[arg(short = 'j', long = "to-json")]
    to_json: bool,

    /// Print secrets as YAML
    #[arg(short = 'y', long = "to-yaml")]
    to_yaml: bool,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Print version and exit
    #[arg(short = 'v', long = "version")]
    version: bool,
}

impl Args {
    fn display_flags(&self) -> DisplayFlags {
        DisplayFlags {
            only_keys: self.only_keys,
            only_paths: self.only_paths,
            show_secrets: self.show_secrets,
            show_metadata: self.show_metadata,
            json: self.to_json,
            yaml: self.to_yaml,
            password_length: self.max_password_length,
            use_color: should_use_color(self.color),
        }
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &Args) -> kvtree::Result<()> {
    // Everything that can be checked locally is checked before talking to Vault.
    let config = args.display_flags().validate()?;
    let roots = parse_roots(&args.paths)?;

    let vault_config = VaultConfig::from_env()?;
    debug!(address = %vault_config.address, roots = roots.len(), "connecting");
    let client = VaultClient::new(&vault_config)?;

    let choice = if config.use_color() {
        ColorChoice::Always
    } else {
        ColorChoice::Never
    };
    let mut stdout = BufferedStandardStream::stdout(choice);
    kvtree::run(client, &roots, config, &mut stdout)
}

fn main() {
    init_logging();
    let args = Args::parse();

    if args.version {
        println!("kvtree {}", env!("CARGO_PKG_VERSION"));
        return;
    }

    if let Err(e) = run(&args) {
        eprintln!("kvtree: {}", e);
        process::exit(1);
    }
}
