// src/main.rs

use std::path::PathBuf;

use clap::Parser;
use rotor::{CONFIG, Rotor, RotorConfig, RotorError, SelectionKey};
use serde_json::Value;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "rotor")]
#[command(about = "Pick varied, non-repeating responses from a list of candidates", long_about = None)]
struct Cli {
    /// Candidate responses
    #[arg(required = true)]
    items: Vec<String>,

    /// Track picks for this user (untracked when omitted)
    #[arg(short, long)]
    user: Option<String>,

    /// Explicit selection key (derived from the candidates when omitted)
    #[arg(short, long)]
    key: Option<String>,

    /// Number of picks to print
    #[arg(short = 'n', long, default_value_t = 1)]
    times: usize,

    /// Seed the RNG for a reproducible sequence
    #[arg(long)]
    seed: Option<u64>,

    /// Parse each candidate as a JSON value instead of a plain string
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Always pick the first candidate
    #[arg(long, env = "ROTOR_DISABLE_RANDOM", default_value_t = false)]
    disable_random: bool,

    /// TOML config file (environment and .env are used otherwise)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, default_value_t = false)]
    debug: bool,
}

fn parse_items(raw: &[String], json: bool) -> Result<Vec<Value>, RotorError> {
    if !json {
        return Ok(raw.iter().cloned().map(Value::String).collect());
    }
    raw.iter()
        .map(|item| serde_json::from_str(item).map_err(RotorError::from))
        .collect()
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RotorConfig::from_file(path)?,
        None => CONFIG.clone(),
    };
    config.disable_random |= cli.disable_random;

    let mut level = config.tracing_level();
    if cli.debug {
        level = level.max(tracing::Level::DEBUG);
    }
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let items = parse_items(&cli.items, cli.json)?;
    debug!("Loaded {} candidates", items.len());

    let rotor = match cli.seed {
        Some(seed) => Rotor::with_seed(config, seed),
        None => Rotor::new(config),
    };

    let key = cli.key.map(SelectionKey::from);
    let user = cli.user.as_deref().map(|id| rotor.userify(id));
    if let Some(user) = &user {
        info!("Tracking picks for user {}", user.user_id());
    }

    for _ in 0..cli.times {
        let picked = match (&user, &key) {
            (Some(user), Some(key)) => user.select_keyed(&items, key.clone()),
            (Some(user), None) => user.select(&items),
            (None, _) => rotor.select(&items),
        };
        if let Some(value) = picked {
            println!("{}", render(value));
        }
    }

    Ok(())
}
