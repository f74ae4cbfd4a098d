//! iqd: entry point for operating an IQ oracle node.

use anyhow::{bail, Context};
use clap::Parser;
use iq_node::{init_logging, open_store, AppGenesis, NodeConfig};
use iq_oracle::Querier;
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.toml";

#[derive(Parser)]
#[command(name = "iqd", about = "IQ oracle node daemon")]
struct Cli {
    /// Node home directory holding config.toml, genesis and data.
    #[arg(long, default_value = "./.iqd", env = "IQ_HOME")]
    home: PathBuf,

    /// Data directory, overriding the config file.
    #[arg(long, env = "IQ_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "IQ_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "IQ_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Write a default config and genesis, then initialise the store.
    Init {
        #[arg(long, default_value = "iq-local-1")]
        chain_id: String,

        /// Replace an existing config and genesis.
        #[arg(long)]
        overwrite: bool,
    },

    /// Check a genesis file without touching the store.
    #[command(name = "validate-genesis")]
    ValidateGenesis {
        /// Defaults to the configured genesis file.
        path: Option<PathBuf>,
    },

    /// Run a read-only oracle query against the local store.
    Query {
        /// Route, e.g. "exchangeRate" or "parameters".
        route: String,

        /// JSON parameters, e.g. '{"denom":"ukrw"}'.
        #[arg(default_value = "{}")]
        args: String,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<NodeConfig> {
    let path = cli.home.join(CONFIG_FILE);
    let file_config = if path.exists() {
        NodeConfig::from_toml_file(&path)?
    } else {
        NodeConfig::default()
    };

    Ok(NodeConfig {
        data_dir: cli.data_dir.clone().unwrap_or(file_config.data_dir.clone()),
        log_level: cli.log_level.clone().unwrap_or(file_config.log_level.clone()),
        log_format: cli.log_format.clone().unwrap_or(file_config.log_format.clone()),
        ..file_config
    })
}

fn init(home: &Path, config: &NodeConfig, chain_id: &str, overwrite: bool) -> anyhow::Result<()> {
    let genesis_path = config.genesis_path(home);
    if genesis_path.exists() && !overwrite {
        bail!(
            "{} already exists, pass --overwrite to replace it",
            genesis_path.display()
        );
    }
    std::fs::create_dir_all(home)
        .with_context(|| format!("creating home {}", home.display()))?;

    std::fs::write(home.join(CONFIG_FILE), config.to_toml_string()?)
        .context("writing config")?;

    let genesis = AppGenesis::new(chain_id);
    genesis.validate()?;
    std::fs::write(&genesis_path, genesis.to_json_string()?).context("writing genesis")?;

    let env = open_store(home, config)?;
    genesis.commit_to(&env.oracle_store())?;

    tracing::info!(
        chain_id,
        home = %home.display(),
        genesis = %genesis_path.display(),
        "node initialised"
    );
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(config.log_format()?, &config.log_level)?;

    match cli.command {
        Command::Init {
            ref chain_id,
            overwrite,
        } => init(&cli.home, &config, chain_id, overwrite)?,
        Command::ValidateGenesis { ref path } => {
            let path = path.clone().unwrap_or_else(|| config.genesis_path(&cli.home));
            let genesis = AppGenesis::from_json_file(&path)?;
            genesis.validate()?;
            println!("{} is a valid genesis for {}", path.display(), genesis.chain_id);
        }
        Command::Query {
            ref route,
            ref args,
        } => {
            let env = open_store(&cli.home, &config)?;
            let store = env.oracle_store();
            let response = Querier::new(&store)
                .query(route, args.as_bytes())
                .with_context(|| format!("query {route}"))?;
            let value: serde_json::Value = serde_json::from_slice(&response)?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}
