//! Runtime configuration from flags and environment.

use std::fmt;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clap::{Args, ValueEnum};
use geupsik_client::{DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE};
use geupsik_core::LunchWindow;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VoteBackend {
    Json,
    #[cfg(feature = "duckdb")]
    Duckdb,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// NEIS open API key
    #[arg(long, global = true, env = "NEIS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// File holding the NEIS API key (used when no key is given directly)
    #[arg(long, global = true, env = "NEIS_API_KEY_FILE")]
    pub api_key_file: Option<PathBuf>,

    #[arg(long, global = true, env = "GEUPSIK_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Directory for votes and favorites
    #[arg(long, global = true, env = "GEUPSIK_DATA_DIR", default_value = ".geupsik")]
    pub data_dir: PathBuf,

    #[arg(long, global = true, env = "GEUPSIK_PAGE_SIZE", default_value_t = DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    #[arg(long, global = true, env = "GEUPSIK_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,

    /// Lunch window as HH:MM-HH:MM
    #[arg(long, global = true, env = "GEUPSIK_LUNCH", default_value = "12:00-13:00")]
    pub lunch: LunchWindow,

    #[arg(long, global = true, value_enum, env = "GEUPSIK_VOTE_BACKEND", default_value_t = VoteBackend::Json)]
    pub vote_backend: VoteBackend,
}

pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    pub data_dir: PathBuf,
    pub page_size: u32,
    pub timeout: Duration,
    pub lunch: LunchWindow,
    pub vote_backend: VoteBackend,
}

impl Config {
    pub fn load(args: ConfigArgs) -> anyhow::Result<Self> {
        let api_key = match (args.api_key, args.api_key_file) {
            (Some(key), _) => Some(key),
            (None, Some(path)) => Some(read_secret(&path)?),
            (None, None) => {
                warn!("no NEIS API key configured, provider will serve sample data only");
                None
            }
        };
        if args.timeout_secs == 0 {
            anyhow::bail!("timeout must be at least one second");
        }

        let config = Self {
            api_key,
            base_url: args.base_url,
            data_dir: args.data_dir,
            page_size: args.page_size.max(1),
            timeout: Duration::from_secs(args.timeout_secs),
            lunch: args.lunch,
            vote_backend: args.vote_backend,
        };
        debug!(?config, "configuration loaded");
        Ok(config)
    }

    pub fn votes_path(&self) -> PathBuf {
        match self.vote_backend {
            VoteBackend::Json => self.data_dir.join("votes.json"),
            #[cfg(feature = "duckdb")]
            VoteBackend::Duckdb => self.data_dir.join("votes.duckdb"),
        }
    }

    pub fn favorites_path(&self) -> PathBuf {
        self.data_dir.join("favorites.json")
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("data_dir", &self.data_dir)
            .field("page_size", &self.page_size)
            .field("timeout", &self.timeout)
            .field("lunch", &self.lunch)
            .field("vote_backend", &self.vote_backend)
            .finish()
    }
}

fn read_secret(path: &Path) -> anyhow::Result<String> {
    let key = read_to_string(path)
        .with_context(|| format!("reading API key from {}", path.display()))?
        .trim()
        .to_string();
    if key.is_empty() {
        anyhow::bail!("API key file {} is empty", path.display());
    }
    Ok(key)
}
