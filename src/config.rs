use anyhow::{bail, Context};
use serde::Deserialize;

const BCRYPT_MIN_COST: u32 = 4;
const BCRYPT_MAX_COST: u32 = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    Bcrypt,
    Argon2,
}

impl HashAlgorithm {
    /// Work factor used when `PASSWORD_HASH_COST` is not set.
    pub fn default_cost(self) -> u32 {
        match self {
            HashAlgorithm::Bcrypt => 10,
            HashAlgorithm::Argon2 => 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HashConfig {
    pub algorithm: HashAlgorithm,
    pub cost: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub hash: HashConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let algorithm = match lookup("PASSWORD_HASHER").as_deref() {
            None | Some("bcrypt") => HashAlgorithm::Bcrypt,
            Some("argon2") => HashAlgorithm::Argon2,
            Some(other) => bail!("unknown PASSWORD_HASHER {other:?}, expected bcrypt or argon2"),
        };
        let cost = match lookup("PASSWORD_HASH_COST") {
            Some(v) => v
                .parse::<u32>()
                .with_context(|| format!("PASSWORD_HASH_COST must be an integer, got {v:?}"))?,
            None => algorithm.default_cost(),
        };
        if algorithm == HashAlgorithm::Bcrypt && !(BCRYPT_MIN_COST..=BCRYPT_MAX_COST).contains(&cost) {
            bail!("bcrypt cost must be between {BCRYPT_MIN_COST} and {BCRYPT_MAX_COST}, got {cost}");
        }
        if algorithm == HashAlgorithm::Argon2 && cost == 0 {
            bail!("argon2 iterations must be at least 1");
        }

        let port = match lookup("APP_PORT") {
            Some(v) => v
                .parse::<u16>()
                .with_context(|| format!("APP_PORT must be a port number, got {v:?}"))?,
            None => 8080,
        };

        let database_max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(v) => v.parse::<u32>().with_context(|| {
                format!("DATABASE_MAX_CONNECTIONS must be an integer, got {v:?}")
            })?,
            None => 10,
        };
        if database_max_connections == 0 {
            bail!("DATABASE_MAX_CONNECTIONS must be at least 1");
        }

        Ok(Self {
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            database_url: lookup("DATABASE_URL").filter(|v| !v.is_empty()),
            database_max_connections,
            hash: HashConfig { algorithm, cost },
        })
    }
}
