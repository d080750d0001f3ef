//! Application configuration loaded from environment variables.

use serde::Deserialize;

use crate::error::AppError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Chain Access ===
    /// JSON-RPC endpoint URL.
    #[serde(default)]
    pub rpc_url: String,

    /// Faucet minting key (hex, starts with 0x); only `serve` needs it.
    #[serde(default)]
    pub private_key: Option<String>,

    /// Payment/test token contract address.
    #[serde(default)]
    pub token_address: String,

    /// Key of the wallet used by dashboard commands; read-only when unset.
    #[serde(default)]
    pub wallet_private_key: Option<String>,

    /// Prediction market contract address.
    #[serde(default = "default_market_address")]
    pub market_address: String,

    // === Faucet ===
    /// Whole tokens minted per claim.
    #[serde(default = "default_faucet_amount")]
    pub faucet_amount: u64,

    /// Token decimals used for base-unit conversion.
    #[serde(default = "default_token_decimals")]
    pub token_decimals: u8,

    /// Base URL of a running faucet server (used by `claim-tokens`).
    #[serde(default = "default_faucet_url")]
    pub faucet_url: String,

    // === Server Configuration ===
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,
}

fn default_market_address() -> String {
    "0x565fBDEBa409Cdf03EeC311eB96be3FDBF3e67D8".to_string()
}

fn default_faucet_amount() -> u64 {
    100
}

fn default_token_decimals() -> u8 {
    18
}

fn default_faucet_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check the settings needed for chain access (dashboard and wallet commands).
    pub fn validate(&self) -> Result<(), String> {
        if self.rpc_url.is_empty() {
            return Err("RPC_URL is required".to_string());
        }

        if url::Url::parse(&self.rpc_url).is_err() {
            return Err("RPC_URL must be a valid URL".to_string());
        }

        if let Some(key) = &self.private_key {
            if !key.starts_with("0x") {
                return Err("PRIVATE_KEY must start with 0x".to_string());
            }
        }

        self.validate_wallet_key()?;

        if self.token_address.is_empty() {
            return Err("TOKEN_ADDRESS is required".to_string());
        }

        if crate::signing::parse_address(&self.token_address).is_err() {
            return Err("TOKEN_ADDRESS is not a valid address".to_string());
        }

        if crate::signing::parse_address(&self.market_address).is_err() {
            return Err("MARKET_ADDRESS is not a valid address".to_string());
        }

        if self.faucet_amount == 0 {
            return Err("FAUCET_AMOUNT must be greater than 0".to_string());
        }

        if self.token_decimals > 36 {
            return Err("TOKEN_DECIMALS must be at most 36".to_string());
        }

        Ok(())
    }

    /// Load configuration and run `check` against it.
    pub fn load_checked(check: fn(&Config) -> Result<(), String>) -> crate::Result<Self> {
        Self::load()?.checked(check)
    }

    /// Run `check`, turning its message into [`AppError::InvalidConfig`].
    pub fn checked(self, check: fn(&Config) -> Result<(), String>) -> crate::Result<Self> {
        check(&self).map_err(AppError::InvalidConfig)?;
        Ok(self)
    }

    /// Check chain access plus the minting key required by the faucet server.
    pub fn validate_server(&self) -> Result<(), String> {
        self.validate()?;
        self.server_key().map(|_| ())
    }

    /// Check the settings used by `claim-tokens`, which only talks HTTP.
    pub fn validate_faucet_client(&self) -> Result<(), String> {
        if url::Url::parse(&self.faucet_url).is_err() {
            return Err("FAUCET_URL must be a valid URL".to_string());
        }

        self.validate_wallet_key()
    }

    /// The faucet minting key.
    pub fn server_key(&self) -> Result<&str, String> {
        match self.private_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err("PRIVATE_KEY is required".to_string()),
        }
    }

    fn validate_wallet_key(&self) -> Result<(), String> {
        match &self.wallet_private_key {
            Some(key) if !key.starts_with("0x") => {
                Err("WALLET_PRIVATE_KEY must start with 0x".to_string())
            }
            _ => Ok(()),
        }
    }
}
