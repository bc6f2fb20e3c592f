//! Bot configuration.

use crate::error::FileError;
use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};
use directories::ProjectDirs;

/// Configuration for the exchange engine, loaded from a JSON file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The most sets of any single game the bot will accumulate through
    /// customer sells. Once a game reaches this it buys no more of it.
    pub max_stock: u32,
    /// The most keys accepted in a single trade, either direction.
    pub max_trade_keys: u32,
    /// How many sets a key buys when the bot sells.
    pub sell_rate: u32,
    /// How many sets a key pays for when the bot buys.
    pub buy_rate: u32,
    /// Whether customers can sell sets to the bot at all.
    pub enable_sell: bool,
    /// SteamID64s of the accounts that receive trade notifications.
    pub admins: Vec<u64>,
    /// The comment left on a customer's profile after an accepted trade.
    /// `None` disables the feature.
    pub thanks_comment: Option<String>,
    /// Whether admins get a chat message after each completed sale.
    pub notify_admins_on_sale: bool,
    /// Where the card database and profit ledger are stored.
    pub data_directory: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_stock: 100,
            max_trade_keys: 15,
            sell_rate: 20,
            buy_rate: 23,
            enable_sell: true,
            admins: Vec::new(),
            thanks_comment: None,
            notify_admins_on_sale: true,
            data_directory: default_data_directory(),
        }
    }
}

impl Config {
    /// Loads configuration from a JSON file.
    pub fn load<T>(filepath: T) -> Result<Self, FileError>
    where
        T: AsRef<Path>,
    {
        let data = std::fs::read_to_string(filepath)?;
        let config = serde_json::from_str(&data)?;

        Ok(config)
    }
}

fn default_data_directory() -> PathBuf {
    ProjectDirs::from("", "", "steam-levelup-bot")
        .map(|dirs| dirs.data_dir().into())
        .unwrap_or_else(|| PathBuf::from("data"))
}
