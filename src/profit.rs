//! The profit ledger: what the bot has bought and sold over its lifetime.

use crate::enums::TradeDirection;
use crate::error::FileError;
use crate::offer::TradeOfferRecord;
use std::path::{Path, PathBuf};
use serde::{Serialize, Deserialize};
use futures::AsyncWriteExt;

const PROFITS_FILENAME: &str = "profits.json";

/// Monotonically accumulated totals for one side of the book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitTotals {
    /// Complete sets exchanged.
    pub sets: u64,
    /// Currency exchanged.
    pub currency: u64,
}

/// Both sides of the book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profits {
    /// Sets bought from customers for keys.
    #[serde(default)]
    pub buy: ProfitTotals,
    /// Sets sold to customers for keys.
    #[serde(default)]
    pub sell: ProfitTotals,
}

/// Accumulates profits and rewrites the snapshot file after every update.
/// Loaded once at startup; a missing or corrupt file starts a zeroed
/// ledger.
#[derive(Debug)]
pub struct ProfitLedger {
    data_directory: PathBuf,
    profits: Profits,
}

impl ProfitLedger {
    /// Loads the ledger from the data directory.
    pub fn load<T>(data_directory: T) -> Self
    where
        T: Into<PathBuf>,
    {
        let data_directory = data_directory.into();
        let profits = read_profits(&data_directory).unwrap_or_default();

        Self {
            data_directory,
            profits,
        }
    }

    /// The current totals.
    pub fn profits(&self) -> Profits {
        self.profits
    }

    /// Credits a completed trade to the matching side of the book and
    /// persists the ledger.
    pub async fn record(&mut self, record: &TradeOfferRecord) -> Result<(), FileError> {
        let totals = match record.direction {
            TradeDirection::Sell => &mut self.profits.sell,
            TradeDirection::Buy => &mut self.profits.buy,
        };

        totals.sets += record.sets as u64;
        totals.currency += record.currency as u64;

        self.save().await
    }

    async fn save(&self) -> Result<(), FileError> {
        let filepath = self.data_directory.join(PROFITS_FILENAME);
        let data = serde_json::to_string(&self.profits)?;
        let mut file = async_fs::File::create(&filepath).await?;

        match file.write_all(data.as_bytes()).await {
            Ok(_) => {
                file.flush().await?;

                Ok(())
            },
            Err(error) => {
                // something went wrong writing to this file...
                async_fs::remove_file(&filepath).await?;

                Err(error.into())
            },
        }
    }
}

fn read_profits(path: &Path) -> Result<Profits, FileError> {
    let data = std::fs::read_to_string(path.join(PROFITS_FILENAME))?;
    let profits = serde_json::from_str(&data)?;

    Ok(profits)
}
