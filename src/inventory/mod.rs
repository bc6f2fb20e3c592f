//! The bot's view of inventories: card classification, set assembly, and
//! the snapshot the planner allocates from.

mod classifier;
mod assembler;

pub use classifier::{group_cards, CardGrouping};
pub use assembler::assemble_sets;

use crate::error::Error;
use crate::request::OfferItem;
use crate::response::Asset;
use crate::types::{AppId, AssetId, ContextId};
use std::collections::BTreeMap;
use async_trait::async_trait;
use steamid_ng::SteamID;

/// One classified trading card. The game ID is parsed from the market hash
/// name prefix; the Steam community app ID is not the game the card
/// belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardItem {
    /// The asset ID referencing this card in the community inventory.
    pub assetid: AssetId,
    /// The game this card belongs to.
    pub game: AppId,
    /// The full market hash name, the card's distinct identity within its
    /// game.
    pub name: String,
}

/// One complete set: exactly one card per distinct name known for a game.
pub type CardSet = Vec<CardItem>;

/// Complete sets per game, in ascending app ID order. Rebuilt wholesale on
/// every inventory load; reads between loads observe a consistent state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameInventory(BTreeMap<AppId, Vec<CardSet>>);

impl GameInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a game's assembled sets. Games without complete sets are not
    /// inserted at all.
    pub fn insert(&mut self, appid: AppId, sets: Vec<CardSet>) {
        if !sets.is_empty() {
            self.0.insert(appid, sets);
        }
    }

    /// The number of complete sets held for `appid`. This is the stock
    /// ledger: there is no separate counter to drift out of sync.
    pub fn stock(&self, appid: AppId) -> usize {
        self.0.get(&appid).map(|sets| sets.len()).unwrap_or(0)
    }

    /// The total number of complete sets across all games.
    pub fn total_sets(&self) -> usize {
        self.0.values().map(|sets| sets.len()).sum()
    }

    /// Iterates games and their sets in ascending app ID order.
    pub fn games(&self) -> impl Iterator<Item = (&AppId, &Vec<CardSet>)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The bot's current holdings. Replaced as a whole on every load; never
/// mutated in place.
#[derive(Debug, Clone, Default)]
pub struct InventorySnapshot {
    /// Complete sets per game.
    pub sets: GameInventory,
    /// Asset IDs of the keys the bot holds, in inventory order.
    pub keys: Vec<AssetId>,
}

impl InventorySnapshot {
    /// Whether anything has been loaded yet.
    pub fn is_loaded(&self) -> bool {
        !self.sets.is_empty() || !self.keys.is_empty()
    }
}

/// Filters a key inventory down to the asset IDs of tradable keys, in
/// input order.
pub fn customer_keys(assets: &[Asset]) -> Vec<AssetId> {
    assets
        .iter()
        .filter(|asset| asset.classinfo.is_key())
        .map(|asset| asset.assetid)
        .collect()
}

/// Produces `quantity` key items for an offer, drawn from the first
/// `quantity` IDs of `keys` in input order.
pub fn to_offer_keys(keys: &[AssetId], quantity: u32) -> Result<Vec<OfferItem>, Error> {
    if keys.len() < quantity as usize {
        return Err(Error::MissingKeys {
            available: keys.len() as u32,
            needed: quantity,
        });
    }

    Ok(keys[..quantity as usize]
        .iter()
        .map(|assetid| OfferItem::key(*assetid))
        .collect())
}

/// Retrieves inventories. Implemented over the Steam community endpoint in
/// production and stubbed in tests.
#[async_trait]
pub trait AssetProvider: Send + Sync {
    async fn get_inventory(
        &self,
        steamid: SteamID,
        appid: AppId,
        contextid: ContextId,
        tradable_only: bool,
    ) -> Result<Vec<Asset>, Error>;
}
