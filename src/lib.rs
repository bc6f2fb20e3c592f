//! # steam-levelup-bot
//!
//! An automated Steam trading agent that exchanges complete trading card
//! sets for keys at a configured rate.
//!
//! The crate centers on [`ExchangeEngine`]: raw inventory items are
//! classified into cards, assembled into complete sets per game, and
//! reconciled against a customer's badge progress and the bot's stock
//! limits before a symmetric trade offer is composed and sent. Completion
//! events from the offer notification stream are deduplicated so each
//! accepted offer is credited to the profit ledger exactly once.
//!
//! Steam itself is reached through collaborator ports
//! ([`inventory::AssetProvider`], [`badges::BadgeOracle`],
//! [`offer::OfferTransport`], [`engine::Notifier`],
//! [`catalog::SetSizeCatalog`]); [`api::SteamWebAPI`] implements the
//! read-side ports over the public endpoints.

pub mod types;
pub mod response;
pub mod request;
pub mod inventory;
pub mod badges;
pub mod allocation;
pub mod catalog;
pub mod offer;
pub mod completion;
pub mod profit;
pub mod engine;
pub mod api;
pub mod helpers;
pub mod serialize;

mod config;
mod enums;
mod error;

pub use config::Config;
pub use error::{Error, FileError, TradeOfferError};
pub use enums::{AllocationMode, TradeDirection, TradeOfferState};
pub use engine::{ExchangeEngine, ExchangeEngineBuilder, Notice, Notifier, OfferEvent};
pub use offer::TradeOfferRecord;
pub use completion::CompletionCache;
pub use steamid_ng::SteamID;
