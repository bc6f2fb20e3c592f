//! Types for common values in Steam responses.

/// Uniquely identifies an application on Steam. For example: 440 for Team Fortress 2.
pub type AppId = u32;
/// A context ID belonging to an [`AppId`].
pub type ContextId = u64;
/// An asset ID unique to an [`AppId`] + [`ContextId`] combination.
pub type AssetId = u64;
/// An amount for stackable items. For non-stackable items this is simply `1`.
pub type Amount = u32;
/// An ID of a trade offer.
pub type TradeOfferId = u64;

/// The Steam community app. Trading cards live in this app's inventory.
pub const STEAM_APPID: AppId = 753;
/// The context ID for community items (cards, backgrounds, emoticons).
pub const CARD_CONTEXTID: ContextId = 6;
/// Team Fortress 2, the app holding the bot's currency items.
pub const TF2_APPID: AppId = 440;
/// The context ID for TF2 items.
pub const KEY_CONTEXTID: ContextId = 2;

// Types internally used by the crate.
use reqwest_middleware::ClientWithMiddleware;

pub(crate) type HttpClient = ClientWithMiddleware;
