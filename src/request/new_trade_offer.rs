use crate::response::Asset;
use crate::types::{AppId, Amount, AssetId, ContextId, CARD_CONTEXTID, KEY_CONTEXTID, STEAM_APPID, TF2_APPID};
use serde::Serialize;
use steamid_ng::SteamID;

/// An item for creating a new trade offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OfferItem {
    pub appid: AppId,
    pub contextid: ContextId,
    pub amount: Amount,
    pub assetid: AssetId,
}

impl OfferItem {
    /// An item referencing a trading card in the Steam community inventory.
    pub fn card(assetid: AssetId) -> Self {
        Self {
            appid: STEAM_APPID,
            contextid: CARD_CONTEXTID,
            amount: 1,
            assetid,
        }
    }

    /// An item referencing a key in the TF2 inventory.
    pub fn key(assetid: AssetId) -> Self {
        Self {
            appid: TF2_APPID,
            contextid: KEY_CONTEXTID,
            amount: 1,
            assetid,
        }
    }
}

impl From<&Asset> for OfferItem {
    fn from(asset: &Asset) -> Self {
        Self {
            appid: asset.appid,
            contextid: asset.contextid,
            amount: asset.amount,
            assetid: asset.assetid,
        }
    }
}

/// A symmetric trade offer payload: what the bot gives and what it asks
/// for, plus the opaque metadata read back when the offer completes.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTradeOffer {
    /// The partner's [`SteamID`] for this offer.
    pub partner: SteamID,
    /// The items to give in this offer.
    pub items_to_give: Vec<OfferItem>,
    /// The items to receive in this offer.
    pub items_to_receive: Vec<OfferItem>,
    /// The message to send in this offer.
    pub message: Option<String>,
    /// Opaque metadata attached to the offer. The transport stores this
    /// blob with the offer and includes it with state-change events.
    pub metadata: Option<String>,
}

impl NewTradeOffer {
    /// Builder for constructing a [`NewTradeOffer`].
    pub fn builder(partner: SteamID) -> NewTradeOfferBuilder {
        NewTradeOfferBuilder::new(partner)
    }

    /// Whether the offer contains no items on either side.
    pub fn is_empty(&self) -> bool {
        self.items_to_give.is_empty() &&
        self.items_to_receive.is_empty()
    }
}

/// Builder for constructing new trade offers.
pub struct NewTradeOfferBuilder {
    pub partner: SteamID,
    pub items_to_give: Vec<OfferItem>,
    pub items_to_receive: Vec<OfferItem>,
    pub message: Option<String>,
    pub metadata: Option<String>,
}

impl NewTradeOfferBuilder {
    /// Creates a new [`NewTradeOfferBuilder`] with the given partner.
    pub fn new(partner: SteamID) -> Self {
        Self {
            partner,
            items_to_give: Vec::new(),
            items_to_receive: Vec::new(),
            message: None,
            metadata: None,
        }
    }

    /// The items to give in this offer.
    pub fn items_to_give<T>(mut self, items: T) -> Self
    where
        T: IntoIterator,
        T::Item: Into<OfferItem>,
    {
        self.items_to_give = items.into_iter().map(|item| item.into()).collect();
        self
    }

    /// The items to receive in this offer.
    pub fn items_to_receive<T>(mut self, items: T) -> Self
    where
        T: IntoIterator,
        T::Item: Into<OfferItem>,
    {
        self.items_to_receive = items.into_iter().map(|item| item.into()).collect();
        self
    }

    /// The message to send in this offer.
    pub fn message(mut self, message: String) -> Self {
        self.message = Some(message);
        self
    }

    /// Metadata to store with the offer.
    pub fn metadata(mut self, metadata: String) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Builds into [`NewTradeOffer`].
    pub fn build(self) -> NewTradeOffer {
        NewTradeOffer {
            partner: self.partner,
            items_to_give: self.items_to_give,
            items_to_receive: self.items_to_receive,
            message: self.message,
            metadata: self.metadata,
        }
    }
}
