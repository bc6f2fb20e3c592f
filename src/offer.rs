//! Composes and sends exchange offers.

use crate::enums::TradeDirection;
use crate::error::Error;
use crate::request::{NewTradeOffer, OfferItem};
use crate::response::{SentOffer, UserDetails};
use serde::{Serialize, Deserialize};
use async_trait::async_trait;
use steamid_ng::SteamID;

/// The metadata attached to an outbound offer, read back when the offer
/// completes. Profit accounting uses these fields as recorded at send
/// time; nothing is re-derived from the traded items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeOfferRecord {
    /// Which way value flowed, from the bot's point of view.
    pub direction: TradeDirection,
    /// The number of complete sets in the trade.
    pub sets: u32,
    /// The amount of currency in the trade.
    pub currency: u32,
    /// What the currency is, e.g. `"tf key(s)"`.
    pub currency_label: String,
}

impl TradeOfferRecord {
    /// The `sets:currency` descriptor used in trade logs.
    pub fn descriptor(&self) -> String {
        format!("{}:{}", self.sets, self.currency)
    }

    /// Serializes into the opaque metadata blob stored with the offer.
    pub fn to_metadata(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }

    /// Parses a record back out of an offer's metadata blob.
    pub fn from_metadata(metadata: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(metadata)?)
    }
}

/// Sends composed offers over the trade-offer wire protocol. Send failures
/// carry an [`Error::Trade`] classification where Steam's response allows
/// one.
#[async_trait]
pub trait OfferTransport: Send + Sync {
    /// Gets escrow details for both parties of a prospective trade. Fails
    /// with [`Error::NotAvailableToTrade`] when the partner cannot trade.
    async fn get_user_details(&self, partner: SteamID) -> Result<UserDetails, Error>;

    /// Sends the offer.
    async fn send_offer(&self, offer: &NewTradeOffer) -> Result<SentOffer, Error>;

    /// Polls and accepts pending mobile confirmations.
    async fn check_confirmations(&self) -> Result<(), Error>;
}

/// Composes an offer and sends it.
///
/// Escrow is checked first: if either party has a hold, the offer is
/// refused outright rather than queued. An offer that lands in pending
/// state triggers the confirmation checker. Composition itself is never
/// retried; retries belong to the transport underneath.
pub async fn send_exchange_offer(
    transport: &dyn OfferTransport,
    partner: SteamID,
    items_to_give: Vec<OfferItem>,
    items_to_receive: Vec<OfferItem>,
    record: TradeOfferRecord,
) -> Result<SentOffer, Error> {
    match record.direction {
        TradeDirection::Sell => log::info!(
            "Creating trade offer for #{} with {} items ({} sets) to send and {} items ({} {}) to receive",
            u64::from(partner),
            items_to_give.len(),
            record.sets,
            items_to_receive.len(),
            record.currency,
            record.currency_label,
        ),
        TradeDirection::Buy => log::info!(
            "Creating trade offer for #{} with {} items ({} {}) to send and {} items ({} sets) to receive",
            u64::from(partner),
            items_to_give.len(),
            record.currency,
            record.currency_label,
            items_to_receive.len(),
            record.sets,
        ),
    }

    let details = transport.get_user_details(partner).await?;

    if details.has_escrow() {
        return Err(Error::EscrowHold(details.hold_duration_days()));
    }

    let metadata = record.to_metadata()?;
    let offer = NewTradeOffer::builder(partner)
        .items_to_give(items_to_give)
        .items_to_receive(items_to_receive)
        .metadata(metadata)
        .build();

    log::debug!("Sending offer for #{}", u64::from(partner));

    let sent = transport.send_offer(&offer).await?;

    if sent.needs_mobile_confirmation {
        transport.check_confirmations().await?;
    }

    log::info!("Successfully sent a trade offer for #{}", u64::from(partner));

    Ok(sent)
}
