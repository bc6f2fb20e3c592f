use crate::types::TradeOfferId;
use serde::Deserialize;

/// The response after successfully sending a trade offer.
#[derive(Deserialize, Debug, Clone)]
pub struct SentOffer {
    /// The ID of the offer that was created.
    #[serde(with = "crate::serialize::string")]
    pub tradeofferid: TradeOfferId,
    /// Whether the offer landed in pending state and requires mobile
    /// confirmation before it is shown to the partner.
    #[serde(default)]
    pub needs_mobile_confirmation: bool,
}
