//! Models for data sent to Steam.

mod new_trade_offer;

pub use new_trade_offer::{NewTradeOffer, NewTradeOfferBuilder, OfferItem};
