use num_enum::{TryFromPrimitive, IntoPrimitive};
use serde_repr::{Serialize_repr, Deserialize_repr};
use strum_macros::{Display, EnumString};

/// Which way value flows in an exchange, from the bot's point of view.
/// `Sell` sends sets for keys; `Buy` sends keys for sets. The numeric
/// representation is persisted in offer metadata.
#[derive(Serialize_repr, Deserialize_repr, Display, EnumString, Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum TradeDirection {
    Sell = 0,
    Buy = 1,
}
