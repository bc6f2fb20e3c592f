use crate::types::{AppId, Amount, AssetId, ContextId};
use crate::serialize;
use std::sync::Arc;
use serde::{Serialize, Deserialize};
use lazy_regex::regex_captures;

/// An item in an inventory.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    /// The ID of the app this item belongs to.
    pub appid: AppId,
    /// The context ID within the app.
    pub contextid: ContextId,
    /// The unique asset ID.
    pub assetid: AssetId,
    /// The amount. `1` for non-stackable items.
    pub amount: Amount,
    /// The description for this item. Shared between assets of the same
    /// class.
    pub classinfo: Arc<ClassInfo>,
}

/// Contains details about an item. Trimmed to the fields the exchange
/// engine reads.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct ClassInfo {
    /// The ID for this classinfo.
    #[serde(with = "serialize::string")]
    pub classid: u64,
    /// The specific instance ID for this classinfo.
    #[serde(default)]
    #[serde(with = "serialize::string")]
    pub instanceid: u64,
    /// The name of the item.
    pub name: String,
    /// The market hash name. For trading cards this is prefixed with the
    /// game's app ID, e.g. `"440-Scout"`.
    pub market_hash_name: String,
    /// Whether this item can be traded or not.
    #[serde(deserialize_with = "serialize::from_int_to_bool")]
    pub tradable: bool,
    /// Tags for this item.
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// A tag attached to an item description.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Tag {
    /// The tag's category, e.g. `"item_class"`.
    pub category: String,
    /// The tag's internal name, e.g. `"item_class_2"`.
    pub internal_name: String,
}

impl ClassInfo {
    /// Gets the internal name of the tag under `category`, if present.
    pub fn tag(&self, category: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|tag| tag.category == category)
            .map(|tag| tag.internal_name.as_str())
    }

    /// Whether this item is a plain, non-specialty trading card. Foil and
    /// other specialty borders do not count towards sets.
    pub fn is_normal_card(&self) -> bool {
        self.tag("item_class") == Some("item_class_2") &&
        self.tag("cardborder") == Some("cardborder_0")
    }

    /// Parses the game's app ID out of the market hash name prefix.
    /// `"440-Scout"` yields 440. `None` when the name carries no numeric
    /// prefix.
    pub fn card_game(&self) -> Option<AppId> {
        let (_, appid) = regex_captures!(r#"^(\d+)-"#, &self.market_hash_name)?;

        appid.parse().ok()
    }

    /// Whether this item is a Mann Co. Supply Crate Key, the currency the
    /// bot trades in.
    pub fn is_key(&self) -> bool {
        self.market_hash_name.contains("Mann Co. Supply Crate Key")
    }
}
