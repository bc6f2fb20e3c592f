use super::CardItem;
use crate::response::Asset;
use crate::types::AppId;
use std::collections::BTreeMap;

/// Classified cards, keyed by game and then by distinct card name.
pub type CardGrouping = BTreeMap<AppId, BTreeMap<String, Vec<CardItem>>>;

/// Buckets raw inventory items into trading cards by game and card name.
///
/// Only plain, non-specialty cards count; foil and other borders are
/// excluded because they cannot be crafted into the sets the bot trades.
/// Items whose market hash name carries no parsable game prefix are
/// skipped. An empty input yields an empty grouping.
pub fn group_cards(assets: &[Asset]) -> CardGrouping {
    let mut grouping = CardGrouping::new();
    let mut matched = 0usize;

    for asset in assets {
        if !asset.classinfo.is_normal_card() {
            continue;
        }

        let Some(game) = asset.classinfo.card_game() else {
            continue;
        };

        matched += 1;
        grouping
            .entry(game)
            .or_default()
            .entry(asset.classinfo.market_hash_name.clone())
            .or_default()
            .push(CardItem {
                assetid: asset.assetid,
                game,
                name: asset.classinfo.market_hash_name.clone(),
            });
    }

    log::info!("Found {matched} cards in inventory");

    grouping
}
