use super::{CardGrouping, GameInventory};
use crate::catalog::SetSizeCatalog;

/// Assembles complete sets out of classified cards.
///
/// A game only produces sets when the number of distinct card names held
/// exactly equals the catalog's set size for that game; partial
/// collections never count, not even fractionally. The number of complete
/// sets is the length of the shortest bucket; the i-th set takes the i-th
/// card of every bucket, preserving each card's identity for the offer
/// payload.
pub fn assemble_sets(grouping: CardGrouping, catalog: &dyn SetSizeCatalog) -> GameInventory {
    let mut inventory = GameInventory::new();

    for (appid, buckets) in grouping {
        let set_size = catalog.set_size(appid);

        if set_size == 0 || buckets.len() != set_size as usize {
            continue;
        }

        let count = buckets
            .values()
            .map(|cards| cards.len())
            .min()
            .unwrap_or(0);
        let mut sets = Vec::with_capacity(count);

        for i in 0..count {
            sets.push(
                buckets
                    .values()
                    .map(|cards| cards[i].clone())
                    .collect(),
            );
        }

        inventory.insert(appid, sets);
    }

    log::info!("Found {} complete card sets", inventory.total_sets());

    inventory
}
