//! Chooses which sets change hands.

use crate::badges::Eligibility;
use crate::inventory::{CardItem, CardSet, GameInventory};

/// The outcome of planning an allocation: the chosen cards, flattened in
/// the order their sets were taken, and how many sets they make up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationPlan {
    /// The cards of every chosen set.
    pub items: Vec<CardItem>,
    /// How many sets were taken. Never exceeds the requested total; less
    /// than it only when eligible supply ran short.
    pub sets_taken: u32,
}

impl AllocationPlan {
    /// Whether the plan covers the requested total.
    pub fn is_complete(&self, requested: u32) -> bool {
        self.sets_taken == requested
    }
}

/// Greedily allocates up to `requested` sets across games.
///
/// Games are visited in the inventory's order; from each the planner takes
/// up to the game's eligibility cap, stopping exactly when the total is
/// reached. A short allocation is returned as-is and the caller decides
/// whether to reject the trade. Later games can be starved under partial
/// fulfillment; there is deliberately no scarcity weighting.
pub fn plan(
    inventory: &GameInventory,
    eligibility: &Eligibility,
    requested: u32,
) -> AllocationPlan {
    let mut plan = AllocationPlan::default();

    for (appid, sets) in inventory.games() {
        if plan.sets_taken == requested {
            break;
        }

        let allowed = eligibility.allowed(*appid) as usize;
        let remaining = (requested - plan.sets_taken) as usize;
        let take = sets.len().min(allowed).min(remaining);

        for set in &sets[..take] {
            plan.items.extend(set.iter().cloned());
        }

        plan.sets_taken += take as u32;
    }

    plan
}

/// Selects the customer's complete sets the bot is willing to take in,
/// capping each game at what fits under `max_stock` given current bot
/// stock. Games the bot is full on contribute nothing.
pub fn customer_sell_sets(
    customer: &GameInventory,
    stock: &GameInventory,
    max_stock: u32,
) -> Vec<CardSet> {
    let mut chosen = Vec::new();

    for (appid, sets) in customer.games() {
        let shortfall = max_stock.saturating_sub(stock.stock(*appid) as u32) as usize;

        chosen.extend(sets.iter().take(shortfall).cloned());
    }

    chosen
}
