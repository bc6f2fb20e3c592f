use strum_macros::{Display, EnumString};

/// How the planner reconciles a customer's badge progress when choosing
/// sets.
#[derive(Display, EnumString, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationMode {
    /// Compare against badge levels; each game's cap is what the customer
    /// can still craft.
    Compare,
    /// At most one set per game the customer has no badge in. Collectors
    /// get variety, not duplicates.
    Collector,
    /// Ignore badges entirely; a fixed per-game cap applies.
    Any,
}
