//! Badge progress and the per-game set caps derived from it.

use crate::error::Error;
use crate::response::BadgeSummary;
use crate::types::AppId;
use std::collections::HashMap;
use async_trait::async_trait;
use steamid_ng::SteamID;

/// The level a badge maxes out at, and with it the most sets a customer
/// can still craft for one game.
pub const MAX_BADGE_LEVEL: u32 = 5;

/// Looks up a customer's badge progress. Fails with
/// [`Error::EmptyProfile`] when the profile yields no badge data, which
/// usually means it is private.
#[async_trait]
pub trait BadgeOracle: Send + Sync {
    async fn get_badges(&self, customer: SteamID) -> Result<BadgeSummary, Error>;
}

/// How many sets a customer may acquire per game.
///
/// Games with a badge entry carry an explicit cap; any other game falls
/// back to `fallback`. Absence is an explicit fallback rather than a
/// sentinel, so "no badge progress" and "capped at zero" cannot be
/// confused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eligibility {
    caps: HashMap<AppId, u32>,
    fallback: u32,
}

impl Eligibility {
    /// Caps from badge comparison: a game's cap is however many levels the
    /// customer has left to craft. Games without a badge fall back to the
    /// full cap.
    pub fn compare(summary: &BadgeSummary) -> Self {
        let caps = summary.badges
            .iter()
            .filter(|badge| badge.is_game_badge())
            .filter_map(|badge| {
                let appid = badge.appid?;

                Some((appid, MAX_BADGE_LEVEL.saturating_sub(badge.level)))
            })
            .collect();

        Self {
            caps,
            fallback: MAX_BADGE_LEVEL,
        }
    }

    /// Collector caps: one set per game the customer holds no badge level
    /// in yet, zero for games already started.
    pub fn collector(summary: &BadgeSummary) -> Self {
        let caps = summary.badges
            .iter()
            .filter(|badge| badge.is_game_badge())
            .filter_map(|badge| {
                let appid = badge.appid?;

                Some((appid, u32::from(badge.level == 0)))
            })
            .collect();

        Self {
            caps,
            fallback: 1,
        }
    }

    /// No badge comparison at all; every game gets the fixed cap.
    pub fn any() -> Self {
        Self {
            caps: HashMap::new(),
            fallback: MAX_BADGE_LEVEL,
        }
    }

    /// Explicit caps with a fallback for uncapped games.
    pub fn explicit(caps: HashMap<AppId, u32>, fallback: u32) -> Self {
        Self {
            caps,
            fallback,
        }
    }

    /// The number of sets the customer may acquire for `appid`.
    pub fn allowed(&self, appid: AppId) -> u32 {
        self.caps.get(&appid).copied().unwrap_or(self.fallback)
    }
}
