use crate::types::AppId;
use serde::Deserialize;

/// A customer's badge progress, as returned by `IPlayerService/GetBadges`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BadgeSummary {
    /// One row per badge the customer has made progress on.
    #[serde(default)]
    pub badges: Vec<Badge>,
    /// The customer's Steam level.
    pub player_level: u32,
    /// The customer's accumulated experience.
    pub player_xp: u64,
}

/// A single badge row.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Badge {
    /// The game this badge belongs to. Absent for event and community
    /// badges, which do not bound set allocation.
    #[serde(default)]
    pub appid: Option<AppId>,
    /// The crafted badge level.
    pub level: u32,
    /// `0` for the regular badge, `1` for the foil badge.
    #[serde(default)]
    pub border_color: Option<u32>,
}

impl Badge {
    /// Whether this row counts towards set eligibility: a regular
    /// (non-foil) badge attached to a game.
    pub fn is_game_badge(&self) -> bool {
        self.appid.is_some() && self.border_color == Some(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_summary() {
        let json = r#"{
            "badges": [
                { "badgeid": 2, "level": 3, "completion_time": 1665184922, "xp": 212, "scarcity": 421 },
                { "badgeid": 13, "appid": 440, "level": 2, "border_color": 0, "xp": 200, "scarcity": 100 },
                { "badgeid": 13, "appid": 440, "level": 1, "border_color": 1, "xp": 100, "scarcity": 50 }
            ],
            "player_level": 14,
            "player_xp": 1306
        }"#;
        let summary: BadgeSummary = serde_json::from_str(json).unwrap();

        assert_eq!(summary.player_level, 14);
        assert_eq!(summary.badges.len(), 3);
        // Only the regular game badge counts.
        let eligible: Vec<_> = summary.badges
            .iter()
            .filter(|badge| badge.is_game_badge())
            .collect();

        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].level, 2);
    }
}
