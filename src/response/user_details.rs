use std::cmp;
use serde::Deserialize;

/// Escrow details for both parties of a prospective trade.
#[derive(Deserialize, Debug, Clone, Copy, Default)]
pub struct UserDetails {
    /// The number of days the partner's items would be held in escrow.
    pub them_escrow_days: u32,
    /// The number of days our items would be held in escrow.
    pub my_escrow_days: u32,
}

impl UserDetails {
    /// Whether either party would cause the trade to be held.
    pub fn has_escrow(&self) -> bool {
        self.them_escrow_days > 0 || self.my_escrow_days > 0
    }

    /// The length of the hold in days.
    pub fn hold_duration_days(&self) -> u32 {
        cmp::max(self.them_escrow_days, self.my_escrow_days)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escrow_works() {
        let details = UserDetails {
            them_escrow_days: 0,
            my_escrow_days: 3,
        };

        assert!(details.has_escrow());
        assert_eq!(details.hold_duration_days(), 3);
    }

    #[test]
    fn no_escrow() {
        assert!(!UserDetails::default().has_escrow());
    }
}
