//! Batting-order arithmetic shared by the lineup and the inning state.

use crate::error::DomainError;

/// Lowest batting slot.
pub const MIN_BATTING_SLOT: u8 = 1;

/// Highest batting slot a lineup may use.
pub const MAX_BATTING_SLOT: u8 = 20;

/// Slots in a standard nine-player batting order.
pub const STANDARD_BATTING_ORDER: u8 = 9;

/// Rejects slots outside 1–20.
pub fn validate_batting_slot(slot: u8) -> Result<u8, DomainError> {
    if (MIN_BATTING_SLOT..=MAX_BATTING_SLOT).contains(&slot) {
        Ok(slot)
    } else {
        Err(DomainError::InvalidBattingSlot(slot))
    }
}

/// Returns the slot that bats after `slot`.
///
/// Orders of nine wrap after slot 9; once the order has reached past nine it
/// runs to 20 before wrapping.
pub fn next_batting_slot(slot: u8) -> u8 {
    let last = if slot <= STANDARD_BATTING_ORDER {
        STANDARD_BATTING_ORDER
    } else {
        MAX_BATTING_SLOT
    };

    if slot >= last { MIN_BATTING_SLOT } else { slot + 1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_in_range_are_accepted() {
        assert!(validate_batting_slot(1).is_ok());
        assert!(validate_batting_slot(20).is_ok());
        assert!(matches!(
            validate_batting_slot(0),
            Err(DomainError::InvalidBattingSlot(0))
        ));
        assert!(validate_batting_slot(21).is_err());
    }

    #[test]
    fn standard_order_wraps_after_nine() {
        assert_eq!(next_batting_slot(1), 2);
        assert_eq!(next_batting_slot(8), 9);
        assert_eq!(next_batting_slot(9), 1);
    }

    #[test]
    fn extended_order_wraps_after_twenty() {
        assert_eq!(next_batting_slot(10), 11);
        assert_eq!(next_batting_slot(19), 20);
        assert_eq!(next_batting_slot(20), 1);
    }
}
