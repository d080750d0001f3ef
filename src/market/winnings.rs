//! Projected payout calculations for binary markets.
//!
//! Losing-side stake is redistributed pro-rata to the winning side: a winner
//! gets their own shares back plus their proportion of the opposing pool.
//!
//! ```text
//! user shares on A:      100
//! total shares on A:     400   -> proportion = 100 * 1_000_000 / 400 = 250_000
//! total shares on B:     200   -> from losers = 200 * 250_000 / 1_000_000 = 50
//! ─────────────────────────────
//! payout if A wins:      150
//! ```
//!
//! Operand order (multiply, then divide) matches the contract's integer
//! rounding.

use alloy::primitives::U256;
use rust_decimal::Decimal;

use super::types::{Market, MarketOption, SharesBalance};
use super::units::{to_decimal, TOKEN_DECIMALS};

/// Fixed-point precision for the user's proportion of a pool.
pub const PROPORTION_SCALE: u64 = 1_000_000;

/// Projected payout if the option holding `user_shares` wins.
///
/// Returns zero when nobody holds the option. Products saturate at
/// `U256::MAX` rather than wrapping.
pub fn calculate_winnings(
    user_shares: U256,
    total_shares_for_option: U256,
    total_opposing_shares: U256,
) -> U256 {
    if total_shares_for_option.is_zero() {
        return U256::ZERO;
    }

    let scale = U256::from(PROPORTION_SCALE);
    let proportion = user_shares.saturating_mul(scale) / total_shares_for_option;
    let from_losing = total_opposing_shares.saturating_mul(proportion) / scale;

    user_shares.saturating_add(from_losing)
}

/// Projected payout for each option, assuming that option wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Winnings {
    /// Payout if option A wins.
    pub a: U256,
    /// Payout if option B wins.
    pub b: U256,
}

impl Winnings {
    /// Compute both projections from a market snapshot and a user's shares.
    pub fn project(market: &Market, shares: &SharesBalance) -> Self {
        Self {
            a: winnings_for(market, shares, MarketOption::A),
            b: winnings_for(market, shares, MarketOption::B),
        }
    }

    /// Projection for one option.
    pub fn get(&self, option: MarketOption) -> U256 {
        match option {
            MarketOption::A => self.a,
            MarketOption::B => self.b,
        }
    }

    /// Whether there is anything worth showing.
    pub fn has_any(&self) -> bool {
        !self.a.is_zero() || !self.b.is_zero()
    }

    /// Projection in whole tokens, truncated to two decimals.
    pub fn display(&self, option: MarketOption) -> Decimal {
        to_decimal(self.get(option), TOKEN_DECIMALS, 2)
    }
}

fn winnings_for(market: &Market, shares: &SharesBalance, option: MarketOption) -> U256 {
    calculate_winnings(
        shares.shares(option),
        market.total_shares(option),
        market.total_shares(option.opposite()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::types::Outcome;
    use crate::market::units::to_base_units;
    use rust_decimal_macros::dec;

    fn u(n: u64) -> U256 {
        U256::from(n)
    }

    fn test_market(total_a: U256, total_b: U256) -> Market {
        Market {
            question: "Q".to_string(),
            option_a: "Yes".to_string(),
            option_b: "No".to_string(),
            end_time: 0,
            outcome: Outcome::Unresolved,
            total_option_a_shares: total_a,
            total_option_b_shares: total_b,
            resolved: false,
        }
    }

    #[test]
    fn worked_example() {
        assert_eq!(calculate_winnings(u(100), u(400), u(200)), u(150));
    }

    #[test]
    fn empty_pool_pays_nothing() {
        assert_eq!(calculate_winnings(u(0), u(0), u(500)), U256::ZERO);
        assert_eq!(calculate_winnings(u(10), u(0), u(0)), U256::ZERO);
    }

    #[test]
    fn never_less_than_own_stake() {
        let cases = [
            (u(1), u(3), u(0)),
            (u(1), u(3), u(1)),
            (u(7), u(7), u(1_000)),
            (u(333), u(1_000), u(999)),
            (to_base_units(5, 18), to_base_units(12, 18), to_base_units(40, 18)),
        ];
        for (user, total, opposing) in cases {
            assert!(calculate_winnings(user, total, opposing) >= user);
        }
    }

    #[test]
    fn truncates_like_the_contract() {
        // proportion = 1 * 1_000_000 / 3 = 333_333
        // from losers = 10 * 333_333 / 1_000_000 = 3
        assert_eq!(calculate_winnings(u(1), u(3), u(10)), u(4));
    }

    #[test]
    fn deterministic() {
        let first = calculate_winnings(u(123), u(456), u(789));
        let second = calculate_winnings(u(123), u(456), u(789));
        assert_eq!(first, second);
    }

    #[test]
    fn saturates_instead_of_overflowing() {
        let result = calculate_winnings(U256::MAX, U256::MAX, U256::MAX);
        assert!(result >= U256::MAX / u(2));
    }

    #[test]
    fn project_both_options() {
        let market = test_market(u(400), u(200));
        let shares = SharesBalance {
            option_a_shares: u(100),
            option_b_shares: u(50),
        };

        let winnings = Winnings::project(&market, &shares);

        assert_eq!(winnings.a, u(150));
        // proportion = 50 * 1_000_000 / 200 = 250_000; 400 * 250_000 / 1_000_000 = 100
        assert_eq!(winnings.b, u(150));
        assert!(winnings.has_any());
    }

    #[test]
    fn display_in_whole_tokens() {
        let market = test_market(to_base_units(400, 18), to_base_units(200, 18));
        let shares = SharesBalance {
            option_a_shares: to_base_units(100, 18),
            option_b_shares: U256::ZERO,
        };

        let winnings = Winnings::project(&market, &shares);

        assert_eq!(winnings.display(MarketOption::A), dec!(150.00));
        assert_eq!(winnings.display(MarketOption::B), dec!(0));
    }

    #[test]
    fn no_shares_no_badges() {
        let market = test_market(u(400), u(200));
        let winnings = Winnings::project(&market, &SharesBalance::default());
        assert!(!winnings.has_any());
    }
}
