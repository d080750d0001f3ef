//! Read-only presentation of market snapshots.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use time::macros::format_description;
use time::OffsetDateTime;

use super::types::{Market, MarketOption, SharesBalance};
use super::units::{floor_tokens, TOKEN_DECIMALS};
use super::winnings::Winnings;

/// Dashboard tab a market belongs to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
pub enum MarketCategory {
    /// Still open for trading.
    #[strum(to_string = "Active", serialize = "active")]
    Active,
    /// Trading ended, outcome not yet set.
    #[strum(to_string = "Pending Resolution", serialize = "pending")]
    Pending,
    /// Trading ended and outcome set.
    #[strum(to_string = "Resolved", serialize = "resolved")]
    Resolved,
}

impl MarketCategory {
    /// Categorize a market at `now` (unix seconds).
    pub fn of(market: &Market, now: u64) -> Self {
        if !market.is_expired_at(now) {
            MarketCategory::Active
        } else if market.resolved {
            MarketCategory::Resolved
        } else {
            MarketCategory::Pending
        }
    }
}

/// Share split between the two options, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// Percent of shares on option A (two decimals, truncated).
    pub percent_a: Decimal,
    /// Whether any shares exist at all.
    pub has_shares: bool,
}

impl Progress {
    /// Split for a market; 50/50 when both pools are empty.
    pub fn of(market: &Market) -> Self {
        let mut a = market.total_option_a_shares;
        let mut b = market.total_option_b_shares;

        if a.is_zero() && b.is_zero() {
            return Self {
                percent_a: dec!(50),
                has_shares: false,
            };
        }

        // Keep (a + b) * 10_000 inside 256 bits.
        let limit = U256::MAX / U256::from(20_000u64);
        while a > limit || b > limit {
            a >>= 1usize;
            b >>= 1usize;
        }

        let total = a + b;
        let basis_points = if total.is_zero() {
            5_000u64
        } else {
            u64::try_from(a * U256::from(10_000u64) / total).unwrap_or(10_000)
        };

        Self {
            percent_a: Decimal::new(basis_points as i64, 2),
            has_shares: true,
        }
    }

    /// Percent of shares on option B.
    pub fn percent_b(&self) -> Decimal {
        dec!(100) - self.percent_a
    }
}

fn format_date(unix_seconds: u64) -> String {
    let format = format_description!("[month repr:short] [day padding:none], [year]");

    i64::try_from(unix_seconds)
        .ok()
        .and_then(|secs| OffsetDateTime::from_unix_timestamp(secs).ok())
        .and_then(|dt| dt.format(format).ok())
        .unwrap_or_else(|| unix_seconds.to_string())
}

/// `Ends: Mon D, YYYY` or `Ended: Mon D, YYYY`.
pub fn time_badge(market: &Market, now: u64) -> String {
    let prefix = if market.is_expired_at(now) {
        "Ended"
    } else {
        "Ends"
    };
    format!("{}: {}", prefix, format_date(market.end_time))
}

/// Progress line: totals in whole tokens, percentages when any shares exist.
pub fn progress_line(market: &Market) -> String {
    let progress = Progress::of(market);
    let total_a = floor_tokens(market.total_option_a_shares, TOKEN_DECIMALS);
    let total_b = floor_tokens(market.total_option_b_shares, TOKEN_DECIMALS);

    if progress.has_shares {
        format!(
            "{}: {} {}% | {}: {} {}%",
            market.option_a,
            total_a,
            progress.percent_a.floor(),
            market.option_b,
            total_b,
            progress.percent_b().floor(),
        )
    } else {
        format!(
            "{}: {} | {}: {}",
            market.option_a, total_a, market.option_b, total_b
        )
    }
}

/// Banner shown under an expired market.
pub fn resolution_banner(market: &Market) -> String {
    match market.outcome.winner() {
        Some(option) if market.resolved => format!("Resolved: {}", market.option_name(option)),
        _ => "Pending resolution".to_string(),
    }
}

/// `Your shares: A - n, B - m` in whole tokens.
pub fn shares_line(market: &Market, shares: &SharesBalance) -> String {
    format!(
        "Your shares: {} - {}, {} - {}",
        market.option_a,
        floor_tokens(shares.option_a_shares, TOKEN_DECIMALS),
        market.option_b,
        floor_tokens(shares.option_b_shares, TOKEN_DECIMALS),
    )
}

/// Winnings badges, or `None` when both projections are zero.
pub fn winnings_line(market: &Market, winnings: &Winnings) -> Option<String> {
    if !winnings.has_any() {
        return None;
    }

    Some(format!(
        "Winnings: {}: {:.2} shares | {}: {:.2} shares",
        market.option_a,
        winnings.display(MarketOption::A),
        market.option_b,
        winnings.display(MarketOption::B),
    ))
}

/// One market as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketCard {
    /// Market id.
    pub id: u64,
    /// Market snapshot.
    pub market: Market,
    /// Connected user's shares, if a wallet is connected.
    pub shares: Option<SharesBalance>,
}

impl MarketCard {
    /// Tab this card belongs to at `now`.
    pub fn category(&self, now: u64) -> MarketCategory {
        MarketCategory::of(&self.market, now)
    }

    /// Winnings projection for the connected user.
    pub fn winnings(&self) -> Option<Winnings> {
        self.shares
            .as_ref()
            .map(|shares| Winnings::project(&self.market, shares))
    }

    /// Render the card as text lines.
    pub fn render(&self, now: u64) -> Vec<String> {
        let mut lines = vec![
            format!("#{} {}", self.id, self.market.question),
            time_badge(&self.market, now),
            progress_line(&self.market),
        ];

        match self.category(now) {
            MarketCategory::Active => lines.push(format!(
                "Buy: {} / {}",
                self.market.option_a, self.market.option_b
            )),
            MarketCategory::Pending => lines.push(resolution_banner(&self.market)),
            MarketCategory::Resolved => {
                lines.push(resolution_banner(&self.market));
                lines.push("Claim Rewards available".to_string());
            }
        }

        if let Some(shares) = &self.shares {
            lines.push(shares_line(&self.market, shares));
            if let Some(winnings) = self.winnings().and_then(|w| winnings_line(&self.market, &w)) {
                lines.push(winnings);
            }
        }

        lines
    }
}
