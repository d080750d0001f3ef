//! Dashboard loading: every market card plus the connected account's balance.

use futures::future::try_join_all;
use tracing::{debug, instrument, warn};

use super::types::{Session, TokenBalance};
use super::units::to_decimal;
use super::view::{MarketCard, MarketCategory};
use crate::chain::MarketReader;
use crate::error::ChainError;

/// Fetch one card: the market snapshot and, when connected, the user's shares.
#[instrument(skip(reader, session))]
pub async fn load_card<R>(
    reader: &R,
    session: &Session,
    market_id: u64,
) -> Result<MarketCard, ChainError>
where
    R: MarketReader + ?Sized,
{
    let market = reader.market_info(market_id);
    let shares = async {
        match session.account {
            Some(account) => reader.shares_balance(market_id, account).await.map(Some),
            None => Ok(None),
        }
    };

    let (market, shares) = futures::try_join!(market, shares)?;

    Ok(MarketCard {
        id: market_id,
        market,
        shares,
    })
}

/// All market cards, fetched concurrently.
#[derive(Debug, Clone, Default)]
pub struct Dashboard {
    /// Cards ordered by market id.
    pub cards: Vec<MarketCard>,
}

impl Dashboard {
    /// Load every market id in `0..marketCount()`.
    #[instrument(skip(reader, session))]
    pub async fn load<R>(reader: &R, session: &Session) -> Result<Self, ChainError>
    where
        R: MarketReader + ?Sized,
    {
        let count = reader.market_count().await?;
        debug!(count, "Loading market cards");

        let cards = try_join_all((0..count).map(|id| load_card(reader, session, id))).await?;
        Ok(Self { cards })
    }

    /// Cards shown under one tab at `now`.
    pub fn tab(&self, category: MarketCategory, now: u64) -> Vec<&MarketCard> {
        self.cards
            .iter()
            .filter(|card| card.category(now) == category)
            .collect()
    }
}

/// Navbar balance text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceDisplay {
    /// No wallet connected; nothing shown.
    Hidden,
    /// Read in flight.
    Loading,
    /// Read failed.
    Error,
    /// Balance loaded.
    Loaded(TokenBalance),
}

impl BalanceDisplay {
    /// Fetch the connected account's token balance.
    pub async fn load<R>(reader: &R, session: &Session) -> Self
    where
        R: MarketReader + ?Sized,
    {
        let Some(account) = session.account else {
            return BalanceDisplay::Hidden;
        };

        match reader.token_balance(account).await {
            Ok(balance) => BalanceDisplay::Loaded(balance),
            Err(e) => {
                warn!(account = %account, error = %e, "Failed to load token balance");
                BalanceDisplay::Error
            }
        }
    }

    /// Text for the navbar, if any.
    pub fn text(&self) -> Option<String> {
        match self {
            BalanceDisplay::Hidden => None,
            BalanceDisplay::Loading => Some("Loading balance...".to_string()),
            BalanceDisplay::Error => Some("Error loading balance".to_string()),
            BalanceDisplay::Loaded(balance) => Some(format!(
                "Balance: {} {}",
                to_decimal(balance.value, balance.decimals, 4).normalize(),
                balance.symbol
            )),
        }
    }
}
