//! Staged share purchase: option → amount → allowance check → approve → confirm.
//!
//! One workflow exists per market card. Every async step takes `&mut self`,
//! so a second trigger cannot start while a read or transaction is pending.
//! Cancelling discards local state only; a transaction that was already
//! submitted still runs to completion on chain.

use alloy::primitives::{Address, TxHash, U256};
use strum::Display;
use tracing::{info, instrument, warn};

use super::notification::Notification;
use crate::chain::{MarketReader, MarketWriter};
use crate::error::{PurchaseError, ValidationError};
use crate::market::units::{to_base_units, TOKEN_DECIMALS};
use crate::market::{Market, MarketOption, Session};
use crate::metrics;

/// Visible step of the buy interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum PurchaseStep {
    /// Option buttons or amount entry.
    #[strum(serialize = "initial")]
    Initial,
    /// Token approval needed before buying.
    #[strum(serialize = "allowance")]
    AwaitingAllowance,
    /// Ready to send the purchase.
    #[strum(serialize = "confirm")]
    AwaitingConfirmation,
}

/// Workflow state. Only the variants below are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseState {
    /// No option picked; option buttons shown.
    Idle,
    /// Option picked, entering an amount.
    Initial {
        /// Selected option.
        option: MarketOption,
        /// Whole tokens.
        amount: u64,
    },
    /// Allowance below the requested amount.
    AwaitingAllowance {
        /// Selected option.
        option: MarketOption,
        /// Whole tokens.
        amount: u64,
    },
    /// Allowance sufficient; purchase can be sent.
    AwaitingConfirmation {
        /// Selected option.
        option: MarketOption,
        /// Whole tokens.
        amount: u64,
    },
}

impl PurchaseState {
    /// Step shown for this state.
    pub fn step(&self) -> PurchaseStep {
        match self {
            PurchaseState::Idle | PurchaseState::Initial { .. } => PurchaseStep::Initial,
            PurchaseState::AwaitingAllowance { .. } => PurchaseStep::AwaitingAllowance,
            PurchaseState::AwaitingConfirmation { .. } => PurchaseStep::AwaitingConfirmation,
        }
    }

    /// Selected option and amount, if an intent exists.
    pub fn intent(&self) -> Option<(MarketOption, u64)> {
        match *self {
            PurchaseState::Idle => None,
            PurchaseState::Initial { option, amount }
            | PurchaseState::AwaitingAllowance { option, amount }
            | PurchaseState::AwaitingConfirmation { option, amount } => Some((option, amount)),
        }
    }
}

/// A settled purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseReceipt {
    /// Purchase transaction hash.
    pub tx_hash: TxHash,
    /// Option bought.
    pub option: MarketOption,
    /// Whole tokens spent.
    pub amount: u64,
    /// Success notification to show.
    pub notification: Notification,
}

/// Parse the amount field. Non-numeric, zero and negative input are rejected.
pub fn parse_amount(input: &str) -> Result<u64, ValidationError> {
    match input.trim().parse::<i128>() {
        Ok(value) if value > 0 => u64::try_from(value).map_err(|_| ValidationError::NonPositiveAmount),
        _ => Err(ValidationError::NonPositiveAmount),
    }
}

/// Buy workflow for one market card.
#[derive(Debug, Clone)]
pub struct PurchaseWorkflow {
    market_id: u64,
    option_a: String,
    option_b: String,
    session: Session,
    spender: Address,
    decimals: u8,
    state: PurchaseState,
    error: Option<ValidationError>,
}

impl PurchaseWorkflow {
    /// Create a workflow for `market`. `spender` is the market contract.
    pub fn new(market_id: u64, market: &Market, session: Session, spender: Address) -> Self {
        Self {
            market_id,
            option_a: market.option_a.clone(),
            option_b: market.option_b.clone(),
            session,
            spender,
            decimals: TOKEN_DECIMALS,
            state: PurchaseState::Idle,
            error: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> PurchaseState {
        self.state
    }

    /// Current visible step.
    pub fn step(&self) -> PurchaseStep {
        self.state.step()
    }

    /// Inline validation message, if any.
    pub fn error(&self) -> Option<&ValidationError> {
        self.error.as_ref()
    }

    /// Whether the option buttons are enabled.
    pub fn can_select(&self) -> bool {
        self.session.is_connected() && self.state == PurchaseState::Idle
    }

    /// Label of an option.
    pub fn option_name(&self, option: MarketOption) -> &str {
        match option {
            MarketOption::A => &self.option_a,
            MarketOption::B => &self.option_b,
        }
    }

    /// Requested amount in base units.
    pub fn base_amount(&self, amount: u64) -> U256 {
        to_base_units(amount, self.decimals)
    }

    /// Pick an option. Returns `false` (and changes nothing) when disabled.
    pub fn select_option(&mut self, option: MarketOption) -> bool {
        if !self.can_select() {
            return false;
        }

        self.state = PurchaseState::Initial { option, amount: 0 };
        self.error = None;
        true
    }

    /// Set the amount while entering it.
    pub fn set_amount(&mut self, amount: u64) -> Result<(), PurchaseError> {
        match self.state {
            PurchaseState::Initial { option, .. } => {
                self.state = PurchaseState::Initial { option, amount };
                self.error = None;
                Ok(())
            }
            _ => Err(self.wrong_step("set amount")),
        }
    }

    /// Set the amount from text input; invalid text leaves an inline error.
    pub fn enter_amount(&mut self, input: &str) -> Result<(), PurchaseError> {
        match parse_amount(input) {
            Ok(amount) => self.set_amount(amount),
            Err(e) => {
                self.set_amount(0)?;
                self.error = Some(e.clone());
                Err(e.into())
            }
        }
    }

    /// Read the allowance and move to `allowance` or straight to `confirm`.
    #[instrument(skip(self, reader), fields(market_id = self.market_id))]
    pub async fn check_allowance<R>(&mut self, reader: &R) -> Result<PurchaseStep, PurchaseError>
    where
        R: MarketReader + ?Sized,
    {
        let (option, amount) = match self.state {
            PurchaseState::Initial { option, amount } => (option, amount),
            _ => return Err(self.wrong_step("check allowance")),
        };

        if amount == 0 {
            self.error = Some(ValidationError::NonPositiveAmount);
            return Err(ValidationError::NonPositiveAmount.into());
        }
        self.error = None;

        let Some(owner) = self.session.account else {
            return Err(self.wrong_step("check allowance"));
        };

        let allowance = reader.allowance(owner, self.spender).await.map_err(|e| {
            warn!(error = %e, "Allowance read failed");
            PurchaseError::from(e)
        })?;

        let required = self.base_amount(amount);
        self.state = if allowance < required {
            PurchaseState::AwaitingAllowance { option, amount }
        } else {
            PurchaseState::AwaitingConfirmation { option, amount }
        };

        info!(%allowance, %required, step = %self.step(), "Allowance checked");
        Ok(self.step())
    }

    /// Send the approval; on success move to `confirm`.
    #[instrument(skip(self, writer), fields(market_id = self.market_id))]
    pub async fn approve<W>(&mut self, writer: &W) -> Result<TxHash, PurchaseError>
    where
        W: MarketWriter + ?Sized,
    {
        let (option, amount) = match self.state {
            PurchaseState::AwaitingAllowance { option, amount } => (option, amount),
            _ => return Err(self.wrong_step("approve")),
        };

        match writer.approve(self.spender, self.base_amount(amount)).await {
            Ok(tx_hash) => {
                metrics::inc_approvals();
                self.state = PurchaseState::AwaitingConfirmation { option, amount };
                info!(tx_hash = %tx_hash, "Approval set");
                Ok(tx_hash)
            }
            Err(e) => {
                metrics::inc_transactions_failed("approve");
                warn!(error = %e, "Approval failed");
                Err(e.into())
            }
        }
    }

    /// Send the purchase; on success reset to a fresh `initial` state.
    #[instrument(skip(self, writer), fields(market_id = self.market_id))]
    pub async fn confirm<W>(&mut self, writer: &W) -> Result<PurchaseReceipt, PurchaseError>
    where
        W: MarketWriter + ?Sized,
    {
        let (option, amount) = match self.state {
            PurchaseState::AwaitingConfirmation { option, amount } => (option, amount),
            _ => return Err(self.wrong_step("confirm")),
        };

        if amount == 0 {
            self.error = Some(ValidationError::IncompleteIntent);
            return Err(ValidationError::IncompleteIntent.into());
        }

        match writer
            .buy_shares(self.market_id, option, self.base_amount(amount))
            .await
        {
            Ok(tx_hash) => {
                metrics::inc_purchases();
                let notification = Notification::info(
                    "Purchase Successful!",
                    format!("You bought {} {} shares", amount, self.option_name(option)),
                );
                info!(tx_hash = %tx_hash, %option, amount, "Purchase settled");
                self.cancel();

                Ok(PurchaseReceipt {
                    tx_hash,
                    option,
                    amount,
                    notification,
                })
            }
            Err(e) => {
                metrics::inc_transactions_failed("buy_shares");
                warn!(error = %e, "Purchase failed");
                Err(e.into())
            }
        }
    }

    /// Discard the intent and return to the option buttons.
    pub fn cancel(&mut self) {
        self.state = PurchaseState::Idle;
        self.error = None;
    }

    fn wrong_step(&self, action: &'static str) -> PurchaseError {
        PurchaseError::WrongStep {
            action,
            step: self.step().to_string(),
        }
    }
}

/// Notification for a failed approval or purchase.
pub fn failure_notification(step: PurchaseStep, err: &PurchaseError) -> Notification {
    let title = match step {
        PurchaseStep::AwaitingAllowance => "Approval Failed",
        PurchaseStep::AwaitingConfirmation => "Purchase Failed",
        PurchaseStep::Initial => "Error",
    };
    Notification::destructive(title, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{ChainCall, MockChain, MockConfig};
    use crate::market::Outcome;
    use pretty_assertions::assert_eq;

    fn user() -> Address {
        Address::repeat_byte(0x11)
    }

    fn market() -> Market {
        Market {
            question: "Will it rain?".to_string(),
            option_a: "Yes".to_string(),
            option_b: "No".to_string(),
            end_time: u64::MAX,
            outcome: Outcome::Unresolved,
            total_option_a_shares: U256::ZERO,
            total_option_b_shares: U256::ZERO,
            resolved: false,
        }
    }

    fn setup(config: MockConfig) -> (MockChain, PurchaseWorkflow) {
        let chain = MockChain::with_config(user(), config);
        let id = chain.add_market(market());
        let workflow = PurchaseWorkflow::new(
            id,
            &market(),
            Session::connected(user()),
            MockChain::MARKET_ADDRESS,
        );
        (chain, workflow)
    }

    #[test]
    fn selection_disabled_without_account() {
        let mut workflow = PurchaseWorkflow::new(
            0,
            &market(),
            Session::disconnected(),
            MockChain::MARKET_ADDRESS,
        );

        assert!(!workflow.can_select());
        assert!(!workflow.select_option(MarketOption::A));
        assert_eq!(workflow.state(), PurchaseState::Idle);
        assert!(workflow.error().is_none());
    }

    #[tokio::test]
    async fn zero_amount_stays_initial_with_inline_error() {
        let (chain, mut workflow) = setup(MockConfig::default());
        assert!(workflow.select_option(MarketOption::A));

        let result = workflow.check_allowance(&chain).await;

        assert!(matches!(
            result,
            Err(PurchaseError::Validation(ValidationError::NonPositiveAmount))
        ));
        assert_eq!(workflow.step(), PurchaseStep::Initial);
        assert_eq!(
            workflow.error().map(|e| e.to_string()),
            Some("Amount must be greater than 0".to_string())
        );
    }

    #[test]
    fn negative_or_garbage_input_rejected() {
        let (_, mut workflow) = setup(MockConfig::default());
        workflow.select_option(MarketOption::B);

        assert!(workflow.enter_amount("-5").is_err());
        assert_eq!(workflow.error(), Some(&ValidationError::NonPositiveAmount));
        assert!(workflow.enter_amount("abc").is_err());

        workflow.enter_amount("12").unwrap();
        assert!(workflow.error().is_none());
        assert_eq!(workflow.state().intent(), Some((MarketOption::B, 12)));
    }

    #[test]
    fn rejected_amount_raises_error_toast() {
        let (_, mut workflow) = setup(MockConfig::default());
        workflow.select_option(MarketOption::A);

        let err = workflow.enter_amount("0").unwrap_err();
        let toast = failure_notification(workflow.step(), &err);

        assert_eq!(workflow.step(), PurchaseStep::Initial);
        assert_eq!(toast.title, "Error");
        assert_eq!(toast.description, "Amount must be greater than 0");
        assert!(toast.is_error());
    }

    #[tokio::test]
    async fn sufficient_allowance_skips_approval() {
        let (chain, mut workflow) = setup(MockConfig::default());
        chain.set_allowance(user(), MockChain::MARKET_ADDRESS, workflow.base_amount(10));

        workflow.select_option(MarketOption::A);
        workflow.set_amount(10).unwrap();

        let step = workflow.check_allowance(&chain).await.unwrap();

        assert_eq!(step, PurchaseStep::AwaitingConfirmation);
        assert!(chain.calls().is_empty());
    }

    #[tokio::test]
    async fn low_allowance_requires_approval_then_buys() {
        let (chain, mut workflow) = setup(MockConfig::default());
        chain.set_allowance(user(), MockChain::MARKET_ADDRESS, workflow.base_amount(1));

        workflow.select_option(MarketOption::B);
        workflow.set_amount(3).unwrap();

        assert_eq!(
            workflow.check_allowance(&chain).await.unwrap(),
            PurchaseStep::AwaitingAllowance
        );

        workflow.approve(&chain).await.unwrap();
        assert_eq!(workflow.step(), PurchaseStep::AwaitingConfirmation);

        let receipt = workflow.confirm(&chain).await.unwrap();
        assert_eq!(receipt.notification.title, "Purchase Successful!");
        assert_eq!(receipt.notification.description, "You bought 3 No shares");
        assert_eq!(workflow.state(), PurchaseState::Idle);

        let amount = workflow.base_amount(3);
        assert_eq!(
            chain.calls(),
            vec![
                ChainCall::Approve {
                    spender: MockChain::MARKET_ADDRESS,
                    amount
                },
                ChainCall::BuyShares {
                    market_id: 0,
                    option: MarketOption::B,
                    amount
                },
            ]
        );
    }

    #[tokio::test]
    async fn failed_approval_stays_for_retry() {
        let (mut chain, mut workflow) = setup(MockConfig {
            fail_approve: true,
            ..Default::default()
        });

        workflow.select_option(MarketOption::A);
        workflow.set_amount(2).unwrap();
        workflow.check_allowance(&chain).await.unwrap();

        let err = workflow.approve(&chain).await.unwrap_err();
        assert_eq!(workflow.step(), PurchaseStep::AwaitingAllowance);
        let toast = failure_notification(workflow.step(), &err);
        assert_eq!(toast.title, "Approval Failed");
        assert!(toast.is_error());

        chain.set_config(MockConfig::default());
        workflow.approve(&chain).await.unwrap();
        assert_eq!(workflow.step(), PurchaseStep::AwaitingConfirmation);
    }

    #[tokio::test]
    async fn failed_purchase_surfaces_message_and_stays() {
        let (chain, mut workflow) = setup(MockConfig {
            fail_buy: true,
            ..Default::default()
        });
        chain.set_allowance(user(), MockChain::MARKET_ADDRESS, workflow.base_amount(5));

        workflow.select_option(MarketOption::A);
        workflow.set_amount(5).unwrap();
        workflow.check_allowance(&chain).await.unwrap();

        let err = workflow.confirm(&chain).await.unwrap_err();
        let toast = failure_notification(workflow.step(), &err);

        assert_eq!(workflow.step(), PurchaseStep::AwaitingConfirmation);
        assert_eq!(toast.title, "Purchase Failed");
        assert_eq!(toast.description, "Mock purchase failure");
    }

    #[tokio::test]
    async fn cancel_discards_intent_from_any_step() {
        let (chain, mut workflow) = setup(MockConfig::default());

        workflow.select_option(MarketOption::A);
        workflow.set_amount(4).unwrap();
        workflow.check_allowance(&chain).await.unwrap();
        assert_eq!(workflow.step(), PurchaseStep::AwaitingAllowance);

        workflow.cancel();

        assert_eq!(workflow.state(), PurchaseState::Idle);
        assert!(workflow.can_select());
        assert!(chain.calls().is_empty());
    }

    #[tokio::test]
    async fn actions_out_of_order_are_rejected() {
        let (chain, mut workflow) = setup(MockConfig::default());

        assert!(matches!(
            workflow.confirm(&chain).await,
            Err(PurchaseError::WrongStep { .. })
        ));
        assert!(matches!(
            workflow.approve(&chain).await,
            Err(PurchaseError::WrongStep { .. })
        ));
        assert!(workflow.set_amount(1).is_err());
    }

    #[tokio::test]
    async fn failed_allowance_read_keeps_state() {
        let (chain, mut workflow) = setup(MockConfig {
            fail_reads: true,
            ..Default::default()
        });

        workflow.select_option(MarketOption::A);
        workflow.set_amount(1).unwrap();

        assert!(matches!(
            workflow.check_allowance(&chain).await,
            Err(PurchaseError::Transaction(_))
        ));
        assert_eq!(
            workflow.state(),
            PurchaseState::Initial {
                option: MarketOption::A,
                amount: 1
            }
        );
    }

    #[test]
    fn parse_amount_cases() {
        assert_eq!(parse_amount("7"), Ok(7));
        assert_eq!(parse_amount(" 7 "), Ok(7));
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("-1").is_err());
        assert!(parse_amount("1.5").is_err());
    }
}
