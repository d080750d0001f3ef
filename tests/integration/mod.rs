//! Integration tests for the prediction market dashboard and faucet.
//!
//! Most tests run against the in-memory mock chain. Tests marked `#[ignore]`
//! need a live node and a funded key.
//! Run with: cargo test --test integration -- --ignored

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use pretty_assertions::assert_eq;
use tokio::net::TcpListener;

use predict_market::api::{create_router, AppState};
use predict_market::chain::{ChainCall, MarketReader, MockChain, MockConfig, RpcChain};
use predict_market::config::Config;
use predict_market::market::units::to_base_units;
use predict_market::market::{
    BalanceDisplay, Dashboard, Market, MarketCategory, MarketOption, Outcome, Session,
};
use predict_market::trading::{
    claim_winnings, FaucetClient, PurchaseState, PurchaseStep, PurchaseWorkflow,
};

fn user() -> Address {
    Address::repeat_byte(0x11)
}

fn open_market(question: &str) -> Market {
    Market {
        question: question.to_string(),
        option_a: "Yes".to_string(),
        option_b: "No".to_string(),
        end_time: u64::MAX,
        outcome: Outcome::Unresolved,
        total_option_a_shares: U256::ZERO,
        total_option_b_shares: U256::ZERO,
        resolved: false,
    }
}

/// Serve the faucet on an ephemeral port; returns its base URL.
async fn spawn_faucet(chain: &MockChain) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = AppState::new(Arc::new(chain.clone()), to_base_units(100, 18));

    tokio::spawn(async move {
        axum::serve(listener, create_router(state)).await.unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn faucet_then_purchase_then_dashboard() {
    let chain = MockChain::new(user());
    let id = chain.add_market(open_market("Will it rain tomorrow?"));
    let session = Session::connected(user());

    // Fund the wallet through the HTTP faucet.
    let faucet = FaucetClient::new(spawn_faucet(&chain).await).unwrap();
    let tx_hash = faucet.claim(&session).await.unwrap();
    assert!(tx_hash.starts_with("0x"));

    let balance = BalanceDisplay::load(&chain, &session).await;
    assert_eq!(balance.text(), Some("Balance: 100 PMT".to_string()));

    // Buy 40 Yes shares: allowance is zero, so approval comes first.
    let market = chain.market_info(id).await.unwrap();
    let mut workflow = PurchaseWorkflow::new(id, &market, session, chain.market_address());
    assert!(workflow.select_option(MarketOption::A));
    workflow.enter_amount("40").unwrap();

    assert_eq!(
        workflow.check_allowance(&chain).await.unwrap(),
        PurchaseStep::AwaitingAllowance
    );
    workflow.approve(&chain).await.unwrap();
    let receipt = workflow.confirm(&chain).await.unwrap();

    assert_eq!(receipt.notification.description, "You bought 40 Yes shares");
    assert_eq!(workflow.state(), PurchaseState::Idle);

    // The dashboard reflects the purchase.
    let dashboard = Dashboard::load(&chain, &session).await.unwrap();
    let active = dashboard.tab(MarketCategory::Active, 1_000);
    assert_eq!(active.len(), 1);

    let lines = active[0].render(1_000);
    assert!(lines.contains(&"Yes: 40 100% | No: 0 0%".to_string()));
    assert!(lines.contains(&"Your shares: Yes - 40, No - 0".to_string()));
    assert!(lines.contains(&"Winnings: Yes: 40.00 shares | No: 0.00 shares".to_string()));

    let kinds: Vec<&str> = chain
        .calls()
        .iter()
        .map(|call| match call {
            ChainCall::MintTo { .. } => "mint",
            ChainCall::Approve { .. } => "approve",
            ChainCall::BuyShares { .. } => "buy",
            ChainCall::ClaimWinnings { .. } => "claim",
        })
        .collect();
    assert_eq!(kinds, vec!["mint", "approve", "buy"]);
}

#[tokio::test]
async fn second_purchase_reuses_remaining_allowance() {
    let chain = MockChain::new(user());
    let id = chain.add_market(open_market("Q"));
    let session = Session::connected(user());
    let market = chain.market_info(id).await.unwrap();

    chain.set_allowance(user(), chain.market_address(), to_base_units(10, 18));

    let mut workflow = PurchaseWorkflow::new(id, &market, session, chain.market_address());
    for amount in ["4", "6"] {
        workflow.select_option(MarketOption::B);
        workflow.enter_amount(amount).unwrap();
        assert_eq!(
            workflow.check_allowance(&chain).await.unwrap(),
            PurchaseStep::AwaitingConfirmation
        );
        workflow.confirm(&chain).await.unwrap();
    }

    // Allowance is now exhausted.
    workflow.select_option(MarketOption::B);
    workflow.enter_amount("1").unwrap();
    assert_eq!(
        workflow.check_allowance(&chain).await.unwrap(),
        PurchaseStep::AwaitingAllowance
    );
}

#[tokio::test]
async fn faucet_rejection_reaches_client() {
    let chain = MockChain::with_config(
        user(),
        MockConfig {
            fail_mint: true,
            ..Default::default()
        },
    );
    let faucet = FaucetClient::new(spawn_faucet(&chain).await).unwrap();

    let err = faucet
        .claim(&Session::connected(user()))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Mock mint failure");
}

#[tokio::test]
async fn resolved_market_offers_claim() {
    let chain = MockChain::new(user());
    let mut market = open_market("Resolved one");
    market.end_time = 10;
    market.resolved = true;
    market.outcome = Outcome::B;
    let id = chain.add_market(market);

    let dashboard = Dashboard::load(&chain, &Session::connected(user()))
        .await
        .unwrap();
    let resolved = dashboard.tab(MarketCategory::Resolved, 1_000);
    assert_eq!(resolved.len(), 1);
    assert!(resolved[0].render(1_000).contains(&"Resolved: No".to_string()));

    claim_winnings(&chain, id).await.unwrap();
    assert_eq!(chain.calls(), vec![ChainCall::ClaimWinnings { market_id: id }]);
}

/// Get a live config from environment.
fn live_config() -> Option<Config> {
    Config::load_checked(Config::validate_server).ok()
}

/// Read the live dashboard without a wallet.
#[tokio::test]
#[ignore = "requires RPC_URL, PRIVATE_KEY and TOKEN_ADDRESS"]
async fn live_dashboard_loads() {
    let Some(config) = live_config() else {
        println!("Skipping: configuration not set");
        return;
    };

    let chain = RpcChain::from_config(&config).unwrap();
    let count = chain.market_count().await.unwrap();
    let dashboard = Dashboard::load(&chain, &Session::disconnected())
        .await
        .unwrap();

    assert_eq!(dashboard.cards.len() as u64, count);
    println!("Loaded {} markets", count);
}
