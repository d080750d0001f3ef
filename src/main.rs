//! Prediction market dashboard and faucet entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use strum::IntoEnumIterator;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use predict_market::api::{create_router, AppState};
use predict_market::chain::{MarketReader, RpcChain};
use predict_market::config::Config;
use predict_market::market::units::to_base_units;
use predict_market::market::{
    load_card, BalanceDisplay, Dashboard, MarketCategory, MarketOption, Session,
};
use predict_market::metrics;
use predict_market::signing::{address_from_private_key, parse_address};
use predict_market::trading::{
    claim_winnings, failure_notification, faucet_notification, winnings_notification,
    FaucetClient, PurchaseStep, PurchaseWorkflow,
};
use predict_market::utils::{shutdown_signal, unix_now};

/// Binary prediction market dashboard and test-token faucet.
#[derive(Parser, Debug)]
#[command(name = "predict-market")]
#[command(about = "Dashboard, purchase flow and token faucet for an on-chain prediction market")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the token faucet, health and metrics endpoints (default).
    Serve {
        /// HTTP port; overrides PORT.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show every market grouped by tab, with the wallet balance.
    Markets {
        /// Only show one tab (active, pending, resolved).
        #[arg(long)]
        tab: Option<MarketCategory>,
    },

    /// Buy shares: check allowance, approve if needed, then purchase.
    Buy {
        /// Market id.
        #[arg(long)]
        market: u64,

        /// Option to buy (a or b).
        #[arg(long)]
        option: MarketOption,

        /// Whole tokens to spend.
        #[arg(long)]
        amount: String,
    },

    /// Claim winnings from a resolved market.
    ClaimWinnings {
        /// Market id.
        #[arg(long)]
        market: u64,
    },

    /// Request test tokens from a running faucet.
    ClaimTokens {
        /// Faucet base URL; overrides FAUCET_URL.
        #[arg(long)]
        faucet_url: Option<String>,
    },

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize logging
    let filter = if args.verbose {
        EnvFilter::new("predict_market=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config().await,
        Some(Command::Markets { tab }) => cmd_markets(tab).await,
        Some(Command::Buy {
            market,
            option,
            amount,
        }) => cmd_buy(market, option, &amount).await,
        Some(Command::ClaimWinnings { market }) => cmd_claim_winnings(market).await,
        Some(Command::ClaimTokens { faucet_url }) => cmd_claim_tokens(faucet_url).await,
        Some(Command::Serve { port }) => cmd_serve(port).await,
        None => cmd_serve(None).await,
    }
}

/// Load configuration and run `check` on it; failures are fatal.
fn load_config(check: fn(&Config) -> Result<(), String>) -> predict_market::Result<Config> {
    Config::load_checked(check).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })
}

/// Chain client signing with the wallet key, and the session it implies.
fn wallet_chain(config: &Config) -> predict_market::Result<(RpcChain, Session)> {
    let market = parse_address(&config.market_address)?;
    let token = parse_address(&config.token_address)?;

    let chain = RpcChain::connect(
        &config.rpc_url,
        market,
        token,
        config.wallet_private_key.as_deref(),
    )?;

    let session = match chain.signer_address() {
        Some(account) => Session::connected(account),
        None => {
            warn!("WALLET_PRIVATE_KEY not set; running without a connected wallet");
            Session::disconnected()
        }
    };

    Ok((chain, session))
}

/// Check configuration validity.
async fn cmd_check_config() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("PREDICTION MARKET - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match Config::load() {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    match &config.private_key {
        Some(key) => {
            print!("Checking faucet key... ");
            match address_from_private_key(key) {
                Ok(addr) => {
                    println!("OK");
                    println!("  Faucet address: {}", addr);
                }
                Err(e) => {
                    println!("FAILED");
                    println!("  Error: {}", e);
                    return Err(anyhow::anyhow!("Private key invalid"));
                }
            }
        }
        None => println!("Faucet key: not set (serve disabled)"),
    }

    if let Some(key) = &config.wallet_private_key {
        print!("Checking wallet key... ");
        match address_from_private_key(key) {
            Ok(addr) => {
                println!("OK");
                println!("  Wallet address: {}", addr);
            }
            Err(e) => {
                println!("FAILED");
                println!("  Error: {}", e);
                return Err(anyhow::anyhow!("Wallet key invalid"));
            }
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  RPC URL: {}", config.rpc_url);
    println!("  Market: {}", config.market_address);
    println!("  Token: {}", config.token_address);
    println!("  Faucet Amount: {} tokens", config.faucet_amount);
    println!("  Token Decimals: {}", config.token_decimals);
    println!("  Port: {}", config.port);
    println!(
        "  Wallet: {}",
        if config.wallet_private_key.is_some() { "Configured" } else { "Read-only" }
    );
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// Show the dashboard.
async fn cmd_markets(only: Option<MarketCategory>) -> anyhow::Result<()> {
    let config = load_config(Config::validate)?;
    let (chain, session) = wallet_chain(&config)?;

    let (dashboard, balance) = tokio::join!(
        Dashboard::load(&chain, &session),
        BalanceDisplay::load(&chain, &session)
    );
    let dashboard = dashboard?;
    let now = unix_now();

    println!("======================================================================");
    println!("PREDICTION MARKET");
    if let Some(text) = balance.text() {
        println!("{}", text);
    }
    println!("======================================================================");

    for category in MarketCategory::iter().filter(|c| only.map_or(true, |o| o == *c)) {
        let cards = dashboard.tab(category, now);
        println!("\n[{}] {} market(s)", category, cards.len());
        println!("----------------------------------------------------------------------");

        for card in cards {
            for line in card.render(now) {
                println!("  {}", line);
            }
            println!();
        }
    }

    Ok(())
}

/// Run the staged purchase for one market.
async fn cmd_buy(market_id: u64, option: MarketOption, amount: &str) -> anyhow::Result<()> {
    let config = load_config(Config::validate)?;
    let (chain, session) = wallet_chain(&config)?;

    let card = load_card(&chain, &session, market_id).await?;
    if card.category(unix_now()) != MarketCategory::Active {
        return Err(anyhow::anyhow!("Market {} is no longer active", market_id));
    }

    let mut workflow =
        PurchaseWorkflow::new(market_id, &card.market, session, chain.market_address());
    if !workflow.select_option(option) {
        return Err(anyhow::anyhow!("Connect a wallet (WALLET_PRIVATE_KEY) to buy shares"));
    }
    if let Err(e) = workflow.enter_amount(amount) {
        println!("{}", failure_notification(PurchaseStep::Initial, &e));
        return Err(e.into());
    }

    println!(
        "Buying {} {} shares in market #{}",
        amount.trim(),
        workflow.option_name(option),
        market_id
    );

    if workflow.check_allowance(&chain).await? == PurchaseStep::AwaitingAllowance {
        println!("Approving token spend...");
        if let Err(e) = workflow.approve(&chain).await {
            println!("{}", failure_notification(PurchaseStep::AwaitingAllowance, &e));
            return Err(e.into());
        }
    }

    match workflow.confirm(&chain).await {
        Ok(receipt) => {
            println!("{}", receipt.notification);
            println!("  Transaction: {}", receipt.tx_hash);
            Ok(())
        }
        Err(e) => {
            println!("{}", failure_notification(PurchaseStep::AwaitingConfirmation, &e));
            Err(e.into())
        }
    }
}

/// Claim winnings from a resolved market.
async fn cmd_claim_winnings(market_id: u64) -> anyhow::Result<()> {
    let config = load_config(Config::validate)?;
    let (chain, session) = wallet_chain(&config)?;

    if !session.is_connected() {
        return Err(anyhow::anyhow!("Connect a wallet (WALLET_PRIVATE_KEY) to claim winnings"));
    }

    let result = claim_winnings(&chain, market_id).await;
    println!("{}", winnings_notification(&result));
    let tx_hash = result?;
    println!("  Transaction: {}", tx_hash);

    Ok(())
}

/// Request faucet tokens for the wallet.
async fn cmd_claim_tokens(faucet_url: Option<String>) -> anyhow::Result<()> {
    let config = load_config(Config::validate_faucet_client)?;

    let session = match &config.wallet_private_key {
        Some(key) => Session::connected(address_from_private_key(key)?),
        None => Session::disconnected(),
    };

    let client = FaucetClient::new(faucet_url.unwrap_or(config.faucet_url))?;
    let result = client.claim(&session).await;
    println!("{}", faucet_notification(&result));
    let tx_hash = result?;
    println!("  Transaction: {}", tx_hash);

    Ok(())
}

/// Serve the faucet until a shutdown signal arrives.
async fn cmd_serve(port_override: Option<u16>) -> anyhow::Result<()> {
    info!("Loading configuration...");
    let config = load_config(Config::validate_server)?;
    let port = port_override.unwrap_or(config.port);

    let chain = RpcChain::from_config(&config)?;
    let mint_amount = to_base_units(config.faucet_amount, config.token_decimals);

    info!("Configuration loaded successfully");
    info!("Faucet signer: {:?}", chain.signer_address());
    info!("Mint amount: {} tokens", config.faucet_amount);

    let handle = metrics::install_recorder()?;
    let state = AppState::new(Arc::new(chain), mint_amount).with_metrics(handle);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
