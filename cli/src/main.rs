//! Trestle CLI — entry point for driving the bridge engine from a terminal.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use trestle_chain::{
    AppchainRpcClient, AssetCatalog, HomeRpcClient, HttpAssetCatalog, HttpSigner,
};
use trestle_engine::{
    AssetRef, BridgeConfig, BridgeEngine, BridgeSession, ReconciliationPoller, TransferSpec,
};
use trestle_store_lmdb::{LmdbEnvironment, LmdbTransferStore};
use trestle_types::{
    AccountId, AppchainId, BridgeError, Collectible, Direction, Timestamp, TransferStatus,
};

#[derive(Parser)]
#[command(name = "trestle", about = "Cross-chain bridge transfer engine CLI")]
struct Cli {
    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long, env = "TRESTLE_CONFIG")]
    config: Option<PathBuf>,

    /// Home-ledger JSON-RPC endpoint.
    #[arg(long, env = "TRESTLE_HOME_RPC_URL")]
    home_rpc_url: Option<String>,

    /// Wallet daemon endpoint supplying the signing capability.
    #[arg(long, env = "TRESTLE_SIGNER_URL")]
    signer_url: Option<String>,

    /// Asset-metadata feed base URL.
    #[arg(long, env = "TRESTLE_CATALOG_URL")]
    catalog_url: Option<String>,

    /// Data directory for the transfer ledger.
    #[arg(long, env = "TRESTLE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Signing account on the home ledger.
    #[arg(long, env = "TRESTLE_ACCOUNT")]
    account: Option<String>,

    /// Active appchain identifier.
    #[arg(long, env = "TRESTLE_APPCHAIN")]
    appchain: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Submit a transfer.
    Transfer {
        #[command(subcommand)]
        action: TransferAction,
    },
    /// Inspect or clear the recorded transfers of the active appchain.
    Transfers {
        #[command(subcommand)]
        action: TransfersAction,
    },
    /// Validate a transfer target account.
    Validate {
        /// Transfer direction: "out" (home→appchain) or "in" (appchain→home).
        #[arg(value_parser = parse_direction)]
        direction: Direction,
        /// Target account in the destination chain's input format.
        account: String,
        /// Token symbol, for the storage-registration check.
        #[arg(long)]
        token: Option<String>,
    },
    /// Run the reconciliation loop.
    Poll {
        /// Run a single reconciliation pass and exit.
        #[arg(long)]
        once: bool,
    },
}

#[derive(clap::Subcommand)]
enum TransferAction {
    /// Send a fungible token.
    Send {
        /// Transfer direction: "out" (home→appchain) or "in" (appchain→home).
        #[arg(value_parser = parse_direction)]
        direction: Direction,
        /// Token symbol as listed by the asset catalog.
        #[arg(long)]
        token: String,
        /// Decimal amount to send.
        #[arg(long)]
        amount: String,
        /// Receiver account in the destination chain's input format.
        #[arg(long)]
        to: String,
    },
    /// Send one collectible instance.
    SendCollectible {
        /// Transfer direction: "out" (home→appchain) or "in" (appchain→home).
        #[arg(value_parser = parse_direction)]
        direction: Direction,
        /// Asset-class id of the collectible.
        #[arg(long)]
        class: u64,
        /// Instance id within the class.
        #[arg(long)]
        instance: String,
        /// Home-ledger collectible contract.
        #[arg(long)]
        contract: String,
        /// Receiver account in the destination chain's input format.
        #[arg(long)]
        to: String,
    },
}

#[derive(clap::Subcommand)]
enum TransfersAction {
    /// List recorded transfers, newest first.
    List,
    /// Delete all records for the active appchain.
    Clear,
}

fn parse_direction(s: &str) -> Result<Direction, String> {
    match s.to_lowercase().as_str() {
        "out" | "home-to-appchain" => Ok(Direction::HomeToAppchain),
        "in" | "appchain-to-home" => Ok(Direction::AppchainToHome),
        other => Err(format!(
            "unknown direction {other:?}, expected \"out\" or \"in\""
        )),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<BridgeConfig> {
    let mut config = match &cli.config {
        Some(path) => BridgeConfig::from_toml_file(&path.display().to_string())?,
        None => BridgeConfig::default(),
    };
    if let Some(url) = &cli.home_rpc_url {
        config.home_rpc_url = url.clone();
    }
    if let Some(url) = &cli.signer_url {
        config.signer_url = url.clone();
    }
    if let Some(url) = &cli.catalog_url {
        config.catalog_url = url.clone();
    }
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(account) = &cli.account {
        config.account = account.clone();
    }
    if let Some(appchain) = &cli.appchain {
        config.appchain = appchain.clone();
    }
    if config.appchain.is_empty() {
        anyhow::bail!("no appchain selected (use --appchain or the config file)");
    }
    if config.account.is_empty() {
        anyhow::bail!("no signing account configured (use --account or the config file)");
    }
    Ok(config)
}

struct Connected {
    engine: BridgeEngine,
    catalog: HttpAssetCatalog,
    appchain_id: AppchainId,
    account: String,
}

async fn connect(config: &BridgeConfig) -> anyhow::Result<Connected> {
    let timeout = Duration::from_secs(config.params.rpc_timeout_secs);
    let ttl = Duration::from_secs(config.params.catalog_ttl_secs);
    let appchain_id = AppchainId::new(config.appchain.clone());

    let catalog = HttpAssetCatalog::new(&config.catalog_url, ttl, timeout)?;
    let descriptor = catalog.descriptor(&appchain_id).await?;
    tracing::info!(
        appchain = %descriptor.id,
        anchor = %descriptor.anchor_contract,
        rpc = %descriptor.rpc_endpoint,
        "resolved appchain descriptor"
    );

    let home = HomeRpcClient::new(&config.home_rpc_url, timeout)?;
    let appchain = AppchainRpcClient::new(&descriptor.rpc_endpoint, timeout)?;
    let signer = HttpSigner::new(&config.signer_url, &config.account, timeout)
        .map_err(|e| anyhow::anyhow!("signer setup failed: {e}"))?;

    let environment = LmdbEnvironment::open(&config.data_dir.join("ledger"))?;
    let store = LmdbTransferStore::new(&environment);

    let session = BridgeSession {
        descriptor,
        params: config.params.clone(),
        home: Arc::new(home),
        appchain: Arc::new(appchain),
        signer: Arc::new(signer),
        store: Arc::new(store),
    };
    Ok(Connected {
        engine: BridgeEngine::new(session),
        catalog,
        appchain_id,
        account: config.account.clone(),
    })
}

async fn resolve_token(
    connected: &Connected,
    symbol: &str,
) -> anyhow::Result<trestle_types::TokenAsset> {
    let tokens = connected.catalog.list_tokens(&connected.appchain_id).await?;
    tokens
        .into_iter()
        .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
        .ok_or_else(|| anyhow::anyhow!("token {symbol} is not bridgeable on this appchain"))
}

fn print_record(record: &trestle_types::BridgeTransferRecord, now: Timestamp) {
    let age = trestle_utils::format_duration(record.timestamp.elapsed_since(now));
    let status = match record.status {
        TransferStatus::Failed => format!(
            "failed ({})",
            record.message.as_deref().unwrap_or("no message")
        ),
        ref other => other.to_string(),
    };
    println!(
        "{:<22} seq {:<8} {:<9} {} -> {}  amount {}  {} ago  tx {}",
        record.direction,
        record.sequence_id,
        status,
        record.from_account,
        record.to_account,
        if record.amount.is_empty() {
            "-"
        } else {
            record.amount.as_str()
        },
        age,
        record.hash,
    );
}

async fn submit(connected: &Connected, spec: TransferSpec) -> anyhow::Result<()> {
    match connected.engine.submit_transfer(&spec).await {
        Ok(record) => {
            println!("submitted:");
            print_record(&record, Timestamp::now());
            Ok(())
        }
        // An abort in the wallet is a decision, not an error.
        Err(BridgeError::UserCancelled) => {
            tracing::debug!("signing cancelled by user");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    trestle_utils::init_tracing();

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let connected = connect(&config).await?;

    match cli.command {
        Command::Transfer { action } => match action {
            TransferAction::Send {
                direction,
                token,
                amount,
                to,
            } => {
                let token = resolve_token(&connected, &token).await?;
                submit(
                    &connected,
                    TransferSpec {
                        direction,
                        asset: AssetRef::Fungible(token),
                        amount: Some(amount),
                        target_account: to,
                    },
                )
                .await?;
            }
            TransferAction::SendCollectible {
                direction,
                class,
                instance,
                contract,
                to,
            } => {
                let collectible = Collectible {
                    instance,
                    class,
                    owner: connected.account.clone(),
                    contract_id: AccountId::parse(contract)?,
                    name: None,
                };
                submit(
                    &connected,
                    TransferSpec {
                        direction,
                        asset: AssetRef::Collectible(collectible),
                        amount: None,
                        target_account: to,
                    },
                )
                .await?;
            }
        },
        Command::Transfers { action } => match action {
            TransfersAction::List => {
                let mut records = connected.engine.transfers(&connected.appchain_id)?;
                records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
                if records.is_empty() {
                    println!("no recorded transfers for {}", connected.appchain_id);
                }
                let now = Timestamp::now();
                for record in &records {
                    print_record(record, now);
                }
            }
            TransfersAction::Clear => {
                connected.engine.clear_transfers(&connected.appchain_id)?;
                println!("cleared transfers for {}", connected.appchain_id);
            }
        },
        Command::Validate {
            direction,
            account,
            token,
        } => {
            // Default to the appchain's native wrapped token from the
            // catalog when no symbol is given.
            let asset = match token {
                Some(symbol) => AssetRef::Fungible(resolve_token(&connected, &symbol).await?),
                None => {
                    let tokens = connected.catalog.list_tokens(&connected.appchain_id).await?;
                    let native = tokens
                        .into_iter()
                        .find(|t| t.is_native())
                        .ok_or_else(|| anyhow::anyhow!("catalog lists no native wrapped token"))?;
                    AssetRef::Fungible(native)
                }
            };
            let status = connected
                .engine
                .validate_target(direction, &account, &asset)
                .await?;
            println!(
                "exists: {}  needs storage deposit: {}",
                status.exists, status.needs_storage_deposit
            );
        }
        Command::Poll { once } => {
            if once {
                let poller =
                    ReconciliationPoller::new(Arc::clone(connected.engine.session()));
                let summary = poller.reconcile_once().await?;
                println!(
                    "examined {} pending, {} succeeded, {} failed, {} query failures",
                    summary.examined, summary.succeeded, summary.failed, summary.query_failures
                );
            } else {
                let mut engine = connected.engine;
                engine.start_poller();
                tracing::info!("reconciliation loop running, press ctrl-c to stop");
                tokio::signal::ctrl_c().await?;
                engine.stop_poller().await;
                tracing::info!("trestle exited cleanly");
            }
        }
    }

    Ok(())
}
