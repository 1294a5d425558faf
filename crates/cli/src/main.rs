mod config;
mod error;

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand};
use ed25519_dalek::SigningKey;
use runtime::adapter::{
    ContractAdapter, HttpLedgerClient, MultisigAdapter, NativeAdapter, RpcClient,
    TransactionAdapter, TransactionOutcome, WalletKind,
};
use runtime::handlers::{command_bus, query_bus};
use runtime::reader::HttpCapabilityReader;
use runtime::requests::{
    BurnRequest, CashInRequest, DeleteRequest, FreezeRequest, GetCapabilitiesRequest,
    GrantRoleRequest, PauseRequest, RescueRequest, RevokeRoleRequest, UnfreezeRequest,
    UnpauseRequest, WipeRequest,
};
use runtime::session::NetworkSession;
use store::{PendingId, PendingStore};
use tracing_subscriber::EnvFilter;

use config::Config;
use error::{Error, Result};

const CONFIG_FILE: &str = "stablecore.toml";

#[derive(Parser)]
#[command(name = "stablecore")]
#[command(about = "Operate a stablecoin from the command line", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mint new supply to a target account
    CashIn {
        #[arg(short, long)]
        token: String,
        #[arg(long)]
        target: String,
        #[arg(short, long)]
        amount: String,
    },
    /// Destroy supply held by the treasury
    Burn {
        #[arg(short, long)]
        token: String,
        #[arg(short, long)]
        amount: String,
    },
    /// Remove supply from a target account
    Wipe {
        #[arg(short, long)]
        token: String,
        #[arg(long)]
        target: String,
        #[arg(short, long)]
        amount: String,
    },
    /// Block a target account from transacting
    Freeze {
        #[arg(short, long)]
        token: String,
        #[arg(long)]
        target: String,
    },
    /// Lift a previous freeze
    Unfreeze {
        #[arg(short, long)]
        token: String,
        #[arg(long)]
        target: String,
    },
    /// Suspend all transfers of the coin
    Pause {
        #[arg(short, long)]
        token: String,
    },
    /// Resume transfers after a pause
    Unpause {
        #[arg(short, long)]
        token: String,
    },
    /// Permanently delete the coin
    Delete {
        #[arg(short, long)]
        token: String,
    },
    /// Move treasury supply back to the rescue account
    Rescue {
        #[arg(short, long)]
        token: String,
        #[arg(short, long)]
        amount: String,
    },
    /// Grant a role to one or more accounts
    GrantRole {
        #[arg(short, long)]
        token: String,
        /// admin, cash_in, burn, wipe, freeze, pause, rescue, delete, kyc
        #[arg(short, long)]
        role: String,
        #[arg(long, required = true)]
        target: Vec<String>,
        /// Cash-in allowances, one per target (cash_in role only)
        #[arg(short, long)]
        amount: Vec<String>,
    },
    /// Revoke a role from one or more accounts
    RevokeRole {
        #[arg(short, long)]
        token: String,
        #[arg(short, long)]
        role: String,
        #[arg(long, required = true)]
        target: Vec<String>,
    },
    /// Show what the configured account may do with a coin
    Capabilities {
        #[arg(short, long)]
        token: String,
    },
    /// Inspect transactions parked for threshold signing
    #[command(subcommand)]
    Pending(PendingCommands),
}

#[derive(Subcommand)]
enum PendingCommands {
    /// List parked transactions
    List,
    /// Drop a parked transaction
    Delete {
        #[arg(short, long)]
        id: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    if let Commands::Pending(pending) = &cli.command {
        return cmd_pending(&config, pending);
    }

    let session = connect(&config).await?;
    let timeout = Duration::from_secs(config.timeout_secs);

    match cli.command {
        Commands::CashIn {
            token,
            target,
            amount,
        } => {
            let bus = command_bus(session)?;
            let outcome = execute(timeout, config.timeout_secs, bus.execute(CashInRequest {
                token,
                target,
                amount,
            }))
            .await?;
            print_outcome(&outcome);
        }
        Commands::Burn { token, amount } => {
            let bus = command_bus(session)?;
            let outcome = execute(
                timeout,
                config.timeout_secs,
                bus.execute(BurnRequest { token, amount }),
            )
            .await?;
            print_outcome(&outcome);
        }
        Commands::Wipe {
            token,
            target,
            amount,
        } => {
            let bus = command_bus(session)?;
            let outcome = execute(timeout, config.timeout_secs, bus.execute(WipeRequest {
                token,
                target,
                amount,
            }))
            .await?;
            print_outcome(&outcome);
        }
        Commands::Freeze { token, target } => {
            let bus = command_bus(session)?;
            let outcome = execute(
                timeout,
                config.timeout_secs,
                bus.execute(FreezeRequest { token, target }),
            )
            .await?;
            print_outcome(&outcome);
        }
        Commands::Unfreeze { token, target } => {
            let bus = command_bus(session)?;
            let outcome = execute(
                timeout,
                config.timeout_secs,
                bus.execute(UnfreezeRequest { token, target }),
            )
            .await?;
            print_outcome(&outcome);
        }
        Commands::Pause { token } => {
            let bus = command_bus(session)?;
            let outcome = execute(
                timeout,
                config.timeout_secs,
                bus.execute(PauseRequest { token }),
            )
            .await?;
            print_outcome(&outcome);
        }
        Commands::Unpause { token } => {
            let bus = command_bus(session)?;
            let outcome = execute(
                timeout,
                config.timeout_secs,
                bus.execute(UnpauseRequest { token }),
            )
            .await?;
            print_outcome(&outcome);
        }
        Commands::Delete { token } => {
            let bus = command_bus(session)?;
            let outcome = execute(
                timeout,
                config.timeout_secs,
                bus.execute(DeleteRequest { token }),
            )
            .await?;
            print_outcome(&outcome);
        }
        Commands::Rescue { token, amount } => {
            let bus = command_bus(session)?;
            let outcome = execute(
                timeout,
                config.timeout_secs,
                bus.execute(RescueRequest { token, amount }),
            )
            .await?;
            print_outcome(&outcome);
        }
        Commands::GrantRole {
            token,
            role,
            target,
            amount,
        } => {
            let bus = command_bus(session)?;
            let outcomes = execute(timeout, config.timeout_secs, bus.execute(GrantRoleRequest {
                token,
                role: parse_role(&role)?,
                targets: target,
                amounts: amount,
            }))
            .await?;
            for outcome in &outcomes {
                print_outcome(outcome);
            }
        }
        Commands::RevokeRole {
            token,
            role,
            target,
        } => {
            let bus = command_bus(session)?;
            let outcomes = execute(timeout, config.timeout_secs, bus.execute(RevokeRoleRequest {
                token,
                role: parse_role(&role)?,
                targets: target,
            }))
            .await?;
            for outcome in &outcomes {
                print_outcome(outcome);
            }
        }
        Commands::Capabilities { token } => {
            let bus = query_bus(session)?;
            let read = bus.execute(GetCapabilitiesRequest { token }).await?;
            println!("coin: {} (decimals {})", read.coin.token, read.coin.decimals);
            if let Some(contract) = read.coin.contract {
                println!("contract: {contract}");
            }
            if read.capabilities().is_empty() {
                println!("no operations granted");
            }
            for cap in read.capabilities() {
                println!("{:<12} via {:?}", cap.operation.to_string(), cap.access);
            }
        }
        Commands::Pending(_) => unreachable!("handled above"),
    }

    Ok(())
}

/// Build the configured backend and register it with a fresh session.
async fn connect(config: &Config) -> Result<Arc<NetworkSession>> {
    let account = config
        .wallet
        .account
        .parse()
        .map_err(|e: capability::Error| Error::Invalid {
            field: "wallet.account",
            detail: e.to_string(),
        })?;

    let adapter: Box<dyn TransactionAdapter> = match config.wallet.kind {
        WalletKind::Native => {
            let endpoint = config.wallet.endpoint.as_deref().unwrap_or_default();
            let key = parse_key(config.wallet.key.as_deref().unwrap_or_default())?;
            Box::new(NativeAdapter::new(
                Arc::new(HttpLedgerClient::new(endpoint)),
                account,
                config.network,
                key,
            ))
        }
        WalletKind::Contract => {
            let endpoint = config.wallet.endpoint.as_deref().unwrap_or_default();
            Box::new(ContractAdapter::new(
                RpcClient::new(endpoint),
                account,
                config.network,
            ))
        }
        WalletKind::Relay => {
            return Err(Error::Unsupported(
                "the relay wallet pairs inside a host application and cannot be driven from this binary",
            ));
        }
        WalletKind::Multisig => {
            let multisig = config
                .multisig
                .as_ref()
                .ok_or(Error::Unsupported("multisig section missing"))?;
            let key = match config.wallet.key.as_deref() {
                Some(key) => Some(parse_key(key)?),
                None => None,
            };
            Box::new(MultisigAdapter::new(
                PendingStore::open(&multisig.db)?,
                account,
                config.network,
                key,
                multisig.keys.clone(),
                multisig.threshold,
            )?)
        }
    };

    let session = Arc::new(NetworkSession::new(Arc::new(HttpCapabilityReader::new(
        config.mirror.clone(),
    ))));
    let init = session.connect(adapter).await?;
    tracing::info!(account = %init.account, network = %init.network, "connected");
    Ok(session)
}

async fn execute<T>(
    timeout: Duration,
    timeout_secs: u64,
    fut: impl Future<Output = bus::Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(Error::Timeout(timeout_secs)),
    }
}

fn cmd_pending(config: &Config, command: &PendingCommands) -> Result<()> {
    let db = config
        .multisig
        .as_ref()
        .map(|m| m.db.as_str())
        .unwrap_or("pending.db");
    let store = PendingStore::open(db)?;

    match command {
        PendingCommands::List => {
            let records = store.list()?;
            if records.is_empty() {
                println!("No pending transactions.");
                return Ok(());
            }
            println!(
                "{:<36}  {:<16}  {:<9}  DESCRIPTION",
                "ID", "CREATED", "SIGNED"
            );
            println!("{}", "-".repeat(80));
            for record in records {
                let created = Local
                    .from_utc_datetime(&record.created_at.naive_utc())
                    .format("%Y-%m-%d %H:%M");
                println!(
                    "{:<36}  {:<16}  {:<9}  {}",
                    record.id,
                    created,
                    format!("{}/{}", record.signed_keys.len(), record.threshold),
                    record.description
                );
            }
        }
        PendingCommands::Delete { id } => {
            let id: PendingId = id.parse().map_err(|e: uuid::Error| Error::Invalid {
                field: "id",
                detail: e.to_string(),
            })?;
            store.delete(id)?;
            println!("Deleted {id}.");
        }
    }

    Ok(())
}

fn parse_key(hex_key: &str) -> Result<SigningKey> {
    let bytes = hex::decode(hex_key).map_err(|e| Error::Invalid {
        field: "wallet.key",
        detail: e.to_string(),
    })?;
    let bytes: [u8; 32] = bytes.try_into().map_err(|_| Error::Invalid {
        field: "wallet.key",
        detail: "expected 32 bytes".to_string(),
    })?;
    Ok(SigningKey::from_bytes(&bytes))
}

fn parse_role(name: &str) -> Result<capability::Role> {
    use capability::Role;
    match name {
        "admin" => Ok(Role::Admin),
        "cash_in" => Ok(Role::CashIn),
        "burn" => Ok(Role::Burn),
        "wipe" => Ok(Role::Wipe),
        "freeze" => Ok(Role::Freeze),
        "pause" => Ok(Role::Pause),
        "rescue" => Ok(Role::Rescue),
        "delete" => Ok(Role::Delete),
        "kyc" => Ok(Role::Kyc),
        other => Err(Error::Invalid {
            field: "role",
            detail: format!("unknown role: {other}"),
        }),
    }
}

fn print_outcome(outcome: &TransactionOutcome) {
    match (&outcome.id, &outcome.error) {
        (Some(id), None) => println!("submitted: {id}"),
        (_, Some(error)) => println!("failed: {error}"),
        (None, None) => println!("submitted"),
    }
    if let Some(receipt) = &outcome.receipt {
        match serde_json::to_string_pretty(receipt) {
            Ok(pretty) => println!("{pretty}"),
            Err(_) => println!("{receipt}"),
        }
    }
}
