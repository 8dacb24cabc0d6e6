use anyhow::Context;
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use web3_wallet_core::cli::{Cli, Commands};
use web3_wallet_core::core::config::WalletConfig;
use web3_wallet_core::core::derivation;
use web3_wallet_core::core::wallet_manager::parse_wallet_id;
use web3_wallet_core::security::redact_text;
use web3_wallet_core::{DAppSession, SendRequest, WalletManager, WalletRecord};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    if let Commands::GenerateMnemonic { words } = cli.command {
        let mnemonic = derivation::generate_mnemonic(words)?;
        tracing::warn!("Printing a new mnemonic to stdout; store it offline");
        println!("{}", mnemonic.as_str());
        return Ok(());
    }

    let mut config = match cli.config.as_deref() {
        Some(path) => WalletConfig::load(path)?,
        None => {
            let mut config = WalletConfig::default();
            config.apply_env_overrides();
            config
        }
    };
    if let Some(dir) = cli.wallet_dir {
        config.storage.wallet_dir = dir;
    }
    let manager = WalletManager::with_file_store(&config).await?;

    match cli.command {
        Commands::GenerateMnemonic { .. } => unreachable!("handled above"),
        Commands::Create { mnemonic, passphrase, password } => {
            let mnemonic = secret_arg(mnemonic, "WALLET_MNEMONIC", "--mnemonic")?;
            let password = secret_arg(password, "WALLET_PASSWORD", "--password")?;
            let created =
                manager.create_wallet(&mnemonic, passphrase.as_deref(), &password).await?;
            print_json(&created)?;
        }
        Commands::List => {
            print_json(&manager.list_wallets().await?)?;
        }
        Commands::Addresses { wallet } => {
            print_json(&manager.wallet_addresses(&parse_wallet_id(&wallet)?).await?)?;
        }
        Commands::Balances { wallet } => {
            print_json(&manager.get_balances(&parse_wallet_id(&wallet)?).await?)?;
        }
        Commands::Send { wallet, password, chain, to, amount } => {
            let password = secret_arg(password, "WALLET_PASSWORD", "--password")?;
            let request = SendRequest::new(parse_wallet_id(&wallet)?, &password, chain, to, amount);
            print_json(&manager.send_transaction(request).await?)?;
        }
        Commands::SignMessage { wallet, password, chain, message } => {
            let password = secret_arg(password, "WALLET_PASSWORD", "--password")?;
            let signed = manager
                .sign_message(&parse_wallet_id(&wallet)?, &password, message.as_bytes(), chain)
                .await?;
            print_json(&signed)?;
        }
        Commands::Connect { wallet, origin, name, chains } => {
            let session = DAppSession { origin, name, requested_chains: chains };
            print_json(&manager.connect_to_dapp(&parse_wallet_id(&wallet)?, &session).await?)?;
        }
        Commands::Delete { wallet } => {
            manager.delete_wallet(&parse_wallet_id(&wallet)?).await?;
            tracing::info!(wallet = %wallet, "Deleted");
        }
        Commands::Export { wallet, output } => {
            let record = manager.export_record(&parse_wallet_id(&wallet)?).await?;
            let json = serde_json::to_string_pretty(&record).context("serialize record")?;
            tokio::fs::write(&output, json)
                .await
                .with_context(|| format!("write {}", output.display()))?;
            tracing::info!(path = %output.display(), "Sealed record exported");
        }
        Commands::Import { input } => {
            let raw = tokio::fs::read(&input)
                .await
                .with_context(|| format!("read {}", input.display()))?;
            let record: WalletRecord =
                serde_json::from_slice(&raw).context("parse wallet record")?;
            let wallet_id = manager.import_record(record).await?;
            println!("{}", wallet_id);
        }
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries command output, logs go to stderr
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

/// Takes a secret from its flag or, failing that, from an environment variable.
fn secret_arg(flag: Option<String>, env: &str, flag_name: &str) -> anyhow::Result<String> {
    let value = match flag {
        Some(value) => value,
        None => {
            let value = std::env::var(env).unwrap_or_default();
            tracing::debug!(var = env, value = %redact_text(&value), "Secret read from environment");
            value
        }
    };
    if value.is_empty() {
        anyhow::bail!("{} or {} is required", flag_name, env);
    }
    Ok(value)
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("serialize output")?);
    Ok(())
}
