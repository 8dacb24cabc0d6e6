use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::str::FromStr;

use crate::core::chain::ChainId;

/// Multi-chain wallet CLI (library-facing definitions)
#[derive(Debug, Parser)]
#[command(name = "wallet-cli", about = "Multi-chain wallet CLI", disable_help_subcommand = true)]
pub struct Cli {
    /// TOML config file; defaults plus WALLET_<CHAIN>_RPC_URL overrides when absent
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding wallet records, overrides `storage.wallet_dir`
    #[arg(long, global = true)]
    pub wallet_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print a new mnemonic
    GenerateMnemonic {
        #[arg(long, default_value_t = 12)]
        words: usize,
    },
    /// Create a wallet from a mnemonic (or WALLET_MNEMONIC)
    Create {
        #[arg(long)]
        mnemonic: Option<String>,
        #[arg(long)]
        passphrase: Option<String>,
        /// Vault password (or WALLET_PASSWORD)
        #[arg(long)]
        password: Option<String>,
    },
    List,
    Addresses {
        #[arg(long)]
        wallet: String,
    },
    Balances {
        #[arg(long)]
        wallet: String,
    },
    Send {
        #[arg(long)]
        wallet: String,
        #[arg(long)]
        password: Option<String>,
        #[arg(long, value_parser = parse_chain)]
        chain: ChainId,
        #[arg(long)]
        to: String,
        #[arg(long, value_parser = parse_amount)]
        amount: Decimal,
    },
    SignMessage {
        #[arg(long)]
        wallet: String,
        #[arg(long)]
        password: Option<String>,
        #[arg(long, value_parser = parse_chain)]
        chain: ChainId,
        #[arg(long)]
        message: String,
    },
    Connect {
        #[arg(long)]
        wallet: String,
        #[arg(long)]
        origin: String,
        #[arg(long)]
        name: Option<String>,
        /// Comma-separated chains; all of the wallet's chains when omitted
        #[arg(long, value_parser = parse_chain, value_delimiter = ',')]
        chains: Vec<ChainId>,
    },
    Delete {
        #[arg(long)]
        wallet: String,
    },
    /// Write the sealed record as JSON
    Export {
        #[arg(long)]
        wallet: String,
        #[arg(long)]
        output: PathBuf,
    },
    Import {
        #[arg(long)]
        input: PathBuf,
    },
}

pub fn parse_chain(s: &str) -> Result<ChainId, String> {
    ChainId::from_str(s).map_err(|e| e.to_string())
}

pub fn parse_amount(s: &str) -> Result<Decimal, String> {
    Decimal::from_str(s.trim()).map_err(|e| format!("invalid amount '{}': {}", s, e))
}
