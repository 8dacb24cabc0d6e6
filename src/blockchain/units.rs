//! Conversion between decimal coin amounts and integer smallest units
//! (wei, lamports).

use rust_decimal::Decimal;

use crate::core::chain::{ChainFamily, ChainId};
use crate::core::errors::{RpcError, WalletError};

/// Largest smallest-unit value a chain's transfer can carry.
fn max_smallest_unit(chain: ChainId) -> u128 {
    match chain.family() {
        // U256 on the wire, but a Decimal never exceeds 96 bits of mantissa
        ChainFamily::Evm => u128::MAX,
        ChainFamily::Solana => u64::MAX as u128,
    }
}

/// Converts a transfer amount into the chain's smallest unit.
///
/// Rejects non-positive amounts, amounts finer than the chain's precision,
/// and values that do not fit the chain's integer width.
pub fn to_smallest_unit(chain: ChainId, amount: Decimal) -> Result<u128, WalletError> {
    if amount <= Decimal::ZERO {
        return Err(WalletError::InvalidAmount(format!("{} must be positive", amount)));
    }

    let normalized = amount.normalize();
    let decimals = chain.decimals();
    if normalized.scale() > decimals {
        return Err(WalletError::InvalidAmount(format!(
            "{} has more than {} fractional digits for {}",
            amount, decimals, chain
        )));
    }

    let overflow = || {
        WalletError::InvalidAmount(format!("{} overflows the {} smallest unit", amount, chain))
    };
    let factor = 10i128.checked_pow(decimals - normalized.scale()).ok_or_else(overflow)?;
    let units = normalized.mantissa().checked_mul(factor).ok_or_else(overflow)?;
    let units = u128::try_from(units).map_err(|_| overflow())?;
    if units > max_smallest_unit(chain) {
        return Err(overflow());
    }
    Ok(units)
}

/// Converts a node-reported smallest-unit balance into whole coins.
pub fn from_smallest_unit(chain: ChainId, units: u128) -> Result<Decimal, WalletError> {
    let invalid = || WalletError::Network {
        chain,
        cause: RpcError::InvalidResponse(format!("balance {} out of range", units)),
    };
    let value = i128::try_from(units).map_err(|_| invalid())?;
    Decimal::try_from_i128_with_scale(value, chain.decimals())
        .map(|d| d.normalize())
        .map_err(|_| invalid())
}
