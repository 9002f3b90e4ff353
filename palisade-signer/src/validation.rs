//! Pre-signing transaction validation
//!
//! Every transaction passes through these checks before any key material
//! is touched. Rejections here are cheap and carry no security context.

use crate::error::{Error, Result};
use crate::transaction::TransactionData;

/// Upper bound on gas price: 1000 gwei expressed in wei
pub const MAX_GAS_PRICE_WEI: u64 = 1_000_000_000_000;

/// Recipient address length including the `0x` prefix
pub const ADDRESS_LEN: usize = 42;

/// Validate all transaction fields, failing on the first violation
pub fn validate_transaction(tx: &TransactionData) -> Result<()> {
    validate_address(&tx.to)?;

    if tx.value < 0 {
        return Err(Error::Validation(format!(
            "Transaction value must be non-negative, got {}",
            tx.value
        )));
    }

    if tx.gas_limit == 0 {
        return Err(Error::Validation(
            "Gas limit must be greater than zero".to_string(),
        ));
    }

    if tx.gas_price > MAX_GAS_PRICE_WEI {
        return Err(Error::Validation(format!(
            "Gas price {} wei exceeds the {} wei ceiling",
            tx.gas_price, MAX_GAS_PRICE_WEI
        )));
    }

    if tx.chain_id == 0 {
        return Err(Error::Validation("Chain id must be nonzero".to_string()));
    }

    Ok(())
}

/// Validate a recipient address: `0x` followed by exactly 40 hex digits
pub fn validate_address(address: &str) -> Result<()> {
    if address.len() != ADDRESS_LEN || !address.starts_with("0x") {
        return Err(Error::Validation(format!(
            "Invalid recipient address {address:?}: expected 0x followed by 40 hex digits"
        )));
    }

    if !address[2..].bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::Validation(format!(
            "Invalid recipient address {address:?}: contains non-hex characters"
        )));
    }

    Ok(())
}
