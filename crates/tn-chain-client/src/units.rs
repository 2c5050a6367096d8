use alloy_primitives::{Address, U256};

use tn_api_types::MAX_BALANCE_DECIMALS;

use crate::error::{ChainError, Result};

/// Parse a JSON-RPC quantity: `0x`-prefixed hex, or plain decimal.
pub fn parse_quantity(raw: &str) -> Result<U256> {
    let trimmed = raw.trim();
    let hex_digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"));

    match hex_digits {
        Some("") => Ok(U256::ZERO),
        Some(digits) => U256::from_str_radix(digits, 16),
        None => U256::from_str_radix(trimmed, 10),
    }
    .map_err(|err| ChainError::InvalidResponse(format!("invalid quantity '{raw}': {err}")))
}

/// Parse a `0x`-prefixed 20-byte address.
pub fn parse_address(raw: &str) -> Result<Address> {
    raw.trim()
        .parse::<Address>()
        .map_err(|err| ChainError::Abi(format!("invalid address '{raw}': {err}")))
}

/// Shift `amount` down by `decimals` and round half up to two places.
pub fn format_balance(amount: U256, decimals: u32) -> Result<String> {
    if decimals > MAX_BALANCE_DECIMALS {
        return Err(ChainError::InvalidConfig(format!(
            "balance decimals {decimals} exceed {MAX_BALANCE_DECIMALS}"
        )));
    }

    let ten = U256::from(10u64);
    let cents = if decimals >= 2 {
        // Divide first: the remainder is below the divisor, so doubling it cannot overflow.
        let divisor = ten.pow(U256::from(decimals - 2));
        let (quotient, remainder) = amount.div_rem(divisor);
        if remainder * U256::from(2u64) >= divisor {
            quotient + U256::from(1u64)
        } else {
            quotient
        }
    } else {
        amount
            .checked_mul(ten.pow(U256::from(2 - decimals)))
            .ok_or_else(|| ChainError::InvalidResponse(format!("balance {amount} is out of range")))?
    };

    let hundred = U256::from(100u64);
    let whole = cents / hundred;
    let fraction = (cents % hundred).as_limbs()[0];

    Ok(format!("{whole}.{fraction:02}"))
}
