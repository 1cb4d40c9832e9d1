use alloy::primitives::utils::format_units;
use alloy::primitives::{Address, U256};
use alloy::providers::DynProvider;
use alloy::sol;
use once_cell::sync::Lazy;

use consts::{AIRDROP_CONTRACT_ADDRESS, TPF_TOKEN_ADDRESS, TPF_TOKEN_DECIMALS};

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    interface IAirdrop {
        function canClaim(address user) external view returns (bool);
        function claimAirdrop() external;
        function lastClaimTime(address user) external view returns (uint256);
        function CLAIM_INTERVAL() external view returns (uint256);
        function DAILY_AIRDROP() external view returns (uint256);
        function contractBalance() external view returns (uint256);
        function tpfToken() external view returns (address);
        function owner() external view returns (address);

        event AirdropClaimed(address indexed user, uint256 amount, uint256 timestamp);
    }

    #[allow(missing_docs)]
    #[sol(rpc)]
    interface ITpfToken {
        function balanceOf(address account) external view returns (uint256);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
    }
}

pub type AirdropContract = IAirdrop::IAirdropInstance<DynProvider>;
pub type TokenContract = ITpfToken::ITpfTokenInstance<DynProvider>;

pub static AIRDROP_CONTRACT: Lazy<Address> =
    Lazy::new(|| AIRDROP_CONTRACT_ADDRESS.parse().unwrap());

pub static TPF_TOKEN: Lazy<Address> = Lazy::new(|| TPF_TOKEN_ADDRESS.parse().unwrap());

/// Convert a base-unit amount to the display string shown next to the
/// claim button. Trailing zeros are trimmed so 50e18 renders as "50".
pub fn format_token_amount(amount: U256) -> String {
    let formatted = match format_units(amount, TPF_TOKEN_DECIMALS) {
        Ok(s) => s,
        Err(_) => amount.to_string(),
    };
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(n: u64) -> U256 {
        U256::from(n) * U256::from(10u64).pow(U256::from(18))
    }

    #[test]
    fn whole_amounts_drop_the_fraction() {
        assert_eq!(format_token_amount(tokens(50)), "50");
        assert_eq!(format_token_amount(U256::ZERO), "0");
    }

    #[test]
    fn fractional_amounts_keep_significant_digits() {
        let half = U256::from(5u64) * U256::from(10u64).pow(U256::from(17));
        assert_eq!(format_token_amount(half), "0.5");
    }

    #[test]
    fn contract_addresses_parse() {
        assert_eq!(
            *AIRDROP_CONTRACT,
            AIRDROP_CONTRACT_ADDRESS.parse::<Address>().unwrap()
        );
        assert_ne!(*AIRDROP_CONTRACT, *TPF_TOKEN);
    }
}
