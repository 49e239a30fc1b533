use anyhow::Result;
use ethers::{
    types::U256,
    utils::{format_ether, hex},
};

/// Decodes a hex string, with or without the `0x` prefix.
pub fn decode_hex(value: &str) -> Result<Vec<u8>> {
    let value = value.trim();
    Ok(hex::decode(value.strip_prefix("0x").unwrap_or(value))?)
}

pub fn display_balance(wei: U256) -> String {
    format!("{} wei ({} ETH)", wei, format_ether(wei))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_with_and_without_prefix() {
        assert_eq!(decode_hex("0x6080").unwrap(), vec![0x60, 0x80]);
        assert_eq!(decode_hex("6080").unwrap(), vec![0x60, 0x80]);
        assert_eq!(decode_hex(" 0xff\n").unwrap(), vec![0xff]);
        assert!(decode_hex("0x").unwrap().is_empty());
    }

    #[test]
    fn rejects_invalid_hex() {
        assert!(decode_hex("0xzz").is_err());
        assert!(decode_hex("0x__$abc$__").is_err());
    }

    #[test]
    fn balance_shows_wei_and_ether() {
        let balance = display_balance(U256::exp10(18));
        assert!(balance.starts_with("1000000000000000000 wei ("));
        assert!(balance.ends_with(" ETH)"));
    }
}
