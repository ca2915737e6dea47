//! Wallet session: the connected account passed explicitly into every gated action

use crate::error::{HubError, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalletSession {
    account: Option<String>,
}

impl WalletSession {
    pub fn disconnected() -> Self {
        Self { account: None }
    }

    /// Connect with a Sui address, normalised to the full 32-byte form
    pub fn connect(address: &str) -> Result<Self> {
        Ok(Self {
            account: Some(normalize_address(address)?),
        })
    }

    pub fn account(&self) -> Option<&str> {
        self.account.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    pub fn require_account(&self) -> Result<&str> {
        self.account.as_deref().ok_or(HubError::WalletNotConnected)
    }
}

/// Normalise a hex address (`0x` optional, 1..=64 digits) to `0x` + 64 lowercase digits
pub fn normalize_address(input: &str) -> Result<String> {
    let trimmed = input.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.is_empty() || digits.len() > 64 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(HubError::InvalidAddress(input.to_string()));
    }

    Ok(format!("0x{:0>64}", digits.to_ascii_lowercase()))
}

/// Shorten an address for display: 0x1234…abcd
pub fn short_address(address: &str) -> String {
    if address.len() <= 12 {
        return address.to_string();
    }
    format!("{}…{}", &address[..6], &address[address.len() - 4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_pads_short_address() {
        assert_eq!(
            normalize_address("0x6").unwrap(),
            "0x0000000000000000000000000000000000000000000000000000000000000006"
        );
    }

    #[test]
    fn test_normalize_accepts_missing_prefix_and_uppercase() {
        let full = "FAC88744D3C6B359D21FAD3AA20F0AA81CCA9FDAEE25B10D2FFAC62A989F8785";
        assert_eq!(
            normalize_address(full).unwrap(),
            "0xfac88744d3c6b359d21fad3aa20f0aa81cca9fdaee25b10d2ffac62a989f8785"
        );
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        assert!(normalize_address("").is_err());
        assert!(normalize_address("0x").is_err());
        assert!(normalize_address("0xzz").is_err());
        assert!(normalize_address(&format!("0x{}", "1".repeat(65))).is_err());
    }

    #[test]
    fn test_disconnected_session_requires_account() {
        let session = WalletSession::disconnected();
        assert!(!session.is_connected());
        assert!(matches!(session.require_account(), Err(HubError::WalletNotConnected)));
    }

    #[test]
    fn test_connected_session_exposes_account() {
        let session = WalletSession::connect("0xabc").unwrap();
        assert!(session.is_connected());
        assert!(session.require_account().unwrap().ends_with("abc"));
    }

    #[test]
    fn test_short_address() {
        let addr = normalize_address("0xabcdef").unwrap();
        assert_eq!(short_address(&addr), "0x0000…cdef");
        assert_eq!(short_address("0x12"), "0x12");
    }
}
