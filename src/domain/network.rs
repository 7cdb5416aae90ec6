//! Supported networks and their unit scales.
//!
//! `NetworkId` is the closed set of ledgers the gateway can target. Each
//! network carries the decimal scale between its human-facing unit (AVAX,
//! ADA, ...) and its base unit (nAVAX, Lovelace, ...). All conversions
//! happen here so adapters never multiply magic constants inline.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

/// Amounts are carried as exact decimals in the network's human unit.
pub type Amount = Decimal;

/// Identifier for a supported ledger. Fixed set, known at build time.
///
/// Serialized lowercase — the same spelling is used in config keys
/// (`[networks.avalanche]`) and in URL path segments (`/avalanche/send`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkId {
    Avalanche,
    Cardano,
    Cosmos,
    Litecoin,
    Polkadot,
    Ripple,
    Solana,
    Tezos,
    Tron,
}

impl NetworkId {
    /// All supported networks, in stable order.
    pub const ALL: [Self; 9] = [
        Self::Avalanche,
        Self::Cardano,
        Self::Cosmos,
        Self::Litecoin,
        Self::Polkadot,
        Self::Ripple,
        Self::Solana,
        Self::Tezos,
        Self::Tron,
    ];

    /// Number of base-unit decimals in one human unit.
    ///
    /// 1 AVAX = 1e9 nAVAX, 1 ADA = 1e6 Lovelace, 1 ATOM = 1e6 uatom,
    /// 1 LTC = 1e8 litoshi, 1 DOT = 1e10 Planck, 1 XRP = 1e6 drops,
    /// 1 SOL = 1e9 Lamports, 1 XTZ = 1e6 mutez, 1 TRX = 1e6 SUN.
    pub const fn decimals(self) -> u32 {
        match self {
            Self::Avalanche | Self::Solana => 9,
            Self::Cardano
            | Self::Cosmos
            | Self::Ripple
            | Self::Tezos
            | Self::Tron => 6,
            Self::Litecoin => 8,
            Self::Polkadot => 10,
        }
    }

    /// Name of the network's base unit, for logs and error context.
    pub const fn base_unit(self) -> &'static str {
        match self {
            Self::Avalanche => "nAVAX",
            Self::Cardano => "Lovelace",
            Self::Cosmos => "uatom",
            Self::Litecoin => "litoshi",
            Self::Polkadot => "Planck",
            Self::Ripple => "drops",
            Self::Solana => "Lamports",
            Self::Tezos => "mutez",
            Self::Tron => "SUN",
        }
    }

    /// Convert a human-unit amount into base units.
    ///
    /// The amount is truncated to the network's representable precision
    /// before scaling (never rounded up — an over-precise request must not
    /// spend more than asked). Returns `None` for non-positive amounts or
    /// values that overflow `u128`.
    pub fn to_base_units(self, amount: Amount) -> Option<u128> {
        if amount <= Decimal::ZERO {
            return None;
        }
        let scaled = amount
            .round_dp_with_strategy(
                self.decimals(),
                rust_decimal::RoundingStrategy::ToZero,
            )
            .checked_mul(Decimal::from(10u128.pow(self.decimals())))?;
        scaled.to_u128()
    }

    /// Convert a base-unit quantity back into the human unit.
    pub fn from_base_units(self, base: u128) -> Amount {
        Decimal::from(base) / Decimal::from(10u128.pow(self.decimals()))
    }
}

impl std::fmt::Display for NetworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Avalanche => "avalanche",
            Self::Cardano => "cardano",
            Self::Cosmos => "cosmos",
            Self::Litecoin => "litecoin",
            Self::Polkadot => "polkadot",
            Self::Ripple => "ripple",
            Self::Solana => "solana",
            Self::Tezos => "tezos",
            Self::Tron => "tron",
        };
        write!(f, "{name}")
    }
}

impl std::str::FromStr for NetworkId {
    type Err = UnknownNetwork;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "avalanche" => Ok(Self::Avalanche),
            "cardano" => Ok(Self::Cardano),
            "cosmos" => Ok(Self::Cosmos),
            "litecoin" => Ok(Self::Litecoin),
            "polkadot" => Ok(Self::Polkadot),
            "ripple" => Ok(Self::Ripple),
            "solana" => Ok(Self::Solana),
            "tezos" => Ok(Self::Tezos),
            "tron" => Ok(Self::Tron),
            other => Err(UnknownNetwork(other.to_string())),
        }
    }
}

/// Parse error for network path segments and config keys.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown network: {0}")]
pub struct UnknownNetwork(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_one_avax_is_1e9_navax() {
        assert_eq!(
            NetworkId::Avalanche.to_base_units(dec!(1)),
            Some(1_000_000_000)
        );
    }

    #[test]
    fn test_round_trip_exact_for_all_networks() {
        for network in NetworkId::ALL {
            let amount = dec!(1.5);
            let base = network.to_base_units(amount).unwrap();
            assert_eq!(
                network.from_base_units(base),
                amount,
                "round trip drifted on {network}"
            );
        }
    }

    #[test]
    fn test_sub_minimal_precision_truncates() {
        // 1.2345678901 XTZ has more than 6 decimals; extra digits truncate.
        let base = NetworkId::Tezos.to_base_units(dec!(1.2345678901)).unwrap();
        assert_eq!(base, 1_234_567);
    }

    #[test]
    fn test_non_positive_amounts_rejected() {
        assert_eq!(NetworkId::Solana.to_base_units(dec!(0)), None);
        assert_eq!(NetworkId::Solana.to_base_units(dec!(-3)), None);
    }

    #[test]
    fn test_display_from_str_round_trip() {
        for network in NetworkId::ALL {
            let parsed = NetworkId::from_str(&network.to_string()).unwrap();
            assert_eq!(parsed, network);
        }
        assert!(NetworkId::from_str("dogecoin").is_err());
    }

    #[test]
    fn test_base_unit_names() {
        assert_eq!(NetworkId::Polkadot.base_unit(), "Planck");
        assert_eq!(NetworkId::Tron.base_unit(), "SUN");
    }
}
