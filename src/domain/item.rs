//! Offer and consideration items.

use std::fmt;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Kind of asset an item transfers.
///
/// Serialized as the settlement contract's numeric item type (`0..=5`), which
/// is how signed orders are exchanged off chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ItemType {
    /// Chain-native currency (ETH).
    Native,
    /// Fungible ERC-20 token.
    Erc20,
    /// Non-fungible ERC-721 token.
    Erc721,
    /// Semi-fungible ERC-1155 token.
    Erc1155,
    /// ERC-721 token selected by a merkle criteria root.
    Erc721WithCriteria,
    /// ERC-1155 token selected by a merkle criteria root.
    Erc1155WithCriteria,
}

impl ItemType {
    /// True for the chain-native currency.
    #[must_use]
    pub const fn is_native(self) -> bool {
        matches!(self, Self::Native)
    }

    /// True for ERC-20 tokens.
    #[must_use]
    pub const fn is_erc20(self) -> bool {
        matches!(self, Self::Erc20)
    }

    /// True for currencies (native or ERC-20).
    #[must_use]
    pub const fn is_currency(self) -> bool {
        matches!(self, Self::Native | Self::Erc20)
    }

    /// True for ERC-721/1155 items, with or without criteria.
    ///
    /// These are approved per collection through an operator approval rather
    /// than an allowance.
    #[must_use]
    pub const fn is_collection(self) -> bool {
        matches!(
            self,
            Self::Erc721 | Self::Erc1155 | Self::Erc721WithCriteria | Self::Erc1155WithCriteria
        )
    }

    /// True for criteria-based items.
    #[must_use]
    pub const fn has_criteria(self) -> bool {
        matches!(self, Self::Erc721WithCriteria | Self::Erc1155WithCriteria)
    }
}

impl TryFrom<u8> for ItemType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Native),
            1 => Ok(Self::Erc20),
            2 => Ok(Self::Erc721),
            3 => Ok(Self::Erc1155),
            4 => Ok(Self::Erc721WithCriteria),
            5 => Ok(Self::Erc1155WithCriteria),
            other => Err(format!("unknown item type {other}")),
        }
    }
}

impl From<ItemType> for u8 {
    fn from(value: ItemType) -> Self {
        match value {
            ItemType::Native => 0,
            ItemType::Erc20 => 1,
            ItemType::Erc721 => 2,
            ItemType::Erc1155 => 3,
            ItemType::Erc721WithCriteria => 4,
            ItemType::Erc1155WithCriteria => 5,
        }
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Native => "native",
            Self::Erc20 => "erc20",
            Self::Erc721 => "erc721",
            Self::Erc1155 => "erc1155",
            Self::Erc721WithCriteria => "erc721-criteria",
            Self::Erc1155WithCriteria => "erc1155-criteria",
        };
        f.write_str(name)
    }
}

/// An item the offerer gives up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferItem {
    pub item_type: ItemType,
    pub token: Address,
    pub identifier_or_criteria: U256,
    pub start_amount: U256,
    pub end_amount: U256,
}

impl OfferItem {
    /// True when the amount does not change over the order's lifetime.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.start_amount == self.end_amount
    }

    /// Copy of this item pinned to a single resolved amount.
    #[must_use]
    pub fn with_amount(&self, amount: U256) -> Self {
        Self {
            start_amount: amount,
            end_amount: amount,
            ..self.clone()
        }
    }
}

/// An item the offerer requires in return, including fee slices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsiderationItem {
    pub item_type: ItemType,
    pub token: Address,
    pub identifier_or_criteria: U256,
    pub start_amount: U256,
    pub end_amount: U256,
    pub recipient: Address,
}

impl ConsiderationItem {
    /// True when the amount does not change over the order's lifetime.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.start_amount == self.end_amount
    }

    /// Copy of this item pinned to a single resolved amount.
    #[must_use]
    pub fn with_amount(&self, amount: U256) -> Self {
        Self {
            start_amount: amount,
            end_amount: amount,
            ..self.clone()
        }
    }

    /// Resolved amount of an item produced by [`with_amount`](Self::with_amount).
    #[must_use]
    pub fn amount(&self) -> U256 {
        self.start_amount
    }
}

/// A fee slice expressed in basis points of a base amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fee {
    pub recipient: Address,
    pub basis_points: u16,
}

impl Fee {
    #[must_use]
    pub const fn new(recipient: Address, basis_points: u16) -> Self {
        Self {
            recipient,
            basis_points,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_type_round_trips_through_wire_value() {
        for raw in 0u8..=5 {
            let item_type = ItemType::try_from(raw).unwrap();
            assert_eq!(u8::from(item_type), raw);
        }
        assert!(ItemType::try_from(6).is_err());
    }

    #[test]
    fn item_type_deserializes_from_number() {
        let item_type: ItemType = serde_json::from_str("3").unwrap();
        assert_eq!(item_type, ItemType::Erc1155);
    }

    #[test]
    fn collection_types_include_criteria_variants() {
        assert!(ItemType::Erc721.is_collection());
        assert!(ItemType::Erc1155WithCriteria.is_collection());
        assert!(!ItemType::Erc20.is_collection());
        assert!(!ItemType::Native.is_collection());
    }

    #[test]
    fn currencies_are_native_and_erc20() {
        assert!(ItemType::Native.is_currency());
        assert!(ItemType::Erc20.is_currency());
        assert!(!ItemType::Erc721.is_currency());
    }

    #[test]
    fn with_amount_pins_both_bounds() {
        let item = OfferItem {
            item_type: ItemType::Erc20,
            token: Address::with_last_byte(1),
            identifier_or_criteria: U256::ZERO,
            start_amount: U256::from(10),
            end_amount: U256::from(20),
        };

        let pinned = item.with_amount(U256::from(15));

        assert!(pinned.is_static());
        assert_eq!(pinned.start_amount, U256::from(15));
        assert_eq!(pinned.token, item.token);
    }
}
