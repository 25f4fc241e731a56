use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize, Serializer};

/// Price level of a time slot.
///
/// Rate records are only ever [`Level::Low`], [`Level::Medium`] or [`Level::High`],
/// the remaining variants describe the externally visible state when no record applies.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize, derive_more::Display)]
pub enum Level {
    Low,
    Medium,
    High,

    /// No rate record covers the current instant.
    Unknown,

    /// The last delivered curve could not be processed.
    #[serde(rename = "Error Processing Data")]
    #[display("Error Processing Data")]
    ErrorProcessingData,
}

impl Level {
    /// Numeric weight used when blending overlapping classifications.
    #[must_use]
    pub const fn weight(self) -> Option<u32> {
        match self {
            Self::Low => Some(1),
            Self::Medium => Some(2),
            Self::High => Some(3),
            Self::Unknown | Self::ErrorProcessingData => None,
        }
    }
}

/// Intra-day percentile rank of a rate, `1` being the cheapest slot of the day.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Rank {
    /// Position within `1..=100`.
    Percentile(u8),

    /// The record could not be located in its day group.
    NotAvailable,

    /// No current record at all, published as `0`.
    Unranked,
}

impl Display for Rank {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Percentile(rank) => write!(f, "{rank}"),
            Self::NotAvailable => write!(f, "N/A"),
            Self::Unranked => write!(f, "0"),
        }
    }
}

impl Serialize for Rank {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Percentile(rank) => serializer.serialize_u8(*rank),
            Self::NotAvailable => serializer.serialize_str("N/A"),
            Self::Unranked => serializer.serialize_u8(0),
        }
    }
}
