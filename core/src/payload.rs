//! Payload forms and their wire sizes.

use crate::taxonomy::LabelSet;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Field separator of the expanded wire text.
pub const FIELD_SEPARATOR: &str = ";;";

/// Bytes of the expanded wire text that are not counted as payload.
pub const FRAMING_OVERHEAD: u32 = 4;

/// A compacted payload travels as four big-endian u32 words.
pub const COMPACT_PAYLOAD_SIZE: u32 = 16;

/// Numeric form of a label set. Each value's leading digit names the
/// hierarchy namespace, the remaining digits the leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompactSet {
    pub disease:      u32,
    pub driver:       u32,
    pub symptom:      u32,
    pub transmission: u32,
}

impl CompactSet {
    pub fn values(&self) -> [u32; 4] {
        [self.disease, self.driver, self.symptom, self.transmission]
    }

    pub fn to_wire_bytes(&self) -> [u8; COMPACT_PAYLOAD_SIZE as usize] {
        let mut out = [0u8; COMPACT_PAYLOAD_SIZE as usize];
        for (chunk, value) in out.chunks_exact_mut(4).zip(self.values()) {
            chunk.copy_from_slice(&value.to_be_bytes());
        }
        out
    }

}

/// What a package carries. Tagged so the form is never guessed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum Payload {
    Expanded(LabelSet),
    Compacted(CompactSet),
}

impl Payload {
    pub fn is_compacted(&self) -> bool {
        matches!(self, Self::Compacted(_))
    }

    /// Size in bytes used for counters and the speed model.
    pub fn size_bytes(&self) -> u32 {
        match self {
            Self::Expanded(_) => {
                (self.to_string().len() as u32).saturating_sub(FRAMING_OVERHEAD)
            }
            Self::Compacted(set) => set.to_wire_bytes().len() as u32,
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expanded(labels) => write!(
                f,
                "{}{sep}{}{sep}{}{sep}{}",
                labels.disease,
                labels.driver,
                labels.symptom,
                labels.transmission,
                sep = FIELD_SEPARATOR
            ),
            Self::Compacted(set) => write!(
                f,
                "{}{sep}{}{sep}{}{sep}{}",
                set.disease,
                set.driver,
                set.symptom,
                set.transmission,
                sep = FIELD_SEPARATOR
            ),
        }
    }
}
