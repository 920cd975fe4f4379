use crate::{
    taxonomy::Hierarchy,
    types::{PlaceId, TierKind},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("No tier of type {kind} is registered")]
    UnknownTierType { kind: TierKind },

    #[error("No place of type {kind} to pick from")]
    NoSuchPlace { kind: TierKind },

    #[error("Place {place} is not registered")]
    UnknownPlace { place: PlaceId },

    #[error("Place '{place}' is a {actual} tier, expected {expected}")]
    TierMismatch {
        place:    String,
        expected: TierKind,
        actual:   TierKind,
    },

    #[error("Codec lookup failed: {0}")]
    CodecLookup(#[from] CodecLookupError),

    #[error("Package '{package_id}' is in activity {activity}, which its controller does not handle")]
    UnknownActivity {
        package_id: String,
        activity:   String,
    },

    #[error("Package '{package_id}' carries no payload where one is required")]
    MissingPayload { package_id: String },

    #[error("Package '{package_id}' not found")]
    PackageNotFound { package_id: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A label or numeric id with no match in its hierarchy.
/// Always fatal: it means the taxonomy snapshot is corrupt or incomplete.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecLookupError {
    #[error("label '{label}' not found in the {hierarchy} hierarchy")]
    UnknownLabel { hierarchy: Hierarchy, label: String },

    #[error("code '{code}' not found in the {hierarchy} hierarchy")]
    UnknownCode { hierarchy: Hierarchy, code: String },

    #[error("'{value}' is not a valid term code")]
    MalformedCode { value: String },

    #[error("compacted id {value} belongs to the {actual} hierarchy, expected {expected}")]
    WrongHierarchy {
        value:    u32,
        expected: Hierarchy,
        actual:   Hierarchy,
    },
}

pub type SimResult<T> = Result<T, SimError>;
