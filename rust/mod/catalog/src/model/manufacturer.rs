use serde::{Deserialize, Serialize};

/// Display name for a product whose manufacturer is not in the reference list.
pub const UNKNOWN_MANUFACTURER: &str = "Unknown";

/// Read-only reference data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manufacturer {
    pub id: u64,
    pub name: String,
}

/// Resolve a manufacturer id to its display name.
pub fn manufacturer_name(manufacturers: &[Manufacturer], id: u64) -> &str {
    manufacturers
        .iter()
        .find(|m| m.id == id)
        .map(|m| m.name.as_str())
        .unwrap_or(UNKNOWN_MANUFACTURER)
}
