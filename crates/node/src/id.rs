use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a node.
///
/// Backed by a random v4 UUID, so identifiers are never reissued within a
/// session, including after the node they named has been deleted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(uuid::Uuid);

impl NodeId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Create a NodeId from a u128 (useful for tests).
    pub fn from_u128(value: u128) -> Self {
        Self(uuid::Uuid::from_u128(value))
    }

    /// First eight hex digits, for log lines and debug output.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse the lowercase hyphenated form `Display` writes. Other spellings
/// of the same UUID are rejected so ids survive a round trip unchanged.
fn parse_canonical(s: &str) -> Result<uuid::Uuid, String> {
    let uuid = uuid::Uuid::parse_str(s).map_err(|e| e.to_string())?;
    if uuid.hyphenated().to_string() != s {
        return Err(format!("id {:?} is not in lowercase hyphenated form", s));
    }
    Ok(uuid)
}

impl FromStr for NodeId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_canonical(s).map(Self)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.short())
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a page.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PageId(uuid::Uuid);

impl PageId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    pub fn from_u128(value: u128) -> Self {
        Self(uuid::Uuid::from_u128(value))
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for PageId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_canonical(s).map(Self)
    }
}

impl<'de> Deserialize<'de> for PageId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl fmt::Debug for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageId({})", &self.0.simple().to_string()[..8])
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trips_through_from_str() {
        let id = NodeId::new();
        let parsed: NodeId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
    }

    #[test]
    fn from_str_rejects_short_form() {
        let id = NodeId::new();
        assert!(id.short().parse::<NodeId>().is_err());
    }

    #[test]
    fn from_str_rejects_other_spellings() {
        let id = NodeId::from_u128(0xABCD);
        let canonical = id.to_string();
        let simple = canonical.replace('-', "");
        let upper = canonical.to_uppercase();
        let braced = format!("{{{}}}", canonical);
        let urn = format!("urn:uuid:{}", canonical);

        for spelling in [simple, upper, braced, urn] {
            assert!(spelling.parse::<NodeId>().is_err(), "{} parsed", spelling);
            assert!(spelling.parse::<PageId>().is_err(), "{} parsed", spelling);
        }
        assert_eq!(canonical.parse::<NodeId>().unwrap(), id);
    }

    #[test]
    fn deserialize_rejects_uppercase() {
        let upper = NodeId::from_u128(0xABCD).to_string().to_uppercase();
        assert!(serde_json::from_value::<NodeId>(serde_json::json!(upper)).is_err());
    }

    #[test]
    fn fresh_ids_differ() {
        assert_ne!(NodeId::new(), NodeId::new());
        assert_ne!(PageId::new(), PageId::new());
    }

    #[test]
    fn serializes_as_full_uuid_string() {
        let id = NodeId::from_u128(1);
        let json = serde_json::to_value(id).unwrap();
        assert_eq!(json, serde_json::json!("00000000-0000-0000-0000-000000000001"));
    }
}
