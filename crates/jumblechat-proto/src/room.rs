//! Room identifiers.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a room (the source calls these "channels" interchangeably).
///
/// Stored as a string. Clients are allowed to send the id as a JSON number
/// (the admin panel does); numbers normalize to their decimal string form, so
/// `"149"` and `149` name the same room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Create a room id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for RoomId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for RoomId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::Text(id) => Self(id),
            Repr::Number(n) => Self(n.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_id_round_trips() {
        let id: RoomId = serde_json::from_str("\"lobby\"").unwrap();
        assert_eq!(id.as_str(), "lobby");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"lobby\"");
    }

    #[test]
    fn numeric_id_normalizes_to_string() {
        let id: RoomId = serde_json::from_str("149").unwrap();
        assert_eq!(id, RoomId::from("149"));
    }

    #[test]
    fn non_scalar_id_is_rejected() {
        assert!(serde_json::from_str::<RoomId>("[1]").is_err());
        assert!(serde_json::from_str::<RoomId>("{\"id\": 1}").is_err());
    }
}
