//! Snapshot document → `Player`, with a fixed table of fallbacks for missing fields.

use crate::gateway::{Document, DocumentData};
use crate::models::{Player, PlayerFields, PLACEHOLDER_IMAGE};
use serde_json::{json, Value};

/// How a decoded player's `is_tracked` flag is determined. Applied to every document.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum TrackedPolicy {
    /// Trust the stored `isTracked` field (written through the admin panel).
    #[default]
    StoredFlag,
    /// Exactly the player with this document id is tracked; the stored flag is ignored.
    ReservedId(String),
}

impl TrackedPolicy {
    fn resolve(&self, id: &str, stored: bool) -> bool {
        match self {
            TrackedPolicy::StoredFlag => stored,
            TrackedPolicy::ReservedId(reserved) => reserved == id,
        }
    }
}

/// A document that could not be turned into a player.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecodeError {
    pub id: String,
    pub field: &'static str,
    pub reason: String,
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "document {}: field {}: {}", self.id, self.field, self.reason)
    }
}

impl std::error::Error for DecodeError {}

/// Fallbacks used when a field is absent, null or an empty string.
pub const DEFAULT_NAME: &str = "Unknown";
pub const DEFAULT_SCHOOL: &str = "";
pub const DEFAULT_ASSISTS: u32 = 0;
/// Older documents stored the affiliation under this key.
pub const LEGACY_SCHOOL_FIELD: &str = "team";

fn present<'a>(data: &'a DocumentData, field: &str) -> Option<&'a Value> {
    match data.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(v) => Some(v),
    }
}

fn text(doc: &Document, field: &'static str) -> Result<Option<String>, DecodeError> {
    match present(&doc.data, field) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(DecodeError {
            id: doc.id.clone(),
            field,
            reason: format!("expected text, found {}", other),
        }),
    }
}

fn assists(doc: &Document) -> Result<u32, DecodeError> {
    let Some(value) = present(&doc.data, "assists") else {
        return Ok(DEFAULT_ASSISTS);
    };
    // Stores without an integer type hand back whole numbers as floats (e.g. 758.0).
    let whole = value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0 && *f <= f64::from(u32::MAX))
            .map(|f| f as u64)
    });
    whole
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| DecodeError {
            id: doc.id.clone(),
            field: "assists",
            reason: format!("expected a non-negative integer, found {}", value),
        })
}

/// Decode one snapshot document.
pub fn decode_player(doc: &Document, policy: &TrackedPolicy) -> Result<Player, DecodeError> {
    let name = text(doc, "name")?.unwrap_or_else(|| DEFAULT_NAME.to_string());
    let school = match text(doc, "school")? {
        Some(school) => school,
        None => text(doc, LEGACY_SCHOOL_FIELD)?.unwrap_or_else(|| DEFAULT_SCHOOL.to_string()),
    };
    let image_url = text(doc, "imageUrl")?.unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string());
    let stored_tracked = match present(&doc.data, "isTracked") {
        None => false,
        Some(Value::Bool(b)) => *b,
        Some(other) => {
            return Err(DecodeError {
                id: doc.id.clone(),
                field: "isTracked",
                reason: format!("expected a boolean, found {}", other),
            })
        }
    };
    Ok(Player {
        id: doc.id.clone(),
        name,
        school,
        assists: assists(doc)?,
        image_url,
        is_tracked: policy.resolve(&doc.id, stored_tracked),
    })
}

/// Decode a whole snapshot. Malformed documents are logged and skipped.
pub fn decode_snapshot(docs: &[Document], policy: &TrackedPolicy) -> Vec<Player> {
    docs.iter()
        .filter_map(|doc| match decode_player(doc, policy) {
            Ok(p) => Some(p),
            Err(e) => {
                log::warn!("Skipping malformed player: {}", e);
                None
            }
        })
        .collect()
}

/// Document body written for a player's editable fields.
pub fn encode_fields(fields: &PlayerFields) -> DocumentData {
    let value = json!({
        "name": fields.name,
        "school": fields.school,
        "assists": fields.assists,
        "imageUrl": fields.image_url,
        "isTracked": fields.is_tracked,
    });
    match value {
        Value::Object(map) => map,
        _ => DocumentData::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, value: Value) -> Document {
        Document::new(id, value.as_object().cloned().unwrap_or_default())
    }

    #[test]
    fn missing_fields_take_defaults() {
        let p = decode_player(&doc("x", json!({})), &TrackedPolicy::StoredFlag).unwrap();
        assert_eq!(p.name, "Unknown");
        assert_eq!(p.school, "");
        assert_eq!(p.assists, 0);
        assert_eq!(p.image_url, PLACEHOLDER_IMAGE);
        assert!(!p.is_tracked);
    }

    #[test]
    fn school_falls_back_to_legacy_team() {
        let p = decode_player(
            &doc("x", json!({ "name": "", "team": "Purdue" })),
            &TrackedPolicy::StoredFlag,
        )
        .unwrap();
        assert_eq!(p.school, "Purdue");
        assert_eq!(p.name, "Unknown");
    }

    #[test]
    fn reserved_id_overrides_stored_flag() {
        let policy = TrackedPolicy::ReservedId("braden-smith".to_string());
        let stored = decode_player(&doc("other", json!({ "isTracked": true })), &policy).unwrap();
        let reserved = decode_player(&doc("braden-smith", json!({})), &policy).unwrap();
        assert!(!stored.is_tracked);
        assert!(reserved.is_tracked);
    }

    #[test]
    fn negative_or_textual_assists_are_malformed() {
        let policy = TrackedPolicy::StoredFlag;
        assert_eq!(
            decode_player(&doc("x", json!({ "assists": -3 })), &policy)
                .unwrap_err()
                .field,
            "assists"
        );
        assert!(decode_player(&doc("x", json!({ "assists": "many" })), &policy).is_err());
    }

    #[test]
    fn whole_float_assists_are_accepted() {
        let policy = TrackedPolicy::StoredFlag;
        let p = decode_player(&doc("x", json!({ "assists": 758.0 })), &policy).unwrap();
        assert_eq!(p.assists, 758);
        assert!(decode_player(&doc("x", json!({ "assists": 758.5 })), &policy).is_err());
        assert!(decode_player(&doc("x", json!({ "assists": -1.0 })), &policy).is_err());
        assert!(decode_player(&doc("x", json!({ "assists": 5e12 })), &policy).is_err());
    }

    #[test]
    fn snapshot_skips_bad_documents() {
        let docs = vec![
            doc("ok", json!({ "name": "Ok", "assists": 4 })),
            doc("bad", json!({ "name": 12 })),
        ];
        let players = decode_snapshot(&docs, &TrackedPolicy::StoredFlag);
        assert_eq!(players.len(), 1);
        assert_eq!(players[0].id, "ok");
    }
}
