//! Event payload types.
//!
//! Missing and `null` fields fall back to zero/empty values; only
//! malformed JSON or mistyped fields are rejected.

use serde::{Deserialize, Deserializer, Serialize};

/// `aspect_type` of a newly created object.
pub const ASPECT_CREATE: &str = "create";
/// `aspect_type` of a changed object.
pub const ASPECT_UPDATE: &str = "update";
/// `object_type` of an activity event.
pub const OBJECT_ACTIVITY: &str = "activity";
/// `object_type` of an athlete event.
pub const OBJECT_ATHLETE: &str = "athlete";

/// Fields that changed, present on update events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityUpdates {
    /// Activity sport type, e.g. "Ride" or "Run"
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,

    /// "false" when the athlete revoked access
    #[serde(deserialize_with = "bool_or_string")]
    pub authorized: String,
}

/// A webhook event as sent by Strava.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityAction {
    #[serde(deserialize_with = "null_as_default")]
    pub subscription_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub aspect_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub object_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub updates: ActivityUpdates,
    #[serde(deserialize_with = "null_as_default")]
    pub owner_id: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub object_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_time: Option<i64>,
}

impl ActivityAction {
    /// Parse an event from a raw request body.
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// Canonical JSON form forwarded to the queue.
    pub fn to_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// Read `null` the same as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Strava documents `authorized` as a string but booleans show up too.
fn bool_or_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Null,
        Bool(bool),
        Str(String),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Null => String::new(),
        Raw::Bool(b) => b.to_string(),
        Raw::Str(s) => s,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_event() {
        let body = br#"{
            "aspect_type": "update",
            "event_time": 1516126040,
            "object_id": 1360128428,
            "object_type": "activity",
            "owner_id": 134815,
            "subscription_id": 120475,
            "updates": {"title": "Messy", "type": "Ride"}
        }"#;

        let action = ActivityAction::from_slice(body).unwrap();
        assert_eq!(action.aspect_type, ASPECT_UPDATE);
        assert_eq!(action.object_type, OBJECT_ACTIVITY);
        assert_eq!(action.updates.kind, "Ride");
        assert_eq!(action.updates.authorized, "");
        assert_eq!(action.owner_id, 134815);
        assert_eq!(action.object_id, 1360128428);
        assert_eq!(action.subscription_id, 120475);
        assert_eq!(action.event_time, Some(1516126040));
    }

    #[test]
    fn test_missing_fields_default() {
        let action = ActivityAction::from_slice(b"{}").unwrap();
        assert_eq!(action, ActivityAction::default());
    }

    #[test]
    fn test_authorized_accepts_bool_and_string() {
        let from_str = ActivityAction::from_slice(br#"{"updates": {"authorized": "false"}}"#).unwrap();
        let from_bool = ActivityAction::from_slice(br#"{"updates": {"authorized": false}}"#).unwrap();
        assert_eq!(from_str.updates.authorized, "false");
        assert_eq!(from_bool.updates.authorized, "false");
    }

    #[test]
    fn test_null_updates_default() {
        let action = ActivityAction::from_slice(
            br#"{"subscription_id": 1, "aspect_type": "create", "updates": null, "owner_id": 2}"#,
        )
        .unwrap();
        assert_eq!(action.aspect_type, ASPECT_CREATE);
        assert_eq!(action.updates, ActivityUpdates::default());
        assert_eq!(action.owner_id, 2);
    }

    #[test]
    fn test_null_authorized_default() {
        let action = ActivityAction::from_slice(
            br#"{"aspect_type": "update", "updates": {"type": "Ride", "authorized": null}}"#,
        )
        .unwrap();
        assert_eq!(action.updates.kind, "Ride");
        assert_eq!(action.updates.authorized, "");
    }

    #[test]
    fn test_null_scalars_default() {
        let action = ActivityAction::from_slice(
            br#"{"subscription_id": null, "aspect_type": null, "object_type": null,
                 "owner_id": null, "object_id": null, "event_time": null,
                 "updates": {"type": null}}"#,
        )
        .unwrap();
        assert_eq!(action, ActivityAction::default());
    }

    #[test]
    fn test_malformed_body_rejected() {
        assert!(ActivityAction::from_slice(b"not json").is_err());
        assert!(ActivityAction::from_slice(br#"{"owner_id": "abc"}"#).is_err());
    }

    #[test]
    fn test_canonical_payload() {
        let action = ActivityAction {
            subscription_id: 1,
            aspect_type: "create".to_string(),
            object_type: "activity".to_string(),
            updates: ActivityUpdates::default(),
            owner_id: 2,
            object_id: 3,
            event_time: None,
        };

        let payload = String::from_utf8(action.to_payload().unwrap()).unwrap();
        assert_eq!(
            payload,
            r#"{"subscription_id":1,"aspect_type":"create","object_type":"activity","updates":{"type":"","authorized":""},"owner_id":2,"object_id":3}"#
        );
    }
}
