//! Core data types for the player store
//!
//! - `UserRecord`: the document stored per user
//! - `Submission`: a validated client report, not yet stamped
//! - `PlayerCount`: the aggregate snapshot served to clients

use chrono::{DateTime, SubsecRound, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::storage::error::{StorageError, StorageResult};

/// Keys the server owns; a client cannot smuggle them in through extras.
const RESERVED_KEYS: [&str; 3] = ["userId", "playerCount", "lastUpdated"];

/// Last-reported state of a single user
///
/// Serialized flat: `{"playerCount": 3, "lastUpdated": "...", ...extra}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default, deserialize_with = "deserialize_player_count")]
    pub player_count: u64,

    #[serde(
        default = "now_millis",
        serialize_with = "iso_millis::serialize",
        deserialize_with = "deserialize_last_updated"
    )]
    pub last_updated: DateTime<Utc>,

    /// Client-supplied fields, passed through verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserRecord {
    /// Stamp a submission with the current time, at the precision the file keeps
    pub fn from_submission(submission: Submission) -> Self {
        Self::with_timestamp(submission, now_millis())
    }

    pub fn with_timestamp(submission: Submission, last_updated: DateTime<Utc>) -> Self {
        Self {
            player_count: submission.player_count,
            last_updated,
            extra: submission.extra,
        }
    }
}

/// A client report that passed the `userId` check
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub user_id: String,
    pub player_count: u64,
    pub extra: Map<String, Value>,
}

impl Submission {
    pub fn new(user_id: impl Into<String>, player_count: u64) -> Self {
        Self {
            user_id: user_id.into(),
            player_count,
            extra: Map::new(),
        }
    }

    /// Builder method: add a pass-through field
    pub fn field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let key = key.into();
        if !RESERVED_KEYS.contains(&key.as_str()) {
            self.extra.insert(key, value.into());
        }
        self
    }

    /// Validate a raw request body.
    ///
    /// Only `userId` is checked: it must be a non-empty string. `playerCount`
    /// is coerced, everything else is kept as-is.
    pub fn from_json(body: Value) -> StorageResult<Self> {
        let Value::Object(mut fields) = body else {
            return Err(StorageError::InvalidInput(
                "request body must be a JSON object".to_string(),
            ));
        };

        let user_id = match fields.remove("userId") {
            Some(Value::String(id)) if !id.is_empty() => id,
            Some(Value::String(_)) => {
                return Err(StorageError::InvalidInput("userId cannot be empty".to_string()))
            }
            Some(_) => {
                return Err(StorageError::InvalidInput("userId must be a string".to_string()))
            }
            None => return Err(StorageError::InvalidInput("userId is required".to_string())),
        };

        let player_count = fields
            .remove("playerCount")
            .map(|v| coerce_player_count(&v))
            .unwrap_or(0);

        fields.remove("lastUpdated");

        Ok(Self {
            user_id,
            player_count,
            extra: fields,
        })
    }
}

/// Aggregate snapshot served by `/player-count` and the event stream
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerCount {
    pub current: u64,
    pub total: u64,
}

impl PlayerCount {
    /// `current` and `total` are both the live sum
    pub fn from_sum(sum: u64) -> Self {
        Self {
            current: sum,
            total: sum,
        }
    }
}

/// Coerce an arbitrary JSON value into a player count.
///
/// Non-numbers, negatives and non-finite values become 0; fractions truncate.
pub fn coerce_player_count(value: &Value) -> u64 {
    match value {
        Value::Number(n) => n.as_u64().unwrap_or_else(|| match n.as_f64() {
            Some(f) if f.is_finite() && f > 0.0 => f.trunc() as u64,
            _ => 0,
        }),
        _ => 0,
    }
}

/// Current time truncated to milliseconds
fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Accept an RFC 3339 string or epoch milliseconds; anything else becomes now.
pub fn coerce_last_updated(value: &Value) -> DateTime<Utc> {
    let parsed = match value {
        Value::String(raw) => DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        Value::Number(n) => n
            .as_i64()
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
        _ => None,
    };
    parsed.map(|dt| dt.trunc_subsecs(3)).unwrap_or_else(now_millis)
}

fn deserialize_last_updated<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_last_updated(&value))
}

fn deserialize_player_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_player_count(&value))
}

/// RFC 3339 with millisecond precision and a `Z` suffix
mod iso_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::Serializer;

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_submission_requires_string_user_id() {
        let err = Submission::from_json(json!({"playerCount": 3})).unwrap_err();
        assert!(matches!(err, StorageError::InvalidInput(_)));

        let err = Submission::from_json(json!({"userId": 42})).unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: userId must be a string");

        assert!(Submission::from_json(json!({"userId": ""})).is_err());
        assert!(Submission::from_json(json!(["userId", "a"])).is_err());
    }

    #[test]
    fn test_submission_coerces_player_count() {
        let s = Submission::from_json(json!({"userId": "a"})).unwrap();
        assert_eq!(s.player_count, 0);

        let s = Submission::from_json(json!({"userId": "a", "playerCount": "12"})).unwrap();
        assert_eq!(s.player_count, 0);

        let s = Submission::from_json(json!({"userId": "a", "playerCount": -4})).unwrap();
        assert_eq!(s.player_count, 0);

        let s = Submission::from_json(json!({"userId": "a", "playerCount": 7.9})).unwrap();
        assert_eq!(s.player_count, 7);

        let s = Submission::from_json(json!({"userId": "a", "playerCount": 12})).unwrap();
        assert_eq!(s.player_count, 12);
    }

    #[test]
    fn test_submission_keeps_extra_fields() {
        let s = Submission::from_json(json!({
            "userId": "a",
            "playerCount": 1,
            "nickname": "fang",
            "lastUpdated": "1999-01-01T00:00:00.000Z",
            "upgrades": {"autoclicker": 2}
        }))
        .unwrap();

        assert_eq!(s.user_id, "a");
        assert_eq!(s.extra.len(), 2);
        assert_eq!(s.extra["nickname"], json!("fang"));
        assert_eq!(s.extra["upgrades"], json!({"autoclicker": 2}));
        assert!(!s.extra.contains_key("lastUpdated"));
    }

    #[test]
    fn test_record_serializes_flat() {
        let ts = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let record =
            UserRecord::with_timestamp(Submission::new("a", 3).field("nickname", "fang"), ts);

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            json!({
                "playerCount": 3,
                "lastUpdated": "2026-01-02T03:04:05.000Z",
                "nickname": "fang"
            })
        );

        let back: UserRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_record_tolerates_bad_player_count_on_disk() {
        let record: UserRecord = serde_json::from_value(json!({
            "playerCount": "lots",
            "lastUpdated": "2026-01-02T03:04:05.000Z"
        }))
        .unwrap();
        assert_eq!(record.player_count, 0);
        assert!(record.extra.is_empty());
    }

    #[test]
    fn test_record_tolerates_bad_last_updated_on_disk() {
        let from_millis: UserRecord = serde_json::from_value(json!({
            "playerCount": 5,
            "lastUpdated": 1767225600000i64
        }))
        .unwrap();
        assert_eq!(
            from_millis.last_updated,
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
        );

        for bad in [json!("yesterday"), json!(true), json!({"at": 1}), json!(null)] {
            let record: UserRecord =
                serde_json::from_value(json!({"playerCount": 2, "lastUpdated": bad})).unwrap();
            assert_eq!(record.player_count, 2);
        }
    }

    #[test]
    fn test_stamp_matches_persisted_precision() {
        let record = UserRecord::from_submission(Submission::new("a", 1));
        assert_eq!(record.last_updated.timestamp_subsec_nanos() % 1_000_000, 0);

        let back: UserRecord =
            serde_json::from_value(serde_json::to_value(&record).unwrap()).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_field_builder_ignores_reserved_keys() {
        let s = Submission::new("a", 1).field("playerCount", 99).field("skin", "gold");
        assert_eq!(s.player_count, 1);
        assert_eq!(s.extra.len(), 1);
    }
}
