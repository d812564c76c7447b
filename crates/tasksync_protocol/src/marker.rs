//! Snapshot markers.
//!
//! A marker orders snapshots in time. Clients send either an integer number
//! of milliseconds since the Unix epoch or an ISO-8601 date-time string; both
//! forms are placed on one nanosecond timeline so they compare with each
//! other. The original wire form is kept and echoed back unchanged.

use crate::error::MarkerError;
use chrono::{DateTime, NaiveDateTime, SecondsFormat, SubsecRound, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

const NANOS_PER_MILLI: i128 = 1_000_000;
const NANOS_PER_SEC: i128 = 1_000_000_000;

/// A comparable snapshot timestamp.
///
/// Equality and ordering are chronological: `Marker::Millis(0)` equals the
/// ISO marker `1970-01-01T00:00:00Z`.
#[derive(Debug, Clone)]
pub enum Marker {
    /// Milliseconds since the Unix epoch.
    Millis(i64),
    /// An ISO-8601 date-time, kept verbatim alongside its parsed instant.
    Iso {
        /// The string exactly as received.
        raw: String,
        /// The parsed instant.
        instant: DateTime<Utc>,
    },
}

impl Marker {
    /// The epoch marker (`0`).
    pub const EPOCH: Marker = Marker::Millis(0);

    /// Creates a marker for the current time, in ISO form with millisecond precision.
    pub fn now() -> Self {
        Self::from_instant(Utc::now())
    }

    /// Creates an ISO marker for the given instant.
    ///
    /// The instant is truncated to milliseconds so the marker orders exactly
    /// like its wire form.
    pub fn from_instant(instant: DateTime<Utc>) -> Self {
        let instant = instant.trunc_subsecs(3);
        Marker::Iso {
            raw: instant.to_rfc3339_opts(SecondsFormat::Millis, true),
            instant,
        }
    }

    /// Parses an ISO-8601 date-time string.
    ///
    /// Offsets are honoured; strings without an offset are taken as UTC.
    pub fn parse_iso(raw: &str) -> Result<Self, MarkerError> {
        let instant = DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .or_else(|_| {
                NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
                    .map(|naive| naive.and_utc())
            })
            .map_err(|_| MarkerError::Unparseable(raw.to_string()))?;

        Ok(Marker::Iso {
            raw: raw.to_string(),
            instant,
        })
    }

    /// Interprets a JSON value as a marker.
    pub fn from_json(value: &Value) -> Result<Self, MarkerError> {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(ms) => Ok(Marker::Millis(ms)),
                None if n.is_u64() => Err(MarkerError::OutOfRange(n.to_string())),
                None => Err(MarkerError::NotInteger(n.to_string())),
            },
            Value::String(s) => Self::parse_iso(s),
            Value::Null => Err(MarkerError::WrongType("null")),
            Value::Bool(_) => Err(MarkerError::WrongType("boolean")),
            Value::Array(_) => Err(MarkerError::WrongType("list")),
            Value::Object(_) => Err(MarkerError::WrongType("object")),
        }
    }

    /// Returns the marker in its wire form.
    pub fn to_json(&self) -> Value {
        match self {
            Marker::Millis(ms) => Value::from(*ms),
            Marker::Iso { raw, .. } => Value::String(raw.clone()),
        }
    }

    /// Position on the shared timeline, in nanoseconds since the epoch.
    pub fn as_nanos(&self) -> i128 {
        match self {
            Marker::Millis(ms) => i128::from(*ms) * NANOS_PER_MILLI,
            Marker::Iso { instant, .. } => {
                i128::from(instant.timestamp()) * NANOS_PER_SEC
                    + i128::from(instant.timestamp_subsec_nanos())
            }
        }
    }

    /// Returns true if this marker is strictly newer than `other`.
    ///
    /// Equal markers are not newer.
    pub fn supersedes(&self, other: &Marker) -> bool {
        self.as_nanos() > other.as_nanos()
    }
}

impl Default for Marker {
    fn default() -> Self {
        Marker::EPOCH
    }
}

impl PartialEq for Marker {
    fn eq(&self, other: &Self) -> bool {
        self.as_nanos() == other.as_nanos()
    }
}

impl Eq for Marker {}

impl PartialOrd for Marker {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Marker {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_nanos().cmp(&other.as_nanos())
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Marker::Millis(ms) => write!(f, "{ms}"),
            Marker::Iso { raw, .. } => f.write_str(raw),
        }
    }
}

impl FromStr for Marker {
    type Err = MarkerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<i64>() {
            Ok(ms) => Ok(Marker::Millis(ms)),
            Err(_) => Self::parse_iso(s.trim()),
        }
    }
}

impl Serialize for Marker {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Marker::Millis(ms) => serializer.serialize_i64(*ms),
            Marker::Iso { raw, .. } => serializer.serialize_str(raw),
        }
    }
}

impl<'de> Deserialize<'de> for Marker {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Marker::from_json(&value).map_err(D::Error::custom)
    }
}
