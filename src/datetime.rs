//! Local date-time parsing and formatting.
//!
//! Appointment dates travel as ISO-8601 local date-times without an offset.
//! Seconds are optional on input and always present on output. Fractional
//! seconds are accepted but truncated, so a stored value always prints back
//! exactly as it compares.

use chrono::{NaiveDateTime, ParseError, SubsecRound};

const OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
const INPUT_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse an ISO-8601 local date-time such as `2099-01-01T10:00`.
pub fn parse_local(value: &str) -> Result<NaiveDateTime, ParseError> {
    let value = value.trim();
    INPUT_FORMATS[1..]
        .iter()
        .fold(
            NaiveDateTime::parse_from_str(value, INPUT_FORMATS[0]),
            |parsed, format| parsed.or_else(|_| NaiveDateTime::parse_from_str(value, format)),
        )
        .map(|parsed| parsed.trunc_subsecs(0))
}

pub fn format_local(value: &NaiveDateTime) -> String {
    value.format(OUTPUT_FORMAT).to_string()
}

/// `#[serde(with = "crate::datetime::iso")]`
pub mod iso {
    use chrono::NaiveDateTime;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_local(value))
    }
}

/// Incoming optional date-times. Missing and `null` both map to `None`.
pub mod iso_option {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer};

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|raw| super::parse_local(&raw).map_err(de::Error::custom))
            .transpose()
    }
}
