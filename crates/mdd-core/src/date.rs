//! Wire date handling and display formatting.
//!
//! The server is inconsistent: post dates arrive as `yyyy/MM/dd` strings,
//! subject and comment dates as epoch milliseconds. Both (and RFC 3339) are
//! normalised to UTC instants. Outgoing dates are written as epoch millis.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawDate {
  Millis(i64),
  Text(String),
}

/// Parse any of the date shapes the server emits.
pub fn parse_wire_date(s: &str) -> Option<DateTime<Utc>> {
  if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
    return Some(dt.with_timezone(&Utc));
  }
  ["%Y/%m/%d", "%Y-%m-%d"].iter().find_map(|fmt| {
    NaiveDate::parse_from_str(s, fmt)
      .ok()
      .and_then(|d| d.and_hms_opt(0, 0, 0))
      .map(|naive| Utc.from_utc_datetime(&naive))
  })
}

fn from_raw(raw: RawDate) -> Result<DateTime<Utc>, String> {
  match raw {
    RawDate::Millis(ms) => Utc
      .timestamp_millis_opt(ms)
      .single()
      .ok_or_else(|| format!("timestamp out of range: {ms}")),
    RawDate::Text(s) => parse_wire_date(&s).ok_or_else(|| format!("unrecognised date: {s:?}")),
  }
}

/// `#[serde(with = "mdd_core::date::wire")]` for required dates.
pub mod wire {
  use super::*;

  pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_i64(dt.timestamp_millis())
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
    from_raw(RawDate::deserialize(d)?).map_err(D::Error::custom)
  }
}

/// `#[serde(with = "mdd_core::date::wire_opt", default)]` for optional dates.
pub mod wire_opt {
  use super::*;

  pub fn serialize<S: Serializer>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
    match dt {
      Some(dt) => s.serialize_some(&dt.timestamp_millis()),
      None => s.serialize_none(),
    }
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    d: D,
  ) -> Result<Option<DateTime<Utc>>, D::Error> {
    Option::<RawDate>::deserialize(d)?
      .map(from_raw)
      .transpose()
      .map_err(D::Error::custom)
  }
}

/// Short display form, e.g. `6/15/24, 9:03 AM`.
pub fn format_short(dt: DateTime<Utc>) -> String {
  dt.format("%-m/%-d/%y, %-I:%M %p").to_string()
}
