use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use thiserror::Error;

/// Timestamp layout used by upstream observation arrays:
/// `YYYY-MM-DDThh:mm±hh:mm`, minute resolution, explicit UTC offset, no seconds.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M%:z";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("timestamp '{raw}' does not match the YYYY-MM-DDThh:mm±hh:mm layout")]
pub struct TimestampFormatError {
    pub raw: String,
}

/// Parse a timestamp in the fixed upstream layout.
pub fn parse_datetime(raw: &str) -> Result<DateTime<FixedOffset>, TimestampFormatError> {
    DateTime::parse_from_str(raw, DATETIME_FORMAT)
        .map_err(|_| TimestampFormatError { raw: raw.to_owned() })
}

/// Re-serialize a timestamp in the same fixed layout it was parsed from.
pub fn format_datetime(datetime: &DateTime<FixedOffset>) -> String {
    datetime.format(DATETIME_FORMAT).to_string()
}

/// One `(timestamp, value)` observation within an hourly series.
///
/// The upstream API returns three structurally identical element shapes that
/// differ only in the payload type (number, integer, or condition string), so
/// decoding is generic over `T` instead of duplicated per series.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesValue<T> {
    pub datetime: DateTime<FixedOffset>,
    pub value: T,
}

/// Intermediate decode shape; the datetime is converted exactly once, so the
/// element bytes are never parsed twice.
#[derive(Deserialize)]
struct RawEntry<T> {
    datetime: String,
    value: T,
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for TimeSeriesValue<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = RawEntry::<T>::deserialize(deserializer)?;
        let datetime = parse_datetime(&raw.datetime).map_err(de::Error::custom)?;

        Ok(Self { datetime, value: raw.value })
    }
}

impl<T: Serialize> Serialize for TimeSeriesValue<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("TimeSeriesValue", 2)?;
        state.serialize_field("datetime", &format_datetime(&self.datetime))?;
        state.serialize_field("value", &self.value)?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datetime_roundtrips_through_the_fixed_layout() {
        for raw in ["2024-06-01T08:00+08:00", "2023-12-31T23:59-05:30", "2024-01-01T00:00+00:00"] {
            let parsed = parse_datetime(raw).expect("valid timestamp must parse");
            assert_eq!(format_datetime(&parsed), raw);
        }
    }

    #[test]
    fn malformed_datetime_is_rejected_with_the_offending_string() {
        for raw in [
            "2024-06-01",
            "08:00+08:00",
            "2024-06-01 08:00+08:00",
            "2024-06-01T08:00:00+08:00",
            "not a timestamp",
            "",
        ] {
            let err = parse_datetime(raw).unwrap_err();
            assert_eq!(err.raw, raw);
            assert!(err.to_string().contains(raw));
        }
    }

    #[test]
    fn decodes_float_values_exactly() {
        let entry: TimeSeriesValue<f32> =
            serde_json::from_str(r#"{"datetime":"2024-06-01T08:00+08:00","value":22.1}"#)
                .expect("float element must decode");

        assert_eq!(entry.value, 22.1);
        assert_eq!(format_datetime(&entry.datetime), "2024-06-01T08:00+08:00");
    }

    #[test]
    fn decodes_integer_values_without_precision_loss() {
        let entry: TimeSeriesValue<i32> =
            serde_json::from_str(r#"{"datetime":"2024-06-01T09:00+08:00","value":-2147483648}"#)
                .expect("integer element must decode");

        assert_eq!(entry.value, i32::MIN);
    }

    #[test]
    fn decodes_string_values() {
        let entry: TimeSeriesValue<String> =
            serde_json::from_str(r#"{"datetime":"2024-06-01T10:00+08:00","value":"CLEAR_DAY"}"#)
                .expect("string element must decode");

        assert_eq!(entry.value, "CLEAR_DAY");
    }

    #[test]
    fn unknown_element_fields_are_dropped() {
        let entry: TimeSeriesValue<f32> = serde_json::from_str(
            r#"{"datetime":"2024-06-01T08:00+08:00","value":1.0,"extra":"ignored"}"#,
        )
        .expect("unknown fields must not fail the decode");

        assert_eq!(entry.value, 1.0);
    }

    #[test]
    fn series_decoding_preserves_upstream_order() {
        let series: Vec<TimeSeriesValue<f32>> = serde_json::from_str(
            r#"[
                {"datetime":"2024-06-01T08:00+08:00","value":22.1},
                {"datetime":"2024-06-01T09:00+08:00","value":23.4},
                {"datetime":"2024-06-01T10:00+08:00","value":24.0}
            ]"#,
        )
        .expect("series must decode");

        let values: Vec<f32> = series.iter().map(|e| e.value).collect();
        assert_eq!(values, vec![22.1, 23.4, 24.0]);
        assert!(series.windows(2).all(|w| w[0].datetime < w[1].datetime));
    }

    #[test]
    fn empty_series_decodes_to_an_empty_sequence() {
        let series: Vec<TimeSeriesValue<f32>> =
            serde_json::from_str("[]").expect("empty array is not an error");
        assert!(series.is_empty());
    }

    #[test]
    fn malformed_element_datetime_fails_the_containing_decode() {
        let err = serde_json::from_str::<Vec<TimeSeriesValue<f32>>>(
            r#"[{"datetime":"2024/06/01 08:00","value":22.1}]"#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("2024/06/01 08:00"));
    }

    #[test]
    fn element_reserializes_in_the_same_layout() {
        let entry: TimeSeriesValue<f32> =
            serde_json::from_str(r#"{"datetime":"2024-06-01T08:00+08:00","value":22.1}"#)
                .expect("element must decode");

        let json = serde_json::to_string(&entry).expect("element must serialize");
        assert_eq!(json, r#"{"datetime":"2024-06-01T08:00+08:00","value":22.1}"#);
    }
}
