//! Message Codec (C1): parses a generic `{series: [...]}` dictionary into a
//! typed [`ResponseSeries`], dispatching each element's `parsable_type`
//! against the closed [`ResponseRecord`] sum type. No I/O happens here.

use serde_json::Value;

use crate::error::ParseError;
use crate::response::{ResponseRecord, ResponseSeries};

/// Parse one response envelope, stamping `responder` onto the result.
///
/// An element whose `parsable_type` is unrecognized, or that otherwise fails
/// to deserialize into its declared variant, becomes a
/// [`ResponseRecord::Error`] in place — it does not abort the rest of the
/// series (spec.md §4.1).
pub fn decode_response_series(envelope: &Value, responder: &str) -> Result<ResponseSeries, ParseError> {
    let object = envelope.as_object().ok_or(ParseError::NotAnObject)?;
    let raw_series = object.get("series").ok_or(ParseError::MissingSeries)?;
    let raw_series = raw_series.as_array().ok_or(ParseError::SeriesNotArray)?;

    let series = raw_series
        .iter()
        .map(|element| decode_one(element))
        .collect();

    Ok(ResponseSeries {
        series,
        responder: responder.to_owned(),
    })
}

fn decode_one(element: &Value) -> ResponseRecord {
    match serde_json::from_value::<ResponseRecord>(element.clone()) {
        Ok(record) => record,
        Err(e) => {
            let tag = element
                .get("parsable_type")
                .and_then(Value::as_str)
                .unwrap_or("<missing>");
            ResponseRecord::Error {
                message: format!("unrecognized or malformed response element (parsable_type={tag}): {e}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_known_tag() {
        let envelope = json!({ "series": [{ "parsable_type": "empty" }] });
        let decoded = decode_response_series(&envelope, "det-1").unwrap();
        assert_eq!(decoded.responder, "det-1");
        assert_eq!(decoded.series, vec![ResponseRecord::Empty]);
    }

    #[test]
    fn unknown_tag_becomes_error_record_not_a_failure() {
        let envelope = json!({ "series": [{ "parsable_type": "some_future_kind" }] });
        let decoded = decode_response_series(&envelope, "det-1").unwrap();
        assert_eq!(decoded.series.len(), 1);
        assert!(decoded.series[0].is_error());
    }

    #[test]
    fn mixed_series_keeps_valid_siblings() {
        let envelope = json!({
            "series": [
                { "parsable_type": "empty" },
                { "parsable_type": "unknown_weird_tag" },
                { "parsable_type": "get_poses", "detector_poses": [], "target_poses": [] },
            ]
        });
        let decoded = decode_response_series(&envelope, "solver-1").unwrap();
        assert_eq!(decoded.series.len(), 3);
        assert_eq!(decoded.series[0], ResponseRecord::Empty);
        assert!(decoded.series[1].is_error());
        assert!(matches!(decoded.series[2], ResponseRecord::GetPoses { .. }));
    }

    #[test]
    fn missing_series_field_is_rejected() {
        let envelope = json!({ "not_series": [] });
        assert!(matches!(
            decode_response_series(&envelope, "x"),
            Err(ParseError::MissingSeries)
        ));
    }

    #[test]
    fn non_object_envelope_is_rejected() {
        let envelope = json!([1, 2, 3]);
        assert!(matches!(
            decode_response_series(&envelope, "x"),
            Err(ParseError::NotAnObject)
        ));
    }
}
