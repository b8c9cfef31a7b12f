use serde_json::Value;

use crate::coerce::js_number;
use crate::error::FetchFailure;

/// Treasury metrics as served by the metrics endpoint.
///
/// Fields are whatever the coercion produced; `NaN` is a legal value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreasuryMetrics {
    /// Total Value Locked, in USD.
    pub tvl: f64,
    /// Annual Percentage Yield, in percent.
    pub apy: f64,
}

impl TreasuryMetrics {
    pub fn new(tvl: f64, apy: f64) -> Self {
        Self { tvl, apy }
    }

    /// Coerce a decoded response body.
    ///
    /// Non-object bodies have no fields and yield `NaN`s; only `null` is
    /// rejected, since reading a field of it is an error.
    pub fn from_json(body: &Value) -> Result<Self, FetchFailure> {
        if body.is_null() {
            return Err(FetchFailure::decode(
                "response body is null; cannot read 'tvl'",
            ));
        }
        Ok(Self {
            tvl: js_number(body.get("tvl")),
            apy: js_number(body.get("apy")),
        })
    }

    /// Parse and coerce a raw response body.
    pub fn from_body(body: &str) -> Result<Self, FetchFailure> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| FetchFailure::decode(format!("invalid JSON in response body: {e}")))?;
        Self::from_json(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn out_of_range_number_is_infinite_not_a_decode_failure() {
        let metrics =
            TreasuryMetrics::from_body(r#"{"tvl": 1e400, "apy": 1}"#).expect("valid JSON body");
        assert_eq!(metrics.tvl, f64::INFINITY);
        assert_eq!(metrics.apy, 1.0);
    }

    #[test]
    fn string_fields_are_coerced() {
        let metrics = TreasuryMetrics::from_json(&json!({"tvl": "1234", "apy": "5.6"}))
            .expect("object body");
        assert_eq!(metrics, TreasuryMetrics::new(1234.0, 5.6));
    }

    #[test]
    fn missing_fields_are_nan() {
        let metrics = TreasuryMetrics::from_json(&json!({"tvl": 1})).expect("object body");
        assert_eq!(metrics.tvl, 1.0);
        assert!(metrics.apy.is_nan());
    }

    #[test]
    fn non_object_bodies_yield_nan() {
        for body in [json!([1, 2]), json!("tvl"), json!(7)] {
            let metrics = TreasuryMetrics::from_json(&body).expect("not null");
            assert!(metrics.tvl.is_nan());
            assert!(metrics.apy.is_nan());
        }
    }

    #[test]
    fn null_body_is_decode_failure() {
        let failure = TreasuryMetrics::from_json(&Value::Null).expect_err("null body");
        assert_eq!(failure.status, None);
        assert_eq!(failure.code.as_deref(), Some("decode"));
    }

    #[test]
    fn malformed_json_is_decode_failure() {
        let failure = TreasuryMetrics::from_body("{not json").expect_err("malformed");
        assert!(failure.message.starts_with("invalid JSON in response body"));
        assert_eq!(failure.status, None);
    }
}
