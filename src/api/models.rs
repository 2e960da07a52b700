/// Response shapes for the four prediction-service endpoints.
///
/// Every body is first inspected for an in-band `error` key (see
/// [`Reply::from_value`]); only when it is absent is the body decoded into
/// the typed payload.
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Reply envelope
// ---------------------------------------------------------------------------

/// A decoded response body: either the service reported a domain failure,
/// or it returned the expected payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    /// The body carried an `error` field. Nothing else in it is meaningful.
    Failed(String),
    /// The body decoded into the expected payload.
    Data(T),
}

impl<T: DeserializeOwned> Reply<T> {
    /// Decode a JSON body, short-circuiting on a truthy `error` field.
    ///
    /// `null`, `false`, `0` and the empty string do not count as an error.
    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        match value.get("error") {
            None | Some(Value::Null) | Some(Value::Bool(false)) => {}
            Some(Value::String(s)) if s.is_empty() => {}
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => {}
            Some(Value::String(s)) => return Ok(Self::Failed(s.clone())),
            Some(other) => return Ok(Self::Failed(other.to_string())),
        }
        serde_json::from_value(value).map(Self::Data)
    }
}

impl<T> Reply<T> {
    /// Convert into a `Result`, with the in-band message as the error.
    pub fn into_result(self) -> Result<T, String> {
        match self {
            Self::Failed(msg) => Err(msg),
            Self::Data(data) => Ok(data),
        }
    }
}

// ---------------------------------------------------------------------------
// GET /api/dataset_info
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetInfo {
    pub training_samples: u64,
    pub forward_samples: u64,
    pub features_count: u64,
    pub date_range: DateRange,
    /// Market name, e.g. `"US"` or `"Indian"`. Older services omit it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub market: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: String,
    pub end: String,
}

// ---------------------------------------------------------------------------
// GET /api/backtest
// ---------------------------------------------------------------------------

/// Out-of-sample evaluation of the classifier.
///
/// `accuracy` and `precision` are ratios in `[0, 1]`; the three return
/// fields are already expressed in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub accuracy: f64,
    pub precision: f64,
    pub total_trades: u64,
    pub avg_stock_return: f64,
    pub avg_market_return: f64,
    pub outperformance: f64,
}

// ---------------------------------------------------------------------------
// GET /api/predict
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionSet {
    pub total_stocks: u64,
    #[serde(default)]
    pub predicted_stocks: Vec<String>,
    #[serde(default)]
    pub detailed_predictions: Vec<Prediction>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub ticker: String,
    /// Probability of the positive (outperform) class, in `[0, 1]`.
    pub probability: f64,
}

// ---------------------------------------------------------------------------
// GET /api/feature_importance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportanceReport {
    #[serde(default)]
    pub features: Vec<FeatureScore>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureScore {
    pub feature: String,
    pub importance: f64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_field_short_circuits_decoding() {
        let body = json!({ "error": "keystats.csv not found", "accuracy": 0.9 });
        let reply = Reply::<BacktestResult>::from_value(body).unwrap();
        assert_eq!(reply, Reply::Failed("keystats.csv not found".to_string()));
    }

    #[test]
    fn empty_or_null_error_is_not_a_failure() {
        let body = json!({ "error": "", "features": [] });
        let reply = Reply::<FeatureImportanceReport>::from_value(body).unwrap();
        assert!(matches!(reply, Reply::Data(ref r) if r.features.is_empty()));

        let body = json!({ "error": null, "features": [] });
        let reply = Reply::<FeatureImportanceReport>::from_value(body).unwrap();
        assert!(matches!(reply, Reply::Data(_)));
    }

    #[test]
    fn zero_or_false_error_is_not_a_failure() {
        for error in [json!(0), json!(0.0), json!(false)] {
            let body = json!({ "error": error, "features": [] });
            let reply = Reply::<FeatureImportanceReport>::from_value(body).unwrap();
            assert!(matches!(reply, Reply::Data(_)), "error = {error}");
        }

        let body = json!({ "error": 1, "features": [] });
        let reply = Reply::<FeatureImportanceReport>::from_value(body).unwrap();
        assert_eq!(reply, Reply::Failed("1".to_string()));
    }

    #[test]
    fn non_string_error_is_stringified() {
        let body = json!({ "error": { "code": 7 } });
        let reply = Reply::<PredictionSet>::from_value(body).unwrap();
        assert_eq!(reply, Reply::Failed(r#"{"code":7}"#.to_string()));
    }

    #[test]
    fn dataset_info_without_market_fields_decodes() {
        let body = json!({
            "training_samples": 12345,
            "forward_samples": 400,
            "features_count": 42,
            "date_range": { "start": "2003-01-02", "end": "2013-12-31" }
        });
        let info = Reply::<DatasetInfo>::from_value(body)
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(info.training_samples, 12345);
        assert_eq!(info.market, None);
        assert_eq!(info.date_range.end, "2013-12-31");
    }

    #[test]
    fn missing_required_field_is_a_decode_error() {
        let body = json!({ "accuracy": 0.8 });
        assert!(Reply::<BacktestResult>::from_value(body).is_err());
    }

    #[test]
    fn prediction_set_preserves_order() {
        let body = json!({
            "total_stocks": 2,
            "predicted_stocks": ["MSFT", "AAPL"],
            "detailed_predictions": [
                { "ticker": "AAPL", "probability": 0.81 },
                { "ticker": "MSFT", "probability": 0.64 }
            ]
        });
        let set = Reply::<PredictionSet>::from_value(body)
            .unwrap()
            .into_result()
            .unwrap();
        assert_eq!(set.predicted_stocks, vec!["MSFT", "AAPL"]);
        assert_eq!(set.detailed_predictions[0].ticker, "AAPL");
    }
}
