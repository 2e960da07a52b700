//! Typed access to the prediction service's four JSON endpoints.
//!
//! [`DashboardApi`] is the seam between the controller and the network: the
//! real implementation is [`ApiClient`], tests substitute canned replies.

pub mod client;
pub mod models;

use serde::de::DeserializeOwned;
use serde_json::Value;

pub use client::ApiClient;
pub use models::{
    BacktestResult, DatasetInfo, DateRange, FeatureImportanceReport, FeatureScore, Prediction,
    PredictionSet, Reply,
};

/// The four GET endpoints exposed by the prediction service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    DatasetInfo,
    Backtest,
    Predict,
    FeatureImportance,
}

impl Endpoint {
    pub const ALL: [Endpoint; 4] = [
        Endpoint::DatasetInfo,
        Endpoint::Backtest,
        Endpoint::Predict,
        Endpoint::FeatureImportance,
    ];

    pub const fn path(self) -> &'static str {
        match self {
            Self::DatasetInfo => "/api/dataset_info",
            Self::Backtest => "/api/backtest",
            Self::Predict => "/api/predict",
            Self::FeatureImportance => "/api/feature_importance",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

/// Why a fetch was rejected. In-band `error` fields are not fetch errors;
/// they arrive as [`Reply::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// The service answered with a non-2xx status.
    #[error("Network response was not ok")]
    Network { status: u16 },
    /// The request never produced a response (DNS, refused, reset).
    #[error("{0}")]
    Transport(String),
    /// The body was not JSON or did not match the expected shape.
    #[error("failed to parse response: {0}")]
    Parse(String),
}

/// Source of dashboard data.
///
/// Implementors only provide [`fetch_json`](DashboardApi::fetch_json); the
/// typed accessors decode the body into a [`Reply`].
pub trait DashboardApi {
    fn fetch_json(&self, endpoint: Endpoint) -> Result<Value, FetchError>;

    /// Where the data comes from, for display.
    fn base_url(&self) -> &str {
        ""
    }

    /// Whether the data source answers at all.
    fn is_reachable(&self) -> bool {
        self.fetch_json(Endpoint::DatasetInfo).is_ok()
    }

    fn dataset_info(&self) -> Result<Reply<DatasetInfo>, FetchError> {
        decode(self.fetch_json(Endpoint::DatasetInfo)?)
    }

    fn backtest(&self) -> Result<Reply<BacktestResult>, FetchError> {
        decode(self.fetch_json(Endpoint::Backtest)?)
    }

    fn predict(&self) -> Result<Reply<PredictionSet>, FetchError> {
        decode(self.fetch_json(Endpoint::Predict)?)
    }

    fn feature_importance(&self) -> Result<Reply<FeatureImportanceReport>, FetchError> {
        decode(self.fetch_json(Endpoint::FeatureImportance)?)
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<Reply<T>, FetchError> {
    Reply::from_value(value).map_err(|e| FetchError::Parse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_error_message_is_fixed() {
        let err = FetchError::Network { status: 500 };
        assert_eq!(err.to_string(), "Network response was not ok");
    }

    #[test]
    fn endpoint_paths() {
        let paths: Vec<&str> = Endpoint::ALL.iter().map(|e| e.path()).collect();
        assert_eq!(
            paths,
            vec![
                "/api/dataset_info",
                "/api/backtest",
                "/api/predict",
                "/api/feature_importance"
            ]
        );
    }

    struct Canned(&'static str);

    impl DashboardApi for Canned {
        fn fetch_json(&self, _endpoint: Endpoint) -> Result<Value, FetchError> {
            Ok(serde_json::from_str(self.0).unwrap())
        }
    }

    #[test]
    fn shape_mismatch_surfaces_as_parse_error() {
        let api = Canned(r#"{"accuracy": "high"}"#);
        assert!(matches!(api.backtest(), Err(FetchError::Parse(_))));
    }
}
