//! Element ids the dashboard page must provide.

pub const TRAINING_SAMPLES: &str = "training-samples";
pub const FORWARD_SAMPLES: &str = "forward-samples";
pub const FEATURES_COUNT: &str = "features-count";
pub const DATE_RANGE: &str = "date-range";
pub const STATUS: &str = "status";
pub const MARKET_INFO: &str = "market-info";

pub const BACKTEST_RESULTS: &str = "backtest-results";
pub const BACKTEST_LOADING: &str = "backtest-loading";
/// Optional: the backtest runner skips it when absent.
pub const OVERVIEW_MESSAGE: &str = "overview-message";

pub const PREDICTIONS_RESULTS: &str = "predictions-results";
pub const PREDICTIONS_LOADING: &str = "predictions-loading";

pub const FEATURE_CHART: &str = "feature-chart";
pub const ANALYSIS_LOADING: &str = "analysis-loading";
pub const ANALYSIS_MESSAGE: &str = "analysis-message";

pub const REQUIRED: [&str; 14] = [
    TRAINING_SAMPLES,
    FORWARD_SAMPLES,
    FEATURES_COUNT,
    DATE_RANGE,
    STATUS,
    MARKET_INFO,
    BACKTEST_RESULTS,
    BACKTEST_LOADING,
    OVERVIEW_MESSAGE,
    PREDICTIONS_RESULTS,
    PREDICTIONS_LOADING,
    FEATURE_CHART,
    ANALYSIS_LOADING,
    ANALYSIS_MESSAGE,
];
