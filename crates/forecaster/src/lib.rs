// Rust guideline compliant 2026-08-24

//! Forecaster component -- fits a linear trend and an exponential-smoothing
//! series over monthly aggregates and projects pessimistic/base/optimistic
//! scenarios for dispute volume and win rate.
//!
//! Entry points: [`Forecaster::scenarios`], [`Forecaster::timeline`],
//! [`LinearRegression::fit`], [`exponential_smoothing`]. Configuration via
//! [`ForecasterConfig::builder`].
//!
//! The win-rate regression is fed `0` for months with no decided disputes,
//! while the display timeline reports those months as `None`. These are two
//! deliberately different representations of "no data" (fit input vs.
//! chart value) and must not be conflated.

use domain::{MonthBucket, ScenarioBand};
use serde::Serialize;

// ---------------------------------------------------------------------------
// Business constants
// ---------------------------------------------------------------------------

/// Exponential-smoothing factor for the historical volume series.
pub const SMOOTHING_ALPHA: f64 = 0.4;
/// Pessimistic scenario: volume 20% above base.
pub const PESSIMISTIC_VOLUME_FACTOR: f64 = 1.20;
/// Optimistic scenario: volume 10% below base.
pub const OPTIMISTIC_VOLUME_FACTOR: f64 = 0.90;
/// Pessimistic scenario: win rate 8 percentage points below base.
pub const PESSIMISTIC_WIN_RATE_OFFSET: f64 = 8.0;
/// Optimistic scenario: win rate 5 percentage points above base.
pub const OPTIMISTIC_WIN_RATE_OFFSET: f64 = 5.0;
/// Upper bound on the forecast horizon, guarding against pathological input.
pub const MAX_HORIZON_MONTHS: usize = 24;

// ---------------------------------------------------------------------------
// ForecasterError
// ---------------------------------------------------------------------------

/// Errors that can occur while configuring forecasting.
///
/// Forecasting itself is total; only the config builder can fail.
#[derive(Debug, thiserror::Error)]
pub enum ForecasterError {
    /// The supplied configuration is invalid.
    #[error("invalid forecaster configuration: {reason}")]
    InvalidConfig {
        /// Human-readable description of the problem.
        reason: String,
    },
}

// ---------------------------------------------------------------------------
// ForecasterConfig + builder
// ---------------------------------------------------------------------------

/// Runtime configuration for a [`Forecaster`].
///
/// Construct via [`ForecasterConfig::builder`].
#[derive(Debug)]
pub struct ForecasterConfig {
    /// Number of future months to project (range: `[1, MAX_HORIZON_MONTHS]`).
    pub horizon_months: usize,
}

/// Builder for [`ForecasterConfig`].
///
/// Obtain via [`ForecasterConfig::builder`]; finalize with [`build`](Self::build).
#[derive(Debug)]
pub struct ForecasterConfigBuilder {
    horizon_months: usize,
}

impl ForecasterConfig {
    /// Create a builder. `horizon_months` is the only parameter.
    #[must_use]
    pub fn builder(horizon_months: usize) -> ForecasterConfigBuilder {
        ForecasterConfigBuilder { horizon_months }
    }
}

impl ForecasterConfigBuilder {
    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ForecasterError::InvalidConfig`] when `horizon_months` is
    /// zero or exceeds [`MAX_HORIZON_MONTHS`].
    #[must_use = "the Result must be checked; use ? or unwrap"]
    pub fn build(self) -> Result<ForecasterConfig, ForecasterError> {
        if self.horizon_months == 0 {
            return Err(ForecasterError::InvalidConfig {
                reason: "horizon_months must be >= 1".to_owned(),
            });
        }
        if self.horizon_months > MAX_HORIZON_MONTHS {
            return Err(ForecasterError::InvalidConfig {
                reason: format!("horizon_months must be <= {MAX_HORIZON_MONTHS}"),
            });
        }
        Ok(ForecasterConfig { horizon_months: self.horizon_months })
    }
}

// ---------------------------------------------------------------------------
// Linear regression
// ---------------------------------------------------------------------------

/// Ordinary-least-squares fit of a series indexed `0..n-1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRegression {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearRegression {
    /// Fit `series` by closed-form OLS over `x = 0..n-1`.
    ///
    /// Degenerate inputs never fail: fewer than two points give `slope = 0`
    /// and an intercept of the single known value (or 0 for an empty series),
    /// so `predict` simply echoes that value.
    #[must_use]
    pub fn fit(series: &[f64]) -> Self {
        let n = series.len();
        if n < 2 {
            return Self { slope: 0.0, intercept: series.first().copied().unwrap_or(0.0) };
        }
        #[expect(clippy::cast_precision_loss, reason = "series lengths are tiny")]
        let n_f = n as f64;
        let mean_x = (n_f - 1.0) / 2.0;
        let mean_y = series.iter().sum::<f64>() / n_f;
        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (i, &y) in series.iter().enumerate() {
            #[expect(clippy::cast_precision_loss, reason = "series lengths are tiny")]
            let dx = i as f64 - mean_x;
            numerator += dx * (y - mean_y);
            denominator += dx * dx;
        }
        // x values 0..n-1 are distinct, but keep the guard for totality.
        if denominator == 0.0 {
            return Self { slope: 0.0, intercept: mean_y };
        }
        let slope = numerator / denominator;
        Self { slope, intercept: mean_y - slope * mean_x }
    }

    /// Predicted value at index `x`.
    #[must_use]
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Predicted volume at index `x`: rounded, never negative.
    #[must_use]
    pub fn predict_volume(&self, x: f64) -> u64 {
        #[expect(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            reason = "clamped non-negative and far below u64::MAX"
        )]
        let v = self.predict(x).round().max(0.0) as u64;
        v
    }
}

/// Exponentially smooth `series` with factor `alpha`.
///
/// `S[0] = y[0]`, `S[i] = alpha * y[i] + (1 - alpha) * S[i-1]`.
/// Empty input yields empty output.
#[must_use]
pub fn exponential_smoothing(series: &[f64], alpha: f64) -> Vec<f64> {
    let mut smoothed = Vec::with_capacity(series.len());
    for &y in series {
        let next = match smoothed.last() {
            Some(&prev) => alpha * y + (1.0 - alpha) * prev,
            None => y,
        };
        smoothed.push(next);
    }
    smoothed
}

// ---------------------------------------------------------------------------
// Forecast outputs
// ---------------------------------------------------------------------------

/// Scenario projection for one future month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastPoint {
    /// Month label, `"YYYY-MM"`.
    pub label: String,
    /// Projected dispute volume.
    pub volume: ScenarioBand<u64>,
    /// Projected win rate in percent, one decimal, clamped to `[0, 100]`.
    pub win_rate: ScenarioBand<f64>,
}

/// One point of the combined historical + forecast timeline.
///
/// Historical months carry the actual fields and `None` forecasts; future
/// months carry forecasts and `None` actuals. A charting consumer renders
/// the whole series without branching.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelinePoint {
    /// Month label, `"YYYY-MM"`.
    pub label: String,
    /// Observed volume; `None` for forecast months.
    pub actual_volume: Option<u64>,
    /// Observed win rate in percent; `None` for forecast months *and* for
    /// historical months with no decided disputes (display form, not the
    /// fit-input zero).
    pub actual_win_rate: Option<f64>,
    /// Projected volume; `None` for historical months.
    pub forecast_volume: Option<ScenarioBand<u64>>,
    /// Projected win rate; `None` for historical months.
    pub forecast_win_rate: Option<ScenarioBand<f64>>,
}

/// Round to one decimal place (win rates are displayed at 0.1% granularity).
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Forecaster
// ---------------------------------------------------------------------------

/// Projects dispute volume and win-rate scenarios from monthly aggregates.
#[derive(Debug)]
pub struct Forecaster {
    config: ForecasterConfig,
}

impl Forecaster {
    /// Create a new forecaster from `config`.
    #[must_use]
    pub fn new(config: ForecasterConfig) -> Self {
        Self { config }
    }

    /// Project `config.horizon_months` scenario points from `buckets`.
    ///
    /// Fits one regression on the volume series and one on the win-rate
    /// series (undecided months contribute a zero to the fit). Each future
    /// month `i = 1..=horizon` is predicted at `x = n + i - 1` and widened
    /// into the pessimistic/base/optimistic band with the fixed business
    /// constants. Empty bucket input yields an empty forecast: with no
    /// anchor month there is nothing to extend.
    #[must_use]
    pub fn scenarios(&self, buckets: &[MonthBucket]) -> Vec<ForecastPoint> {
        let Some(last) = buckets.last() else {
            return Vec::new();
        };

        #[expect(clippy::cast_precision_loss, reason = "dispute counts are far below 2^52")]
        let volume_series: Vec<f64> = buckets.iter().map(|b| b.count as f64).collect();
        // Fit input: undecided months count as 0% (see module docs).
        let win_rate_series: Vec<f64> =
            buckets.iter().map(|b| b.win_rate().unwrap_or(0.0)).collect();

        let volume_reg = LinearRegression::fit(&volume_series);
        let win_rate_reg = LinearRegression::fit(&win_rate_series);
        log::debug!(
            "forecaster.scenarios: months={} horizon={} vol_slope={:.3} wr_slope={:.3}",
            buckets.len(),
            self.config.horizon_months,
            volume_reg.slope,
            win_rate_reg.slope
        );

        let n = buckets.len();
        let mut key = last.key;
        let mut points = Vec::with_capacity(self.config.horizon_months);
        for i in 1..=self.config.horizon_months {
            key = key.next();
            #[expect(clippy::cast_precision_loss, reason = "series lengths are tiny")]
            let x = (n + i - 1) as f64;

            let base_volume = volume_reg.predict_volume(x);
            #[expect(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                clippy::cast_precision_loss,
                reason = "scaled volume is non-negative and far below u64::MAX"
            )]
            let volume = ScenarioBand {
                pessimistic: (base_volume as f64 * PESSIMISTIC_VOLUME_FACTOR).round() as u64,
                base: base_volume,
                optimistic: (base_volume as f64 * OPTIMISTIC_VOLUME_FACTOR).round() as u64,
            };

            let base_wr = round1(win_rate_reg.predict(x)).clamp(0.0, 100.0);
            let win_rate = ScenarioBand {
                pessimistic: (base_wr - PESSIMISTIC_WIN_RATE_OFFSET).max(0.0),
                base: base_wr,
                optimistic: (base_wr + OPTIMISTIC_WIN_RATE_OFFSET).min(100.0),
            };

            points.push(ForecastPoint { label: key.label(), volume, win_rate });
        }
        points
    }

    /// Concatenate historical actuals with forecast points into one series.
    ///
    /// Historical months report the display-form win rate (`None` when no
    /// dispute was decided); forecast months carry the scenario bands.
    #[must_use]
    pub fn timeline(&self, buckets: &[MonthBucket]) -> Vec<TimelinePoint> {
        let mut timeline: Vec<TimelinePoint> = buckets
            .iter()
            .map(|b| TimelinePoint {
                label: b.key.label(),
                actual_volume: Some(b.count),
                actual_win_rate: b.win_rate().map(round1),
                forecast_volume: None,
                forecast_win_rate: None,
            })
            .collect();
        for point in self.scenarios(buckets) {
            timeline.push(TimelinePoint {
                label: point.label,
                actual_volume: None,
                actual_win_rate: None,
                forecast_volume: Some(point.volume),
                forecast_win_rate: Some(point.win_rate),
            });
        }
        timeline
    }

    /// Smoothed historical volume series (alpha = [`SMOOTHING_ALPHA`]).
    ///
    /// Used by trend reporting to de-noise month-over-month movement; not
    /// part of the scenario math.
    #[must_use]
    pub fn smoothed_volume(buckets: &[MonthBucket]) -> Vec<f64> {
        #[expect(clippy::cast_precision_loss, reason = "dispute counts are far below 2^52")]
        let series: Vec<f64> = buckets.iter().map(|b| b.count as f64).collect();
        exponential_smoothing(&series, SMOOTHING_ALPHA)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
