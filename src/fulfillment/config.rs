//! Solve configuration.

use crate::mip::{duration_from_secs, MipError, Provider, SolveOptions, Verbosity};
use std::time::Duration;

/// Default upper bound on every carton variable.
pub const DEFAULT_CARTON_UPPER_BOUND: f64 = 1000.0;

/// Configuration of one fulfillment solve.
///
/// # Examples
///
/// ```
/// use u_fulfill::fulfillment::FulfillmentConfig;
/// use u_fulfill::mip::{Provider, Verbosity};
///
/// let config = FulfillmentConfig::default()
///     .with_provider(Provider::MicroLp)
///     .with_max_duration_secs(30.0)
///     .unwrap()
///     .with_verbosity(Verbosity::Low);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct FulfillmentConfig {
    /// MIP backend.
    pub provider: Provider,

    /// Maximum solve duration. `None` = unbounded.
    pub max_duration: Option<Duration>,

    /// Relative optimality gap. 0 = prove optimality.
    pub mip_gap_relative: f64,

    /// Backend reporting level.
    pub verbosity: Verbosity,

    /// Upper bound of the carton variables. Raised per (DC, carrier) to
    /// `capacity / carton_volume` when that is larger.
    pub carton_upper_bound: f64,
}

impl Default for FulfillmentConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            max_duration: Some(Duration::from_secs(10)),
            mip_gap_relative: 0.0,
            verbosity: Verbosity::Off,
            carton_upper_bound: DEFAULT_CARTON_UPPER_BOUND,
        }
    }
}

impl FulfillmentConfig {
    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }

    pub fn with_max_duration(mut self, duration: Option<Duration>) -> Self {
        self.max_duration = duration;
        self
    }

    /// Sets the duration from seconds; `0` means unbounded.
    pub fn with_max_duration_secs(mut self, secs: f64) -> Result<Self, MipError> {
        self.max_duration = duration_from_secs(secs)?;
        Ok(self)
    }

    pub fn with_mip_gap_relative(mut self, gap: f64) -> Self {
        self.mip_gap_relative = gap;
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_carton_upper_bound(mut self, bound: f64) -> Self {
        self.carton_upper_bound = bound;
        self
    }

    /// Backend options derived from this configuration.
    pub fn solve_options(&self) -> SolveOptions {
        SolveOptions::default()
            .with_max_duration(self.max_duration)
            .with_mip_gap_relative(self.mip_gap_relative)
            .with_verbosity(self.verbosity)
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), MipError> {
        if !(self.carton_upper_bound.is_finite() && self.carton_upper_bound >= 0.0) {
            return Err(MipError::InvalidOption(format!(
                "carton_upper_bound must be finite and non-negative, got {}",
                self.carton_upper_bound
            )));
        }
        self.solve_options().validate()
    }
}
