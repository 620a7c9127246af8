//! Uncertain simulation inputs.
//!
//! A [`SimulationInput`] erases the concrete distribution behind a shared sampling closure
//! that draws from an explicitly supplied [`SimRng`]. Anything that can produce one scalar
//! per call qualifies: a `rand_distr` distribution, an empirical resampler, or a constant.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use rand_distr::{Distribution, Exp, LogNormal, Normal, Triangular, Uniform};
use serde::{Deserialize, Serialize};

use crate::core::{Result, SimulationError};
use crate::math::SimRng;

/// Type-erased sampling capability.
pub type Sampler = Arc<dyn Fn(&mut SimRng) -> f64 + Send + Sync>;

/// One named uncertain input of a simulation.
#[derive(Clone)]
pub struct SimulationInput {
    name: String,
    sampler: Sampler,
    metadata: HashMap<String, String>,
}

impl SimulationInput {
    /// Wraps a sampling closure.
    ///
    /// # Examples
    /// ```rust
    /// use ferricsim::mc::SimulationInput;
    ///
    /// let fixed_cost = SimulationInput::new("fixed_cost", |_rng| 1_250.0);
    /// assert_eq!(fixed_cost.name(), "fixed_cost");
    /// ```
    pub fn new<F>(name: impl Into<String>, sampler: F) -> Self
    where
        F: Fn(&mut SimRng) -> f64 + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            sampler: Arc::new(sampler),
            metadata: HashMap::new(),
        }
    }

    /// Wraps any `rand_distr` distribution over `f64`.
    pub fn from_distribution<D>(name: impl Into<String>, distribution: D) -> Self
    where
        D: Distribution<f64> + Send + Sync + 'static,
    {
        Self::new(name, move |rng: &mut SimRng| distribution.sample(rng))
    }

    /// Builds an input from a parametric description, validating its parameters.
    pub fn from_spec(name: impl Into<String>, spec: &InputDistribution) -> Result<Self> {
        let name = name.into();
        let input = match *spec {
            InputDistribution::Normal { mean, std_dev } => {
                build(name, Normal::new(mean, std_dev))?
            }
            InputDistribution::Uniform { min, max } => build(name, Uniform::new(min, max))?,
            InputDistribution::Triangular { min, max, mode } => {
                build(name, Triangular::new(min, max, mode))?
            }
            InputDistribution::Exponential { rate } => build(name, Exp::new(rate))?,
            InputDistribution::LogNormal { mu, sigma } => build(name, LogNormal::new(mu, sigma))?,
        };
        Ok(input.with_metadata("distribution", spec.family()))
    }

    /// An input that always returns `value`.
    pub fn constant(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, move |_: &mut SimRng| value)
    }

    /// Attaches a metadata entry (units, source, owner, ...).
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    /// Draws one value.
    #[inline]
    pub fn sample(&self, rng: &mut SimRng) -> f64 {
        (self.sampler)(rng)
    }
}

impl fmt::Debug for SimulationInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimulationInput")
            .field("name", &self.name)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

fn build<D, E>(name: String, distribution: std::result::Result<D, E>) -> Result<SimulationInput>
where
    D: Distribution<f64> + Send + Sync + 'static,
    E: fmt::Display,
{
    match distribution {
        Ok(d) => Ok(SimulationInput::from_distribution(name, d)),
        Err(e) => Err(SimulationError::InvalidDistribution {
            name,
            reason: e.to_string(),
        }),
    }
}

/// Parametric input distributions that can be described in configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputDistribution {
    Normal { mean: f64, std_dev: f64 },
    Uniform { min: f64, max: f64 },
    /// Triangular on `[min, max]` with peak at `mode`.
    Triangular { min: f64, max: f64, mode: f64 },
    /// Exponential with rate `lambda`.
    Exponential { rate: f64 },
    /// `exp(N(mu, sigma))`.
    LogNormal { mu: f64, sigma: f64 },
}

impl InputDistribution {
    /// Family name, as used in the serialized `type` tag.
    pub fn family(&self) -> &'static str {
        match self {
            Self::Normal { .. } => "normal",
            Self::Uniform { .. } => "uniform",
            Self::Triangular { .. } => "triangular",
            Self::Exponential { .. } => "exponential",
            Self::LogNormal { .. } => "log_normal",
        }
    }

    /// Theoretical mean.
    pub fn mean(&self) -> f64 {
        match *self {
            Self::Normal { mean, .. } => mean,
            Self::Uniform { min, max } => 0.5 * (min + max),
            Self::Triangular { min, max, mode } => (min + max + mode) / 3.0,
            Self::Exponential { rate } => 1.0 / rate,
            Self::LogNormal { mu, sigma } => (mu + 0.5 * sigma * sigma).exp(),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::math::{Stream, stream_rng};

    fn sample_mean(input: &SimulationInput, n: usize) -> f64 {
        let mut rng = stream_rng(11, Stream::Independent, 0);
        (0..n).map(|_| input.sample(&mut rng)).sum::<f64>() / n as f64
    }

    #[test]
    fn spec_inputs_match_theoretical_means() {
        let specs = [
            InputDistribution::Normal {
                mean: 100.0,
                std_dev: 10.0,
            },
            InputDistribution::Uniform { min: 2.0, max: 6.0 },
            InputDistribution::Triangular {
                min: 0.0,
                max: 3.0,
                mode: 1.5,
            },
            InputDistribution::Exponential { rate: 2.0 },
            InputDistribution::LogNormal {
                mu: 0.0,
                sigma: 0.25,
            },
        ];
        for spec in specs {
            let input = SimulationInput::from_spec("x", &spec).unwrap();
            let mean = sample_mean(&input, 50_000);
            assert_relative_eq!(mean, spec.mean(), max_relative = 0.02);
            assert_eq!(input.metadata()["distribution"], spec.family());
        }
    }

    #[test]
    fn invalid_parameters_are_rejected_with_input_name() {
        let err = SimulationInput::from_spec(
            "revenue",
            &InputDistribution::Normal {
                mean: 0.0,
                std_dev: -1.0,
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SimulationError::InvalidDistribution { ref name, .. } if name == "revenue"
        ));

        assert!(
            SimulationInput::from_spec("u", &InputDistribution::Uniform { min: 5.0, max: 1.0 })
                .is_err()
        );
        assert!(
            SimulationInput::from_spec("e", &InputDistribution::Exponential { rate: -3.0 })
                .is_err()
        );
    }

    #[test]
    fn constant_and_metadata() {
        let input = SimulationInput::constant("tax_rate", 0.21).with_metadata("unit", "fraction");
        let mut rng = stream_rng(1, Stream::Independent, 0);
        assert_eq!(input.sample(&mut rng), 0.21);
        assert_eq!(input.metadata().get("unit").map(String::as_str), Some("fraction"));
        assert!(format!("{input:?}").contains("tax_rate"));
    }

    #[test]
    fn spec_serializes_with_type_tag() {
        let spec = InputDistribution::Triangular {
            min: 1.0,
            max: 4.0,
            mode: 2.0,
        };
        let json = serde_json::to_string(&spec).unwrap();
        assert!(json.contains("\"type\":\"triangular\""), "{json}");
        let back: InputDistribution = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec);
    }
}
