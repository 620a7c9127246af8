//! Engine configuration and declarative simulation descriptions.
//!
//! Both types deserialize with defaults for every omitted field, so a configuration file only
//! needs to name what it changes.

use serde::{Deserialize, Serialize};

use crate::core::{Result, SimulationError};
use crate::mc::input::{InputDistribution, SimulationInput};
use crate::mc::simulation::{MonteCarloSimulation, Model};

/// Default number of iterations evaluated per work unit.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

/// Execution settings for [`MonteCarloSimulation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Base seed; `None` draws a fresh seed on every run.
    pub seed: Option<u64>,
    /// Iterations per chunk. Each chunk owns one random stream.
    pub chunk_size: usize,
    /// Spread chunks over the rayon pool. Ignored without the `parallel` feature.
    pub parallel: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            parallel: true,
        }
    }
}

impl SimulationConfig {
    /// Deterministic configuration with the given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(SimulationError::InvalidConfig(
                "chunk_size must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether this run actually uses the thread pool.
    pub(crate) fn runs_parallel(&self) -> bool {
        self.parallel && cfg!(feature = "parallel")
    }
}

/// One named input of a [`SimulationSpec`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    pub name: String,
    pub distribution: InputDistribution,
}

/// Serializable description of a simulation, minus the model.
///
/// ```rust
/// use ferricsim::mc::SimulationSpec;
///
/// let spec: SimulationSpec = serde_json::from_str(r#"{
///     "iterations": 1000,
///     "config": { "seed": 7 },
///     "inputs": [
///         { "name": "a", "distribution": { "type": "normal", "mean": 1.0, "std_dev": 0.5 } },
///         { "name": "b", "distribution": { "type": "uniform", "min": 0.0, "max": 2.0 } }
///     ],
///     "correlation": [[1.0, 0.3], [0.3, 1.0]]
/// }"#).unwrap();
///
/// let results = spec.into_simulation(|x: &[f64]| x[0] + x[1]).unwrap().run().unwrap();
/// assert_eq!(results.len(), 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSpec {
    pub iterations: usize,
    #[serde(default)]
    pub config: SimulationConfig,
    pub inputs: Vec<InputSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation: Option<Vec<Vec<f64>>>,
}

impl SimulationSpec {
    /// Builds the engine, validating every input distribution.
    ///
    /// Correlation and iteration checks are left to [`MonteCarloSimulation::run`].
    pub fn into_simulation<F>(self, model: F) -> Result<MonteCarloSimulation>
    where
        F: Fn(&[f64]) -> f64 + Send + Sync + 'static,
    {
        let inputs = self
            .inputs
            .iter()
            .map(|input| SimulationInput::from_spec(input.name.clone(), &input.distribution))
            .collect::<Result<Vec<_>>>()?;

        let model: Model = std::sync::Arc::new(model);
        let mut simulation = MonteCarloSimulation::from_model(self.iterations, model)
            .with_inputs(inputs)
            .with_config(self.config);
        if let Some(rows) = self.correlation {
            simulation = simulation.with_correlation(rows);
        }
        Ok(simulation)
    }
}
