//! Monte Carlo engine over scalar models of uncertain inputs.
//!
//! - `input`: type-erased input samplers and serializable distribution specs,
//! - `sample_matrix`: column-major `iterations x inputs` storage,
//! - `correlated`: Cholesky-based correlated normal vectors,
//! - `iman_conover`: rank-correlation imposition that preserves marginals,
//! - `config`: engine settings and declarative simulation specs,
//! - `simulation`: the chunked (optionally parallel) runner,
//! - `results`: outcome statistics and probability queries.

pub mod config;
pub mod correlated;
pub mod iman_conover;
pub mod input;
pub mod results;
pub mod sample_matrix;
pub mod simulation;

pub use config::{DEFAULT_CHUNK_SIZE, InputSpec, SimulationConfig, SimulationSpec};
pub use correlated::CorrelatedNormalGenerator;
pub use iman_conover::impose_rank_correlation;
pub use input::{InputDistribution, Sampler, SimulationInput};
pub use results::{SUMMARY_TAIL_LEVELS, SimulationResults, SimulationSummary};
pub use sample_matrix::SampleMatrix;
pub use simulation::{CancellationToken, Model, MonteCarloSimulation};
