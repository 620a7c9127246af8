//! One-year portfolio return simulation with correlated asset classes.
//!
//! Usage:
//!   cargo run --example portfolio_risk
//!   cargo run --example portfolio_risk -- --iterations 200000 --seed 7

use ferricsim::prelude::*;

fn arg<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::args()
        .skip_while(|a| a != name)
        .nth(1)
        .and_then(|v| v.parse().ok())
}

fn main() -> Result<()> {
    let iterations = arg("--iterations").unwrap_or(50_000);
    let seed = arg("--seed").unwrap_or(42);

    let weights = [0.45, 0.30, 0.15, 0.10];
    let inputs = vec![
        SimulationInput::from_spec(
            "equity",
            &InputDistribution::Normal {
                mean: 0.07,
                std_dev: 0.18,
            },
        )?,
        SimulationInput::from_spec(
            "credit",
            &InputDistribution::Triangular {
                min: -0.12,
                max: 0.09,
                mode: 0.045,
            },
        )?,
        SimulationInput::from_spec(
            "rates",
            &InputDistribution::Uniform {
                min: -0.04,
                max: 0.06,
            },
        )?,
        // Commodity returns as a shifted log-normal: exp(N(0, 0.3)) - 1.
        SimulationInput::from_spec(
            "commodity",
            &InputDistribution::LogNormal {
                mu: 0.0,
                sigma: 0.3,
            },
        )?
        .with_metadata("transform", "x - 1"),
    ];

    let correlation = vec![
        vec![1.0, 0.55, -0.25, 0.30],
        vec![0.55, 1.0, 0.10, 0.20],
        vec![-0.25, 0.10, 1.0, -0.15],
        vec![0.30, 0.20, -0.15, 1.0],
    ];

    let results = MonteCarloSimulation::new(iterations, move |x: &[f64]| {
        weights[0] * x[0] + weights[1] * x[1] + weights[2] * x[2] + weights[3] * (x[3] - 1.0)
    })
    .with_inputs(inputs)
    .with_correlation(correlation)
    .with_seed(seed)
    .run()?;

    let stats = results.statistics();
    println!("iterations     {}", stats.count);
    println!("mean return    {:+.4}", stats.mean);
    println!("std dev        {:.4}", stats.std_dev);
    println!("skewness       {:+.4}", stats.skewness);

    let p = results.percentiles();
    println!(
        "\npercentiles    p5 {:+.4}  p25 {:+.4}  p50 {:+.4}  p75 {:+.4}  p95 {:+.4}",
        p.p5, p.p25, p.p50, p.p75, p.p95
    );

    println!("\nconfidence     VaR        CVaR");
    for risk in results.tail_risk_report(&SUMMARY_TAIL_LEVELS) {
        println!(
            "{:>9.0}%   {:+.4}    {:+.4}",
            risk.confidence * 100.0,
            risk.value_at_risk,
            risk.conditional_value_at_risk
        );
    }

    println!("\nP(loss)        {:.2}%", 100.0 * results.probability_below(0.0));
    println!(
        "P(> 10%)       {:.2}%",
        100.0 * results.probability_above(0.10)
    );

    println!("\nhistogram");
    let histogram = results.histogram(16);
    let widest = histogram.bins().iter().map(|b| b.count).max().unwrap_or(1);
    for bin in histogram.bins() {
        let bar = "#".repeat(bin.count * 50 / widest.max(1));
        println!("{:+.3} {bar}", bin.midpoint());
    }

    Ok(())
}
