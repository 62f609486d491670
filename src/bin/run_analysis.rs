//! Run a buy-vs-rent analysis from the command line
//!
//! Prints the deterministic NPV comparison, writes the amortization
//! schedule as CSV, and optionally runs a Monte Carlo simulation over the
//! standard distribution set.

use anyhow::Context;
use clap::Parser;
use property_analytics::engine::{
    amortization_schedule, break_even_analysis, loan_summary, mortgage_terms,
    ownership_cash_flows, rental_cash_flows,
};
use property_analytics::simulation::standard_distributions;
use property_analytics::{compare, ModelParameters, SimulationConfig, SimulationEngine};
use std::fs::File;
use std::io::Write;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(about = "Buy-vs-rent NPV analysis with optional Monte Carlo simulation")]
struct Args {
    /// Property purchase price
    #[arg(long, default_value_t = 500_000.0)]
    price: f64,

    /// Down payment percentage (0-100)
    #[arg(long, default_value_t = 30.0)]
    down_payment: f64,

    /// Annual mortgage interest rate (percentage)
    #[arg(long, default_value_t = 5.0)]
    interest_rate: f64,

    /// Loan term in years
    #[arg(long, default_value_t = 20)]
    loan_term: u32,

    /// Current annual rent for the equivalent space
    #[arg(long, default_value_t = 24_000.0)]
    annual_rent: f64,

    /// Annual rent increase rate (percentage)
    #[arg(long, default_value_t = 3.0)]
    rent_growth: f64,

    /// Analysis horizon in years
    #[arg(long, default_value_t = 25)]
    horizon: u32,

    /// Discount rate for present values (percentage)
    #[arg(long, default_value_t = 8.0)]
    cost_of_capital: f64,

    /// Run a Monte Carlo simulation over the standard distributions
    #[arg(long)]
    monte_carlo: bool,

    /// Monte Carlo iteration count
    #[arg(long, default_value_t = 15_000)]
    iterations: u32,

    /// Fixed RNG seed for reproducible simulations
    #[arg(long)]
    seed: Option<u64>,

    /// Output path for the amortization schedule CSV
    #[arg(long, default_value = "amortization_schedule.csv")]
    schedule_output: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let params = ModelParameters {
        purchase_price: args.price,
        down_payment_pct: args.down_payment,
        interest_rate: args.interest_rate,
        loan_term: args.loan_term,
        analysis_period: args.horizon,
        current_annual_rent: args.annual_rent,
        rent_increase_rate: args.rent_growth,
        cost_of_capital: args.cost_of_capital,
        ..ModelParameters::default()
    }
    .resolve_defaults();

    let start = Instant::now();
    let result = compare(&params).context("NPV comparison failed")?;
    println!("NPV comparison complete in {:?}", start.elapsed());

    println!("\nBuy-vs-Rent Summary:");
    println!("  Ownership NPV:       ${:>15.2}", result.ownership_npv);
    println!("  Rental NPV:          ${:>15.2}", result.rental_npv);
    println!("  NPV difference:      ${:>15.2}", result.npv_difference);
    println!("  Terminal advantage:  ${:>15.2}", result.terminal_value_advantage);
    println!(
        "  Recommendation:      {} ({} confidence)",
        result.recommendation, result.confidence
    );

    let terms = mortgage_terms(&params);
    let summary = loan_summary(
        terms.loan_amount,
        terms.annual_payment,
        params.interest_rate,
        params.loan_term,
    );
    println!("\nLoan Summary:");
    println!("  Loan amount:         ${:>15.2}", terms.loan_amount);
    println!("  Annual payment:      ${:>15.2}", terms.annual_payment);
    println!("  Total interest:      ${:>15.2}", summary.total_interest);
    println!("  Effective rate:       {:>15.2}%", summary.effective_rate);

    let ownership_flows = ownership_cash_flows(&params)?;
    let rental_flows = rental_cash_flows(&params)?;
    let break_even = break_even_analysis(&ownership_flows, &rental_flows);
    match break_even.break_even_year {
        Some(year) => println!("  Annual break-even:    year {}", year),
        None => println!("  Annual break-even:    not reached within horizon"),
    }

    // Write the amortization schedule for inspection
    let schedule = amortization_schedule(
        terms.loan_amount,
        terms.annual_payment,
        params.interest_rate,
        params.loan_term,
    );
    let mut file = File::create(&args.schedule_output)
        .with_context(|| format!("failed to create {}", args.schedule_output))?;
    writeln!(
        file,
        "Year,BeginningBalance,Interest,Principal,EndingBalance,CumInterest,CumPrincipal"
    )?;
    for row in &schedule {
        writeln!(
            file,
            "{},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}",
            row.year,
            row.beginning_balance,
            row.interest_portion,
            row.principal_portion,
            row.ending_balance,
            row.cumulative_interest,
            row.cumulative_principal,
        )?;
    }
    println!("\nAmortization schedule written to {}", args.schedule_output);

    if args.monte_carlo {
        let config = SimulationConfig {
            seed: args.seed,
            ..Default::default()
        };
        let engine = SimulationEngine::new(config).context("failed to build simulation engine")?;
        let distributions = standard_distributions(&params);

        println!("\nRunning Monte Carlo simulation...");
        let sim_start = Instant::now();
        let mc = engine.run_monte_carlo(&params, &distributions, Some(args.iterations))?;
        println!("Simulation complete in {:?}", sim_start.elapsed());

        println!("\nMonte Carlo Summary:");
        println!("  Iterations:           {:>15}", mc.iterations_completed);
        println!("  Mean NPV difference: ${:>15.2}", mc.mean_npv);
        println!("  Std deviation:       ${:>15.2}", mc.std_dev);
        println!(
            "  P(ownership wins):    {:>14.1}%",
            mc.probability_positive * 100.0
        );
        for (level, value) in &mc.percentiles {
            println!("  P{:<2}:                 ${:>15.2}", level, value);
        }
        for (level, (lower, upper)) in &mc.confidence_intervals {
            println!(
                "  {}% CI:              [${:.2}, ${:.2}]",
                level, lower, upper
            );
        }
    }

    println!("\nTotal time: {:?}", start.elapsed());
    Ok(())
}
