// main.rs
// Loads the OWID energy dataset, aggregates it per year and prints loss, cost, breakdown and per-capita summaries.

mod aggregate;
mod cleaning;
mod config;
mod error;
mod metrics;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use aggregate::{breakdown, compute_yearly_aggregates};
use cleaning::load_energy_records;
use config::Config;
use metrics::{Metric, MetricCategory};

/// Rows missing any of these are left out of the generation-based loss.
const COMPLETE_ROW_METRICS: [Metric; 4] = [
    Metric::FossilFuel,
    Metric::Renewables,
    Metric::Nuclear,
    Metric::ElectricityGeneration,
];

/// Keeps going when an optional section has nothing to show.
fn optional<T>(section: &str, result: error::Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("Skipping {}: {}", section, err);
            None
        }
    }
}

/// Main program entry point:
/// - Loads the dataset
/// - Prints production/consumption loss and its cost over the loss window
/// - Prints long-run category trends, single-year breakdowns and per-capita figures
/// - Prints the generation-based loss and the country comparison
/// - Optionally saves the long-run aggregates to CSV
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let config = Config::parse();

    let records = load_energy_records(&config.data)
        .with_context(|| format!("failed to load {}", config.data.display()))?;

    info!("Computing distribution loss...");
    let loss = compute_yearly_aggregates(&records, &config.query(config.loss_window()))?;
    report::print_distribution_loss(&loss);
    report::print_category_trends(
        "Net Difference Between Production and Consumption (TWh)",
        &loss,
        MetricCategory::NetDifference,
        loss.len(),
    );
    report::print_cost_of_loss(&loss);

    info!("Computing long-run trends...");
    let history_query = config.query(config.history_window());
    let history = compute_yearly_aggregates(&records, &history_query)?;
    report::print_category_trends(
        "Energy Distribution Over Time (TWh)",
        &history,
        MetricCategory::Consumption,
        config.tail,
    );

    for category in [
        MetricCategory::RenewablesDetail,
        MetricCategory::Fossil,
        MetricCategory::Nuclear,
    ] {
        let entries = breakdown(&records, config.breakdown_year, category, &history_query);
        if let Some(entries) = optional(category.title(), entries) {
            report::print_breakdown(category, config.breakdown_year, &entries);
        }
    }

    report::print_category_trends(
        "Trends in Renewable Energy Sources Over Time (TWh)",
        &history,
        MetricCategory::RenewablesDetail,
        config.tail,
    );

    report::print_per_capita(&history, config.tail, config.per_capita_unit());
    report::print_category_trends(
        "Electricity Production Trends (TWh)",
        &history,
        MetricCategory::Production,
        config.tail,
    );

    info!("Computing generation-based loss...");
    let generation_query = config
        .query(config.cost_window())
        .require_complete(&COMPLETE_ROW_METRICS);
    let generation = compute_yearly_aggregates(&records, &generation_query);
    if let Some(generation) = optional("generation-based loss", generation) {
        report::print_generation_loss(&generation);
    }

    let country_query = history_query.clone().for_country(config.country.as_str());
    let country = compute_yearly_aggregates(&records, &country_query);
    if let Some(country) = optional(&config.country, country) {
        report::print_country_comparison(
            &config.country,
            &history,
            &country,
            config.tail,
            config.per_capita_unit(),
        );
    }

    if let Some(path) = &config.output {
        info!("Saving yearly aggregates to '{}'...", path.display());
        report::write_aggregates_csv(path, &history)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }

    info!("Done.");
    Ok(())
}
