// report.rs
// Printed summary tables and CSV export of the yearly aggregates.

use std::path::Path;

use csv::WriterBuilder;

use crate::aggregate::{BreakdownEntry, YearlyAggregate, mean};
use crate::error::Result;
use crate::metrics::{Metric, MetricCategory};

/// Last `n` items of a slice.
pub fn tail<T>(items: &[T], n: usize) -> &[T] {
    &items[items.len().saturating_sub(n)..]
}

fn print_title(title: &str) {
    println!("\n{}:\n", title);
}

fn print_rule(width: usize) {
    println!("{}", "-".repeat(width));
}

/// Production, consumption and net loss per year.
pub fn print_distribution_loss(data: &[YearlyAggregate]) {
    print_title("Global Distribution Loss Over Time (TWh)");
    println!(
        "{:<8} {:>18} {:>18} {:>18}",
        "Year", "Production", "Consumption", "Net Loss"
    );
    print_rule(64);

    for item in data {
        println!(
            "{:<8} {:>18.3} {:>18.3} {:>18.3}",
            item.year, item.total_production, item.total_consumption, item.net_loss()
        );
    }
}

/// Net loss and its cost in the configured unit.
pub fn print_cost_of_loss(data: &[YearlyAggregate]) {
    print_title("Cost of Global Energy Loss (thousand USD)");
    println!("{:<8} {:>18} {:>18}", "Year", "Net Loss", "Cost");
    print_rule(46);

    for item in data {
        println!(
            "{:<8} {:>18.3} {:>18.3}",
            item.year,
            item.net_loss(),
            item.cost_of_loss()
        );
    }
}

/// One column per metric of `category`, last `rows` years only.
pub fn print_category_trends(
    title: &str,
    data: &[YearlyAggregate],
    category: MetricCategory,
    rows: usize,
) {
    let metrics = category.metrics();
    let width = 8 + metrics.len() * 16;
    print_title(title);

    let mut header = format!("{:<8}", "Year");
    for metric in metrics {
        header.push_str(&format!(" {:>15}", metric.label()));
    }
    println!("{}", header);
    print_rule(width);

    for (year, values) in trend_rows(data, category, rows) {
        let mut line = format!("{:<8}", year);
        for value in values {
            line.push_str(&format!(" {:>15.3}", value));
        }
        println!("{}", line);
    }
}

/// Year and the summed value of each metric of `category`, last `rows` years only.
pub fn trend_rows(
    data: &[YearlyAggregate],
    category: MetricCategory,
    rows: usize,
) -> Vec<(i32, Vec<f64>)> {
    tail(data, rows)
        .iter()
        .map(|item| {
            let values = category.metrics().iter().map(|&m| item.get(m)).collect();
            (item.year, values)
        })
        .collect()
}

/// Sources of one category in a single year with their share of the category total.
pub fn print_breakdown(category: MetricCategory, year: i32, entries: &[BreakdownEntry]) {
    print_title(&format!("{} Breakdown ({})", category.title(), year));
    println!("{:<12} {:>15} {:>15}", "Source", "TWh", "Share");
    print_rule(44);

    for entry in entries {
        let share = entry
            .share
            .map(|s| format!("{:.1}%", s))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<12} {:>15.3} {:>15}",
            entry.metric.label(),
            entry.value,
            share
        );
    }
}

/// Mean per-capita consumption per year, with the count of records left out.
pub fn print_per_capita(data: &[YearlyAggregate], rows: usize, unit: &str) {
    print_title(&format!("Energy Consumption Per Capita ({})", unit));
    println!("{:<8} {:>22} {:>14}", "Year", "Per Capita", "Excluded");
    print_rule(46);

    for item in tail(data, rows) {
        println!(
            "{:<8} {:>22} {:>14}",
            item.year,
            format_optional(item.energy_per_capita),
            item.undefined_ratios
        );
    }
}

/// Generation against demand with the cost of the difference in billions of USD.
pub fn print_generation_loss(data: &[YearlyAggregate]) {
    print_title("Cost of Global Energy Loss Over Time (USD, billions)");
    println!(
        "{:<8} {:>16} {:>16} {:>16} {:>16}",
        "Year", "Generation", "Demand", "Net Loss", "Cost (B USD)"
    );
    print_rule(80);

    for item in data {
        println!(
            "{:<8} {:>16.3} {:>16.3} {:>16.3} {:>16.3}",
            item.year,
            item.get(Metric::ElectricityGeneration),
            item.get(Metric::ElectricityDemand),
            item.generation_loss.net_loss,
            item.generation_loss.cost_billions
        );
    }

    if let Some(mean_cost) = mean(data.iter().map(|a| a.generation_loss.cost_billions)) {
        println!("\nMean Cost: {:.2}B", mean_cost);
    }
}

/// Per-capita figures of two aggregations joined on year.
pub fn per_capita_comparison(
    world: &[YearlyAggregate],
    country: &[YearlyAggregate],
) -> Vec<(i32, Option<f64>, Option<f64>)> {
    let mut years: Vec<i32> = world.iter().chain(country).map(|a| a.year).collect();
    years.sort_unstable();
    years.dedup();

    let lookup = |data: &[YearlyAggregate], year: i32| {
        data.iter()
            .find(|a| a.year == year)
            .and_then(|a| a.energy_per_capita)
    };

    years
        .into_iter()
        .map(|year| (year, lookup(world, year), lookup(country, year)))
        .collect()
}

/// Per-capita figures of the world and one country side by side, last `rows` years only.
pub fn print_country_comparison(
    country_name: &str,
    world: &[YearlyAggregate],
    country: &[YearlyAggregate],
    rows: usize,
    unit: &str,
) {
    print_title(&format!(
        "Energy Consumption Per Capita, World vs. {} ({})",
        country_name, unit
    ));
    println!("{:<8} {:>22} {:>22}", "Year", "World", country_name);
    print_rule(56);

    let rows_data = per_capita_comparison(world, country);
    for (year, world_value, country_value) in tail(&rows_data, rows) {
        println!(
            "{:<8} {:>22} {:>22}",
            year,
            format_optional(*world_value),
            format_optional(*country_value)
        );
    }
}

fn format_optional(value: Option<f64>) -> String {
    value
        .map(|v| format!("{:.6e}", v))
        .unwrap_or_else(|| "undefined".to_string())
}

/// Writes one row per yearly aggregate to a CSV file.
pub fn write_aggregates_csv(path: &Path, data: &[YearlyAggregate]) -> Result<()> {
    let mut wtr = WriterBuilder::new().from_path(path)?;

    let mut header: Vec<String> = vec!["year".to_string(), "records".to_string()];
    header.extend(Metric::ALL.iter().map(|m| m.column().to_string()));
    header.extend(
        [
            "total_production",
            "total_consumption",
            "net_loss",
            "cost_of_loss",
            "cost_of_loss_billions",
            "generation_net_loss",
            "generation_cost_of_loss_billions",
            "energy_per_capita",
            "undefined_ratios",
        ]
        .map(String::from),
    );
    wtr.write_record(&header)?;

    for item in data {
        let mut row = vec![item.year.to_string(), item.record_count.to_string()];
        row.extend(Metric::ALL.iter().map(|&m| format!("{:.6}", item.get(m))));
        row.extend([
            format!("{:.6}", item.total_production),
            format!("{:.6}", item.total_consumption),
            format!("{:.6}", item.production_loss.net_loss),
            format!("{:.6}", item.production_loss.cost),
            format!("{:.6}", item.production_loss.cost_billions),
            format!("{:.6}", item.generation_loss.net_loss),
            format!("{:.6}", item.generation_loss.cost_billions),
            item.energy_per_capita
                .map(|v| v.to_string())
                .unwrap_or_default(),
            item.undefined_ratios.to_string(),
        ]);
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}
