// config.rs
// Command-line configuration: input path, year windows, unit costs and output options.

use std::path::PathBuf;

use clap::Parser;

use crate::aggregate::{
    AggregationQuery, CostModel, KWH_PER_TWH, THOUSAND_USD_PER_TWH, USD_PER_TWH, WORLD,
    YearRange,
};

#[derive(Debug, Parser)]
#[command(
    name = "owid-energy-summary",
    about = "Yearly production, consumption and loss summaries of the OWID energy dataset"
)]
pub struct Config {
    /// Path to the energy dataset CSV.
    #[arg(default_value = "owid-energy-data.csv")]
    pub data: PathBuf,

    /// First year of the distribution loss window.
    #[arg(long, default_value_t = 2015)]
    pub from: i32,

    /// Last year of every window.
    #[arg(long, default_value_t = 2022)]
    pub to: i32,

    /// First year of the long-run trend tables.
    #[arg(long, default_value_t = 1965)]
    pub history_from: i32,

    /// First year of the generation-based cost table.
    #[arg(long, default_value_t = 2000)]
    pub cost_from: i32,

    /// Year of the renewables and fossil fuel breakdowns.
    #[arg(long, default_value_t = 2022)]
    pub breakdown_year: i32,

    /// Country compared against the rest of the world per capita.
    #[arg(long, default_value = "Canada")]
    pub country: String,

    /// Countries left out of every aggregation.
    #[arg(long = "exclude", default_values_t = vec![WORLD.to_string()])]
    pub exclude: Vec<String>,

    /// Cost multiplier per TWh of net loss (thousand USD).
    #[arg(long, default_value_t = THOUSAND_USD_PER_TWH)]
    pub unit_cost: f64,

    /// USD per TWh of net loss, for costs in billions.
    #[arg(long, default_value_t = USD_PER_TWH)]
    pub usd_per_twh: f64,

    /// Multiplier for per-capita figures (1e9 gives kWh per person).
    #[arg(long, default_value_t = 1.0)]
    pub per_capita_scale: f64,

    /// Rows shown from the end of long tables.
    #[arg(long, default_value_t = 5)]
    pub tail: usize,

    /// Write the long-run yearly aggregates to this CSV file.
    #[arg(long)]
    pub output: Option<PathBuf>,
}

impl Config {
    pub fn loss_window(&self) -> YearRange {
        YearRange::new(self.from, self.to)
    }

    pub fn history_window(&self) -> YearRange {
        YearRange::new(self.history_from, self.to)
    }

    pub fn cost_window(&self) -> YearRange {
        YearRange::new(self.cost_from, self.to)
    }

    pub fn cost_model(&self) -> CostModel {
        CostModel {
            unit_cost: self.unit_cost,
            usd_per_twh: self.usd_per_twh,
        }
    }

    /// Engine query over `years` carrying the configured exclusions, costs and scaling.
    pub fn query(&self, years: YearRange) -> AggregationQuery {
        AggregationQuery::new(years)
            .excluding(self.exclude.iter().cloned())
            .with_cost(self.cost_model())
            .with_per_capita_scale(self.per_capita_scale)
    }

    pub fn per_capita_unit(&self) -> &'static str {
        if self.per_capita_scale == 1.0 {
            "TWh per person"
        } else if self.per_capita_scale == KWH_PER_TWH {
            "kWh per person"
        } else {
            "scaled units per person"
        }
    }
}
