// cleaning.rs
// This module handles loading and cleaning of the per-country, per-year energy dataset (OWID energy data layout).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use log::{debug, info};
use serde::Deserialize;

use crate::error::{EnergyError, Result};
use crate::metrics::Metric;

/// Struct representing a deserialized row from the CSV file.
/// Fields are mapped to the CSV column headers; empty or non-numeric cells become `None`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EnergyRecord {
    pub country: String,
    pub year: i32,

    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub coal_consumption: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub oil_consumption: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub gas_consumption: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub hydro_consumption: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub renewables_consumption: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub nuclear_consumption: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub solar_consumption: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub wind_consumption: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub biofuel_consumption: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub fossil_fuel_consumption: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub electricity_generation: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub electricity_demand: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    pub population: Option<f64>,
}

impl EnergyRecord {
    /// Value of a tracked metric. NaN and infinite cells count as missing.
    pub fn get(&self, metric: Metric) -> Option<f64> {
        let value = match metric {
            Metric::Coal => self.coal_consumption,
            Metric::Oil => self.oil_consumption,
            Metric::Gas => self.gas_consumption,
            Metric::Hydro => self.hydro_consumption,
            Metric::Renewables => self.renewables_consumption,
            Metric::Nuclear => self.nuclear_consumption,
            Metric::Solar => self.solar_consumption,
            Metric::Wind => self.wind_consumption,
            Metric::Biofuel => self.biofuel_consumption,
            Metric::FossilFuel => self.fossil_fuel_consumption,
            Metric::ElectricityGeneration => self.electricity_generation,
            Metric::ElectricityDemand => self.electricity_demand,
            Metric::Population => self.population,
        };
        value.filter(|v| v.is_finite())
    }
}

/// Reads and cleans the dataset at `file_path`.
///
/// # Arguments
/// * `file_path` - The path to the input CSV file
///
/// # Returns
/// * `Vec<EnergyRecord>` with one entry per parsable row, in file order
pub fn load_energy_records(file_path: &Path) -> Result<Vec<EnergyRecord>> {
    info!("Attempting to open file: {}", file_path.display());
    let file = File::open(file_path)?;
    read_energy_records(file)
}

/// Same as [`load_energy_records`] for any reader.
pub fn read_energy_records<R: Read>(reader: R) -> Result<Vec<EnergyRecord>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = rdr.headers()?.clone();
    debug!("Actual headers: {:?}", headers);
    check_required_columns(&headers)?;

    let mut records = Vec::new();
    let mut skipped_rows = 0;

    for result in rdr.deserialize::<EnergyRecord>() {
        match result {
            Ok(record) => records.push(record),
            Err(err) => {
                debug!("Skipping row: {}", err);
                skipped_rows += 1;
            }
        }
    }

    info!(
        "Parsed: {} valid rows | Skipped: {} rows",
        records.len(),
        skipped_rows
    );
    Ok(records)
}

fn check_required_columns(headers: &StringRecord) -> Result<()> {
    let required = ["country", "year"]
        .into_iter()
        .chain(Metric::REQUIRED.iter().map(|m| m.column()));

    for column in required {
        if !headers.iter().any(|h| h.trim() == column) {
            return Err(EnergyError::MissingColumn(column.to_string()));
        }
    }
    Ok(())
}
