// metrics.rs
// Typed names for the numeric columns of the energy dataset and the groupings the reports use.

/// A tracked numeric column of an energy record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Coal,
    Oil,
    Gas,
    Hydro,
    Renewables,
    Nuclear,
    Solar,
    Wind,
    Biofuel,
    FossilFuel,
    ElectricityGeneration,
    ElectricityDemand,
    Population,
}

impl Metric {
    pub const COUNT: usize = 13;

    pub const ALL: [Metric; Metric::COUNT] = [
        Metric::Coal,
        Metric::Oil,
        Metric::Gas,
        Metric::Hydro,
        Metric::Renewables,
        Metric::Nuclear,
        Metric::Solar,
        Metric::Wind,
        Metric::Biofuel,
        Metric::FossilFuel,
        Metric::ElectricityGeneration,
        Metric::ElectricityDemand,
        Metric::Population,
    ];

    /// Columns every dataset must carry for the production, consumption and per-capita figures.
    pub const REQUIRED: [Metric; 8] = [
        Metric::Coal,
        Metric::Oil,
        Metric::Gas,
        Metric::Hydro,
        Metric::Renewables,
        Metric::Nuclear,
        Metric::FossilFuel,
        Metric::Population,
    ];

    /// Header name of the column in the source CSV.
    pub fn column(self) -> &'static str {
        match self {
            Metric::Coal => "coal_consumption",
            Metric::Oil => "oil_consumption",
            Metric::Gas => "gas_consumption",
            Metric::Hydro => "hydro_consumption",
            Metric::Renewables => "renewables_consumption",
            Metric::Nuclear => "nuclear_consumption",
            Metric::Solar => "solar_consumption",
            Metric::Wind => "wind_consumption",
            Metric::Biofuel => "biofuel_consumption",
            Metric::FossilFuel => "fossil_fuel_consumption",
            Metric::ElectricityGeneration => "electricity_generation",
            Metric::ElectricityDemand => "electricity_demand",
            Metric::Population => "population",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Metric::Coal => "Coal",
            Metric::Oil => "Oil",
            Metric::Gas => "Gas",
            Metric::Hydro => "Hydro",
            Metric::Renewables => "Renewables",
            Metric::Nuclear => "Nuclear",
            Metric::Solar => "Solar",
            Metric::Wind => "Wind",
            Metric::Biofuel => "Biofuel",
            Metric::FossilFuel => "Fossil",
            Metric::ElectricityGeneration => "Generation",
            Metric::ElectricityDemand => "Demand",
            Metric::Population => "Population",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Named selections of metrics, used instead of ad hoc lists of column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricCategory {
    /// Coal, oil, gas, hydro, renewables and nuclear: summed into total production.
    Production,
    /// Fossil fuels, renewables and nuclear: summed into total consumption.
    Consumption,
    Fossil,
    RenewablesDetail,
    /// Per-source figures shown in the net difference table.
    NetDifference,
    Nuclear,
}

impl MetricCategory {
    pub fn metrics(self) -> &'static [Metric] {
        match self {
            MetricCategory::Production => &[
                Metric::Coal,
                Metric::Oil,
                Metric::Gas,
                Metric::Hydro,
                Metric::Renewables,
                Metric::Nuclear,
            ],
            MetricCategory::Consumption => {
                &[Metric::FossilFuel, Metric::Renewables, Metric::Nuclear]
            }
            MetricCategory::Fossil => &[Metric::Coal, Metric::Oil, Metric::Gas],
            MetricCategory::RenewablesDetail => {
                &[Metric::Hydro, Metric::Solar, Metric::Wind, Metric::Biofuel]
            }
            MetricCategory::NetDifference => {
                &[Metric::Coal, Metric::Gas, Metric::Oil, Metric::Hydro]
            }
            MetricCategory::Nuclear => &[Metric::Nuclear],
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            MetricCategory::Production => "Production",
            MetricCategory::Consumption => "Consumption",
            MetricCategory::Fossil => "Fossil Fuel",
            MetricCategory::RenewablesDetail => "Renewable Energy",
            MetricCategory::NetDifference => "Net Difference",
            MetricCategory::Nuclear => "Nuclear",
        }
    }
}

/// Per-metric sums for one grouping of records.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricTotals([f64; Metric::COUNT]);

impl MetricTotals {
    pub fn get(&self, metric: Metric) -> f64 {
        self.0[metric.index()]
    }

    pub fn add(&mut self, metric: Metric, value: f64) {
        self.0[metric.index()] += value;
    }

    pub fn sum(&self, metrics: &[Metric]) -> f64 {
        metrics.iter().map(|&m| self.get(m)).sum()
    }
}
