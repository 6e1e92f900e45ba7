// aggregate.rs
// Groups energy records by year and derives production, consumption, loss, cost and per-capita figures.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};

use crate::cleaning::EnergyRecord;
use crate::error::{EnergyError, Result};
use crate::metrics::{Metric, MetricCategory, MetricTotals};

/// Aggregate row of the dataset that must not be summed with the individual countries.
pub const WORLD: &str = "World";

/// Cost of one TWh of lost energy, in thousands of USD.
pub const THOUSAND_USD_PER_TWH: f64 = 40.0;

/// Cost of one TWh of lost energy, in USD.
pub const USD_PER_TWH: f64 = 40_000.0;

/// Scale turning TWh per person into kWh per person.
pub const KWH_PER_TWH: f64 = 1e9;

/// Inclusive range of years.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearRange {
    pub min: i32,
    pub max: i32,
}

impl YearRange {
    pub fn new(min: i32, max: i32) -> Self {
        YearRange { min, max }
    }

    pub fn single(year: i32) -> Self {
        YearRange::new(year, year)
    }

    pub fn contains(&self, year: i32) -> bool {
        self.min <= year && year <= self.max
    }

    fn validate(&self) -> Result<()> {
        if self.min > self.max {
            return Err(EnergyError::InvalidYearRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    fn empty_result(&self) -> EnergyError {
        EnergyError::EmptyResult {
            min: self.min,
            max: self.max,
        }
    }
}

/// Unit costs applied to a net loss.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostModel {
    /// Multiplier for the raw cost figure.
    pub unit_cost: f64,
    /// USD per TWh, used for the cost in billions of USD.
    pub usd_per_twh: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        CostModel {
            unit_cost: THOUSAND_USD_PER_TWH,
            usd_per_twh: USD_PER_TWH,
        }
    }
}

/// Which records take part in an aggregation and how the derived figures are scaled.
#[derive(Debug, Clone)]
pub struct AggregationQuery {
    pub years: YearRange,
    pub exclude_countries: BTreeSet<String>,
    /// Restrict the aggregation to a single country.
    pub only_country: Option<String>,
    /// Records missing any of these metrics are dropped before grouping.
    pub require_complete: Vec<Metric>,
    pub cost: CostModel,
    /// Multiplier applied to the per-capita mean (1.0 keeps TWh per person).
    pub per_capita_scale: f64,
}

impl AggregationQuery {
    /// Query over `years` that leaves out the "World" row.
    pub fn new(years: YearRange) -> Self {
        AggregationQuery {
            years,
            exclude_countries: BTreeSet::from([WORLD.to_string()]),
            only_country: None,
            require_complete: Vec::new(),
            cost: CostModel::default(),
            per_capita_scale: 1.0,
        }
    }

    pub fn excluding<I, S>(mut self, countries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_countries = countries.into_iter().map(Into::into).collect();
        self
    }

    pub fn for_country(mut self, country: impl Into<String>) -> Self {
        self.only_country = Some(country.into());
        self
    }

    pub fn require_complete(mut self, metrics: &[Metric]) -> Self {
        self.require_complete = metrics.to_vec();
        self
    }

    pub fn with_cost(mut self, cost: CostModel) -> Self {
        self.cost = cost;
        self
    }

    pub fn with_per_capita_scale(mut self, scale: f64) -> Self {
        self.per_capita_scale = scale;
        self
    }

    pub fn with_years(mut self, years: YearRange) -> Self {
        self.years = years;
        self
    }

    fn selects(&self, record: &EnergyRecord) -> bool {
        self.years.contains(record.year)
            && !self.exclude_countries.contains(&record.country)
            && self
                .only_country
                .as_ref()
                .is_none_or(|country| &record.country == country)
            && self
                .require_complete
                .iter()
                .all(|&metric| record.get(metric).is_some())
    }
}

/// A net loss and what it costs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LossFigures {
    pub net_loss: f64,
    pub cost: f64,
    pub cost_billions: f64,
}

impl LossFigures {
    fn new(net_loss: f64, cost: &CostModel) -> Self {
        LossFigures {
            net_loss,
            cost: net_loss * cost.unit_cost,
            cost_billions: net_loss * cost.usd_per_twh / 1e9,
        }
    }
}

/// Summed and derived figures for one year.
#[derive(Debug, Clone, PartialEq)]
pub struct YearlyAggregate {
    pub year: i32,
    /// Number of records grouped into this year.
    pub record_count: usize,
    pub totals: MetricTotals,
    pub total_production: f64,
    pub total_consumption: f64,
    /// Total production minus total consumption.
    pub production_loss: LossFigures,
    /// Electricity generation minus electricity demand.
    pub generation_loss: LossFigures,
    /// Mean of the per-record consumption/population ratios; `None` when no record has one.
    pub energy_per_capita: Option<f64>,
    /// Records left out of the per-capita mean.
    pub undefined_ratios: usize,
}

impl YearlyAggregate {
    pub fn get(&self, metric: Metric) -> f64 {
        self.totals.get(metric)
    }

    pub fn net_loss(&self) -> f64 {
        self.production_loss.net_loss
    }

    pub fn cost_of_loss(&self) -> f64 {
        self.production_loss.cost
    }
}

/// One source's share of a single-year breakdown.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BreakdownEntry {
    pub metric: Metric,
    pub value: f64,
    /// Percentage of the category total; `None` when the total is not positive.
    pub share: Option<f64>,
}

/// Filters `records` per `query`, groups them by year and derives the yearly figures.
///
/// # Returns
/// * One `YearlyAggregate` per year that has records, ascending by year
///
/// # Errors
/// * `InvalidYearRange` when the range is reversed
/// * `MissingColumn` when a required metric has no value in any record
/// * `EmptyResult` when no record survives the filters
pub fn compute_yearly_aggregates(
    records: &[EnergyRecord],
    query: &AggregationQuery,
) -> Result<Vec<YearlyAggregate>> {
    query.years.validate()?;
    if records.is_empty() {
        return Err(query.years.empty_result());
    }
    check_required_metrics(records)?;

    let mut by_year: BTreeMap<i32, Vec<&EnergyRecord>> = BTreeMap::new();
    for record in records.iter().filter(|r| query.selects(r)) {
        by_year.entry(record.year).or_default().push(record);
    }

    if by_year.is_empty() {
        return Err(query.years.empty_result());
    }

    Ok(by_year
        .into_iter()
        .map(|(year, group)| aggregate_year(year, &group, query))
        .collect())
}

/// Per-source sums of `category` for a single year, with each source's share of the total.
pub fn breakdown(
    records: &[EnergyRecord],
    year: i32,
    category: MetricCategory,
    query: &AggregationQuery,
) -> Result<Vec<BreakdownEntry>> {
    let query = query.clone().with_years(YearRange::single(year));
    let aggregate = compute_yearly_aggregates(records, &query)?
        .into_iter()
        .next()
        .ok_or_else(|| query.years.empty_result())?;

    let metrics = category.metrics();
    let total = aggregate.totals.sum(metrics);

    Ok(metrics
        .iter()
        .map(|&metric| {
            let value = aggregate.get(metric);
            BreakdownEntry {
                metric,
                value,
                share: (total > 0.0).then(|| value / total * 100.0),
            }
        })
        .collect())
}

/// Arithmetic mean, `None` for an empty input.
pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

fn check_required_metrics(records: &[EnergyRecord]) -> Result<()> {
    for metric in Metric::REQUIRED {
        if records.iter().all(|r| r.get(metric).is_none()) {
            return Err(EnergyError::MissingColumn(metric.column().to_string()));
        }
    }
    Ok(())
}

fn aggregate_year(
    year: i32,
    group: &[&EnergyRecord],
    query: &AggregationQuery,
) -> YearlyAggregate {
    let mut totals = MetricTotals::default();
    let mut ratios = Vec::with_capacity(group.len());

    for record in group {
        for metric in Metric::ALL {
            if let Some(value) = record.get(metric) {
                totals.add(metric, value);
            }
        }

        match energy_per_capita(record) {
            Some(ratio) => ratios.push(ratio),
            None => debug!(
                "{} {}: per-capita ratio undefined (population {:?})",
                record.country,
                year,
                record.get(Metric::Population)
            ),
        }
    }

    let undefined_ratios = group.len() - ratios.len();
    if undefined_ratios > 0 {
        warn!(
            "{}: {} record(s) without a defined per-capita ratio left out of the mean",
            year, undefined_ratios
        );
    }

    let total_production = totals.sum(MetricCategory::Production.metrics());
    let total_consumption = totals.sum(MetricCategory::Consumption.metrics());
    let generation_net_loss =
        totals.get(Metric::ElectricityGeneration) - totals.get(Metric::ElectricityDemand);

    YearlyAggregate {
        year,
        record_count: group.len(),
        totals,
        total_production,
        total_consumption,
        production_loss: LossFigures::new(total_production - total_consumption, &query.cost),
        generation_loss: LossFigures::new(generation_net_loss, &query.cost),
        energy_per_capita: mean(ratios).map(|m| m * query.per_capita_scale),
        undefined_ratios,
    }
}

/// (fossil + renewables + nuclear) / population for one record.
/// Undefined when any term is missing or the population is zero.
fn energy_per_capita(record: &EnergyRecord) -> Option<f64> {
    let total_energy = MetricCategory::Consumption
        .metrics()
        .iter()
        .map(|&metric| record.get(metric))
        .sum::<Option<f64>>()?;
    let population = record.get(Metric::Population)?;

    let ratio = total_energy / population;
    ratio.is_finite().then_some(ratio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(clippy::too_many_arguments)]
    fn record(
        country: &str,
        year: i32,
        coal: f64,
        oil: f64,
        gas: f64,
        hydro: f64,
        renewables: f64,
        nuclear: f64,
        fossil: f64,
        population: f64,
    ) -> EnergyRecord {
        EnergyRecord {
            country: country.to_string(),
            year,
            coal_consumption: Some(coal),
            oil_consumption: Some(oil),
            gas_consumption: Some(gas),
            hydro_consumption: Some(hydro),
            renewables_consumption: Some(renewables),
            nuclear_consumption: Some(nuclear),
            fossil_fuel_consumption: Some(fossil),
            population: Some(population),
            ..Default::default()
        }
    }

    fn canada_2020() -> EnergyRecord {
        record("Canada", 2020, 10.0, 5.0, 0.0, 2.0, 3.0, 1.0, 15.0, 10.0)
    }

    fn usa_2020() -> EnergyRecord {
        record("USA", 2020, 20.0, 10.0, 5.0, 4.0, 6.0, 2.0, 35.0, 20.0)
    }

    fn query_2020() -> AggregationQuery {
        AggregationQuery::new(YearRange::single(2020))
    }

    #[test]
    fn test_two_country_scenario() {
        let records = vec![canada_2020(), usa_2020()];
        let result = compute_yearly_aggregates(&records, &query_2020()).unwrap();

        assert_eq!(result.len(), 1);
        let agg = &result[0];
        assert_eq!(agg.year, 2020);
        assert_eq!(agg.record_count, 2);
        assert!((agg.total_production - 68.0).abs() < 1e-6);
        assert!((agg.total_consumption - 62.0).abs() < 1e-6);
        assert!((agg.net_loss() - 6.0).abs() < 1e-6);
        assert!((agg.cost_of_loss() - 240.0).abs() < 1e-6);
        assert!((agg.production_loss.cost_billions - 6.0 * 40_000.0 / 1e9).abs() < 1e-12);
    }

    #[test]
    fn test_per_capita_is_mean_of_ratios() {
        let records = vec![canada_2020(), usa_2020()];
        let result = compute_yearly_aggregates(&records, &query_2020()).unwrap();
        let agg = &result[0];

        let per_capita = agg.energy_per_capita.unwrap();
        assert!((per_capita - 2.025).abs() < 1e-9);
        assert!((per_capita - 62.0 / 30.0).abs() > 1e-3);
        assert_eq!(agg.undefined_ratios, 0);
    }

    #[test]
    fn test_zero_population_is_left_out_of_mean() {
        let mut empty = record("Nowhere", 2020, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 3.0, 0.0);
        let records = vec![canada_2020(), usa_2020(), empty.clone()];
        let result = compute_yearly_aggregates(&records, &query_2020()).unwrap();
        let agg = &result[0];
        assert!((agg.energy_per_capita.unwrap() - 2.025).abs() < 1e-9);
        assert_eq!(agg.undefined_ratios, 1);
        // Still summed into the totals.
        assert!((agg.get(Metric::Coal) - 31.0).abs() < 1e-6);

        empty.population = None;
        let records = vec![canada_2020(), empty];
        let result = compute_yearly_aggregates(&records, &query_2020()).unwrap();
        let agg = &result[0];
        assert!((agg.energy_per_capita.unwrap() - 1.9).abs() < 1e-9);
        assert_eq!(agg.undefined_ratios, 1);
    }

    #[test]
    fn test_per_capita_undefined_when_no_ratio() {
        let mut only = canada_2020();
        only.population = Some(0.0);
        let result = compute_yearly_aggregates(&[only, canada_2020()], &query_2020()).unwrap();
        let agg = &result[0];
        assert!(agg.energy_per_capita.is_some());

        let mut a = canada_2020();
        a.population = Some(0.0);
        let mut b = usa_2020();
        b.nuclear_consumption = None;
        let mut c = canada_2020();
        c.year = 2021;
        let query = AggregationQuery::new(YearRange::new(2020, 2021));
        let result = compute_yearly_aggregates(&[a, b, c], &query).unwrap();
        assert_eq!(result[0].energy_per_capita, None);
        assert_eq!(result[0].undefined_ratios, 2);
        assert!(result[1].energy_per_capita.is_some());
    }

    #[test]
    fn test_per_capita_scale() {
        let records = vec![canada_2020(), usa_2020()];
        let query = query_2020().with_per_capita_scale(KWH_PER_TWH);
        let result = compute_yearly_aggregates(&records, &query).unwrap();
        let agg = &result[0];
        assert!((agg.energy_per_capita.unwrap() - 2.025e9).abs() < 1e-3);
    }

    #[test]
    fn test_world_row_is_excluded() {
        let world = record("World", 2020, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0, 100.0);
        let records = vec![canada_2020(), usa_2020(), world];

        let result = compute_yearly_aggregates(&records, &query_2020()).unwrap();
        let without = &result[0];
        assert!((without.total_production - 68.0).abs() < 1e-6);
        assert_eq!(without.record_count, 2);

        let everything = query_2020().excluding(Vec::<String>::new());
        let result = compute_yearly_aggregates(&records, &everything).unwrap();
        let with = &result[0];
        assert!((with.total_production - without.total_production).abs() > 1.0);
    }

    #[test]
    fn test_output_is_ascending_without_duplicate_years() {
        let mut records = Vec::new();
        for year in [2019, 2015, 2022, 2017, 2015, 2019] {
            let mut r = canada_2020();
            r.year = year;
            records.push(r);
        }
        let query = AggregationQuery::new(YearRange::new(2015, 2022));
        let result = compute_yearly_aggregates(&records, &query).unwrap();

        let years: Vec<i32> = result.iter().map(|a| a.year).collect();
        assert_eq!(years, vec![2015, 2017, 2019, 2022]);
        assert_eq!(result[0].record_count, 2);
        assert!(years.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_year_range_is_inclusive() {
        let mut records = Vec::new();
        for year in 2013..=2024 {
            let mut r = usa_2020();
            r.year = year;
            records.push(r);
        }
        let query = AggregationQuery::new(YearRange::new(2015, 2022));
        let result = compute_yearly_aggregates(&records, &query).unwrap();

        assert_eq!(result.first().unwrap().year, 2015);
        assert_eq!(result.last().unwrap().year, 2022);
        assert_eq!(result.len(), 8);
    }

    #[test]
    fn test_totals_are_non_negative_for_non_negative_input() {
        let records = vec![canada_2020(), usa_2020()];
        for agg in compute_yearly_aggregates(&records, &query_2020()).unwrap() {
            assert!(agg.total_production >= 0.0);
            assert!(agg.total_consumption >= 0.0);
        }
    }

    #[test]
    fn test_net_loss_may_be_negative() {
        let records = vec![record("Iceland", 2020, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 50.0, 1.0)];
        let result = compute_yearly_aggregates(&records, &query_2020()).unwrap();
        let agg = &result[0];
        assert!((agg.net_loss() - (6.0 - 52.0)).abs() < 1e-6);
        assert!(agg.cost_of_loss() < 0.0);
    }

    #[test]
    fn test_generation_loss_is_independent() {
        let mut canada = canada_2020();
        canada.electricity_generation = Some(50.0);
        canada.electricity_demand = Some(47.0);
        let mut usa = usa_2020();
        usa.electricity_generation = Some(100.0);
        usa.electricity_demand = None;

        let result = compute_yearly_aggregates(&[canada, usa], &query_2020()).unwrap();
        let agg = &result[0];
        assert!((agg.generation_loss.net_loss - 103.0).abs() < 1e-6);
        assert!((agg.generation_loss.cost_billions - 103.0 * 40_000.0 / 1e9).abs() < 1e-12);
        assert!((agg.net_loss() - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_missing_values_count_as_zero_in_sums() {
        let mut canada = canada_2020();
        canada.gas_consumption = None;
        canada.hydro_consumption = None;
        let result = compute_yearly_aggregates(&[canada, usa_2020()], &query_2020()).unwrap();
        let agg = &result[0];
        assert!((agg.total_production - 66.0).abs() < 1e-6);
    }

    #[test]
    fn test_country_view() {
        let mut canada_2021 = canada_2020();
        canada_2021.year = 2021;
        let records = vec![canada_2020(), usa_2020(), canada_2021];
        let query = AggregationQuery::new(YearRange::new(2020, 2021)).for_country("Canada");
        let result = compute_yearly_aggregates(&records, &query).unwrap();

        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|a| a.record_count == 1));
        assert!((result[0].total_production - 21.0).abs() < 1e-6);
    }

    #[test]
    fn test_require_complete_drops_partial_rows() {
        let mut canada = canada_2020();
        canada.electricity_generation = Some(50.0);
        let usa = usa_2020();
        let query = query_2020().require_complete(&[Metric::ElectricityGeneration]);
        let result = compute_yearly_aggregates(&[canada, usa], &query).unwrap();
        let agg = &result[0];

        assert_eq!(agg.record_count, 1);
        assert!((agg.total_production - 21.0).abs() < 1e-6);
    }

    #[test]
    fn test_empty_filter_result() {
        let records = vec![canada_2020()];
        let query = AggregationQuery::new(YearRange::new(1990, 1999));
        let err = compute_yearly_aggregates(&records, &query).unwrap_err();
        assert!(matches!(err, EnergyError::EmptyResult { min: 1990, max: 1999 }));

        let err = compute_yearly_aggregates(&[], &query_2020()).unwrap_err();
        assert!(matches!(err, EnergyError::EmptyResult { .. }));
    }

    #[test]
    fn test_missing_column_in_all_records() {
        let mut canada = canada_2020();
        canada.fossil_fuel_consumption = None;
        let mut usa = usa_2020();
        usa.fossil_fuel_consumption = None;

        let err = compute_yearly_aggregates(&[canada, usa], &query_2020()).unwrap_err();
        match err {
            EnergyError::MissingColumn(column) => assert_eq!(column, "fossil_fuel_consumption"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_reversed_year_range() {
        let query = AggregationQuery::new(YearRange::new(2022, 2015));
        let err = compute_yearly_aggregates(&[canada_2020()], &query).unwrap_err();
        assert!(matches!(err, EnergyError::InvalidYearRange { min: 2022, max: 2015 }));
    }

    #[test]
    fn test_breakdown_shares() {
        let mut canada = canada_2020();
        canada.solar_consumption = Some(1.0);
        canada.wind_consumption = Some(1.0);
        let mut usa = usa_2020();
        usa.solar_consumption = Some(2.0);
        usa.biofuel_consumption = Some(2.0);

        let entries =
            breakdown(&[canada, usa], 2020, MetricCategory::RenewablesDetail, &query_2020())
                .unwrap();
        let metrics: Vec<Metric> = entries.iter().map(|e| e.metric).collect();
        assert_eq!(
            metrics,
            vec![Metric::Hydro, Metric::Solar, Metric::Wind, Metric::Biofuel]
        );
        // hydro 6, solar 3, wind 1, biofuel 2
        assert!((entries[0].value - 6.0).abs() < 1e-6);
        assert!((entries[0].share.unwrap() - 50.0).abs() < 1e-6);
        let total: f64 = entries.iter().filter_map(|e| e.share).sum();
        assert!((total - 100.0).abs() < 1e-6);
    }

    #[test]
    fn test_breakdown_keeps_rows_without_generation() {
        let mut canada = canada_2020();
        canada.electricity_generation = Some(50.0);
        let usa = usa_2020();

        let entries =
            breakdown(&[canada, usa], 2020, MetricCategory::Fossil, &query_2020()).unwrap();
        // coal, oil, gas of both countries
        assert!((entries[0].value - 30.0).abs() < 1e-6);
        assert!((entries[1].value - 15.0).abs() < 1e-6);
        assert!((entries[2].value - 5.0).abs() < 1e-6);
    }

    #[test]
    fn test_breakdown_of_missing_year() {
        let err = breakdown(&[canada_2020()], 2022, MetricCategory::Fossil, &query_2020())
            .unwrap_err();
        assert!(matches!(err, EnergyError::EmptyResult { min: 2022, max: 2022 }));
    }

    #[test]
    fn test_breakdown_with_zero_total_has_no_shares() {
        let entries =
            breakdown(&[canada_2020()], 2020, MetricCategory::RenewablesDetail, &query_2020())
                .unwrap();
        // Only hydro is present for Canada.
        assert!(entries[0].share.is_some());

        let mut bare = canada_2020();
        bare.hydro_consumption = Some(0.0);
        let entries =
            breakdown(&[bare], 2020, MetricCategory::RenewablesDetail, &query_2020()).unwrap();
        assert!(entries.iter().all(|e| e.share.is_none()));
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(Vec::<f64>::new()), None);
        assert!((mean([1.0, 2.0, 4.5]).unwrap() - 2.5).abs() < 1e-9);
    }
}
