//! Orbital study over fully-populated rows
//!
//! Works from the means of the filtered table: a Kepler estimate of the
//! typical semimajor axis, the observed mean axis with an interval and a
//! t-test against a hypothesised value, per-row orbital speeds, the Hill
//! radius of the "mean planet", and the transit probability with an
//! expected-count comparison.

use crate::derived::{
    hill_radius, orbital_velocities, semimajor_axis, transit_probability, AU_M,
    EARTH_HILL_RADIUS_AU, JUPITER_MASS_KG, JUPITER_RADIUS_AU, SECONDS_PER_DAY, SOLAR_MASS_KG,
    SOLAR_RADIUS_AU,
};
use crate::error::{InferenceError, Result};
use crate::filter::{filter, FilterPredicate, FilterSpec};
use crate::hypothesis::{
    expected_count_test, normality_test, one_sample_t_test_from, subsample, Alternative,
    ExpectedCountResult, HypothesisTestResult, NormalityResult, ShapiroWilk,
    MAX_NORMALITY_SAMPLE,
};
use crate::interval::{estimate, ConfidenceInterval, IntervalMethod, SigmaSource};
use crate::schema;
use crate::stats::{describe, HistogramSpec, Sample, SampleStatistics};
use crate::table::{ColumnType, Table};
use serde::Serialize;

/// Every expected numeric column present and a non-blank host name
pub fn completeness_filter() -> FilterSpec {
    schema::EXPECTED_COLUMNS
        .iter()
        .fold(FilterSpec::all(), |spec, &(column, column_type)| {
            spec.and(match column_type {
                ColumnType::Numeric => FilterPredicate::present(column),
                ColumnType::Text => FilterPredicate::non_empty(column),
            })
        })
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrbitalAnalysis {
    pub filter: FilterSpec,
    pub confidence_level: f64,
    pub alpha: f64,
    /// Mean semimajor axis under the null hypothesis (AU)
    pub hypothesised_axis_au: f64,
    pub alternative: Alternative,
    /// Systems observed for the expected-count comparison
    pub observations: u64,
    pub observed_transits: u64,
    /// Seed for the normality-test subsample
    pub seed: u64,
    pub bins: usize,
}

impl Default for OrbitalAnalysis {
    fn default() -> Self {
        Self {
            filter: completeness_filter(),
            confidence_level: 0.95,
            alpha: 0.05,
            hypothesised_axis_au: 1.0,
            alternative: Alternative::Less,
            observations: 1000,
            observed_transits: 112,
            seed: 42,
            bins: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrbitalReport {
    pub rows: usize,
    pub star_mass_normality: NormalityResult,
    pub star_mass_histogram: HistogramSpec,
    /// Solar masses
    pub mean_star_mass: f64,
    /// Jupiter masses
    pub mean_planet_mass: f64,
    /// Days
    pub mean_period: f64,
    /// Kepler's third law applied to the means (AU)
    pub kepler_axis_au: f64,
    /// Observed semimajor axis (AU)
    pub axis: SampleStatistics,
    pub axis_interval: ConfidenceInterval,
    pub axis_test: HypothesisTestResult,
    /// Per-row orbital speed (m/s)
    pub velocity: SampleStatistics,
    pub velocity_interval: ConfidenceInterval,
    pub velocity_histogram: HistogramSpec,
    /// Hill radius of the mean planet (m)
    pub hill_radius_m: f64,
    /// Hill radius relative to Earth's
    pub hill_radius_earth_ratio: f64,
    pub transit_probability: f64,
    pub expected_transits: ExpectedCountResult,
}

impl OrbitalAnalysis {
    pub fn run(&self, raw: &Table) -> Result<OrbitalReport> {
        let table = filter(raw, &self.filter)?;
        let rows = table.row_count();
        if rows == 0 {
            return Err(InferenceError::insufficient("orbital study", 1, 0));
        }
        tracing::debug!("orbital study over {rows} complete rows");

        let mean_of =
            |column: &str| -> Result<f64> { Ok(describe(&table.sample(column)?)?.mean()) };

        // Normality of stellar masses
        let star_mass = table.sample(schema::STAR_MASS)?;
        let tested = subsample(&star_mass, MAX_NORMALITY_SAMPLE, self.seed);
        let star_mass_normality = normality_test(&ShapiroWilk, &tested, self.alpha)?;
        let mean_star_mass = describe(&star_mass)?.mean();

        // Kepler estimate from the means
        let mean_planet_mass = mean_of(schema::PLANET_MASS)?;
        let mean_period = mean_of(schema::ORBITAL_PERIOD)?;
        let star_kg = mean_star_mass * SOLAR_MASS_KG;
        let planet_kg = mean_planet_mass * JUPITER_MASS_KG;
        let kepler_axis_au =
            semimajor_axis(star_kg + planet_kg, mean_period * SECONDS_PER_DAY)? / AU_M;

        // Observed semimajor axis
        let axis = describe(&table.sample(schema::SEMIMAJOR_AXIS)?)?;
        let axis_interval = estimate(
            &IntervalMethod::Normal {
                sigma: SigmaSource::Sample,
            },
            &axis,
            self.confidence_level,
        )?;
        let axis_test = one_sample_t_test_from(
            &axis,
            self.hypothesised_axis_au,
            self.alternative,
            self.alpha,
        )?;

        // Per-row orbital speed
        let axes_m: Vec<f64> = table
            .numeric_values(schema::SEMIMAJOR_AXIS)?
            .into_iter()
            .map(|a| a * AU_M)
            .collect();
        let periods_s: Vec<f64> = table
            .numeric_values(schema::ORBITAL_PERIOD)?
            .into_iter()
            .map(|p| p * SECONDS_PER_DAY)
            .collect();
        let velocities = Sample::from_finite(orbital_velocities(&axes_m, &periods_s)?);
        let velocity = describe(&velocities)?;
        let velocity_interval =
            estimate(&IntervalMethod::StudentT, &velocity, self.confidence_level)?;

        // Hill radius and transit probability of the mean planet
        let hill_radius_m = hill_radius(axis.mean() * AU_M, planet_kg, star_kg)?;
        let hill_radius_earth_ratio = hill_radius_m / AU_M / EARTH_HILL_RADIUS_AU;

        let star_radius_au = mean_of(schema::STAR_RADIUS)? * SOLAR_RADIUS_AU;
        let planet_radius_au = mean_of(schema::PLANET_RADIUS)? * JUPITER_RADIUS_AU;
        let transit_probability =
            transit_probability(star_radius_au, planet_radius_au, axis.mean())?;
        let expected_transits = expected_count_test(
            self.observations,
            transit_probability,
            self.observed_transits,
        )?;

        Ok(OrbitalReport {
            rows,
            star_mass_histogram: HistogramSpec::new(
                "Stellar mass (solar masses)",
                self.bins,
                star_mass,
            )?,
            star_mass_normality,
            mean_star_mass,
            mean_planet_mass,
            mean_period,
            kepler_axis_au,
            axis,
            axis_interval,
            axis_test,
            velocity,
            velocity_interval,
            velocity_histogram: HistogramSpec::new("Orbital speed (m/s)", self.bins, velocities)?,
            hill_radius_m,
            hill_radius_earth_ratio,
            transit_probability,
            expected_transits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hypothesis::Decision;
    use crate::table::Column;

    /// Six hot-Jupiter-like rows with every expected column, plus one row
    /// missing its stellar radius
    fn archive() -> Table {
        let numeric = |values: [f64; 7]| values.iter().map(|&v| Some(v)).collect::<Vec<_>>();
        let mut columns = vec![Column::text(
            schema::HOST_NAME,
            (0..7).map(|i| Some(format!("Kepler-{i}"))).collect(),
        )];
        columns.push(Column::numeric(schema::PLANET_COUNT, numeric([1.0; 7])));
        columns.push(Column::numeric(
            schema::ORBITAL_PERIOD,
            numeric([3.0, 4.5, 2.0, 10.0, 5.5, 7.0, 3.0]),
        ));
        columns.push(Column::numeric(
            schema::SEMIMAJOR_AXIS,
            numeric([0.04, 0.05, 0.03, 0.09, 0.06, 0.07, 0.04]),
        ));
        columns.push(Column::numeric(schema::ECCENTRICITY, numeric([0.01; 7])));
        columns.push(Column::numeric(schema::INCLINATION, numeric([88.0; 7])));
        columns.push(Column::numeric(
            schema::PLANET_MASS,
            numeric([1.0, 0.5, 2.0, 0.8, 1.2, 0.9, 1.0]),
        ));
        columns.push(Column::numeric(
            schema::PLANET_RADIUS,
            numeric([1.1, 0.9, 1.3, 1.0, 1.2, 1.0, 1.1]),
        ));
        columns.push(Column::numeric(schema::PLANET_DENSITY, numeric([1.0; 7])));
        columns.push(Column::numeric(schema::STAR_DISTANCE, numeric([300.0; 7])));
        columns.push(Column::numeric(schema::STAR_TEMPERATURE, numeric([5700.0; 7])));
        columns.push(Column::numeric(
            schema::STAR_MASS,
            numeric([0.9, 1.0, 1.1, 0.95, 1.05, 1.0, 1.0]),
        ));
        let mut star_radius = numeric([0.9, 1.0, 1.1, 1.0, 1.0, 1.2, 1.0]);
        star_radius[6] = None;
        columns.push(Column::numeric(schema::STAR_RADIUS, star_radius));
        Table::new(columns).unwrap()
    }

    #[test]
    fn test_completeness_filter_covers_schema() {
        let spec = completeness_filter();
        assert_eq!(spec.predicates().len(), schema::EXPECTED_COLUMNS.len());
    }

    #[test]
    fn test_orbital_study() {
        let report = OrbitalAnalysis::default().run(&archive()).unwrap();

        assert_eq!(report.rows, 6);
        assert_eq!(report.star_mass_normality.sample_size, 6);
        assert!((report.mean_star_mass - 1.0).abs() < 1e-12);
        assert!((report.axis.mean() - 0.34 / 6.0).abs() < 1e-12);

        // Hot Jupiters sit far inside 1 AU
        assert_eq!(report.axis_test.alternative, Alternative::Less);
        assert_eq!(report.axis_test.decision, Decision::RejectNull);
        assert!(report.axis_interval.upper < 1.0);

        // A few-day period around a solar-mass star is a few hundredths of an AU
        assert!(report.kepler_axis_au > 0.01 && report.kepler_axis_au < 0.2);

        // Speeds of order 100 km/s
        assert!(report.velocity.mean() > 5.0e4 && report.velocity.mean() < 3.0e5);
        assert!(report.velocity_interval.contains(report.velocity.mean()));

        assert!(report.hill_radius_m > 0.0);
        let earth_ratio = report.hill_radius_m / AU_M / 0.01;
        assert!((report.hill_radius_earth_ratio - earth_ratio).abs() < 1e-12);

        assert!(report.transit_probability > 0.0 && report.transit_probability < 1.0);
        let expected = &report.expected_transits;
        assert_eq!(expected.trials, 1000);
        assert!((expected.expected - 1000.0 * report.transit_probability).abs() < 1e-9);
    }

    #[test]
    fn test_orbital_study_needs_rows() {
        let table = archive().select(&[6]);
        assert!(matches!(
            OrbitalAnalysis::default().run(&table),
            Err(InferenceError::InsufficientSample { .. })
        ));
    }

    #[test]
    fn test_orbital_study_missing_column() {
        let table = Table::new(vec![Column::numeric(schema::STAR_MASS, vec![Some(1.0)])]).unwrap();
        assert!(matches!(
            OrbitalAnalysis::default().run(&table),
            Err(InferenceError::SchemaError(_))
        ));
    }
}
