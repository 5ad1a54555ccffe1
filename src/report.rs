//! Rendering of study results
//!
//! Pure formatting: everything shown here was computed by the study runner.

use crate::comparison::ComparisonReport;
use crate::hypothesis::{Decision, NormalityResult};
use crate::interval::ConfidenceInterval;
use crate::orbital::OrbitalReport;
use crate::pipeline::AnalysisReport;
use crate::stats::SampleStatistics;
use crate::study::{Outcome, StudyReport};
use anyhow::{Context, Result};
use std::fmt::Write;

/// Pretty-printed JSON
pub fn render_json(report: &StudyReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("Failed to serialize study report")
}

/// Human-readable summary
pub fn render_text(report: &StudyReport) -> String {
    let mut out = String::new();

    out.push_str(&format!("Loaded rows: {}\n", report.rows));
    match report.population_rows {
        Some(rows) => out.push_str(&format!("Population used in the tests: {rows}\n")),
        None => out.push_str("Population filter failed\n"),
    }

    for outcome in &report.analyses {
        out.push('\n');
        match outcome {
            Outcome::Completed(analysis) => write_analysis(&mut out, analysis),
            Outcome::Failed(failure) => {
                out.push_str(&format!("❌ {}: {}\n", failure.name, failure.error));
            }
        }
    }

    if let Some(orbital) = &report.orbital {
        out.push('\n');
        match orbital {
            Outcome::Completed(orbital) => write_orbital(&mut out, orbital),
            Outcome::Failed(failure) => {
                out.push_str(&format!("❌ orbital study: {}\n", failure.error));
            }
        }
    }

    for outcome in &report.comparisons {
        out.push('\n');
        match outcome {
            Outcome::Completed(comparison) => write_comparison(&mut out, comparison),
            Outcome::Failed(failure) => {
                out.push_str(&format!("❌ {}: {}\n", failure.name, failure.error));
            }
        }
    }

    let failed = report.failed_count();
    if failed > 0 {
        out.push_str(&format!("\n⚠️  {failed} analysis(es) failed\n"));
    }
    out
}

fn describe_line(stats: &SampleStatistics) -> String {
    let mut line = format!("n = {}, mean = {:.7}", stats.count(), stats.mean());
    if let (Ok(variance), Ok(std_dev)) = (stats.variance(), stats.std_dev()) {
        let _ = write!(line, ", variance = {variance:.7}, std = {std_dev:.7}");
    }
    line
}

fn normality_line(normality: &NormalityResult) -> String {
    format!(
        "{}: W = {:.4}, p = {:.4} (n = {}) → {}",
        normality.test,
        normality.statistic,
        normality.p_value,
        normality.sample_size,
        if normality.looks_normal {
            "looks normal"
        } else {
            "not normal"
        }
    )
}

fn interval_line(interval: &ConfidenceInterval, precision: usize) -> String {
    format!(
        "{:.0}% CI ({:?}): [{:.p$}, {:.p$}]",
        interval.confidence_level * 100.0,
        interval.method,
        interval.lower,
        interval.upper,
        p = precision
    )
}

fn decision_text(decision: Decision) -> &'static str {
    match decision {
        Decision::RejectNull => "reject H0",
        Decision::FailToReject => "fail to reject H0",
    }
}

fn write_analysis(out: &mut String, analysis: &AnalysisReport) {
    out.push_str(&format!(
        "📊 {} ({} within {} of {})\n",
        analysis.name, analysis.column, analysis.tolerance, analysis.reference
    ));
    out.push_str(&format!(
        "  Matched rows: {} of {} ({:.2}%)\n",
        analysis.matched_rows,
        analysis.base_rows,
        analysis.matched_share * 100.0
    ));
    out.push_str(&format!("  Matched: {}\n", describe_line(&analysis.matched)));
    out.push_str(&format!(
        "  Below reference: {:.2}%, above reference: {:.2}%\n",
        analysis.fraction_below * 100.0,
        analysis.fraction_above * 100.0
    ));
    out.push_str(&format!("  Mean ratio to base: {:.5}\n", analysis.mean_ratio));
    out.push_str(&format!("  {}\n", interval_line(&analysis.interval, 4)));
}

fn write_orbital(out: &mut String, orbital: &OrbitalReport) {
    out.push_str(&format!("🪐 Orbital study ({} complete rows)\n", orbital.rows));

    out.push_str(&format!(
        "  Stellar mass {}\n",
        normality_line(&orbital.star_mass_normality)
    ));
    out.push_str(&format!(
        "  Mean stellar mass: {:.4} M☉, mean planet mass: {:.4} MJ, mean period: {:.3} d\n",
        orbital.mean_star_mass, orbital.mean_planet_mass, orbital.mean_period
    ));
    out.push_str(&format!(
        "  Kepler semimajor axis of the means: {:.4} AU\n",
        orbital.kepler_axis_au
    ));
    out.push_str(&format!("  Semimajor axis: {}\n", describe_line(&orbital.axis)));
    out.push_str(&format!("  {}\n", interval_line(&orbital.axis_interval, 4)));

    let test = &orbital.axis_test;
    out.push_str(&format!(
        "  t-test ({:?}): t = {:.4}, df = {}, p = {:.4e} → {}\n",
        test.alternative,
        test.statistic,
        test.degrees_of_freedom,
        test.p_value,
        decision_text(test.decision)
    ));

    out.push_str(&format!(
        "  Orbital speed: mean = {:.3} km/s, {}\n",
        orbital.velocity.mean() / 1000.0,
        interval_line(&orbital.velocity_interval, 0)
    ));
    out.push_str(&format!(
        "  Hill radius: {:.3e} m ({:.4} × Earth's)\n",
        orbital.hill_radius_m, orbital.hill_radius_earth_ratio
    ));
    out.push_str(&format!(
        "  Transit probability: {:.4}\n",
        orbital.transit_probability
    ));

    let expected = &orbital.expected_transits;
    out.push_str(&format!(
        "  Expected transits in {} systems: {:.2} ± {:.2}; P(X = {}) = {:.3e}",
        expected.trials,
        expected.expected,
        expected.std_dev,
        expected.observed,
        expected.probability_mass
    ));
    if let Some(z) = expected.z_score {
        let _ = write!(out, ", z = {z:.2}");
    }
    out.push('\n');
}

fn write_comparison(out: &mut String, comparison: &ComparisonReport) {
    out.push_str(&format!(
        "⚖️  {} ({} by {})\n",
        comparison.name, comparison.column, comparison.group_column
    ));
    out.push_str(&format!("  All: {}\n", describe_line(&comparison.pooled)));
    out.push_str(&format!("  All {}\n", normality_line(&comparison.pooled_normality)));
    out.push_str(&format!(
        "  {}: {}\n",
        comparison.first_group,
        describe_line(&comparison.first)
    ));
    out.push_str(&format!(
        "  {}: {}\n",
        comparison.second_group,
        describe_line(&comparison.second)
    ));
    let test = &comparison.test;
    out.push_str(&format!(
        "  Welch t = {:.4}, df = {:.2}, p = {:.4e} → {}\n",
        test.statistic,
        test.degrees_of_freedom,
        test.p_value,
        decision_text(test.decision)
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comparison::GroupComparison;
    use crate::hypothesis::Alternative;
    use crate::study::Failure;
    use crate::table::{Column, Table};

    fn empty_report() -> StudyReport {
        StudyReport {
            rows: 12,
            population_rows: Some(7),
            analyses: Vec::new(),
            orbital: None,
            comparisons: Vec::new(),
        }
    }

    #[test]
    fn test_text_report_header() {
        let text = render_text(&empty_report());
        assert!(text.contains("Loaded rows: 12"));
        assert!(text.contains("Population used in the tests: 7"));
        assert!(!text.contains("failed"));
    }

    #[test]
    fn test_text_report_lists_failures() {
        let mut report = empty_report();
        report.population_rows = None;
        report.analyses.push(Outcome::Failed(Failure {
            name: "mass".to_string(),
            error: "Schema error: column 'pl_bmassj' not found".to_string(),
        }));
        let text = render_text(&report);
        assert!(text.contains("Population filter failed"));
        assert!(text.contains("mass: Schema error"));
        assert!(text.contains("1 analysis(es) failed"));
    }

    #[test]
    fn test_json_report() {
        let json = render_json(&empty_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["rows"], 12);
        assert_eq!(value["population_rows"], 7);
        assert!(value["orbital"].is_null());
    }

    #[test]
    fn test_comparison_shows_pooled_normality() {
        let labels = ["CONFIRMED", "FALSE POSITIVE"];
        let table = Table::new(vec![
            Column::text(
                "koi_disposition",
                (0..8).map(|i| Some(labels[i % 2].to_string())).collect(),
            ),
            Column::numeric(
                "koi_score",
                vec![
                    Some(0.95),
                    Some(0.10),
                    Some(0.90),
                    Some(0.05),
                    Some(0.99),
                    Some(0.20),
                    Some(0.97),
                    Some(0.15),
                ],
            ),
        ])
        .unwrap();
        let comparison = GroupComparison {
            name: "score".to_string(),
            column: "koi_score".to_string(),
            group_column: "koi_disposition".to_string(),
            first_group: "CONFIRMED".to_string(),
            second_group: "FALSE POSITIVE".to_string(),
            alternative: Alternative::TwoSided,
            alpha: 0.05,
            seed: 42,
        };
        let mut report = empty_report();
        report
            .comparisons
            .push(Outcome::Completed(comparison.run(&table).unwrap()));

        let text = render_text(&report);
        assert!(text.contains("score (koi_score by koi_disposition)"));
        assert!(text.contains("  All: n = 8"));
        assert!(text.contains("  All Shapiro-Wilk: W = "));
        assert!(text.contains("Welch t = "));
    }
}
