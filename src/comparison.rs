//! Two-group comparison of a numeric column
//!
//! The whole column is summarised and checked for normality (Shapiro–Wilk
//! on a fixed-seed subsample of at most 5000 values). Rows are then split by
//! the value of a text column (e.g. `koi_disposition` `CONFIRMED` vs
//! `FALSE POSITIVE`) and the group means are compared with Welch's t-test.

use crate::error::Result;
use crate::filter::{filter, FilterPredicate, FilterSpec};
use crate::hypothesis::{
    normality_test, subsample, welch_t_test_samples, Alternative, HypothesisTestResult,
    NormalityResult, ShapiroWilk, MAX_NORMALITY_SAMPLE,
};
use crate::stats::{describe, Sample, SampleStatistics};
use crate::table::Table;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct GroupComparison {
    pub name: String,
    /// Numeric column compared between groups
    pub column: String,
    /// Text column holding the group label
    pub group_column: String,
    pub first_group: String,
    pub second_group: String,
    pub alternative: Alternative,
    pub alpha: f64,
    /// Seed for the normality subsample
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub name: String,
    pub column: String,
    pub group_column: String,
    pub first_group: String,
    pub second_group: String,
    /// Every present value of the column, regardless of group
    pub pooled: SampleStatistics,
    pub pooled_normality: NormalityResult,
    pub first: SampleStatistics,
    pub second: SampleStatistics,
    pub test: HypothesisTestResult,
}

impl GroupComparison {
    fn group(&self, table: &Table, label: &str) -> Result<Sample> {
        let predicate = FilterPredicate::equals(self.group_column.as_str(), label);
        let rows = filter(table, &FilterSpec::all().and(predicate))?;
        rows.sample(&self.column)
    }

    pub fn run(&self, table: &Table) -> Result<ComparisonReport> {
        let values = table.sample(&self.column)?;
        let pooled = describe(&values)?;
        let tested = subsample(&values, MAX_NORMALITY_SAMPLE, self.seed);
        let pooled_normality = normality_test(&ShapiroWilk, &tested, self.alpha)?;

        let first = self.group(table, &self.first_group)?;
        let second = self.group(table, &self.second_group)?;
        tracing::debug!(
            "{}: {} '{}' vs {} '{}'",
            self.name,
            first.len(),
            self.first_group,
            second.len(),
            self.second_group
        );

        // The test rejects empty or constant groups before describe() can
        let test = welch_t_test_samples(&first, &second, self.alternative, self.alpha)?;

        Ok(ComparisonReport {
            name: self.name.clone(),
            column: self.column.clone(),
            group_column: self.group_column.clone(),
            first_group: self.first_group.clone(),
            second_group: self.second_group.clone(),
            pooled,
            pooled_normality,
            first: describe(&first)?,
            second: describe(&second)?,
            test,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InferenceError;
    use crate::hypothesis::Decision;
    use crate::table::Column;

    fn koi() -> Table {
        let dispositions = [
            "CONFIRMED",
            "FALSE POSITIVE",
            "CONFIRMED",
            "CONFIRMED",
            "FALSE POSITIVE",
            " CONFIRMED ",
            "CANDIDATE",
            "FALSE POSITIVE",
        ];
        Table::new(vec![
            Column::text(
                "koi_disposition",
                dispositions.iter().map(|d| Some(d.to_string())).collect(),
            ),
            Column::numeric(
                "koi_score",
                vec![
                    Some(0.95),
                    Some(0.10),
                    Some(0.90),
                    Some(0.99),
                    Some(0.05),
                    Some(0.97),
                    Some(0.50),
                    None,
                ],
            ),
        ])
        .unwrap()
    }

    fn comparison(first: &str, second: &str) -> GroupComparison {
        GroupComparison {
            name: "score by disposition".to_string(),
            column: "koi_score".to_string(),
            group_column: "koi_disposition".to_string(),
            first_group: first.to_string(),
            second_group: second.to_string(),
            alternative: Alternative::TwoSided,
            alpha: 0.05,
            seed: 42,
        }
    }

    #[test]
    fn test_groups_split_by_label() {
        let report = comparison("CONFIRMED", "FALSE POSITIVE")
            .run(&koi())
            .unwrap();
        // Labels are trimmed; the null score is skipped
        assert_eq!(report.first.count(), 4);
        assert_eq!(report.second.count(), 2);
        assert!(report.first.mean() > report.second.mean());
        assert_eq!(report.test.decision, Decision::RejectNull);

        // Pooled over every labelled and unlabelled score
        assert_eq!(report.pooled.count(), 7);
        let mean = (0.95 + 0.10 + 0.90 + 0.99 + 0.05 + 0.97 + 0.50) / 7.0;
        assert!((report.pooled.mean() - mean).abs() < 1e-12);
        assert_eq!(report.pooled_normality.sample_size, 7);
        assert_eq!(report.pooled_normality.test, "Shapiro-Wilk");
    }

    /// 6000 scores, so the normality check runs on a 5000-value subsample
    fn large_koi() -> Table {
        let rows = 6000;
        let labels = ["CONFIRMED", "FALSE POSITIVE", "CANDIDATE"];
        Table::new(vec![
            Column::text(
                "koi_disposition",
                (0..rows).map(|i| Some(labels[i % 3].to_string())).collect(),
            ),
            Column::numeric(
                "koi_score",
                (0..rows)
                    .map(|i| Some(((i * 37) % 1000) as f64 / 1000.0 + (i % 3) as f64))
                    .collect(),
            ),
        ])
        .unwrap()
    }

    #[test]
    fn test_large_column_is_subsampled_for_normality() {
        let table = large_koi();
        let report = comparison("CONFIRMED", "FALSE POSITIVE")
            .run(&table)
            .unwrap();

        assert_eq!(report.pooled.count(), 6000);
        assert_eq!(report.pooled_normality.sample_size, MAX_NORMALITY_SAMPLE);
        assert_eq!(report.first.count(), 2000);
        assert_eq!(report.second.count(), 2000);

        // Same seed, same subsample
        let again = comparison("CONFIRMED", "FALSE POSITIVE")
            .run(&table)
            .unwrap();
        assert_eq!(again.pooled_normality, report.pooled_normality);
    }

    #[test]
    fn test_too_few_values_for_normality() {
        let table = koi().select(&[0, 1]);
        assert!(matches!(
            comparison("CONFIRMED", "FALSE POSITIVE").run(&table),
            Err(InferenceError::InsufficientSample { .. })
        ));
    }

    #[test]
    fn test_single_member_group_is_degenerate() {
        assert!(matches!(
            comparison("CONFIRMED", "CANDIDATE").run(&koi()),
            Err(InferenceError::DegenerateSample(_))
        ));
        assert!(matches!(
            comparison("CONFIRMED", "NOT A LABEL").run(&koi()),
            Err(InferenceError::DegenerateSample(_))
        ));
    }

    #[test]
    fn test_group_column_must_be_text() {
        let mut cmp = comparison("CONFIRMED", "FALSE POSITIVE");
        cmp.group_column = "koi_score".to_string();
        assert!(matches!(cmp.run(&koi()), Err(InferenceError::SchemaError(_))));
    }
}
