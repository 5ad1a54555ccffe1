//! Row filtering on data-completeness predicates
//!
//! A [`FilterSpec`] is a conjunction of [`FilterPredicate`]s. Specs can be
//! built in code or parsed from an expression:
//! - Completeness: `present=pl_orbper,st_teff;nonempty=pl_hostname`
//! - Column classes: `present=orbit,star` (see `schema::column_class`)
//! - Value window: `within=pl_radj:0.09123:0.1`
//! - Text match: `equals=koi_disposition:CONFIRMED`

use crate::error::{InferenceError, Result};
use crate::schema;
use crate::table::{ColumnType, Table};

/// Condition a single cell must satisfy
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Numeric value present and not NaN
    PresentNumeric,
    /// Text value present and not blank
    NonEmptyText,
    /// Numeric value present and within `tolerance` of `target` (inclusive)
    WithinTolerance { target: f64, tolerance: f64 },
    /// Text value equal to the given string after trimming
    TextEquals(String),
}

impl Condition {
    fn expected_type(&self) -> ColumnType {
        match self {
            Condition::PresentNumeric | Condition::WithinTolerance { .. } => ColumnType::Numeric,
            Condition::NonEmptyText | Condition::TextEquals(_) => ColumnType::Text,
        }
    }

    fn accepts_number(&self, value: Option<f64>) -> bool {
        match (self, value) {
            (Condition::PresentNumeric, Some(v)) => !v.is_nan(),
            (Condition::WithinTolerance { target, tolerance }, Some(v)) => {
                (v - target).abs() <= *tolerance
            }
            _ => false,
        }
    }

    fn accepts_text(&self, value: Option<&str>) -> bool {
        match (self, value) {
            (Condition::NonEmptyText, Some(s)) => !s.trim().is_empty(),
            (Condition::TextEquals(expected), Some(s)) => s.trim() == expected.as_str(),
            _ => false,
        }
    }
}

/// (column, condition) pair
#[derive(Debug, Clone, PartialEq)]
pub struct FilterPredicate {
    pub column: String,
    pub condition: Condition,
}

impl FilterPredicate {
    pub fn present(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            condition: Condition::PresentNumeric,
        }
    }

    pub fn non_empty(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            condition: Condition::NonEmptyText,
        }
    }

    pub fn within(column: impl Into<String>, target: f64, tolerance: f64) -> Self {
        Self {
            column: column.into(),
            condition: Condition::WithinTolerance { target, tolerance },
        }
    }

    pub fn equals(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            condition: Condition::TextEquals(value.into()),
        }
    }
}

/// Conjunction of predicates; the empty spec keeps every row
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    predicates: Vec<FilterPredicate>,
}

impl FilterSpec {
    /// Spec that keeps every row
    pub fn all() -> Self {
        Self::default()
    }

    pub fn new(predicates: Vec<FilterPredicate>) -> Self {
        Self { predicates }
    }

    /// Add one more predicate to the conjunction
    pub fn and(mut self, predicate: FilterPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[FilterPredicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Parse an expression such as `present=orbit,st_teff;nonempty=pl_hostname`
    pub fn from_expr(expr: &str) -> Result<Self> {
        let mut predicates = Vec::new();

        for clause in expr.split(';') {
            let clause = clause.trim();
            if clause.is_empty() {
                continue;
            }

            let Some((kind, args)) = clause.split_once('=') else {
                return Err(InferenceError::InvalidParameter(format!(
                    "Invalid filter clause: '{clause}'. Expected KIND=ARGS"
                )));
            };

            match kind.trim() {
                "present" => {
                    for column in Self::expand_columns(args)? {
                        predicates.push(FilterPredicate::present(column));
                    }
                }
                "nonempty" => {
                    for column in Self::expand_columns(args)? {
                        predicates.push(FilterPredicate::non_empty(column));
                    }
                }
                "within" => predicates.push(Self::parse_within(args)?),
                "equals" => predicates.push(Self::parse_equals(args)?),
                other => {
                    return Err(InferenceError::InvalidParameter(format!(
                        "Unknown filter kind '{other}'. \
                         Expected present, nonempty, within or equals"
                    )));
                }
            }
        }

        Ok(Self { predicates })
    }

    /// Split a comma list, expanding column classes
    fn expand_columns(args: &str) -> Result<Vec<String>> {
        let mut columns = Vec::new();

        for part in args.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match schema::column_class(part) {
                Some(class) => columns.extend(class.iter().map(|c| c.to_string())),
                None => columns.push(part.to_string()),
            }
        }

        if columns.is_empty() {
            return Err(InferenceError::InvalidParameter(
                "Filter clause names no columns".to_string(),
            ));
        }
        Ok(columns)
    }

    /// `column:target:tolerance`
    fn parse_within(args: &str) -> Result<FilterPredicate> {
        let parts: Vec<&str> = args.split(':').map(str::trim).collect();
        let [column, target, tolerance] = parts.as_slice() else {
            return Err(InferenceError::InvalidParameter(format!(
                "Invalid within clause '{args}'. Expected COLUMN:TARGET:TOLERANCE"
            )));
        };

        let parse = |text: &str| {
            text.parse::<f64>().map_err(|_| {
                InferenceError::InvalidParameter(format!("'{text}' is not a number"))
            })
        };

        if column.is_empty() {
            return Err(InferenceError::InvalidParameter(
                "within clause names no column".to_string(),
            ));
        }
        Ok(FilterPredicate::within(*column, parse(*target)?, parse(*tolerance)?))
    }

    /// `column:value`
    fn parse_equals(args: &str) -> Result<FilterPredicate> {
        match args.split_once(':') {
            Some((column, value)) if !column.trim().is_empty() => {
                Ok(FilterPredicate::equals(column.trim(), value.trim()))
            }
            _ => Err(InferenceError::InvalidParameter(format!(
                "Invalid equals clause '{args}'. Expected COLUMN:VALUE"
            ))),
        }
    }
}

/// Check every predicate against the table schema before touching rows
fn validate(table: &Table, spec: &FilterSpec) -> Result<()> {
    for predicate in &spec.predicates {
        let actual = table.column_type(&predicate.column)?;
        let expected = predicate.condition.expected_type();
        if actual != expected {
            return Err(InferenceError::SchemaError(format!(
                "column '{}' is {:?}, but condition {:?} needs {:?}",
                predicate.column, actual, predicate.condition, expected
            )));
        }
        if let Condition::WithinTolerance { target, tolerance } = predicate.condition {
            if !target.is_finite() || !tolerance.is_finite() || tolerance < 0.0 {
                return Err(InferenceError::InvalidParameter(format!(
                    "within({}) needs a finite target and non-negative tolerance, got {} ± {}",
                    predicate.column, target, tolerance
                )));
            }
        }
    }
    Ok(())
}

/// Keep the rows satisfying every predicate, preserving row order
///
/// The empty spec returns an identical table. A spec no row satisfies
/// returns a zero-row table with the same columns.
pub fn filter(table: &Table, spec: &FilterSpec) -> Result<Table> {
    validate(table, spec)?;

    if spec.is_empty() {
        return Ok(table.clone());
    }

    let mut keep = vec![true; table.row_count()];
    for predicate in &spec.predicates {
        match predicate.condition.expected_type() {
            ColumnType::Numeric => {
                for (flag, value) in keep.iter_mut().zip(table.numeric(&predicate.column)?) {
                    *flag = *flag && predicate.condition.accepts_number(*value);
                }
            }
            ColumnType::Text => {
                for (flag, value) in keep.iter_mut().zip(table.text(&predicate.column)?) {
                    *flag = *flag && predicate.condition.accepts_text(value.as_deref());
                }
            }
        }
    }

    let indices: Vec<usize> = keep
        .iter()
        .enumerate()
        .filter_map(|(row, &kept)| kept.then_some(row))
        .collect();

    tracing::debug!(
        "filter kept {} of {} rows ({} predicates)",
        indices.len(),
        table.row_count(),
        spec.predicates.len()
    );

    Ok(table.select(&indices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Column;

    /// 10 rows, rows 2, 5 and 8 missing pl_orbper
    fn ten_rows() -> Table {
        let period: Vec<Option<f64>> = (0..10)
            .map(|i| {
                if i % 3 == 2 {
                    None
                } else {
                    Some(i as f64 + 1.0)
                }
            })
            .collect();
        let hosts: Vec<Option<String>> = (0..10).map(|i| Some(format!("host-{i}"))).collect();
        Table::new(vec![
            Column::text("pl_hostname", hosts),
            Column::numeric("pl_orbper", period),
            Column::numeric("row", (0..10).map(|i| Some(i as f64)).collect()),
        ])
        .unwrap()
    }

    #[test]
    fn test_filter_drops_null_rows_in_order() {
        let table = ten_rows();
        let spec = FilterSpec::all().and(FilterPredicate::present("pl_orbper"));
        let filtered = filter(&table, &spec).unwrap();

        assert_eq!(filtered.row_count(), 7);
        let rows: Vec<f64> = filtered
            .numeric("row")
            .unwrap()
            .iter()
            .flatten()
            .copied()
            .collect();
        assert_eq!(rows, vec![0.0, 1.0, 3.0, 4.0, 6.0, 7.0, 9.0]);
    }

    #[test]
    fn test_empty_spec_is_identity() {
        let table = ten_rows();
        let filtered = filter(&table, &FilterSpec::all()).unwrap();
        assert_eq!(filtered, table);
    }

    #[test]
    fn test_unsatisfiable_spec_gives_zero_rows() {
        let table = ten_rows();
        let spec = FilterSpec::all().and(FilterPredicate::within("row", 100.0, 1.0));
        let filtered = filter(&table, &spec).unwrap();
        assert_eq!(filtered.row_count(), 0);
        assert_eq!(filtered.column_count(), 3);
    }

    #[test]
    fn test_missing_column_is_schema_error() {
        let table = ten_rows();
        let spec = FilterSpec::all().and(FilterPredicate::present("st_mass"));
        assert!(matches!(filter(&table, &spec), Err(InferenceError::SchemaError(_))));
    }

    #[test]
    fn test_type_mismatch_is_schema_error() {
        let table = ten_rows();
        let spec = FilterSpec::all().and(FilterPredicate::non_empty("pl_orbper"));
        assert!(matches!(filter(&table, &spec), Err(InferenceError::SchemaError(_))));
    }

    #[test]
    fn test_non_empty_rejects_blank_and_null() {
        let table = Table::new(vec![Column::text(
            "pl_hostname",
            vec![Some("a".into()), Some("   ".into()), None, Some("b".into())],
        )])
        .unwrap();
        let spec = FilterSpec::all().and(FilterPredicate::non_empty("pl_hostname"));
        assert_eq!(filter(&table, &spec).unwrap().row_count(), 2);
    }

    #[test]
    fn test_present_rejects_nan() {
        let table =
            Table::new(vec![Column::numeric("x", vec![Some(f64::NAN), Some(1.0)])]).unwrap();
        let spec = FilterSpec::all().and(FilterPredicate::present("x"));
        assert_eq!(filter(&table, &spec).unwrap().row_count(), 1);
    }

    #[test]
    fn test_within_is_inclusive() {
        let table = Table::new(vec![Column::numeric(
            "x",
            vec![Some(0.5), Some(1.0), Some(1.5), Some(1.6), None],
        )])
        .unwrap();
        let spec = FilterSpec::all().and(FilterPredicate::within("x", 1.0, 0.5));
        assert_eq!(filter(&table, &spec).unwrap().row_count(), 3);
    }

    #[test]
    fn test_within_rejects_negative_tolerance() {
        let table = ten_rows();
        let spec = FilterSpec::all().and(FilterPredicate::within("row", 1.0, -0.1));
        assert!(matches!(
            filter(&table, &spec),
            Err(InferenceError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_predicate_order_does_not_matter() {
        let table = ten_rows();
        let a = FilterSpec::all()
            .and(FilterPredicate::present("pl_orbper"))
            .and(FilterPredicate::within("row", 4.0, 3.0));
        let b = FilterSpec::all()
            .and(FilterPredicate::within("row", 4.0, 3.0))
            .and(FilterPredicate::present("pl_orbper"));
        assert_eq!(filter(&table, &a).unwrap(), filter(&table, &b).unwrap());
    }

    #[test]
    fn test_filter_leaves_input_untouched() {
        let table = ten_rows();
        let before = table.clone();
        let spec = FilterSpec::all().and(FilterPredicate::present("pl_orbper"));
        let _ = filter(&table, &spec).unwrap();
        assert_eq!(table, before);
    }

    #[test]
    fn test_parse_present_and_nonempty() {
        let spec = FilterSpec::from_expr("present=pl_orbper,st_teff;nonempty=pl_hostname").unwrap();
        assert_eq!(
            spec.predicates(),
            &[
                FilterPredicate::present("pl_orbper"),
                FilterPredicate::present("st_teff"),
                FilterPredicate::non_empty("pl_hostname"),
            ]
        );
    }

    #[test]
    fn test_parse_column_class() {
        let spec = FilterSpec::from_expr("present=star").unwrap();
        assert_eq!(spec.predicates().len(), 4);
        assert!(spec
            .predicates()
            .contains(&FilterPredicate::present("st_mass")));
    }

    #[test]
    fn test_parse_within_and_equals() {
        let spec =
            FilterSpec::from_expr("within=pl_radj:0.09123:0.1; equals=koi_disposition:CONFIRMED")
                .unwrap();
        assert_eq!(
            spec.predicates(),
            &[
                FilterPredicate::within("pl_radj", 0.09123, 0.1),
                FilterPredicate::equals("koi_disposition", "CONFIRMED"),
            ]
        );
    }

    #[test]
    fn test_parse_whitespace_handling() {
        let spec = FilterSpec::from_expr(" present = pl_orbper , st_teff ; ").unwrap();
        assert_eq!(spec.predicates().len(), 2);
    }

    #[test]
    fn test_parse_empty_expression_keeps_all() {
        assert!(FilterSpec::from_expr("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_expressions() {
        assert!(FilterSpec::from_expr("pl_orbper").is_err());
        assert!(FilterSpec::from_expr("missing=pl_orbper").is_err());
        assert!(FilterSpec::from_expr("present=").is_err());
        assert!(FilterSpec::from_expr("within=pl_radj:abc:0.1").is_err());
        assert!(FilterSpec::from_expr("within=pl_radj:0.1").is_err());
        assert!(FilterSpec::from_expr("equals=CONFIRMED").is_err());
    }
}
