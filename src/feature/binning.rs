//! Quantile binning and missing-aware summary statistics.

use crate::error::{Error, Result};

/// What to do when quantile edges coincide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Duplicates {
    Raise,
    Drop,
}

/// Mean over present values.
pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, n) = values
        .into_iter()
        .flatten()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Sample standard deviation (ddof = 1) over present values.
pub fn sample_std<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let present: Vec<f64> = values.into_iter().flatten().collect();
    if present.len() < 2 {
        return None;
    }
    let m = present.iter().sum::<f64>() / present.len() as f64;
    let ss: f64 = present.iter().map(|v| (v - m).powi(2)).sum();
    Some((ss / (present.len() - 1) as f64).sqrt())
}

/// Linear-interpolated quantile of sorted data.
fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Bin edges at the `k / q` quantiles, `k = 0..=q`.
pub fn quantile_edges(values: &[f64], q: usize) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    (0..=q)
        .map(|k| quantile_sorted(&sorted, k as f64 / q as f64))
        .collect()
}

/// Discretize `values` into `q` equal-frequency bins and return bin codes.
///
/// Intervals are right-closed with the lowest edge included, so the minimum
/// lands in bin 0 and the maximum in the last bin. With
/// [`Duplicates::Drop`] coincident edges are merged and fewer than `q` bins
/// may result.
pub fn qcut(column: &str, values: &[f64], q: usize, duplicates: Duplicates) -> Result<Vec<i64>> {
    if values.is_empty() {
        return Ok(Vec::new());
    }
    if q == 0 {
        return Err(Error::InvalidInput(format!("column '{column}': q must be positive")));
    }
    if let Some(v) = values.iter().find(|v| !v.is_finite()) {
        return Err(Error::InvalidInput(format!(
            "column '{column}': cannot bin non-finite value {v}"
        )));
    }

    let edges = quantile_edges(values, q);
    let mut unique = edges.clone();
    unique.dedup();

    let edges = if unique.len() < edges.len() {
        match duplicates {
            Duplicates::Raise => {
                return Err(Error::BinEdges {
                    column: column.to_string(),
                    edges,
                })
            }
            Duplicates::Drop => unique,
        }
    } else {
        edges
    };
    if edges.len() < 2 {
        return Err(Error::BinEdges {
            column: column.to_string(),
            edges,
        });
    }

    Ok(values.iter().map(|&v| bin_code(&edges, v)).collect())
}

fn bin_code(edges: &[f64], v: f64) -> i64 {
    // first edge >= v, i.e. a left-sided search
    let idx = edges.partition_point(|&e| e < v);
    idx.saturating_sub(1) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_and_std_skip_missing() {
        let col = [Some(1.0), None, Some(3.0), Some(5.0)];
        assert_eq!(mean(col), Some(3.0));
        assert_eq!(sample_std(col), Some(2.0));
        assert_eq!(mean([None, None]), None);
        assert_eq!(sample_std([Some(1.0)]), None);
    }

    #[test]
    fn edges_interpolate_linearly() {
        let edges = quantile_edges(&[1.0, 2.0, 3.0, 4.0, 5.0], 4);
        assert_eq!(edges, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let edges = quantile_edges(&[0.0, 10.0], 4);
        assert_eq!(edges, vec![0.0, 2.5, 5.0, 7.5, 10.0]);
    }

    #[test]
    fn quartiles_are_right_closed_with_lowest_included() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let codes = qcut("x", &values, 4, Duplicates::Raise).unwrap();
        assert_eq!(codes, vec![0, 0, 1, 1, 2, 2, 3, 3]);
    }

    #[test]
    fn repeated_values_raise_or_drop() {
        let values = [1.0, 1.0, 1.0, 1.0, 2.0, 3.0];
        let err = qcut("Fare", &values, 4, Duplicates::Raise).unwrap_err();
        assert!(matches!(err, Error::BinEdges { ref column, .. } if column == "Fare"));

        // edges 1, 1, 1, 1.75, 3 collapse to 1, 1.75, 3
        let codes = qcut("Age", &values, 4, Duplicates::Drop).unwrap();
        assert_eq!(codes, vec![0, 0, 0, 0, 1, 1]);
    }

    #[test]
    fn constant_column_cannot_be_binned() {
        let err = qcut("Age", &[4.0, 4.0, 4.0], 5, Duplicates::Drop).unwrap_err();
        assert!(matches!(err, Error::BinEdges { .. }));
    }

    #[test]
    fn empty_input_yields_no_codes() {
        assert!(qcut("x", &[], 4, Duplicates::Raise).unwrap().is_empty());
    }
}
