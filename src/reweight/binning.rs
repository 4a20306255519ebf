use serde::{Serialize, Deserialize};

use crate::error::{NnError, Result};

pub const DEFAULT_PT_EDGES: [f64; 11] = [20.0, 30.0, 40.0, 50.0, 60.0, 75.0, 90.0, 110.0, 140.0, 200.0, 500.0];
pub const DEFAULT_ETA_EDGES: [f64; 5] = [0.0, 0.6, 1.2, 1.8, 2.5];

/// Interval index of `value` such that `edges[i] <= value < edges[i + 1]`.
///
/// Values at or above the last edge land in the last bin, anything else
/// outside the range (below the first edge, NaN) lands in bin 0.
pub fn categorize(value: f64, edges: &[f64]) -> usize {
    let n = edges.len().saturating_sub(1);
    for (category, pair) in edges.windows(2).enumerate() {
        if value >= pair[0] && value < pair[1] {
            return category;
        }
    }
    match edges.last() {
        Some(&last) if value >= last && n > 0 => n - 1,
        _ => 0,
    }
}

/// A strictly increasing list of at least two bin edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Binning {
    edges: Vec<f64>,
}

impl Binning {
    pub fn new(edges: Vec<f64>) -> Result<Binning> {
        if edges.len() < 2 {
            return Err(NnError::InvalidBins(format!("need at least 2 edges, got {}", edges.len())));
        }
        if edges.iter().any(|e| !e.is_finite()) {
            return Err(NnError::InvalidBins(format!("non-finite edge in {edges:?}")));
        }
        if edges.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(NnError::InvalidBins(format!("edges not strictly increasing: {edges:?}")));
        }
        Ok(Binning { edges })
    }

    pub fn default_pt() -> Binning {
        Binning { edges: DEFAULT_PT_EDGES.to_vec() }
    }

    pub fn default_eta() -> Binning {
        Binning { edges: DEFAULT_ETA_EDGES.to_vec() }
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn num_bins(&self) -> usize {
        self.edges.len() - 1
    }

    pub fn categorize(&self, value: f64) -> usize {
        categorize(value, &self.edges)
    }
}

impl TryFrom<Vec<f64>> for Binning {
    type Error = NnError;

    fn try_from(edges: Vec<f64>) -> Result<Binning> {
        Binning::new(edges)
    }
}

impl From<Binning> for Vec<f64> {
    fn from(binning: Binning) -> Vec<f64> {
        binning.edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pt_categories() {
        let pt = Binning::default_pt();
        assert_eq!(pt.num_bins(), 10);
        assert_eq!(pt.categorize(25.0), 0);
        assert_eq!(pt.categorize(30.0), 1);
        assert_eq!(pt.categorize(199.9), 8);
        assert_eq!(pt.categorize(500.0), 9);
        assert_eq!(pt.categorize(5000.0), 9);
        assert_eq!(pt.categorize(5.0), 0);
        assert_eq!(pt.categorize(f64::NAN), 0);
    }

    #[test]
    fn eta_categories() {
        let eta = Binning::default_eta();
        assert_eq!(eta.categorize(0.0), 0);
        assert_eq!(eta.categorize(1.2), 2);
        assert_eq!(eta.categorize(2.49), 3);
        assert_eq!(eta.categorize(3.0), 3);
    }

    #[test]
    fn free_function_matches_method() {
        assert_eq!(categorize(25.0, &DEFAULT_PT_EDGES), 0);
        assert_eq!(categorize(500.0, &DEFAULT_PT_EDGES), 9);
        assert_eq!(categorize(5.0, &DEFAULT_PT_EDGES), 0);
        assert_eq!(categorize(1.0, &[]), 0);
    }

    #[test]
    fn rejects_bad_edges() {
        assert!(Binning::new(vec![1.0]).is_err());
        assert!(Binning::new(vec![0.0, 1.0, 1.0]).is_err());
        assert!(Binning::new(vec![0.0, f64::INFINITY]).is_err());
        assert!(serde_json::from_str::<Binning>("[3.0, 2.0]").is_err());
        let b: Binning = serde_json::from_str("[0.0, 1.5, 3.0]").unwrap();
        assert_eq!(b.num_bins(), 2);
    }
}
