use serde::{Serialize, Deserialize};

use crate::error::{NnError, Result};

/// Event counts over (pT bin, eta bin).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "HistogramParts")]
pub struct Histogram2D {
    n_pt: usize,
    n_eta: usize,
    counts: Vec<u64>,
}

#[derive(Deserialize)]
struct HistogramParts {
    n_pt: usize,
    n_eta: usize,
    counts: Vec<u64>,
}

impl TryFrom<HistogramParts> for Histogram2D {
    type Error = NnError;

    fn try_from(parts: HistogramParts) -> Result<Histogram2D> {
        if parts.counts.len() != parts.n_pt * parts.n_eta {
            return Err(NnError::InvalidBins(format!(
                "{} counts stored for a {}x{} histogram",
                parts.counts.len(),
                parts.n_pt,
                parts.n_eta
            )));
        }
        Ok(Histogram2D { n_pt: parts.n_pt, n_eta: parts.n_eta, counts: parts.counts })
    }
}

impl Histogram2D {
    pub fn new(n_pt: usize, n_eta: usize) -> Histogram2D {
        Histogram2D { n_pt, n_eta, counts: vec![0; n_pt * n_eta] }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_pt, self.n_eta)
    }

    pub fn fill(&mut self, pt_bin: usize, eta_bin: usize) {
        assert!(pt_bin < self.n_pt && eta_bin < self.n_eta, "bin ({pt_bin}, {eta_bin}) outside {}x{}", self.n_pt, self.n_eta);
        self.counts[pt_bin * self.n_eta + eta_bin] += 1;
    }

    pub fn get(&self, pt_bin: usize, eta_bin: usize) -> u64 {
        self.counts[pt_bin * self.n_eta + eta_bin]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Adds the counts of `other`, e.g. a histogram filled by another worker.
    pub fn merge(&mut self, other: &Histogram2D) -> Result<()> {
        if self.shape() != other.shape() {
            return Err(NnError::InvalidBins(format!(
                "cannot merge {:?} histogram into {:?}",
                other.shape(),
                self.shape()
            )));
        }
        for (a, b) in self.counts.iter_mut().zip(&other.counts) {
            *a += b;
        }
        Ok(())
    }

    /// Empirical 2D CDF: prefix sums along eta, then along pT, divided by the
    /// grand total. An empty histogram yields all zeros.
    pub fn cdf(&self) -> Vec<Vec<f64>> {
        let mut cumulative = vec![vec![0.0; self.n_eta]; self.n_pt];
        for i in 0..self.n_pt {
            let mut running = 0.0;
            for j in 0..self.n_eta {
                running += self.get(i, j) as f64;
                cumulative[i][j] = running;
            }
        }
        for i in 1..self.n_pt {
            for j in 0..self.n_eta {
                cumulative[i][j] += cumulative[i - 1][j];
            }
        }

        let total = self.total() as f64;
        if total > 0.0 {
            for row in cumulative.iter_mut() {
                for value in row.iter_mut() {
                    *value /= total;
                }
            }
        }
        cumulative
    }
}
