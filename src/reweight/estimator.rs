use crate::data::source::RecordSource;
use crate::error::Result;
use crate::reweight::config::ReweightConfig;
use crate::reweight::histogram::Histogram2D;
use crate::reweight::table::{CorrectionTable, Flavor};

/// Per-flavor counts over (pT bin, eta bin), plus the cut bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct FlavorHistograms {
    pub light: Histogram2D,
    pub charm: Histogram2D,
    pub bottom: Histogram2D,
    /// Rows that failed the quality cuts.
    pub rejected: u64,
    /// Rows that passed the cuts but carried no flavor flag.
    pub unflagged: u64,
}

impl FlavorHistograms {
    pub fn new(n_pt: usize, n_eta: usize) -> FlavorHistograms {
        FlavorHistograms {
            light: Histogram2D::new(n_pt, n_eta),
            charm: Histogram2D::new(n_pt, n_eta),
            bottom: Histogram2D::new(n_pt, n_eta),
            rejected: 0,
            unflagged: 0,
        }
    }

    pub fn fill(&mut self, flavor: Flavor, pt_bin: usize, eta_bin: usize) {
        match flavor {
            Flavor::Light => self.light.fill(pt_bin, eta_bin),
            Flavor::Charm => self.charm.fill(pt_bin, eta_bin),
            Flavor::Bottom => self.bottom.fill(pt_bin, eta_bin),
        }
    }

    /// Adds another set of counts with the same binning.
    pub fn merge(&mut self, other: &FlavorHistograms) -> Result<()> {
        self.light.merge(&other.light)?;
        self.charm.merge(&other.charm)?;
        self.bottom.merge(&other.bottom)?;
        self.rejected += other.rejected;
        self.unflagged += other.unflagged;
        Ok(())
    }
}

/// Bounded count ratio used when the CDF method is off:
/// `min(max(light, 1) / (k * max(class, 1)), cap)`.
///
/// Empty cells count as 1, which pulls sparse bins toward a factor of 1.
pub fn direct_ratio(light: u64, class: u64, k: f64, cap: f64) -> f64 {
    (light.max(1) as f64 / (k * class.max(1) as f64)).min(cap)
}

/// Two-pass estimator of flavor correction factors.
#[derive(Debug, Clone, Default)]
pub struct ReweightEstimator {
    config: ReweightConfig,
}

impl ReweightEstimator {
    pub fn new(config: ReweightConfig) -> Result<ReweightEstimator> {
        config.validate()?;
        Ok(ReweightEstimator { config })
    }

    pub fn config(&self) -> &ReweightConfig {
        &self.config
    }

    /// Number of rows read from the start of a source with `rows` entries.
    pub fn sample_size(&self, rows: usize) -> usize {
        if rows == 0 {
            return 0;
        }
        let n = (self.config.sample_fraction * rows as f64).ceil() as usize;
        n.clamp(1, rows)
    }

    /// Applies the quality cuts to the current row.
    pub fn passes_cuts<S: RecordSource + ?Sized>(&self, record: &S) -> Result<bool> {
        let fields = &self.config.fields;
        let cuts = &self.config.cuts;
        let pt = record.field_as_double(&fields.pt)?;
        let eta = record.field_as_double(&fields.eta)?;
        if !(eta.abs() < cuts.eta_max && pt > cuts.pt_min && pt < cuts.pt_max) {
            return Ok(false);
        }
        match &fields.truth {
            Some(truth) => Ok(record.field_as_double(truth)? < cuts.truth_max),
            None => Ok(true),
        }
    }

    /// First pass: fills one histogram per flavor from the sampled rows.
    pub fn accumulate<S: RecordSource + ?Sized>(&self, source: &mut S) -> Result<FlavorHistograms> {
        let fields = &self.config.fields;
        let pt_bins = &self.config.pt_bins;
        let eta_bins = &self.config.eta_bins;
        let mut hists = FlavorHistograms::new(pt_bins.num_bins(), eta_bins.num_bins());

        let n_estimate = self.sample_size(source.num_entries());
        for i in 0..n_estimate {
            source.select_row(i)?;
            if !self.passes_cuts(&*source)? {
                hists.rejected += 1;
                continue;
            }
            match Flavor::of_record(&*source, fields)? {
                Some(flavor) => {
                    let pt = source.field_as_double(&fields.pt)?;
                    let eta = source.field_as_double(&fields.eta)?;
                    hists.fill(flavor, pt_bins.categorize(pt), eta_bins.categorize(eta.abs()));
                }
                None => hists.unflagged += 1,
            }
        }

        log::info!(
            "reweighting sample: {} rows read, light {}, charm {}, bottom {}, rejected {}, unflagged {}",
            n_estimate,
            hists.light.total(),
            hists.charm.total(),
            hists.bottom.total(),
            hists.rejected,
            hists.unflagged
        );
        Ok(hists)
    }

    /// Second pass: turns the histograms into a frozen correction table.
    pub fn corrections(&self, hists: &FlavorHistograms, cdf: bool, relative: bool) -> Result<CorrectionTable> {
        let (charm, bottom) = if cdf {
            self.cdf_corrections(hists, relative)
        } else {
            self.direct_corrections(hists)
        };

        log::debug!("charm correction: {charm:?}");
        log::debug!("bottom correction: {bottom:?}");

        CorrectionTable::new(
            self.config.pt_bins.clone(),
            self.config.eta_bins.clone(),
            self.config.fields.clone(),
            charm,
            bottom,
        )
    }

    /// Runs both passes over `source`.
    pub fn determine_reweighting<S: RecordSource + ?Sized>(
        &self,
        source: &mut S,
        cdf: bool,
        relative: bool,
    ) -> Result<CorrectionTable> {
        let hists = self.accumulate(source)?;
        self.corrections(&hists, cdf, relative)
    }

    /// Same as `determine_reweighting` with the `cdf`/`relative` flags of the config.
    pub fn run<S: RecordSource + ?Sized>(&self, source: &mut S) -> Result<CorrectionTable> {
        self.determine_reweighting(source, self.config.cdf, self.config.relative)
    }

    fn direct_corrections(&self, hists: &FlavorHistograms) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let (n_pt, n_eta) = hists.light.shape();
        let cap = self.config.max_correction;
        let mut charm = vec![vec![0.0; n_eta]; n_pt];
        let mut bottom = vec![vec![0.0; n_eta]; n_pt];
        for i in 0..n_pt {
            for j in 0..n_eta {
                let light = hists.light.get(i, j);
                charm[i][j] = direct_ratio(light, hists.charm.get(i, j), self.config.k_charm, cap);
                bottom[i][j] = direct_ratio(light, hists.bottom.get(i, j), self.config.k_bottom, cap);
            }
        }
        (charm, bottom)
    }

    fn cdf_corrections(&self, hists: &FlavorHistograms, relative: bool) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
        let targets = &self.config.targets;
        let light = invert_cdf(&hists.light.cdf(), targets.light);
        let mut charm = invert_cdf(&hists.charm.cdf(), targets.charm);
        let mut bottom = invert_cdf(&hists.bottom.cdf(), targets.bottom);

        if relative {
            for grid in [&mut charm, &mut bottom] {
                for (row, light_row) in grid.iter_mut().zip(&light) {
                    for (value, l) in row.iter_mut().zip(light_row) {
                        *value /= l;
                    }
                }
            }
        }
        (charm, bottom)
    }
}

/// `target / cdf` per cell; cells with an empty cumulative count get 1.0.
fn invert_cdf(cdf: &[Vec<f64>], target: f64) -> Vec<Vec<f64>> {
    cdf.iter()
        .map(|row| {
            row.iter()
                .map(|&c| if c > 0.0 { target / c } else { 1.0 })
                .collect()
        })
        .collect()
}
