use serde::{Serialize, Deserialize};

use crate::data::source::RecordSource;
use crate::error::{NnError, Result};
use crate::reweight::binning::Binning;
use crate::reweight::config::FieldNames;

/// Jet flavor class. Exactly one flag is set on a well-formed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flavor {
    Light,
    Charm,
    Bottom,
}

impl Flavor {
    /// Reads the flavor flags of the current row, checked in the order
    /// light, charm, bottom. `None` when no flag is set.
    pub fn of_record<S: RecordSource + ?Sized>(record: &S, fields: &FieldNames) -> Result<Option<Flavor>> {
        if record.field_as_int(&fields.light)? == 1 {
            Ok(Some(Flavor::Light))
        } else if record.field_as_int(&fields.charm)? == 1 {
            Ok(Some(Flavor::Charm))
        } else if record.field_as_int(&fields.bottom)? == 1 {
            Ok(Some(Flavor::Bottom))
        } else {
            Ok(None)
        }
    }
}

/// Frozen per-bin correction factors for charm and bottom, stored with the
/// binning that produced them. Light is the reference class (factor 1.0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionTable {
    pt_bins: Binning,
    eta_bins: Binning,
    fields: FieldNames,
    charm: Vec<Vec<f64>>,
    bottom: Vec<Vec<f64>>,
}

impl CorrectionTable {
    pub fn new(
        pt_bins: Binning,
        eta_bins: Binning,
        fields: FieldNames,
        charm: Vec<Vec<f64>>,
        bottom: Vec<Vec<f64>>,
    ) -> Result<CorrectionTable> {
        let table = CorrectionTable { pt_bins, eta_bins, fields, charm, bottom };
        table.validate()?;
        Ok(table)
    }

    fn validate(&self) -> Result<()> {
        let shape = (self.pt_bins.num_bins(), self.eta_bins.num_bins());
        for (name, grid) in [("charm", &self.charm), ("bottom", &self.bottom)] {
            if grid.len() != shape.0 || grid.iter().any(|row| row.len() != shape.1) {
                return Err(NnError::InvalidBins(format!(
                    "{name} correction grid does not match {}x{} bins",
                    shape.0, shape.1
                )));
            }
        }
        Ok(())
    }

    pub fn pt_bins(&self) -> &Binning {
        &self.pt_bins
    }

    pub fn eta_bins(&self) -> &Binning {
        &self.eta_bins
    }

    pub fn charm_correction(&self) -> &[Vec<f64>] {
        &self.charm
    }

    pub fn bottom_correction(&self) -> &[Vec<f64>] {
        &self.bottom
    }

    /// Factor for a jet of `flavor` at (`pt`, `eta`); eta is binned on |eta|
    /// and out-of-range values clamp to the edge bins.
    pub fn factor(&self, flavor: Flavor, pt: f64, eta: f64) -> f64 {
        let grid = match flavor {
            Flavor::Light => return 1.0,
            Flavor::Charm => &self.charm,
            Flavor::Bottom => &self.bottom,
        };
        grid[self.pt_bins.categorize(pt)][self.eta_bins.categorize(eta.abs())]
    }

    /// Reweighting factor of the record's current row. Rows without a flavor
    /// flag get the neutral factor 1.0.
    pub fn get_physics_reweighting<S: RecordSource + ?Sized>(&self, record: &S) -> Result<f64> {
        match Flavor::of_record(record, &self.fields)? {
            None | Some(Flavor::Light) => Ok(1.0),
            Some(flavor) => {
                let pt = record.field_as_double(&self.fields.pt)?;
                let eta = record.field_as_double(&self.fields.eta)?;
                Ok(self.factor(flavor, pt, eta))
            }
        }
    }

    /// Writes both grids together with their bin edges.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    pub fn load_json(path: &str) -> Result<CorrectionTable> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let table: CorrectionTable = serde_json::from_reader(reader)?;
        table.validate()?;
        Ok(table)
    }
}
