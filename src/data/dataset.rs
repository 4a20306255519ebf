use std::collections::BTreeMap;
use std::sync::Arc;

use crate::data::numeric::FieldType;
use crate::data::source::RecordSource;
use crate::error::{NnError, Result};
use crate::reweight::binning::Binning;
use crate::reweight::config::ReweightConfig;
use crate::reweight::estimator::ReweightEstimator;
use crate::reweight::table::CorrectionTable;

/// A field that could not be bound, with the reason.
pub type BindFailure = (String, NnError);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Input,
    Output,
    Control,
}

/// Binds named fields of a `RecordSource` as network inputs, targets and
/// control variables, and carries the flavor reweighting for that source.
///
/// Binding returns a status per field instead of stopping at the first
/// failure, so a whole field list can be checked in one go.
pub struct Dataset<S: RecordSource> {
    source: S,
    input_vars: Vec<String>,
    output_vars: Vec<String>,
    control_vars: Vec<String>,
    reweight: ReweightConfig,
    table: Option<Arc<CorrectionTable>>,
}

impl<S: RecordSource> Dataset<S> {
    pub fn new(source: S) -> Dataset<S> {
        Dataset {
            source,
            input_vars: Vec::new(),
            output_vars: Vec::new(),
            control_vars: Vec::new(),
            reweight: ReweightConfig::default(),
            table: None,
        }
    }

    /// Binds `name` as a network input. `type_name` is `"double"`, `"float"` or `"int"`.
    pub fn set_input_branch(&mut self, name: &str, type_name: &str) -> Result<()> {
        self.bind(name, type_name, Role::Input)
    }

    pub fn set_output_branch(&mut self, name: &str, type_name: &str) -> Result<()> {
        self.bind(name, type_name, Role::Output)
    }

    /// Binds a field that is read (cuts, flavor flags, performance maps) but
    /// not fed to the network.
    pub fn set_control_branch(&mut self, name: &str, type_name: &str) -> Result<()> {
        self.bind(name, type_name, Role::Control)
    }

    pub fn bind_inputs(&mut self, fields: &[(&str, &str)]) -> Vec<BindFailure> {
        self.bind_all(fields, Role::Input)
    }

    pub fn bind_outputs(&mut self, fields: &[(&str, &str)]) -> Vec<BindFailure> {
        self.bind_all(fields, Role::Output)
    }

    pub fn bind_controls(&mut self, fields: &[(&str, &str)]) -> Vec<BindFailure> {
        self.bind_all(fields, Role::Control)
    }

    fn bind_all(&mut self, fields: &[(&str, &str)], role: Role) -> Vec<BindFailure> {
        fields.iter()
            .filter_map(|&(name, type_name)| {
                self.bind(name, type_name, role).err().map(|e| (name.to_string(), e))
            })
            .collect()
    }

    fn bind(&mut self, name: &str, type_name: &str, role: Role) -> Result<()> {
        let result = self.check_binding(name, type_name, role);
        match result {
            Ok(()) => {
                self.vars_mut(role).push(name.to_string());
                Ok(())
            }
            Err(e) => {
                log::warn!("could not bind {:?} field \"{}\": {}", role, name, e);
                Err(e)
            }
        }
    }

    fn check_binding(&self, name: &str, type_name: &str, role: Role) -> Result<()> {
        let declared = FieldType::parse(type_name)?;
        let stored = self.source.field_type(name)
            .ok_or_else(|| NnError::UnknownField(name.to_string()))?;
        if declared != stored {
            return Err(NnError::FieldTypeMismatch { name: name.to_string(), declared, stored });
        }
        if self.vars(role).iter().any(|v| v == name) {
            return Err(NnError::DuplicateField(name.to_string()));
        }
        Ok(())
    }

    fn vars(&self, role: Role) -> &Vec<String> {
        match role {
            Role::Input => &self.input_vars,
            Role::Output => &self.output_vars,
            Role::Control => &self.control_vars,
        }
    }

    fn vars_mut(&mut self, role: Role) -> &mut Vec<String> {
        match role {
            Role::Input => &mut self.input_vars,
            Role::Output => &mut self.output_vars,
            Role::Control => &mut self.control_vars,
        }
    }

    pub fn get_input_vars(&self) -> &[String] {
        &self.input_vars
    }

    pub fn get_output_vars(&self) -> &[String] {
        &self.output_vars
    }

    pub fn get_control_vars(&self) -> &[String] {
        &self.control_vars
    }

    pub fn num_entries(&self) -> usize {
        self.source.num_entries()
    }

    /// Selects row `index` of the underlying source.
    pub fn at(&mut self, index: usize) -> Result<()> {
        self.source.select_row(index)
    }

    /// Bound input fields of the current row, in binding order.
    pub fn input(&self) -> Result<Vec<f64>> {
        self.read(&self.input_vars)
    }

    /// Bound output fields of the current row, in binding order.
    pub fn output(&self) -> Result<Vec<f64>> {
        self.read(&self.output_vars)
    }

    fn read(&self, names: &[String]) -> Result<Vec<f64>> {
        names.iter().map(|name| self.source.field_as_double(name)).collect()
    }

    /// Current-row values of `names`, keyed by name.
    pub fn get_performance_map(&self, names: &[&str]) -> Result<BTreeMap<String, f64>> {
        names.iter()
            .map(|&name| Ok((name.to_string(), self.source.field_as_double(name)?)))
            .collect()
    }

    pub fn get_value(&self, name: &str) -> Result<f64> {
        self.source.field_as_double(name)
    }

    pub fn set_pt_bins(&mut self, edges: Vec<f64>) -> Result<()> {
        self.reweight.pt_bins = Binning::new(edges)?;
        Ok(())
    }

    pub fn set_eta_bins(&mut self, edges: Vec<f64>) -> Result<()> {
        self.reweight.eta_bins = Binning::new(edges)?;
        Ok(())
    }

    pub fn reweight_config(&self) -> &ReweightConfig {
        &self.reweight
    }

    pub fn reweight_config_mut(&mut self) -> &mut ReweightConfig {
        &mut self.reweight
    }

    /// Builds the correction table from this source and keeps it for
    /// `get_physics_reweighting`. The returned handle shares the frozen table.
    pub fn determine_reweighting(&mut self, cdf: bool, relative: bool) -> Result<Arc<CorrectionTable>> {
        let estimator = ReweightEstimator::new(self.reweight.clone())?;
        let table = Arc::new(estimator.determine_reweighting(&mut self.source, cdf, relative)?);
        self.table = Some(Arc::clone(&table));
        Ok(table)
    }

    pub fn correction_table(&self) -> Option<&Arc<CorrectionTable>> {
        self.table.as_ref()
    }

    /// Reweighting factor of the current row.
    pub fn get_physics_reweighting(&self) -> Result<f64> {
        let table = self.table.as_ref()
            .ok_or_else(|| NnError::InvalidConfig("reweighting has not been determined".into()))?;
        table.get_physics_reweighting(&self.source)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
