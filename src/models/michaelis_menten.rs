//! Michaelis-Menten initial-rate kinetics.

use std::sync::Arc;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::model::{Model, ModelCore};

use super::{require_inputs, ModelId};

/// `v = v_max · S / (K_m + S)` with a global `K_m` and one `v_max` per series.
#[derive(Debug, Clone)]
pub struct MichaelisMenten {
    core: ModelCore,
}

impl MichaelisMenten {
    pub fn new(dataset: Arc<Dataset>) -> Result<Self> {
        require_inputs(&dataset, 1, ModelId::MichaelisMenten)?;
        let mut core = ModelCore::new(dataset, &["K_m"], &[1.0], &["v_max"]);
        let g = core.global_count();
        for s in 0..core.series_count() {
            let max = core
                .dataset()
                .dependent()
                .column(s)
                .iter()
                .cloned()
                .fold(f64::NEG_INFINITY, f64::max);
            core.set_parameter(g + s, max);
        }
        Ok(Self { core })
    }
}

impl Model for MichaelisMenten {
    fn id(&self) -> ModelId {
        ModelId::MichaelisMenten
    }

    fn core(&self) -> &ModelCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ModelCore {
        &mut self.core
    }

    fn clone_box(&self) -> Box<dyn Model> {
        Box::new(self.clone())
    }

    fn local_basis(&self, row: usize) -> Vec<f64> {
        let substrate = self.core.dataset().independent()[[row, 0]];
        let km = self.core.globals()[0];
        vec![substrate / (km + substrate)]
    }
}
