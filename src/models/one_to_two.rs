//! 1:1 / 1:2 host-guest NMR titration.

use std::sync::Arc;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::model::{Model, ModelCore};

use super::equilibrium::one_to_two_species;
use super::{guess_endpoint_locals, require_inputs, ModelId};

/// H + G ⇌ HG, HG + G ⇌ HG₂ with stepwise constants `lg K11` and `lg K12`.
///
/// Per series the shifts of H, HG and HG₂, each weighted by its host mole
/// fraction.
#[derive(Debug, Clone)]
pub struct OneToTwo {
    core: ModelCore,
}

impl OneToTwo {
    pub fn new(dataset: Arc<Dataset>) -> Result<Self> {
        require_inputs(&dataset, 2, ModelId::OneToTwo)?;
        let mut core = ModelCore::new(
            dataset,
            &["lg K11", "lg K12"],
            &[3.0, 1.0],
            &["δ H", "δ HG", "δ HG2"],
        );
        guess_endpoint_locals(&mut core);
        Ok(Self { core })
    }
}

impl Model for OneToTwo {
    fn id(&self) -> ModelId {
        ModelId::OneToTwo
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
        let input = self.core.dataset().independent();
        let host = input[[row, 0]];
        let guest = input[[row, 1]];
        if host <= 0.0 {
            return vec![1.0, 0.0, 0.0];
        }
        let globals = self.core.globals();
        let k11 = 10f64.powf(globals[0]);
        let k12 = 10f64.powf(globals[1]);
        let (h, hg, hg2) = one_to_two_species(host, guest, k11, k12);
        vec![h / host, hg / host, hg2 / host]
    }
}
