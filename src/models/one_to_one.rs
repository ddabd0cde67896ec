//! 1:1 host-guest NMR titration.

use std::sync::Arc;

use crate::dataset::Dataset;
use crate::error::Result;
use crate::model::{Model, ModelCore};

use super::equilibrium::one_to_one_complex;
use super::{guess_endpoint_locals, require_inputs, ModelId};

/// H + G ⇌ HG observed through a host-centred signal.
///
/// Independent columns: total host, total guest. One global parameter
/// `lg K11`; per series the shifts of the free host and of the complex,
/// weighted by the mole fractions `[H]/H₀` and `[HG]/H₀`.
#[derive(Debug, Clone)]
pub struct OneToOne {
    core: ModelCore,
}

impl OneToOne {
    pub fn new(dataset: Arc<Dataset>) -> Result<Self> {
        require_inputs(&dataset, 2, ModelId::OneToOne)?;
        let mut core = ModelCore::new(dataset, &["lg K11"], &[2.0], &["δ H", "δ HG"]);
        guess_endpoint_locals(&mut core);
        Ok(Self { core })
    }
}

impl Model for OneToOne {
    fn id(&self) -> ModelId {
        ModelId::OneToOne
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
            return vec![1.0, 0.0];
        }
        let k = 10f64.powf(self.core.globals()[0]);
        let complex = one_to_one_complex(host, guest, k);
        vec![(host - complex) / host, complex / host]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_signal_at_saturation_limits() {
        let independent = ndarray::arr2(&[[1e-3, 0.0], [1e-3, 1.0]]);
        let dependent = ndarray::arr2(&[[7.0], [8.0]]);
        let data = Arc::new(Dataset::new(independent, dependent).unwrap());
        let mut model = OneToOne::new(data).unwrap();
        assert_eq!(model.parameters().to_vec(), vec![2.0, 7.0, 8.0]);

        model.core_mut().set_inline_locals(false);
        model.set_parameters(&[6.0, 7.0, 8.0]);
        model.calculate();
        let signal: &Array2<f64> = model.core().signal();
        assert!((signal[[0, 0]] - 7.0).abs() < 1e-12);
        assert!((signal[[1, 0]] - 8.0).abs() < 1e-6);
    }
}
