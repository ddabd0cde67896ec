//! Built-in binding models and the factory that selects them by id.
//!
//! Every model keeps its state in a [`ModelCore`] and only supplies the basis
//! that multiplies its local parameters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::dataset::Dataset;
use crate::error::{FitError, Result};
use crate::model::{Model, ModelCore};

pub mod equilibrium;
mod michaelis_menten;
mod one_to_one;
mod one_to_two;

pub use michaelis_menten::MichaelisMenten;
pub use one_to_one::OneToOne;
pub use one_to_two::OneToTwo;

/// Identifier of a concrete model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelId {
    /// 1:1 host-guest NMR titration.
    OneToOne,
    /// 1:1 / 1:2 host-guest NMR titration.
    OneToTwo,
    /// Michaelis-Menten initial rates.
    MichaelisMenten,
}

impl ModelId {
    pub fn name(&self) -> &'static str {
        match self {
            ModelId::OneToOne => "1:1",
            ModelId::OneToTwo => "1:1/1:2",
            ModelId::MichaelisMenten => "Michaelis-Menten",
        }
    }

    /// Numeric id used in stored projects.
    pub fn code(&self) -> u32 {
        match self {
            ModelId::OneToOne => 1,
            ModelId::OneToTwo => 2,
            ModelId::MichaelisMenten => 3,
        }
    }

    pub fn from_code(code: u32) -> Result<Self> {
        match code {
            1 => Ok(ModelId::OneToOne),
            2 => Ok(ModelId::OneToTwo),
            3 => Ok(ModelId::MichaelisMenten),
            other => Err(FitError::UnknownModel(format!("model id {}", other))),
        }
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelId {
    type Err = FitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "1:1" | "OneToOne" => Ok(ModelId::OneToOne),
            "1:1/1:2" | "OneToTwo" => Ok(ModelId::OneToTwo),
            "Michaelis-Menten" | "MichaelisMenten" => Ok(ModelId::MichaelisMenten),
            other => other
                .parse::<u32>()
                .map_err(|_| FitError::UnknownModel(other.to_string()))
                .and_then(ModelId::from_code),
        }
    }
}

/// Create a model of the given kind over `dataset`.
pub fn create_model(id: ModelId, dataset: Arc<Dataset>) -> Result<Box<dyn Model>> {
    Ok(match id {
        ModelId::OneToOne => Box::new(OneToOne::new(dataset)?),
        ModelId::OneToTwo => Box::new(OneToTwo::new(dataset)?),
        ModelId::MichaelisMenten => Box::new(MichaelisMenten::new(dataset)?),
    })
}

fn require_inputs(dataset: &Dataset, needed: usize, id: ModelId) -> Result<()> {
    if dataset.inputs() < needed {
        return Err(FitError::InvalidInput(format!(
            "{} model needs {} independent columns, dataset has {}",
            id,
            needed,
            dataset.inputs()
        )));
    }
    Ok(())
}

/// Start the first local of each series at its first active data value and
/// the last local at its last active data value.
fn guess_endpoint_locals(core: &mut ModelCore) {
    let rows = core.dataset().active_row_indices();
    let (first, last) = match (rows.first(), rows.last()) {
        (Some(&f), Some(&l)) => (f, l),
        _ => return,
    };
    let lc = core.local_count();
    let g = core.global_count();
    for s in 0..core.series_count() {
        let start = core.dataset().dependent()[[first, s]];
        let end = core.dataset().dependent()[[last, s]];
        core.set_parameter(g + s * lc, start);
        if lc > 1 {
            core.set_parameter(g + s * lc + lc - 1, end);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_model_ids() {
        assert_eq!("1:1".parse::<ModelId>().unwrap(), ModelId::OneToOne);
        assert_eq!("3".parse::<ModelId>().unwrap(), ModelId::MichaelisMenten);
        assert!("9".parse::<ModelId>().is_err());
        assert_eq!(ModelId::from_code(2).unwrap().code(), 2);
    }

    #[test]
    fn test_factory_checks_inputs() {
        let data = Arc::new(
            Dataset::new(Array2::ones((4, 1)), Array2::ones((4, 1))).unwrap(),
        );
        assert!(create_model(ModelId::OneToOne, Arc::clone(&data)).is_err());
        let mm = create_model(ModelId::MichaelisMenten, data).unwrap();
        assert_eq!(mm.id(), ModelId::MichaelisMenten);
        assert_eq!(mm.name(), "Michaelis-Menten");
    }
}
