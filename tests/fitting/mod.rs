//! Fitting tests against synthetic titrations.

pub mod binding_models;
pub mod optimizer;
