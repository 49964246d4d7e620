pub mod builder;
pub mod classifier;
pub mod field_model;
pub mod identity;
pub mod label;
pub mod normalize;
pub mod scorer;
pub mod type_deriver;
