pub mod context;
pub mod detector;
pub mod form_type;
pub mod insights;
pub mod merge;
