pub mod catalog;
pub mod dataset;
