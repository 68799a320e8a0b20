pub mod exporter;
pub mod synthesizer;
