pub mod aggregator;
pub mod client;
pub mod constants;
pub mod retry;
