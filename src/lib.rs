pub mod calendar;
pub mod collecting;
pub mod config;
pub mod models;
