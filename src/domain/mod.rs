//! Core domain types and logic.

pub mod config_validation;
pub mod criteria;
pub mod error;
pub mod evaluator;
pub mod forward_returns;
pub mod indicator;
pub mod indicator_panel;
pub mod price_series;
pub mod screen_config;
pub mod screener;
pub mod tracker;
pub mod universe;
