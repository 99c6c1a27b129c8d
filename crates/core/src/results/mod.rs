//! Results module - the canonical analysis result shown on the kiosk.

mod results_model;

pub use results_model::{AnalysisContent, AnalysisResult, ResultMeta};
