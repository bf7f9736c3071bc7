//! Library surface for sockdash: sample model, rate estimation, chart
//! history, the metrics pipeline, and the WebSocket session driver.

pub mod app;
pub mod history;
pub mod logging;
pub mod pipeline;
pub mod profiles;
pub mod rate;
pub mod types;
pub mod ui;
pub mod ws;

pub use pipeline::{ConnState, Pipeline, PipelineError, Snapshot};
