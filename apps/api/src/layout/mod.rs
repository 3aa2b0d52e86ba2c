// Cookbook pagination engine.
// Recipe → AutoFitter (hero) + ColumnBalancer (content page) → OverflowPaginator → PageAssembler.
// All heights come from an injected TextMeasurer; nothing here performs I/O.

pub mod assembler;
pub mod autofit;
pub mod balancer;
pub mod engine;
pub mod font_metrics;
pub mod geometry;
pub mod handlers;
pub mod measure;
pub mod overflow;

#[cfg(test)]
pub(crate) mod test_support;

use thiserror::Error;

use crate::layout::measure::BlockId;

// Re-export the public API consumed by the service layer and renderers.
pub use assembler::{Column, ColumnRole, ContentPage, HeroPage, LayoutPlan, OverflowPage, Page};
pub use engine::{compute_layout, LayoutSession};
pub use font_metrics::{FontFamily, MetricTextMeasurer};
pub use geometry::{default_page_geometry, BalancerConfig, PageGeometry, TailEstimate};
pub use measure::{ContentBlock, Measured, TextMeasurer};

/// The engine cannot produce a plan yet. Callers retry after the next measurement pass.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NotReady {
    #[error("geometry not laid out: {what} is {value}")]
    DegenerateGeometry { what: &'static str, value: f32 },

    #[error("measurement pending for {block:?}")]
    MeasurementPending { block: BlockId },
}
