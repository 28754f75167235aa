//! Contains the types and functions for the high level pipeline builder API.

mod colorspace;
mod options;
mod segment_pipeline;

pub use colorspace::ColorSpace;
pub use options::KmeansOptions;
pub use segment_pipeline::{SegmentOutput, SegmentPipeline};
