//! Detection: segmentation, scoring, aggregation, and the detect endpoint.

pub mod aggregate;
pub mod handlers;
pub mod pipeline;
pub mod scoring;
pub mod segmenter;
