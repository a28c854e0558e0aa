//! Rewrite: the two substitution strategies and the rewrite endpoint.

pub mod handlers;
pub mod line_sub;
pub mod pipeline;
pub mod word_sub;
