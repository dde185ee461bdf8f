pub mod pipeline;
pub mod png;
pub mod sink;
