pub mod pipeline;
pub mod source;
