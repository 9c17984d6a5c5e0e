pub mod aggregators;
pub mod archive;
pub mod diagnostics;
pub mod errors;
pub mod fetch;
pub mod model;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod reader;
pub mod report;
pub mod rules;
pub mod stats;
pub mod validate;
