pub mod minify;
pub mod pipeline;
pub mod result;
pub mod stage;

pub use pipeline::{Pipeline, PipelineError, ProcessOutput};
pub use result::{Message, ProcessOptions, ProcessResult};
pub use stage::Stage;
