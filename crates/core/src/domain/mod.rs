pub mod pipeline;
pub mod record;
pub mod response;
pub mod verdict;

pub use pipeline::AggregationPipeline;
pub use record::ProcurementRecord;
pub use response::{AssistantResponse, HandlerPath};
pub use verdict::{MessageKind, Verdict};
