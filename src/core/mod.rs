pub mod etl;
pub mod inflation;
pub mod ingest;
pub mod lifecycle;
pub mod pipeline;
pub mod report;
pub mod trend;

pub use crate::domain::model::{AnalysisReport, InventoryTable};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
