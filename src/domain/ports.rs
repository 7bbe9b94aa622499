use crate::core::inflation::InflationTable;
use crate::domain::model::{AnalysisReport, InventoryTable};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    /// Human readable location of `path` inside this storage.
    fn locate(&self, path: &str) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn input_path(&self) -> &str;
    fn output_path(&self) -> &str;
    fn material_column(&self) -> &str;
    fn price_column(&self) -> &str;
    fn price_target_year(&self) -> i32;
    fn replenishment_target_year(&self) -> i32;
    fn material(&self) -> Option<&str>;
    fn inflation(&self) -> &InflationTable;
    fn output_formats(&self) -> &[String];
    fn compression_filename(&self) -> Option<&str>;
    fn analysis_name(&self) -> Option<&str> {
        None
    }
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<InventoryTable>;
    async fn transform(&self, table: InventoryTable) -> Result<AnalysisReport>;
    async fn load(&self, report: &AnalysisReport) -> Result<String>;
}
