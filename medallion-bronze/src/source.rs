use std::future::Future;

use serde_json::Value;

use medallion_shared::clients::sheets::{SheetsClient, Spreadsheet};
use medallion_shared::{PipelineConfig, PipelineResult};

/// Where the bronze stage reads worksheets from.
pub trait SheetSource {
    /// Open the configured spreadsheet, by id when one is set, otherwise by name.
    fn open_spreadsheet(&self, config: &PipelineConfig) -> impl Future<Output = PipelineResult<Spreadsheet>>;

    /// All rows of one worksheet, header row first.
    fn fetch_worksheet(
        &self,
        spreadsheet: &Spreadsheet,
        title: &str,
    ) -> impl Future<Output = PipelineResult<Vec<Vec<Value>>>>;
}

impl SheetSource for SheetsClient {
    async fn open_spreadsheet(&self, config: &PipelineConfig) -> PipelineResult<Spreadsheet> {
        match &config.spreadsheet_id {
            Some(id) => self.open_by_id(id).await,
            None => self.open_by_name(&config.spreadsheet_name).await,
        }
    }

    async fn fetch_worksheet(&self, spreadsheet: &Spreadsheet, title: &str) -> PipelineResult<Vec<Vec<Value>>> {
        self.worksheet_values(spreadsheet, title).await
    }
}
