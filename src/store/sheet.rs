use async_trait::async_trait;
use tracing::info;

use super::{RecordStore, decode_rows};
use crate::error::{RemoteError, StoreError};
use crate::parser::{HEADER, to_row};
use crate::reading::Reading;
use crate::services::sheets_api::{SheetsApi, parse_spreadsheet_key};

pub const NEW_SPREADSHEET_TITLE: &str = "Blood Pressure Logger Data";

const NEW_WORKSHEET_ROWS: u32 = 1000;
const NEW_WORKSHEET_COLS: u32 = 20;

/// Store backed by one worksheet of a remote spreadsheet.
pub struct SheetStore<A> {
    api: A,
    spreadsheet_id: String,
    worksheet: String,
}

impl<A: SheetsApi> SheetStore<A> {
    /// Resolves the target worksheet, creating what is missing.
    ///
    /// With no `spreadsheet` a new spreadsheet is created.
    /// A missing worksheet is added and given the header row.
    pub async fn provision(
        api: A,
        spreadsheet: Option<&str>,
        worksheet: &str,
    ) -> Result<Self, RemoteError> {
        let spreadsheet_id = match spreadsheet {
            Some(raw) => parse_spreadsheet_key(raw)
                .ok_or_else(|| RemoteError::NotFound(format!("no spreadsheet key in '{raw}'")))?,
            None => {
                let id = api.create_spreadsheet(NEW_SPREADSHEET_TITLE).await?;
                info!(spreadsheet_id = %id, "Created spreadsheet");
                id
            }
        };

        let titles = api.worksheet_titles(&spreadsheet_id).await?;
        if !titles.iter().any(|t| t == worksheet) {
            api.add_worksheet(
                &spreadsheet_id,
                worksheet,
                NEW_WORKSHEET_ROWS,
                NEW_WORKSHEET_COLS,
            )
            .await?;

            let header: Vec<String> = HEADER.iter().map(|h| h.to_string()).collect();
            api.set_header(&spreadsheet_id, worksheet, &header).await?;
            info!(spreadsheet_id = %spreadsheet_id, worksheet, "Added worksheet");
        }

        Ok(Self {
            api,
            spreadsheet_id,
            worksheet: worksheet.to_string(),
        })
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub fn worksheet(&self) -> &str {
        &self.worksheet
    }
}

#[async_trait]
impl<A: SheetsApi> RecordStore for SheetStore<A> {
    async fn append(&self, reading: &Reading) -> Result<(), StoreError> {
        self.api
            .append_row(&self.spreadsheet_id, &self.worksheet, &to_row(reading))
            .await?;
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<Reading>, StoreError> {
        let rows = self
            .api
            .read_rows(&self.spreadsheet_id, &self.worksheet)
            .await?;
        Ok(decode_rows(rows, &self.describe()))
    }

    fn describe(&self) -> String {
        format!("spreadsheet {} / {}", self.spreadsheet_id, self.worksheet)
    }
}
