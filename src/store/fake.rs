//! In-memory [`SheetsApi`] used by the store tests.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::RemoteError;
use crate::services::sheets_api::SheetsApi;

#[derive(Default)]
struct State {
    spreadsheets: BTreeMap<String, BTreeMap<String, Vec<Vec<String>>>>,
    created: usize,
    offline: bool,
}

/// Clones share state, so a test can keep a handle after moving one into a store.
#[derive(Clone, Default)]
pub(crate) struct FakeSheets {
    state: Arc<Mutex<State>>,
}

impl FakeSheets {
    pub fn with_spreadsheet(id: &str, worksheets: &[&str]) -> Self {
        let fake = Self::default();
        {
            let mut state = fake.lock();
            let sheets = state.spreadsheets.entry(id.to_string()).or_default();
            for ws in worksheets {
                sheets.insert(ws.to_string(), Vec::new());
            }
        }
        fake
    }

    /// Every subsequent call fails with a network error.
    pub fn go_offline(&self) {
        self.lock().offline = true;
    }

    pub fn created(&self) -> usize {
        self.lock().created
    }

    pub fn spreadsheet_ids(&self) -> Vec<String> {
        self.lock().spreadsheets.keys().cloned().collect()
    }

    pub fn rows(&self, id: &str, worksheet: &str) -> Vec<Vec<String>> {
        self.lock()
            .spreadsheets
            .get(id)
            .and_then(|s| s.get(worksheet))
            .cloned()
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    fn online(&self) -> Result<MutexGuard<'_, State>, RemoteError> {
        let state = self.lock();
        if state.offline {
            return Err(RemoteError::Network("connection refused".into()));
        }
        Ok(state)
    }
}

fn worksheet<'a>(
    state: &'a mut State,
    id: &str,
    ws: &str,
) -> Result<&'a mut Vec<Vec<String>>, RemoteError> {
    state
        .spreadsheets
        .get_mut(id)
        .ok_or_else(|| RemoteError::NotFound(id.to_string()))?
        .get_mut(ws)
        .ok_or_else(|| RemoteError::Protocol(format!("Unable to parse range: {ws}")))
}

#[async_trait]
impl SheetsApi for FakeSheets {
    async fn create_spreadsheet(&self, _title: &str) -> Result<String, RemoteError> {
        let mut state = self.online()?;
        state.created += 1;
        let id = format!("created-{}", state.created);
        state
            .spreadsheets
            .insert(id.clone(), BTreeMap::from([("Sheet1".to_string(), Vec::new())]));
        Ok(id)
    }

    async fn worksheet_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>, RemoteError> {
        let state = self.online()?;
        state
            .spreadsheets
            .get(spreadsheet_id)
            .map(|s| s.keys().cloned().collect())
            .ok_or_else(|| RemoteError::NotFound(spreadsheet_id.to_string()))
    }

    async fn add_worksheet(
        &self,
        spreadsheet_id: &str,
        title: &str,
        _rows: u32,
        _cols: u32,
    ) -> Result<(), RemoteError> {
        let mut state = self.online()?;
        state
            .spreadsheets
            .get_mut(spreadsheet_id)
            .ok_or_else(|| RemoteError::NotFound(spreadsheet_id.to_string()))?
            .insert(title.to_string(), Vec::new());
        Ok(())
    }

    async fn set_header(
        &self,
        spreadsheet_id: &str,
        ws: &str,
        header: &[String],
    ) -> Result<(), RemoteError> {
        let mut state = self.online()?;
        let rows = worksheet(&mut state, spreadsheet_id, ws)?;
        match rows.first_mut() {
            Some(first) => *first = header.to_vec(),
            None => rows.push(header.to_vec()),
        }
        Ok(())
    }

    async fn append_row(
        &self,
        spreadsheet_id: &str,
        ws: &str,
        row: &[String],
    ) -> Result<(), RemoteError> {
        let mut state = self.online()?;
        worksheet(&mut state, spreadsheet_id, ws)?.push(row.to_vec());
        Ok(())
    }

    async fn read_rows(
        &self,
        spreadsheet_id: &str,
        ws: &str,
    ) -> Result<Vec<Vec<String>>, RemoteError> {
        let mut state = self.online()?;
        Ok(worksheet(&mut state, spreadsheet_id, ws)?.clone())
    }
}
