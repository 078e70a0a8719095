use tracing::{info, warn};

use super::{CsvStore, RecordStore, SheetStore, SpreadsheetMemo, StoreKind};
use crate::config::{Credentials, SheetsConfig, StoreConfig};
use crate::credentials::{ServiceAccountTokenSource, StaticToken, TokenSource};
use crate::error::{RemoteError, StoreError};
use crate::fetch::BasicClient;
use crate::fetch::auth::BearerAuth;
use crate::infra::google_sheets::GoogleSheetsClient;
use crate::reading::Reading;
use crate::services::sheets_api::SheetsApi;

/// The record store adapter: one interface over the spreadsheet and the CSV file.
///
/// The spreadsheet is used while it works. The first remote failure drops it
/// for the rest of the session and the operation is served from the CSV file.
pub struct ReadingStore {
    remote: Option<Box<dyn RecordStore>>,
    local: CsvStore,
}

impl ReadingStore {
    pub fn local_only(local: CsvStore) -> Self {
        Self {
            remote: None,
            local,
        }
    }

    pub fn with_remote(remote: Box<dyn RecordStore>, local: CsvStore) -> Self {
        Self {
            remote: Some(remote),
            local,
        }
    }

    /// Resolves the backing store once, at startup.
    ///
    /// Missing credentials select the CSV file quietly; a spreadsheet that
    /// cannot be reached or provisioned selects it with a warning.
    pub async fn connect(config: &StoreConfig) -> Self {
        let local = CsvStore::new(&config.csv_path);

        let Some(sheets) = &config.sheets else {
            info!(path = %local.describe(), "No spreadsheet credentials configured, using local CSV");
            return Self::local_only(local);
        };

        match sheets_client(sheets).await {
            Ok(api) => Self::open_remote(api, sheets, local).await,
            Err(e) => {
                warn!(error = %e, path = %local.describe(), "Spreadsheet unavailable, using local CSV");
                Self::local_only(local)
            }
        }
    }

    /// Provisions the configured worksheet through `api`.
    ///
    /// Without a configured spreadsheet, the one remembered beside the CSV file
    /// is reused; a newly created one is remembered there for later runs.
    pub async fn open_remote<A>(api: A, sheets: &SheetsConfig, local: CsvStore) -> Self
    where
        A: SheetsApi + 'static,
    {
        let memo = SpreadsheetMemo::beside(local.path());
        let spreadsheet = match &sheets.spreadsheet {
            Some(configured) => Some(configured.clone()),
            None => memo.recall().unwrap_or_else(|e| {
                warn!(error = %e, memo = %memo.path().display(), "Could not read remembered spreadsheet");
                None
            }),
        };

        match SheetStore::provision(api, spreadsheet.as_deref(), &sheets.worksheet).await {
            Ok(remote) => {
                if spreadsheet.is_none() {
                    match memo.remember(remote.spreadsheet_id()) {
                        Ok(()) => info!(
                            spreadsheet_id = %remote.spreadsheet_id(),
                            memo = %memo.path().display(),
                            "Remembered new spreadsheet for later runs"
                        ),
                        Err(e) => warn!(
                            error = %e,
                            spreadsheet_id = %remote.spreadsheet_id(),
                            "Could not remember new spreadsheet; set BP_SPREADSHEET to reuse it"
                        ),
                    }
                }
                info!(store = %remote.describe(), "Using spreadsheet store");
                Self::with_remote(Box::new(remote), local)
            }
            Err(e) => {
                warn!(error = %e, path = %local.describe(), "Spreadsheet unavailable, using local CSV");
                Self::local_only(local)
            }
        }
    }

    pub fn active(&self) -> StoreKind {
        if self.remote.is_some() {
            StoreKind::Remote
        } else {
            StoreKind::Local
        }
    }

    pub fn describe(&self) -> String {
        match &self.remote {
            Some(remote) => remote.describe(),
            None => self.local.describe(),
        }
    }

    /// Persists one reading and reports which store took it.
    pub async fn append(&mut self, reading: &Reading) -> Result<StoreKind, StoreError> {
        reading.ensure_positive()?;

        let outcome = match &self.remote {
            Some(remote) => Some(remote.append(reading).await),
            None => None,
        };
        match outcome {
            Some(Ok(())) => return Ok(StoreKind::Remote),
            Some(Err(e)) => self.fall_back("append", &e),
            None => {}
        }

        self.local.append(reading).await?;
        Ok(StoreKind::Local)
    }

    /// Returns every reading from the active store, in store order.
    pub async fn load_all(&mut self) -> Result<Vec<Reading>, StoreError> {
        let outcome = match &self.remote {
            Some(remote) => Some(remote.load_all().await),
            None => None,
        };
        match outcome {
            Some(Ok(readings)) => return Ok(readings),
            Some(Err(e)) => self.fall_back("load_all", &e),
            None => {}
        }

        self.local.load_all().await
    }

    /// Appends `readings` in order, stopping at the first error.
    pub async fn append_all(&mut self, readings: &[Reading]) -> Result<StoreKind, StoreError> {
        let mut used = self.active();
        for reading in readings {
            used = self.append(reading).await?;
        }
        Ok(used)
    }

    fn fall_back(&mut self, operation: &str, error: &StoreError) {
        if let Some(remote) = self.remote.take() {
            warn!(
                operation,
                error = %error,
                remote = %remote.describe(),
                path = %self.local.describe(),
                "Spreadsheet operation failed, switching to local CSV for this session"
            );
        }
    }
}

async fn sheets_client(
    sheets: &SheetsConfig,
) -> Result<GoogleSheetsClient<BearerAuth<BasicClient>>, RemoteError> {
    let token = match &sheets.credentials {
        Credentials::ServiceAccount(key) => {
            ServiceAccountTokenSource::new(BasicClient::new()?, key.clone())
                .access_token()
                .await?
        }
        Credentials::AccessToken(token) => StaticToken(token.clone()).access_token().await?,
    };

    let http = BearerAuth::new(BasicClient::new()?, &token)
        .map_err(|e| RemoteError::Auth(format!("unusable access token: {e}")))?;
    GoogleSheetsClient::with_base_url(http, &sheets.base_url)
}
