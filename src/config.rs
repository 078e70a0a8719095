//! Store configuration, read from the environment (and `.env` via `dotenvy`).
//!
//! | Variable                      | Meaning                                   |
//! |-------------------------------|-------------------------------------------|
//! | `BP_CSV_PATH`                 | local CSV path (default `bp_data.csv`)    |
//! | `BP_SPREADSHEET`              | spreadsheet URL or key; unset = create    |
//! | `BP_WORKSHEET`                | worksheet title (default `bp_data`)       |
//! | `GOOGLE_SERVICE_ACCOUNT_JSON` | inline service-account key                |
//! | `GOOGLE_SERVICE_ACCOUNT_FILE` | path to a service-account key file        |
//! | `BP_SHEETS_ACCESS_TOKEN`      | pre-minted OAuth access token             |
//! | `BP_SHEETS_BASE_URL`          | Sheets API base URL override              |

use std::path::{Path, PathBuf};
use tracing::warn;

use crate::credentials::ServiceAccountKey;
use crate::infra::google_sheets::SHEETS_BASE_URL;
use crate::store::DEFAULT_CSV_PATH;

pub const DEFAULT_WORKSHEET: &str = "bp_data";

/// How the spreadsheet client authenticates.
#[derive(Debug, Clone)]
pub enum Credentials {
    ServiceAccount(ServiceAccountKey),
    AccessToken(String),
}

#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub credentials: Credentials,
    /// URL or key; `None` means a spreadsheet is created on connect.
    pub spreadsheet: Option<String>,
    pub worksheet: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub csv_path: PathBuf,
    /// `None` when no credentials are configured; the CSV store is used.
    pub sheets: Option<SheetsConfig>,
}

impl StoreConfig {
    pub fn local(csv_path: impl Into<PathBuf>) -> Self {
        Self {
            csv_path: csv_path.into(),
            sheets: None,
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let csv_path = get("BP_CSV_PATH").unwrap_or_else(|| DEFAULT_CSV_PATH.to_string());

        let sheets = load_credentials(&get).map(|credentials| SheetsConfig {
            credentials,
            spreadsheet: get("BP_SPREADSHEET"),
            worksheet: get("BP_WORKSHEET").unwrap_or_else(|| DEFAULT_WORKSHEET.to_string()),
            base_url: get("BP_SHEETS_BASE_URL").unwrap_or_else(|| SHEETS_BASE_URL.to_string()),
        });

        Self {
            csv_path: PathBuf::from(csv_path),
            sheets,
        }
    }
}

// Credentials that are configured but unreadable disable the spreadsheet with a warning.
fn load_credentials<F>(get: &F) -> Option<Credentials>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(json) = get("GOOGLE_SERVICE_ACCOUNT_JSON") {
        return match ServiceAccountKey::from_json(&json) {
            Ok(key) => Some(Credentials::ServiceAccount(key)),
            Err(e) => {
                warn!(error = %e, "GOOGLE_SERVICE_ACCOUNT_JSON is unusable, using local CSV");
                None
            }
        };
    }

    if let Some(path) = get("GOOGLE_SERVICE_ACCOUNT_FILE") {
        return match ServiceAccountKey::load(Path::new(&path)) {
            Ok(key) => Some(Credentials::ServiceAccount(key)),
            Err(e) => {
                warn!(error = %e, "GOOGLE_SERVICE_ACCOUNT_FILE is unusable, using local CSV");
                None
            }
        };
    }

    get("BP_SHEETS_ACCESS_TOKEN").map(Credentials::AccessToken)
}
