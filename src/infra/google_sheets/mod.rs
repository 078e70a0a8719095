mod client;

pub use client::{GoogleSheetsClient, SHEETS_BASE_URL};
