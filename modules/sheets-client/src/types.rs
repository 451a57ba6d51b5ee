use serde::{Deserialize, Serialize};

// --- Auth types ---

/// The fields of a Google service account JSON key that the client needs.
/// Unknown fields (project_id, client_id, ...) are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// JWT claims for the OAuth2 JWT-bearer grant.
#[derive(Debug, Serialize)]
pub(crate) struct JwtClaims<'a> {
    pub iss: &'a str,
    pub scope: &'a str,
    pub aud: &'a str,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_expires_in")]
    pub expires_in: i64,
}

fn default_expires_in() -> i64 {
    3600
}

// --- Spreadsheet metadata ---

#[derive(Debug, Deserialize)]
pub(crate) struct SpreadsheetMeta {
    #[serde(default)]
    pub sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SheetEntry {
    pub properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SheetProperties {
    pub title: String,
}

// --- Values ---

/// A block of cell values. The API omits `values` entirely for an empty range.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub range: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AppendBody<'a> {
    pub values: &'a [Vec<serde_json::Value>],
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppendResponse {
    #[serde(default, rename = "tableRange")]
    pub table_range: Option<String>,
    #[serde(default)]
    pub updates: Option<AppendUpdates>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppendUpdates {
    #[serde(default, rename = "updatedRange")]
    pub updated_range: Option<String>,
    #[serde(default, rename = "updatedRows")]
    pub updated_rows: u32,
}

/// Render a cell as the plain string the sheet UI would show.
pub fn cell_to_string(cell: &serde_json::Value) -> String {
    match cell {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
