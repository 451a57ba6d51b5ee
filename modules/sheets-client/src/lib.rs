pub mod auth;
pub mod error;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

pub use error::{Result, SheetsError};
pub use types::{cell_to_string, AppendResponse, AppendUpdates, ServiceAccountKey, ValueRange};

use auth::ServiceAccountAuth;
use types::{AppendBody, SpreadsheetMeta};
use url::Url;

const BASE_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

pub struct SheetsClient {
    client: reqwest::Client,
    auth: ServiceAccountAuth,
}

impl SheetsClient {
    pub fn new(key: ServiceAccountKey) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            auth: ServiceAccountAuth::new(key)?,
        })
    }

    /// Build a client from the raw service account JSON blob.
    pub fn from_service_account_json(json: &str) -> Result<Self> {
        let key: ServiceAccountKey = serde_json::from_str(json)?;
        Self::new(key)
    }

    pub fn client_email(&self) -> &str {
        self.auth.client_email()
    }

    /// List the worksheet (tab) titles of a spreadsheet.
    pub async fn sheet_titles(&self, spreadsheet_id: &str) -> Result<Vec<String>> {
        let url = self.url(&[spreadsheet_id])?;
        let token = self.auth.access_token(&self.client).await?;
        let resp = self
            .client
            .get(url)
            .bearer_auth(&token)
            .query(&[("fields", "sheets.properties.title")])
            .send()
            .await?;

        let resp = check_status(resp).await?;
        let meta: SpreadsheetMeta = resp.json().await?;
        Ok(meta.sheets.into_iter().map(|s| s.properties.title).collect())
    }

    /// Open a worksheet handle, failing if the tab does not exist.
    pub async fn worksheet(self: &Arc<Self>, spreadsheet_id: &str, title: &str) -> Result<Worksheet> {
        let titles = self.sheet_titles(spreadsheet_id).await?;
        if !titles.iter().any(|t| t == title) {
            return Err(SheetsError::WorksheetNotFound {
                spreadsheet_id: spreadsheet_id.to_string(),
                title: title.to_string(),
            });
        }
        Ok(Worksheet {
            client: Arc::clone(self),
            spreadsheet_id: spreadsheet_id.to_string(),
            title: title.to_string(),
        })
    }

    /// Read one whole column (1-based index) as display strings, top to bottom.
    pub async fn column_values(
        &self,
        spreadsheet_id: &str,
        title: &str,
        column: usize,
    ) -> Result<Vec<String>> {
        let range = column_range(title, column)?;
        let url = self.url(&[spreadsheet_id, "values", &range])?;
        let token = self.auth.access_token(&self.client).await?;
        let resp = self
            .client
            .get(url)
            .bearer_auth(&token)
            .query(&[("majorDimension", "COLUMNS")])
            .send()
            .await?;

        let resp = check_status(resp).await?;
        let range: ValueRange = resp.json().await?;
        Ok(range
            .values
            .into_iter()
            .next()
            .unwrap_or_default()
            .iter()
            .map(cell_to_string)
            .collect())
    }

    /// Append rows after the last non-empty row of the worksheet in one request.
    pub async fn append_rows(
        &self,
        spreadsheet_id: &str,
        title: &str,
        rows: &[Vec<serde_json::Value>],
    ) -> Result<AppendResponse> {
        let range = format!("{}!A1:append", quote_sheet_title(title));
        let url = self.url(&[spreadsheet_id, "values", &range])?;
        let token = self.auth.access_token(&self.client).await?;
        let resp = append_request(&self.client, url, &token, rows).send().await?;

        let resp = check_status(resp).await?;
        let appended: AppendResponse = resp.json().await?;
        tracing::debug!(
            title,
            rows = rows.len(),
            updated_range = ?appended.updates.as_ref().and_then(|u| u.updated_range.as_deref()),
            "Appended rows"
        );
        Ok(appended)
    }

    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(BASE_URL).map_err(|e| SheetsError::Parse(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| SheetsError::Parse(format!("cannot extend base URL {BASE_URL}")))?
            .extend(segments);
        Ok(url)
    }
}

/// A handle on one tab of a spreadsheet.
#[derive(Clone)]
pub struct Worksheet {
    client: Arc<SheetsClient>,
    spreadsheet_id: String,
    title: String,
}

impl Worksheet {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    pub async fn column_values(&self, column: usize) -> Result<Vec<String>> {
        self.client
            .column_values(&self.spreadsheet_id, &self.title, column)
            .await
    }

    pub async fn append_rows(&self, rows: &[Vec<serde_json::Value>]) -> Result<AppendResponse> {
        self.client
            .append_rows(&self.spreadsheet_id, &self.title, rows)
            .await
    }
}

/// Cells are stored as sent (`RAW`), so a keyword such as `+1 earbuds` or
/// `=cheap` stays text and URLs read back exactly as written.
fn append_request(
    client: &reqwest::Client,
    url: Url,
    token: &str,
    rows: &[Vec<serde_json::Value>],
) -> reqwest::RequestBuilder {
    client
        .post(url)
        .bearer_auth(token)
        .query(&[
            ("valueInputOption", "RAW"),
            ("insertDataOption", "INSERT_ROWS"),
        ])
        .json(&AppendBody { values: rows })
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(SheetsError::Api {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(resp)
}

/// Convert a 1-based column index to its A1 letters (1 → A, 26 → Z, 27 → AA).
pub fn column_letter(column: usize) -> Option<String> {
    if column == 0 {
        return None;
    }
    let mut n = column;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).ok()
}

/// Quote a tab title for A1 notation; embedded quotes are doubled.
pub fn quote_sheet_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

fn column_range(title: &str, column: usize) -> Result<String> {
    let letter = column_letter(column)
        .ok_or_else(|| SheetsError::Parse("column index is 1-based".to_string()))?;
    Ok(format!("{}!{letter}:{letter}", quote_sheet_title(title)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_letters_roll_over_after_z() {
        assert_eq!(column_letter(1).as_deref(), Some("A"));
        assert_eq!(column_letter(2).as_deref(), Some("B"));
        assert_eq!(column_letter(26).as_deref(), Some("Z"));
        assert_eq!(column_letter(27).as_deref(), Some("AA"));
        assert_eq!(column_letter(52).as_deref(), Some("AZ"));
        assert_eq!(column_letter(703).as_deref(), Some("AAA"));
        assert_eq!(column_letter(0), None);
    }

    #[test]
    fn sheet_titles_are_quoted_for_a1() {
        assert_eq!(quote_sheet_title("kw"), "'kw'");
        assert_eq!(quote_sheet_title("Bob's list"), "'Bob''s list'");
        assert_eq!(column_range("Publisher", 3).unwrap(), "'Publisher'!C:C");
        assert!(column_range("Publisher", 0).is_err());
    }

    #[test]
    fn empty_value_range_deserializes_without_values() {
        let range: ValueRange = serde_json::from_str(r#"{"range":"'kw'!B1:B1000"}"#).unwrap();
        assert!(range.values.is_empty());
    }

    #[test]
    fn append_stores_cells_raw() {
        let url = Url::parse(
            "https://sheets.googleapis.com/v4/spreadsheets/sheet-1/values/'kw'!A1:append",
        )
        .unwrap();
        let rows = vec![vec![
            serde_json::json!("2024-01-01 10:00:00"),
            serde_json::json!("+1 earbuds"),
            serde_json::json!("https://a.com/x"),
            serde_json::json!(1),
        ]];

        let request = append_request(&reqwest::Client::new(), url, "tok", &rows)
            .build()
            .unwrap();

        let query: Vec<(String, String)> = request.url().query_pairs().into_owned().collect();
        assert!(query.contains(&("valueInputOption".to_string(), "RAW".to_string())));
        assert!(query.contains(&("insertDataOption".to_string(), "INSERT_ROWS".to_string())));
        assert!(!query.iter().any(|(_, v)| v == "USER_ENTERED"));

        let body: serde_json::Value =
            serde_json::from_slice(request.body().and_then(|b| b.as_bytes()).unwrap()).unwrap();
        assert_eq!(body["values"][0][1], "+1 earbuds");
        assert_eq!(
            request.headers()[reqwest::header::AUTHORIZATION],
            "Bearer tok"
        );
    }

    #[test]
    fn cells_render_as_display_strings() {
        assert_eq!(cell_to_string(&serde_json::json!("https://a.com")), "https://a.com");
        assert_eq!(cell_to_string(&serde_json::json!(3)), "3");
        assert_eq!(cell_to_string(&serde_json::Value::Null), "");
    }
}
