use std::path::Path;

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};

use crate::errors::{PipelineError, PipelineResult};

const SHEETS_API: &str = "https://sheets.googleapis.com/";
const DRIVE_FILES_API: &str = "https://www.googleapis.com/drive/v3/files";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";
const SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/spreadsheets.readonly",
    "https://www.googleapis.com/auth/drive.readonly",
];
const ASSERTION_TTL_SECS: i64 = 3600;

/// The fields of a service account key file the client needs.
#[derive(Debug, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".into()
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct DriveFileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMetadata {
    properties: SpreadsheetProperties,
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SpreadsheetProperties {
    title: String,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SpreadsheetProperties,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

/// An opened spreadsheet and the titles of its worksheets.
#[derive(Debug, Clone)]
pub struct Spreadsheet {
    pub id: String,
    pub title: String,
    pub worksheets: Vec<String>,
}

impl Spreadsheet {
    pub fn has_worksheet(&self, title: &str) -> bool {
        self.worksheets.iter().any(|w| w == title)
    }
}

/// Read-only Google Sheets client authenticated as a service account.
#[derive(Clone)]
pub struct SheetsClient {
    client: Client,
    access_token: String,
}

impl SheetsClient {
    /// Authenticate with the key file at `credentials_path`.
    ///
    /// `accept_invalid_certs` disables TLS verification for every request this client makes.
    pub async fn connect(credentials_path: &Path, accept_invalid_certs: bool) -> PipelineResult<Self> {
        let raw = tokio::fs::read_to_string(credentials_path).await.map_err(|e| {
            PipelineError::SourceAuth(format!(
                "cannot read credentials {}: {e}",
                credentials_path.display()
            ))
        })?;
        let key: ServiceAccountKey = serde_json::from_str(&raw)
            .map_err(|e| PipelineError::SourceAuth(format!("invalid service account key: {e}")))?;

        if accept_invalid_certs {
            tracing::warn!("TLS certificate verification disabled for the spreadsheet API");
        }
        let client = Client::builder()
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .map_err(|e| PipelineError::SourceAuth(format!("http client setup failed: {e}")))?;

        let assertion = sign_assertion(&key, Utc::now().timestamp())?;
        let response = client
            .post(&key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| PipelineError::SourceAuth(format!("token exchange failed: {e}")))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::SourceAuth(format!("token endpoint error: {body}")));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::SourceAuth(format!("invalid token response: {e}")))?;

        tracing::info!(account = %key.client_email, "connected to Google Sheets API");
        Ok(Self {
            client,
            access_token: token.access_token,
        })
    }

    /// Open the spreadsheet whose display name is exactly `name`.
    pub async fn open_by_name(&self, name: &str) -> PipelineResult<Spreadsheet> {
        let response = self
            .client
            .get(DRIVE_FILES_API)
            .bearer_auth(&self.access_token)
            .query(&[
                ("q", drive_name_query(name).as_str()),
                ("fields", "files(id,name)"),
                ("pageSize", "10"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ])
            .send()
            .await?;
        let listing: DriveFileList = expect_success(response).await?.json().await?;

        let file = listing
            .files
            .into_iter()
            .find(|f| f.name == name)
            .ok_or_else(|| PipelineError::SpreadsheetNotFound(name.to_string()))?;
        self.open_by_id(&file.id).await
    }

    pub async fn open_by_id(&self, id: &str) -> PipelineResult<Spreadsheet> {
        let url = api_url(&["v4", "spreadsheets", id])?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .query(&[("fields", "properties.title,sheets.properties.title")])
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(PipelineError::SpreadsheetNotFound(id.to_string()));
        }
        let meta: SpreadsheetMetadata = expect_success(response).await?.json().await?;

        Ok(Spreadsheet {
            id: id.to_string(),
            title: meta.properties.title,
            worksheets: meta.sheets.into_iter().map(|s| s.properties.title).collect(),
        })
    }

    /// Every row of a worksheet, formulas evaluated, header row first.
    pub async fn worksheet_values(
        &self,
        spreadsheet: &Spreadsheet,
        title: &str,
    ) -> PipelineResult<Vec<Vec<serde_json::Value>>> {
        if !spreadsheet.has_worksheet(title) {
            return Err(PipelineError::WorksheetNotFound(title.to_string()));
        }
        let range = sheet_range(title);
        let url = api_url(&["v4", "spreadsheets", &spreadsheet.id, "values", &range])?;
        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .query(&[
                ("valueRenderOption", "UNFORMATTED_VALUE"),
                ("dateTimeRenderOption", "FORMATTED_STRING"),
                ("majorDimension", "ROWS"),
            ])
            .send()
            .await?;
        let values: ValueRange = expect_success(response).await?.json().await?;
        Ok(values.values)
    }
}

fn sign_assertion(key: &ServiceAccountKey, now: i64) -> PipelineResult<String> {
    let claims = AssertionClaims {
        iss: &key.client_email,
        scope: SCOPES.join(" "),
        aud: &key.token_uri,
        iat: now,
        exp: now + ASSERTION_TTL_SECS,
    };
    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| PipelineError::SourceAuth(format!("invalid private key: {e}")))?;
    encode(&Header::new(Algorithm::RS256), &claims, &encoding_key)
        .map_err(|e| PipelineError::SourceAuth(format!("assertion signing failed: {e}")))
}

async fn expect_success(response: reqwest::Response) -> PipelineResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(PipelineError::SourceApi(format!("{status}: {body}")))
}

fn api_url(segments: &[&str]) -> PipelineResult<Url> {
    let mut url = Url::parse(SHEETS_API).map_err(|e| PipelineError::internal(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| PipelineError::internal("sheets api url cannot be a base"))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Drive search expression matching a spreadsheet by exact name.
fn drive_name_query(name: &str) -> String {
    let escaped = name.replace('\\', "\\\\").replace('\'', "\\'");
    format!("name = '{escaped}' and mimeType = '{SPREADSHEET_MIME}' and trashed = false")
}

/// A1 range covering a whole worksheet.
fn sheet_range(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}
