// src/db/google_sheets.rs

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, Response, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::{
    path::Path,
    time::{Duration, Instant},
};
use tokio::sync::Mutex;

use crate::{
    common::error::AppError,
    db::store::{check_range_width, Table, TabularStore},
};

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

// Renova o token um minuto antes de expirar
const TOKEN_SAFETY_MARGIN: Duration = Duration::from_secs(60);

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// Campos usados do JSON da conta de serviço do Google Cloud.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Debug, Serialize)]
struct ServiceAccountClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

struct CachedToken {
    value: String,
    expires_at: Instant,
}

/// Armazenamento sobre a API v4 do Google Sheets, autenticado por conta de serviço.
pub struct GoogleSheetsStore {
    client: Client,
    spreadsheet_id: String,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    token: Mutex<Option<CachedToken>>,
}

impl GoogleSheetsStore {
    pub fn new(
        spreadsheet_id: String,
        key: ServiceAccountKey,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            AppError::Configuration(format!("chave privada da conta de serviço inválida: {}", e))
        })?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            spreadsheet_id,
            key,
            encoding_key,
            token: Mutex::new(None),
        })
    }

    pub fn from_file(
        spreadsheet_id: String,
        path: &Path,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!("não foi possível ler {}: {}", path.display(), e))
        })?;
        let key: ServiceAccountKey = serde_json::from_str(&raw).map_err(|e| {
            AppError::Configuration(format!("JSON da conta de serviço inválido: {}", e))
        })?;
        Self::new(spreadsheet_id, key, timeout)
    }

    async fn access_token(&self) -> Result<String, AppError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() + TOKEN_SAFETY_MARGIN {
                return Ok(token.value.clone());
            }
        }

        let now = Utc::now().timestamp();
        let claims = ServiceAccountClaims {
            iss: &self.key.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + 3600,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let token: TokenResponse = ensure_success(response).await?.json().await?;

        tracing::debug!("Token de acesso ao Google Sheets renovado");
        let value = token.access_token.clone();
        *cached = Some(CachedToken {
            value: token.access_token,
            expires_at: Instant::now() + Duration::from_secs(token.expires_in),
        });
        Ok(value)
    }

    fn values_url(&self, range: &str, action: &str) -> Result<Url, AppError> {
        let mut url = Url::parse(SHEETS_API)
            .map_err(|e| AppError::StoreError(format!("URL da API inválida: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::StoreError("URL da API não aceita caminho".to_string()))?
            .push(&self.spreadsheet_id)
            .push("values")
            .push(&format!("{}{}", range, action));
        Ok(url)
    }

    async fn put_range(&self, range: String, values: Vec<String>) -> Result<(), AppError> {
        let token = self.access_token().await?;
        let response = self
            .client
            .put(self.values_url(&range, "")?)
            .bearer_auth(token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({
                "range": range,
                "majorDimension": "ROWS",
                "values": [values],
            }))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

async fn ensure_success(response: Response) -> Result<Response, AppError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(AppError::StoreError(format!("{}: {}", status, body)))
}

/// 1 -> A, 26 -> Z, 27 -> AA
pub fn column_letter(column: usize) -> String {
    let mut n = column;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push((b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

fn sheet_range(table: Table) -> String {
    format!("'{}'", table.sheet_name())
}

#[async_trait]
impl TabularStore for GoogleSheetsStore {
    async fn read_all(&self, table: Table) -> Result<Vec<Vec<String>>, AppError> {
        let token = self.access_token().await?;
        let response = self
            .client
            .get(self.values_url(&sheet_range(table), "")?)
            .bearer_auth(token)
            .query(&[("majorDimension", "ROWS"), ("valueRenderOption", "FORMATTED_VALUE")])
            .send()
            .await?;
        let range: ValueRange = ensure_success(response).await?.json().await?;
        Ok(range.values)
    }

    async fn append_row(&self, table: Table, values: Vec<String>) -> Result<(), AppError> {
        let token = self.access_token().await?;
        let range = format!("{}!A1", sheet_range(table));
        let response = self
            .client
            .post(self.values_url(&range, ":append")?)
            .bearer_auth(token)
            .query(&[("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")])
            .json(&json!({ "majorDimension": "ROWS", "values": [values] }))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn update_cell(
        &self,
        table: Table,
        row: usize,
        column: usize,
        value: String,
    ) -> Result<(), AppError> {
        let range = format!("{}!{}{}", sheet_range(table), column_letter(column), row);
        self.put_range(range, vec![value]).await
    }

    async fn update_row_range(
        &self,
        table: Table,
        row: usize,
        start_column: usize,
        end_column: usize,
        values: Vec<String>,
    ) -> Result<(), AppError> {
        check_range_width(start_column, end_column, &values)?;
        let range = format!(
            "{}!{}{}:{}{}",
            sheet_range(table),
            column_letter(start_column),
            row,
            column_letter(end_column),
            row
        );
        self.put_range(range, values).await
    }
}
