// src/config.rs

use std::{collections::HashMap, env, path::PathBuf, sync::Arc, time::Duration};

use crate::{
    common::error::AppError,
    db::{
        cache::TableCache,
        google_sheets::GoogleSheetsStore,
        loader::TableLoader,
        store::{MemoryStore, Table, TabularStore},
        LeaseRepository, LedgerRepository, ManagerRepository, PropertyRepository,
    },
    models::auth::{CookieSettings, CredentialMap},
    services::{
        auth::AuthService, dashboard_service::DashboardService, finance_service::FinanceService,
        form_flow::FlowService, lease_service::LeaseService, property_service::PropertyService,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sheets,
    Memory,
}

// Configurações lidas do ambiente (.env)
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    pub spreadsheet_id: Option<String>,
    pub service_account_file: Option<PathBuf>,
    pub credentials_file: PathBuf,
    pub cookie: CookieSettings,
    pub cache_ttl: Duration,
    pub form_cache_ttl: Duration,
    pub sheets_timeout: Duration,
}

fn parse_number<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, AppError> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::Configuration(format!("{} deve ser um número", key))),
    }
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, AppError> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::Configuration(format!("{} deve ser definida", key)))
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Mesma leitura de `from_env`, com a fonte das variáveis injetada.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let store_backend = match lookup("STORE_BACKEND").as_deref().map(str::trim) {
            None | Some("") | Some("sheets") => StoreBackend::Sheets,
            Some("memory") => StoreBackend::Memory,
            Some(other) => {
                return Err(AppError::Configuration(format!(
                    "STORE_BACKEND inválido: '{}' (use 'sheets' ou 'memory')",
                    other
                )))
            }
        };

        let (spreadsheet_id, service_account_file) = match store_backend {
            StoreBackend::Sheets => (
                Some(required(&lookup, "SPREADSHEET_ID")?),
                Some(PathBuf::from(required(&lookup, "GCP_SERVICE_ACCOUNT_FILE")?)),
            ),
            StoreBackend::Memory => (None, None),
        };

        let cookie = CookieSettings {
            name: required(&lookup, "COOKIE_NAME")?,
            key: required(&lookup, "COOKIE_KEY")?,
            expiry_days: parse_number(&lookup, "COOKIE_EXPIRY_DAYS", 30)?,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_number(&lookup, "PORT", 3000)?,
            store_backend,
            spreadsheet_id,
            service_account_file,
            credentials_file: PathBuf::from(required(&lookup, "AUTH_CREDENTIALS_FILE")?),
            cookie,
            cache_ttl: Duration::from_secs(parse_number(&lookup, "CACHE_TTL_SECONDS", 600)?),
            form_cache_ttl: Duration::from_secs(parse_number(&lookup, "FORM_CACHE_TTL_SECONDS", 30)?),
            sheets_timeout: Duration::from_secs(parse_number(&lookup, "SHEETS_TIMEOUT_SECONDS", 10)?),
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Mapa de credenciais (JSON); precisa ter ao menos um usuário.
pub fn load_credentials(path: &std::path::Path) -> Result<CredentialMap, AppError> {
    let raw = std::fs::read_to_string(path).map_err(|e| {
        AppError::Configuration(format!("não foi possível ler {}: {}", path.display(), e))
    })?;
    let credentials: CredentialMap = serde_json::from_str(&raw).map_err(|e| {
        AppError::Configuration(format!("arquivo de credenciais inválido: {}", e))
    })?;
    if credentials.usernames.is_empty() {
        return Err(AppError::Configuration("nenhum usuário em 'usernames'".to_string()));
    }
    Ok(credentials)
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub auth_service: AuthService,
    pub dashboard_service: DashboardService,
    pub property_service: PropertyService,
    pub lease_service: LeaseService,
    pub finance_service: FinanceService,
    pub flow_service: FlowService,
    pub manager_repo: ManagerRepository,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let settings = Settings::from_env()?;
        let credentials = load_credentials(&settings.credentials_file)?;

        let store: Arc<dyn TabularStore> = match (&settings.spreadsheet_id, &settings.service_account_file) {
            (Some(spreadsheet_id), Some(key_file)) => {
                let store = GoogleSheetsStore::from_file(
                    spreadsheet_id.clone(),
                    key_file,
                    settings.sheets_timeout,
                )?;
                tracing::info!("✅ Planilha {} configurada", spreadsheet_id);
                Arc::new(store)
            }
            _ => {
                tracing::warn!("⚠️ Usando armazenamento em memória (STORE_BACKEND=memory)");
                Arc::new(MemoryStore::with_headers())
            }
        };

        Ok(Self::from_parts(store, credentials, settings))
    }

    // --- Monta o gráfico de dependências ---
    pub fn from_parts(
        store: Arc<dyn TabularStore>,
        credentials: CredentialMap,
        settings: Settings,
    ) -> Self {
        let overrides = HashMap::from([(Table::Managers, settings.form_cache_ttl)]);
        let loader = TableLoader::new(store, TableCache::new(settings.cache_ttl, overrides));

        let properties = PropertyRepository::new(loader.clone());
        let leases = LeaseRepository::new(loader.clone());
        let ledger = LedgerRepository::new(loader.clone());
        let manager_repo = ManagerRepository::new(loader);

        let property_service = PropertyService::new(properties.clone());
        let lease_service = LeaseService::new(leases.clone(), properties.clone());
        let finance_service = FinanceService::new(ledger.clone(), leases.clone(), properties.clone());
        let dashboard_service = DashboardService::new(properties, leases, ledger);
        let flow_service = FlowService::new(
            property_service.clone(),
            lease_service.clone(),
            finance_service.clone(),
            manager_repo.clone(),
        );
        let auth_service = AuthService::new(credentials, settings.cookie.clone());

        Self {
            settings: Arc::new(settings),
            auth_service,
            dashboard_service,
            property_service,
            lease_service,
            finance_service,
            flow_service,
            manager_repo,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn memory_backend_needs_only_auth_settings() {
        let settings = Settings::from_lookup(lookup(&[
            ("STORE_BACKEND", "memory"),
            ("AUTH_CREDENTIALS_FILE", "credenciais.json"),
            ("COOKIE_NAME", "controle_alugueis"),
            ("COOKIE_KEY", "segredo"),
        ]))
        .unwrap();

        assert_eq!(settings.store_backend, StoreBackend::Memory);
        assert_eq!(settings.address(), "0.0.0.0:3000");
        assert_eq!(settings.cookie.expiry_days, 30);
        assert_eq!(settings.cache_ttl, Duration::from_secs(600));
        assert_eq!(settings.form_cache_ttl, Duration::from_secs(30));
    }

    #[test]
    fn sheets_backend_requires_spreadsheet_settings() {
        let err = Settings::from_lookup(lookup(&[
            ("AUTH_CREDENTIALS_FILE", "credenciais.json"),
            ("COOKIE_NAME", "controle_alugueis"),
            ("COOKIE_KEY", "segredo"),
        ]))
        .unwrap_err();

        assert!(matches!(err, AppError::Configuration(ref msg) if msg.contains("SPREADSHEET_ID")));
    }

    #[test]
    fn missing_cookie_key_is_a_configuration_error() {
        let err = Settings::from_lookup(lookup(&[
            ("STORE_BACKEND", "memory"),
            ("AUTH_CREDENTIALS_FILE", "credenciais.json"),
            ("COOKIE_NAME", "controle_alugueis"),
            ("COOKIE_KEY", "  "),
        ]))
        .unwrap_err();

        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn credentials_file_must_list_users() {
        let dir = std::env::temp_dir().join(format!("credenciais-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("vazio.json");
        std::fs::write(&path, r#"{ "usernames": {} }"#).unwrap();

        assert!(matches!(load_credentials(&path), Err(AppError::Configuration(_))));
        assert!(matches!(
            load_credentials(&dir.join("inexistente.json")),
            Err(AppError::Configuration(_))
        ));
    }
}
