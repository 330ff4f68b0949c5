//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.
//! Todas las variables son opcionales; un valor presente pero inválido es un
//! error de configuración.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::utils::errors::AppError;

pub const DEFAULT_REVERSE_GEOCODING_URL: &str = "https://nominatim.openstreetmap.org/reverse";
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_WIZARD_IDLE_TTL: Duration = Duration::from_secs(30 * 60);

/// Margen para el prefijo del data URL y el resto del JSON
const REQUEST_BODY_SLACK: usize = 64 * 1024;

/// Valor de `STORAGE_DIR` que selecciona el almacenamiento en memoria
pub const MEMORY_STORAGE: &str = ":memory:";

/// Dónde se guardan los registros
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLocation {
    Memory,
    Directory(PathBuf),
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub storage: StorageLocation,
    pub cors_origins: Vec<String>,
    pub reverse_geocoding_url: String,
    pub reverse_geocoding_enabled: bool,
    pub reverse_geocoding_timeout: Duration,
    pub max_image_bytes: usize,
    /// Un asistente sin actividad durante este tiempo se descarta
    pub wizard_idle_ttl: Duration,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            storage: StorageLocation::Directory(PathBuf::from("./data")),
            cors_origins: Vec::new(),
            reverse_geocoding_url: DEFAULT_REVERSE_GEOCODING_URL.to_string(),
            reverse_geocoding_enabled: true,
            reverse_geocoding_timeout: Duration::from_secs(10),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            wizard_idle_ttl: DEFAULT_WIZARD_IDLE_TTL,
        }
    }
}

fn parse_var<T: FromStr>(name: &str, raw: Option<String>, default: T) -> Result<T, AppError> {
    match raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(value) => value
            .parse()
            .map_err(|_| AppError::Config(format!("{} has an invalid value '{}'", name, value))),
        None => Ok(default),
    }
}

impl EnvironmentConfig {
    /// Lee la configuración de las variables de entorno del proceso
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let storage = match lookup("STORAGE_DIR").map(|v| v.trim().to_string()) {
            Some(dir) if dir == MEMORY_STORAGE => StorageLocation::Memory,
            Some(dir) if !dir.is_empty() => StorageLocation::Directory(PathBuf::from(dir)),
            _ => defaults.storage,
        };

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let timeout_secs: u64 = parse_var(
            "REVERSE_GEOCODING_TIMEOUT_SECS",
            lookup("REVERSE_GEOCODING_TIMEOUT_SECS"),
            defaults.reverse_geocoding_timeout.as_secs(),
        )?;

        let idle_ttl_secs: u64 = parse_var(
            "WIZARD_IDLE_TTL_SECS",
            lookup("WIZARD_IDLE_TTL_SECS"),
            defaults.wizard_idle_ttl.as_secs(),
        )?;

        let config = Self {
            environment: lookup("ENVIRONMENT")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.environment),
            port: parse_var("PORT", lookup("PORT"), defaults.port)?,
            host: lookup("HOST")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.host),
            storage,
            cors_origins,
            reverse_geocoding_url: lookup("REVERSE_GEOCODING_URL")
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.reverse_geocoding_url),
            reverse_geocoding_enabled: parse_var(
                "REVERSE_GEOCODING_ENABLED",
                lookup("REVERSE_GEOCODING_ENABLED"),
                defaults.reverse_geocoding_enabled,
            )?,
            reverse_geocoding_timeout: Duration::from_secs(timeout_secs),
            max_image_bytes: parse_var("MAX_IMAGE_BYTES", lookup("MAX_IMAGE_BYTES"), defaults.max_image_bytes)?,
            wizard_idle_ttl: Duration::from_secs(idle_ttl_secs),
        };

        if config.max_image_bytes == 0 {
            return Err(AppError::Config("MAX_IMAGE_BYTES must be greater than zero".to_string()));
        }
        if config.wizard_idle_ttl.is_zero() {
            return Err(AppError::Config("WIZARD_IDLE_TTL_SECS must be greater than zero".to_string()));
        }
        Ok(config)
    }

    /// Tamaño máximo del cuerpo de una petición: una imagen del tamaño
    /// máximo codificada en base64 más el resto del JSON
    pub fn request_body_limit(&self) -> usize {
        self.max_image_bytes
            .div_ceil(3)
            .saturating_mul(4)
            .saturating_add(REQUEST_BODY_SLACK)
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<EnvironmentConfig, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvironmentConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert!(config.is_development());
        assert_eq!(config.server_url(), "0.0.0.0:3000");
        assert_eq!(config.storage, StorageLocation::Directory(PathBuf::from("./data")));
        assert!(config.cors_origins.is_empty());
        assert!(config.reverse_geocoding_enabled);
        assert_eq!(config.max_image_bytes, 5_242_880);
        assert_eq!(config.wizard_idle_ttl, Duration::from_secs(1800));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("ENVIRONMENT", "production"),
            ("PORT", "8080"),
            ("STORAGE_DIR", ":memory:"),
            ("CORS_ORIGINS", "http://localhost:5173, https://scrap.example ,"),
            ("REVERSE_GEOCODING_ENABLED", "false"),
            ("REVERSE_GEOCODING_TIMEOUT_SECS", "3"),
            ("WIZARD_IDLE_TTL_SECS", "600"),
        ])
        .unwrap();
        assert!(config.is_production());
        assert_eq!(config.port, 8080);
        assert_eq!(config.storage, StorageLocation::Memory);
        assert_eq!(config.cors_origins.len(), 2);
        assert!(!config.reverse_geocoding_enabled);
        assert_eq!(config.reverse_geocoding_timeout, Duration::from_secs(3));
        assert_eq!(config.wizard_idle_ttl, Duration::from_secs(600));
    }

    #[test]
    fn test_request_body_limit_fits_a_max_size_image() {
        let config = config_from(&[("MAX_IMAGE_BYTES", "3000000")]).unwrap();
        // 3 000 000 bytes → 4 000 000 caracteres base64
        assert_eq!(config.request_body_limit(), 4_000_000 + 64 * 1024);
        assert!(EnvironmentConfig::default().request_body_limit() > 2 * 1024 * 1024);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(config_from(&[("PORT", "http")]), Err(AppError::Config(_))));
        assert!(matches!(
            config_from(&[("MAX_IMAGE_BYTES", "0")]),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            config_from(&[("REVERSE_GEOCODING_ENABLED", "maybe")]),
            Err(AppError::Config(_))
        ));
        assert!(matches!(
            config_from(&[("WIZARD_IDLE_TTL_SECS", "0")]),
            Err(AppError::Config(_))
        ));
    }
}
