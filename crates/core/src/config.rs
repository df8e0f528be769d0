//! 설정 관리 — vulntriage.toml 파싱 및 런타임 설정
//!
//! [`VulntriageConfig`]는 모든 모듈의 설정을 담는 최상위 구조체입니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`VULNTRIAGE_GENERAL_LOG_LEVEL=debug` 형식)
//! 3. 설정 파일 (`vulntriage.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), vulntriage_core::error::VulntriageError> {
//! use vulntriage_core::config::VulntriageConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = VulntriageConfig::load("vulntriage.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = VulntriageConfig::parse("[general]\nlog_level = \"debug\"")?;
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, VulntriageError};

/// Vulntriage 통합 설정
///
/// `vulntriage.toml` 파일의 최상위 구조를 나타냅니다.
/// 각 모듈은 자기 섹션만 읽어 사용합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VulntriageConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 임포트 파이프라인 설정
    #[serde(default)]
    pub ingest: IngestConfig,
    /// 데이터셋 스토어 설정
    #[serde(default)]
    pub store: StoreConfig,
}

impl VulntriageConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, VulntriageError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다. 파일이 없으면 기본값을 사용합니다.
    ///
    /// CLI처럼 설정 파일이 선택적인 호출자를 위한 진입점입니다.
    /// 환경변수 오버라이드는 동일하게 적용됩니다.
    pub async fn load_or_default(path: impl AsRef<Path>) -> Result<Self, VulntriageError> {
        let path = path.as_ref();
        let mut config = if tokio::fs::try_exists(path).await.unwrap_or(false) {
            Self::from_file(path).await?
        } else {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, VulntriageError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VulntriageError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                VulntriageError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, VulntriageError> {
        toml::from_str(toml_str).map_err(|e| {
            VulntriageError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `VULNTRIAGE_{SECTION}_{FIELD}`
    /// 예: `VULNTRIAGE_GENERAL_LOG_LEVEL=debug`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "VULNTRIAGE_GENERAL_LOG_LEVEL");
        override_string(&mut self.general.log_format, "VULNTRIAGE_GENERAL_LOG_FORMAT");
        override_string(&mut self.general.data_dir, "VULNTRIAGE_GENERAL_DATA_DIR");

        // Ingest
        override_u64(
            &mut self.ingest.max_file_size,
            "VULNTRIAGE_INGEST_MAX_FILE_SIZE",
        );
        override_usize(
            &mut self.ingest.max_row_errors,
            "VULNTRIAGE_INGEST_MAX_ROW_ERRORS",
        );
        override_usize(
            &mut self.ingest.max_records,
            "VULNTRIAGE_INGEST_MAX_RECORDS",
        );

        // Store
        override_string(&mut self.store.snapshot_file, "VULNTRIAGE_STORE_SNAPSHOT_FILE");
        override_bool(&mut self.store.persistent, "VULNTRIAGE_STORE_PERSISTENT");
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), VulntriageError> {
        // log_level 검증
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_level".to_owned(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            }
            .into());
        }

        // log_format 검증
        let valid_formats = ["json", "pretty"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "general.log_format".to_owned(),
                reason: format!("must be one of: {}", valid_formats.join(", ")),
            }
            .into());
        }

        if self.general.data_dir.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "general.data_dir".to_owned(),
                reason: "data_dir must not be empty".to_owned(),
            }
            .into());
        }

        // 임포트 한도 검증
        if self.ingest.max_file_size == 0 || self.ingest.max_file_size > MAX_FILE_SIZE_LIMIT {
            return Err(ConfigError::InvalidValue {
                field: "ingest.max_file_size".to_owned(),
                reason: format!("must be 1-{MAX_FILE_SIZE_LIMIT}"),
            }
            .into());
        }

        if self.ingest.max_records == 0 || self.ingest.max_records > MAX_RECORDS_LIMIT {
            return Err(ConfigError::InvalidValue {
                field: "ingest.max_records".to_owned(),
                reason: format!("must be 1-{MAX_RECORDS_LIMIT}"),
            }
            .into());
        }

        if self.store.persistent && self.store.snapshot_file.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "store.snapshot_file".to_owned(),
                reason: "snapshot_file must not be empty when persistent".to_owned(),
            }
            .into());
        }

        Ok(())
    }
}

/// 설정 상한값 상수
const MAX_FILE_SIZE_LIMIT: u64 = 1024 * 1024 * 1024; // 1 GB
const MAX_RECORDS_LIMIT: usize = 1_000_000;

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty)
    pub log_format: String,
    /// 데이터 디렉토리 (스냅샷 파일 위치)
    pub data_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_owned(),
            log_format: "pretty".to_owned(),
            data_dir: ".".to_owned(),
        }
    }
}

/// 임포트 파이프라인 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// 입력 파일 최대 크기 (바이트)
    pub max_file_size: u64,
    /// 임포트 중단 전 허용되는 행 단위 에러 수
    pub max_row_errors: usize,
    /// 임포트당 최대 레코드 수
    pub max_records: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024, // 50 MB
            max_row_errors: 1_000,
            max_records: 500_000,
        }
    }
}

/// 데이터셋 스토어 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// 스냅샷 영속화 여부 (false면 메모리 전용)
    pub persistent: bool,
    /// 스냅샷 파일명 (data_dir 기준 상대 경로 가능)
    pub snapshot_file: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            persistent: true,
            snapshot_file: "vulntriage-store.json".to_owned(),
        }
    }
}

impl StoreConfig {
    /// data_dir를 기준으로 스냅샷 파일 경로를 계산합니다.
    ///
    /// `snapshot_file`이 절대 경로면 그대로 사용합니다.
    pub fn snapshot_path(&self, data_dir: &str) -> PathBuf {
        let file = Path::new(&self.snapshot_file);
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            Path::new(data_dir).join(file)
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_has_sane_values() {
        let config = VulntriageConfig::default();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.general.log_format, "pretty");
        assert_eq!(config.ingest.max_row_errors, 1_000);
        assert!(config.store.persistent);
    }

    #[test]
    fn default_config_passes_validation() {
        let config = VulntriageConfig::default();
        config.validate().unwrap();
    }

    #[test]
    fn parse_empty_toml_uses_defaults() {
        let config = VulntriageConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "info");
        assert_eq!(config.store.snapshot_file, "vulntriage-store.json");
    }

    #[test]
    fn parse_partial_toml_merges_with_defaults() {
        let toml = r#"
[general]
log_level = "debug"

[ingest]
max_row_errors = 50
"#;
        let config = VulntriageConfig::parse(toml).unwrap();
        assert_eq!(config.general.log_level, "debug");
        // log_format은 기본값 유지
        assert_eq!(config.general.log_format, "pretty");
        assert_eq!(config.ingest.max_row_errors, 50);
        assert_eq!(config.ingest.max_records, 500_000);
    }

    #[test]
    fn parse_full_toml() {
        let toml = r#"
[general]
log_level = "warn"
log_format = "json"
data_dir = "/opt/vulntriage/data"

[ingest]
max_file_size = 1048576
max_row_errors = 10
max_records = 10000

[store]
persistent = false
snapshot_file = "store.json"
"#;
        let config = VulntriageConfig::parse(toml).unwrap();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.general.data_dir, "/opt/vulntriage/data");
        assert_eq!(config.ingest.max_file_size, 1_048_576);
        assert!(!config.store.persistent);
    }

    #[test]
    fn parse_invalid_toml_returns_error() {
        let result = VulntriageConfig::parse("invalid = [[[toml");
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = VulntriageConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = VulntriageConfig::default();
        config.general.log_format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_format"));
    }

    #[test]
    fn validate_rejects_zero_max_file_size() {
        let mut config = VulntriageConfig::default();
        config.ingest.max_file_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_snapshot_file_when_persistent() {
        let mut config = VulntriageConfig::default();
        config.store.persistent = true;
        config.store.snapshot_file = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_empty_snapshot_file_when_not_persistent() {
        let mut config = VulntriageConfig::default();
        config.store.persistent = false;
        config.store.snapshot_file = String::new();
        config.validate().unwrap();
    }

    #[test]
    fn snapshot_path_relative_joins_data_dir() {
        let store = StoreConfig {
            persistent: true,
            snapshot_file: "store.json".to_owned(),
        };
        let path = store.snapshot_path("/var/lib/vulntriage");
        assert_eq!(path, PathBuf::from("/var/lib/vulntriage/store.json"));
    }

    #[test]
    fn snapshot_path_absolute_ignores_data_dir() {
        let store = StoreConfig {
            persistent: true,
            snapshot_file: "/tmp/store.json".to_owned(),
        };
        let path = store.snapshot_path("/var/lib/vulntriage");
        assert_eq!(path, PathBuf::from("/tmp/store.json"));
    }

    #[test]
    #[serial]
    fn env_override_string() {
        let mut config = VulntriageConfig::default();
        // SAFETY: serial 테스트에서만 환경변수를 조작하므로 안전합니다.
        unsafe { std::env::set_var("VULNTRIAGE_GENERAL_LOG_LEVEL", "trace") };
        config.apply_env_overrides();
        assert_eq!(config.general.log_level, "trace");
        unsafe { std::env::remove_var("VULNTRIAGE_GENERAL_LOG_LEVEL") };
    }

    #[test]
    #[serial]
    fn env_override_usize_invalid_keeps_original() {
        let mut config = VulntriageConfig::default();
        // SAFETY: serial 테스트에서만 환경변수를 조작하므로 안전합니다.
        unsafe { std::env::set_var("VULNTRIAGE_INGEST_MAX_ROW_ERRORS", "not-a-number") };
        config.apply_env_overrides();
        assert_eq!(config.ingest.max_row_errors, 1_000); // 원래 값 유지
        unsafe { std::env::remove_var("VULNTRIAGE_INGEST_MAX_ROW_ERRORS") };
    }

    #[test]
    #[serial]
    fn env_override_bool() {
        let mut config = VulntriageConfig::default();
        // SAFETY: serial 테스트에서만 환경변수를 조작하므로 안전합니다.
        unsafe { std::env::set_var("VULNTRIAGE_STORE_PERSISTENT", "false") };
        config.apply_env_overrides();
        assert!(!config.store.persistent);
        unsafe { std::env::remove_var("VULNTRIAGE_STORE_PERSISTENT") };
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = VulntriageConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed = VulntriageConfig::parse(&toml_str).unwrap();
        assert_eq!(config.general.log_level, parsed.general.log_level);
        assert_eq!(config.ingest.max_file_size, parsed.ingest.max_file_size);
        assert_eq!(config.store.snapshot_file, parsed.store.snapshot_file);
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let result = VulntriageConfig::from_file("/nonexistent/path/vulntriage.toml").await;
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            VulntriageError::Config(ConfigError::FileNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn load_or_default_missing_file_uses_defaults() {
        let config = VulntriageConfig::load_or_default("/nonexistent/path/vulntriage.toml")
            .await
            .unwrap();
        assert_eq!(config.general.log_level, "info");
    }
}
