//! 임포터 설정
//!
//! [`ImporterConfig`]는 core의 [`IngestConfig`](vulntriage_core::config::IngestConfig)를
//! 확장하여 임포터 고유 설정(요약에 보고할 행 에러 상한)을 추가합니다.

use serde::{Deserialize, Serialize};

use crate::error::IngestError;

/// 임포터 설정
///
/// # 필드
///
/// - **max_file_size**: 입력 파일 최대 크기 (바이트)
/// - **max_row_errors**: 임포트 중단 전 허용되는 행 단위 에러 수.
///   이 한도를 넘으면 파일이 전체적으로 불량하다고 보고 fail-fast합니다.
/// - **max_records**: 임포트당 최대 레코드 수
/// - **report_row_errors**: 임포트 요약에 담는 행 에러 목록 상한.
///   집계 수치(`skipped_row_count`)는 절단과 무관하게 정확합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImporterConfig {
    /// 입력 파일 최대 크기 (바이트)
    pub max_file_size: u64,
    /// 임포트 중단 전 허용되는 행 단위 에러 수
    pub max_row_errors: usize,
    /// 임포트당 최대 레코드 수
    pub max_records: usize,
    /// 요약에 보고할 행 에러 목록 상한
    pub report_row_errors: usize,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024, // 50 MB
            max_row_errors: 1_000,
            max_records: 500_000,
            report_row_errors: 100,
        }
    }
}

/// 설정 상한값 상수
const MAX_FILE_SIZE_LIMIT: u64 = 1024 * 1024 * 1024; // 1 GB
const MAX_RECORDS_LIMIT: usize = 1_000_000;
const MAX_REPORT_ROW_ERRORS: usize = 10_000;

impl ImporterConfig {
    /// core의 `IngestConfig`에서 임포터 설정을 생성합니다.
    ///
    /// core 설정에 없는 확장 필드는 기본값을 사용합니다.
    pub fn from_core(core: &vulntriage_core::config::IngestConfig) -> Self {
        Self {
            max_file_size: core.max_file_size,
            max_row_errors: core.max_row_errors,
            max_records: core.max_records,
            ..Self::default()
        }
    }

    /// 설정 값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), IngestError> {
        if self.max_file_size == 0 || self.max_file_size > MAX_FILE_SIZE_LIMIT {
            return Err(IngestError::Config {
                field: "max_file_size".to_owned(),
                reason: format!("must be 1-{MAX_FILE_SIZE_LIMIT}"),
            });
        }

        if self.max_records == 0 || self.max_records > MAX_RECORDS_LIMIT {
            return Err(IngestError::Config {
                field: "max_records".to_owned(),
                reason: format!("must be 1-{MAX_RECORDS_LIMIT}"),
            });
        }

        if self.report_row_errors > MAX_REPORT_ROW_ERRORS {
            return Err(IngestError::Config {
                field: "report_row_errors".to_owned(),
                reason: format!("must be at most {MAX_REPORT_ROW_ERRORS}"),
            });
        }

        Ok(())
    }
}
