//! 임포트 파이프라인 에러 타입
//!
//! [`IngestError`]는 파일 단위로 치명적인 실패만 나타냅니다.
//! 개별 행의 문제는 에러로 전파되지 않고
//! [`vulntriage_core::types::RowError`]로 임포트 요약에 집계됩니다.
//!
//! # 에러 카테고리
//!
//! - **형식 판별**: `UnsupportedFormat`
//! - **파일 접근/디코딩**: `UnreadableFile`, `FileTooBig`, `Io`
//! - **안전 한도 초과**: `TooManyRowErrors`, `TooManyRecords`
//! - **설정**: `Config`
//! - **태스크/채널**: `Channel`
//! - **스토어 전파**: `Store`

use vulntriage_core::error::{ImportError, VulntriageError};
use vulntriage_store::StoreError;

/// 임포트 파이프라인 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// 확장자로 판별할 수 없는 입력 형식
    #[error("unsupported format: {extension}")]
    UnsupportedFormat {
        /// 파일 확장자 (없으면 "(none)")
        extension: String,
    },

    /// 파일을 열거나 디코딩할 수 없음
    #[error("unreadable file: {path}: {reason}")]
    UnreadableFile {
        /// 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 입력 파일 크기 초과
    #[error("file too large: {path}: {size} bytes (max: {max})")]
    FileTooBig {
        /// 파일 경로
        path: String,
        /// 실제 크기 (바이트)
        size: u64,
        /// 허용 최대 크기 (바이트)
        max: u64,
    },

    /// 행 단위 에러가 한도를 넘어 계속 진행이 불안전함
    #[error("too many row errors: {count} (max: {max})")]
    TooManyRowErrors {
        /// 누적 행 에러 수
        count: usize,
        /// 허용 최대치
        max: usize,
    },

    /// 임포트당 레코드 수 한도 초과
    #[error("too many records: {count} (max: {max})")]
    TooManyRecords {
        /// 누적 레코드 수
        count: usize,
        /// 허용 최대치
        max: usize,
    },

    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 태스크/채널 통신 에러
    #[error("channel error: {0}")]
    Channel(String),

    /// 스토어 에러 (커밋 실패 등)
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// 파일 I/O 에러
    #[error("io error: {path}: {source}")]
    Io {
        /// 관련 파일 경로
        path: String,
        /// 원본 I/O 에러
        source: std::io::Error,
    },
}

impl From<IngestError> for VulntriageError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::UnsupportedFormat { extension } => {
                VulntriageError::Import(ImportError::UnsupportedFormat(extension))
            }
            IngestError::UnreadableFile { path, reason } => {
                VulntriageError::Import(ImportError::UnreadableFile { path, reason })
            }
            IngestError::FileTooBig { path, size, max } => {
                VulntriageError::Import(ImportError::UnreadableFile {
                    path,
                    reason: format!("file too large: {size} bytes (max: {max})"),
                })
            }
            IngestError::TooManyRowErrors { count, max } => VulntriageError::Import(
                ImportError::ImportFailed(format!("too many row errors: {count} (max: {max})")),
            ),
            IngestError::TooManyRecords { count, max } => VulntriageError::Import(
                ImportError::ImportFailed(format!("too many records: {count} (max: {max})")),
            ),
            IngestError::Config { field, reason } => VulntriageError::Import(
                ImportError::ImportFailed(format!("config error: {field}: {reason}")),
            ),
            IngestError::Channel(msg) => {
                VulntriageError::Import(ImportError::ImportFailed(msg))
            }
            IngestError::Store(e) => e.into(),
            IngestError::Io { path, source } => VulntriageError::Import(
                ImportError::UnreadableFile {
                    path,
                    reason: source.to_string(),
                },
            ),
        }
    }
}
