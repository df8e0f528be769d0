//! 에러 타입 — 도메인별 에러 정의
//!
//! 에러 분류 체계:
//!
//! - **포맷 에러** ([`ImportError`]): 읽을 수 없거나 지원하지 않는 파일.
//!   해당 임포트 전체에 치명적입니다.
//! - **검증 에러** ([`AssessmentError`]): 전문가 평가 거부 사유.
//!   저장된 레코드는 변경되지 않습니다.
//! - **Not-found 에러** ([`StorageError`]): 존재하지 않는 데이터셋/레코드 참조.
//!
//! 행 단위 에러는 에러 타입이 아니라 [`crate::types::RowError`]로
//! 임포트 요약에 집계됩니다. 어떤 에러도 코어 내부에서 자동 재시도를
//! 트리거하지 않습니다.

/// Vulntriage 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum VulntriageError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 임포트(파일 수준) 에러
    #[error("import error: {0}")]
    Import(#[from] ImportError),

    /// 스토리지 에러
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// 전문가 평가 검증 에러
    #[error("assessment error: {0}")]
    Assessment(#[from] AssessmentError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 임포트(파일 수준) 에러
///
/// 파일 단위로 치명적인 실패만 포함합니다. 개별 행의 문제는
/// 행 단위 에러로 집계되며 여기에 속하지 않습니다.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// 확장자로 판별할 수 없는 입력 형식 — 내용 추측(sniffing)은 하지 않음
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// 파일을 열거나 디코딩할 수 없음
    #[error("unreadable file: {path}: {reason}")]
    UnreadableFile { path: String, reason: String },

    /// 배치 커밋 실패 — 부분 상태는 남지 않음
    #[error("import failed: {0}")]
    ImportFailed(String),
}

/// 스토리지 에러
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// 데이터셋을 찾을 수 없음
    #[error("dataset not found: {id}")]
    DatasetNotFound { id: String },

    /// 레코드를 찾을 수 없음
    #[error("record not found: {id}")]
    RecordNotFound { id: String },

    /// 스냅샷 저장/로딩 실패
    #[error("snapshot error: {0}")]
    Snapshot(String),
}

/// 전문가 평가 검증 에러
///
/// 각 변형은 표시 레이어가 구체적인 메시지를 렌더링할 수 있도록
/// 기계 판별 가능한 거부 사유 하나에 대응합니다.
#[derive(Debug, thiserror::Error)]
pub enum AssessmentError {
    /// 근거 텍스트가 없거나 너무 짧음
    #[error("justification required: at least {min} characters (got {actual})")]
    JustificationRequired { min: usize, actual: usize },

    /// 5단계 어휘에 속하지 않는 심각도 토큰
    #[error("invalid severity: '{token}'")]
    InvalidSeverity { token: String },

    /// 허용 범위 [0.0, 10.0] 밖의 점수
    #[error("score out of range: {score} (allowed: 0.0-10.0)")]
    ScoreOutOfRange { score: f64 },
}
