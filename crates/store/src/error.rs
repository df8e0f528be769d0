//! 데이터셋 스토어 에러 타입
//!
//! [`StoreError`]는 스토어 모듈 내에서 발생할 수 있는 모든 에러를 나타냅니다.
//! `From<StoreError> for VulntriageError` 구현을 통해 `?` 연산자로
//! 상위 에러 타입으로 자연스럽게 전파됩니다.
//!
//! 전문가 평가 검증 거부는 core의 [`AssessmentError`]를 그대로 감쌉니다 —
//! 표시 레이어가 거부 사유별 메시지를 렌더링할 수 있도록 변형이 보존됩니다.

use vulntriage_core::error::{
    AssessmentError, ImportError, StorageError, VulntriageError,
};

/// 데이터셋 스토어 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// 데이터셋을 찾을 수 없음
    #[error("dataset not found: {id}")]
    DatasetNotFound {
        /// 요청된 데이터셋 ID
        id: String,
    },

    /// 레코드를 찾을 수 없음
    #[error("record not found: {id}")]
    RecordNotFound {
        /// 요청된 레코드 ID
        id: String,
    },

    /// 배치 커밋 실패 — 롤백되어 부분 상태는 남지 않음
    #[error("import failed: {reason}")]
    ImportFailed {
        /// 실패 사유
        reason: String,
    },

    /// 스냅샷 저장/로딩 실패
    #[error("snapshot error: {path}: {reason}")]
    Snapshot {
        /// 스냅샷 파일 경로
        path: String,
        /// 실패 사유
        reason: String,
    },

    /// 전문가 평가 검증 거부
    #[error(transparent)]
    Assessment(#[from] AssessmentError),
}

impl From<StoreError> for VulntriageError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DatasetNotFound { id } => {
                VulntriageError::Storage(StorageError::DatasetNotFound { id })
            }
            StoreError::RecordNotFound { id } => {
                VulntriageError::Storage(StorageError::RecordNotFound { id })
            }
            StoreError::ImportFailed { reason } => {
                VulntriageError::Import(ImportError::ImportFailed(reason))
            }
            StoreError::Snapshot { path, reason } => {
                VulntriageError::Storage(StorageError::Snapshot(format!("{path}: {reason}")))
            }
            StoreError::Assessment(e) => VulntriageError::Assessment(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_not_found_display() {
        let err = StoreError::DatasetNotFound {
            id: "ds-001".to_owned(),
        };
        assert!(err.to_string().contains("ds-001"));
    }

    #[test]
    fn record_not_found_display() {
        let err = StoreError::RecordNotFound {
            id: "rec-001".to_owned(),
        };
        assert!(err.to_string().contains("rec-001"));
    }

    #[test]
    fn import_failed_display() {
        let err = StoreError::ImportFailed {
            reason: "disk full".to_owned(),
        };
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn assessment_error_is_transparent() {
        let err = StoreError::Assessment(AssessmentError::ScoreOutOfRange { score: 11.0 });
        assert!(err.to_string().contains("score out of range"));
    }

    #[test]
    fn converts_to_vulntriage_error_not_found() {
        let err = StoreError::DatasetNotFound {
            id: "x".to_owned(),
        };
        let top: VulntriageError = err.into();
        assert!(matches!(
            top,
            VulntriageError::Storage(StorageError::DatasetNotFound { .. })
        ));
    }

    #[test]
    fn converts_to_vulntriage_error_import_failed() {
        let err = StoreError::ImportFailed {
            reason: "boom".to_owned(),
        };
        let top: VulntriageError = err.into();
        assert!(matches!(
            top,
            VulntriageError::Import(ImportError::ImportFailed(_))
        ));
    }

    #[test]
    fn converts_to_vulntriage_error_assessment() {
        let err = StoreError::Assessment(AssessmentError::JustificationRequired {
            min: 10,
            actual: 0,
        });
        let top: VulntriageError = err.into();
        assert!(matches!(top, VulntriageError::Assessment(_)));
    }
}
