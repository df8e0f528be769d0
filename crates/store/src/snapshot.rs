//! 스토어 스냅샷 — 로컬 JSON 파일 영속화
//!
//! 전체 스토어 상태를 하나의 JSON 문서로 기록합니다.
//! 데이터셋은 도착 순서로, 레코드는 데이터셋별 삽입 순서로 직렬화되어
//! 재로딩 시 목록 정렬 계약이 그대로 유지됩니다.
//!
//! # 기록 방식
//!
//! 같은 디렉토리의 임시 파일에 쓴 뒤 원자적 rename으로 교체합니다.
//! 중간에 실패해도 기존 스냅샷은 손상되지 않습니다.
//!
//! # Note
//!
//! 이 모듈의 함수는 동기 I/O를 수행합니다. async 컨텍스트에서 호출할 때는
//! `tokio::task::spawn_blocking`으로 감싸세요.

use std::path::Path;

use serde::{Deserialize, Serialize};

use vulntriage_core::types::{Dataset, VulnerabilityRecord};

use crate::error::StoreError;
use crate::store::StoreState;

/// 스냅샷 문서 버전
const SNAPSHOT_VERSION: u32 = 1;

/// 스냅샷 파일 최대 크기 (512 MB)
const MAX_SNAPSHOT_FILE_SIZE: u64 = 512 * 1024 * 1024;

/// 스냅샷 문서 — 디스크에 기록되는 전체 상태
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct StoreSnapshot {
    /// 문서 형식 버전
    version: u32,
    /// 데이터셋 (도착 순서)
    datasets: Vec<Dataset>,
    /// 레코드 (데이터셋별 삽입 순서로 그룹화)
    records: Vec<VulnerabilityRecord>,
}

impl StoreSnapshot {
    /// 스토어 상태에서 스냅샷 문서를 생성합니다.
    pub(crate) fn from_state(state: &StoreState) -> Self {
        let mut datasets = Vec::with_capacity(state.datasets.len());
        let mut records = Vec::with_capacity(state.records.len());

        for dataset_id in &state.dataset_order {
            if let Some(dataset) = state.datasets.get(dataset_id) {
                datasets.push(dataset.clone());
            }
            if let Some(record_ids) = state.dataset_records.get(dataset_id) {
                for record_id in record_ids {
                    if let Some(record) = state.records.get(record_id) {
                        records.push(record.clone());
                    }
                }
            }
        }

        Self {
            version: SNAPSHOT_VERSION,
            datasets,
            records,
        }
    }

    /// 스냅샷 문서를 스토어 상태로 복원합니다.
    pub(crate) fn into_state(self) -> StoreState {
        let mut state = StoreState::empty();

        for dataset in self.datasets {
            state.dataset_order.push(dataset.id.clone());
            state.dataset_records.insert(dataset.id.clone(), Vec::new());
            state.datasets.insert(dataset.id.clone(), dataset);
        }

        for record in self.records {
            if let Some(ids) = state.dataset_records.get_mut(&record.dataset_id) {
                ids.push(record.id.clone());
            }
            state.records.insert(record.id.clone(), record);
        }

        state
    }
}

/// 스냅샷 파일을 로드합니다. 파일이 없으면 빈 상태를 반환합니다.
pub(crate) fn load(path: &Path) -> Result<StoreState, StoreError> {
    let metadata = match std::fs::metadata(path) {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "snapshot file not found, starting empty");
            return Ok(StoreState::empty());
        }
        Err(e) => {
            return Err(StoreError::Snapshot {
                path: path.display().to_string(),
                reason: e.to_string(),
            });
        }
    };

    if metadata.len() > MAX_SNAPSHOT_FILE_SIZE {
        return Err(StoreError::Snapshot {
            path: path.display().to_string(),
            reason: format!(
                "file size {} bytes exceeds maximum {} bytes",
                metadata.len(),
                MAX_SNAPSHOT_FILE_SIZE
            ),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|e| StoreError::Snapshot {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let doc: StoreSnapshot =
        serde_json::from_str(&content).map_err(|e| StoreError::Snapshot {
            path: path.display().to_string(),
            reason: format!("failed to parse snapshot JSON: {e}"),
        })?;

    if doc.version != SNAPSHOT_VERSION {
        return Err(StoreError::Snapshot {
            path: path.display().to_string(),
            reason: format!(
                "unsupported snapshot version {} (expected {})",
                doc.version, SNAPSHOT_VERSION
            ),
        });
    }

    tracing::info!(
        path = %path.display(),
        datasets = doc.datasets.len(),
        records = doc.records.len(),
        "snapshot loaded"
    );

    Ok(doc.into_state())
}

/// 스냅샷을 임시 파일에 쓴 뒤 원자적 rename으로 교체합니다.
pub(crate) fn write_atomic(path: &Path, json: &[u8]) -> Result<(), StoreError> {
    let snapshot_err = |reason: String| StoreError::Snapshot {
        path: path.display().to_string(),
        reason,
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| snapshot_err(e.to_string()))?;
        }
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp_path = std::path::PathBuf::from(tmp);

    std::fs::write(&tmp_path, json).map_err(|e| snapshot_err(e.to_string()))?;
    std::fs::rename(&tmp_path, path).map_err(|e| {
        // rename 실패 시 임시 파일은 남기지 않음
        let _ = std::fs::remove_file(&tmp_path);
        snapshot_err(e.to_string())
    })?;

    Ok(())
}
