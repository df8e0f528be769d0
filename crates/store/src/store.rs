//! 데이터셋 스토어 — 데이터셋/레코드 영속화와 배치 커밋
//!
//! [`DatasetStore`]는 데이터셋(임포트 배치)과 취약점 레코드의 소유자입니다.
//! 안정적인 식별자(UUID v4)와 타임스탬프, 삽입 순서를 부여하며,
//! 임포트당 all-or-nothing 커밋을 보장합니다.
//!
//! # 동시성 모델
//!
//! 전체 상태는 `tokio::sync::RwLock` 하나 뒤에 있습니다. 배치 커밋과
//! 전문가 평가는 쓰기 가드를 잡고 수행되므로 읽기 경로는 절대
//! 부분 커밋된 배치를 관찰하지 않습니다. 파일 파싱 같은 무거운 작업은
//! 락 밖에서 일어나고, 가드는 삽입과 스냅샷 기록 동안만 유지됩니다.
//! 동시 임포트는 UUID 기반 식별자로 서로 충돌하지 않습니다.
//!
//! # 영속화
//!
//! [`DatasetStore::open`]으로 생성하면 모든 쓰기 후 JSON 스냅샷을
//! 기록합니다 (임시 파일 + 원자적 rename). 스냅샷 기록이 실패하면
//! 해당 쓰기는 롤백되고 호출자는 에러를 받습니다.
//! [`DatasetStore::in_memory`]는 영속화를 생략합니다 (테스트, 임시 조회용).

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::SystemTime;

use tokio::sync::RwLock;
use tracing::{debug, info};

use vulntriage_core::metrics as m;
use vulntriage_core::types::{Dataset, ExpertAssessment, NormalizedRecord, VulnerabilityRecord};

use crate::error::StoreError;
use crate::snapshot::{self, StoreSnapshot};

/// 스토어 내부 상태
///
/// `dataset_order`는 배치 도착 순서를, `dataset_records`의 값은
/// 소스 파일 내 행 순서를 보존합니다.
pub(crate) struct StoreState {
    /// 데이터셋 ID로 인덱싱된 데이터셋
    pub(crate) datasets: HashMap<String, Dataset>,
    /// 데이터셋 도착 순서
    pub(crate) dataset_order: Vec<String>,
    /// 레코드 ID로 인덱싱된 레코드
    pub(crate) records: HashMap<String, VulnerabilityRecord>,
    /// 데이터셋별 레코드 ID 목록 (소스 파일 삽입 순서)
    pub(crate) dataset_records: HashMap<String, Vec<String>>,
}

impl StoreState {
    pub(crate) fn empty() -> Self {
        Self {
            datasets: HashMap::new(),
            dataset_order: Vec::new(),
            records: HashMap::new(),
            dataset_records: HashMap::new(),
        }
    }
}

/// 데이터셋 스토어
///
/// 임포트 배치 커밋, 읽기 전용 조회, 전문가 평가 적용의 단일 진입점입니다.
/// 조회는 [`crate::query`], 전문가 평가는 [`crate::assessment`] 모듈의
/// 메서드를 사용합니다.
pub struct DatasetStore {
    pub(crate) state: RwLock<StoreState>,
    snapshot_path: Option<PathBuf>,
}

impl DatasetStore {
    /// 영속화 없는 메모리 전용 스토어를 생성합니다.
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(StoreState::empty()),
            snapshot_path: None,
        }
    }

    /// 스냅샷 파일 기반 스토어를 엽니다.
    ///
    /// 파일이 존재하면 전체 상태를 로드하고, 없으면 빈 스토어로 시작합니다.
    /// 이후 모든 쓰기는 같은 경로에 스냅샷을 남깁니다.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let state = {
            let load_path = path.clone();
            tokio::task::spawn_blocking(move || snapshot::load(&load_path))
                .await
                .map_err(|e| StoreError::Snapshot {
                    path: path.display().to_string(),
                    reason: format!("snapshot load task failed: {e}"),
                })??
        };

        debug!(
            path = %path.display(),
            datasets = state.datasets.len(),
            records = state.records.len(),
            "dataset store opened"
        );

        let store = Self {
            state: RwLock::new(state),
            snapshot_path: Some(path),
        };
        store.update_gauges().await;
        Ok(store)
    }

    /// 스냅샷 파일 경로를 반환합니다 (메모리 전용이면 None).
    pub fn snapshot_path(&self) -> Option<&std::path::Path> {
        self.snapshot_path.as_deref()
    }

    /// 정규화된 레코드 배치를 새 데이터셋으로 커밋합니다.
    ///
    /// 데이터셋과 모든 레코드가 함께 저장되거나 아무것도 저장되지 않습니다.
    /// 같은 파일을 다시 커밋하면 항상 별개의 데이터셋이 됩니다 —
    /// 임포트는 독립 배치이며 병합되지 않습니다.
    /// 레코드가 없는 배치도 유효합니다 (record_count 0인 데이터셋 생성).
    pub async fn commit_import(
        &self,
        file_name: &str,
        rows: Vec<NormalizedRecord>,
    ) -> Result<Dataset, StoreError> {
        let dataset = Dataset {
            id: uuid::Uuid::new_v4().to_string(),
            file_name: file_name.to_owned(),
            created_at: SystemTime::now(),
            record_count: rows.len(),
        };

        let records: Vec<VulnerabilityRecord> = rows
            .into_iter()
            .map(|row| VulnerabilityRecord {
                id: uuid::Uuid::new_v4().to_string(),
                dataset_id: dataset.id.clone(),
                cve_id: row.cve_id,
                product: row.product,
                component: row.component,
                original: row.original,
                expert: ExpertAssessment::default(),
            })
            .collect();
        let record_ids: Vec<String> = records.iter().map(|r| r.id.clone()).collect();

        let mut state = self.state.write().await;

        state.datasets.insert(dataset.id.clone(), dataset.clone());
        state.dataset_order.push(dataset.id.clone());
        for record in records {
            state.records.insert(record.id.clone(), record);
        }
        state
            .dataset_records
            .insert(dataset.id.clone(), record_ids.clone());

        if let Err(e) = self.persist(&state).await {
            // 스냅샷 실패 시 배치 전체 롤백 — 독자는 부분 상태를 보지 못함
            state.datasets.remove(&dataset.id);
            state.dataset_order.retain(|id| id != &dataset.id);
            for id in &record_ids {
                state.records.remove(id);
            }
            state.dataset_records.remove(&dataset.id);
            return Err(StoreError::ImportFailed {
                reason: e.to_string(),
            });
        }

        metrics::gauge!(m::STORE_DATASETS).set(state.datasets.len() as f64);
        metrics::gauge!(m::STORE_RECORDS).set(state.records.len() as f64);

        info!(
            dataset_id = %dataset.id,
            file = %dataset.file_name,
            records = dataset.record_count,
            "import batch committed"
        );

        Ok(dataset)
    }

    /// 데이터셋과 소속 레코드를 모두 제거합니다.
    pub async fn remove_dataset(&self, dataset_id: &str) -> Result<Dataset, StoreError> {
        let mut state = self.state.write().await;

        let Some(dataset) = state.datasets.remove(dataset_id) else {
            return Err(StoreError::DatasetNotFound {
                id: dataset_id.to_owned(),
            });
        };

        let order_index = state.dataset_order.iter().position(|id| id == dataset_id);
        state.dataset_order.retain(|id| id != dataset_id);
        let record_ids = state.dataset_records.remove(dataset_id).unwrap_or_default();
        let mut removed: Vec<VulnerabilityRecord> = Vec::with_capacity(record_ids.len());
        for id in &record_ids {
            if let Some(record) = state.records.remove(id) {
                removed.push(record);
            }
        }

        if let Err(e) = self.persist(&state).await {
            // 롤백: 제거한 항목을 원래 위치로 복원
            state.datasets.insert(dataset.id.clone(), dataset.clone());
            match order_index {
                Some(i) => state.dataset_order.insert(i, dataset.id.clone()),
                None => state.dataset_order.push(dataset.id.clone()),
            }
            for record in removed {
                state.records.insert(record.id.clone(), record);
            }
            state
                .dataset_records
                .insert(dataset.id.clone(), record_ids);
            return Err(e);
        }

        metrics::gauge!(m::STORE_DATASETS).set(state.datasets.len() as f64);
        metrics::gauge!(m::STORE_RECORDS).set(state.records.len() as f64);

        info!(
            dataset_id = %dataset.id,
            records = record_ids.len(),
            "dataset removed"
        );

        Ok(dataset)
    }

    /// 현재 상태의 스냅샷을 기록합니다 (영속화 비활성 시 no-op).
    ///
    /// 직렬화는 호출 스레드에서, 파일 I/O는 `spawn_blocking`에서 수행합니다.
    pub(crate) async fn persist(&self, state: &StoreState) -> Result<(), StoreError> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };

        let doc = StoreSnapshot::from_state(state);
        let json = serde_json::to_vec_pretty(&doc).map_err(|e| StoreError::Snapshot {
            path: path.display().to_string(),
            reason: format!("serialization failed: {e}"),
        })?;

        let write_path = path.clone();
        tokio::task::spawn_blocking(move || snapshot::write_atomic(&write_path, &json))
            .await
            .map_err(|e| StoreError::Snapshot {
                path: path.display().to_string(),
                reason: format!("snapshot write task failed: {e}"),
            })??;

        Ok(())
    }

    async fn update_gauges(&self) {
        let state = self.state.read().await;
        metrics::gauge!(m::STORE_DATASETS).set(state.datasets.len() as f64);
        metrics::gauge!(m::STORE_RECORDS).set(state.records.len() as f64);
    }
}
