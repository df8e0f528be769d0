//! 조회 서비스 — 읽기 전용 프로젝션
//!
//! [`DatasetStore`] 위의 얇은 읽기 프로젝션입니다. 정렬 보장 외의
//! 비즈니스 로직은 없습니다:
//!
//! - 데이터셋 목록: `created_at` 내림차순 (최신 우선). 표시 레이어가
//!   이 순서에 의존하므로 구현 세부사항이 아니라 계약입니다.
//! - 레코드 목록: 소스 파일 내 행 순서 (재임포트 재현성과 감사 diff용).
//!
//! 빈 데이터셋(레코드 0개)도 에러 없이 처리됩니다.

use vulntriage_core::types::{Dataset, VulnerabilityRecord};

use crate::error::StoreError;
use crate::store::DatasetStore;

impl DatasetStore {
    /// 모든 데이터셋을 최신 우선으로 반환합니다.
    ///
    /// `created_at`이 같으면 나중에 도착한 배치가 먼저 옵니다.
    pub async fn list_datasets(&self) -> Vec<Dataset> {
        let state = self.state.read().await;
        let mut datasets: Vec<(usize, Dataset)> = state
            .dataset_order
            .iter()
            .enumerate()
            .filter_map(|(arrival, id)| state.datasets.get(id).map(|d| (arrival, d.clone())))
            .collect();
        datasets.sort_by(|a, b| {
            b.1.created_at
                .cmp(&a.1.created_at)
                .then_with(|| b.0.cmp(&a.0))
        });
        datasets.into_iter().map(|(_, dataset)| dataset).collect()
    }

    /// 데이터셋 하나를 조회합니다.
    pub async fn get_dataset(&self, dataset_id: &str) -> Result<Dataset, StoreError> {
        let state = self.state.read().await;
        state
            .datasets
            .get(dataset_id)
            .cloned()
            .ok_or_else(|| StoreError::DatasetNotFound {
                id: dataset_id.to_owned(),
            })
    }

    /// 데이터셋의 모든 레코드를 소스 파일 삽입 순서로 반환합니다.
    pub async fn list_records(
        &self,
        dataset_id: &str,
    ) -> Result<Vec<VulnerabilityRecord>, StoreError> {
        let state = self.state.read().await;
        let Some(record_ids) = state.dataset_records.get(dataset_id) else {
            return Err(StoreError::DatasetNotFound {
                id: dataset_id.to_owned(),
            });
        };
        Ok(record_ids
            .iter()
            .filter_map(|id| state.records.get(id).cloned())
            .collect())
    }

    /// 레코드 하나를 조회합니다.
    pub async fn get_record(&self, record_id: &str) -> Result<VulnerabilityRecord, StoreError> {
        let state = self.state.read().await;
        state
            .records
            .get(record_id)
            .cloned()
            .ok_or_else(|| StoreError::RecordNotFound {
                id: record_id.to_owned(),
            })
    }

    /// 현재 데이터셋 수를 반환합니다.
    pub async fn dataset_count(&self) -> usize {
        self.state.read().await.datasets.len()
    }

    /// 현재 레코드 수를 반환합니다.
    pub async fn record_count(&self) -> usize {
        self.state.read().await.records.len()
    }
}
