//! 전문가 평가 엔진 — 검증과 원자적 적용
//!
//! 분석가의 평가([`ExpertUpdate`])를 기존 레코드에 병합합니다.
//! 스캐너 원본 필드는 보존되고, 전문가 레이어는 수락된 업데이트마다
//! 통째로 교체됩니다 (이전 값과의 부분 병합 없음 — 빈 입력은 해당
//! 필드의 명시적 철회입니다).
//!
//! # 검증 순서
//!
//! 1. 레코드 존재 확인 — `RecordNotFound`
//! 2. 근거 텍스트: trim 후 10자 이상 — `JustificationRequired`.
//!    순수 철회 호출에도 새 근거가 필요합니다 (감사 가능성 우선).
//! 3. 심각도: 비어 있거나 5단계 어휘의 구성원 — `InvalidSeverity`
//! 4. 점수: 비어 있거나 [0.0, 10.0] — `ScoreOutOfRange`
//!
//! 검증에 실패하면 저장된 레코드는 전혀 변경되지 않습니다.
//! 같은 레코드에 대한 동시 업데이트는 스토어의 쓰기 락으로 직렬화됩니다.

use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use tracing::info;

use vulntriage_core::error::AssessmentError;
use vulntriage_core::metrics as m;
use vulntriage_core::types::{ExpertAssessment, Severity, VulnerabilityRecord, score_in_range};

use crate::error::StoreError;
use crate::store::DatasetStore;

/// 근거 텍스트 최소 길이 (trim 후 문자 수)
pub const MIN_JUSTIFICATION_CHARS: usize = 10;

/// 전문가 평가 업데이트 요청
///
/// `severity`/`vector`/`score`가 없거나 빈 값이면 해당 전문가 필드를
/// 철회(해제)합니다. `justification`은 모든 호출에 필수입니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpertUpdate {
    /// 대상 레코드 ID
    pub record_id: String,
    /// 심각도 토큰 (예: "high") — 없거나 빈 값이면 철회
    pub severity: Option<String>,
    /// 벡터 문자열 — 없거나 빈 값이면 철회
    pub vector: Option<String>,
    /// 점수 — 없으면 철회
    pub score: Option<f64>,
    /// 평가 근거 (필수, trim 후 10자 이상)
    pub justification: String,
}

/// 업데이트 요청을 검증하고 새 전문가 레이어를 구성합니다.
///
/// `updated_at`은 호출자가 채웁니다.
fn build_assessment(update: &ExpertUpdate) -> Result<ExpertAssessment, AssessmentError> {
    let justification = update.justification.trim();
    let justification_len = justification.chars().count();
    if justification_len < MIN_JUSTIFICATION_CHARS {
        return Err(AssessmentError::JustificationRequired {
            min: MIN_JUSTIFICATION_CHARS,
            actual: justification_len,
        });
    }

    let severity = match update.severity.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(token) => match Severity::from_str_loose(token) {
            Some(parsed) if parsed.is_known() => Some(parsed),
            // `Unknown`은 정규화 센티널이지 평가 값이 아님
            _ => {
                return Err(AssessmentError::InvalidSeverity {
                    token: token.to_owned(),
                });
            }
        },
    };

    let score = match update.score {
        None => None,
        Some(value) if score_in_range(value) => Some(value),
        Some(value) => return Err(AssessmentError::ScoreOutOfRange { score: value }),
    };

    let vector = update
        .vector
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToOwned::to_owned);

    Ok(ExpertAssessment {
        severity,
        vector,
        score,
        justification: Some(justification.to_owned()),
        updated_at: None,
    })
}

impl DatasetStore {
    /// 전문가 평가를 검증하고 원자적으로 적용합니다.
    ///
    /// 성공 시 원본 + 전문가 레이어가 모두 담긴 전체 레코드를 반환하므로
    /// 호출자는 별도 조회 없이 화면을 갱신할 수 있습니다.
    /// `updated_at`은 같은 레코드의 직전 값보다 항상 큽니다.
    pub async fn apply_expert_update(
        &self,
        update: ExpertUpdate,
    ) -> Result<VulnerabilityRecord, StoreError> {
        let mut state = self.state.write().await;

        if !state.records.contains_key(&update.record_id) {
            metrics::counter!(m::STORE_ASSESSMENTS_REJECTED_TOTAL).increment(1);
            return Err(StoreError::RecordNotFound {
                id: update.record_id,
            });
        }

        let assessment = match build_assessment(&update) {
            Ok(a) => a,
            Err(e) => {
                metrics::counter!(m::STORE_ASSESSMENTS_REJECTED_TOTAL).increment(1);
                return Err(StoreError::Assessment(e));
            }
        };

        let (updated, previous) = {
            // contains_key 확인 후라 get_mut은 항상 성공하지만 방어적으로 처리
            let Some(record) = state.records.get_mut(&update.record_id) else {
                return Err(StoreError::RecordNotFound {
                    id: update.record_id,
                });
            };

            // updated_at 단조 증가 보장: 시계가 멈춰 있으면 1ns 전진
            let now = SystemTime::now();
            let updated_at = match record.expert.updated_at {
                Some(prev) if now <= prev => prev + Duration::from_nanos(1),
                _ => now,
            };

            let previous = std::mem::replace(
                &mut record.expert,
                ExpertAssessment {
                    updated_at: Some(updated_at),
                    ..assessment
                },
            );
            (record.clone(), previous)
        };

        if let Err(e) = self.persist(&state).await {
            // 스냅샷 실패 시 이전 레이어로 복원 — 부분 적용은 관찰 불가
            if let Some(record) = state.records.get_mut(&updated.id) {
                record.expert = previous;
            }
            return Err(e);
        }

        metrics::counter!(m::STORE_ASSESSMENTS_APPLIED_TOTAL).increment(1);
        info!(
            record_id = %updated.id,
            severity = ?updated.expert.severity,
            score = ?updated.expert.score,
            "expert assessment applied"
        );

        Ok(updated)
    }
}
