//! 도메인 타입 — 시스템 전역에서 사용되는 공통 타입
//!
//! 데이터셋(임포트 배치), 취약점 레코드, 심각도 어휘 등
//! 모든 모듈이 공유하는 데이터 구조를 정의합니다.
//! 레코드는 스캐너 원본 레이어(ingest 시점에 한 번만 기록)와
//! 전문가 평가 레이어(override 경로로만 변경)로 구성됩니다.

use std::fmt;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// 점수 하한 (CVSS 기준)
pub const MIN_SCORE: f64 = 0.0;

/// 점수 상한 (CVSS 기준)
pub const MAX_SCORE: f64 = 10.0;

/// 점수가 허용 범위 [0.0, 10.0] 안에 있는지 확인합니다.
///
/// NaN과 무한대는 범위 밖으로 취급합니다.
pub fn score_in_range(score: f64) -> bool {
    score.is_finite() && (MIN_SCORE..=MAX_SCORE).contains(&score)
}

/// 심각도 레벨
///
/// 고정 5단계 어휘(`Info < Low < Medium < High < Critical`)에
/// 정규화 단계에서 매핑 실패 시 사용하는 [`Severity::Unknown`] 센티널을 더한 것입니다.
/// `Unknown`은 목록 표시에서 구분되어 노출되고 임포트 요약에서 별도로 집계되며,
/// 전문가 평가 레이어에는 절대 저장되지 않습니다.
/// `Ord` 구현으로 심각도 비교가 가능합니다 (`Unknown`이 최하위).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Severity {
    /// 어휘에 매핑되지 않은 스캐너 토큰
    #[default]
    Unknown,
    /// 정보성
    Info,
    /// 낮은 심각도
    Low,
    /// 중간 심각도
    Medium,
    /// 높은 심각도
    High,
    /// 치명적 — 즉시 대응 필요
    Critical,
}

impl Severity {
    /// 5단계 어휘의 구성원인지 확인합니다 (`Unknown` 제외).
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// 문자열에서 심각도를 파싱합니다.
    ///
    /// 대소문자를 구분하지 않으며 스캐너별 동의어를 허용합니다.
    /// 인식할 수 없는 토큰은 `None`을 반환합니다 — 정규화 단계는 이를
    /// [`Severity::Unknown`]으로 강등하고, 전문가 평가 검증은 거부합니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "info" | "informational" | "none" => Some(Self::Info),
            "low" | "negligible" => Some(Self::Low),
            "medium" | "med" | "moderate" => Some(Self::Medium),
            "high" | "important" => Some(Self::High),
            "critical" | "crit" => Some(Self::Critical),
            "unknown" | "unspecified" => Some(Self::Unknown),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "Unknown"),
            Self::Info => write!(f, "Info"),
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
            Self::Critical => write!(f, "Critical"),
        }
    }
}

/// 데이터셋 — 단일 소스 파일에서 완료된 임포트 배치 하나
///
/// 성공한 ingest 호출마다 정확히 한 번 생성되며 이후 변경되지 않습니다.
/// 명시적인 데이터셋 삭제 경로 외에는 제거되지 않습니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    /// 데이터셋 ID (UUID v4, 재사용 없음)
    pub id: String,
    /// 원본 파일명 (표시용, 경로 아님)
    pub file_name: String,
    /// 임포트 완료 시각
    pub created_at: SystemTime,
    /// 커밋된 레코드 수 — 커밋 후 불변
    pub record_count: usize,
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dataset[{}] file={} records={}",
            &self.id[..8.min(self.id.len())],
            self.file_name,
            self.record_count,
        )
    }
}

/// 스캐너 원본 평가 레이어
///
/// ingest 시점에 스캐너 데이터로부터 한 번만 기록되며 이후 어떤 API도
/// 이 레이어를 변경하지 않습니다. 선택적 문맥 필드는 누락 시 빈 문자열로
/// 기본 설정합니다 (null 없음 — 다운스트림 표시 계약 단순화).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OriginalAssessment {
    /// 스캐너가 보고한 심각도 (매핑 실패 시 `Unknown`)
    pub severity: Severity,
    /// CVSS 계열 벡터 문자열 — 형식만 검사, 의미 분석 없음
    pub vector: String,
    /// 스캐너가 보고한 점수 (있을 경우, [0.0, 10.0])
    pub score: Option<f64>,
    /// 스캐너가 제공한 처리 요약 (읽기 전용 문맥)
    pub disposition_summary: String,
    /// 스캐너가 제공한 근거 텍스트 (읽기 전용 문맥)
    pub rationale: String,
}

/// 전문가 평가 레이어
///
/// 첫 override까지는 모든 필드가 비어 있습니다. 수락된 override마다
/// 레이어 전체가 새 값으로 교체되며(이전 값과의 병합 없음),
/// `updated_at`은 같은 레코드에 대해 단조 증가합니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpertAssessment {
    /// 전문가가 지정한 심각도 (5단계 어휘만 허용)
    pub severity: Option<Severity>,
    /// 전문가가 지정한 벡터 문자열
    pub vector: Option<String>,
    /// 전문가가 지정한 점수 ([0.0, 10.0])
    pub score: Option<f64>,
    /// 평가 근거 — 레이어가 설정될 때 필수
    pub justification: Option<String>,
    /// 마지막으로 수락된 override 시각
    pub updated_at: Option<SystemTime>,
}

impl ExpertAssessment {
    /// 아직 어떤 override도 수락되지 않았는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.updated_at.is_none()
    }
}

/// 취약점 레코드 — 하나의 제품/컴포넌트에 대한 단일 취약점 소견
///
/// 원본 레이어는 소유 데이터셋 커밋 이후 append-only이며,
/// 전문가 레이어는 override 경로를 통해서만 변경됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulnerabilityRecord {
    /// 레코드 ID (UUID v4, 레코드 수명 동안 안정적)
    pub id: String,
    /// 소유 데이터셋 ID — 레코드는 다른 데이터셋으로 이동하지 않음
    pub dataset_id: String,
    /// CVE 식별자 (형태 검사만 수행, 외부 레지스트리 조회 없음)
    pub cve_id: String,
    /// 영향받는 제품명
    pub product: String,
    /// 영향받는 컴포넌트명 (없으면 빈 문자열)
    pub component: String,
    /// 스캐너 원본 레이어 (불변)
    pub original: OriginalAssessment,
    /// 전문가 평가 레이어 (override 경로로만 변경)
    pub expert: ExpertAssessment,
}

impl VulnerabilityRecord {
    /// 전문가 평가가 수락된 적이 있는지 확인합니다.
    pub fn has_expert_assessment(&self) -> bool {
        !self.expert.is_empty()
    }

    /// 표시용 유효 심각도를 반환합니다.
    ///
    /// 전문가가 심각도를 지정했으면 그 값을, 아니면 스캐너 원본을 사용합니다.
    pub fn effective_severity(&self) -> Severity {
        self.expert.severity.unwrap_or(self.original.severity)
    }

    /// 표시용 유효 점수를 반환합니다.
    pub fn effective_score(&self) -> Option<f64> {
        self.expert.score.or(self.original.score)
    }
}

impl fmt::Display for VulnerabilityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] {} / {}",
            self.cve_id,
            self.effective_severity(),
            self.product,
            if self.component.is_empty() {
                "-"
            } else {
                &self.component
            },
        )
    }
}

/// 정규화된 신규 레코드 — 스토어 커밋 전 단계의 레코드
///
/// 정규화기가 생성하며 원본 레이어만 담습니다. 식별자와 데이터셋 소속은
/// 스토어가 커밋 시점에 부여합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// CVE 식별자 (대문자 정규화됨)
    pub cve_id: String,
    /// 제품명
    pub product: String,
    /// 컴포넌트명 (없으면 빈 문자열)
    pub component: String,
    /// 스캐너 원본 레이어
    pub original: OriginalAssessment,
}

/// 행 단위 에러 — 스킵된 소스 행 하나에 대한 기록
///
/// 임포트 전체를 중단하지 않고 요약에 집계됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowError {
    /// 1부터 시작하는 데이터 행 번호 (헤더 제외)
    pub row: u64,
    /// 스킵 사유
    pub reason: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}: {}", self.row, self.reason)
    }
}

/// 임포트 요약 — ingest 호출 하나의 결과
///
/// 행 단위 에러는 개별 전파 대신 여기에 집계됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    /// 생성된 데이터셋 ID
    pub dataset_id: String,
    /// 원본 파일명
    pub file_name: String,
    /// 커밋된 레코드 수
    pub record_count: usize,
    /// 스킵된 행 수
    pub skipped_row_count: usize,
    /// 심각도가 `Unknown`으로 정규화된 레코드 수
    pub unknown_severity_count: usize,
    /// 행 단위 에러 목록 (보고 상한까지 절단됨)
    pub row_errors: Vec<RowError>,
}

impl fmt::Display for ImportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} records committed, {} rows skipped",
            self.file_name, self.record_count, self.skipped_row_count,
        )
    }
}
