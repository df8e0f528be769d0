//! 스키마 정규화기 — 원시 행을 표준 레코드로 변환
//!
//! 스캐너마다 다른 컬럼명(duck-typed)을 표준 필드로 매핑하고,
//! 타입 강제와 필수 필드 검사를 수행합니다. [`Normalizer`]는 원시 행
//! 하나를 소비해 원본 레이어만 담긴 [`NormalizedRecord`] 또는
//! 문제 필드와 사유가 담긴 [`NormalizationError`]를 생성합니다.
//!
//! # 규칙
//!
//! - 컬럼 별칭: 표준 필드마다 여러 별칭을 인식합니다 (대소문자,
//!   공백/밑줄/하이픈 무시). 모르는 컬럼은 에러가 아니라 무시입니다.
//! - 심각도: 어휘에 매핑 실패 시 행을 거부하지 않고
//!   [`Severity::Unknown`]으로 강등합니다 — 스캐너 어휘 편차 흡수.
//! - 점수: 범위 밖 숫자는 클램핑하지 않고 거부합니다. 데이터 신뢰를
//!   조용히 훼손하지 않기 위함입니다. 소수점 콤마("7,3")는 허용합니다.
//! - 필수 필드(`cve_id`, `product`) 누락/공백이면 행 거부.
//! - 선택 문맥 필드는 누락 시 빈 문자열 (null 없음).

use std::collections::HashMap;

use vulntriage_core::types::{NormalizedRecord, OriginalAssessment, Severity, score_in_range};

use crate::types::RawRow;

/// 정규화 실패 — 문제 필드와 사유
#[derive(Debug, thiserror::Error)]
#[error("field '{field}': {reason}")]
pub struct NormalizationError {
    /// 표준 필드명
    pub field: &'static str,
    /// 거부 사유
    pub reason: String,
}

/// 표준 필드 식별자
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CanonicalField {
    CveId,
    Product,
    Component,
    Severity,
    Vector,
    Score,
    DispositionSummary,
    Rationale,
}

/// 표준 필드별 별칭 테이블 (키는 [`normalize_key`] 적용 후 형태)
const ALIASES: &[(&str, CanonicalField)] = &[
    // CVE 식별자
    ("cveid", CanonicalField::CveId),
    ("cve", CanonicalField::CveId),
    ("cvenumber", CanonicalField::CveId),
    ("vulnerabilityid", CanonicalField::CveId),
    ("vulnerability.name", CanonicalField::CveId),
    ("vulnerability.@id", CanonicalField::CveId),
    // 제품
    ("product", CanonicalField::Product),
    ("productname", CanonicalField::Product),
    ("affectedproduct", CanonicalField::Product),
    ("products.@id", CanonicalField::Product),
    ("products.name", CanonicalField::Product),
    // 컴포넌트
    ("component", CanonicalField::Component),
    ("subcomponent", CanonicalField::Component),
    ("package", CanonicalField::Component),
    ("artifact", CanonicalField::Component),
    ("products.subcomponents.@id", CanonicalField::Component),
    // 심각도
    ("originalseverity", CanonicalField::Severity),
    ("severity", CanonicalField::Severity),
    ("scannerseverity", CanonicalField::Severity),
    ("sev", CanonicalField::Severity),
    ("baseseverity", CanonicalField::Severity),
    ("vulnerability.severity", CanonicalField::Severity),
    // 벡터
    ("originalvector", CanonicalField::Vector),
    ("vector", CanonicalField::Vector),
    ("cvssvector", CanonicalField::Vector),
    ("vectorstring", CanonicalField::Vector),
    ("vulnerability.vector", CanonicalField::Vector),
    // 점수
    ("originalscore", CanonicalField::Score),
    ("score", CanonicalField::Score),
    ("cvssscore", CanonicalField::Score),
    ("basescore", CanonicalField::Score),
    ("vulnerability.score", CanonicalField::Score),
    // 처리 요약
    ("dispositionsummary", CanonicalField::DispositionSummary),
    ("disposition", CanonicalField::DispositionSummary),
    ("impactstatement", CanonicalField::DispositionSummary),
    ("status", CanonicalField::DispositionSummary),
    ("statusnotes", CanonicalField::DispositionSummary),
    // 근거 (스캐너 제공 문맥 — 전문가 근거와 무관)
    ("rationale", CanonicalField::Rationale),
    ("justification", CanonicalField::Rationale),
    ("actionstatement", CanonicalField::Rationale),
    ("analysis", CanonicalField::Rationale),
];

/// 스키마 정규화기
///
/// 상태 없는 별칭 테이블을 보유합니다. 복제가 저렴하므로
/// blocking 태스크로 이동해 사용할 수 있습니다.
#[derive(Debug, Clone)]
pub struct Normalizer {
    aliases: HashMap<&'static str, CanonicalField>,
}

impl Normalizer {
    /// 기본 별칭 테이블로 정규화기를 생성합니다.
    pub fn new() -> Self {
        Self {
            aliases: ALIASES.iter().copied().collect(),
        }
    }

    /// 원시 행 하나를 표준 레코드로 정규화합니다.
    pub fn normalize(&self, row: &RawRow) -> Result<NormalizedRecord, NormalizationError> {
        // 표준 필드별 첫 번째 비어 있지 않은 값 수집
        let mut values: HashMap<CanonicalField, &str> = HashMap::new();
        for (key, value) in &row.fields {
            let Some(field) = self.aliases.get(normalize_key(key).as_str()) else {
                continue; // 모르는 컬럼은 무시
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            values.entry(*field).or_insert(value);
        }

        let cve_raw = values
            .get(&CanonicalField::CveId)
            .ok_or(NormalizationError {
                field: "cve_id",
                reason: "required field is missing or empty".to_owned(),
            })?;
        let cve_id = normalize_cve_id(cve_raw).ok_or_else(|| NormalizationError {
            field: "cve_id",
            reason: format!("'{cve_raw}' is not CVE-shaped (expected CVE-YYYY-NNNN)"),
        })?;

        let product = values
            .get(&CanonicalField::Product)
            .map(|v| (*v).to_owned())
            .ok_or(NormalizationError {
                field: "product",
                reason: "required field is missing or empty".to_owned(),
            })?;

        let severity = values
            .get(&CanonicalField::Severity)
            .and_then(|token| Severity::from_str_loose(token))
            .unwrap_or(Severity::Unknown);

        let score = match values.get(&CanonicalField::Score) {
            None => None,
            Some(raw) => Some(parse_score(raw)?),
        };

        let vector = match values.get(&CanonicalField::Vector) {
            None => String::new(),
            Some(raw) if is_vector_shaped(raw) => (*raw).to_owned(),
            Some(raw) => {
                return Err(NormalizationError {
                    field: "vector",
                    reason: format!("'{raw}' is not a CVSS-shaped vector"),
                });
            }
        };

        let component = values
            .get(&CanonicalField::Component)
            .map(|v| (*v).to_owned())
            .unwrap_or_default();
        let disposition_summary = values
            .get(&CanonicalField::DispositionSummary)
            .map(|v| (*v).to_owned())
            .unwrap_or_default();
        let rationale = values
            .get(&CanonicalField::Rationale)
            .map(|v| (*v).to_owned())
            .unwrap_or_default();

        Ok(NormalizedRecord {
            cve_id,
            product,
            component,
            original: OriginalAssessment {
                severity,
                vector,
                score,
                disposition_summary,
                rationale,
            },
        })
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// 컬럼명을 별칭 조회 형태로 정규화합니다.
///
/// 소문자화 후 공백/밑줄/하이픈을 제거합니다. 점(.)은 중첩 JSON 경로
/// 구분자이므로 유지합니다.
fn normalize_key(key: &str) -> String {
    key.trim()
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .collect()
}

/// CVE 식별자의 형태를 검사하고 대문자로 정규화합니다.
///
/// 허용 형태: `CVE-<연도 4자리>-<일련번호 4자리 이상>`.
/// 외부 레지스트리 조회는 하지 않습니다.
fn normalize_cve_id(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let rest = if raw.len() >= 4 && raw[..4].eq_ignore_ascii_case("cve-") {
        &raw[4..]
    } else {
        return None;
    };

    let (year, seq) = rest.split_once('-')?;
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if seq.len() < 4 || !seq.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(format!("CVE-{year}-{seq}"))
}

/// 점수 텍스트를 숫자로 강제합니다.
///
/// 소수점 콤마("7,3")를 허용하고, 범위 밖 값은 클램핑 없이 거부합니다.
fn parse_score(raw: &str) -> Result<f64, NormalizationError> {
    let cleaned = raw.trim().replace(',', ".");
    let value: f64 = cleaned.parse().map_err(|_| NormalizationError {
        field: "score",
        reason: format!("'{raw}' is not a number"),
    })?;
    if !score_in_range(value) {
        return Err(NormalizationError {
            field: "score",
            reason: format!("{value} is outside the allowed range 0.0-10.0"),
        });
    }
    Ok(value)
}

/// CVSS 계열 벡터 형태 검사 (의미 분석 없음)
///
/// `/`로 구분된 `KEY:value` 세그먼트의 나열이어야 합니다.
/// 예: `CVSS:3.1/AV:N/AC:L/PR:N`, `AV:L/AC:H`
fn is_vector_shaped(s: &str) -> bool {
    s.split('/').all(|segment| {
        let Some((key, value)) = segment.split_once(':') else {
            return false;
        };
        let key_ok = !key.is_empty()
            && key.len() <= 8
            && key.bytes().all(|b| b.is_ascii_alphanumeric());
        let value_ok = !value.is_empty()
            && value
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'-');
        key_ok && value_ok
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(fields: &[(&str, &str)]) -> RawRow {
        RawRow {
            index: 1,
            fields: fields
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect(),
        }
    }

    #[test]
    fn normalize_full_row() {
        let normalizer = Normalizer::new();
        let record = normalizer
            .normalize(&row(&[
                ("CVE ID", "CVE-2024-1234"),
                ("Product", "openssl"),
                ("Component", "libcrypto"),
                ("Original Severity", "High"),
                ("Original Vector", "CVSS:3.1/AV:N/AC:L"),
                ("Original Score", "8.1"),
                ("Disposition Summary", "patch pending"),
                ("Rationale", "remote code execution"),
            ]))
            .unwrap();

        assert_eq!(record.cve_id, "CVE-2024-1234");
        assert_eq!(record.product, "openssl");
        assert_eq!(record.component, "libcrypto");
        assert_eq!(record.original.severity, Severity::High);
        assert_eq!(record.original.vector, "CVSS:3.1/AV:N/AC:L");
        assert_eq!(record.original.score, Some(8.1));
        assert_eq!(record.original.disposition_summary, "patch pending");
        assert_eq!(record.original.rationale, "remote code execution");
    }

    #[test]
    fn aliases_are_case_and_separator_insensitive() {
        let normalizer = Normalizer::new();
        let record = normalizer
            .normalize(&row(&[
                ("cve_id", "cve-2024-0042"),
                ("scanner_severity", "critical"),
                ("PRODUCT-NAME", "nginx"),
            ]))
            .unwrap();
        assert_eq!(record.cve_id, "CVE-2024-0042");
        assert_eq!(record.product, "nginx");
        assert_eq!(record.original.severity, Severity::Critical);
    }

    #[test]
    fn vex_dotted_paths_map_to_fields() {
        let normalizer = Normalizer::new();
        let record = normalizer
            .normalize(&row(&[
                ("vulnerability.name", "CVE-2023-44487"),
                ("products.@id", "ingress-gateway"),
                ("impact_statement", "not affected"),
                ("justification", "vulnerable code not present"),
            ]))
            .unwrap();
        assert_eq!(record.cve_id, "CVE-2023-44487");
        assert_eq!(record.product, "ingress-gateway");
        assert_eq!(record.original.disposition_summary, "not affected");
        assert_eq!(record.original.rationale, "vulnerable code not present");
    }

    #[test]
    fn unknown_columns_are_ignored() {
        let normalizer = Normalizer::new();
        let record = normalizer
            .normalize(&row(&[
                ("cve", "CVE-2024-0001"),
                ("product", "demo"),
                ("internal_tracking_number", "TRK-9"),
                ("scanner_build", "v7"),
            ]))
            .unwrap();
        assert_eq!(record.cve_id, "CVE-2024-0001");
    }

    #[test]
    fn missing_cve_id_rejects_row() {
        let normalizer = Normalizer::new();
        let err = normalizer
            .normalize(&row(&[("product", "demo")]))
            .unwrap_err();
        assert_eq!(err.field, "cve_id");
    }

    #[test]
    fn empty_cve_id_rejects_row() {
        let normalizer = Normalizer::new();
        let err = normalizer
            .normalize(&row(&[("cve", "   "), ("product", "demo")]))
            .unwrap_err();
        assert_eq!(err.field, "cve_id");
    }

    #[test]
    fn missing_product_rejects_row() {
        let normalizer = Normalizer::new();
        let err = normalizer
            .normalize(&row(&[("cve", "CVE-2024-0001")]))
            .unwrap_err();
        assert_eq!(err.field, "product");
    }

    #[test]
    fn malformed_cve_rejects_row() {
        let normalizer = Normalizer::new();
        let err = normalizer
            .normalize(&row(&[("cve", "GHSA-xxxx-yyyy"), ("product", "demo")]))
            .unwrap_err();
        assert_eq!(err.field, "cve_id");
    }

    #[test]
    fn unrecognized_severity_becomes_unknown() {
        let normalizer = Normalizer::new();
        let record = normalizer
            .normalize(&row(&[
                ("cve", "CVE-2024-0001"),
                ("product", "demo"),
                ("severity", "sev-1"),
            ]))
            .unwrap();
        assert_eq!(record.original.severity, Severity::Unknown);
    }

    #[test]
    fn missing_severity_becomes_unknown() {
        let normalizer = Normalizer::new();
        let record = normalizer
            .normalize(&row(&[("cve", "CVE-2024-0001"), ("product", "demo")]))
            .unwrap();
        assert_eq!(record.original.severity, Severity::Unknown);
    }

    #[test]
    fn decimal_comma_score_is_parsed() {
        let normalizer = Normalizer::new();
        let record = normalizer
            .normalize(&row(&[
                ("cve", "CVE-2024-0001"),
                ("product", "demo"),
                ("score", "7,3"),
            ]))
            .unwrap();
        assert_eq!(record.original.score, Some(7.3));
    }

    #[test]
    fn out_of_range_score_rejects_row_not_clamped() {
        let normalizer = Normalizer::new();
        let err = normalizer
            .normalize(&row(&[
                ("cve", "CVE-2024-0001"),
                ("product", "demo"),
                ("score", "11.0"),
            ]))
            .unwrap_err();
        assert_eq!(err.field, "score");
        assert!(err.reason.contains("range"));
    }

    #[test]
    fn non_numeric_score_rejects_row() {
        let normalizer = Normalizer::new();
        let err = normalizer
            .normalize(&row(&[
                ("cve", "CVE-2024-0001"),
                ("product", "demo"),
                ("score", "high"),
            ]))
            .unwrap_err();
        assert_eq!(err.field, "score");
    }

    #[test]
    fn missing_optional_fields_default_to_empty_string() {
        let normalizer = Normalizer::new();
        let record = normalizer
            .normalize(&row(&[("cve", "CVE-2024-0001"), ("product", "demo")]))
            .unwrap();
        assert_eq!(record.component, "");
        assert_eq!(record.original.vector, "");
        assert_eq!(record.original.disposition_summary, "");
        assert_eq!(record.original.rationale, "");
        assert_eq!(record.original.score, None);
    }

    #[test]
    fn malformed_vector_rejects_row() {
        let normalizer = Normalizer::new();
        let err = normalizer
            .normalize(&row(&[
                ("cve", "CVE-2024-0001"),
                ("product", "demo"),
                ("vector", "just some text"),
            ]))
            .unwrap_err();
        assert_eq!(err.field, "vector");
    }

    #[test]
    fn duplicate_aliases_first_non_empty_wins() {
        let normalizer = Normalizer::new();
        let record = normalizer
            .normalize(&row(&[
                ("cve", ""),
                ("CVE ID", "CVE-2024-0002"),
                ("product", "demo"),
            ]))
            .unwrap();
        assert_eq!(record.cve_id, "CVE-2024-0002");
    }

    #[test]
    fn cve_id_is_uppercased() {
        assert_eq!(
            normalize_cve_id("cve-2024-12345"),
            Some("CVE-2024-12345".to_owned())
        );
    }

    #[test]
    fn cve_shape_validation() {
        assert!(normalize_cve_id("CVE-2024-1234").is_some());
        assert!(normalize_cve_id("CVE-2024-123456").is_some());
        assert!(normalize_cve_id("CVE-24-1234").is_none()); // 연도 2자리
        assert!(normalize_cve_id("CVE-2024-123").is_none()); // 일련번호 3자리
        assert!(normalize_cve_id("CVE-2024-12a4").is_none());
        assert!(normalize_cve_id("2024-1234").is_none());
        assert!(normalize_cve_id("").is_none());
    }

    #[test]
    fn vector_shape_validation() {
        assert!(is_vector_shaped("CVSS:3.1/AV:N/AC:L/PR:N/UI:N"));
        assert!(is_vector_shaped("AV:L/AC:H"));
        assert!(is_vector_shaped("AV:N"));
        assert!(!is_vector_shaped("plain text"));
        assert!(!is_vector_shaped("AV:N//AC:L"));
        assert!(!is_vector_shaped("AV:"));
        assert!(!is_vector_shaped(":N"));
    }

    #[test]
    fn key_normalization() {
        assert_eq!(normalize_key("Original Severity"), "originalseverity");
        assert_eq!(normalize_key("cve_id"), "cveid");
        assert_eq!(normalize_key("PRODUCT-NAME"), "productname");
        assert_eq!(normalize_key("vulnerability.name"), "vulnerability.name");
    }
}
