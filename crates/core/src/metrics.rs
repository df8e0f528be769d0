//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 모듈은 이 상수를 사용하여 `metrics::counter!()`, `metrics::gauge!()`,
//! `metrics::histogram!()` 매크로를 호출합니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `vulntriage_`
//! - 모듈명: `ingest_`, `store_`
//! - 접미어: `_total` (counter), `_seconds` (histogram/latency), 없음 (gauge)

// --- 레이블 키 상수 ---

/// 심각도 레이블 키 (unknown, info, low, medium, high, critical)
pub const LABEL_SEVERITY: &str = "severity";

/// 입력 형식 레이블 키 (delimited, spreadsheet, vex-json)
pub const LABEL_FORMAT: &str = "format";

/// 결과 레이블 키 (success, failure)
pub const LABEL_RESULT: &str = "result";

// --- Ingest 메트릭 ---

/// Ingest: 읽은 소스 행 수 (counter)
pub const INGEST_ROWS_READ_TOTAL: &str = "vulntriage_ingest_rows_read_total";

/// Ingest: 스킵된 행 수 (counter)
pub const INGEST_ROWS_SKIPPED_TOTAL: &str = "vulntriage_ingest_rows_skipped_total";

/// Ingest: 커밋된 레코드 수 (counter)
pub const INGEST_RECORDS_COMMITTED_TOTAL: &str = "vulntriage_ingest_records_committed_total";

/// Ingest: 완료된 임포트 수 (counter)
pub const INGEST_IMPORTS_COMPLETED_TOTAL: &str = "vulntriage_ingest_imports_completed_total";

/// Ingest: 실패한 임포트 수 (counter)
pub const INGEST_IMPORTS_FAILED_TOTAL: &str = "vulntriage_ingest_imports_failed_total";

/// Ingest: 임포트 소요 시간 (histogram, 초)
pub const INGEST_IMPORT_DURATION_SECONDS: &str = "vulntriage_ingest_import_duration_seconds";

// --- Store 메트릭 ---

/// Store: 현재 데이터셋 수 (gauge)
pub const STORE_DATASETS: &str = "vulntriage_store_datasets";

/// Store: 현재 레코드 수 (gauge)
pub const STORE_RECORDS: &str = "vulntriage_store_records";

/// Store: 수락된 전문가 평가 수 (counter)
pub const STORE_ASSESSMENTS_APPLIED_TOTAL: &str = "vulntriage_store_assessments_applied_total";

/// Store: 거부된 전문가 평가 수 (counter)
pub const STORE_ASSESSMENTS_REJECTED_TOTAL: &str = "vulntriage_store_assessments_rejected_total";

// --- 히스토그램 버킷 정의 ---

/// 임포트 소요 시간 히스토그램 버킷 (초)
///
/// 10ms ~ 120s 범위 (대용량 스캔 파일의 디스크 I/O 포함)
pub const IMPORT_DURATION_BUCKETS: [f64; 9] = [0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 60.0, 120.0];

// --- 설명 등록 함수 ---

/// 모든 메트릭의 설명(description)을 등록합니다.
///
/// 전역 레코더 설치 후 한 번만 호출해야 합니다.
pub fn describe_all() {
    use metrics::{describe_counter, describe_gauge, describe_histogram};

    // Ingest
    describe_counter!(
        INGEST_ROWS_READ_TOTAL,
        "Total number of raw rows read from all imported files"
    );
    describe_counter!(
        INGEST_ROWS_SKIPPED_TOTAL,
        "Total number of rows skipped due to row-level errors"
    );
    describe_counter!(
        INGEST_RECORDS_COMMITTED_TOTAL,
        "Total number of normalized records committed to the store"
    );
    describe_counter!(
        INGEST_IMPORTS_COMPLETED_TOTAL,
        "Total number of successfully completed imports"
    );
    describe_counter!(
        INGEST_IMPORTS_FAILED_TOTAL,
        "Total number of imports that failed without committing"
    );
    describe_histogram!(
        INGEST_IMPORT_DURATION_SECONDS,
        "Time to complete a single import in seconds"
    );

    // Store
    describe_gauge!(STORE_DATASETS, "Number of datasets currently stored");
    describe_gauge!(STORE_RECORDS, "Number of vulnerability records currently stored");
    describe_counter!(
        STORE_ASSESSMENTS_APPLIED_TOTAL,
        "Total number of accepted expert assessment updates"
    );
    describe_counter!(
        STORE_ASSESSMENTS_REJECTED_TOTAL,
        "Total number of rejected expert assessment updates"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_METRIC_NAMES: &[&str] = &[
        INGEST_ROWS_READ_TOTAL,
        INGEST_ROWS_SKIPPED_TOTAL,
        INGEST_RECORDS_COMMITTED_TOTAL,
        INGEST_IMPORTS_COMPLETED_TOTAL,
        INGEST_IMPORTS_FAILED_TOTAL,
        INGEST_IMPORT_DURATION_SECONDS,
        STORE_DATASETS,
        STORE_RECORDS,
        STORE_ASSESSMENTS_APPLIED_TOTAL,
        STORE_ASSESSMENTS_REJECTED_TOTAL,
    ];

    #[test]
    fn all_metrics_start_with_vulntriage_prefix() {
        for name in ALL_METRIC_NAMES {
            assert!(
                name.starts_with("vulntriage_"),
                "Metric '{}' does not start with 'vulntriage_' prefix",
                name
            );
        }
    }

    #[test]
    fn describe_all_does_not_panic() {
        // describe_all() should not panic even without a recorder installed
        describe_all();
    }

    #[test]
    fn label_keys_are_lowercase() {
        let labels = [LABEL_SEVERITY, LABEL_FORMAT, LABEL_RESULT];
        for label in &labels {
            assert_eq!(
                label.to_lowercase(),
                *label,
                "Label key '{}' should be lowercase",
                label
            );
        }
    }

    #[test]
    fn import_duration_buckets_are_sorted() {
        let buckets = IMPORT_DURATION_BUCKETS;
        for i in 1..buckets.len() {
            assert!(
                buckets[i] > buckets[i - 1],
                "Bucket values must be in ascending order"
            );
        }
    }
}
