//! 임포트 완료 이벤트
//!
//! [`ImportEvent`]는 배치 커밋이 완료되었을 때 생성되어 다운스트림
//! (표시 레이어, 대시보드 집계)에 전달됩니다. core의 [`Event`] trait을
//! 구현하여 `tokio::mpsc` 채널을 통한 전송이 가능합니다.

use std::fmt;

use vulntriage_core::event::{EVENT_TYPE_IMPORT, Event, EventMetadata, MODULE_INGEST};
use vulntriage_core::types::ImportSummary;

/// 임포트 완료 이벤트
///
/// `Send + Sync + 'static` 바운드를 만족하여 `tokio::mpsc` 전송이 가능합니다.
#[derive(Debug, Clone)]
pub struct ImportEvent {
    /// 이벤트 고유 ID
    pub id: String,
    /// 이벤트 메타데이터
    pub metadata: EventMetadata,
    /// 임포트 요약
    pub summary: ImportSummary,
}

impl ImportEvent {
    /// 새로운 trace를 시작하는 임포트 이벤트를 생성합니다.
    pub fn new(summary: ImportSummary) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            metadata: EventMetadata::with_new_trace(MODULE_INGEST),
            summary,
        }
    }

    /// 기존 trace에 연결된 임포트 이벤트를 생성합니다.
    pub fn with_trace(summary: ImportSummary, trace_id: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            metadata: EventMetadata::new(MODULE_INGEST, trace_id),
            summary,
        }
    }
}

impl Event for ImportEvent {
    fn event_id(&self) -> &str {
        &self.id
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    fn event_type(&self) -> &str {
        EVENT_TYPE_IMPORT
    }
}

impl fmt::Display for ImportEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ImportEvent[{}] file={} records={} skipped={}",
            &self.id[..8.min(self.id.len())],
            self.summary.file_name,
            self.summary.record_count,
            self.summary.skipped_row_count,
        )
    }
}
