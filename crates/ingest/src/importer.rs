//! 임포트 오케스트레이터 — 전체 임포트 흐름 관리
//!
//! [`Importer`]는 형식 판별, 행 읽기, 정규화, 배치 커밋의 전체 흐름을
//! 관리합니다.
//!
//! # 내부 아키텍처
//!
//! ```text
//! file path --> detect_format --> FormatAdapter --> RawRow stream
//!                                                       |
//!                                                   Normalizer
//!                                                       |
//!                                  +--------------------+-------------------+
//!                                  |                                        |
//!                          NormalizedRecord[]                       RowError[] (집계)
//!                                  |
//!                       DatasetStore::commit_import (all-or-nothing)
//!                                  |
//!                            ImportSummary
//!                                  |
//!                         ImportEvent --> mpsc --> downstream
//! ```
//!
//! # 동시성
//!
//! 파싱과 정규화는 `spawn_blocking`에서 수행되어 비동기 호출자를 막지
//! 않습니다. 서로 다른 파일의 동시 임포트는 안전합니다 — 식별자는
//! UUID라 충돌하지 않고, 커밋은 스토어의 쓰기 가드로 직렬화됩니다.
//! 이미 커밋된 데이터셋에 대한 읽기/평가 경로는 파싱 중에도 막히지
//! 않습니다.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tracing::{info, warn};

use vulntriage_core::metrics as m;
use vulntriage_core::types::{ImportSummary, NormalizedRecord, RowError, Severity};
use vulntriage_store::DatasetStore;

use crate::adapter::{self, FormatAdapter};
use crate::config::ImporterConfig;
use crate::error::IngestError;
use crate::event::ImportEvent;
use crate::normalize::Normalizer;

/// 임포트 오케스트레이터
///
/// [`ImporterBuilder`]로 생성합니다. 임의 개수의 동시 `ingest` 호출에
/// 안전하게 공유할 수 있습니다 (`&self` 메서드만 노출).
pub struct Importer {
    /// 임포터 설정
    config: ImporterConfig,
    /// 등록된 포맷 어댑터 (blocking 태스크와 공유)
    adapters: Arc<Vec<Box<dyn FormatAdapter>>>,
    /// 스키마 정규화기
    normalizer: Normalizer,
    /// 커밋 대상 스토어
    store: Arc<DatasetStore>,
    /// 임포트 완료 이벤트 전송 채널
    import_tx: mpsc::Sender<ImportEvent>,
    /// 완료된 임포트 수
    imports_completed: AtomicU64,
    /// 커밋된 레코드 누계
    records_imported: AtomicU64,
}

/// 행 읽기 단계의 안전 한도
struct RowLimits {
    max_row_errors: usize,
    max_records: usize,
}

/// 행 읽기 + 정규화 단계의 결과
struct ParseOutcome {
    records: Vec<NormalizedRecord>,
    row_errors: Vec<RowError>,
    rows_read: u64,
    unknown_severity: usize,
}

impl Importer {
    /// 완료된 임포트 수를 반환합니다.
    pub fn imports_completed(&self) -> u64 {
        self.imports_completed.load(Ordering::Relaxed)
    }

    /// 커밋된 레코드 누계를 반환합니다.
    pub fn records_imported(&self) -> u64 {
        self.records_imported.load(Ordering::Relaxed)
    }

    /// 파일 하나를 임포트하여 새 데이터셋으로 커밋합니다.
    ///
    /// 행 단위 에러는 임포트를 중단하지 않고 요약에 집계됩니다.
    /// 파일 수준 실패(미지원 형식, 읽기 불가, 한도 초과)는 커밋 없이
    /// 에러로 반환되며 부분 상태를 남기지 않습니다.
    pub async fn ingest(&self, path: impl AsRef<Path>) -> Result<ImportSummary, IngestError> {
        let path = path.as_ref();
        let started = std::time::Instant::now();

        match self.ingest_inner(path).await {
            Ok(summary) => {
                metrics::counter!(m::INGEST_IMPORTS_COMPLETED_TOTAL).increment(1);
                metrics::histogram!(m::INGEST_IMPORT_DURATION_SECONDS)
                    .record(started.elapsed().as_secs_f64());
                Ok(summary)
            }
            Err(e) => {
                metrics::counter!(m::INGEST_IMPORTS_FAILED_TOTAL).increment(1);
                Err(e)
            }
        }
    }

    async fn ingest_inner(&self, path: &Path) -> Result<ImportSummary, IngestError> {
        // 확장자 기반 형식 판별 — 내용 추측 없음
        let format = adapter::detect_format(path)?;

        // 사전 크기 검사
        let metadata =
            tokio::fs::metadata(path)
                .await
                .map_err(|e| IngestError::UnreadableFile {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
        if !metadata.is_file() {
            return Err(IngestError::UnreadableFile {
                path: path.display().to_string(),
                reason: "not a regular file".to_owned(),
            });
        }
        if metadata.len() > self.config.max_file_size {
            return Err(IngestError::FileTooBig {
                path: path.display().to_string(),
                size: metadata.len(),
                max: self.config.max_file_size,
            });
        }

        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("unknown")
            .to_owned();

        info!(path = %path.display(), format = %format, "starting import");

        // 행 읽기 + 정규화 (blocking I/O)
        let outcome = {
            let path = path.to_path_buf();
            let adapters = Arc::clone(&self.adapters);
            let normalizer = self.normalizer.clone();
            let limits = RowLimits {
                max_row_errors: self.config.max_row_errors,
                max_records: self.config.max_records,
            };
            tokio::task::spawn_blocking(move || {
                read_and_normalize(&path, &adapters, &normalizer, &limits)
            })
            .await
            .map_err(|e| IngestError::Channel(format!("spawn_blocking failed: {e}")))??
        };

        metrics::counter!(m::INGEST_ROWS_READ_TOTAL).increment(outcome.rows_read);
        metrics::counter!(m::INGEST_ROWS_SKIPPED_TOTAL)
            .increment(outcome.row_errors.len() as u64);

        // 배치 커밋 — 전부 저장되거나 아무것도 저장되지 않음
        let dataset = self.store.commit_import(&file_name, outcome.records).await?;

        metrics::counter!(m::INGEST_RECORDS_COMMITTED_TOTAL)
            .increment(dataset.record_count as u64);
        self.imports_completed.fetch_add(1, Ordering::Relaxed);
        self.records_imported
            .fetch_add(dataset.record_count as u64, Ordering::Relaxed);

        let skipped_row_count = outcome.row_errors.len();
        let mut row_errors = outcome.row_errors;
        row_errors.truncate(self.config.report_row_errors);

        let summary = ImportSummary {
            dataset_id: dataset.id.clone(),
            file_name,
            record_count: dataset.record_count,
            skipped_row_count,
            unknown_severity_count: outcome.unknown_severity,
            row_errors,
        };

        let event = ImportEvent::new(summary.clone());
        if let Err(e) = self.import_tx.try_send(event) {
            warn!(
                dataset_id = %summary.dataset_id,
                error = %e,
                "failed to send import event (channel full or closed)"
            );
        }

        info!(
            dataset_id = %summary.dataset_id,
            records = summary.record_count,
            skipped = summary.skipped_row_count,
            unknown_severity = summary.unknown_severity_count,
            "import completed"
        );

        Ok(summary)
    }
}

/// 파일을 읽어 정규화합니다 (동기 I/O).
///
/// `tokio::task::spawn_blocking` 내에서 호출되어야 합니다.
/// 행 단위 에러를 누적하다 한도를 넘으면 전체 임포트를 중단합니다.
fn read_and_normalize(
    path: &Path,
    adapters: &[Box<dyn FormatAdapter>],
    normalizer: &Normalizer,
    limits: &RowLimits,
) -> Result<ParseOutcome, IngestError> {
    let adapter = adapters
        .iter()
        .find(|a| a.can_read(path))
        .ok_or_else(|| IngestError::UnsupportedFormat {
            extension: path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("(none)")
                .to_owned(),
        })?;

    let rows = adapter.read_rows(path)?;

    let mut records = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read: u64 = 0;
    let mut unknown_severity = 0usize;

    for item in rows {
        rows_read += 1;
        match item {
            Ok(raw) => match normalizer.normalize(&raw) {
                Ok(record) => {
                    if record.original.severity == Severity::Unknown {
                        unknown_severity += 1;
                    }
                    records.push(record);
                }
                Err(e) => row_errors.push(RowError {
                    row: raw.index,
                    reason: e.to_string(),
                }),
            },
            Err(row_error) => row_errors.push(row_error),
        }

        if row_errors.len() > limits.max_row_errors {
            return Err(IngestError::TooManyRowErrors {
                count: row_errors.len(),
                max: limits.max_row_errors,
            });
        }
        if records.len() > limits.max_records {
            return Err(IngestError::TooManyRecords {
                count: records.len(),
                max: limits.max_records,
            });
        }
    }

    Ok(ParseOutcome {
        records,
        row_errors,
        rows_read,
        unknown_severity,
    })
}

/// 임포터 빌더
///
/// 임포터를 구성하고 필요한 이벤트 채널을 생성합니다.
pub struct ImporterBuilder {
    config: ImporterConfig,
    store: Option<Arc<DatasetStore>>,
    extra_adapters: Vec<Box<dyn FormatAdapter>>,
    import_tx: Option<mpsc::Sender<ImportEvent>>,
    event_channel_capacity: usize,
}

impl ImporterBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self {
            config: ImporterConfig::default(),
            store: None,
            extra_adapters: Vec::new(),
            import_tx: None,
            event_channel_capacity: 64,
        }
    }

    /// 임포터 설정을 지정합니다.
    pub fn config(mut self, config: ImporterConfig) -> Self {
        self.config = config;
        self
    }

    /// 커밋 대상 스토어를 지정합니다 (필수).
    pub fn store(mut self, store: Arc<DatasetStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// 추가 포맷 어댑터를 등록합니다.
    ///
    /// 기본 어댑터(csv, xlsx, json)보다 먼저 검사되므로
    /// 기본 형식을 대체할 수도 있습니다.
    pub fn register_adapter(mut self, adapter: Box<dyn FormatAdapter>) -> Self {
        self.extra_adapters.push(adapter);
        self
    }

    /// 외부 이벤트 전송 채널을 설정합니다.
    ///
    /// 설정하지 않으면 빌더가 새 채널을 생성합니다.
    pub fn event_sender(mut self, tx: mpsc::Sender<ImportEvent>) -> Self {
        self.import_tx = Some(tx);
        self
    }

    /// 이벤트 채널 용량을 설정합니다 (외부 채널 미사용 시).
    pub fn event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity;
        self
    }

    /// 임포터를 빌드합니다.
    ///
    /// # Returns
    ///
    /// - `Importer`: 임포터 인스턴스
    /// - `Option<mpsc::Receiver<ImportEvent>>`: 이벤트 수신 채널
    ///   (외부 event_sender를 설정한 경우 None)
    pub fn build(self) -> Result<(Importer, Option<mpsc::Receiver<ImportEvent>>), IngestError> {
        self.config.validate()?;

        let store = self.store.ok_or_else(|| IngestError::Config {
            field: "store".to_owned(),
            reason: "a dataset store is required".to_owned(),
        })?;

        let (import_tx, import_rx) = if let Some(tx) = self.import_tx {
            (tx, None)
        } else {
            let (tx, rx) = mpsc::channel(self.event_channel_capacity);
            (tx, Some(rx))
        };

        let mut adapters = self.extra_adapters;
        adapters.extend(adapter::default_adapters());

        let importer = Importer {
            config: self.config,
            adapters: Arc::new(adapters),
            normalizer: Normalizer::new(),
            store,
            import_tx,
            imports_completed: AtomicU64::new(0),
            records_imported: AtomicU64::new(0),
        };

        Ok((importer, import_rx))
    }
}

impl Default for ImporterBuilder {
    fn default() -> Self {
        Self::new()
    }
}
