//! 포맷 어댑터 — 입력 파일을 원시 행 스트림으로 변환
//!
//! [`FormatAdapter`] trait은 각 입력 형식의 어댑터가 구현해야 하는
//! 인터페이스입니다. 어댑터는 도메인 의미를 모른 채 파일을
//! (컬럼명 → 원시 값) 행의 순서 있는 시퀀스로 바꿉니다.
//!
//! # 지원 형식
//!
//! - `.csv` (구분자 텍스트) -- [`DelimitedAdapter`]
//! - `.xlsx` (스프레드시트) -- [`SpreadsheetAdapter`]
//! - `.json` (VEX 계열 구조화 JSON) -- [`VexJsonAdapter`]
//!
//! # 판별 정책
//!
//! 파일 확장자로만 판별합니다. 확장자가 없거나 모호하면 내용을 추측하지
//! 않고 `UnsupportedFormat`으로 실패합니다.
//!
//! # 확장
//!
//! 새로운 형식을 지원하려면 `FormatAdapter` trait을 구현하고
//! [`crate::importer::ImporterBuilder::register_adapter`]로 등록합니다.
//! 정규화기 내부에 형식 분기를 추가하지 않습니다.

pub mod delimited;
pub mod spreadsheet;
pub mod vex;

use std::path::Path;

use crate::error::IngestError;
use crate::types::{RawRowIter, SourceFormat};

pub use delimited::DelimitedAdapter;
pub use spreadsheet::SpreadsheetAdapter;
pub use vex::VexJsonAdapter;

/// 포맷 어댑터 trait
///
/// 행 단위 실패(깨진 구분자, 불량 JSON 조각)는 스트림의 `Err` 항목으로
/// 흘려보내고, 파일 자체를 열거나 디코딩할 수 없을 때만
/// [`IngestError`]로 실패합니다.
pub trait FormatAdapter: Send + Sync {
    /// 이 어댑터가 담당하는 입력 형식을 반환합니다.
    fn format(&self) -> SourceFormat;

    /// 주어진 경로의 파일을 이 어댑터가 처리할 수 있는지 확인합니다.
    ///
    /// 파일 확장자로 판별합니다 (예: ".csv", ".xlsx").
    fn can_read(&self, path: &Path) -> bool;

    /// 파일을 열어 원시 행 스트림을 반환합니다.
    fn read_rows(&self, path: &Path) -> Result<RawRowIter, IngestError>;
}

/// 파일 확장자로 입력 형식을 판별합니다.
///
/// 모르는 확장자나 확장자 없음은 내용 추측 없이 `UnsupportedFormat`입니다.
pub fn detect_format(path: &Path) -> Result<SourceFormat, IngestError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("csv") => Ok(SourceFormat::Delimited),
        Some("xlsx") => Ok(SourceFormat::Spreadsheet),
        Some("json") => Ok(SourceFormat::VexJson),
        Some(other) => Err(IngestError::UnsupportedFormat {
            extension: other.to_owned(),
        }),
        None => Err(IngestError::UnsupportedFormat {
            extension: "(none)".to_owned(),
        }),
    }
}

/// 기본 어댑터 목록을 생성합니다.
pub fn default_adapters() -> Vec<Box<dyn FormatAdapter>> {
    vec![
        Box::new(DelimitedAdapter),
        Box::new(SpreadsheetAdapter),
        Box::new(VexJsonAdapter),
    ]
}

/// 확장자 비교 헬퍼 (대소문자 무시)
pub(crate) fn has_extension(path: &Path, expected: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(expected))
}
