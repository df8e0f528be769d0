//! 스프레드시트(.xlsx) 어댑터
//!
//! [`SpreadsheetAdapter`]는 `calamine`으로 워크북의 첫 번째 시트를 읽어
//! 첫 행을 헤더로 사용합니다. 셀 값은 전부 텍스트로 렌더링됩니다 —
//! 타입 강제는 정규화기의 몫입니다.
//!
//! 컨테이너 형식 특성상 시트 범위는 디코딩 후 메모리에 존재합니다.
//! 행 반복은 디코딩된 범위 위에서 수행되며, 입력 파일 크기는
//! 임포터의 사전 크기 검사로 제한됩니다.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};

use vulntriage_core::types::RowError;

use crate::adapter::{FormatAdapter, has_extension};
use crate::error::IngestError;
use crate::types::{RawRow, RawRowIter, SourceFormat};

/// 스프레드시트 어댑터
pub struct SpreadsheetAdapter;

impl FormatAdapter for SpreadsheetAdapter {
    fn format(&self) -> SourceFormat {
        SourceFormat::Spreadsheet
    }

    fn can_read(&self, path: &Path) -> bool {
        has_extension(path, "xlsx")
    }

    fn read_rows(&self, path: &Path) -> Result<RawRowIter, IngestError> {
        let unreadable = |reason: String| IngestError::UnreadableFile {
            path: path.display().to_string(),
            reason,
        };

        let mut workbook = open_workbook_auto(path).map_err(|e| unreadable(e.to_string()))?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| unreadable("workbook contains no worksheets".to_owned()))?
            .map_err(|e| unreadable(e.to_string()))?;

        let mut sheet_rows = range.rows();
        let Some(header_row) = sheet_rows.next() else {
            return Ok(Box::new(std::iter::empty()));
        };
        let headers: Vec<String> = header_row.iter().map(cell_to_string).collect();

        let mut rows: Vec<Result<RawRow, RowError>> = Vec::new();
        for (i, sheet_row) in sheet_rows.enumerate() {
            let index = i as u64 + 1;

            // 완전히 빈 행은 조용히 건너뜀 (스프레드시트 끝의 빈 줄 등)
            if sheet_row.iter().all(|cell| matches!(cell, Data::Empty)) {
                continue;
            }

            let fields = headers
                .iter()
                .cloned()
                .zip(sheet_row.iter().map(cell_to_string))
                .collect();
            rows.push(Ok(RawRow { index, fields }));
        }

        Ok(Box::new(rows.into_iter()))
    }
}

/// 셀 값을 텍스트로 렌더링합니다.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_owned(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
