//! 구분자 텍스트(.csv) 어댑터
//!
//! [`DelimitedAdapter`]는 `csv` 크레이트의 유연한 리더로 파일을 읽습니다.
//! 스캐너 내보내기는 구분자가 제각각이라(콤마, 세미콜론, 탭) 헤더 행에서
//! 구분자를 추정합니다. 행은 디스크에서 스트리밍되며 파일 전체를
//! 메모리에 올리지 않습니다.
//!
//! 헤더와 필드 수가 다른 행(jagged row)과 리더 에러는 행 단위 에러로
//! 흘러가고 파일 전체를 중단하지 않습니다.

use std::io::BufRead;
use std::path::Path;

use vulntriage_core::types::RowError;

use crate::adapter::{FormatAdapter, has_extension};
use crate::error::IngestError;
use crate::types::{RawRow, RawRowIter, SourceFormat};

/// 구분자 텍스트 어댑터
pub struct DelimitedAdapter;

impl FormatAdapter for DelimitedAdapter {
    fn format(&self) -> SourceFormat {
        SourceFormat::Delimited
    }

    fn can_read(&self, path: &Path) -> bool {
        has_extension(path, "csv")
    }

    fn read_rows(&self, path: &Path) -> Result<RawRowIter, IngestError> {
        let delimiter = sniff_delimiter_from_file(path)?;

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .delimiter(delimiter)
            .from_path(path)
            .map_err(|e| IngestError::UnreadableFile {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| IngestError::UnreadableFile {
                path: path.display().to_string(),
                reason: format!("cannot read header row: {e}"),
            })?
            .iter()
            .map(|h| h.trim().to_owned())
            .collect();
        let expected_fields = headers.len();

        let rows = reader.into_records().enumerate().map(move |(i, result)| {
            let index = i as u64 + 1;
            match result {
                Ok(record) => {
                    if record.len() != expected_fields {
                        return Err(RowError {
                            row: index,
                            reason: format!(
                                "expected {expected_fields} fields, found {}",
                                record.len()
                            ),
                        });
                    }
                    let fields = headers
                        .iter()
                        .cloned()
                        .zip(record.iter().map(str::to_owned))
                        .collect();
                    Ok(RawRow { index, fields })
                }
                Err(e) => Err(RowError {
                    row: index,
                    reason: format!("malformed row: {e}"),
                }),
            }
        });

        Ok(Box::new(rows))
    }
}

/// 헤더 행에서 구분자를 추정합니다.
///
/// 세미콜론, 탭, 콤마 중 가장 많이 등장하는 문자를 선택하고,
/// 모두 없으면 콤마를 사용합니다.
fn sniff_delimiter(header_line: &str) -> u8 {
    let candidates = [b';', b'\t', b','];
    candidates
        .into_iter()
        .map(|d| (d, header_line.bytes().filter(|b| *b == d).count()))
        .max_by_key(|(_, count)| *count)
        .filter(|(_, count)| *count > 0)
        .map(|(d, _)| d)
        .unwrap_or(b',')
}

fn sniff_delimiter_from_file(path: &Path) -> Result<u8, IngestError> {
    let file = std::fs::File::open(path).map_err(|e| IngestError::UnreadableFile {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let mut header_line = String::new();
    std::io::BufReader::new(file)
        .read_line(&mut header_line)
        .map_err(|e| IngestError::UnreadableFile {
            path: path.display().to_string(),
            reason: format!("cannot read header line: {e}"),
        })?;
    Ok(sniff_delimiter(&header_line))
}
