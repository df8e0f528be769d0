//! VEX 계열 JSON(.json) 어댑터
//!
//! [`VexJsonAdapter`]는 구조화 JSON 내보내기를 관대하게 읽습니다.
//! 허용 형태:
//!
//! - 최상위 statement 객체 배열
//! - `statements` 또는 `vulnerabilities` 배열을 가진 최상위 객체 (OpenVEX 류)
//!
//! 각 statement는 점(.) 경로로 평탄화되어 원시 행이 됩니다.
//! 예: `{"vulnerability": {"name": "CVE-..."}}` →
//! `("vulnerability.name", "CVE-...")`. 배열은 첫 요소만 따라갑니다.
//! 컬럼 별칭 해석은 정규화기가 담당합니다.
//!
//! 객체가 아닌 statement는 행 단위 에러로 흘러가고, 파일 자체가
//! JSON이 아니면 `UnreadableFile`로 실패합니다.

use std::path::Path;

use serde_json::Value;

use vulntriage_core::types::RowError;

use crate::adapter::{FormatAdapter, has_extension};
use crate::error::IngestError;
use crate::types::{RawRow, RawRowIter, SourceFormat};

/// 평탄화 최대 깊이 — 악의적으로 깊은 중첩 방어
const MAX_FLATTEN_DEPTH: usize = 8;

/// VEX 계열 JSON 어댑터
pub struct VexJsonAdapter;

impl FormatAdapter for VexJsonAdapter {
    fn format(&self) -> SourceFormat {
        SourceFormat::VexJson
    }

    fn can_read(&self, path: &Path) -> bool {
        has_extension(path, "json")
    }

    fn read_rows(&self, path: &Path) -> Result<RawRowIter, IngestError> {
        let unreadable = |reason: String| IngestError::UnreadableFile {
            path: path.display().to_string(),
            reason,
        };

        let content =
            std::fs::read_to_string(path).map_err(|e| unreadable(e.to_string()))?;
        let document: Value = serde_json::from_str(&content)
            .map_err(|e| unreadable(format!("invalid JSON: {e}")))?;

        let statements = extract_statements(document)
            .map_err(unreadable)?;

        let rows = statements.into_iter().enumerate().map(|(i, statement)| {
            let index = i as u64 + 1;
            if !statement.is_object() {
                return Err(RowError {
                    row: index,
                    reason: "statement is not a JSON object".to_owned(),
                });
            }
            let mut fields = Vec::new();
            flatten("", &statement, 0, &mut fields);
            Ok(RawRow { index, fields })
        });

        Ok(Box::new(rows))
    }
}

/// 문서에서 statement 배열을 추출합니다.
fn extract_statements(document: Value) -> Result<Vec<Value>, String> {
    match document {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => {
            for key in ["statements", "vulnerabilities"] {
                if let Some(Value::Array(items)) = map.remove(key) {
                    return Ok(items);
                }
            }
            Err("no 'statements' or 'vulnerabilities' array found".to_owned())
        }
        _ => Err("top-level JSON must be an array or object".to_owned()),
    }
}

/// JSON 값을 점(.) 경로의 (키, 텍스트 값) 쌍으로 평탄화합니다.
///
/// 배열은 첫 요소만 따라가고, null은 건너뜁니다.
fn flatten(prefix: &str, value: &Value, depth: usize, out: &mut Vec<(String, String)>) {
    if depth > MAX_FLATTEN_DEPTH {
        return;
    }
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };
                flatten(&path, child, depth + 1, out);
            }
        }
        Value::Array(items) => {
            if let Some(first) = items.first() {
                flatten(prefix, first, depth + 1, out);
            }
        }
        Value::String(s) => out.push((prefix.to_owned(), s.clone())),
        Value::Number(n) => out.push((prefix.to_owned(), n.to_string())),
        Value::Bool(b) => out.push((prefix.to_owned(), b.to_string())),
        Value::Null => {}
    }
}
