//! 임포트 도메인 타입 — 원시 행 표현과 입력 형식
//!
//! 포맷 어댑터는 도메인 의미를 모른 채 파일을 [`RawRow`] 시퀀스로
//! 바꿉니다. 컬럼 별칭 해석과 타입 강제는 정규화기의 몫입니다.

use std::fmt;

use serde::{Deserialize, Serialize};

use vulntriage_core::types::RowError;

/// 지원되는 입력 형식
///
/// 판별은 파일 확장자로만 수행합니다 — 내용 추측(sniffing)은 하지 않습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceFormat {
    /// 구분자 텍스트 (.csv)
    Delimited,
    /// 스프레드시트 (.xlsx)
    Spreadsheet,
    /// VEX 계열 구조화 JSON (.json)
    VexJson,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delimited => write!(f, "delimited"),
            Self::Spreadsheet => write!(f, "spreadsheet"),
            Self::VexJson => write!(f, "vex-json"),
        }
    }
}

/// 원시 행 — 소스 컬럼명에서 미해석 값으로의 순서 있는 매핑
///
/// 값은 전부 텍스트입니다. 숫자 강제와 어휘 매핑은 정규화 단계에서
/// 수행됩니다.
#[derive(Debug, Clone)]
pub struct RawRow {
    /// 1부터 시작하는 데이터 행 번호 (헤더 행 제외)
    pub index: u64,
    /// (소스 컬럼명, 원시 값) 쌍 — 소스 파일 내 등장 순서
    pub fields: Vec<(String, String)>,
}

/// 어댑터가 반환하는 행 스트림
///
/// 행 단위 실패는 스트림을 중단하지 않고 `Err` 항목으로 흘러갑니다.
pub type RawRowIter = Box<dyn Iterator<Item = Result<RawRow, RowError>> + Send>;
