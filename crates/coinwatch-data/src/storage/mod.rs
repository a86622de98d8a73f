//! 파일 기반 저장소.
//!
//! 모든 산출물은 날짜별 파일로 저장됩니다. 쓰기는 임시 파일에 기록한 뒤
//! 같은 디렉터리 안에서 rename하는 방식이라, 파이프라인 실행 중에 조회
//! 서버가 읽더라도 중간 상태의 파일을 관찰하지 않습니다.

pub mod artifacts;
pub mod records;

use crate::error::Result;
use std::fs;
use std::path::Path;

/// 임시 파일 기록 후 rename으로 원자적으로 씁니다.
///
/// 같은 날짜에 대한 재실행은 기존 파일을 덮어씁니다 (에러 아님).
pub(crate) fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

/// 파일을 문자열로 읽습니다. 파일이 없으면 `None`.
pub(crate) fn read_optional(path: &Path) -> Result<Option<String>> {
    match fs::read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err.into()),
    }
}
