//! 런타임 백엔드 설정(JSON) 로딩/병합 모듈.
//! 앱 작성자가 원할 때만 읽으며, 결과 선택자는 등록 시점에 고정된다.

mod loader;
mod types;

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::domain::backend::BackendSelector;

pub use loader::config_paths;
pub use types::RuntimeConfig;

/// 병합된 설정 파일과 `<APP>_BACKEND` 환경변수로 백엔드 선택자를 만든다.
pub fn load_selector(app: &str) -> Result<BackendSelector> {
    Ok(loader::load_merged_config(app)?.config.into_selector())
}

/// 진단 출력용 병합 결과.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigInspection {
    pub searched_paths: Vec<PathBuf>,
    pub loaded_paths: Vec<PathBuf>,
    pub effective: BackendSelector,
}

/// 설정 진단 결과를 사람이 읽기 쉬운 JSON으로 반환한다.
pub fn inspect_pretty_json(app: &str) -> Result<String> {
    let loaded = loader::load_merged_config(app)?;
    let inspection = ConfigInspection {
        searched_paths: config_paths(app),
        loaded_paths: loaded.loaded_paths,
        effective: loaded.config.into_selector(),
    };
    Ok(serde_json::to_string_pretty(&inspection)?)
}
