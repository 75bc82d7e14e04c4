//! 런타임 설정 스키마와 병합 규칙.

use serde::{Deserialize, Serialize};

use crate::domain::backend::{Backend, BackendOptions, BackendSelector};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RuntimeConfig {
    /// 백엔드 이름(current_thread/multi_thread)
    pub backend: Option<String>,
    /// 백엔드 옵션(키 단위 병합)
    #[serde(default)]
    pub options: BackendOptions,
}

impl RuntimeConfig {
    /// 후순위(나중 파일) 값으로 덮어쓰는 병합 규칙.
    pub(crate) fn merge_from(&mut self, other: RuntimeConfig) {
        if other.backend.is_some() {
            self.backend = other.backend;
        }
        self.options.merge_from(other.options);
    }

    /// 백엔드가 비어 있으면 기본 백엔드를 사용한다.
    pub fn into_selector(self) -> BackendSelector {
        let backend = self
            .backend
            .unwrap_or_else(|| Backend::default().name().to_string());
        BackendSelector::new(backend, self.options)
    }
}
