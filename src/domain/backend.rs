//! 런타임 백엔드 식별자와 백엔드 옵션 값 객체.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::error::RunError;

/// 실행 가능한 tokio 런타임 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Backend {
    /// 호출 스레드 하나에서 태스크를 협력적으로 스케줄링한다.
    #[default]
    CurrentThread,
    /// 워커 스레드 풀에서 work-stealing 방식으로 스케줄링한다.
    MultiThread,
}

impl Backend {
    pub const ALL: [Backend; 2] = [Backend::CurrentThread, Backend::MultiThread];

    pub fn name(self) -> &'static str {
        match self {
            Self::CurrentThread => "current_thread",
            Self::MultiThread => "multi_thread",
        }
    }

    /// 인식 가능한 백엔드 이름 목록(오류 메시지용).
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|b| b.name()).collect()
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = RunError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "current_thread" => Ok(Self::CurrentThread),
            "multi_thread" => Ok(Self::MultiThread),
            _ => Err(RunError::BackendNotFound {
                name: s.to_string(),
            }),
        }
    }
}

/// 백엔드별 설정 키/값 묶음.
/// 키의 의미는 백엔드가 정하며 여기서는 검증하지 않는다.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct BackendOptions(BTreeMap<String, Value>);

impl BackendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// 키/값을 추가한 새 옵션을 반환한다.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// 후순위 값으로 키 단위 덮어쓰기.
    pub(crate) fn merge_from(&mut self, other: BackendOptions) {
        self.0.extend(other.0);
    }
}

impl<K, V> FromIterator<(K, V)> for BackendOptions
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// 등록 시점에 고정되는 백엔드 이름 + 옵션.
/// 이름은 첫 호출 시점에야 검증된다.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BackendSelector {
    backend: String,
    #[serde(default)]
    options: BackendOptions,
}

impl Default for BackendSelector {
    fn default() -> Self {
        Self::from(Backend::default())
    }
}

impl BackendSelector {
    pub fn new(backend: impl Into<String>, options: BackendOptions) -> Self {
        Self {
            backend: backend.into(),
            options,
        }
    }

    pub fn backend(&self) -> &str {
        &self.backend
    }

    pub fn options(&self) -> &BackendOptions {
        &self.options
    }
}

impl From<Backend> for BackendSelector {
    fn from(backend: Backend) -> Self {
        Self::new(backend.name(), BackendOptions::new())
    }
}

impl From<&str> for BackendSelector {
    fn from(backend: &str) -> Self {
        Self::new(backend, BackendOptions::new())
    }
}

impl From<String> for BackendSelector {
    fn from(backend: String) -> Self {
        Self::new(backend, BackendOptions::new())
    }
}

impl<S: Into<String>> From<(S, BackendOptions)> for BackendSelector {
    fn from((backend, options): (S, BackendOptions)) -> Self {
        Self::new(backend, options)
    }
}
