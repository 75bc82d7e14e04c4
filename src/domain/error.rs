//! 라이브러리 자체 오류 타입.
//! 핸들러 오류는 여기로 감싸지 않고 그대로 전달된다.

use thiserror::Error;

use crate::domain::backend::Backend;

/// 런타임 생성/실행 단계에서 발생하는 조건.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("cannot start a new runtime: a {running} runtime is already running on this thread")]
    LoopAlreadyRunning { running: &'static str },

    #[error("backend not found: '{name}' (expected one of: {})", Backend::names().join(", "))]
    BackendNotFound { name: String },

    #[error("backend '{backend}' does not support option '{key}'")]
    UnsupportedOption { backend: &'static str, key: String },

    #[error("invalid value for backend option '{key}': expected {expected}")]
    InvalidOptionValue { key: String, expected: &'static str },

    #[error("failed to build runtime")]
    Build(#[source] std::io::Error),
}

/// 명령 등록/디스패치 구성 오류.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("could not get a command for this app: no command or callback registered")]
    NoCommands,

    #[error("no handler registered for command '{name}'")]
    UnknownCommand { name: String },
}
