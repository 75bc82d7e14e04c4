//! 백엔드 옵션 맵을 tokio 런타임 빌더 설정으로 해석한다.

use std::time::Duration;

use serde_json::Value;
use tokio::runtime::Builder;

use crate::domain::backend::{Backend, BackendOptions};
use crate::domain::error::RunError;

/// 해석이 끝난 런타임 설정.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RuntimeOptions {
    pub enable_io: bool,
    pub enable_time: bool,
    pub thread_name: Option<String>,
    pub thread_stack_size: Option<usize>,
    pub max_blocking_threads: Option<usize>,
    pub event_interval: Option<u32>,
    pub global_queue_interval: Option<u32>,
    pub worker_threads: Option<usize>,
    pub shutdown_timeout: Option<Duration>,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            enable_io: true,
            enable_time: true,
            thread_name: None,
            thread_stack_size: None,
            max_blocking_threads: None,
            event_interval: None,
            global_queue_interval: None,
            worker_threads: None,
            shutdown_timeout: None,
        }
    }
}

impl RuntimeOptions {
    /// 백엔드가 지원하지 않는 키나 잘못된 값은 즉시 오류로 돌려준다.
    pub fn parse(backend: Backend, options: &BackendOptions) -> Result<Self, RunError> {
        let mut out = Self::default();

        for (key, value) in options.iter() {
            match key {
                "enable_io" => out.enable_io = bool_value(key, value)?,
                "enable_time" => out.enable_time = bool_value(key, value)?,
                "thread_name" => out.thread_name = Some(string_value(key, value)?),
                "thread_stack_size" => out.thread_stack_size = Some(positive_usize(key, value)?),
                "max_blocking_threads" => {
                    out.max_blocking_threads = Some(positive_usize(key, value)?)
                }
                "event_interval" => out.event_interval = Some(positive_u32(key, value)?),
                "global_queue_interval" => {
                    out.global_queue_interval = Some(positive_u32(key, value)?)
                }
                "shutdown_timeout_ms" => {
                    let ms = value.as_u64().ok_or_else(|| invalid(key, "a non-negative integer"))?;
                    out.shutdown_timeout = Some(Duration::from_millis(ms));
                }
                "worker_threads" if backend == Backend::MultiThread => {
                    out.worker_threads = Some(positive_usize(key, value)?)
                }
                _ => {
                    return Err(RunError::UnsupportedOption {
                        backend: backend.name(),
                        key: key.to_string(),
                    });
                }
            }
        }

        Ok(out)
    }

    pub fn builder(&self, backend: Backend) -> Builder {
        let mut builder = match backend {
            Backend::CurrentThread => Builder::new_current_thread(),
            Backend::MultiThread => Builder::new_multi_thread(),
        };

        if self.enable_io {
            builder.enable_io();
        }
        if self.enable_time {
            builder.enable_time();
        }
        if let Some(name) = &self.thread_name {
            builder.thread_name(name.clone());
        }
        if let Some(size) = self.thread_stack_size {
            builder.thread_stack_size(size);
        }
        if let Some(max) = self.max_blocking_threads {
            builder.max_blocking_threads(max);
        }
        if let Some(interval) = self.event_interval {
            builder.event_interval(interval);
        }
        if let Some(interval) = self.global_queue_interval {
            builder.global_queue_interval(interval);
        }
        if let Some(workers) = self.worker_threads {
            builder.worker_threads(workers);
        }

        builder
    }
}

fn invalid(key: &str, expected: &'static str) -> RunError {
    RunError::InvalidOptionValue {
        key: key.to_string(),
        expected,
    }
}

fn bool_value(key: &str, value: &Value) -> Result<bool, RunError> {
    value.as_bool().ok_or_else(|| invalid(key, "a boolean"))
}

fn string_value(key: &str, value: &Value) -> Result<String, RunError> {
    value
        .as_str()
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| invalid(key, "a non-empty string"))
}

// tokio 빌더는 0을 받으면 panic 하므로 여기서 걸러낸다.
fn positive_usize(key: &str, value: &Value) -> Result<usize, RunError> {
    value
        .as_u64()
        .filter(|n| *n > 0)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(|| invalid(key, "a positive integer"))
}

fn positive_u32(key: &str, value: &Value) -> Result<u32, RunError> {
    value
        .as_u64()
        .filter(|n| *n > 0)
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| invalid(key, "a positive 32-bit integer"))
}
