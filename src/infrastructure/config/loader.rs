//! 런타임 설정 파일 탐색/병합 로더.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use super::types::RuntimeConfig;

#[derive(Debug, Clone)]
pub(crate) struct LoadedConfig {
    pub config: RuntimeConfig,
    pub loaded_paths: Vec<PathBuf>,
}

/// 앱 이름 기준 경로를 순회해 JSON 설정을 병합하고 환경변수 백엔드를 덮어쓴다.
pub(crate) fn load_merged_config(app: &str) -> Result<LoadedConfig> {
    let mut loaded = load_from_paths(&config_paths(app))?;

    if let Ok(backend) = env::var(env_key(app, "BACKEND"))
        && !backend.trim().is_empty()
    {
        loaded.config.backend = Some(backend.trim().to_string());
    }

    Ok(loaded)
}

/// 낮은 우선순위 -> 높은 우선순위 순서로 병합한다. 없는 파일은 건너뛴다.
pub(crate) fn load_from_paths(paths: &[PathBuf]) -> Result<LoadedConfig> {
    let mut merged = RuntimeConfig::default();
    let mut loaded_paths = Vec::new();

    for path in paths {
        if !path.exists() {
            continue;
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config at {}", path.display()))?;
        let parsed: RuntimeConfig = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse JSON in {}", path.display()))?;
        merged.merge_from(parsed);
        loaded_paths.push(path.to_path_buf());
    }

    debug!(loaded = loaded_paths.len(), "runtime config merged");
    Ok(LoadedConfig {
        config: merged,
        loaded_paths,
    })
}

/// 사용자 + 프로젝트 + 명시 경로 순으로 병합 경로를 구성한다.
pub fn config_paths(app: &str) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Some(base) = dirs::config_dir() {
        paths.push(base.join(app).join("runtime.json"));
    }

    paths.push(PathBuf::from(format!(".{app}")).join("runtime.json"));

    if let Ok(path) = env::var(env_key(app, "RUNTIME_CONFIG")) {
        paths.push(Path::new(&path).to_path_buf());
    }

    dedup_paths(paths)
}

/// `my-app` + `BACKEND` -> `MY_APP_BACKEND`
pub(crate) fn env_key(app: &str, suffix: &str) -> String {
    let prefix: String = app
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("{prefix}_{suffix}")
}

fn dedup_paths(paths: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for p in paths {
        if !out.contains(&p) {
            out.push(p);
        }
    }
    out
}
