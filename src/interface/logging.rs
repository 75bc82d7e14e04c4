//! tracing 구독자 초기화.

use tracing_subscriber::EnvFilter;

/// `RUST_LOG`가 없으면 warn 레벨로 stderr에 기록한다. 이미 설치돼 있으면 무시한다.
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .try_init();
}
