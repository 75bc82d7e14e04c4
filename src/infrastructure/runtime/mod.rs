//! 블로킹 실행 진입점.
//! 호출마다 새 tokio 런타임을 만들고, 진입 future를 끝까지 구동한 뒤 정리한다.

mod options;

use std::cell::Cell;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};

use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::debug;

use crate::domain::backend::{Backend, BackendOptions};
use crate::domain::error::RunError;

use options::RuntimeOptions;

/// `entry`가 만든 future를 지정 백엔드의 새 런타임에서 완료될 때까지 실행한다.
///
/// - 호출 스레드가 이미 런타임을 구동 중이면 [`RunError::LoopAlreadyRunning`]
/// - 백엔드 이름을 모르면 [`RunError::BackendNotFound`]
///
/// 핸들만 잡혀 있는 스레드(`spawn_blocking` 풀, `Handle::enter`)는 구동 중이 아니므로 허용한다.
/// future의 출력은 가공 없이 그대로 돌려준다.
pub fn run<E, Fut>(entry: E, backend: &str, options: &BackendOptions) -> Result<Fut::Output, RunError>
where
    E: FnOnce() -> Fut,
    Fut: Future,
{
    if tokio::task::try_id().is_some() {
        return Err(already_running());
    }

    let backend: Backend = backend.parse()?;
    let runtime_options = RuntimeOptions::parse(backend, options)?;
    let runtime = runtime_options
        .builder(backend)
        .build()
        .map_err(RunError::Build)?;
    debug!(%backend, options = options.len(), "runtime started");

    // block_on 진입 검사는 tokio만 알 수 있다. 진입 전 패닉이면 중첩 호출이다.
    let entered = Cell::new(false);
    let outcome = {
        let entered = &entered;
        panic::catch_unwind(AssertUnwindSafe(|| {
            // entry는 런타임 컨텍스트 안에서 호출해야 타이머/IO 리소스를 만들 수 있다.
            runtime.block_on(async move {
                entered.set(true);
                entry().await
            })
        }))
    };

    let output = match outcome {
        Ok(output) => output,
        Err(_) if !entered.get() => {
            runtime.shutdown_background();
            debug!(%backend, "nested runtime start rejected");
            return Err(already_running());
        }
        Err(payload) => {
            runtime.shutdown_background();
            panic::resume_unwind(payload)
        }
    };

    match runtime_options.shutdown_timeout {
        Some(timeout) => runtime.shutdown_timeout(timeout),
        None => drop(runtime),
    }
    debug!(%backend, "runtime shut down");

    Ok(output)
}

fn already_running() -> RunError {
    RunError::LoopAlreadyRunning {
        running: Handle::try_current()
            .map(|handle| flavor_name(handle.runtime_flavor()))
            .unwrap_or("tokio"),
    }
}

fn flavor_name(flavor: RuntimeFlavor) -> &'static str {
    match flavor {
        RuntimeFlavor::CurrentThread => Backend::CurrentThread.name(),
        RuntimeFlavor::MultiThread => Backend::MultiThread.name(),
        _ => "tokio",
    }
}
