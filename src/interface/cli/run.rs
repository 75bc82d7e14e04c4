//! 비동기 함수 하나로 이루어진 CLI를 바로 실행하는 진입점.

use std::ffi::OsString;
use std::future::Future;

use anyhow::Result;
use clap::{Args, FromArgMatches};

use crate::domain::backend::{Backend, BackendSelector};
use crate::domain::command::{AppSettings, CommandSpec};
use crate::domain::outcome::Outcome;
use crate::interface::logging;

use super::facade::AsyncApp;

/// 핸들러를 유일한 명령으로 등록하고 프로세스 인자로 실행한 뒤 종료 코드로 프로세스를 끝낸다.
pub fn run<A, T, E, F, Fut>(handler: F, selector: impl Into<BackendSelector>) -> !
where
    A: Args + FromArgMatches + 'static,
    T: Outcome + 'static,
    E: Into<anyhow::Error> + 'static,
    F: Fn(A) -> Fut + Clone + 'static,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    logging::init();
    single_command_app(handler, selector).main()
}

/// [`run`]과 같은 흐름이지만 주어진 인자(프로그램 이름 제외)를 쓰고 종료 코드를 돌려준다.
pub fn run_from<A, T, E, F, Fut, I, S>(
    handler: F,
    selector: impl Into<BackendSelector>,
    args: I,
) -> Result<i32>
where
    A: Args + FromArgMatches + 'static,
    T: Outcome + 'static,
    E: Into<anyhow::Error> + 'static,
    F: Fn(A) -> Fut + Clone + 'static,
    Fut: Future<Output = std::result::Result<T, E>>,
    I: IntoIterator<Item = S>,
    S: Into<OsString>,
{
    single_command_app(handler, selector).invoke(args)
}

#[deprecated(since = "0.2.0", note = "use `run(handler, Backend::MultiThread)` instead")]
pub fn multi_thread_run<A, T, E, F, Fut>(handler: F) -> !
where
    A: Args + FromArgMatches + 'static,
    T: Outcome + 'static,
    E: Into<anyhow::Error> + 'static,
    F: Fn(A) -> Fut + Clone + 'static,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    run(handler, Backend::MultiThread)
}

fn single_command_app<A, T, E, F, Fut>(handler: F, selector: impl Into<BackendSelector>) -> AsyncApp
where
    A: Args + FromArgMatches + 'static,
    T: Outcome + 'static,
    E: Into<anyhow::Error> + 'static,
    F: Fn(A) -> Fut + Clone + 'static,
    Fut: Future<Output = std::result::Result<T, E>>,
{
    let mut app = AsyncApp::new(AppSettings {
        add_completion: false,
        ..AppSettings::default()
    });
    app.async_command(CommandSpec::default(), selector, handler);
    app
}
