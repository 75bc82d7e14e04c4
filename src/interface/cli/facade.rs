//! 비동기 핸들러 등록 파사드.
//! 비동기 핸들러를 브리지로 감싼 뒤 [`App`]의 동기 등록 경로로 넘긴다.

use std::ffi::OsString;
use std::future::Future;
use std::io::Write;

use anyhow::Result;
use clap::{Args, Command, FromArgMatches};
use clap_complete::Shell;
use tracing::debug;

use crate::application::bridge::Bridge;
use crate::domain::backend::{Backend, BackendSelector};
use crate::domain::command::{AppSettings, CallbackSpec, CommandSpec, FALLBACK_COMMAND_NAME};
use crate::domain::outcome::Outcome;

use super::app::App;

/// 비동기 핸들러를 받는 명령줄 앱.
///
/// ```no_run
/// use anyclap::{AsyncApp, AppSettings, Backend, CommandSpec};
///
/// #[derive(clap::Args)]
/// struct HelloArgs {
///     #[arg(long, default_value = "world")]
///     name: String,
/// }
///
/// async fn hello(args: HelloArgs) -> anyhow::Result<()> {
///     println!("Hello {}!", args.name);
///     Ok(())
/// }
///
/// let mut app = AsyncApp::new(AppSettings::named("greet"));
/// app.async_command(CommandSpec::default(), Backend::CurrentThread, hello);
/// app.main();
/// ```
#[derive(Default)]
pub struct AsyncApp {
    app: App,
}

impl AsyncApp {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            app: App::new(settings),
        }
    }

    /// 비동기 하위 명령을 등록하고 원래 핸들러를 그대로 돌려준다.
    ///
    /// 백엔드 이름/옵션은 여기서 검증하지 않는다. 잘못된 값은 명령이 처음
    /// 실행될 때 [`RunError`](crate::RunError)로 드러난다.
    pub fn async_command<A, T, E, F, Fut>(
        &mut self,
        spec: CommandSpec,
        selector: impl Into<BackendSelector>,
        handler: F,
    ) -> F
    where
        A: Args + FromArgMatches + 'static,
        T: Outcome + 'static,
        E: Into<anyhow::Error> + 'static,
        F: Fn(A) -> Fut + Clone + 'static,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let bridge = Bridge::new(handler.clone(), selector);
        let name = spec
            .name
            .clone()
            .or_else(|| bridge.name().map(str::to_string))
            .unwrap_or_else(|| FALLBACK_COMMAND_NAME.to_string());
        debug!(
            command = %name,
            backend = bridge.selector().backend(),
            "async command registered"
        );

        let spec = CommandSpec {
            name: Some(name),
            ..spec
        };
        self.app.command(spec, move |args: A| bridge.call(args));
        handler
    }

    /// 비동기 루트 콜백을 등록하고 원래 핸들러를 그대로 돌려준다.
    pub fn async_callback<A, T, E, F, Fut>(
        &mut self,
        spec: CallbackSpec,
        selector: impl Into<BackendSelector>,
        handler: F,
    ) -> F
    where
        A: Args + FromArgMatches + 'static,
        T: Outcome + 'static,
        E: Into<anyhow::Error> + 'static,
        F: Fn(A) -> Fut + Clone + 'static,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        let bridge = Bridge::new(handler.clone(), selector);
        debug!(backend = bridge.selector().backend(), "async callback registered");

        self.app.callback(spec, move |args: A| bridge.call(args));
        handler
    }

    #[deprecated(
        since = "0.2.0",
        note = "use `async_command(spec, Backend::MultiThread, handler)` instead"
    )]
    pub fn multi_thread_command<A, T, E, F, Fut>(&mut self, spec: CommandSpec, handler: F) -> F
    where
        A: Args + FromArgMatches + 'static,
        T: Outcome + 'static,
        E: Into<anyhow::Error> + 'static,
        F: Fn(A) -> Fut + Clone + 'static,
        Fut: Future<Output = std::result::Result<T, E>>,
    {
        self.async_command(spec, Backend::MultiThread, handler)
    }

    /// 동기 핸들러 등록(디스패처 기본 경로).
    pub fn command<A, T, H>(&mut self, spec: CommandSpec, handler: H) -> &mut Self
    where
        A: Args + FromArgMatches + 'static,
        T: Outcome,
        H: Fn(A) -> Result<T> + 'static,
    {
        self.app.command(spec, handler);
        self
    }

    pub fn callback<A, T, H>(&mut self, spec: CallbackSpec, handler: H) -> &mut Self
    where
        A: Args + FromArgMatches + 'static,
        T: Outcome,
        H: Fn(A) -> Result<T> + 'static,
    {
        self.app.callback(spec, handler);
        self
    }

    pub fn build_command(&self) -> Command {
        self.app.build_command()
    }

    pub fn invoke<I, S>(&self, args: I) -> Result<i32>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.app.invoke(args)
    }

    pub fn write_completion(&self, shell: Shell, out: &mut dyn Write) {
        self.app.write_completion(shell, out)
    }

    pub fn main(&self) -> ! {
        self.app.main()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use clap::Args;

    use super::*;
    use crate::domain::backend::BackendOptions;
    use crate::domain::error::RunError;

    #[derive(Debug, Args)]
    struct CountArgs {
        #[arg(long, default_value_t = 1)]
        times: u32,
    }

    #[derive(Debug, Args)]
    struct RootArgs {
        #[arg(long)]
        quiet: bool,
    }

    async fn count(args: CountArgs) -> anyhow::Result<u8> {
        let mut total = 0u32;
        for _ in 0..args.times {
            tokio::task::yield_now().await;
            total += 1;
        }
        Ok(u8::try_from(total)?)
    }

    fn app() -> AsyncApp {
        AsyncApp::new(AppSettings {
            add_completion: false,
            ..AppSettings::named("counter")
        })
    }

    #[test]
    fn async_command_exit_code_comes_from_handler() {
        for backend in Backend::ALL {
            let mut app = app();
            app.async_command(CommandSpec::default(), backend, count);
            assert_eq!(app.invoke(["--times", "5"]).unwrap(), 5, "{backend}");
        }
    }

    #[test]
    fn returns_the_original_handler() {
        let mut app = app();
        let returned = app.async_command(CommandSpec::default(), Backend::default(), count);
        let direct = futures::executor::block_on(async {
            let fut = returned(CountArgs { times: 0 });
            fut.await
        });
        assert_eq!(direct.unwrap(), 0);
    }

    #[test]
    fn default_name_comes_from_async_fn() {
        let mut app = app();
        app.async_command(CommandSpec::default(), Backend::default(), count);
        app.command(CommandSpec::named("noop"), |_: RootArgs| Ok(()));

        assert!(app.build_command().find_subcommand("count").is_some());
        assert_eq!(app.invoke(["count", "--times", "2"]).unwrap(), 2);
    }

    #[test]
    fn fn_pointer_handler_uses_fallback_name() {
        let mut app = app();
        let pointer: fn(CountArgs) -> _ = count;
        app.async_command(CommandSpec::default(), Backend::default(), pointer);
        app.command(CommandSpec::named("noop"), |_: RootArgs| Ok(()));

        let root = app.build_command();
        assert!(root.find_subcommand(FALLBACK_COMMAND_NAME).is_some());
        assert!(root.find_subcommand("async-command").is_none());
        assert_eq!(app.invoke(["command", "--times", "3"]).unwrap(), 3);
    }

    #[test]
    fn async_callback_runs_before_async_command() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut app = app();

        let cb_log = log.clone();
        app.async_callback(CallbackSpec::default(), Backend::MultiThread, move |args: RootArgs| {
            let log = cb_log.clone();
            async move {
                log.lock().unwrap().push(format!("root quiet={}", args.quiet));
                Ok::<_, anyhow::Error>(())
            }
        });

        let cmd_log = log.clone();
        app.async_command(CommandSpec::named("work"), Backend::CurrentThread, move |_: CountArgs| {
            let log = cmd_log.clone();
            async move {
                log.lock().unwrap().push("work".to_string());
                Ok::<_, anyhow::Error>(())
            }
        });

        assert_eq!(app.invoke(["--quiet", "work"]).unwrap(), 0);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["root quiet=true".to_string(), "work".to_string()]
        );
    }

    #[test]
    fn bad_backend_surfaces_on_first_invocation() {
        let mut app = app();
        app.async_command(CommandSpec::default(), "trio", count);

        let err = app.invoke(Vec::<String>::new()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RunError>(),
            Some(RunError::BackendNotFound { .. })
        ));
    }

    #[test]
    fn bad_option_surfaces_on_first_invocation() {
        let mut app = app();
        app.async_command(
            CommandSpec::default(),
            ("current_thread", BackendOptions::new().with("worker_threads", 4)),
            count,
        );

        let err = app.invoke(Vec::<String>::new()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RunError>(),
            Some(RunError::UnsupportedOption { .. })
        ));
    }

    #[test]
    #[allow(deprecated)]
    fn multi_thread_command_prefills_backend() {
        let mut app = app();
        app.multi_thread_command(CommandSpec::default(), |_: RootArgs| async {
            Ok::<_, anyhow::Error>(tokio::runtime::Handle::current().runtime_flavor()
                == tokio::runtime::RuntimeFlavor::MultiThread)
        });

        assert_eq!(app.invoke(Vec::<String>::new()).unwrap(), 0);
    }
}
