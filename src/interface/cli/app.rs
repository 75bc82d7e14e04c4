//! 동기 명령 디스패처.
//! clap `Command` 트리를 조립하고, 파싱 결과에 맞는 핸들러를 호출한다.

use std::ffi::OsString;
use std::io::{self, Write};
use std::path::Path;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{Arg, ArgMatches, Args, Command, FromArgMatches};
use clap_complete::{Shell, generate};
use tracing::{debug, warn};

use crate::domain::command::{
    AppSettings, CallbackSpec, CommandSpec, ContextSettings, FALLBACK_COMMAND_NAME, handler_name,
};
use crate::domain::error::DispatchError;
use crate::domain::outcome::Outcome;

const COMPLETION_ARG: &str = "show-completion";

type Runner = Box<dyn Fn(&ArgMatches) -> Result<i32>>;

struct Entry {
    name: String,
    spec: CommandSpec,
    augment: fn(Command) -> Command,
    run: Runner,
}

struct CallbackEntry {
    spec: CallbackSpec,
    augment: fn(Command) -> Command,
    run: Runner,
}

enum Layout<'a> {
    /// 명령 하나, 콜백 없음: 명령 인자를 루트에 바로 둔다.
    Single(&'a Entry),
    Group,
}

/// 동기 핸들러 레지스트리 + clap 파서.
pub struct App {
    settings: AppSettings,
    commands: Vec<Entry>,
    callback: Option<CallbackEntry>,
}

impl Default for App {
    fn default() -> Self {
        Self::new(AppSettings::default())
    }
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            settings,
            commands: Vec::new(),
            callback: None,
        }
    }

    /// 하위 명령을 등록한다. 같은 이름이 있으면 경고를 남기고 교체한다.
    /// 명령 인자는 `A`의 clap 정의를 그대로 사용한다.
    /// 클로저 핸들러는 이름을 유도할 수 없으므로 [`CommandSpec::named`]로 이름을 준다.
    pub fn command<A, T, H>(&mut self, spec: CommandSpec, handler: H) -> &mut Self
    where
        A: Args + FromArgMatches + 'static,
        T: Outcome,
        H: Fn(A) -> Result<T> + 'static,
    {
        let name = spec
            .name
            .clone()
            .or_else(handler_name::<H>)
            .unwrap_or_else(|| FALLBACK_COMMAND_NAME.to_string());
        debug!(command = %name, "command registered");

        let entry = Entry {
            name,
            spec,
            augment: A::augment_args,
            run: erase(handler),
        };
        if let Some(idx) = self.commands.iter().position(|e| e.name == entry.name) {
            warn!(command = %entry.name, "command registered twice; earlier handler replaced");
            self.commands[idx] = entry;
        } else {
            self.commands.push(entry);
        }
        self
    }

    /// 루트 콜백을 등록한다. 하위 명령보다 먼저 실행되며, 이전 콜백은 교체된다.
    pub fn callback<A, T, H>(&mut self, spec: CallbackSpec, handler: H) -> &mut Self
    where
        A: Args + FromArgMatches + 'static,
        T: Outcome,
        H: Fn(A) -> Result<T> + 'static,
    {
        debug!("callback registered");
        self.callback = Some(CallbackEntry {
            spec,
            augment: A::augment_args,
            run: erase(handler),
        });
        self
    }

    /// 등록 상태를 반영한 clap 명령 트리.
    pub fn build_command(&self) -> Command {
        let bin = self.settings.name.clone().unwrap_or_else(default_bin_name);

        let mut root = match self.layout() {
            Layout::Single(entry) => {
                let mut cmd = entry.build(self.settings.context).name(bin);
                if entry.spec.help.is_none()
                    && let Some(help) = &self.settings.help
                {
                    cmd = cmd.about(help.clone());
                }
                if self.settings.no_args_is_help {
                    cmd = cmd.arg_required_else_help(true);
                }
                cmd
            }
            Layout::Group => self.build_group(bin),
        };

        if let Some(version) = &self.settings.version {
            root = root.version(version.clone());
        }
        if self.settings.add_completion {
            root = root.arg(completion_arg());
        }
        root
    }

    /// 프로그램 이름을 제외한 인자로 디스패치하고 종료 코드를 돌려준다.
    /// 사용법 오류/도움말은 출력 후 종료 코드로, 핸들러 오류는 그대로 `Err`로 전달된다.
    pub fn invoke<I, S>(&self, args: I) -> Result<i32>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let root = self.build_command();
        let argv = std::iter::once(OsString::from(root.get_name()))
            .chain(args.into_iter().map(Into::into))
            .collect::<Vec<_>>();
        self.dispatch(root, argv)
    }

    /// 프로세스 인자로 디스패치하고 그 종료 코드로 프로세스를 끝낸다.
    pub fn main(&self) -> ! {
        let code = match self.dispatch(self.build_command(), std::env::args_os().collect()) {
            Ok(code) => code,
            Err(err) => {
                eprintln!("error: {err:#}");
                1
            }
        };
        std::process::exit(code)
    }

    /// 지정 셸의 자동완성 스크립트를 출력한다.
    pub fn write_completion(&self, shell: Shell, out: &mut dyn Write) {
        let mut cmd = self.build_command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, out);
    }

    fn dispatch(&self, mut root: Command, argv: Vec<OsString>) -> Result<i32> {
        if self.commands.is_empty() && self.callback.is_none() {
            return Err(DispatchError::NoCommands.into());
        }

        let matches = match root.try_get_matches_from_mut(argv) {
            Ok(matches) => matches,
            Err(err) => return report(err),
        };

        if self.settings.add_completion
            && let Ok(Some(shell)) = matches.try_get_one::<Shell>(COMPLETION_ARG)
        {
            self.write_completion(*shell, &mut io::stdout());
            return Ok(0);
        }

        match self.layout() {
            Layout::Single(entry) => run_entry(entry, &matches),
            Layout::Group => {
                let subcommand = matches.subcommand();
                if subcommand.is_none() && !self.invoke_without_command() {
                    return report(root.error(ErrorKind::MissingSubcommand, "Missing command."));
                }

                if let Some(callback) = &self.callback {
                    if callback.spec.deprecated {
                        eprintln!("DeprecationWarning: The command '{}' is deprecated.", root.get_name());
                    }
                    let code = (callback.run)(&matches)?;
                    if code != 0 {
                        return Ok(code);
                    }
                }

                let Some((name, sub_matches)) = subcommand else {
                    return Ok(0);
                };
                let entry = self
                    .commands
                    .iter()
                    .find(|e| e.name == name)
                    .ok_or_else(|| DispatchError::UnknownCommand {
                        name: name.to_string(),
                    })?;
                run_entry(entry, sub_matches)
            }
        }
    }

    fn layout(&self) -> Layout<'_> {
        match (self.commands.as_slice(), &self.callback) {
            ([entry], None) => Layout::Single(entry),
            _ => Layout::Group,
        }
    }

    fn invoke_without_command(&self) -> bool {
        self.callback
            .as_ref()
            .and_then(|cb| cb.spec.invoke_without_command)
            .unwrap_or(self.settings.invoke_without_command)
    }

    fn build_group(&self, bin: String) -> Command {
        let settings = &self.settings;
        let spec = self.callback.as_ref().map(|cb| &cb.spec);

        let help = spec.and_then(|s| s.help.as_deref()).or(settings.help.as_deref());
        let short_help = spec
            .and_then(|s| s.short_help.as_deref())
            .or(settings.short_help.as_deref());
        let epilog = spec.and_then(|s| s.epilog.as_deref()).or(settings.epilog.as_deref());
        let deprecated = spec.is_some_and(|s| s.deprecated);
        let no_args_is_help = spec
            .and_then(|s| s.no_args_is_help)
            .unwrap_or(settings.no_args_is_help);
        let context = spec.and_then(|s| s.context).unwrap_or(settings.context);

        let mut root = describe(Command::new(bin), help, short_help, epilog, deprecated)
            .arg_required_else_help(no_args_is_help);
        if let Some(callback) = &self.callback {
            root = (callback.augment)(root);
        }
        root = apply_context(root, context);

        for entry in &self.commands {
            root = root.subcommand(entry.build(settings.context));
        }
        root
    }
}

impl Entry {
    fn build(&self, inherited: ContextSettings) -> Command {
        let spec = &self.spec;
        let mut cmd = (self.augment)(Command::new(self.name.clone()));
        cmd = describe(
            cmd,
            spec.help.as_deref(),
            spec.short_help.as_deref(),
            spec.epilog.as_deref(),
            spec.deprecated,
        )
        .disable_help_flag(!spec.add_help_option)
        .arg_required_else_help(spec.no_args_is_help)
        .hide(spec.hidden);

        for alias in &spec.aliases {
            cmd = cmd.alias(alias.clone());
        }
        if let Some(order) = spec.display_order {
            cmd = cmd.display_order(order);
        }
        apply_context(cmd, spec.context.unwrap_or(inherited))
    }
}

fn erase<A, T, H>(handler: H) -> Runner
where
    A: FromArgMatches + 'static,
    T: Outcome,
    H: Fn(A) -> Result<T> + 'static,
{
    Box::new(move |matches: &ArgMatches| {
        let args = A::from_arg_matches(matches)?;
        Ok(handler(args)?.exit_code())
    })
}

fn run_entry(entry: &Entry, matches: &ArgMatches) -> Result<i32> {
    if entry.spec.deprecated {
        eprintln!("DeprecationWarning: The command '{}' is deprecated.", entry.name);
    }
    debug!(command = %entry.name, "dispatching");
    (entry.run)(matches)
}

/// help가 길고 short_help가 따로 있으면 목록에는 short_help, 상세 도움말에는 help를 쓴다.
fn describe(
    mut cmd: Command,
    help: Option<&str>,
    short_help: Option<&str>,
    epilog: Option<&str>,
    deprecated: bool,
) -> Command {
    let mark = |text: &str| {
        if deprecated {
            format!("(deprecated) {text}")
        } else {
            text.to_string()
        }
    };

    match short_help.or(help) {
        Some(about) => cmd = cmd.about(mark(about)),
        None if deprecated => cmd = cmd.about("(deprecated)"),
        None => {}
    }
    if short_help.is_some()
        && let Some(help) = help
    {
        cmd = cmd.long_about(mark(help));
    }
    if let Some(epilog) = epilog {
        cmd = cmd.after_help(epilog.to_string());
    }
    cmd
}

fn apply_context(cmd: Command, context: ContextSettings) -> Command {
    let cmd = cmd.args_override_self(context.args_override_self);
    if !context.ignore_case && !context.allow_negative_numbers {
        return cmd;
    }

    // 값을 받는 인자에만 적용한다(플래그에는 의미가 없다).
    cmd.mut_args(|arg| {
        if !arg.get_action().takes_values() {
            return arg;
        }
        arg.ignore_case(context.ignore_case)
            .allow_negative_numbers(context.allow_negative_numbers)
    })
}

fn completion_arg() -> Arg {
    Arg::new(COMPLETION_ARG)
        .long(COMPLETION_ARG)
        .value_name("SHELL")
        .value_parser(clap::value_parser!(Shell))
        .exclusive(true)
        .help("Print the completion script for SHELL and exit")
}

fn report(err: clap::Error) -> Result<i32> {
    let code = err.exit_code();
    err.print()?;
    Ok(code)
}

fn default_bin_name() -> String {
    std::env::args_os()
        .next()
        .and_then(|arg0| {
            Path::new(&arg0)
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "app".to_string())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use clap::{Args, ValueEnum};
    use thiserror::Error;

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
    enum User {
        Rick,
        Morty,
    }

    #[derive(Debug, Args)]
    struct HelloArgs {
        #[arg(long, value_enum, default_value = "rick")]
        name: User,
    }

    #[derive(Debug, Args)]
    struct NoArgs {}

    #[derive(Debug, Args)]
    struct GlobalArgs {
        #[arg(long)]
        verbose: bool,
        #[arg(long, default_value_t = 0)]
        fail_with: i32,
    }

    #[derive(Debug, Error)]
    #[error("portal gun is out of fluid")]
    struct OutOfFluid;

    type Log = Rc<RefCell<Vec<String>>>;

    fn app_named(name: &str) -> App {
        App::new(AppSettings {
            add_completion: false,
            ..AppSettings::named(name)
        })
    }

    fn greeter(log: &Log) -> impl Fn(HelloArgs) -> Result<()> + 'static {
        let log = log.clone();
        move |args: HelloArgs| {
            log.borrow_mut().push(format!("hello {:?}", args.name));
            Ok(())
        }
    }

    #[test]
    fn single_command_takes_args_at_root() {
        let log = Log::default();
        let mut app = app_named("greet");
        app.command(CommandSpec::named("hello"), greeter(&log));

        assert_eq!(app.invoke(["--name", "morty"]).unwrap(), 0);
        assert_eq!(*log.borrow(), vec!["hello Morty".to_string()]);
        assert_eq!(app.build_command().get_name(), "greet");
    }

    #[test]
    fn group_routes_to_subcommand() {
        let log = Log::default();
        let mut app = app_named("greet");
        app.command(CommandSpec::named("hello"), greeter(&log));
        let bye_log = log.clone();
        app.command(CommandSpec::named("bye"), move |_: NoArgs| {
            bye_log.borrow_mut().push("bye".into());
            Ok(3i32)
        });

        assert_eq!(app.invoke(["bye"]).unwrap(), 3);
        assert_eq!(app.invoke(["hello", "--name", "rick"]).unwrap(), 0);
        assert_eq!(*log.borrow(), vec!["bye".to_string(), "hello Rick".to_string()]);
    }

    #[test]
    fn callback_runs_before_subcommand_and_can_stop_it() {
        let log = Log::default();
        let mut app = app_named("greet");
        let cb_log = log.clone();
        app.callback(CallbackSpec::default(), move |args: GlobalArgs| {
            cb_log.borrow_mut().push(format!("callback verbose={}", args.verbose));
            Ok(args.fail_with)
        });
        app.command(CommandSpec::named("hello"), greeter(&log));

        assert_eq!(app.invoke(["--verbose", "hello"]).unwrap(), 0);
        assert_eq!(app.invoke(["--fail-with", "4", "hello"]).unwrap(), 4);
        assert_eq!(
            *log.borrow(),
            vec![
                "callback verbose=true".to_string(),
                "hello Rick".to_string(),
                "callback verbose=false".to_string(),
            ]
        );
    }

    #[test]
    fn missing_subcommand_is_a_usage_error() {
        let log = Log::default();
        let mut app = app_named("greet");
        app.command(CommandSpec::named("hello"), greeter(&log));
        app.command(CommandSpec::named("bye"), |_: NoArgs| Ok(()));

        assert_eq!(app.invoke(Vec::<String>::new()).unwrap(), 2);
    }

    #[test]
    fn invoke_without_command_runs_callback_alone() {
        let log = Log::default();
        let mut app = app_named("greet");
        let cb_log = log.clone();
        app.callback(
            CallbackSpec::default().invoke_without_command(),
            move |_: GlobalArgs| {
                cb_log.borrow_mut().push("callback".into());
                Ok(())
            },
        );
        app.command(CommandSpec::named("hello"), greeter(&log));

        assert_eq!(app.invoke(Vec::<String>::new()).unwrap(), 0);
        assert_eq!(*log.borrow(), vec!["callback".to_string()]);
    }

    #[test]
    fn help_and_usage_errors_map_to_exit_codes() {
        let log = Log::default();
        let mut app = app_named("greet");
        app.command(CommandSpec::named("hello"), greeter(&log));

        assert_eq!(app.invoke(["--help"]).unwrap(), 0);
        assert_eq!(app.invoke(["--name", "summer"]).unwrap(), 2);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn handler_errors_are_returned_unchanged() {
        let mut app = app_named("portal");
        app.command(CommandSpec::named("shoot"), |_: NoArgs| -> Result<()> {
            Err(OutOfFluid.into())
        });

        let err = app.invoke(Vec::<String>::new()).unwrap_err();
        assert!(err.downcast_ref::<OutOfFluid>().is_some());
        assert_eq!(err.to_string(), "portal gun is out of fluid");
    }

    #[test]
    fn empty_app_reports_no_commands() {
        let app = app_named("empty");
        let err = app.invoke(Vec::<String>::new()).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DispatchError>(),
            Some(DispatchError::NoCommands)
        ));
    }

    #[test]
    fn ignore_case_context_matches_choices() {
        let log = Log::default();
        let mut app = App::new(AppSettings {
            context: ContextSettings::ignore_case(),
            add_completion: false,
            ..AppSettings::named("greet")
        });
        app.command(CommandSpec::named("hello"), greeter(&log));

        assert_eq!(app.invoke(["--name", "MORTY"]).unwrap(), 0);
        assert_eq!(*log.borrow(), vec!["hello Morty".to_string()]);
    }

    #[test]
    fn command_metadata_reaches_clap() {
        let mut app = app_named("greet");
        app.command(
            CommandSpec::named("hello")
                .help("Say hello")
                .alias("hi")
                .deprecated(),
            |_: NoArgs| Ok(()),
        );
        app.command(CommandSpec::named("secret").hidden(), |_: NoArgs| Ok(()));

        let root = app.build_command();
        let hello = root.find_subcommand("hello").unwrap();
        assert_eq!(
            hello.get_about().map(|s| s.to_string()).as_deref(),
            Some("(deprecated) Say hello")
        );
        assert!(hello.get_all_aliases().any(|a| a == "hi"));
        assert!(root.find_subcommand("secret").unwrap().is_hide_set());

        assert_eq!(app.invoke(["hi"]).unwrap(), 0);
    }

    #[test]
    fn command_name_defaults_to_handler_name() {
        fn show_status(_: NoArgs) -> Result<()> {
            Ok(())
        }

        let mut app = app_named("tool");
        app.command(CommandSpec::default(), show_status);
        app.command(CommandSpec::named("other"), |_: NoArgs| Ok(()));

        assert!(app.build_command().find_subcommand("show-status").is_some());
        assert_eq!(app.invoke(["show-status"]).unwrap(), 0);
    }

    #[test]
    fn unnamed_closures_fall_back_to_one_name_and_the_last_wins() {
        let mut app = app_named("tool");
        app.command(CommandSpec::default(), |_: NoArgs| Ok(1i32));
        app.command(CommandSpec::default(), |_: NoArgs| Ok(2i32));

        assert!(app.build_command().get_subcommands().next().is_none());
        assert_eq!(app.commands.len(), 1);
        assert_eq!(app.commands[0].name, FALLBACK_COMMAND_NAME);
        assert_eq!(app.invoke(Vec::<String>::new()).unwrap(), 2);
    }

    #[test]
    fn named_closures_stay_reachable() {
        let mut app = app_named("tool");
        app.command(CommandSpec::named("one"), |_: NoArgs| Ok(1i32));
        app.command(CommandSpec::named("two"), |_: NoArgs| Ok(2i32));

        assert_eq!(app.invoke(["one"]).unwrap(), 1);
        assert_eq!(app.invoke(["two"]).unwrap(), 2);
    }

    #[test]
    fn completion_script_names_the_app() {
        let mut app = App::new(AppSettings::named("greet"));
        app.command(CommandSpec::named("hello"), |_: HelloArgs| Ok(()));

        let mut out = Vec::new();
        app.write_completion(Shell::Bash, &mut out);
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("greet"));

        assert!(
            app.build_command()
                .get_arguments()
                .any(|a| a.get_id() == COMPLETION_ARG)
        );
    }
}
