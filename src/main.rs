//! `anyclap-greet` 바이너리 진입점.
//! 비동기 핸들러로 구성한 예제 CLI.

use std::time::Duration;

use anyclap::infrastructure::config::inspect_pretty_json;
use anyclap::{AppSettings, AsyncApp, Backend, CommandSpec, ContextSettings};
use clap::{Args, ValueEnum};

const APP: &str = "anyclap-greet";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum User {
    Rick,
    Morty,
}

impl User {
    fn title(self) -> &'static str {
        match self {
            Self::Rick => "Rick",
            Self::Morty => "Morty",
        }
    }
}

#[derive(Debug, Args)]
struct HelloArgs {
    /// Who to greet
    #[arg(long, value_enum, default_value = "rick")]
    name: User,
}

#[derive(Debug, Args)]
struct CrowdArgs {
    /// Names to greet, concurrently
    #[arg(required = true)]
    names: Vec<String>,

    /// Delay between greetings in milliseconds
    #[arg(long, default_value_t = 10)]
    delay_ms: u64,
}

#[derive(Debug, Args)]
struct NoArgs {}

async fn hello(args: HelloArgs) -> anyhow::Result<()> {
    println!("Hello {}!", args.name.title());
    Ok(())
}

async fn crowd(args: CrowdArgs) -> anyhow::Result<()> {
    let handles = args.names.into_iter().enumerate().map(|(i, name)| {
        let delay = Duration::from_millis(args.delay_ms * i as u64);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            format!("Hello {name}!")
        })
    });

    for line in futures::future::try_join_all(handles).await? {
        println!("{line}");
    }
    Ok(())
}

fn main() {
    anyclap::init_logging();

    let selector = match anyclap::load_selector(APP) {
        Ok(selector) => selector,
        Err(err) => {
            eprintln!("error: {err:#}");
            std::process::exit(2);
        }
    };

    let mut app = AsyncApp::new(AppSettings {
        help: Some("Greet characters from async handlers".to_string()),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
        context: ContextSettings::ignore_case(),
        ..AppSettings::named(APP)
    });

    app.async_command(CommandSpec::default().help("Greet one character"), selector, hello);
    app.async_command(
        CommandSpec::named("crowd").help("Greet several names at once"),
        Backend::MultiThread,
        crowd,
    );
    app.command(
        CommandSpec::named("config").help("Show the effective runtime configuration"),
        |_: NoArgs| {
            println!("{}", inspect_pretty_json(APP)?);
            Ok(())
        },
    );

    app.main()
}
