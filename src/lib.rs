//! anyclap library root.
//! clap 기반 CLI에 비동기 핸들러를 등록하고, 호출마다 새 tokio 런타임에서 실행한다.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interface;

pub use application::bridge::{Bridge, bridge};
pub use domain::backend::{Backend, BackendOptions, BackendSelector};
pub use domain::command::{AppSettings, CallbackSpec, CommandSpec, ContextSettings};
pub use domain::error::{DispatchError, RunError};
pub use domain::outcome::Outcome;
pub use infrastructure::config::load_selector;
pub use interface::cli::{App, AsyncApp, run, run_from};
#[allow(deprecated)]
pub use interface::cli::multi_thread_run;
pub use interface::logging::init as init_logging;
