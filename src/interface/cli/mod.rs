//! CLI 인터페이스 모듈 묶음.
//! 동기 디스패처, 비동기 등록 파사드, 단일 명령 실행 진입점을 한 네임스페이스로 관리한다.

pub mod app;
pub mod facade;
pub mod run;

pub use app::App;
pub use facade::AsyncApp;
#[allow(deprecated)]
pub use run::{multi_thread_run, run, run_from};
