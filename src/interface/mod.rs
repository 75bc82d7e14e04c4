//! Interface layer
//! 앱 작성자가 직접 쓰는 등록/실행 API와 로깅 초기화를 제공한다.

pub mod cli;
pub mod logging;
