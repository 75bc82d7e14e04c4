//! Infrastructure layer
//! tokio 런타임 생성과 설정 파일 등 외부 자원을 직접 다루는 구현체 집합.

pub mod config;
pub mod runtime;
