//! Domain layer
//! 백엔드 선택, 명령 등록 설정, 종료 코드 규칙을 외부 런타임과 무관하게 표현한다.

pub mod backend;
pub mod command;
pub mod error;
pub mod outcome;
