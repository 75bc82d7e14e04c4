//! 핸들러 반환값 -> 프로세스 종료 코드 변환 규칙.

/// 디스패처가 종료 코드로 해석할 수 있는 핸들러 반환 타입.
pub trait Outcome {
    fn exit_code(self) -> i32;
}

impl Outcome for () {
    fn exit_code(self) -> i32 {
        0
    }
}

impl Outcome for i32 {
    fn exit_code(self) -> i32 {
        self
    }
}

impl Outcome for u8 {
    fn exit_code(self) -> i32 {
        i32::from(self)
    }
}

/// `true`는 성공(0), `false`는 실패(1).
impl Outcome for bool {
    fn exit_code(self) -> i32 {
        if self { 0 } else { 1 }
    }
}
