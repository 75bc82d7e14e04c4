//! 비동기 핸들러 -> 동기 함수 브리지.
//!
//! 동기 디스패처는 `Fn(A) -> Result<T>`만 부를 수 있으므로, 비동기 핸들러를
//! 같은 인자 타입 `A`를 받는 동기 호출로 감싼다. 호출마다 선택된 백엔드로
//! 새 런타임을 만들어 핸들러 future를 끝까지 구동한다. 백엔드별 분기는 여기에
//! 두지 않고 이름/옵션을 런타임 진입점으로 넘기기만 한다.

use std::future::Future;

use anyhow::Result;

use crate::domain::backend::BackendSelector;
use crate::domain::command::handler_name;
use crate::infrastructure::runtime;

/// 핸들러 하나와 고정된 백엔드 설정을 묶은 동기 호출 래퍼.
#[derive(Debug, Clone)]
pub struct Bridge<F> {
    handler: F,
    selector: BackendSelector,
    name: Option<String>,
}

impl<F> Bridge<F> {
    pub fn new(handler: F, selector: impl Into<BackendSelector>) -> Self {
        Self {
            handler,
            selector: selector.into(),
            name: handler_name::<F>(),
        }
    }

    /// 핸들러 타입에서 유도한 이름(명령 이름 기본값).
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn selector(&self) -> &BackendSelector {
        &self.selector
    }

    /// 호출 스레드를 막고 핸들러가 끝날 때까지 기다린다.
    /// 핸들러 오류는 타입/메시지를 바꾸지 않고 그대로 돌려준다.
    pub fn call<A, Fut, T, E>(&self, args: A) -> Result<T>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Into<anyhow::Error>,
    {
        let handler = &self.handler;
        let output = runtime::run(
            move || handler(args),
            self.selector.backend(),
            self.selector.options(),
        )?;
        output.map_err(Into::into)
    }
}

/// [`Bridge`]를 만들어 바로 동기 클로저로 돌려준다.
pub fn bridge<A, Fut, T, E, F>(
    handler: F,
    selector: impl Into<BackendSelector>,
) -> impl Fn(A) -> Result<T>
where
    F: Fn(A) -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: Into<anyhow::Error>,
{
    let bridge = Bridge::new(handler, selector);
    move |args| bridge.call(args)
}
