//! 명령/콜백 등록 설정 값 객체.
//! clap `Command`에 그대로 옮겨지는 메타데이터만 담는다.

/// 파싱 컨텍스트 설정. 명령 단위 값이 앱 단위 값보다 우선한다.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContextSettings {
    /// 선택지(enum) 값을 대소문자 구분 없이 비교
    pub ignore_case: bool,
    /// `-1` 같은 값을 플래그가 아닌 값으로 해석
    pub allow_negative_numbers: bool,
    /// 같은 옵션을 여러 번 줄 때 마지막 값을 사용
    pub args_override_self: bool,
}

impl ContextSettings {
    pub fn ignore_case() -> Self {
        Self {
            ignore_case: true,
            ..Self::default()
        }
    }
}

/// 앱(루트 명령) 설정.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: Option<String>,
    pub version: Option<String>,
    pub help: Option<String>,
    pub short_help: Option<String>,
    pub epilog: Option<String>,
    /// 하위 명령 없이도 콜백만 실행하도록 허용
    pub invoke_without_command: bool,
    /// 인자 없이 실행하면 도움말 출력
    pub no_args_is_help: bool,
    /// `--show-completion <SHELL>` 옵션 추가 여부
    pub add_completion: bool,
    pub context: ContextSettings,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            name: None,
            version: None,
            help: None,
            short_help: None,
            epilog: None,
            invoke_without_command: false,
            no_args_is_help: false,
            add_completion: true,
            context: ContextSettings::default(),
        }
    }
}

impl AppSettings {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// 하위 명령 등록 설정.
#[derive(Debug, Clone)]
pub struct CommandSpec {
    /// 비어 있으면 핸들러 이름에서 유도한다.
    pub name: Option<String>,
    pub help: Option<String>,
    pub short_help: Option<String>,
    pub epilog: Option<String>,
    pub add_help_option: bool,
    pub no_args_is_help: bool,
    pub hidden: bool,
    pub deprecated: bool,
    pub aliases: Vec<String>,
    /// 도움말 목록에서의 그룹/정렬 순서
    pub display_order: Option<usize>,
    /// 비어 있으면 앱 설정을 상속한다.
    pub context: Option<ContextSettings>,
}

impl Default for CommandSpec {
    fn default() -> Self {
        Self {
            name: None,
            help: None,
            short_help: None,
            epilog: None,
            add_help_option: true,
            no_args_is_help: false,
            hidden: false,
            deprecated: false,
            aliases: Vec::new(),
            display_order: None,
            context: None,
        }
    }
}

impl CommandSpec {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }
}

/// 루트 콜백 등록 설정. 값이 있으면 [`AppSettings`]의 같은 항목을 덮어쓴다.
#[derive(Debug, Clone, Default)]
pub struct CallbackSpec {
    pub help: Option<String>,
    pub short_help: Option<String>,
    pub epilog: Option<String>,
    pub invoke_without_command: Option<bool>,
    pub no_args_is_help: Option<bool>,
    pub deprecated: bool,
    pub context: Option<ContextSettings>,
}

impl CallbackSpec {
    pub fn invoke_without_command(mut self) -> Self {
        self.invoke_without_command = Some(true);
        self
    }
}

/// 이름을 정하지 않았고 핸들러 이름도 유도할 수 없을 때 쓰는 명령 이름.
pub const FALLBACK_COMMAND_NAME: &str = "command";

/// 핸들러 타입 이름에서 명령 이름을 유도한다.
/// `my_app::say_hello` -> `say-hello`. 클로저와 함수 포인터는 `None`.
pub fn handler_name<F>() -> Option<String> {
    let full = strip_generics(std::any::type_name::<F>());
    // 클로저 타입 이름은 감싸는 함수 경로라서 같은 함수 안의 클로저끼리 겹친다.
    if full.contains("{{closure}}") {
        return None;
    }
    full.rsplit("::")
        .find(|segment| !segment.is_empty() && !segment.starts_with('{'))
        .filter(|segment| {
            segment
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
        .map(|segment| segment.trim_matches('_').replace('_', "-"))
        .filter(|name| !name.is_empty())
}

fn strip_generics(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut depth = 0usize;
    for c in raw.chars() {
        match c {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 => out.push(c),
            _ => {}
        }
    }
    out
}
