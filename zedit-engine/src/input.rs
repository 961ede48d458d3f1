use std::collections::VecDeque;

use once_cell::sync::Lazy;
use regex::Regex;
use zedit_core::geometry::{Point2, Vector2};

use crate::errors::EngineError;
use crate::jig::Jig;

const NUMBER: &str = r"-?(?:\d+\.?\d*|\.\d+)";

static POLAR_RELATIVE: Lazy<Regex> =
    Lazy::new(|| anchored(&format!(r"@({NUMBER})<({NUMBER})")));
static CARTESIAN_RELATIVE: Lazy<Regex> =
    Lazy::new(|| anchored(&format!(r"@({NUMBER}),({NUMBER})")));
static ABSOLUTE: Lazy<Regex> = Lazy::new(|| anchored(&format!(r"({NUMBER}),({NUMBER})")));
static SCALAR: Lazy<Regex> = Lazy::new(|| anchored(NUMBER));

fn anchored(pattern: &str) -> Regex {
    // 模式由本模块常量拼出，编译失败属于编程错误。
    Regex::new(&format!("^{pattern}$")).unwrap_or_else(|err| panic!("坐标正则无效: {err}"))
}

/// 解析坐标文本。支持 `x,y`、`@dx,dy` 与 `@距离<角度`（角度单位为度）。
/// 相对形式以 `base` 为基准，缺省时为原点。空白字符会被忽略。
pub fn parse_coordinate(text: &str, base: Option<Point2>) -> Option<Point2> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }
    let base = base.unwrap_or_else(Point2::origin);

    if let Some(caps) = POLAR_RELATIVE.captures(&compact) {
        let distance: f64 = caps[1].parse().ok()?;
        let angle = caps[2].parse::<f64>().ok()?.to_radians();
        return Some(base + Vector2::new(distance * angle.cos(), distance * angle.sin()));
    }
    if let Some(caps) = CARTESIAN_RELATIVE.captures(&compact) {
        let dx: f64 = caps[1].parse().ok()?;
        let dy: f64 = caps[2].parse().ok()?;
        return Some(base + Vector2::new(dx, dy));
    }
    if let Some(caps) = ABSOLUTE.captures(&compact) {
        let x: f64 = caps[1].parse().ok()?;
        let y: f64 = caps[2].parse().ok()?;
        return Some(Point2::new(x, y));
    }
    None
}

/// 解析单个数值，语法与坐标分量相同。
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if !SCALAR.is_match(trimmed) {
        return None;
    }
    trimmed.parse().ok()
}

/// 命令选项关键字。`global_name` 是命令代码比较用的稳定名称。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keyword {
    pub display_name: String,
    pub global_name: String,
    pub local_name: Option<String>,
}

impl Keyword {
    pub fn new(display_name: impl Into<String>, global_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            global_name: global_name.into(),
            local_name: None,
        }
    }

    pub fn with_local(mut self, local_name: impl Into<String>) -> Self {
        self.local_name = Some(local_name.into());
        self
    }

    fn label(&self) -> String {
        match &self.local_name {
            Some(local) => format!("{}({})", self.display_name, local),
            None => self.display_name.clone(),
        }
    }
}

/// 按规则顺序匹配关键字：全局名、本地名（均忽略大小写的精确匹配），
/// 最后是显示名前缀。每条规则依次扫描全部关键字，先命中者胜出。
pub fn match_keyword<'a>(input: &str, keywords: &'a [Keyword]) -> Option<&'a Keyword> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    let lowered = input.to_lowercase();

    keywords
        .iter()
        .find(|keyword| keyword.global_name.eq_ignore_ascii_case(input))
        .or_else(|| {
            keywords.iter().find(|keyword| {
                keyword
                    .local_name
                    .as_deref()
                    .is_some_and(|local| local.eq_ignore_ascii_case(input))
            })
        })
        .or_else(|| {
            keywords
                .iter()
                .find(|keyword| keyword.display_name.to_lowercase().starts_with(&lowered))
        })
}

/// 宿主推送给引擎的输入事件。
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// 指针点击，已换算为世界坐标。
    Point(Point2),
    /// 回车提交的一行文本。
    Text(String),
    /// 指针移动。
    Hover(Point2),
    /// 尚未提交的输入内容。
    Typing(String),
    Cancel,
}

/// 事件来源。返回 `None` 表示输入流已结束。
pub trait InputSource {
    fn next_event(&mut self) -> Option<InputEvent>;
}

/// 预先排好的事件队列，脚本回放与测试使用。
#[derive(Debug, Default, Clone)]
pub struct ScriptedInput {
    events: VecDeque<InputEvent>,
}

impl ScriptedInput {
    pub fn new(events: impl IntoIterator<Item = InputEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }
}

impl InputSource for ScriptedInput {
    fn next_event(&mut self) -> Option<InputEvent> {
        self.events.pop_front()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStatus {
    Ok,
    Keyword,
    None,
    Cancel,
    Error,
}

/// 一次提示的结果。
#[derive(Debug, Clone, PartialEq)]
pub enum PromptResult<T> {
    Ok(T),
    /// 命中关键字的 `global_name`。
    Keyword(String),
    /// 允许空响应时的空回车。
    None,
    Cancel,
    Error(String),
}

/// 命令代码消费提示结果时的简化形式：取消与错误已转为 `Err`。
#[derive(Debug, Clone, PartialEq)]
pub enum Reply<T> {
    Value(T),
    Keyword(String),
    Done,
}

impl<T> PromptResult<T> {
    pub fn status(&self) -> PromptStatus {
        match self {
            PromptResult::Ok(_) => PromptStatus::Ok,
            PromptResult::Keyword(_) => PromptStatus::Keyword,
            PromptResult::None => PromptStatus::None,
            PromptResult::Cancel => PromptStatus::Cancel,
            PromptResult::Error(_) => PromptStatus::Error,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> PromptResult<U> {
        match self {
            PromptResult::Ok(value) => PromptResult::Ok(f(value)),
            PromptResult::Keyword(keyword) => PromptResult::Keyword(keyword),
            PromptResult::None => PromptResult::None,
            PromptResult::Cancel => PromptResult::Cancel,
            PromptResult::Error(message) => PromptResult::Error(message),
        }
    }

    pub fn reply(self) -> Result<Reply<T>, EngineError> {
        match self {
            PromptResult::Ok(value) => Ok(Reply::Value(value)),
            PromptResult::Keyword(keyword) => Ok(Reply::Keyword(keyword)),
            PromptResult::None => Ok(Reply::Done),
            PromptResult::Cancel => Err(EngineError::Cancelled),
            PromptResult::Error(_) => Err(EngineError::InputClosed),
        }
    }
}

/// 提示参数。通过链式方法构造。
#[derive(Debug, Clone)]
pub struct PromptOptions {
    pub message: String,
    pub base_point: Option<Point2>,
    pub keywords: Vec<Keyword>,
    pub allow_none: bool,
    pub allow_negative: bool,
    pub ignore_preselection: bool,
    pub jig: Option<Jig>,
}

impl PromptOptions {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            base_point: None,
            keywords: Vec::new(),
            allow_none: false,
            allow_negative: false,
            ignore_preselection: false,
            jig: None,
        }
    }

    pub fn base(mut self, point: Point2) -> Self {
        self.base_point = Some(point);
        self
    }

    pub fn keyword(mut self, keyword: Keyword) -> Self {
        self.keywords.push(keyword);
        self
    }

    pub fn allow_none(mut self) -> Self {
        self.allow_none = true;
        self
    }

    pub fn allow_negative(mut self) -> Self {
        self.allow_negative = true;
        self
    }

    pub fn ignore_preselection(mut self) -> Self {
        self.ignore_preselection = true;
        self
    }

    pub fn jig(mut self, jig: Jig) -> Self {
        self.jig = Some(jig);
        self
    }

    /// 生成命令行提示文本，例如 `指定下一点 [Close(C)/Undo(U)]: `。
    pub fn render(&self, suffix: &str) -> String {
        if self.keywords.is_empty() {
            return format!("{}{}", self.message, suffix);
        }
        let labels: Vec<String> = self.keywords.iter().map(Keyword::label).collect();
        format!("{} [{}]{}", self.message, labels.join("/"), suffix)
    }
}

/// 原始输入值，由具体提示类型进一步解析。
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Point(Point2),
    Text(String),
}

/// 单个事件的分类结果。
#[derive(Debug, Clone, PartialEq)]
pub enum Classified {
    Cancel,
    None,
    Keyword(String),
    Value(RawValue),
    /// 指针或未提交文本，只用于刷新预览。
    Preview(RawValue),
    /// 空回车但当前提示不接受空响应。
    Empty,
}

/// 按固定顺序分类事件：取消、空回车、关键字、值、预览。
pub fn classify(event: InputEvent, keywords: &[Keyword], allow_none: bool) -> Classified {
    match event {
        InputEvent::Cancel => Classified::Cancel,
        InputEvent::Point(point) => Classified::Value(RawValue::Point(point)),
        InputEvent::Hover(point) => Classified::Preview(RawValue::Point(point)),
        InputEvent::Typing(text) => Classified::Preview(RawValue::Text(text)),
        InputEvent::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return if allow_none {
                    Classified::None
                } else {
                    Classified::Empty
                };
            }
            match match_keyword(trimmed, keywords) {
                Some(keyword) => Classified::Keyword(keyword.global_name.clone()),
                None => Classified::Value(RawValue::Text(trimmed.to_string())),
            }
        }
    }
}
