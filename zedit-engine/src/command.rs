use std::collections::HashMap;

use tracing::{info, warn};

use crate::commands;
use crate::console::Severity;
use crate::engine::CommandEngine;
use crate::errors::EngineError;

/// 命令执行结束后的状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Completed,
    Cancelled,
    Failed,
    Unknown,
}

pub trait CommandHandler: Send + Sync {
    /// 规范命令名（大写）。
    fn name(&self) -> &'static str;

    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    fn run(&self, engine: &mut CommandEngine<'_>) -> Result<(), EngineError>;
}

/// 命令注册表：名称与别名均不区分大小写。
pub struct CommandRegistry {
    handlers: Vec<Box<dyn CommandHandler>>,
    lookup: HashMap<String, usize>,
}

impl CommandRegistry {
    /// 空注册表。
    pub fn empty() -> Self {
        Self {
            handlers: Vec::new(),
            lookup: HashMap::new(),
        }
    }

    /// 注册内置的全部命令。
    pub fn new() -> Self {
        let mut registry = Self::empty();
        commands::register_defaults(&mut registry);
        registry
    }

    pub fn register<H: CommandHandler + 'static>(&mut self, handler: H) {
        let index = self.handlers.len();
        for key in std::iter::once(handler.name()).chain(handler.aliases().iter().copied()) {
            if let Some(previous) = self.lookup.insert(key.to_ascii_uppercase(), index) {
                warn!(key, previous, "命令名或别名被覆盖");
            }
        }
        self.handlers.push(Box::new(handler));
    }

    pub fn resolve(&self, name: &str) -> Option<&dyn CommandHandler> {
        let index = self.lookup.get(&name.trim().to_ascii_uppercase())?;
        self.handlers.get(*index).map(|handler| handler.as_ref())
    }

    /// 执行命令。无论成功、取消还是出错，结束后都会清理预览、高亮与选择集。
    pub fn execute(&self, name: &str, engine: &mut CommandEngine<'_>) -> CommandOutcome {
        let Some(handler) = self.resolve(name) else {
            engine.report_error(&format!("未知命令: {}", name.trim()));
            return CommandOutcome::Unknown;
        };

        info!(command = handler.name(), "执行命令");
        engine.cancel_token().reset();
        engine.print(handler.name(), Severity::Command);

        let result = handler.run(engine);
        engine.cleanup();

        match result {
            Ok(()) => CommandOutcome::Completed,
            Err(EngineError::Cancelled) => {
                engine.respond("*取消*");
                CommandOutcome::Cancelled
            }
            Err(err) => {
                warn!(command = handler.name(), %err, "命令执行失败");
                engine.report_error(&err.to_string());
                CommandOutcome::Failed
            }
        }
    }

    pub fn available_commands(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.iter().map(|handler| handler.name())
    }

    /// 以 `prefix` 开头的命令名与别名，按字母排序。
    pub fn complete(&self, prefix: &str) -> Vec<String> {
        let prefix = prefix.trim().to_ascii_uppercase();
        let mut matches: Vec<String> = self
            .lookup
            .keys()
            .filter(|key| key.starts_with(&prefix))
            .cloned()
            .collect();
        matches.sort();
        matches
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}
