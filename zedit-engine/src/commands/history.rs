use crate::command::CommandHandler;
use crate::console::Severity;
use crate::engine::CommandEngine;
use crate::errors::EngineError;

pub struct UndoCommand;

impl CommandHandler for UndoCommand {
    fn name(&self) -> &'static str {
        "UNDO"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["U"]
    }

    fn run(&self, engine: &mut CommandEngine<'_>) -> Result<(), EngineError> {
        match engine.scene_mut().undo() {
            Some(label) => engine.print(&format!("已撤销: {label}"), Severity::Success),
            None => engine.respond("没有可撤销的操作"),
        }
        Ok(())
    }
}

pub struct RedoCommand;

impl CommandHandler for RedoCommand {
    fn name(&self) -> &'static str {
        "REDO"
    }

    fn run(&self, engine: &mut CommandEngine<'_>) -> Result<(), EngineError> {
        match engine.scene_mut().redo() {
            Some(label) => engine.print(&format!("已重做: {label}"), Severity::Success),
            None => engine.respond("没有可重做的操作"),
        }
        Ok(())
    }
}
