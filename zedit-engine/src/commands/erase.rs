use super::editable;
use crate::command::CommandHandler;
use crate::engine::CommandEngine;
use crate::errors::EngineError;
use crate::input::{PromptOptions, Reply};

pub struct EraseCommand;

impl CommandHandler for EraseCommand {
    fn name(&self) -> &'static str {
        "ERASE"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["E"]
    }

    fn run(&self, engine: &mut CommandEngine<'_>) -> Result<(), EngineError> {
        let ids = match engine.get_selection(PromptOptions::new("选择对象")).reply()? {
            Reply::Value(ids) => ids,
            Reply::Keyword(_) | Reply::Done => {
                engine.respond("未选择对象");
                return Ok(());
            }
        };
        let ids = editable(engine, ids);
        if ids.is_empty() {
            return Ok(());
        }

        let removed = engine.scene_mut().delete_entities(&ids);
        let count = removed.len();
        engine.scene_mut().record_delete("ERASE", removed);
        engine.respond(&format!("已删除 {count} 个对象"));
        Ok(())
    }
}
