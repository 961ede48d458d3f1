use tracing::warn;
use zedit_core::document::{Entity, EntityId};
use zedit_core::geometry::Point2;
use zedit_core::ops::apply_displacement;

use super::editable;
use crate::command::CommandHandler;
use crate::engine::CommandEngine;
use crate::errors::EngineError;
use crate::input::{PromptOptions, Reply};
use crate::jig::Jig;

pub struct MoveCommand;

impl CommandHandler for MoveCommand {
    fn name(&self) -> &'static str {
        "MOVE"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["M"]
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

        let Some(base) = point(engine, PromptOptions::new("指定基点"))? else {
            return Ok(());
        };
        let options = PromptOptions::new("指定第二个点")
            .base(base)
            .jig(Jig::Displacement {
                base,
                entities: snapshot(engine, &ids),
            });
        let Some(target) = point(engine, options)? else {
            return Ok(());
        };

        let delta = target - base;
        let mut moved = Vec::with_capacity(ids.len());
        for id in ids {
            let Some(entity) = engine.scene_mut().document_mut().entity_mut(id) else {
                continue;
            };
            match apply_displacement(entity, delta) {
                Ok(()) => moved.push(id),
                Err(err) => {
                    warn!(id = id.get(), %err, "实体无法移动");
                    engine.report_error(&format!("无法移动对象 {id}: {err}"));
                }
            }
        }

        let count = moved.len();
        engine.scene_mut().record_move("MOVE", moved, delta);
        engine.respond(&format!("已移动 {count} 个对象"));
        Ok(())
    }
}

/// 当前实体内容的副本，供位移预览使用。
pub(super) fn snapshot(engine: &CommandEngine<'_>, ids: &[EntityId]) -> Vec<Entity> {
    ids.iter()
        .filter_map(|id| engine.scene().entity(*id).cloned())
        .collect()
}

pub(super) fn point(
    engine: &mut CommandEngine<'_>,
    options: PromptOptions,
) -> Result<Option<Point2>, EngineError> {
    loop {
        engine.poll_cancel()?;
        match engine.get_point(options.clone()).reply()? {
            Reply::Value(point) => return Ok(Some(point)),
            Reply::Keyword(_) => continue,
            Reply::Done => return Ok(None),
        }
    }
}
