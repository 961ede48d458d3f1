use tracing::warn;
use zedit_core::document::EntityId;
use zedit_core::geometry::{Point2, Vector2};
use zedit_core::ops::apply_displacement;

use super::keyword;
use super::modify::{point, snapshot};
use crate::command::CommandHandler;
use crate::engine::CommandEngine;
use crate::errors::EngineError;
use crate::input::{PromptOptions, Reply};
use crate::jig::Jig;

/// 复制命令。每个第二点生成一批副本，可逐批放弃。
pub struct CopyCommand;

impl CommandHandler for CopyCommand {
    fn name(&self) -> &'static str {
        "COPY"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["CO", "CP"]
    }

    fn run(&self, engine: &mut CommandEngine<'_>) -> Result<(), EngineError> {
        let ids = match engine.get_selection(PromptOptions::new("选择对象")).reply()? {
            Reply::Value(ids) => ids,
            Reply::Keyword(_) | Reply::Done => {
                engine.respond("未选择对象");
                return Ok(());
            }
        };

        let Some(base) = point(engine, PromptOptions::new("指定基点"))? else {
            return Ok(());
        };

        let mut batches: Vec<Vec<EntityId>> = Vec::new();
        let result = place_copies(engine, &ids, base, &mut batches);

        let created: Vec<EntityId> = batches.into_iter().flatten().collect();
        if !created.is_empty() {
            engine.scene_mut().record_add("COPY", &created);
        }
        result
    }
}

fn place_copies(
    engine: &mut CommandEngine<'_>,
    ids: &[EntityId],
    base: Point2,
    batches: &mut Vec<Vec<EntityId>>,
) -> Result<(), EngineError> {
    let sources = snapshot(engine, ids);
    loop {
        engine.poll_cancel()?;
        let mut options = PromptOptions::new("指定第二个点")
            .base(base)
            .allow_none()
            .jig(Jig::Displacement {
                base,
                entities: sources.clone(),
            });
        if !batches.is_empty() {
            options = options.keyword(keyword("Undo", "UNDO", "U"));
        }

        match engine.get_point(options).reply()? {
            Reply::Value(target) => {
                let batch = copy_batch(engine, ids, target - base)?;
                batches.push(batch);
            }
            Reply::Keyword(name) if name == "UNDO" => {
                if let Some(batch) = batches.pop() {
                    for id in batch {
                        engine.scene_mut().delete_entity(id);
                    }
                }
            }
            Reply::Keyword(_) => {}
            Reply::Done => return Ok(()),
        }
    }
}

fn copy_batch(
    engine: &mut CommandEngine<'_>,
    ids: &[EntityId],
    delta: Vector2,
) -> Result<Vec<EntityId>, EngineError> {
    let mut batch = Vec::with_capacity(ids.len());
    for id in ids {
        let copy = engine.scene_mut().clone_entity(*id)?;
        let displaced = match engine.scene_mut().document_mut().entity_mut(copy) {
            Some(entity) => apply_displacement(entity, delta),
            None => continue,
        };
        match displaced {
            Ok(()) => batch.push(copy),
            Err(err) => {
                warn!(id = id.get(), %err, "实体无法复制");
                engine.scene_mut().delete_entity(copy);
                engine.report_error(&format!("无法复制对象 {id}: {err}"));
            }
        }
    }
    Ok(batch)
}
