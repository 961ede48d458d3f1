use tracing::debug;
use zedit_core::document::{EntityId, Geometry};
use zedit_core::ops::{distance_to_entity, offset};

use super::keyword;
use crate::command::CommandHandler;
use crate::engine::CommandEngine;
use crate::errors::EngineError;
use crate::input::{PromptOptions, Reply};
use crate::jig::Jig;

/// 偏移命令。距离与“通过”模式保存在会话变量中，下次运行作为默认值。
pub struct OffsetCommand;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Mode {
    Distance(f64),
    Through,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum State {
    AwaitDistanceOrMode,
    SelectEntity(Mode),
    AwaitSideOrThrough(Mode, EntityId),
}

impl CommandHandler for OffsetCommand {
    fn name(&self) -> &'static str {
        "OFFSET"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["O"]
    }

    fn run(&self, engine: &mut CommandEngine<'_>) -> Result<(), EngineError> {
        let mut state = State::AwaitDistanceOrMode;
        loop {
            engine.poll_cancel()?;
            state = match state {
                State::AwaitDistanceOrMode => match distance_or_mode(engine)? {
                    Some(mode) => State::SelectEntity(mode),
                    None => return Ok(()),
                },
                State::SelectEntity(mode) => match select_source(engine)? {
                    Some(id) => State::AwaitSideOrThrough(mode, id),
                    None => return Ok(()),
                },
                State::AwaitSideOrThrough(mode, id) => {
                    if !place_offset(engine, mode, id)? {
                        return Ok(());
                    }
                    engine.scene_mut().clear_highlight();
                    State::SelectEntity(mode)
                }
            };
        }
    }
}

fn distance_or_mode(engine: &mut CommandEngine<'_>) -> Result<Option<Mode>, EngineError> {
    let session = engine.scene().session().clone();
    let default = if session.offset_through {
        Some(Mode::Through)
    } else {
        session.offset_distance.map(Mode::Distance)
    };
    let message = match default {
        Some(Mode::Through) => "指定偏移距离 <通过>".to_string(),
        Some(Mode::Distance(distance)) => format!("指定偏移距离 <{distance}>"),
        None => "指定偏移距离".to_string(),
    };

    loop {
        engine.poll_cancel()?;
        let mut options =
            PromptOptions::new(message.clone()).keyword(keyword("Through", "THROUGH", "T"));
        if default.is_some() {
            options = options.allow_none();
        }
        match engine.get_distance(options).reply()? {
            Reply::Value(distance) => {
                if distance <= 0.0 {
                    engine.report_error("偏移距离必须大于零");
                    continue;
                }
                let session = engine.scene_mut().session_mut();
                session.offset_distance = Some(distance);
                session.offset_through = false;
                return Ok(Some(Mode::Distance(distance)));
            }
            Reply::Keyword(name) if name == "THROUGH" => {
                engine.scene_mut().session_mut().offset_through = true;
                return Ok(Some(Mode::Through));
            }
            Reply::Keyword(_) => {}
            Reply::Done => return Ok(default),
        }
    }
}

fn select_source(engine: &mut CommandEngine<'_>) -> Result<Option<EntityId>, EngineError> {
    loop {
        engine.poll_cancel()?;
        let options = PromptOptions::new("选择要偏移的对象")
            .keyword(keyword("Exit", "EXIT", "E"))
            .allow_none();
        let id = match engine.get_entity(options).reply()? {
            Reply::Value((id, _)) => id,
            Reply::Keyword(_) | Reply::Done => return Ok(None),
        };

        let Some(entity) = engine.scene().entity(id) else {
            continue;
        };
        if !matches!(
            entity.geometry,
            Geometry::Line(_) | Geometry::Circle(_) | Geometry::Arc(_) | Geometry::Polyline(_)
        ) {
            engine.report_error("无法偏移该对象");
            continue;
        }
        if engine.scene().is_layer_locked(&entity.layer) {
            engine.report_error("该对象位于锁定的图层上");
            continue;
        }

        engine.scene_mut().highlight_entities(&[id]);
        return Ok(Some(id));
    }
}

/// 返回 `false` 表示用户结束了命令。
fn place_offset(
    engine: &mut CommandEngine<'_>,
    mode: Mode,
    id: EntityId,
) -> Result<bool, EngineError> {
    let Some(source) = engine.scene().entity(id).cloned() else {
        return Ok(true);
    };
    let (message, distance) = match mode {
        Mode::Distance(distance) => ("指定要偏移的那一侧上的点", Some(distance)),
        Mode::Through => ("指定通过点", None),
    };
    let options = PromptOptions::new(message)
        .keyword(keyword("Exit", "EXIT", "E"))
        .allow_none()
        .jig(Jig::Offset {
            entity: source.clone(),
            distance,
        });

    let side = match engine.get_point(options).reply()? {
        Reply::Value(point) => point,
        Reply::Keyword(_) | Reply::Done => return Ok(false),
    };

    let Some(distance) = distance.or_else(|| distance_to_entity(&source, side)) else {
        engine.report_error("无法确定偏移距离");
        return Ok(true);
    };
    match offset(&source, distance, side) {
        Ok(entity) => {
            let created = engine.scene_mut().add_entity(entity);
            engine.scene_mut().record_add("OFFSET", &[created]);
            debug!(source = id.get(), created = created.get(), distance, "已偏移");
        }
        Err(err) => engine.report_error(&format!("无法偏移: {err}")),
    }
    Ok(true)
}
