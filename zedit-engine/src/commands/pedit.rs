use tracing::debug;
use zedit_core::document::{EntityId, Geometry, Polyline};
use zedit_core::errors::GeometryError;
use zedit_core::ops::{
    delete_vertex, insert_vertex, join_by_proximity, move_vertex, nearest_segment,
    nearest_vertex, reverse_polyline,
};

use super::keyword;
use super::modify::point;
use crate::command::CommandHandler;
use crate::engine::CommandEngine;
use crate::errors::EngineError;
use crate::input::{PromptOptions, Reply};
use crate::jig::Jig;
use crate::undo::EntityChange;

/// 多段线编辑。本次会话内的每个子操作各记录一条撤销项，`Undo` 逐条回退。
pub struct PeditCommand;

/// `recorded` 是本次会话写入撤销日志的条目数。
#[derive(Debug)]
struct Session {
    target: EntityId,
    recorded: usize,
}

impl CommandHandler for PeditCommand {
    fn name(&self) -> &'static str {
        "PEDIT"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["PE"]
    }

    fn run(&self, engine: &mut CommandEngine<'_>) -> Result<(), EngineError> {
        let Some(mut session) = select_target(engine)? else {
            return Ok(());
        };

        loop {
            engine.poll_cancel()?;
            let Some(is_closed) = current(engine, session.target).map(|polyline| polyline.is_closed)
            else {
                engine.respond("对象已不是多段线");
                return Ok(());
            };

            let mut options = PromptOptions::new("输入选项").allow_none();
            options = if is_closed {
                options.keyword(keyword("Open", "OPEN", "O"))
            } else {
                options.keyword(keyword("Close", "CLOSE", "C"))
            };
            options = options
                .keyword(keyword("Join", "JOIN", "J"))
                .keyword(keyword("Edit", "EDIT", "E"))
                .keyword(keyword("Reverse", "REVERSE", "R"));
            if session.recorded > 0 {
                options = options.keyword(keyword("Undo", "UNDO", "U"));
            }
            options = options.keyword(keyword("eXit", "EXIT", "X"));

            let name = match engine.get_keyword(options).reply()? {
                Reply::Keyword(name) => name,
                Reply::Value(()) | Reply::Done => return Ok(()),
            };
            match name.as_str() {
                "CLOSE" | "OPEN" => {
                    let closing = name == "CLOSE";
                    modify(engine, &mut session, "PEDIT", |polyline| {
                        polyline.is_closed = closing;
                        Ok(())
                    })?;
                }
                "REVERSE" => {
                    modify(engine, &mut session, "PEDIT", |polyline| {
                        *polyline = reverse_polyline(polyline);
                        Ok(())
                    })?;
                }
                "JOIN" => join(engine, &mut session)?,
                "EDIT" => edit_vertices(engine, &mut session)?,
                "UNDO" => {
                    if let Some(label) = engine.scene_mut().undo() {
                        session.recorded = session.recorded.saturating_sub(1);
                        engine.respond(&format!("已撤销: {label}"));
                    }
                }
                _ => return Ok(()),
            }
        }
    }
}

fn current(engine: &CommandEngine<'_>, id: EntityId) -> Option<Polyline> {
    engine.scene().entity(id)?.as_polyline().cloned()
}

fn select_target(engine: &mut CommandEngine<'_>) -> Result<Option<Session>, EngineError> {
    loop {
        engine.poll_cancel()?;
        let options = PromptOptions::new("选择多段线").allow_none();
        let id = match engine.get_entity(options).reply()? {
            Reply::Value((id, _)) => id,
            Reply::Keyword(_) | Reply::Done => return Ok(None),
        };

        if engine.scene().is_entity_locked(id) {
            engine.report_error("该对象位于锁定的图层上");
            continue;
        }
        let Some(entity) = engine.scene().entity(id).cloned() else {
            continue;
        };
        engine.scene_mut().highlight_entities(&[id]);

        match &entity.geometry {
            Geometry::Polyline(_) => {
                return Ok(Some(Session {
                    target: id,
                    recorded: 0,
                }));
            }
            Geometry::Line(line) => {
                if !confirm_conversion(engine)? {
                    return Ok(None);
                }
                let polyline = Polyline::from_points([line.start, line.end], false);
                let after = entity.with_geometry(Geometry::Polyline(polyline));
                engine.scene_mut().replace_entity(id, after.clone())?;
                engine.scene_mut().record_modify(
                    "PEDIT",
                    vec![EntityChange {
                        id,
                        before: entity,
                        after,
                    }],
                );
                engine.respond("直线已转换为多段线");
                return Ok(Some(Session {
                    target: id,
                    recorded: 1,
                }));
            }
            _ => {
                engine.scene_mut().clear_highlight();
                engine.report_error("选定的对象不是多段线");
            }
        }
    }
}

fn confirm_conversion(engine: &mut CommandEngine<'_>) -> Result<bool, EngineError> {
    let options = PromptOptions::new("选定的对象不是多段线，是否将其转换为多段线? <Y>")
        .keyword(keyword("Yes", "YES", "Y"))
        .keyword(keyword("No", "NO", "N"))
        .allow_none();
    match engine.get_keyword(options).reply()? {
        Reply::Keyword(name) => Ok(name == "YES"),
        Reply::Value(()) | Reply::Done => Ok(true),
    }
}

/// 修改目标多段线并记录一条撤销项。几何错误只提示，不中断命令。
fn modify(
    engine: &mut CommandEngine<'_>,
    session: &mut Session,
    label: &str,
    edit: impl FnOnce(&mut Polyline) -> Result<(), GeometryError>,
) -> Result<(), EngineError> {
    let id = session.target;
    let before = engine
        .scene()
        .entity(id)
        .cloned()
        .ok_or(EngineError::EntityNotFound(id.get()))?;
    let Some(mut polyline) = before.as_polyline().cloned() else {
        return Ok(());
    };
    if let Err(err) = edit(&mut polyline) {
        engine.report_error(&err.to_string());
        return Ok(());
    }
    let after = before.with_geometry(Geometry::Polyline(polyline));
    if after == before {
        return Ok(());
    }
    engine.scene_mut().replace_entity(id, after.clone())?;
    engine
        .scene_mut()
        .record_modify(label, vec![EntityChange { id, before, after }]);
    session.recorded += 1;
    Ok(())
}

fn join(engine: &mut CommandEngine<'_>, session: &mut Session) -> Result<(), EngineError> {
    let id = session.target;
    let ids = match engine
        .get_selection(PromptOptions::new("选择要合并的对象").ignore_preselection())
        .reply()?
    {
        Reply::Value(ids) => ids,
        Reply::Keyword(_) | Reply::Done => return Ok(()),
    };

    let mut candidates: Vec<(EntityId, Polyline)> = Vec::new();
    for candidate in ids {
        if candidate == id || engine.scene().is_entity_locked(candidate) {
            continue;
        }
        let Some(entity) = engine.scene().entity(candidate) else {
            continue;
        };
        match &entity.geometry {
            Geometry::Line(line) => candidates.push((
                candidate,
                Polyline::from_points([line.start, line.end], false),
            )),
            Geometry::Polyline(polyline) if !polyline.is_closed => {
                candidates.push((candidate, polyline.clone()));
            }
            _ => {}
        }
    }

    let before = engine
        .scene()
        .entity(id)
        .cloned()
        .ok_or(EngineError::EntityNotFound(id.get()))?;
    let Some(mut merged) = before.as_polyline().cloned() else {
        return Ok(());
    };

    let tolerance = engine.settings().join_tolerance;
    let mut joined: Vec<EntityId> = Vec::new();
    loop {
        let mut progressed = false;
        for (candidate, polyline) in &candidates {
            if joined.contains(candidate) {
                continue;
            }
            if join_by_proximity(&mut merged, polyline, tolerance) {
                joined.push(*candidate);
                progressed = true;
            }
        }
        if !progressed {
            break;
        }
    }

    if joined.is_empty() {
        engine.respond("没有可合并的对象");
        return Ok(());
    }

    let after = before.with_geometry(Geometry::Polyline(merged));
    let removed = engine.scene_mut().delete_entities(&joined);
    engine.scene_mut().replace_entity(id, after.clone())?;
    engine
        .scene_mut()
        .record_join("PEDIT", EntityChange { id, before, after }, removed);
    session.recorded += 1;

    debug!(target = id.get(), joined = joined.len(), "已合并多段线");
    engine.respond(&format!("已将 {} 个对象合并到多段线", joined.len()));
    Ok(())
}

fn edit_vertices(engine: &mut CommandEngine<'_>, session: &mut Session) -> Result<(), EngineError> {
    loop {
        engine.poll_cancel()?;
        let options = PromptOptions::new("输入顶点编辑选项")
            .keyword(keyword("Insert", "INSERT", "I"))
            .keyword(keyword("Move", "MOVE", "M"))
            .keyword(keyword("Delete", "DELETE", "D"))
            .keyword(keyword("eXit", "EXIT", "X"))
            .allow_none();
        let name = match engine.get_keyword(options).reply()? {
            Reply::Keyword(name) => name,
            Reply::Value(()) | Reply::Done => return Ok(()),
        };
        let Some(polyline) = current(engine, session.target) else {
            return Ok(());
        };

        match name.as_str() {
            "INSERT" => {
                let Some(at) = point(engine, PromptOptions::new("指定新顶点的位置"))? else {
                    continue;
                };
                let Some(segment) = nearest_segment(&polyline, at) else {
                    continue;
                };
                modify(engine, session, "PEDIT", |polyline| {
                    insert_vertex(polyline, segment + 1, at)
                })?;
            }
            "MOVE" => {
                let Some(pick) = point(engine, PromptOptions::new("选择要移动的顶点"))? else {
                    continue;
                };
                let Some(index) = nearest_vertex(&polyline, pick) else {
                    continue;
                };
                let from = polyline.vertices[index].position;
                let options = PromptOptions::new("指定顶点的新位置")
                    .base(from)
                    .jig(Jig::Line { from });
                let Some(to) = point(engine, options)? else {
                    continue;
                };
                modify(engine, session, "PEDIT", |polyline| {
                    move_vertex(polyline, index, to)
                })?;
            }
            "DELETE" => {
                let Some(pick) = point(engine, PromptOptions::new("选择要删除的顶点"))? else {
                    continue;
                };
                let Some(index) = nearest_vertex(&polyline, pick) else {
                    continue;
                };
                modify(engine, session, "PEDIT", |polyline| delete_vertex(polyline, index))?;
            }
            _ => return Ok(()),
        }
    }
}
