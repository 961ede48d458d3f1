use zedit_core::document::{Entity, EntityId, Geometry, Line};
use zedit_core::geometry::Point2;

use super::{COINCIDENT, keyword};
use crate::command::CommandHandler;
use crate::engine::CommandEngine;
use crate::errors::EngineError;
use crate::input::{PromptOptions, Reply};
use crate::jig::Jig;

pub struct LineCommand;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    AwaitFirstPoint,
    AwaitNextPoint,
}

impl CommandHandler for LineCommand {
    fn name(&self) -> &'static str {
        "LINE"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["L"]
    }

    fn run(&self, engine: &mut CommandEngine<'_>) -> Result<(), EngineError> {
        let mut segments = Vec::new();
        let result = draw(engine, &mut segments);
        if !segments.is_empty() {
            engine.scene_mut().record_add("LINE", &segments);
        }
        result
    }
}

fn draw(engine: &mut CommandEngine<'_>, segments: &mut Vec<EntityId>) -> Result<(), EngineError> {
    let mut points: Vec<Point2> = Vec::new();
    let mut state = State::AwaitFirstPoint;

    loop {
        engine.poll_cancel()?;
        match state {
            State::AwaitFirstPoint => {
                match engine.get_point(PromptOptions::new("指定第一个点")).reply()? {
                    Reply::Value(point) => {
                        points.push(point);
                        engine.scene_mut().add_drawing_point(point);
                        state = State::AwaitNextPoint;
                    }
                    Reply::Keyword(_) => {}
                    Reply::Done => return Ok(()),
                }
            }
            State::AwaitNextPoint => {
                let Some(last) = points.last().copied() else {
                    state = State::AwaitFirstPoint;
                    continue;
                };
                let mut options = PromptOptions::new("指定下一点")
                    .base(last)
                    .allow_none()
                    .jig(Jig::Line { from: last });
                if points.len() >= 2 {
                    options = options.keyword(keyword("Close", "CLOSE", "C"));
                }
                options = options.keyword(keyword("Undo", "UNDO", "U"));

                match engine.get_point(options).reply()? {
                    Reply::Value(point) => {
                        if point.distance(last) <= COINCIDENT {
                            engine.report_error("零长度线段被忽略");
                            continue;
                        }
                        segments.push(add_segment(engine, last, point));
                        points.push(point);
                        engine.scene_mut().add_drawing_point(point);
                    }
                    Reply::Keyword(name) if name == "CLOSE" => {
                        segments.push(add_segment(engine, last, points[0]));
                        return Ok(());
                    }
                    Reply::Keyword(name) if name == "UNDO" => {
                        let segment = if points.len() > 1 { segments.pop() } else { None };
                        if let Some(id) = segment {
                            engine.scene_mut().delete_entity(id);
                        }
                        points.pop();
                        engine.scene_mut().pop_drawing_point();
                        if points.is_empty() {
                            return Ok(());
                        }
                    }
                    Reply::Keyword(_) => {}
                    Reply::Done => return Ok(()),
                }
            }
        }
    }
}

fn add_segment(engine: &mut CommandEngine<'_>, start: Point2, end: Point2) -> EntityId {
    engine
        .scene_mut()
        .add_entity(Entity::new(Geometry::Line(Line { start, end })))
}
