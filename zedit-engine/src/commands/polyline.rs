use zedit_core::document::{Entity, Geometry, Polyline};
use zedit_core::geometry::Point2;

use super::{COINCIDENT, keyword};
use crate::command::CommandHandler;
use crate::engine::CommandEngine;
use crate::errors::EngineError;
use crate::input::{PromptOptions, Reply};
use crate::jig::Jig;

/// 多段线命令。顶点只在预览中累积，退出时一次性生成实体。
pub struct PolylineCommand;

impl CommandHandler for PolylineCommand {
    fn name(&self) -> &'static str {
        "PLINE"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["PL", "POLYLINE"]
    }

    fn run(&self, engine: &mut CommandEngine<'_>) -> Result<(), EngineError> {
        let mut points = Vec::new();
        let mut closed = false;
        let result = collect(engine, &mut points, &mut closed);

        if points.len() >= 2 {
            let polyline = Polyline::from_points(points, closed);
            let id = engine
                .scene_mut()
                .add_entity(Entity::new(Geometry::Polyline(polyline)));
            engine.scene_mut().record_add("PLINE", &[id]);
        }
        result
    }
}

fn collect(
    engine: &mut CommandEngine<'_>,
    points: &mut Vec<Point2>,
    closed: &mut bool,
) -> Result<(), EngineError> {
    loop {
        engine.poll_cancel()?;
        let Some(last) = points.last().copied() else {
            match engine.get_point(PromptOptions::new("指定起点")).reply()? {
                Reply::Value(point) => {
                    points.push(point);
                    engine.scene_mut().add_drawing_point(point);
                }
                Reply::Keyword(_) => {}
                Reply::Done => return Ok(()),
            }
            continue;
        };

        let mut options = PromptOptions::new("指定下一个点")
            .base(last)
            .allow_none()
            .jig(Jig::Polyline {
                points: points.clone(),
            });
        if points.len() >= 2 {
            options = options.keyword(keyword("Close", "CLOSE", "C"));
        }
        options = options.keyword(keyword("Undo", "UNDO", "U"));

        match engine.get_point(options).reply()? {
            Reply::Value(point) => {
                if point.distance(last) <= COINCIDENT {
                    engine.report_error("与上一点重合，已忽略");
                    continue;
                }
                points.push(point);
                engine.scene_mut().add_drawing_point(point);
            }
            Reply::Keyword(name) if name == "CLOSE" => {
                *closed = true;
                return Ok(());
            }
            Reply::Keyword(name) if name == "UNDO" => {
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
