use zedit_core::document::{Entity, Geometry, Polyline};
use zedit_core::geometry::{Point2, Vector2};
use zedit_core::ops::rectangle_corners;

use super::{COINCIDENT, keyword};
use crate::command::CommandHandler;
use crate::engine::CommandEngine;
use crate::errors::EngineError;
use crate::input::{PromptOptions, Reply};
use crate::jig::Jig;

/// 矩形命令，结果是一条闭合的四顶点多段线。
pub struct RectangleCommand;

impl CommandHandler for RectangleCommand {
    fn name(&self) -> &'static str {
        "RECTANG"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["REC", "RECTANGLE"]
    }

    fn run(&self, engine: &mut CommandEngine<'_>) -> Result<(), EngineError> {
        let first = loop {
            engine.poll_cancel()?;
            match engine.get_point(PromptOptions::new("指定第一个角点")).reply()? {
                Reply::Value(point) => break point,
                Reply::Keyword(_) => continue,
                Reply::Done => return Ok(()),
            }
        };
        engine.scene_mut().add_drawing_point(first);

        let Some(opposite) = other_corner(engine, first)? else {
            return Ok(());
        };

        let polyline = Polyline::from_points(rectangle_corners(first, opposite), true);
        let id = engine
            .scene_mut()
            .add_entity(Entity::new(Geometry::Polyline(polyline)));
        engine.scene_mut().record_add("RECTANG", &[id]);
        Ok(())
    }
}

fn other_corner(
    engine: &mut CommandEngine<'_>,
    first: Point2,
) -> Result<Option<Point2>, EngineError> {
    loop {
        engine.poll_cancel()?;
        let options = PromptOptions::new("指定另一个角点")
            .base(first)
            .keyword(keyword("Dimensions", "DIMENSIONS", "D"))
            .jig(Jig::Rectangle { corner: first });

        let candidate = match engine.get_point(options).reply()? {
            Reply::Value(point) => point,
            Reply::Keyword(name) if name == "DIMENSIONS" => match by_dimensions(engine, first)? {
                Some(point) => point,
                None => return Ok(None),
            },
            Reply::Keyword(_) => continue,
            Reply::Done => return Ok(None),
        };

        let size = candidate - first;
        if size.x().abs() <= COINCIDENT || size.y().abs() <= COINCIDENT {
            engine.report_error("矩形的宽度和高度不能为零");
            continue;
        }
        return Ok(Some(candidate));
    }
}

/// 按长宽输入，再用一个点决定矩形落在第一角点的哪个象限。
fn by_dimensions(
    engine: &mut CommandEngine<'_>,
    first: Point2,
) -> Result<Option<Point2>, EngineError> {
    let Some(length) = positive(engine, "指定矩形的长度")? else {
        return Ok(None);
    };
    let Some(width) = positive(engine, "指定矩形的宽度")? else {
        return Ok(None);
    };

    loop {
        engine.poll_cancel()?;
        match engine
            .get_point(PromptOptions::new("指定另一个角点的方向").base(first))
            .reply()?
        {
            Reply::Value(direction) => {
                let sx = if direction.x() >= first.x() { 1.0 } else { -1.0 };
                let sy = if direction.y() >= first.y() { 1.0 } else { -1.0 };
                return Ok(Some(first + Vector2::new(sx * length, sy * width)));
            }
            Reply::Keyword(_) => continue,
            Reply::Done => return Ok(None),
        }
    }
}

fn positive(engine: &mut CommandEngine<'_>, message: &str) -> Result<Option<f64>, EngineError> {
    loop {
        engine.poll_cancel()?;
        match engine.get_distance(PromptOptions::new(message)).reply()? {
            Reply::Value(value) if value > 0.0 => return Ok(Some(value)),
            Reply::Value(_) => engine.report_error("数值必须大于零"),
            Reply::Keyword(_) => continue,
            Reply::Done => return Ok(None),
        }
    }
}
