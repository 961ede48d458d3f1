use zedit_core::document::{Circle, Entity, Geometry};
use zedit_core::geometry::Point2;
use zedit_core::ops::{circle_from_diameter, circumcircle};

use super::keyword;
use crate::command::CommandHandler;
use crate::engine::CommandEngine;
use crate::errors::EngineError;
use crate::input::{PromptOptions, Reply};
use crate::jig::Jig;

pub struct CircleCommand;

impl CommandHandler for CircleCommand {
    fn name(&self) -> &'static str {
        "CIRCLE"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["C"]
    }

    fn run(&self, engine: &mut CommandEngine<'_>) -> Result<(), EngineError> {
        let options = PromptOptions::new("指定圆的圆心")
            .keyword(keyword("3P", "3P", "3"))
            .keyword(keyword("2P", "2P", "2"));

        let circle = loop {
            engine.poll_cancel()?;
            let found = match engine.get_point(options.clone()).reply()? {
                Reply::Value(center) => by_radius(engine, center)?,
                Reply::Keyword(name) if name == "3P" => three_point(engine)?,
                Reply::Keyword(name) if name == "2P" => two_point(engine)?,
                Reply::Keyword(_) => continue,
                Reply::Done => return Ok(()),
            };
            match found {
                Some(circle) => break circle,
                None => return Ok(()),
            }
        };

        let id = engine
            .scene_mut()
            .add_entity(Entity::new(Geometry::Circle(circle)));
        engine.scene_mut().record_add("CIRCLE", &[id]);
        Ok(())
    }
}

fn by_radius(
    engine: &mut CommandEngine<'_>,
    center: Point2,
) -> Result<Option<Circle>, EngineError> {
    engine.scene_mut().add_drawing_point(center);
    let mut diameter = false;
    loop {
        engine.poll_cancel()?;
        let options = if diameter {
            PromptOptions::new("指定圆的直径")
                .base(center)
                .jig(Jig::CircleDiameter { center })
        } else {
            PromptOptions::new("指定圆的半径")
                .base(center)
                .keyword(keyword("Diameter", "DIAMETER", "D"))
                .jig(Jig::Circle { center })
        };

        match engine.get_distance(options).reply()? {
            Reply::Value(value) => {
                let radius = if diameter { value / 2.0 } else { value };
                if radius <= 0.0 {
                    engine.report_error("半径必须为正数");
                    continue;
                }
                return Ok(Some(Circle { center, radius }));
            }
            Reply::Keyword(name) if name == "DIAMETER" => diameter = true,
            Reply::Keyword(_) => {}
            Reply::Done => return Ok(None),
        }
    }
}

fn three_point(engine: &mut CommandEngine<'_>) -> Result<Option<Circle>, EngineError> {
    let Some(first) = point(engine, PromptOptions::new("指定圆上的第一个点"))? else {
        return Ok(None);
    };
    let Some(second) = point(
        engine,
        PromptOptions::new("指定圆上的第二个点")
            .base(first)
            .jig(Jig::Line { from: first }),
    )?
    else {
        return Ok(None);
    };

    loop {
        engine.poll_cancel()?;
        let options = PromptOptions::new("指定圆上的第三个点")
            .base(second)
            .jig(Jig::ThreePointCircle { first, second });
        let Some(third) = point(engine, options)? else {
            return Ok(None);
        };
        match circumcircle(first, second, third) {
            Some((center, radius)) => return Ok(Some(Circle { center, radius })),
            None => engine.report_error("三点共线，无法确定圆"),
        }
    }
}

fn two_point(engine: &mut CommandEngine<'_>) -> Result<Option<Circle>, EngineError> {
    let Some(first) = point(engine, PromptOptions::new("指定圆直径的第一个端点"))? else {
        return Ok(None);
    };
    loop {
        engine.poll_cancel()?;
        let options = PromptOptions::new("指定圆直径的第二个端点")
            .base(first)
            .jig(Jig::TwoPointCircle { first });
        let Some(second) = point(engine, options)? else {
            return Ok(None);
        };
        match circle_from_diameter(first, second) {
            Some((center, radius)) => return Ok(Some(Circle { center, radius })),
            None => engine.report_error("两点重合，无法确定圆"),
        }
    }
}

fn point(
    engine: &mut CommandEngine<'_>,
    options: PromptOptions,
) -> Result<Option<Point2>, EngineError> {
    loop {
        match engine.get_point(options.clone()).reply()? {
            Reply::Value(point) => {
                engine.scene_mut().add_drawing_point(point);
                return Ok(Some(point));
            }
            Reply::Keyword(_) => continue,
            Reply::Done => return Ok(None),
        }
    }
}
