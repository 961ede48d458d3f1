use zedit_core::document::{Circle, Entity, Geometry, Line, Polyline};
use zedit_core::geometry::Point2;
use zedit_core::ops::{
    apply_displacement, circle_from_diameter, circumcircle, distance_to_entity, offset,
    rectangle_corners,
};

const MIN_PREVIEW_SIZE: f64 = 1e-9;

/// 交互预览。每次光标移动时由当前值生成一组临时实体，
/// 预览实体只进入场景的绘图辅助层，不会写入文档。
#[derive(Debug, Clone, PartialEq)]
pub enum Jig {
    /// 从固定点拉出的橡皮筋线。
    Line { from: Point2 },
    /// 已有顶点加光标点组成的开放多段线。
    Polyline { points: Vec<Point2> },
    Circle { center: Point2 },
    CircleDiameter { center: Point2 },
    TwoPointCircle { first: Point2 },
    ThreePointCircle { first: Point2, second: Point2 },
    Rectangle { corner: Point2 },
    /// 选择集跟随光标整体平移。
    Displacement { base: Point2, entities: Vec<Entity> },
    /// `distance` 为空时按光标到实体的距离偏移。
    Offset { entity: Entity, distance: Option<f64> },
}

impl Jig {
    pub fn update(&self, cursor: Point2) -> Vec<Entity> {
        match self {
            Jig::Line { from } => vec![line(*from, cursor)],
            Jig::Polyline { points } => {
                let mut vertices = points.clone();
                vertices.push(cursor);
                vec![Entity::new(Geometry::Polyline(Polyline::from_points(
                    vertices, false,
                )))]
            }
            Jig::Circle { center } => circle(*center, center.distance(cursor)),
            Jig::CircleDiameter { center } => circle(*center, center.distance(cursor) / 2.0),
            Jig::TwoPointCircle { first } => circle_from_diameter(*first, cursor)
                .map(|(center, radius)| circle(center, radius))
                .unwrap_or_default(),
            Jig::ThreePointCircle { first, second } => circumcircle(*first, *second, cursor)
                .map(|(center, radius)| circle(center, radius))
                .unwrap_or_else(|| vec![line(*first, *second)]),
            Jig::Rectangle { corner } => {
                let corners = rectangle_corners(*corner, cursor);
                vec![Entity::new(Geometry::Polyline(Polyline::from_points(
                    corners, true,
                )))]
            }
            Jig::Displacement { base, entities } => {
                let delta = cursor - *base;
                entities
                    .iter()
                    .filter_map(|entity| {
                        let mut moved = entity.clone();
                        apply_displacement(&mut moved, delta).ok().map(|_| moved)
                    })
                    .collect()
            }
            Jig::Offset { entity, distance } => {
                let distance = distance.or_else(|| distance_to_entity(entity, cursor));
                distance
                    .and_then(|distance| offset(entity, distance, cursor).ok())
                    .into_iter()
                    .collect()
            }
        }
    }
}

fn line(start: Point2, end: Point2) -> Entity {
    Entity::new(Geometry::Line(Line { start, end }))
}

fn circle(center: Point2, radius: f64) -> Vec<Entity> {
    if radius <= MIN_PREVIEW_SIZE {
        return Vec::new();
    }
    vec![Entity::new(Geometry::Circle(Circle { center, radius }))]
}
