//! 纯几何运算：位移、三点圆、偏移、按邻近连接多段线以及顶点编辑。
//!
//! 这里的函数只读写传入的值，不接触文档或撤销日志。

use crate::document::{Entity, Geometry, Polyline, PolylineVertex};
use crate::errors::GeometryError;
use crate::geometry::{Point2, Vector2};

/// 三点圆判定共线的容差。这是策略值而非严格的几何阈值。
pub const CIRCUMCIRCLE_TOLERANCE: f64 = 1e-4;
/// 多段线端点连接的默认距离容差。
pub const JOIN_TOLERANCE: f64 = 0.001;
/// 斜接系数下限，防止尖角处偏移量发散。
const MITER_MIN_COS: f64 = 0.1;

/// 对实体的所有位置字段施加位移。`Proxy` 实体无法解释，返回错误且不做修改。
pub fn apply_displacement(entity: &mut Entity, displacement: Vector2) -> Result<(), GeometryError> {
    let shift = |point: &mut Point2| *point = point.translate(displacement);
    match &mut entity.geometry {
        Geometry::Line(line) => {
            shift(&mut line.start);
            shift(&mut line.end);
        }
        Geometry::Circle(circle) => shift(&mut circle.center),
        Geometry::Arc(arc) => shift(&mut arc.center),
        Geometry::Ellipse(ellipse) => shift(&mut ellipse.center),
        Geometry::Polyline(polyline) => {
            for vertex in &mut polyline.vertices {
                shift(&mut vertex.position);
            }
        }
        Geometry::Spline(spline) => {
            for point in spline
                .control_points
                .iter_mut()
                .chain(spline.fit_points.iter_mut())
            {
                shift(point);
            }
        }
        Geometry::Text(text) => shift(&mut text.insert),
        Geometry::MText(mtext) => shift(&mut mtext.insert),
        Geometry::Point(point) => shift(&mut point.position),
        Geometry::BlockReference(reference) => shift(&mut reference.insert),
        Geometry::Dimension(dimension) => {
            for point in dimension.points_mut() {
                shift(point);
            }
        }
        Geometry::Proxy { type_name } => {
            return Err(GeometryError::Unsupported(type_name.clone()));
        }
    }
    Ok(())
}

/// 由两个对角点得到矩形四角，从 `first` 开始沿边界依次排列。
pub fn rectangle_corners(first: Point2, opposite: Point2) -> [Point2; 4] {
    [
        first,
        Point2::new(opposite.x(), first.y()),
        opposite,
        Point2::new(first.x(), opposite.y()),
    ]
}

/// 过三点的外接圆，返回圆心与半径；三点（近似）共线时返回 `None`。
pub fn circumcircle(p1: Point2, p2: Point2, p3: Point2) -> Option<(Point2, f64)> {
    let (x1, y1) = (p1.x(), p1.y());
    let (x2, y2) = (p2.x(), p2.y());
    let (x3, y3) = (p3.x(), p3.y());

    let d = 2.0 * (x1 * (y2 - y3) + x2 * (y3 - y1) + x3 * (y1 - y2));
    if d.abs() < CIRCUMCIRCLE_TOLERANCE {
        return None;
    }

    let s1 = x1 * x1 + y1 * y1;
    let s2 = x2 * x2 + y2 * y2;
    let s3 = x3 * x3 + y3 * y3;
    let ux = (s1 * (y2 - y3) + s2 * (y3 - y1) + s3 * (y1 - y2)) / d;
    let uy = (s1 * (x3 - x2) + s2 * (x1 - x3) + s3 * (x2 - x1)) / d;
    let center = Point2::new(ux, uy);
    Some((center, center.distance(p1)))
}

/// 以两点为直径的圆。两点重合时返回 `None`。
pub fn circle_from_diameter(p1: Point2, p2: Point2) -> Option<(Point2, f64)> {
    let radius = p1.distance(p2) / 2.0;
    if radius <= f64::EPSILON {
        return None;
    }
    Some((p1.midpoint(p2), radius))
}

/// 点到线段的最短距离。
pub fn distance_to_segment(point: Point2, start: Point2, end: Point2) -> f64 {
    let v = end - start;
    let w = point - start;
    let len_sq = v.length_squared();
    if len_sq <= f64::EPSILON {
        return point.distance(start);
    }
    let t = (w.dot(v) / len_sq).clamp(0.0, 1.0);
    point.distance(start + v * t)
}

/// 点到实体的近似距离，用于拾取与偏移“通过”模式。
pub fn distance_to_entity(entity: &Entity, point: Point2) -> Option<f64> {
    let distance = match &entity.geometry {
        Geometry::Line(line) => distance_to_segment(point, line.start, line.end),
        Geometry::Circle(circle) => (point.distance(circle.center) - circle.radius).abs(),
        Geometry::Arc(arc) => {
            let delta = point - arc.center;
            if arc.contains_angle(delta.y().atan2(delta.x())) {
                (delta.length() - arc.radius).abs()
            } else {
                point
                    .distance(arc.start_point())
                    .min(point.distance(arc.end_point()))
            }
        }
        Geometry::Polyline(polyline) => {
            let segment = nearest_segment(polyline, point);
            match (segment.and_then(|index| polyline.segment(index)), polyline.first_point()) {
                (Some((start, end)), _) => distance_to_segment(point, start, end),
                (None, Some(only)) => point.distance(only),
                (None, None) => return None,
            }
        }
        Geometry::Spline(spline) => {
            let points = if spline.fit_points.len() >= 2 {
                &spline.fit_points
            } else {
                &spline.control_points
            };
            points
                .windows(2)
                .map(|pair| distance_to_segment(point, pair[0], pair[1]))
                .reduce(f64::min)?
        }
        Geometry::Ellipse(ellipse) => {
            let major = ellipse.major_axis;
            let minor = major.perp() * ellipse.ratio;
            const STEPS: usize = 64;
            (0..STEPS)
                .map(|i| {
                    let t0 = std::f64::consts::TAU * i as f64 / STEPS as f64;
                    let t1 = std::f64::consts::TAU * (i + 1) as f64 / STEPS as f64;
                    let a = ellipse.center + major * t0.cos() + minor * t0.sin();
                    let b = ellipse.center + major * t1.cos() + minor * t1.sin();
                    distance_to_segment(point, a, b)
                })
                .reduce(f64::min)?
        }
        Geometry::Text(text) => point.distance(text.insert),
        Geometry::MText(mtext) => point.distance(mtext.insert),
        Geometry::Point(mark) => point.distance(mark.position),
        Geometry::BlockReference(reference) => point.distance(reference.insert),
        Geometry::Dimension(dimension) => dimension
            .points()
            .into_iter()
            .map(|candidate| point.distance(candidate))
            .reduce(f64::min)?,
        Geometry::Proxy { .. } => return None,
    };
    Some(distance)
}

/// 按距离偏移实体，`side_point` 决定偏移方向。返回新实体，原实体不变。
pub fn offset(entity: &Entity, distance: f64, side_point: Point2) -> Result<Entity, GeometryError> {
    if !distance.is_finite() || distance <= 0.0 {
        return Err(GeometryError::Degenerate);
    }
    let geometry = match &entity.geometry {
        Geometry::Line(line) => {
            let direction = (line.end - line.start)
                .normalize()
                .ok_or(GeometryError::Degenerate)?;
            let normal = direction.perp();
            let midpoint = line.start.midpoint(line.end);
            let sign = side_sign((side_point - midpoint).dot(normal));
            let shift = normal * (sign * distance);
            let mut moved = line.clone();
            moved.start = moved.start + shift;
            moved.end = moved.end + shift;
            Geometry::Line(moved)
        }
        Geometry::Circle(circle) => {
            let radius = offset_radius(circle.center, circle.radius, distance, side_point)?;
            let mut resized = circle.clone();
            resized.radius = radius;
            Geometry::Circle(resized)
        }
        Geometry::Arc(arc) => {
            let radius = offset_radius(arc.center, arc.radius, distance, side_point)?;
            let mut resized = arc.clone();
            resized.radius = radius;
            Geometry::Arc(resized)
        }
        Geometry::Polyline(polyline) => {
            Geometry::Polyline(offset_polyline(polyline, distance, side_point)?)
        }
        other => return Err(GeometryError::Unsupported(other.type_name().to_string())),
    };
    Ok(entity.with_geometry(geometry))
}

#[inline]
fn side_sign(dot: f64) -> f64 {
    if dot >= 0.0 { 1.0 } else { -1.0 }
}

fn offset_radius(
    center: Point2,
    radius: f64,
    distance: f64,
    side_point: Point2,
) -> Result<f64, GeometryError> {
    let result = if side_point.distance(center) < radius {
        radius - distance
    } else {
        radius + distance
    };
    if result <= 0.0 {
        return Err(GeometryError::NonPositiveRadius(result));
    }
    Ok(result)
}

/// 斜接式多段线偏移。整条多段线使用同一侧向，侧向取自离 `side_point` 最近的线段；
/// 尖角处产生的自交不做修剪。
fn offset_polyline(
    polyline: &Polyline,
    distance: f64,
    side_point: Point2,
) -> Result<Polyline, GeometryError> {
    let count = polyline.vertices.len();
    if count < 2 {
        return Err(GeometryError::TooFewVertices);
    }
    if polyline.vertices.iter().any(|vertex| vertex.bulge.abs() > 1e-9) {
        return Err(GeometryError::Unsupported("LWPOLYLINE (含圆弧段)".to_string()));
    }

    let normals = (0..polyline.segment_count())
        .map(|index| {
            let (start, end) = polyline.segment(index).ok_or(GeometryError::Degenerate)?;
            (end - start)
                .normalize()
                .map(Vector2::perp)
                .ok_or(GeometryError::Degenerate)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let nearest = nearest_segment(polyline, side_point).ok_or(GeometryError::Degenerate)?;
    let (anchor, _) = polyline.segment(nearest).ok_or(GeometryError::Degenerate)?;
    let sign = side_sign((side_point - anchor).dot(normals[nearest]));

    let segments = normals.len();
    let vertices = polyline
        .vertices
        .iter()
        .enumerate()
        .map(|(index, vertex)| {
            let (before, after) = if polyline.is_closed {
                (normals[(index + segments - 1) % segments], normals[index])
            } else if index == 0 {
                (normals[0], normals[0])
            } else if index == count - 1 {
                (normals[segments - 1], normals[segments - 1])
            } else {
                (normals[index - 1], normals[index])
            };
            let direction = (before + after).normalize().unwrap_or(after);
            let miter = direction.dot(after).max(MITER_MIN_COS);
            let shift = direction * (sign * distance / miter);
            PolylineVertex::new(vertex.position + shift)
        })
        .collect();

    Ok(Polyline {
        vertices,
        is_closed: polyline.is_closed,
    })
}

/// 反转多段线方向，凸度取反并移到新的起点顶点上。
pub fn reverse_polyline(polyline: &Polyline) -> Polyline {
    let count = polyline.vertices.len();
    let vertices = (0..count)
        .map(|index| {
            let position = polyline.vertices[count - 1 - index].position;
            let bulge = if polyline.is_closed || index + 1 < count {
                -polyline.vertices[(2 * count - 2 - index) % count].bulge
            } else {
                0.0
            };
            PolylineVertex::with_bulge(position, bulge)
        })
        .collect();
    Polyline {
        vertices,
        is_closed: polyline.is_closed,
    }
}

/// 按端点邻近把 `other` 接到 `base` 上。依次尝试：base 尾接 other 头、base 尾接 other 尾（反转）、
/// base 头接 other 尾、base 头接 other 头（反转）；首个落在容差内的配对生效。
/// 没有匹配时不修改 `base` 并返回 `false`。闭合多段线不参与连接。
pub fn join_by_proximity(base: &mut Polyline, other: &Polyline, tolerance: f64) -> bool {
    if base.is_closed || other.is_closed || base.vertices.len() < 2 || other.vertices.len() < 2 {
        return false;
    }
    let (Some(base_start), Some(base_end)) = (base.first_point(), base.last_point()) else {
        return false;
    };
    let (Some(other_start), Some(other_end)) = (other.first_point(), other.last_point()) else {
        return false;
    };

    if base_end.distance(other_start) <= tolerance {
        append_after_shared(base, other.vertices.clone());
    } else if base_end.distance(other_end) <= tolerance {
        append_after_shared(base, reverse_polyline(other).vertices);
    } else if base_start.distance(other_end) <= tolerance {
        prepend_before_shared(base, other.vertices.clone());
    } else if base_start.distance(other_start) <= tolerance {
        prepend_before_shared(base, reverse_polyline(other).vertices);
    } else {
        return false;
    }
    true
}

fn append_after_shared(base: &mut Polyline, mut incoming: Vec<PolylineVertex>) {
    let shared = incoming.remove(0);
    if let Some(last) = base.vertices.last_mut() {
        last.bulge = shared.bulge;
    }
    base.vertices.extend(incoming);
}

fn prepend_before_shared(base: &mut Polyline, mut incoming: Vec<PolylineVertex>) {
    incoming.pop();
    incoming.append(&mut base.vertices);
    base.vertices = incoming;
}

/// 在 `index` 处插入顶点，被拆分线段的凸度清零。
pub fn insert_vertex(
    polyline: &mut Polyline,
    index: usize,
    point: Point2,
) -> Result<(), GeometryError> {
    let len = polyline.vertices.len();
    if index > len {
        return Err(GeometryError::VertexOutOfRange { index, len });
    }
    if index > 0 {
        polyline.vertices[index - 1].bulge = 0.0;
    }
    polyline.vertices.insert(index, PolylineVertex::new(point));
    Ok(())
}

pub fn move_vertex(
    polyline: &mut Polyline,
    index: usize,
    point: Point2,
) -> Result<(), GeometryError> {
    let len = polyline.vertices.len();
    let vertex = polyline
        .vertices
        .get_mut(index)
        .ok_or(GeometryError::VertexOutOfRange { index, len })?;
    vertex.position = point;
    Ok(())
}

/// 删除顶点；多段线至少保留两个顶点。
pub fn delete_vertex(polyline: &mut Polyline, index: usize) -> Result<(), GeometryError> {
    let len = polyline.vertices.len();
    if index >= len {
        return Err(GeometryError::VertexOutOfRange { index, len });
    }
    if len <= 2 {
        return Err(GeometryError::TooFewVertices);
    }
    polyline.vertices.remove(index);
    Ok(())
}

pub fn nearest_vertex(polyline: &Polyline, point: Point2) -> Option<usize> {
    polyline
        .points()
        .enumerate()
        .map(|(index, vertex)| (index, vertex.distance(point)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

pub fn nearest_segment(polyline: &Polyline, point: Point2) -> Option<usize> {
    (0..polyline.segment_count())
        .filter_map(|index| {
            polyline
                .segment(index)
                .map(|(start, end)| (index, distance_to_segment(point, start, end)))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Circle, Dimension, DimensionKind, Line, Text};

    fn assert_point(actual: Point2, x: f64, y: f64) {
        assert!(
            (actual.x() - x).abs() < 1e-9 && (actual.y() - y).abs() < 1e-9,
            "expected ({x}, {y}), got {actual:?}"
        );
    }

    fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Entity {
        Entity::new(Geometry::Line(Line {
            start: Point2::new(x1, y1),
            end: Point2::new(x2, y2),
        }))
    }

    fn open_polyline(points: &[(f64, f64)]) -> Polyline {
        Polyline::from_points(points.iter().map(|&(x, y)| Point2::new(x, y)), false)
    }

    #[test]
    fn rectangle_corners_walk_the_outline() {
        let corners = rectangle_corners(Point2::new(0.0, 0.0), Point2::new(4.0, 2.0));
        assert_point(corners[1], 4.0, 0.0);
        assert_point(corners[2], 4.0, 2.0);
        assert_point(corners[3], 0.0, 2.0);
    }

    #[test]
    fn displacement_moves_every_dimension_point() {
        let mut entity = Entity::new(Geometry::Dimension(Dimension {
            kind: DimensionKind::Linear,
            definition_point: Point2::new(0.0, 0.0),
            text_midpoint: Point2::new(5.0, 5.0),
            dimension_line_point: None,
            extension_line_origin: Some(Point2::new(1.0, 1.0)),
            extension_line_end: None,
            secondary_point: None,
            arc_definition_point: None,
            center_point: None,
            text: None,
            measurement: None,
            rotation: 0.0,
        }));
        apply_displacement(&mut entity, Vector2::new(2.0, -1.0)).unwrap();
        let Geometry::Dimension(dimension) = &entity.geometry else {
            panic!("expected dimension");
        };
        assert_point(dimension.definition_point, 2.0, -1.0);
        assert_point(dimension.text_midpoint, 7.0, 4.0);
        assert_point(dimension.extension_line_origin.unwrap(), 3.0, 0.0);
        assert!(dimension.extension_line_end.is_none());
    }

    #[test]
    fn displacement_moves_text_and_lines() {
        let mut text = Entity::new(Geometry::Text(Text {
            insert: Point2::new(1.0, 1.0),
            content: "A".to_string(),
            height: 2.5,
            rotation: 0.0,
        }));
        apply_displacement(&mut text, Vector2::new(1.0, 1.0)).unwrap();
        let Geometry::Text(text) = &text.geometry else {
            panic!("expected text");
        };
        assert_point(text.insert, 2.0, 2.0);

        let mut segment = line(0.0, 0.0, 1.0, 0.0);
        apply_displacement(&mut segment, Vector2::new(0.0, 3.0)).unwrap();
        let Geometry::Line(segment) = &segment.geometry else {
            panic!("expected line");
        };
        assert_point(segment.start, 0.0, 3.0);
        assert_point(segment.end, 1.0, 3.0);
    }

    #[test]
    fn displacement_rejects_proxy_entities() {
        let mut proxy = Entity::new(Geometry::Proxy {
            type_name: "ACAD_PROXY_ENTITY".to_string(),
        });
        let before = proxy.clone();
        let err = apply_displacement(&mut proxy, Vector2::new(1.0, 1.0)).unwrap_err();
        assert!(matches!(err, GeometryError::Unsupported(_)));
        assert_eq!(proxy, before);
    }

    #[test]
    fn circumcircle_of_right_triangle() {
        let (center, radius) = circumcircle(
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(0.0, 2.0),
        )
        .expect("non-collinear points");
        assert_point(center, 1.0, 1.0);
        assert!((radius - 2f64.sqrt()).abs() < 1e-9);
    }

    #[test]
    fn circumcircle_rejects_collinear_points() {
        assert!(
            circumcircle(
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 1.0),
                Point2::new(2.0, 2.0)
            )
            .is_none()
        );
    }

    #[test]
    fn line_offset_there_and_back() {
        let original = line(0.0, 0.0, 10.0, 0.0);
        let up = offset(&original, 2.5, Point2::new(3.0, 7.0)).unwrap();
        let Geometry::Line(moved) = &up.geometry else {
            panic!("expected line");
        };
        assert_point(moved.start, 0.0, 2.5);
        assert_point(moved.end, 10.0, 2.5);

        let back = offset(&up, 2.5, Point2::new(3.0, -7.0)).unwrap();
        let Geometry::Line(restored) = &back.geometry else {
            panic!("expected line");
        };
        assert_point(restored.start, 0.0, 0.0);
        assert_point(restored.end, 10.0, 0.0);
    }

    #[test]
    fn circle_offset_inward_and_outward() {
        let circle = Entity::new(Geometry::Circle(Circle {
            center: Point2::origin(),
            radius: 5.0,
        }));
        let outer = offset(&circle, 1.0, Point2::new(10.0, 0.0)).unwrap();
        let inner = offset(&circle, 1.0, Point2::new(1.0, 0.0)).unwrap();
        let radius = |entity: &Entity| match &entity.geometry {
            Geometry::Circle(circle) => circle.radius,
            _ => panic!("expected circle"),
        };
        assert!((radius(&outer) - 6.0).abs() < 1e-9);
        assert!((radius(&inner) - 4.0).abs() < 1e-9);

        let err = offset(&circle, 5.0, Point2::new(1.0, 0.0)).unwrap_err();
        assert!(matches!(err, GeometryError::NonPositiveRadius(_)));
    }

    #[test]
    fn closed_square_offsets_outward_with_mitred_corners() {
        let square = Polyline::from_points(
            [
                Point2::new(0.0, 0.0),
                Point2::new(10.0, 0.0),
                Point2::new(10.0, 10.0),
                Point2::new(0.0, 10.0),
            ],
            true,
        );
        let entity = Entity::new(Geometry::Polyline(square));
        let result = offset(&entity, 1.0, Point2::new(5.0, -3.0)).unwrap();
        let polyline = result.as_polyline().expect("polyline");
        let points: Vec<_> = polyline.points().collect();
        assert_point(points[0], -1.0, -1.0);
        assert_point(points[1], 11.0, -1.0);
        assert_point(points[2], 11.0, 11.0);
        assert_point(points[3], -1.0, 11.0);
        assert!(polyline.is_closed);
    }

    #[test]
    fn non_convex_polyline_uses_nearest_segment_side() {
        // L 形：质心在凹角外侧附近，按最近线段判断侧向
        let shape = Polyline::from_points(
            [
                Point2::new(0.0, 0.0),
                Point2::new(10.0, 0.0),
                Point2::new(10.0, 2.0),
                Point2::new(2.0, 2.0),
                Point2::new(2.0, 10.0),
                Point2::new(0.0, 10.0),
            ],
            true,
        );
        let entity = Entity::new(Geometry::Polyline(shape));
        let result = offset(&entity, 0.5, Point2::new(6.0, 3.0)).unwrap();
        let points: Vec<_> = result.as_polyline().unwrap().points().collect();
        // 外偏移：凹角顶点 (2,2) 移到 (2.5,2.5)
        assert_point(points[3], 2.5, 2.5);
        assert_point(points[0], -0.5, -0.5);
    }

    #[test]
    fn open_polyline_ends_use_single_normal() {
        let path = Entity::new(Geometry::Polyline(open_polyline(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 10.0),
        ])));
        let result = offset(&path, 1.0, Point2::new(5.0, 5.0)).unwrap();
        let points: Vec<_> = result.as_polyline().unwrap().points().collect();
        assert_point(points[0], 0.0, 1.0);
        assert_point(points[1], 9.0, 1.0);
        assert_point(points[2], 9.0, 10.0);
    }

    #[test]
    fn offset_rejects_unsupported_types() {
        let text = Entity::new(Geometry::Text(Text {
            insert: Point2::origin(),
            content: "x".to_string(),
            height: 1.0,
            rotation: 0.0,
        }));
        assert!(matches!(
            offset(&text, 1.0, Point2::new(1.0, 1.0)),
            Err(GeometryError::Unsupported(_))
        ));
    }

    #[test]
    fn join_end_to_start_deduplicates_shared_vertex() {
        let mut base = open_polyline(&[(0.0, 0.0), (5.0, 0.0)]);
        let other = open_polyline(&[(5.0, 0.0005), (5.0, 5.0), (0.0, 5.0)]);
        assert!(join_by_proximity(&mut base, &other, JOIN_TOLERANCE));
        let points: Vec<_> = base.points().collect();
        assert_eq!(points.len(), 4);
        assert_point(points[1], 5.0, 0.0);
        assert_point(points[3], 0.0, 5.0);
    }

    #[test]
    fn join_reverses_when_ends_meet() {
        let mut base = open_polyline(&[(0.0, 0.0), (5.0, 0.0)]);
        let other = open_polyline(&[(5.0, 5.0), (5.0, 0.0)]);
        assert!(join_by_proximity(&mut base, &other, JOIN_TOLERANCE));
        let points: Vec<_> = base.points().collect();
        assert_eq!(points.len(), 3);
        assert_point(points[2], 5.0, 5.0);
    }

    #[test]
    fn join_prepends_at_base_start() {
        let mut base = open_polyline(&[(5.0, 0.0), (10.0, 0.0)]);
        let other = open_polyline(&[(0.0, 0.0), (5.0, 0.0)]);
        assert!(join_by_proximity(&mut base, &other, JOIN_TOLERANCE));
        let points: Vec<_> = base.points().collect();
        assert_eq!(points.len(), 3);
        assert_point(points[0], 0.0, 0.0);
        assert_point(points[2], 10.0, 0.0);

        let mut base = open_polyline(&[(5.0, 0.0), (10.0, 0.0)]);
        let other = open_polyline(&[(5.0, 0.0), (5.0, -5.0)]);
        assert!(join_by_proximity(&mut base, &other, JOIN_TOLERANCE));
        let points: Vec<_> = base.points().collect();
        assert_point(points[0], 5.0, -5.0);
        assert_eq!(points.len(), 3);
    }

    #[test]
    fn join_beyond_tolerance_mutates_nothing() {
        let mut base = open_polyline(&[(0.0, 0.0), (5.0, 0.0)]);
        let other = open_polyline(&[(5.1, 0.0), (9.0, 0.0)]);
        let before = base.clone();
        let other_before = other.clone();
        assert!(!join_by_proximity(&mut base, &other, JOIN_TOLERANCE));
        assert_eq!(base, before);
        assert_eq!(other, other_before);
    }

    #[test]
    fn reverse_shifts_bulges() {
        let polyline = Polyline {
            vertices: vec![
                PolylineVertex::with_bulge(Point2::new(0.0, 0.0), 0.5),
                PolylineVertex::with_bulge(Point2::new(1.0, 0.0), 0.0),
                PolylineVertex::new(Point2::new(2.0, 0.0)),
            ],
            is_closed: false,
        };
        let reversed = reverse_polyline(&polyline);
        assert_point(reversed.vertices[0].position, 2.0, 0.0);
        assert_eq!(reversed.vertices[1].bulge, -0.5);
        assert_eq!(reversed.vertices[2].bulge, 0.0);
    }

    #[test]
    fn vertex_edits_validate_indices() {
        let mut polyline = open_polyline(&[(0.0, 0.0), (10.0, 0.0)]);
        insert_vertex(&mut polyline, 1, Point2::new(5.0, 2.0)).unwrap();
        assert_eq!(polyline.vertices.len(), 3);
        move_vertex(&mut polyline, 1, Point2::new(5.0, 3.0)).unwrap();
        assert_point(polyline.vertices[1].position, 5.0, 3.0);
        delete_vertex(&mut polyline, 1).unwrap();
        assert!(matches!(
            delete_vertex(&mut polyline, 0),
            Err(GeometryError::TooFewVertices)
        ));
        assert!(matches!(
            insert_vertex(&mut polyline, 9, Point2::origin()),
            Err(GeometryError::VertexOutOfRange { index: 9, len: 2 })
        ));
    }

    #[test]
    fn nearest_queries() {
        let polyline = open_polyline(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0)]);
        assert_eq!(nearest_vertex(&polyline, Point2::new(9.0, 1.0)), Some(1));
        assert_eq!(nearest_segment(&polyline, Point2::new(11.0, 6.0)), Some(1));
        let distance = distance_to_entity(
            &Entity::new(Geometry::Polyline(polyline)),
            Point2::new(5.0, 2.0),
        );
        assert!((distance.unwrap() - 2.0).abs() < 1e-9);
    }
}
