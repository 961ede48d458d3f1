pub mod ops;

pub mod errors {
    use thiserror::Error;

    /// 几何运算失败的原因。调用方据此报告并跳过当前操作。
    #[derive(Debug, Clone, PartialEq, Error)]
    pub enum GeometryError {
        #[error("几何退化，无法计算")]
        Degenerate,
        #[error("偏移后半径不为正数 ({0:.4})")]
        NonPositiveRadius(f64),
        #[error("不支持的实体类型: {0}")]
        Unsupported(String),
        #[error("顶点索引 {index} 超出范围 (顶点数 {len})")]
        VertexOutOfRange { index: usize, len: usize },
        #[error("多段线至少需要两个顶点")]
        TooFewVertices,
    }
}

pub mod geometry {
    use std::ops::{Add, Mul, Neg, Sub};

    use glam::DVec2;
    use serde::{Deserialize, Serialize};

    /// 二维点，内部以 `glam::DVec2` 表示。几何函数总是返回新值，不会别名调用方持有的点。
    #[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point2(pub DVec2);

    impl Point2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn origin() -> Self {
            Self(DVec2::ZERO)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn translate(self, offset: Vector2) -> Self {
            Self(self.0 + offset.0)
        }

        #[inline]
        pub fn distance(self, other: Point2) -> f64 {
            self.0.distance(other.0)
        }

        #[inline]
        pub fn midpoint(self, other: Point2) -> Point2 {
            Self((self.0 + other.0) * 0.5)
        }
    }

    impl From<DVec2> for Point2 {
        fn from(value: DVec2) -> Self {
            Self(value)
        }
    }

    impl Add<Vector2> for Point2 {
        type Output = Point2;

        fn add(self, rhs: Vector2) -> Point2 {
            self.translate(rhs)
        }
    }

    impl Sub<Vector2> for Point2 {
        type Output = Point2;

        fn sub(self, rhs: Vector2) -> Point2 {
            Point2(self.0 - rhs.0)
        }
    }

    impl Sub for Point2 {
        type Output = Vector2;

        fn sub(self, rhs: Point2) -> Vector2 {
            Vector2(self.0 - rhs.0)
        }
    }

    /// 二维向量，位移与法向量都用它表示。
    #[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Vector2(pub DVec2);

    impl Vector2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn length(self) -> f64 {
            self.0.length()
        }

        #[inline]
        pub fn length_squared(self) -> f64 {
            self.0.length_squared()
        }

        /// 单位化；零向量返回 `None`。
        #[inline]
        pub fn normalize(self) -> Option<Self> {
            let len = self.0.length();
            if len <= f64::EPSILON {
                None
            } else {
                Some(Self(self.0 / len))
            }
        }

        #[inline]
        pub fn dot(self, other: Vector2) -> f64 {
            self.0.dot(other.0)
        }

        /// 逆时针旋转 90° 得到的左法向。
        #[inline]
        pub fn perp(self) -> Vector2 {
            Self(self.0.perp())
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }
    }

    impl From<DVec2> for Vector2 {
        fn from(value: DVec2) -> Self {
            Self(value)
        }
    }

    impl Add for Vector2 {
        type Output = Vector2;

        fn add(self, rhs: Vector2) -> Vector2 {
            Vector2(self.0 + rhs.0)
        }
    }

    impl Mul<f64> for Vector2 {
        type Output = Vector2;

        fn mul(self, rhs: f64) -> Vector2 {
            Vector2(self.0 * rhs)
        }
    }

    impl Neg for Vector2 {
        type Output = Vector2;

        fn neg(self) -> Vector2 {
            Vector2(-self.0)
        }
    }

}

pub mod document {
    use std::collections::HashMap;
    use std::f64::consts::TAU;
    use std::fmt;

    use serde::{Deserialize, Serialize};

    use crate::geometry::{Point2, Vector2};

    /// 实体句柄。由 [`Document::generate_handle`] 单调分配，删除后也不会复用。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    pub struct EntityId(u64);

    impl EntityId {
        #[inline]
        pub fn new(raw: u64) -> Self {
            Self(raw)
        }

        /// 提供原始数值，便于序列化或日志输出。
        #[inline]
        pub fn get(self) -> u64 {
            self.0
        }
    }

    impl fmt::Display for EntityId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{:X}", self.0)
        }
    }

    #[derive(Debug, Clone, Serialize, Deserialize)]
    pub struct Layer {
        pub name: String,
        pub is_visible: bool,
        pub is_locked: bool,
    }

    impl Layer {
        #[inline]
        pub fn new(name: impl Into<String>) -> Self {
            Self {
                name: name.into(),
                is_visible: true,
                is_locked: false,
            }
        }
    }

    #[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub enum Color {
        #[default]
        ByLayer,
        ByBlock,
        Index(u8),
        TrueColor(u32),
    }

    pub const DEFAULT_LAYER: &str = "0";
    pub const DEFAULT_LINE_TYPE: &str = "ByLayer";

    /// 图元：公共属性加上具体几何。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Entity {
        pub layer: String,
        pub color: Color,
        pub line_type: String,
        pub geometry: Geometry,
    }

    impl Entity {
        pub fn new(geometry: Geometry) -> Self {
            Self {
                layer: DEFAULT_LAYER.to_string(),
                color: Color::ByLayer,
                line_type: DEFAULT_LINE_TYPE.to_string(),
                geometry,
            }
        }

        pub fn on_layer(mut self, layer: impl Into<String>) -> Self {
            self.layer = layer.into();
            self
        }

        /// 以新几何替换，保留图层、颜色与线型。
        pub fn with_geometry(&self, geometry: Geometry) -> Self {
            Self {
                layer: self.layer.clone(),
                color: self.color,
                line_type: self.line_type.clone(),
                geometry,
            }
        }

        #[inline]
        pub fn layer_name(&self) -> &str {
            &self.layer
        }

        #[inline]
        pub fn type_name(&self) -> &str {
            self.geometry.type_name()
        }

        #[inline]
        pub fn as_polyline(&self) -> Option<&Polyline> {
            match &self.geometry {
                Geometry::Polyline(polyline) => Some(polyline),
                _ => None,
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub enum Geometry {
        Line(Line),
        Circle(Circle),
        Arc(Arc),
        Ellipse(Ellipse),
        Polyline(Polyline),
        Spline(Spline),
        Text(Text),
        MText(MText),
        Point(Point),
        BlockReference(BlockReference),
        Dimension(Dimension),
        /// 读取器无法解释的实体，仅保留类型名。
        Proxy { type_name: String },
    }

    impl Geometry {
        /// DXF 风格的类型名，命令用它过滤可处理的实体。
        pub fn type_name(&self) -> &str {
            match self {
                Geometry::Line(_) => "LINE",
                Geometry::Circle(_) => "CIRCLE",
                Geometry::Arc(_) => "ARC",
                Geometry::Ellipse(_) => "ELLIPSE",
                Geometry::Polyline(_) => "LWPOLYLINE",
                Geometry::Spline(_) => "SPLINE",
                Geometry::Text(_) => "TEXT",
                Geometry::MText(_) => "MTEXT",
                Geometry::Point(_) => "POINT",
                Geometry::BlockReference(_) => "INSERT",
                Geometry::Dimension(_) => "DIMENSION",
                Geometry::Proxy { type_name } => type_name,
            }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Line {
        pub start: Point2,
        pub end: Point2,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Circle {
        pub center: Point2,
        pub radius: f64,
    }

    /// 圆弧实体，角度以弧度形式储存，遵循数学正方向。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Arc {
        pub center: Point2,
        pub radius: f64,
        pub start_angle: f64,
        pub end_angle: f64,
    }

    impl Arc {
        /// 判断角度是否落在逆时针的起止区间内。
        pub fn contains_angle(&self, angle: f64) -> bool {
            let (start, end) = canonical_interval(self.start_angle, self.end_angle);
            let mut candidate = normalize_angle(angle);
            if candidate < start {
                candidate += TAU;
            }
            candidate <= end + 1e-12
        }

        pub fn start_point(&self) -> Point2 {
            arc_point(self.center, self.radius, self.start_angle)
        }

        pub fn end_point(&self) -> Point2 {
            arc_point(self.center, self.radius, self.end_angle)
        }
    }

    /// 椭圆实体，记录主轴向量与参数范围（单位为弧度）。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Ellipse {
        pub center: Point2,
        pub major_axis: Vector2,
        pub ratio: f64,
        pub start_parameter: f64,
        pub end_parameter: f64,
    }

    /// 轻量多段线。`bulge` 属于以该顶点为起点的线段。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Polyline {
        pub vertices: Vec<PolylineVertex>,
        pub is_closed: bool,
    }

    impl Polyline {
        pub fn from_points<I>(points: I, is_closed: bool) -> Self
        where
            I: IntoIterator<Item = Point2>,
        {
            Self {
                vertices: points.into_iter().map(PolylineVertex::new).collect(),
                is_closed,
            }
        }

        pub fn points(&self) -> impl Iterator<Item = Point2> + '_ {
            self.vertices.iter().map(|vertex| vertex.position)
        }

        /// 线段数；闭合时包含最后一点回到起点的一段。
        pub fn segment_count(&self) -> usize {
            match self.vertices.len() {
                0 | 1 => 0,
                n if self.is_closed => n,
                n => n - 1,
            }
        }

        /// 第 `index` 段的两个端点。
        pub fn segment(&self, index: usize) -> Option<(Point2, Point2)> {
            if index >= self.segment_count() {
                return None;
            }
            let start = self.vertices[index].position;
            let end = self.vertices[(index + 1) % self.vertices.len()].position;
            Some((start, end))
        }

        #[inline]
        pub fn first_point(&self) -> Option<Point2> {
            self.vertices.first().map(|vertex| vertex.position)
        }

        #[inline]
        pub fn last_point(&self) -> Option<Point2> {
            self.vertices.last().map(|vertex| vertex.position)
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct PolylineVertex {
        pub position: Point2,
        pub bulge: f64,
    }

    impl PolylineVertex {
        #[inline]
        pub fn new(position: Point2) -> Self {
            Self {
                position,
                bulge: 0.0,
            }
        }

        #[inline]
        pub fn with_bulge(position: Point2, bulge: f64) -> Self {
            Self { position, bulge }
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Spline {
        pub degree: i32,
        pub is_closed: bool,
        pub control_points: Vec<Point2>,
        pub fit_points: Vec<Point2>,
        pub knot_values: Vec<f64>,
        pub weights: Vec<f64>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Text {
        pub insert: Point2,
        pub content: String,
        pub height: f64,
        pub rotation: f64,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct MText {
        pub insert: Point2,
        pub content: String,
        pub height: f64,
        pub reference_width: Option<f64>,
        pub direction: Vector2,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Point {
        pub position: Point2,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct BlockReference {
        pub name: String,
        pub insert: Point2,
        pub scale: Vector2,
        pub rotation: f64,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub enum DimensionKind {
        Linear,
        Aligned,
        Angular,
        Diameter,
        Radius,
        Angular3Point,
        Ordinate,
        Unknown(i16),
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Dimension {
        pub kind: DimensionKind,
        pub definition_point: Point2,
        pub text_midpoint: Point2,
        pub dimension_line_point: Option<Point2>,
        pub extension_line_origin: Option<Point2>,
        pub extension_line_end: Option<Point2>,
        pub secondary_point: Option<Point2>,
        pub arc_definition_point: Option<Point2>,
        pub center_point: Option<Point2>,
        pub text: Option<String>,
        pub measurement: Option<f64>,
        pub rotation: f64,
    }

    impl Dimension {
        /// 所有位置相关的点，必选点在前。
        pub fn points(&self) -> Vec<Point2> {
            let mut points = vec![self.definition_point, self.text_midpoint];
            points.extend(
                [
                    self.dimension_line_point,
                    self.extension_line_origin,
                    self.extension_line_end,
                    self.secondary_point,
                    self.arc_definition_point,
                    self.center_point,
                ]
                .into_iter()
                .flatten(),
            );
            points
        }

        pub fn points_mut(&mut self) -> Vec<&mut Point2> {
            let mut points = vec![&mut self.definition_point, &mut self.text_midpoint];
            points.extend(
                [
                    self.dimension_line_point.as_mut(),
                    self.extension_line_origin.as_mut(),
                    self.extension_line_end.as_mut(),
                    self.secondary_point.as_mut(),
                    self.arc_definition_point.as_mut(),
                    self.center_point.as_mut(),
                ]
                .into_iter()
                .flatten(),
            );
            points
        }
    }

    /// 实体仓库：按插入顺序保存 `(EntityId, Entity)`，索引在撤销恢复后保持稳定。
    #[derive(Debug, Default, Clone, Serialize, Deserialize)]
    pub struct Document {
        layers: HashMap<String, Layer>,
        entities: Vec<(EntityId, Entity)>,
        next_entity_id: u64,
    }

    impl Document {
        pub fn new() -> Self {
            let mut doc = Self::default();
            doc.ensure_layer(DEFAULT_LAYER);
            doc
        }

        pub fn ensure_layer(&mut self, name: impl AsRef<str>) {
            let key = name.as_ref();
            self.layers
                .entry(key.to_string())
                .or_insert_with(|| Layer::new(key));
        }

        #[inline]
        pub fn layer(&self, name: &str) -> Option<&Layer> {
            self.layers.get(name)
        }

        pub fn set_layer_locked(&mut self, name: impl AsRef<str>, locked: bool) {
            self.ensure_layer(name.as_ref());
            if let Some(layer) = self.layers.get_mut(name.as_ref()) {
                layer.is_locked = locked;
            }
        }

        /// 未知图层视为未锁定。
        #[inline]
        pub fn is_layer_locked(&self, name: &str) -> bool {
            self.layers.get(name).is_some_and(|layer| layer.is_locked)
        }

        /// 分配新句柄。计数器只增不减。
        #[inline]
        pub fn generate_handle(&mut self) -> EntityId {
            let id = self.next_entity_id;
            self.next_entity_id += 1;
            EntityId(id)
        }

        pub fn add_entity(&mut self, entity: Entity) -> EntityId {
            self.ensure_layer(&entity.layer);
            let id = self.generate_handle();
            self.entities.push((id, entity));
            id
        }

        pub fn add_line(
            &mut self,
            start: Point2,
            end: Point2,
            layer: impl Into<String>,
        ) -> EntityId {
            self.add_entity(Entity::new(Geometry::Line(Line { start, end })).on_layer(layer))
        }

        pub fn add_circle(
            &mut self,
            center: Point2,
            radius: f64,
            layer: impl Into<String>,
        ) -> EntityId {
            let circle = Circle {
                center,
                radius: radius.abs(),
            };
            self.add_entity(Entity::new(Geometry::Circle(circle)).on_layer(layer))
        }

        pub fn add_arc(
            &mut self,
            center: Point2,
            radius: f64,
            start_angle: f64,
            end_angle: f64,
            layer: impl Into<String>,
        ) -> EntityId {
            let arc = Arc {
                center,
                radius: radius.abs(),
                start_angle,
                end_angle,
            };
            self.add_entity(Entity::new(Geometry::Arc(arc)).on_layer(layer))
        }

        pub fn add_polyline<I>(
            &mut self,
            points: I,
            is_closed: bool,
            layer: impl Into<String>,
        ) -> EntityId
        where
            I: IntoIterator<Item = Point2>,
        {
            let polyline = Polyline::from_points(points, is_closed);
            self.add_entity(Entity::new(Geometry::Polyline(polyline)).on_layer(layer))
        }

        pub fn add_text(
            &mut self,
            insert: Point2,
            content: impl Into<String>,
            height: f64,
            rotation: f64,
            layer: impl Into<String>,
        ) -> EntityId {
            let text = Text {
                insert,
                content: content.into(),
                height,
                rotation,
            };
            self.add_entity(Entity::new(Geometry::Text(text)).on_layer(layer))
        }

        /// 复制实体并分配新句柄，副本追加到末尾。
        pub fn clone_entity(&mut self, id: EntityId) -> Option<EntityId> {
            let entity = self.entity(id)?.clone();
            Some(self.add_entity(entity))
        }

        /// 在指定索引处放回实体（撤销删除时使用），索引超出时追加。
        pub fn insert_entity_at(&mut self, index: usize, id: EntityId, entity: Entity) {
            self.ensure_layer(&entity.layer);
            self.next_entity_id = self.next_entity_id.max(id.get() + 1);
            let index = index.min(self.entities.len());
            self.entities.insert(index, (id, entity));
        }

        /// 删除实体，返回它原来的索引与内容。
        pub fn remove_entity(&mut self, id: EntityId) -> Option<(usize, Entity)> {
            let index = self.index_of(id)?;
            let (_, entity) = self.entities.remove(index);
            Some((index, entity))
        }

        /// 原位替换实体内容，返回旧值。
        pub fn replace_entity(&mut self, id: EntityId, entity: Entity) -> Option<Entity> {
            self.ensure_layer(&entity.layer);
            let slot = self.entity_mut(id)?;
            Some(std::mem::replace(slot, entity))
        }

        #[inline]
        pub fn index_of(&self, id: EntityId) -> Option<usize> {
            self.entities.iter().position(|(entity_id, _)| *entity_id == id)
        }

        #[inline]
        pub fn contains(&self, id: EntityId) -> bool {
            self.index_of(id).is_some()
        }

        #[inline]
        pub fn layers(&self) -> impl Iterator<Item = &Layer> {
            self.layers.values()
        }

        #[inline]
        pub fn entities(&self) -> impl Iterator<Item = &(EntityId, Entity)> {
            self.entities.iter()
        }

        #[inline]
        pub fn entity_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
            self.entities.iter().map(|(id, _)| *id)
        }

        #[inline]
        pub fn entity_count(&self) -> usize {
            self.entities.len()
        }

        #[inline]
        pub fn entity(&self, id: EntityId) -> Option<&Entity> {
            self.entities
                .iter()
                .find_map(|(entity_id, entity)| (*entity_id == id).then_some(entity))
        }

        #[inline]
        pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
            self.entities
                .iter_mut()
                .find_map(|(entity_id, entity)| (*entity_id == id).then_some(entity))
        }
    }

    pub(crate) fn normalize_angle(angle: f64) -> f64 {
        let mut result = angle % TAU;
        if result < 0.0 {
            result += TAU;
        }
        result
    }

    fn canonical_interval(start: f64, end: f64) -> (f64, f64) {
        let start = normalize_angle(start);
        let mut end = normalize_angle(end);
        if (end - start).abs() < 1e-9 {
            end = start + TAU;
        } else if end < start {
            end += TAU;
        }
        (start, end)
    }

    fn arc_point(center: Point2, radius: f64, angle: f64) -> Point2 {
        let offset = Vector2::new(radius * angle.cos(), radius * angle.sin());
        center.translate(offset)
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::f64::consts::{FRAC_PI_2, PI};

        #[test]
        fn document_stores_entities() {
            let mut doc = Document::new();
            let id = doc.add_line(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), "0");
            let circle_id = doc.add_circle(Point2::new(5.0, 5.0), 2.0, "ANNOT");
            let arc_id = doc.add_arc(Point2::new(5.0, 0.0), 3.5, 0.0, FRAC_PI_2, "GEOM");
            let polyline_id = doc.add_polyline(
                [
                    Point2::new(0.0, 0.0),
                    Point2::new(2.0, 2.0),
                    Point2::new(4.0, 0.0),
                ],
                true,
                "SHAPE",
            );

            assert_eq!(id.get(), 0);
            assert_eq!(circle_id.get(), 1);
            assert_eq!(arc_id.get(), 2);
            assert_eq!(polyline_id.get(), 3);
            let layers: Vec<_> = doc.layers().map(|l| l.name.clone()).collect();
            for name in ["0", "ANNOT", "GEOM", "SHAPE"] {
                assert!(layers.contains(&name.to_string()));
            }
            assert_eq!(doc.entity_count(), 4);

            match doc.entity(arc_id).map(|entity| &entity.geometry) {
                Some(Geometry::Arc(arc)) => {
                    assert!((arc.radius - 3.5).abs() < f64::EPSILON);
                }
                other => panic!("unexpected entity lookup result: {other:?}"),
            }
            assert_eq!(doc.entity(arc_id).unwrap().layer, "GEOM");
            assert_eq!(doc.entity(polyline_id).unwrap().type_name(), "LWPOLYLINE");
        }

        #[test]
        fn new_entities_default_to_layer_zero() {
            let entity = Entity::new(Geometry::Point(Point {
                position: Point2::new(1.0, 1.0),
            }));
            assert_eq!(entity.layer, "0");
            assert_eq!(entity.color, Color::ByLayer);
        }

        #[test]
        fn remove_and_reinsert_keeps_index() {
            let mut doc = Document::new();
            let a = doc.add_line(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), "0");
            let b = doc.add_circle(Point2::new(0.0, 0.0), 1.0, "0");
            let c = doc.add_line(Point2::new(0.0, 1.0), Point2::new(1.0, 1.0), "0");

            let (index, entity) = doc.remove_entity(b).expect("remove circle");
            assert_eq!(index, 1);
            assert!(!doc.contains(b));

            doc.insert_entity_at(index, b, entity);
            let order: Vec<_> = doc.entity_ids().collect();
            assert_eq!(order, vec![a, b, c]);
        }

        #[test]
        fn handles_are_never_reused() {
            let mut doc = Document::new();
            let a = doc.add_line(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), "0");
            doc.remove_entity(a);
            let b = doc.add_line(Point2::new(0.0, 0.0), Point2::new(1.0, 0.0), "0");
            assert_ne!(a, b);
        }

        #[test]
        fn layer_lock_flags() {
            let mut doc = Document::new();
            assert!(!doc.is_layer_locked("0"));
            assert!(!doc.is_layer_locked("MISSING"));
            doc.set_layer_locked("FRAME", true);
            assert!(doc.is_layer_locked("FRAME"));
            doc.set_layer_locked("FRAME", false);
            assert!(!doc.is_layer_locked("FRAME"));
        }

        #[test]
        fn arc_angle_containment_wraps() {
            let arc = Arc {
                center: Point2::origin(),
                radius: 1.0,
                start_angle: 1.5 * PI,
                end_angle: 0.5 * PI,
            };
            assert!(arc.contains_angle(0.0));
            assert!(!arc.contains_angle(PI));
        }
    }
}
