pub mod command;
pub mod commands;
pub mod engine;
pub mod input;
pub mod jig;
pub mod undo;

pub mod errors {
    use thiserror::Error;
    use zedit_core::errors::GeometryError;

    #[derive(Debug, Error)]
    pub enum EngineError {
        #[error("entity with id {0} not found")]
        EntityNotFound(u64),
        #[error("命令已取消")]
        Cancelled,
        #[error("输入流已关闭")]
        InputClosed,
        #[error(transparent)]
        Geometry(#[from] GeometryError),
    }
}

pub mod console {
    /// 命令行消息的类别，决定宿主的显示样式。
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Severity {
        Command,
        Response,
        Success,
        Error,
    }

    /// 命令行文本控件。引擎只向它输出文本，不读取任何返回值。
    pub trait Console {
        fn print(&mut self, message: &str, severity: Severity);
    }

    /// 把消息留在内存里的控制台，测试与脚本回放时使用。
    #[derive(Debug, Default)]
    pub struct MessageLog {
        entries: Vec<(Severity, String)>,
    }

    impl MessageLog {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn entries(&self) -> &[(Severity, String)] {
            &self.entries
        }

        pub fn contains(&self, needle: &str) -> bool {
            self.entries.iter().any(|(_, text)| text.contains(needle))
        }

        pub fn count(&self, severity: Severity) -> usize {
            self.entries
                .iter()
                .filter(|(entry, _)| *entry == severity)
                .count()
        }
    }

    impl Console for MessageLog {
        fn print(&mut self, message: &str, severity: Severity) {
            self.entries.push((severity, message.to_string()));
        }
    }
}

pub mod scene {
    use std::collections::BTreeSet;

    use tracing::debug;
    use zedit_core::document::{Document, Entity, EntityId};
    use zedit_core::geometry::{Point2, Vector2};

    use crate::errors::EngineError;
    use crate::undo::{EntityChange, EntitySnapshot, UndoLog};

    /// 跨命令保留的会话变量，例如 OFFSET 的默认距离。
    #[derive(Debug, Clone, Default)]
    pub struct SessionVariables {
        pub offset_distance: Option<f64>,
        pub offset_through: bool,
    }

    /// 宿主协作方：持有文档、选择集、高亮、绘图辅助与撤销日志。
    /// 命令执行期间由引擎独占借用，因此始终只有一个写入者。
    #[derive(Debug)]
    pub struct Scene {
        document: Document,
        selected: BTreeSet<EntityId>,
        highlighted: BTreeSet<EntityId>,
        preview: Vec<Entity>,
        drawing_points: Vec<Point2>,
        undo: UndoLog,
        session: SessionVariables,
    }

    #[derive(Debug, Clone, Copy)]
    pub struct DemoEntities {
        pub baseline: EntityId,
        pub circle: EntityId,
        pub arc: EntityId,
        pub polyline: EntityId,
        pub label: EntityId,
    }

    impl Scene {
        pub fn new() -> Self {
            Self::with_undo_log(UndoLog::new())
        }

        pub fn with_undo_log(undo: UndoLog) -> Self {
            Self {
                document: Document::new(),
                selected: BTreeSet::new(),
                highlighted: BTreeSet::new(),
                preview: Vec::new(),
                drawing_points: Vec::new(),
                undo,
                session: SessionVariables::default(),
            }
        }

        /// 使用现有文档初始化场景。
        pub fn with_document(document: Document) -> Self {
            let mut scene = Self::new();
            scene.document = document;
            scene
        }

        #[inline]
        pub fn document(&self) -> &Document {
            &self.document
        }

        #[inline]
        pub fn document_mut(&mut self) -> &mut Document {
            &mut self.document
        }

        #[inline]
        pub fn entity(&self, id: EntityId) -> Option<&Entity> {
            self.document.entity(id)
        }

        #[inline]
        pub fn generate_handle(&mut self) -> EntityId {
            self.document.generate_handle()
        }

        pub fn add_entity(&mut self, entity: Entity) -> EntityId {
            let id = self.document.add_entity(entity);
            debug!(id = id.get(), "已添加实体");
            id
        }

        pub fn clone_entity(&mut self, id: EntityId) -> Result<EntityId, EngineError> {
            self.document
                .clone_entity(id)
                .ok_or(EngineError::EntityNotFound(id.get()))
        }

        /// 删除单个实体，返回原索引与内容。
        pub fn delete_entity(&mut self, id: EntityId) -> Option<(usize, Entity)> {
            self.selected.remove(&id);
            self.highlighted.remove(&id);
            self.document.remove_entity(id)
        }

        /// 批量删除。返回的快照按删除前的索引升序排列，可直接用于原位恢复。
        pub fn delete_entities(&mut self, ids: &[EntityId]) -> Vec<EntitySnapshot> {
            let mut indexed: Vec<(usize, EntityId)> = ids
                .iter()
                .filter_map(|id| self.document.index_of(*id).map(|index| (index, *id)))
                .collect();
            indexed.sort_unstable();
            indexed.dedup();

            let mut removed: Vec<EntitySnapshot> = indexed
                .iter()
                .rev()
                .filter_map(|(_, id)| {
                    self.delete_entity(*id)
                        .map(|(index, entity)| EntitySnapshot {
                            index,
                            id: *id,
                            entity,
                        })
                })
                .collect();
            removed.reverse();
            removed
        }

        pub fn replace_entity(
            &mut self,
            id: EntityId,
            entity: Entity,
        ) -> Result<Entity, EngineError> {
            self.document
                .replace_entity(id, entity)
                .ok_or(EngineError::EntityNotFound(id.get()))
        }

        #[inline]
        pub fn is_layer_locked(&self, layer: &str) -> bool {
            self.document.is_layer_locked(layer)
        }

        pub fn set_layer_locked(&mut self, layer: &str, locked: bool) {
            self.document.set_layer_locked(layer, locked);
        }

        /// 实体所在图层是否锁定；实体不存在时视为未锁定。
        pub fn is_entity_locked(&self, id: EntityId) -> bool {
            self.entity(id)
                .is_some_and(|entity| self.is_layer_locked(&entity.layer))
        }

        /// 返回当前选中实体数量。
        #[inline]
        pub fn selection_len(&self) -> usize {
            self.selected.len()
        }

        #[inline]
        pub fn is_selected(&self, id: EntityId) -> bool {
            self.selected.contains(&id)
        }

        /// 选中指定实体。若实体不存在则返回错误。
        pub fn select(&mut self, id: EntityId) -> Result<(), EngineError> {
            if !self.document.contains(id) {
                return Err(EngineError::EntityNotFound(id.get()));
            }
            self.selected.insert(id);
            Ok(())
        }

        /// 取消选中指定实体，返回之前是否处于选中状态。
        pub fn deselect(&mut self, id: EntityId) -> bool {
            self.selected.remove(&id)
        }

        #[inline]
        pub fn clear_selection(&mut self) {
            self.selected.clear();
        }

        #[inline]
        pub fn selection(&self) -> impl Iterator<Item = EntityId> + '_ {
            self.selected.iter().copied()
        }

        pub fn highlight_entities(&mut self, ids: &[EntityId]) {
            self.highlighted.extend(ids.iter().copied());
        }

        #[inline]
        pub fn clear_highlight(&mut self) {
            self.highlighted.clear();
        }

        #[inline]
        pub fn highlighted(&self) -> impl Iterator<Item = EntityId> + '_ {
            self.highlighted.iter().copied()
        }

        #[inline]
        pub fn add_drawing_point(&mut self, point: Point2) {
            self.drawing_points.push(point);
        }

        #[inline]
        pub fn pop_drawing_point(&mut self) -> Option<Point2> {
            self.drawing_points.pop()
        }

        #[inline]
        pub fn drawing_points(&self) -> &[Point2] {
            &self.drawing_points
        }

        /// 清除命令期间留下的绘图辅助点与橡皮筋预览。
        pub fn cancel_drawing(&mut self) {
            self.drawing_points.clear();
            self.preview.clear();
        }

        #[inline]
        pub fn set_preview(&mut self, entities: Vec<Entity>) {
            self.preview = entities;
        }

        #[inline]
        pub fn clear_preview(&mut self) {
            self.preview.clear();
        }

        #[inline]
        pub fn preview(&self) -> &[Entity] {
            &self.preview
        }

        #[inline]
        pub fn undo_log(&self) -> &UndoLog {
            &self.undo
        }

        #[inline]
        pub fn session(&self) -> &SessionVariables {
            &self.session
        }

        #[inline]
        pub fn session_mut(&mut self) -> &mut SessionVariables {
            &mut self.session
        }

        pub fn record_add(&mut self, label: &str, ids: &[EntityId]) {
            self.undo.record_add(label, &self.document, ids);
        }

        pub fn record_delete(&mut self, label: &str, removed: Vec<EntitySnapshot>) {
            self.undo.record_delete(label, removed);
        }

        pub fn record_move(&mut self, label: &str, ids: Vec<EntityId>, delta: Vector2) {
            self.undo.record_move(label, ids, delta);
        }

        pub fn record_modify(&mut self, label: &str, changes: Vec<EntityChange>) {
            self.undo.record_modify(label, changes);
        }

        pub fn record_join(
            &mut self,
            label: &str,
            change: EntityChange,
            removed: Vec<EntitySnapshot>,
        ) {
            self.undo.record_join(label, change, removed);
        }

        /// 撤销最近一次操作，返回其标签。
        pub fn undo(&mut self) -> Option<String> {
            self.selected.clear();
            self.highlighted.clear();
            self.undo.undo(&mut self.document)
        }

        pub fn redo(&mut self) -> Option<String> {
            self.selected.clear();
            self.highlighted.clear();
            self.undo.redo(&mut self.document)
        }

        /// 为 CLI / 快速验证填充一组示例实体，返回关键实体 ID。
        pub fn populate_demo(&mut self) -> DemoEntities {
            use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

            self.clear_selection();

            let baseline =
                self.document
                    .add_line(Point2::new(0.0, 0.0), Point2::new(100.0, 0.0), "0");
            let circle = self
                .document
                .add_circle(Point2::new(50.0, 25.0), 12.5, "ANNOT");
            let arc = self
                .document
                .add_arc(Point2::new(20.0, 10.0), 7.5, 0.0, FRAC_PI_2, "ANNOT");
            let polyline = self.document.add_polyline(
                [
                    Point2::new(0.0, 10.0),
                    Point2::new(10.0, 20.0),
                    Point2::new(25.0, 5.0),
                ],
                false,
                "SKETCH",
            );
            let label = self.document.add_text(
                Point2::new(5.0, 12.0),
                "Rust 编辑示例",
                3.5,
                FRAC_PI_4,
                "ANNOT",
            );

            let ids = DemoEntities {
                baseline,
                circle,
                arc,
                polyline,
                label,
            };

            debug!(
                baseline = ids.baseline.get(),
                circle = ids.circle.get(),
                arc = ids.arc.get(),
                polyline = ids.polyline.get(),
                label = ids.label.get(),
                "已创建演示实体"
            );

            ids
        }
    }

    impl Default for Scene {
        fn default() -> Self {
            Self::new()
        }
    }

}
