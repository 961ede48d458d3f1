use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, warn};
use zedit_core::document::{Document, Entity, EntityId};
use zedit_core::geometry::Vector2;
use zedit_core::ops::apply_displacement;

type Step = Box<dyn FnMut(&mut Document) + Send>;

/// 实体在文档中的位置快照，恢复时按索引升序插回即可还原原始顺序。
#[derive(Debug, Clone, PartialEq)]
pub struct EntitySnapshot {
    pub index: usize,
    pub id: EntityId,
    pub entity: Entity,
}

/// 单个实体修改前后的内容。
#[derive(Debug, Clone, PartialEq)]
pub struct EntityChange {
    pub id: EntityId,
    pub before: Entity,
    pub after: Entity,
}

/// 一条可撤销记录。两个闭包都在拿到文档独占借用时整体执行。
pub struct UndoAction {
    label: String,
    undo: Step,
    redo: Step,
}

impl UndoAction {
    pub fn new<U, R>(label: impl Into<String>, undo: U, redo: R) -> Self
    where
        U: FnMut(&mut Document) + Send + 'static,
        R: FnMut(&mut Document) + Send + 'static,
    {
        Self {
            label: label.into(),
            undo: Box::new(undo),
            redo: Box::new(redo),
        }
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl fmt::Debug for UndoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UndoAction")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// 线性撤销历史。记录新操作会丢弃全部可重做项。
#[derive(Debug, Default)]
pub struct UndoLog {
    done: VecDeque<UndoAction>,
    undone: Vec<UndoAction>,
    max_depth: usize,
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// `max_depth` 为 0 表示不限深度。
    pub fn with_max_depth(max_depth: usize) -> Self {
        Self {
            max_depth,
            ..Self::default()
        }
    }

    pub fn record(&mut self, action: UndoAction) {
        debug!(label = action.label(), "记录撤销项");
        self.undone.clear();
        self.done.push_back(action);
        if self.max_depth > 0 {
            while self.done.len() > self.max_depth {
                self.done.pop_front();
            }
        }
    }

    pub fn undo(&mut self, document: &mut Document) -> Option<String> {
        let mut action = self.done.pop_back()?;
        (action.undo)(document);
        let label = action.label.clone();
        self.undone.push(action);
        Some(label)
    }

    pub fn redo(&mut self, document: &mut Document) -> Option<String> {
        let mut action = self.undone.pop()?;
        (action.redo)(document);
        let label = action.label.clone();
        self.done.push_back(action);
        Some(label)
    }

    #[inline]
    pub fn can_undo(&self) -> bool {
        !self.done.is_empty()
    }

    #[inline]
    pub fn can_redo(&self) -> bool {
        !self.undone.is_empty()
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.done.back().map(UndoAction::label)
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.undone.last().map(UndoAction::label)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.done.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }

    pub fn clear(&mut self) {
        self.done.clear();
        self.undone.clear();
    }

    /// 记录一批新建实体。实体内容与位置在此刻快照。
    pub fn record_add(&mut self, label: &str, document: &Document, ids: &[EntityId]) {
        let mut created: Vec<EntitySnapshot> = ids
            .iter()
            .filter_map(|id| {
                let index = document.index_of(*id)?;
                let entity = document.entity(*id)?.clone();
                Some(EntitySnapshot {
                    index,
                    id: *id,
                    entity,
                })
            })
            .collect();
        if created.is_empty() {
            return;
        }
        created.sort_by_key(|snapshot| snapshot.index);

        let restore = created.clone();
        self.record(UndoAction::new(
            label,
            move |document| remove_all(document, &created),
            move |document| restore_all(document, &restore),
        ));
    }

    /// 记录一批删除。`removed` 必须按删除前的索引升序排列。
    pub fn record_delete(&mut self, label: &str, removed: Vec<EntitySnapshot>) {
        if removed.is_empty() {
            return;
        }
        let again = removed.clone();
        self.record(UndoAction::new(
            label,
            move |document| restore_all(document, &removed),
            move |document| remove_all(document, &again),
        ));
    }

    /// 记录一次整体位移。`ids` 只应包含已成功位移的实体。
    pub fn record_move(&mut self, label: &str, ids: Vec<EntityId>, delta: Vector2) {
        if ids.is_empty() {
            return;
        }
        let back = ids.clone();
        self.record(UndoAction::new(
            label,
            move |document| displace_all(document, &back, -delta),
            move |document| displace_all(document, &ids, delta),
        ));
    }

    pub fn record_modify(&mut self, label: &str, changes: Vec<EntityChange>) {
        if changes.is_empty() {
            return;
        }
        let again = changes.clone();
        self.record(UndoAction::new(
            label,
            move |document| {
                for change in &changes {
                    document.replace_entity(change.id, change.before.clone());
                }
            },
            move |document| {
                for change in &again {
                    document.replace_entity(change.id, change.after.clone());
                }
            },
        ));
    }

    /// 合并：目标实体被修改，被合并的源实体被删除，两者在一步内完成。
    pub fn record_join(&mut self, label: &str, change: EntityChange, removed: Vec<EntitySnapshot>) {
        let undo_change = change.clone();
        let undo_removed = removed.clone();
        self.record(UndoAction::new(
            label,
            move |document| {
                restore_all(document, &undo_removed);
                document.replace_entity(undo_change.id, undo_change.before.clone());
            },
            move |document| {
                document.replace_entity(change.id, change.after.clone());
                remove_all(document, &removed);
            },
        ));
    }
}

fn restore_all(document: &mut Document, snapshots: &[EntitySnapshot]) {
    for snapshot in snapshots {
        document.insert_entity_at(snapshot.index, snapshot.id, snapshot.entity.clone());
    }
}

fn remove_all(document: &mut Document, snapshots: &[EntitySnapshot]) {
    for snapshot in snapshots.iter().rev() {
        document.remove_entity(snapshot.id);
    }
}

fn displace_all(document: &mut Document, ids: &[EntityId], delta: Vector2) {
    for id in ids {
        let Some(entity) = document.entity_mut(*id) else {
            continue;
        };
        if let Err(err) = apply_displacement(entity, delta) {
            warn!(id = id.get(), %err, "撤销位移失败");
        }
    }
}
