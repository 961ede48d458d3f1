//! 内置编辑命令。每个命令是一个状态机，提示结果驱动状态转换。

mod circle;
mod copy;
mod erase;
mod history;
mod line;
mod modify;
mod offset;
mod pedit;
mod polyline;
mod rectangle;

use zedit_core::document::EntityId;

use crate::command::CommandRegistry;
use crate::engine::CommandEngine;
use crate::input::Keyword;

pub use circle::CircleCommand;
pub use copy::CopyCommand;
pub use erase::EraseCommand;
pub use history::{RedoCommand, UndoCommand};
pub use line::LineCommand;
pub use modify::MoveCommand;
pub use offset::OffsetCommand;
pub use pedit::PeditCommand;
pub use polyline::PolylineCommand;
pub use rectangle::RectangleCommand;

pub fn register_defaults(registry: &mut CommandRegistry) {
    registry.register(LineCommand);
    registry.register(PolylineCommand);
    registry.register(CircleCommand);
    registry.register(RectangleCommand);
    registry.register(MoveCommand);
    registry.register(CopyCommand);
    registry.register(EraseCommand);
    registry.register(OffsetCommand);
    registry.register(PeditCommand);
    registry.register(UndoCommand);
    registry.register(RedoCommand);
}

/// 两点视为重合的距离。
const COINCIDENT: f64 = 1e-9;

fn keyword(display: &str, global: &str, local: &str) -> Keyword {
    Keyword::new(display, global).with_local(local)
}

/// 过滤掉锁定图层上的实体并提示被跳过的数量。
fn editable(engine: &mut CommandEngine<'_>, ids: Vec<EntityId>) -> Vec<EntityId> {
    let total = ids.len();
    let kept: Vec<EntityId> = ids
        .into_iter()
        .filter(|id| !engine.scene().is_entity_locked(*id))
        .collect();
    let skipped = total - kept.len();
    if skipped > 0 {
        engine.respond(&format!("{skipped} 个对象位于锁定的图层上"));
    }
    kept
}
