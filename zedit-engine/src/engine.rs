use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace};
use zedit_core::document::EntityId;
use zedit_core::geometry::{Point2, Vector2};
use zedit_core::ops::{JOIN_TOLERANCE, distance_to_entity};

use crate::console::{Console, Severity};
use crate::errors::EngineError;
use crate::input::{
    Classified, InputSource, Keyword, PromptOptions, PromptResult, RawValue, classify,
    parse_coordinate, parse_number,
};
use crate::jig::Jig;
use crate::scene::Scene;

/// 跨线程取消标志。宿主置位，引擎在每个提示与命令循环顶部检查。
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// 拾取实体时允许的最大距离（世界单位）。
    pub pick_tolerance: f64,
    pub join_tolerance: f64,
    pub prompt_suffix: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            pick_tolerance: 0.5,
            join_tolerance: JOIN_TOLERANCE,
            prompt_suffix: ": ".to_string(),
        }
    }
}

/// 单个值解析后的去向。
enum Step<T> {
    Resolve(PromptResult<T>),
    Reject(String),
    Pending,
}

/// 命令执行期间的交互中枢：独占场景，向输入源拉取事件，向控制台输出文本。
pub struct CommandEngine<'a> {
    scene: &'a mut Scene,
    input: &'a mut dyn InputSource,
    console: &'a mut dyn Console,
    cancel: CancelToken,
    settings: EngineSettings,
}

impl<'a> CommandEngine<'a> {
    pub fn new(
        scene: &'a mut Scene,
        input: &'a mut dyn InputSource,
        console: &'a mut dyn Console,
        cancel: CancelToken,
        settings: EngineSettings,
    ) -> Self {
        Self {
            scene,
            input,
            console,
            cancel,
            settings,
        }
    }

    #[inline]
    pub fn scene(&self) -> &Scene {
        self.scene
    }

    #[inline]
    pub fn scene_mut(&mut self) -> &mut Scene {
        self.scene
    }

    #[inline]
    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    #[inline]
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn print(&mut self, message: &str, severity: Severity) {
        self.console.print(message, severity);
    }

    pub fn respond(&mut self, message: &str) {
        self.print(message, Severity::Response);
    }

    pub fn report_error(&mut self, message: &str) {
        self.print(message, Severity::Error);
    }

    /// 取消标志已置位时返回 `Cancelled`，供命令循环顶部用 `?` 退出。
    pub fn poll_cancel(&self) -> Result<(), EngineError> {
        if self.cancel.is_raised() {
            Err(EngineError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// 命令结束后的统一清理：预览、绘图辅助点、高亮与选择集。
    pub fn cleanup(&mut self) {
        self.scene.clear_preview();
        self.scene.cancel_drawing();
        self.scene.clear_highlight();
        self.scene.clear_selection();
        self.cancel.reset();
    }

    pub fn get_point(&mut self, options: PromptOptions) -> PromptResult<Point2> {
        let base = options.base_point;
        self.run_prompt(&options, |_, raw| match raw {
            RawValue::Point(point) => Step::Resolve(PromptResult::Ok(point)),
            RawValue::Text(text) => match parse_coordinate(&text, base) {
                Some(point) => Step::Resolve(PromptResult::Ok(point)),
                None => Step::Reject("点无效或选项关键字无效".to_string()),
            },
        })
    }

    /// 距离可以直接输入数值，也可以由基点与拾取点确定；
    /// 没有基点时第一次拾取作为起点，再提示第二点。
    pub fn get_distance(&mut self, options: PromptOptions) -> PromptResult<f64> {
        let base = options.base_point;
        let allow_negative = options.allow_negative;
        self.run_prompt(&options, |engine, raw| {
            let point = match raw {
                RawValue::Point(point) => point,
                RawValue::Text(text) => {
                    if let Some(value) = parse_number(&text) {
                        if value < 0.0 && !allow_negative {
                            return Step::Reject("需要正数或零".to_string());
                        }
                        return Step::Resolve(PromptResult::Ok(value));
                    }
                    match parse_coordinate(&text, base) {
                        Some(point) => point,
                        None => return Step::Reject("需要数值距离或两个点".to_string()),
                    }
                }
            };
            match base {
                Some(base) => Step::Resolve(PromptResult::Ok(base.distance(point))),
                None => {
                    let second = engine.get_point(
                        PromptOptions::new("指定第二点")
                            .base(point)
                            .jig(Jig::Line { from: point }),
                    );
                    Step::Resolve(second.map(|end| point.distance(end)))
                }
            }
        })
    }

    /// 拾取单个实体，返回实体 ID 与拾取点。未命中时提示并重新等待。
    pub fn get_entity(&mut self, options: PromptOptions) -> PromptResult<(EntityId, Point2)> {
        let base = options.base_point;
        self.run_prompt(&options, |engine, raw| {
            let point = match raw {
                RawValue::Point(point) => point,
                RawValue::Text(text) => match parse_coordinate(&text, base) {
                    Some(point) => point,
                    None => return Step::Reject("需要点或选项关键字".to_string()),
                },
            };
            match engine.pick(point) {
                Some(id) => Step::Resolve(PromptResult::Ok((id, point))),
                None => Step::Reject("未选中对象".to_string()),
            }
        })
    }

    /// 收集选择集。已有预选时直接返回；否则逐个拾取，`ALL` 选中全部，空回车结束。
    pub fn get_selection(&mut self, options: PromptOptions) -> PromptResult<Vec<EntityId>> {
        if !options.ignore_preselection && self.scene.selection_len() > 0 {
            let ids: Vec<EntityId> = self.scene.selection().collect();
            self.scene.highlight_entities(&ids);
            return PromptResult::Ok(ids);
        }

        let mut options = options.keyword(Keyword::new("ALL", "ALL"));
        options.allow_none = true;
        let mut picked: Vec<EntityId> = Vec::new();

        loop {
            let result: PromptResult<()> = self.run_prompt(&options, |engine, raw| {
                let point = match raw {
                    RawValue::Point(point) => point,
                    RawValue::Text(text) => match parse_coordinate(&text, None) {
                        Some(point) => point,
                        None => return Step::Reject("需要点或选项关键字".to_string()),
                    },
                };
                match engine.pick(point) {
                    Some(id) => {
                        engine.add_to_selection(&mut picked, &[id]);
                        Step::Pending
                    }
                    None => Step::Reject("未选中对象".to_string()),
                }
            });
            match result {
                PromptResult::Keyword(keyword) if keyword == "ALL" => {
                    let all: Vec<EntityId> = self.scene.document().entity_ids().collect();
                    self.add_to_selection(&mut picked, &all);
                }
                PromptResult::None if picked.is_empty() => return PromptResult::None,
                PromptResult::None => return PromptResult::Ok(picked),
                PromptResult::Ok(()) => return PromptResult::Ok(picked),
                PromptResult::Keyword(keyword) => return PromptResult::Keyword(keyword),
                PromptResult::Cancel => return PromptResult::Cancel,
                PromptResult::Error(message) => return PromptResult::Error(message),
            }
        }
    }

    /// 只接受关键字的提示，值永远不会成功解析。
    pub fn get_keyword(&mut self, options: PromptOptions) -> PromptResult<()> {
        self.run_prompt(&options, |_, _| Step::Reject("需要选项关键字".to_string()))
    }

    /// 拾取容差内距离最近的实体。
    pub fn pick(&self, point: Point2) -> Option<EntityId> {
        let tolerance = self.settings.pick_tolerance;
        self.scene
            .document()
            .entities()
            .filter_map(|(id, entity)| {
                distance_to_entity(entity, point).map(|distance| (*id, distance))
            })
            .filter(|(_, distance)| *distance <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    fn add_to_selection(&mut self, picked: &mut Vec<EntityId>, ids: &[EntityId]) {
        let mut added = 0;
        for id in ids {
            if picked.contains(id) {
                continue;
            }
            if self.scene.select(*id).is_ok() {
                picked.push(*id);
                added += 1;
            }
        }
        self.scene.highlight_entities(ids);
        self.respond(&format!("找到 {added} 个，总计 {} 个", picked.len()));
    }

    fn show_prompt(&mut self, options: &PromptOptions) {
        let text = options.render(&self.settings.prompt_suffix);
        self.console.print(&text, Severity::Command);
    }

    /// 提示主循环：拉取事件直到得到终止结果。预览在返回前清除。
    fn run_prompt<T>(
        &mut self,
        options: &PromptOptions,
        mut accept: impl FnMut(&mut Self, RawValue) -> Step<T>,
    ) -> PromptResult<T> {
        self.show_prompt(options);
        let result = loop {
            if self.cancel.is_raised() {
                break PromptResult::Cancel;
            }
            let Some(event) = self.input.next_event() else {
                debug!("输入流结束");
                break PromptResult::Error(EngineError::InputClosed.to_string());
            };
            trace!(?event, "收到输入事件");
            match classify(event, &options.keywords, options.allow_none) {
                Classified::Cancel => break PromptResult::Cancel,
                Classified::None => break PromptResult::None,
                Classified::Keyword(keyword) => break PromptResult::Keyword(keyword),
                Classified::Empty => self.show_prompt(options),
                Classified::Preview(raw) => self.update_jig(options, raw),
                Classified::Value(raw) => match accept(self, raw) {
                    Step::Resolve(result) => break result,
                    Step::Reject(message) => {
                        self.report_error(&message);
                        self.show_prompt(options);
                    }
                    Step::Pending => self.show_prompt(options),
                },
            }
        };
        self.scene.clear_preview();
        result
    }

    fn update_jig(&mut self, options: &PromptOptions, raw: RawValue) {
        let Some(jig) = &options.jig else {
            return;
        };
        let cursor = match raw {
            RawValue::Point(point) => Some(point),
            RawValue::Text(text) => parse_coordinate(&text, options.base_point).or_else(|| {
                let value = parse_number(&text)?;
                options
                    .base_point
                    .map(|base| base + Vector2::new(value, 0.0))
            }),
        };
        if let Some(cursor) = cursor {
            self.scene.set_preview(jig.update(cursor));
        }
    }
}
