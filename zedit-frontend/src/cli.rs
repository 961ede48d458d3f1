use std::io::{self, BufRead, Write};

use tracing::{debug, info, warn};
use zedit_config::AppConfig;
use zedit_core::document::{Entity, EntityId, Geometry};
use zedit_core::geometry::Point2;
use zedit_engine::command::{CommandOutcome, CommandRegistry};
use zedit_engine::console::{Console, Severity};
use zedit_engine::engine::{CancelToken, CommandEngine, EngineSettings};
use zedit_engine::input::{InputEvent, InputSource, parse_coordinate};
use zedit_engine::scene::Scene;
use zedit_engine::undo::UndoLog;

use crate::errors::FrontendError;

/// 按行读取输入。以 `:` 开头的行是指针指令，其余行作为回车提交的文本：
///
/// - `:click x,y` 点击
/// - `:hover x,y` 指针移动
/// - `:type 文本` 未提交的输入
/// - `:esc` 取消
///
/// `#` 开头的行是脚本注释。
pub struct LineInput<R> {
    reader: R,
    echo: Option<Box<dyn Write>>,
}

impl<R: BufRead> LineInput<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, echo: None }
    }

    /// 把读到的每一行回显到 `writer`，脚本回放时让记录与交互一致。
    pub fn with_echo(mut self, writer: Box<dyn Write>) -> Self {
        self.echo = Some(writer);
        self
    }

    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => {
                let line = line.trim_end_matches(['\r', '\n']).to_string();
                if let Some(echo) = self.echo.as_mut() {
                    if let Err(err) = writeln!(echo, "> {line}") {
                        warn!(error = %err, "回显输入失败");
                    }
                }
                Some(line)
            }
            Err(err) => {
                warn!(error = %err, "读取输入失败");
                None
            }
        }
    }
}

impl<R: BufRead> InputSource for LineInput<R> {
    fn next_event(&mut self) -> Option<InputEvent> {
        loop {
            let line = self.read_line()?;
            let trimmed = line.trim();
            if trimmed.starts_with('#') {
                continue;
            }
            let Some(directive) = trimmed.strip_prefix(':') else {
                return Some(InputEvent::Text(trimmed.to_string()));
            };
            let (name, argument) = directive
                .split_once(char::is_whitespace)
                .map(|(name, rest)| (name, rest.trim()))
                .unwrap_or((directive, ""));
            match name.to_ascii_lowercase().as_str() {
                "esc" => return Some(InputEvent::Cancel),
                "type" => return Some(InputEvent::Typing(argument.to_string())),
                "click" => match parse_coordinate(argument, None) {
                    Some(point) => return Some(InputEvent::Point(point)),
                    None => warn!(argument, "无法解析点击坐标"),
                },
                "hover" => match parse_coordinate(argument, None) {
                    Some(point) => return Some(InputEvent::Hover(point)),
                    None => warn!(argument, "无法解析指针坐标"),
                },
                other => warn!(directive = other, "未知输入指令"),
            }
        }
    }
}

/// 写入任意 `Write` 的控制台。写失败只保留第一个错误，由会话循环取出。
pub struct ConsolePrinter<W> {
    writer: W,
    failure: Option<io::Error>,
}

impl<W: Write> ConsolePrinter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            failure: None,
        }
    }

    pub fn take_failure(&mut self) -> Option<io::Error> {
        self.failure.take()
    }
}

impl<W: Write> Console for ConsolePrinter<W> {
    fn print(&mut self, message: &str, severity: Severity) {
        if self.failure.is_some() {
            return;
        }
        let result = match severity {
            Severity::Error => writeln!(self.writer, "错误: {message}"),
            Severity::Command | Severity::Response | Severity::Success => {
                writeln!(self.writer, "{message}")
            }
        }
        .and_then(|()| self.writer.flush());
        if let Err(err) = result {
            self.failure = Some(err);
        }
    }
}

/// 一次会话内各类命令结果的计数。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    pub executed: usize,
    pub cancelled: usize,
    pub failed: usize,
    pub unknown: usize,
}

impl SessionReport {
    fn record(&mut self, outcome: CommandOutcome) {
        match outcome {
            CommandOutcome::Completed => self.executed += 1,
            CommandOutcome::Cancelled => self.cancelled += 1,
            CommandOutcome::Failed => self.failed += 1,
            CommandOutcome::Unknown => self.unknown += 1,
        }
    }
}

/// 命令行宿主：持有场景与命令注册表，逐条读取命令并分发。
pub struct CliSession {
    scene: Scene,
    registry: CommandRegistry,
    settings: EngineSettings,
    cancel: CancelToken,
}

impl CliSession {
    pub fn new(config: &AppConfig) -> Self {
        let editor = &config.editor;
        let mut scene = Scene::with_undo_log(UndoLog::with_max_depth(editor.undo_depth));
        scene.session_mut().offset_distance = editor.default_offset_distance;

        let settings = EngineSettings {
            pick_tolerance: editor.pick_tolerance,
            join_tolerance: editor.join_tolerance,
            prompt_suffix: config.command_line.prompt_suffix.clone(),
        };

        Self {
            scene,
            registry: CommandRegistry::new(),
            settings,
            cancel: CancelToken::new(),
        }
    }

    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[inline]
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// 宿主可在其他线程置位该标志以中断当前命令。
    #[inline]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn run<R: BufRead, W: Write>(
        &mut self,
        reader: R,
        writer: W,
    ) -> Result<SessionReport, FrontendError> {
        self.run_with(LineInput::new(reader), writer)
    }

    /// 读取命令直到 `quit` 或输入结束。
    pub fn run_with<R: BufRead, W: Write>(
        &mut self,
        mut input: LineInput<R>,
        writer: W,
    ) -> Result<SessionReport, FrontendError> {
        let mut console = ConsolePrinter::new(writer);
        let mut report = SessionReport::default();
        let prompt = format!("命令{}", self.settings.prompt_suffix);

        loop {
            console.print(&prompt, Severity::Command);
            if let Some(err) = console.take_failure() {
                return Err(err.into());
            }
            let Some(event) = input.next_event() else {
                debug!("输入结束");
                break;
            };
            let line = match event {
                InputEvent::Text(line) => line,
                other => {
                    debug!(?other, "命令提示处忽略非文本输入");
                    continue;
                }
            };
            let (word, argument) = line
                .split_once(char::is_whitespace)
                .map(|(word, rest)| (word, rest.trim()))
                .unwrap_or((line.as_str(), ""));
            if word.is_empty() {
                continue;
            }

            match word.to_ascii_uppercase().as_str() {
                "QUIT" | "EXIT" => break,
                "HELP" | "?" => self.print_help(&mut console, argument),
                "LIST" => self.print_entities(&mut console),
                "LAYERS" => self.print_layers(&mut console),
                "DEMO" => {
                    let ids = self.scene.populate_demo();
                    console.print(
                        &format!(
                            "已创建示例图元: 线段 #{}, 圆 #{}, 圆弧 #{}, 多段线 #{}, 文字 #{}",
                            ids.baseline.get(),
                            ids.circle.get(),
                            ids.arc.get(),
                            ids.polyline.get(),
                            ids.label.get()
                        ),
                        Severity::Success,
                    );
                }
                "LOCK" | "UNLOCK" => {
                    if argument.is_empty() {
                        console.print("需要指定图层名", Severity::Error);
                    } else {
                        let locked = word.eq_ignore_ascii_case("LOCK");
                        self.scene.set_layer_locked(argument, locked);
                        info!(layer = argument, locked, "切换图层锁定");
                        console.print(
                            &format!("图层 {argument} 已{}", if locked { "锁定" } else { "解锁" }),
                            Severity::Response,
                        );
                    }
                }
                _ => {
                    let outcome = {
                        let mut engine = CommandEngine::new(
                            &mut self.scene,
                            &mut input,
                            &mut console,
                            self.cancel.clone(),
                            self.settings.clone(),
                        );
                        self.registry.execute(word, &mut engine)
                    };
                    report.record(outcome);
                }
            }
        }

        if let Some(err) = console.take_failure() {
            return Err(err.into());
        }
        Ok(report)
    }

    fn print_help(&self, console: &mut dyn Console, prefix: &str) {
        if prefix.is_empty() {
            let commands: Vec<&str> = self.registry.available_commands().collect();
            console.print(&format!("支持的命令: {}", commands.join(", ")), Severity::Response);
            console.print(
                "会话命令: LIST, LAYERS, DEMO, LOCK <图层>, UNLOCK <图层>, QUIT",
                Severity::Response,
            );
            return;
        }
        let matches = self.registry.complete(prefix);
        if matches.is_empty() {
            console.print(&format!("没有以 {prefix} 开头的命令"), Severity::Response);
        } else {
            console.print(&matches.join(", "), Severity::Response);
        }
    }

    fn print_layers(&self, console: &mut dyn Console) {
        let mut layers: Vec<_> = self.scene.document().layers().collect();
        layers.sort_by(|a, b| a.name.cmp(&b.name));
        console.print("当前文档图层：", Severity::Response);
        for layer in layers {
            console.print(
                &format!(
                    "  - {} (可见: {}, 锁定: {})",
                    layer.name, layer.is_visible, layer.is_locked
                ),
                Severity::Response,
            );
        }
    }

    fn print_entities(&self, console: &mut dyn Console) {
        let document = self.scene.document();
        console.print(
            &format!("当前文档实体（共 {} 个）：", document.entity_count()),
            Severity::Response,
        );
        for (id, entity) in document.entities() {
            console.print(&format!("  - {}", describe_entity(*id, entity)), Severity::Response);
        }
    }
}

fn format_point(point: Point2) -> String {
    format!("({:.2}, {:.2})", point.x(), point.y())
}

/// 单行实体摘要，`LIST` 使用。
pub fn describe_entity(id: EntityId, entity: &Entity) -> String {
    let layer = entity.layer_name();
    let id = id.get();
    match &entity.geometry {
        Geometry::Line(line) => format!(
            "线段 #{id}, Layer={layer}, 起点={}, 终点={}",
            format_point(line.start),
            format_point(line.end)
        ),
        Geometry::Circle(circle) => format!(
            "圆 #{id}, Layer={layer}, 圆心={}, 半径={:.2}",
            format_point(circle.center),
            circle.radius
        ),
        Geometry::Arc(arc) => format!(
            "圆弧 #{id}, Layer={layer}, 圆心={}, 半径={:.2}, 起始角={:.1}°, 终止角={:.1}°",
            format_point(arc.center),
            arc.radius,
            arc.start_angle.to_degrees(),
            arc.end_angle.to_degrees()
        ),
        Geometry::Ellipse(ellipse) => format!(
            "椭圆 #{id}, Layer={layer}, 中心={}, 长轴=({:.2}, {:.2}), 比例={:.3}",
            format_point(ellipse.center),
            ellipse.major_axis.x(),
            ellipse.major_axis.y(),
            ellipse.ratio
        ),
        Geometry::Polyline(polyline) => {
            let coords: Vec<String> = polyline
                .vertices
                .iter()
                .map(|vertex| {
                    let pos = vertex.position;
                    if vertex.bulge.abs() > 1e-6 {
                        format!("({:.2}, {:.2}; bulge={:.3})", pos.x(), pos.y(), vertex.bulge)
                    } else {
                        format_point(pos)
                    }
                })
                .collect();
            format!(
                "多段线 #{id}, Layer={layer}, 顶点数={}, 闭合={}, 顶点={}",
                polyline.vertices.len(),
                polyline.is_closed,
                coords.join(" -> ")
            )
        }
        Geometry::Spline(spline) => format!(
            "样条 #{id}, Layer={layer}, 阶数={}, 控制点数={}, 拟合点数={}, 闭合={}",
            spline.degree,
            spline.control_points.len(),
            spline.fit_points.len(),
            spline.is_closed
        ),
        Geometry::Text(text) => format!(
            "文字 #{id}, Layer={layer}, 插入点={}, 高度={:.2}, 内容=\"{}\"",
            format_point(text.insert),
            text.height,
            text.content
        ),
        Geometry::MText(mtext) => format!(
            "多行文字 #{id}, Layer={layer}, 插入点={}, 高度={:.2}, 内容=\"{}\"",
            format_point(mtext.insert),
            mtext.height,
            mtext.content
        ),
        Geometry::Point(point) => {
            format!("点 #{id}, Layer={layer}, 位置={}", format_point(point.position))
        }
        Geometry::BlockReference(reference) => format!(
            "块参照 #{id}, Layer={layer}, 名称={}, 插入点={}, 比例=({:.2}, {:.2}), 旋转={:.1}°",
            reference.name,
            format_point(reference.insert),
            reference.scale.x(),
            reference.scale.y(),
            reference.rotation.to_degrees()
        ),
        Geometry::Dimension(dimension) => {
            let value = dimension
                .measurement
                .map(|value| format!("{value:.2}"))
                .unwrap_or_else(|| "-".to_string());
            format!(
                "标注 #{id}, Layer={layer}, 类型={:?}, 定义点={}, 测量值={value}",
                dimension.kind,
                format_point(dimension.definition_point)
            )
        }
        Geometry::Proxy { type_name } => format!("代理实体 #{id}, Layer={layer}, 类型={type_name}"),
    }
}
