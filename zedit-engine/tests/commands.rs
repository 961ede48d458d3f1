use zedit_core::document::{Entity, EntityId, Geometry, Line};
use zedit_core::geometry::Point2;
use zedit_engine::command::{CommandOutcome, CommandRegistry};
use zedit_engine::console::{MessageLog, Severity};
use zedit_engine::engine::{CancelToken, CommandEngine, EngineSettings};
use zedit_engine::input::{InputEvent, InputSource, ScriptedInput};
use zedit_engine::scene::Scene;

struct Harness {
    scene: Scene,
    registry: CommandRegistry,
}

impl Harness {
    fn new() -> Self {
        Self {
            scene: Scene::new(),
            registry: CommandRegistry::new(),
        }
    }

    fn run(&mut self, name: &str, events: Vec<InputEvent>) -> (CommandOutcome, MessageLog) {
        let mut input = ScriptedInput::new(events);
        self.run_with(name, &mut input, CancelToken::new())
    }

    fn run_with(
        &mut self,
        name: &str,
        input: &mut dyn InputSource,
        cancel: CancelToken,
    ) -> (CommandOutcome, MessageLog) {
        let mut console = MessageLog::new();
        let outcome = {
            let mut engine = CommandEngine::new(
                &mut self.scene,
                input,
                &mut console,
                cancel,
                EngineSettings::default(),
            );
            self.registry.execute(name, &mut engine)
        };
        (outcome, console)
    }

    fn add_line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> EntityId {
        self.scene
            .document_mut()
            .add_line(Point2::new(x1, y1), Point2::new(x2, y2), "0")
    }

    fn count(&self) -> usize {
        self.scene.document().entity_count()
    }

    fn ids(&self) -> Vec<EntityId> {
        self.scene.document().entity_ids().collect()
    }

    fn geometry(&self, id: EntityId) -> Geometry {
        self.scene.entity(id).expect("entity exists").geometry.clone()
    }

    fn last(&self) -> Geometry {
        let id = *self.ids().last().expect("document not empty");
        self.geometry(id)
    }
}

fn click(x: f64, y: f64) -> InputEvent {
    InputEvent::Point(Point2::new(x, y))
}

fn text(value: &str) -> InputEvent {
    InputEvent::Text(value.to_string())
}

fn enter() -> InputEvent {
    text("")
}

fn close_to(actual: Point2, x: f64, y: f64) -> bool {
    (actual.x() - x).abs() < 1e-6 && (actual.y() - y).abs() < 1e-6
}

/// 转发指定数量的事件后置位取消标志，模拟宿主在另一线程按下 Esc。
struct CancelAfter {
    inner: ScriptedInput,
    remaining: usize,
    token: CancelToken,
}

impl InputSource for CancelAfter {
    fn next_event(&mut self) -> Option<InputEvent> {
        if self.remaining == 0 {
            self.token.raise();
            return Some(InputEvent::Hover(Point2::origin()));
        }
        self.remaining -= 1;
        self.inner.next_event()
    }
}

#[test]
fn line_creates_segments_with_one_undo_entry() {
    let mut h = Harness::new();
    let (outcome, _) = h.run(
        "line",
        vec![click(0.0, 0.0), click(10.0, 0.0), click(10.0, 10.0), enter()],
    );
    assert_eq!(outcome, CommandOutcome::Completed);
    assert_eq!(h.count(), 2);
    assert_eq!(h.scene.undo_log().len(), 1);

    let (_, console) = h.run("u", Vec::new());
    assert!(console.contains("LINE"));
    assert_eq!(h.count(), 0);

    h.run("redo", Vec::new());
    assert_eq!(h.count(), 2);
}

#[test]
fn line_close_connects_back_to_start() {
    let mut h = Harness::new();
    h.run(
        "L",
        vec![click(0.0, 0.0), click(10.0, 0.0), click(10.0, 10.0), text("c")],
    );
    assert_eq!(h.count(), 3);
    match h.last() {
        Geometry::Line(line) => {
            assert!(close_to(line.start, 10.0, 10.0));
            assert!(close_to(line.end, 0.0, 0.0));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn line_close_is_offered_after_two_points() {
    let mut h = Harness::new();
    let (_, console) = h.run("line", vec![click(0.0, 0.0), click(10.0, 0.0), text("C")]);
    assert!(console.contains("Close(C)"));
    assert_eq!(h.count(), 2);
    match h.last() {
        Geometry::Line(line) => {
            assert!(close_to(line.start, 10.0, 0.0));
            assert!(close_to(line.end, 0.0, 0.0));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn line_undo_keyword_drops_last_segment() {
    let mut h = Harness::new();
    h.run(
        "line",
        vec![
            click(0.0, 0.0),
            click(10.0, 0.0),
            click(10.0, 10.0),
            text("u"),
            enter(),
        ],
    );
    assert_eq!(h.count(), 1);
}

#[test]
fn line_accepts_typed_relative_coordinates() {
    let mut h = Harness::new();
    h.run("line", vec![text("0,0"), text("@10<90"), text("@5,0"), enter()]);
    assert_eq!(h.count(), 2);
    match h.last() {
        Geometry::Line(line) => {
            assert!(close_to(line.start, 0.0, 10.0));
            assert!(close_to(line.end, 5.0, 10.0));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn pline_close_builds_single_closed_polyline() {
    let mut h = Harness::new();
    h.run(
        "pl",
        vec![click(0.0, 0.0), click(10.0, 0.0), click(10.0, 10.0), text("close")],
    );
    assert_eq!(h.count(), 1);
    let polyline = match h.last() {
        Geometry::Polyline(polyline) => polyline,
        other => panic!("unexpected {other:?}"),
    };
    assert!(polyline.is_closed);
    assert_eq!(polyline.vertices.len(), 3);
    assert_eq!(h.scene.undo_log().undo_label(), Some("PLINE"));
}

#[test]
fn pline_close_is_offered_after_two_points() {
    let mut h = Harness::new();
    h.run("pline", vec![click(0.0, 0.0), click(10.0, 0.0), text("C")]);
    assert_eq!(h.count(), 1);
    let polyline = match h.last() {
        Geometry::Polyline(polyline) => polyline,
        other => panic!("unexpected {other:?}"),
    };
    assert!(polyline.is_closed);
    assert_eq!(polyline.vertices.len(), 2);
}

#[test]
fn pline_keeps_collected_points_on_cancel() {
    let mut h = Harness::new();
    let (outcome, console) = h.run(
        "polyline",
        vec![
            click(0.0, 0.0),
            click(5.0, 0.0),
            InputEvent::Hover(Point2::new(7.0, 3.0)),
            InputEvent::Cancel,
        ],
    );
    assert_eq!(outcome, CommandOutcome::Cancelled);
    assert!(console.contains("*取消*"));
    assert_eq!(h.count(), 1);
    assert!(h.scene.preview().is_empty());
    assert!(h.scene.drawing_points().is_empty());
}

#[test]
fn circle_by_radius_and_diameter() {
    let mut h = Harness::new();
    h.run("circle", vec![click(0.0, 0.0), text("5")]);
    h.run("c", vec![click(20.0, 0.0), text("d"), text("10")]);
    let radii: Vec<f64> = h
        .ids()
        .into_iter()
        .map(|id| match h.geometry(id) {
            Geometry::Circle(circle) => circle.radius,
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(radii, vec![5.0, 5.0]);
}

#[test]
fn circle_rejects_non_positive_radius() {
    let mut h = Harness::new();
    let (_, console) = h.run("circle", vec![click(0.0, 0.0), text("0"), text("2")]);
    assert!(console.contains("半径必须为正数"));
    assert_eq!(h.count(), 1);
}

#[test]
fn three_point_circle_reprompts_on_collinear_points() {
    let mut h = Harness::new();
    let (_, console) = h.run(
        "circle",
        vec![
            text("3p"),
            click(0.0, 0.0),
            click(2.0, 0.0),
            click(4.0, 0.0),
            click(1.0, 1.0),
        ],
    );
    assert!(console.contains("三点共线"));
    match h.last() {
        Geometry::Circle(circle) => {
            assert!(close_to(circle.center, 1.0, 0.0));
            assert!((circle.radius - 1.0).abs() < 1e-9);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn two_point_circle_uses_diameter() {
    let mut h = Harness::new();
    h.run("circle", vec![text("2P"), click(0.0, 0.0), click(4.0, 0.0)]);
    match h.last() {
        Geometry::Circle(circle) => {
            assert!(close_to(circle.center, 2.0, 0.0));
            assert!((circle.radius - 2.0).abs() < 1e-9);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn rectangle_rejects_zero_width_then_builds() {
    let mut h = Harness::new();
    let (_, console) = h.run(
        "rectang",
        vec![click(0.0, 0.0), click(0.0, 5.0), click(4.0, 2.0)],
    );
    assert!(console.contains("不能为零"));
    let polyline = match h.last() {
        Geometry::Polyline(polyline) => polyline,
        other => panic!("unexpected {other:?}"),
    };
    assert!(polyline.is_closed);
    assert_eq!(polyline.vertices.len(), 4);
    assert!(close_to(polyline.vertices[2].position, 4.0, 2.0));
}

#[test]
fn rectangle_dimensions_follow_quadrant_point() {
    let mut h = Harness::new();
    h.run(
        "rec",
        vec![click(1.0, 1.0), text("d"), text("4"), text("2"), click(0.0, 0.0)],
    );
    let polyline = match h.last() {
        Geometry::Polyline(polyline) => polyline,
        other => panic!("unexpected {other:?}"),
    };
    assert!(close_to(polyline.vertices[2].position, -3.0, -1.0));
}

#[test]
fn move_displaces_selection_and_undoes() {
    let mut h = Harness::new();
    let id = h.add_line(0.0, 0.0, 10.0, 0.0);
    let (_, console) = h.run(
        "move",
        vec![click(5.0, 0.0), enter(), click(0.0, 0.0), click(3.0, 4.0)],
    );
    assert!(console.contains("已移动 1 个对象"));
    match h.geometry(id) {
        Geometry::Line(line) => assert!(close_to(line.start, 3.0, 4.0)),
        other => panic!("unexpected {other:?}"),
    }

    h.run("undo", Vec::new());
    match h.geometry(id) {
        Geometry::Line(line) => assert!(close_to(line.start, 0.0, 0.0)),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn move_filters_locked_layers() {
    let mut h = Harness::new();
    let id = h.scene.add_entity(
        Entity::new(Geometry::Line(Line {
            start: Point2::new(0.0, 0.0),
            end: Point2::new(10.0, 0.0),
        }))
        .on_layer("FIXED"),
    );
    h.scene.set_layer_locked("FIXED", true);
    let before = h.geometry(id);

    let (outcome, console) = h.run("m", vec![click(5.0, 0.0), enter()]);
    assert_eq!(outcome, CommandOutcome::Completed);
    assert!(console.contains("1 个对象位于锁定的图层上"));
    assert_eq!(h.geometry(id), before);
    assert!(!h.scene.undo_log().can_undo());
}

#[test]
fn preselection_skips_the_selection_prompt() {
    let mut h = Harness::new();
    let id = h.add_line(0.0, 0.0, 10.0, 0.0);
    h.scene.select(id).unwrap();
    h.run("move", vec![click(0.0, 0.0), click(0.0, 1.0)]);
    match h.geometry(id) {
        Geometry::Line(line) => assert!(close_to(line.end, 10.0, 1.0)),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(h.scene.selection_len(), 0);
}

#[test]
fn copy_places_batches_and_supports_undo_keyword() {
    let mut h = Harness::new();
    h.add_line(0.0, 0.0, 10.0, 0.0);
    h.run(
        "copy",
        vec![
            click(5.0, 0.0),
            enter(),
            click(0.0, 0.0),
            click(0.0, 5.0),
            click(0.0, 10.0),
            text("u"),
            enter(),
        ],
    );
    assert_eq!(h.count(), 2);
    match h.last() {
        Geometry::Line(line) => assert!(close_to(line.start, 0.0, 5.0)),
        other => panic!("unexpected {other:?}"),
    }

    h.run("undo", Vec::new());
    assert_eq!(h.count(), 1);
    h.run("redo", Vec::new());
    assert_eq!(h.count(), 2);
}

#[test]
fn erase_undo_restores_original_order() {
    let mut h = Harness::new();
    h.add_line(0.0, 0.0, 10.0, 0.0);
    h.add_line(0.0, 5.0, 10.0, 5.0);
    h.add_line(0.0, 10.0, 10.0, 10.0);
    let before = h.ids();

    let (_, console) = h.run(
        "erase",
        vec![click(5.0, 10.0), click(5.0, 0.0), enter()],
    );
    assert!(console.contains("已删除 2 个对象"));
    assert_eq!(h.ids(), vec![before[1]]);

    h.run("u", Vec::new());
    assert_eq!(h.ids(), before);
}

#[test]
fn erase_with_empty_selection_is_graceful() {
    let mut h = Harness::new();
    let (outcome, console) = h.run("e", vec![enter()]);
    assert_eq!(outcome, CommandOutcome::Completed);
    assert!(console.contains("未选择对象"));
}

#[test]
fn offset_line_persists_distance_between_runs() {
    let mut h = Harness::new();
    h.add_line(0.0, 0.0, 10.0, 0.0);

    h.run(
        "offset",
        vec![text("2"), click(5.0, 0.0), click(5.0, 5.0), enter()],
    );
    assert_eq!(h.count(), 2);
    assert_eq!(h.scene.session().offset_distance, Some(2.0));
    match h.last() {
        Geometry::Line(line) => assert!(close_to(line.start, 0.0, 2.0)),
        other => panic!("unexpected {other:?}"),
    }

    let (_, console) = h.run(
        "o",
        vec![enter(), click(5.0, 0.0), click(5.0, -5.0), enter()],
    );
    assert!(console.contains("<2>"));
    assert_eq!(h.count(), 3);
    match h.last() {
        Geometry::Line(line) => assert!(close_to(line.start, 0.0, -2.0)),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn offset_records_each_result_individually() {
    let mut h = Harness::new();
    h.add_line(0.0, 0.0, 10.0, 0.0);
    h.run(
        "offset",
        vec![
            text("1"),
            click(5.0, 0.0),
            click(5.0, 5.0),
            click(5.0, 0.0),
            click(5.0, -5.0),
            text("exit"),
        ],
    );
    assert_eq!(h.count(), 3);
    assert_eq!(h.scene.undo_log().len(), 2);
    assert_eq!(h.scene.undo_log().undo_label(), Some("OFFSET"));
}

#[test]
fn offset_rejects_locked_and_unsupported_entities() {
    let mut h = Harness::new();
    h.scene
        .document_mut()
        .add_text(Point2::new(20.0, 20.0), "note", 2.5, 0.0, "0");
    h.scene.add_entity(
        Entity::new(Geometry::Line(Line {
            start: Point2::new(0.0, 0.0),
            end: Point2::new(10.0, 0.0),
        }))
        .on_layer("FIXED"),
    );
    h.scene.set_layer_locked("FIXED", true);

    let (_, console) = h.run(
        "offset",
        vec![text("1"), click(20.0, 20.0), click(5.0, 0.0), enter()],
    );
    assert!(console.contains("无法偏移该对象"));
    assert!(console.contains("锁定的图层"));
    assert_eq!(h.count(), 2);
}

#[test]
fn offset_reports_collapsing_circle_and_continues() {
    let mut h = Harness::new();
    h.scene
        .document_mut()
        .add_circle(Point2::new(0.0, 0.0), 1.0, "0");
    let (outcome, console) = h.run(
        "offset",
        vec![text("5"), click(1.0, 0.0), click(0.2, 0.0), enter()],
    );
    assert_eq!(outcome, CommandOutcome::Completed);
    assert!(console.count(Severity::Error) >= 1);
    assert_eq!(h.count(), 1);
}

#[test]
fn offset_through_point_mode() {
    let mut h = Harness::new();
    h.scene
        .document_mut()
        .add_circle(Point2::new(0.0, 0.0), 5.0, "0");
    h.run(
        "offset",
        vec![text("t"), click(5.0, 0.0), click(8.0, 0.0), enter()],
    );
    assert!(h.scene.session().offset_through);
    match h.last() {
        Geometry::Circle(circle) => assert!((circle.radius - 8.0).abs() < 1e-9),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn pedit_converts_line_and_joins_atomically() {
    let mut h = Harness::new();
    let base = h.add_line(0.0, 0.0, 10.0, 0.0);
    h.add_line(10.0, 0.0, 10.0, 10.0);
    h.add_line(10.0, 10.0, 0.0, 10.0);

    let (_, console) = h.run(
        "pedit",
        vec![
            click(5.0, 0.0),
            enter(),
            text("j"),
            click(10.0, 5.0),
            click(5.0, 10.0),
            enter(),
            text("x"),
        ],
    );
    assert!(console.contains("已将 2 个对象合并到多段线"));
    assert_eq!(h.ids(), vec![base]);
    let joined = h.geometry(base);
    match &joined {
        Geometry::Polyline(polyline) => {
            assert_eq!(polyline.vertices.len(), 4);
            assert!(close_to(polyline.vertices[3].position, 0.0, 10.0));
        }
        other => panic!("unexpected {other:?}"),
    }

    h.run("undo", Vec::new());
    assert_eq!(h.count(), 3);
    assert!(matches!(h.geometry(base), Geometry::Polyline(ref p) if p.vertices.len() == 2));

    h.run("undo", Vec::new());
    assert!(matches!(h.geometry(base), Geometry::Line(_)));

    h.run("redo", Vec::new());
    h.run("redo", Vec::new());
    assert_eq!(h.ids(), vec![base]);
    assert_eq!(h.geometry(base), joined);
}

#[test]
fn pedit_close_and_session_undo() {
    let mut h = Harness::new();
    let id = h.scene.document_mut().add_polyline(
        [
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
        ],
        false,
        "0",
    );
    h.run("pe", vec![click(5.0, 0.0), text("c"), text("u"), text("x")]);
    match h.geometry(id) {
        Geometry::Polyline(polyline) => assert!(!polyline.is_closed),
        other => panic!("unexpected {other:?}"),
    }
    assert!(h.scene.undo_log().can_redo());
}

#[test]
fn pedit_undoing_line_conversion_ends_session() {
    let mut h = Harness::new();
    let id = h.add_line(0.0, 0.0, 10.0, 0.0);
    let mut input = ScriptedInput::new(vec![click(5.0, 0.0), enter(), text("u"), text("r")]);
    let (outcome, console) = h.run_with("pedit", &mut input, CancelToken::new());
    assert_eq!(outcome, CommandOutcome::Completed);
    assert!(console.contains("对象已不是多段线"));
    assert!(matches!(h.geometry(id), Geometry::Line(_)));
    assert!(input.next_event().is_some());
}

#[test]
fn pedit_reverse_and_vertex_insert() {
    let mut h = Harness::new();
    let id = h.scene.document_mut().add_polyline(
        [Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)],
        false,
        "0",
    );
    h.run(
        "pedit",
        vec![
            click(5.0, 0.0),
            text("r"),
            text("e"),
            text("i"),
            click(4.0, 0.0),
            text("x"),
            text("x"),
        ],
    );
    match h.geometry(id) {
        Geometry::Polyline(polyline) => {
            assert_eq!(polyline.vertices.len(), 3);
            assert!(close_to(polyline.vertices[0].position, 10.0, 0.0));
            assert!(close_to(polyline.vertices[1].position, 4.0, 0.0));
        }
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(h.scene.undo_log().len(), 2);
}

#[test]
fn pedit_vertex_delete_keeps_two_vertices() {
    let mut h = Harness::new();
    h.scene.document_mut().add_polyline(
        [Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)],
        false,
        "0",
    );
    let (_, console) = h.run(
        "pedit",
        vec![click(5.0, 0.0), text("e"), text("d"), click(0.0, 0.0), enter(), enter()],
    );
    assert!(console.contains("至少需要两个顶点"));
    assert!(!h.scene.undo_log().can_undo());
}

#[test]
fn pedit_rejects_locked_layer() {
    let mut h = Harness::new();
    h.scene.document_mut().add_polyline(
        [Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)],
        false,
        "FIXED",
    );
    h.scene.set_layer_locked("FIXED", true);
    let (_, console) = h.run("pedit", vec![click(5.0, 0.0), enter()]);
    assert!(console.contains("锁定的图层"));
    assert!(!h.scene.undo_log().can_undo());
}

#[test]
fn cancel_token_interrupts_and_keeps_finished_segments() {
    let mut h = Harness::new();
    let token = CancelToken::new();
    let mut input = CancelAfter {
        inner: ScriptedInput::new(vec![click(0.0, 0.0), click(10.0, 0.0), click(20.0, 0.0)]),
        remaining: 2,
        token: token.clone(),
    };
    let (outcome, console) = h.run_with("line", &mut input, token.clone());
    assert_eq!(outcome, CommandOutcome::Cancelled);
    assert!(console.contains("*取消*"));
    assert_eq!(h.count(), 1);
    assert_eq!(h.scene.undo_log().len(), 1);
    assert!(!token.is_raised());
}

#[test]
fn closed_input_stream_ends_command_with_error() {
    let mut h = Harness::new();
    let (outcome, console) = h.run("line", vec![click(0.0, 0.0)]);
    assert_eq!(outcome, CommandOutcome::Failed);
    assert!(console.contains("输入流已关闭"));
}

#[test]
fn undo_and_redo_report_empty_history() {
    let mut h = Harness::new();
    let (_, console) = h.run("undo", Vec::new());
    assert!(console.contains("没有可撤销的操作"));
    let (_, console) = h.run("redo", Vec::new());
    assert!(console.contains("没有可重做的操作"));
}
