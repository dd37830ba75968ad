use super::*;
use super::state::{FileOperationResult, PendingLoadOperation};
use crate::link_config::{export_page_links, LinkConfiguration};
use crate::links::Launcher;
use crate::types::{CanvasObject, Link, ObjectKind};
use eframe::egui;
use std::cell::RefCell;
use std::path::Path;

/// Run a single headless egui frame with the provided input events and closure.
fn run_ui_with(events: Vec<egui::Event>, mut f: impl FnMut(&egui::Context)) -> egui::FullOutput {
    let mut raw = egui::RawInput::default();
    raw.screen_rect = Some(egui::Rect::from_min_size(
        egui::Pos2::ZERO,
        egui::vec2(1200.0, 800.0),
    ));
    raw.events = events;

    let ctx = egui::Context::default();
    ctx.run(raw, |ctx| {
        ctx.set_visuals(egui::Visuals::dark());
        f(ctx);
    })
}

/// Drive one frame per event batch through the canvas on a fresh context.
fn drive_canvas(app: &mut ExploderApp, frames: Vec<Vec<egui::Event>>, modifiers: egui::Modifiers) {
    drive_canvas_on(&egui::Context::default(), app, frames, modifiers);
}

fn drive_canvas_on(
    ctx: &egui::Context,
    app: &mut ExploderApp,
    frames: Vec<Vec<egui::Event>>,
    modifiers: egui::Modifiers,
) {
    for events in frames {
        let mut raw = egui::RawInput::default();
        raw.screen_rect = Some(egui::Rect::from_min_size(
            egui::Pos2::ZERO,
            egui::vec2(1200.0, 800.0),
        ));
        raw.modifiers = modifiers;
        raw.events = events;
        let _ = ctx.run(raw, |ctx| {
            ctx.set_visuals(egui::Visuals::dark());
            egui::CentralPanel::default().show(ctx, |ui| app.draw_canvas(ui));
        });
    }
}

fn press(pos: egui::Pos2, button: egui::PointerButton, pressed: bool) -> egui::Event {
    egui::Event::PointerButton {
        pos,
        button,
        pressed,
        modifiers: egui::Modifiers::NONE,
    }
}

fn click_frames(pos: egui::Pos2) -> Vec<Vec<egui::Event>> {
    vec![
        vec![egui::Event::PointerMoved(pos)],
        vec![press(pos, egui::PointerButton::Primary, true)],
        vec![press(pos, egui::PointerButton::Primary, false)],
    ]
}

/// App with screen coordinates equal to page coordinates.
fn test_app() -> ExploderApp {
    let mut app = ExploderApp::default();
    app.canvas.offset = egui::Vec2::ZERO;
    app.canvas.zoom_factor = 1.0;
    app.canvas.initialized = true;
    app
}

fn add_box(app: &mut ExploderApp, name: &str, left: f64, top: f64) -> String {
    let mut object = CanvasObject::with_box(ObjectKind::Rectangle, left, top, 120.0, 80.0);
    object.name = name.to_string();
    app.current_page_mut()
        .expect("current page")
        .add_object(object)
}

fn object_position(app: &ExploderApp, id: &str) -> (f64, f64) {
    let (left, top, _, _) = app
        .current_page()
        .and_then(|p| p.object(id))
        .expect("object exists")
        .bounds();
    (left, top)
}

#[derive(Default)]
struct RecordingLauncher {
    opened: RefCell<Vec<String>>,
}

impl Launcher for RecordingLauncher {
    fn open_path(&self, path: &Path) -> std::io::Result<()> {
        self.opened.borrow_mut().push(path.display().to_string());
        Ok(())
    }

    fn open_url(&self, url: &str) -> std::io::Result<()> {
        self.opened.borrow_mut().push(url.to_string());
        Ok(())
    }
}

#[test]
fn create_object_records_undo_and_selects_it() {
    let mut app = test_app();
    app.context_menu.world_pos = (100.0, 100.0);

    let id = app
        .create_object_at_pos(ObjectKind::RoundedRectangle)
        .expect("object created");
    assert_eq!(app.interaction.selected_object.as_deref(), Some(id.as_str()));
    let object = app.selected_object().expect("selected object exists");
    assert_eq!(object.name, "Rounded Rectangle 1");
    assert_eq!(object.bounds(), (100.0, 100.0, 120.0, 80.0));
    assert!(app.file.has_unsaved_changes);

    app.perform_undo();
    assert!(app.current_page().unwrap().object(&id).is_none());
    assert!(app.interaction.selected_object.is_none());

    app.perform_redo();
    assert!(app.current_page().unwrap().object(&id).is_some());
}

#[test]
fn created_text_and_button_objects_carry_text() {
    let mut app = test_app();
    let text = app.create_object_at_pos(ObjectKind::Text).unwrap();
    let button = app.create_object_at_pos(ObjectKind::Button).unwrap();
    let line = app.create_object_at_pos(ObjectKind::Line).unwrap();

    let page = app.current_page().unwrap();
    assert_eq!(page.object(&text).unwrap().text_content(), "Text");
    assert_eq!(page.object(&button).unwrap().text_content(), "Button");
    assert!(page.object(&line).unwrap().text.is_none());
    assert!(page.object(&button).unwrap().z_index > page.object(&text).unwrap().z_index);
}

#[test]
fn clicking_canvas_selects_object() {
    let mut app = test_app();
    let id = add_box(&mut app, "Pump", 200.0, 150.0);

    let target = egui::pos2(250.0, 190.0);
    drive_canvas(
        &mut app,
        vec![
            vec![egui::Event::PointerMoved(target)],
            vec![
                egui::Event::PointerMoved(target),
                press(target, egui::PointerButton::Primary, true),
            ],
        ],
        egui::Modifiers::NONE,
    );

    assert_eq!(app.interaction.selected_object, Some(id));
}

#[test]
fn click_empty_space_clears_selection() {
    let mut app = test_app();
    let id = add_box(&mut app, "Pump", 200.0, 150.0);
    let ctx = egui::Context::default();

    drive_canvas_on(&ctx, &mut app, click_frames(egui::pos2(250.0, 190.0)), egui::Modifiers::NONE);
    assert_eq!(app.interaction.selected_object, Some(id));

    drive_canvas_on(&ctx, &mut app, click_frames(egui::pos2(700.0, 600.0)), egui::Modifiers::NONE);
    assert!(app.interaction.selected_object.is_none());
}

#[test]
fn topmost_object_wins_the_click() {
    let mut app = test_app();
    let _below = add_box(&mut app, "Below", 200.0, 150.0);
    let above = add_box(&mut app, "Above", 220.0, 170.0);
    app.current_page_mut().unwrap().bring_to_front(&above);

    drive_canvas(&mut app, click_frames(egui::pos2(260.0, 200.0)), egui::Modifiers::NONE);
    assert_eq!(app.interaction.selected_object, Some(above));
}

#[test]
fn object_drag_undo_redo_round_trip() {
    let mut app = test_app();
    let id = add_box(&mut app, "Pump", 200.0, 150.0);
    let start = egui::pos2(250.0, 190.0);
    let end = egui::pos2(310.0, 230.0);

    drive_canvas(
        &mut app,
        vec![
            vec![egui::Event::PointerMoved(start)],
            vec![press(start, egui::PointerButton::Primary, true)],
            vec![egui::Event::PointerMoved(end)],
            vec![press(end, egui::PointerButton::Primary, false)],
        ],
        egui::Modifiers::NONE,
    );

    let moved = object_position(&app, &id);
    assert_ne!(moved, (200.0, 150.0), "object should have moved after drag");
    assert!(app.interaction.dragging_object.is_none());
    assert!(app.undo_history.can_undo());
    assert!(app.file.has_unsaved_changes);

    app.perform_undo();
    assert_eq!(object_position(&app, &id), (200.0, 150.0));

    app.perform_redo();
    assert_eq!(object_position(&app, &id), moved);
}

#[test]
fn shift_drag_snaps_to_grid() {
    let mut app = test_app();
    let id = add_box(&mut app, "Pump", 205.0, 153.0);
    let start = egui::pos2(250.0, 190.0);
    let end = egui::pos2(318.0, 257.0);

    drive_canvas(
        &mut app,
        vec![
            vec![egui::Event::PointerMoved(start)],
            vec![press(start, egui::PointerButton::Primary, true)],
            vec![egui::Event::PointerMoved(end)],
            vec![press(end, egui::PointerButton::Primary, false)],
        ],
        egui::Modifiers {
            shift: true,
            ..Default::default()
        },
    );

    let (x, y) = object_position(&app, &id);
    assert!((x % 20.0).abs() < 0.001, "x not snapped: {x}");
    assert!((y % 20.0).abs() < 0.001, "y not snapped: {y}");
}

#[test]
fn tiny_click_on_object_does_not_record_movement() {
    let mut app = test_app();
    let id = add_box(&mut app, "Pump", 200.0, 150.0);

    drive_canvas(&mut app, click_frames(egui::pos2(250.0, 190.0)), egui::Modifiers::NONE);

    assert_eq!(object_position(&app, &id), (200.0, 150.0));
    assert!(!app.undo_history.can_undo());
    assert!(!app.file.has_unsaved_changes);
}

#[test]
fn context_menu_open_and_click_outside_closes() {
    let mut app = test_app();
    let open_at = egui::pos2(500.0, 400.0);
    let outside = egui::pos2(50.0, 50.0);
    let ctx = egui::Context::default();

    drive_canvas_on(
        &ctx,
        &mut app,
        vec![
            vec![egui::Event::PointerMoved(open_at)],
            vec![
                press(open_at, egui::PointerButton::Secondary, true),
                press(open_at, egui::PointerButton::Secondary, false),
            ],
        ],
        egui::Modifiers::NONE,
    );
    assert!(app.context_menu.show, "context menu should be shown after right-click");
    assert_eq!(app.context_menu.world_pos, (500.0, 400.0));
    assert!(!app.context_menu.just_opened);

    drive_canvas_on(
        &ctx,
        &mut app,
        vec![
            vec![egui::Event::PointerMoved(outside)],
            vec![
                press(outside, egui::PointerButton::Primary, true),
                press(outside, egui::PointerButton::Primary, false),
            ],
        ],
        egui::Modifiers::NONE,
    );
    assert!(!app.context_menu.show, "menu should close when clicking outside");
}

#[test]
fn context_menu_does_not_open_in_view_mode() {
    let mut app = test_app();
    app.set_mode(AppMode::View);
    let open_at = egui::pos2(500.0, 400.0);

    drive_canvas(
        &mut app,
        vec![
            vec![egui::Event::PointerMoved(open_at)],
            vec![
                press(open_at, egui::PointerButton::Secondary, true),
                press(open_at, egui::PointerButton::Secondary, false),
            ],
        ],
        egui::Modifiers::NONE,
    );
    assert!(!app.context_menu.show);
}

#[test]
fn view_mode_click_follows_page_link() {
    let mut app = test_app();
    let id = add_box(&mut app, "Pump", 200.0, 150.0);
    let main_id = app.current_page_id().unwrap();
    let details = app.project.add_page("Pump Details", Some(main_id.clone()));
    app.current_page_mut().unwrap().object_mut(&id).unwrap().link = Link::Page {
        page_id: details.clone(),
    };
    app.select_object(Some(id.clone()));
    app.record_undo();
    app.set_mode(AppMode::View);

    drive_canvas(&mut app, click_frames(egui::pos2(250.0, 190.0)), egui::Modifiers::NONE);

    assert_eq!(app.current_page_id(), Some(details));
    assert_eq!(app.status_message, "Navigated to page: Pump Details");
    assert!(!app.undo_history.can_undo(), "undo history is per page");
    assert!(app.navigator.can_go_back());

    app.go_back();
    assert_eq!(app.current_page_id(), Some(main_id));
}

#[test]
fn view_mode_click_does_not_move_objects() {
    let mut app = test_app();
    let id = add_box(&mut app, "Pump", 200.0, 150.0);
    app.set_mode(AppMode::View);
    let start = egui::pos2(250.0, 190.0);
    let end = egui::pos2(350.0, 290.0);

    drive_canvas(
        &mut app,
        vec![
            vec![egui::Event::PointerMoved(start)],
            vec![press(start, egui::PointerButton::Primary, true)],
            vec![egui::Event::PointerMoved(end)],
            vec![press(end, egui::PointerButton::Primary, false)],
        ],
        egui::Modifiers::NONE,
    );

    assert_eq!(object_position(&app, &id), (200.0, 150.0));
    assert!(app.interaction.selected_object.is_none());
}

#[test]
fn follow_object_link_hands_urls_to_launcher() {
    let mut app = test_app();
    let id = add_box(&mut app, "Docs", 0.0, 0.0);
    app.current_page_mut().unwrap().object_mut(&id).unwrap().link = Link::Url {
        url: "https://example.com/manual".to_string(),
    };
    let launcher = RecordingLauncher::default();

    app.follow_object_link(&id, &launcher);

    assert_eq!(
        launcher.opened.borrow().as_slice(),
        ["https://example.com/manual".to_string()]
    );
    assert_eq!(app.status_message, "Opened URL: https://example.com/manual");
}

#[test]
fn follow_object_link_reports_errors_in_status() {
    let mut app = test_app();
    let id = add_box(&mut app, "Docs", 0.0, 0.0);
    app.current_page_mut().unwrap().object_mut(&id).unwrap().link = Link::Url { url: "  ".to_string() };
    let launcher = RecordingLauncher::default();

    app.follow_object_link(&id, &launcher);

    assert!(launcher.opened.borrow().is_empty());
    assert!(!app.status_message.is_empty());
}

#[test]
fn delete_selected_object_and_undo_restores_it() {
    let mut app = test_app();
    let id = add_box(&mut app, "Pump", 10.0, 10.0);
    app.select_object(Some(id.clone()));

    app.delete_selected_object();
    assert!(app.current_page().unwrap().object(&id).is_none());
    assert!(app.interaction.selected_object.is_none());

    app.perform_undo();
    assert!(app.current_page().unwrap().object(&id).is_some());
}

#[test]
fn copy_then_paste_adds_offset_copy() {
    let mut app = test_app();
    let id = add_box(&mut app, "Pump", 40.0, 60.0);
    app.select_object(Some(id.clone()));

    app.copy_selected_object();
    app.paste_object();

    let page = app.current_page().unwrap();
    assert_eq!(page.objects.len(), 2);
    let pasted_id = app.interaction.selected_object.clone().expect("paste selects the copy");
    assert_ne!(pasted_id, id);
    let (left, top, _, _) = page.object(&pasted_id).unwrap().bounds();
    assert_eq!((left, top), (60.0, 80.0));
}

#[test]
fn cut_removes_object_and_paste_brings_it_back() {
    let mut app = test_app();
    let id = add_box(&mut app, "Pump", 40.0, 60.0);
    app.select_object(Some(id.clone()));

    app.cut_selected_object();
    assert!(app.current_page().unwrap().objects.is_empty());
    assert!(app.clipboard.has_content());

    app.paste_object();
    assert_eq!(app.current_page().unwrap().objects.len(), 1);
}

#[test]
fn clipboard_shortcut_copies_selection() {
    let mut app = test_app();
    let id = add_box(&mut app, "Pump", 40.0, 60.0);
    app.select_object(Some(id));

    let _ = run_ui_with(vec![egui::Event::Copy], |ctx| app.handle_clipboard_keys(ctx));

    assert!(app.clipboard.has_content());
}

#[test]
fn link_to_page_named_creates_child_page_once() {
    let mut app = test_app();
    let first = add_box(&mut app, "Pump", 0.0, 0.0);
    let second = add_box(&mut app, "Valve", 200.0, 0.0);
    let main_id = app.current_page_id().unwrap();

    app.select_object(Some(first.clone()));
    app.link_selected_to_page_named("Details");
    app.select_object(Some(second.clone()));
    app.link_selected_to_page_named("Details");

    let details: Vec<_> = app
        .project
        .pages
        .iter()
        .filter(|p| p.name == "Details")
        .collect();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0].parent_id.as_deref(), Some(main_id.as_str()));

    let page = app.current_page().unwrap();
    assert_eq!(page.object(&first).unwrap().link.page_id(), Some(details[0].id.as_str()));
    assert_eq!(page.object(&second).unwrap().link.page_id(), Some(details[0].id.as_str()));
}

#[test]
fn link_to_blank_page_name_is_rejected() {
    let mut app = test_app();
    let id = add_box(&mut app, "Pump", 0.0, 0.0);
    app.select_object(Some(id));

    app.link_selected_to_page_named("   ");

    assert_eq!(app.project.pages.len(), 1);
    assert_eq!(app.status_message, "Enter a page name");
}

#[test]
fn switching_pages_clears_undo_and_selection() {
    let mut app = test_app();
    let id = add_box(&mut app, "Pump", 0.0, 0.0);
    app.select_object(Some(id));
    app.record_undo();
    let child = app.add_child_page("Child").unwrap();

    app.switch_to_page(&child);

    assert_eq!(app.current_page_id(), Some(child));
    assert!(!app.undo_history.can_undo());
    assert!(app.interaction.selected_object.is_none());
    assert!(!app.canvas.initialized, "new page is centred on next draw");
}

#[test]
fn deleting_current_page_returns_to_a_valid_page() {
    let mut app = test_app();
    let main_id = app.current_page_id().unwrap();
    let child = app.add_child_page("Child").unwrap();
    app.switch_to_page(&child);

    app.delete_page(&child);

    assert_eq!(app.current_page_id(), Some(main_id));
    assert!(app.project.page(&child).is_none());
    assert_eq!(app.status_message, "Deleted page: Child");
}

#[test]
fn undo_after_deleting_a_linked_page_cannot_restore_the_link() {
    let mut app = test_app();
    let id = add_box(&mut app, "Pump", 0.0, 0.0);
    app.select_object(Some(id.clone()));
    app.link_selected_to_page_named("Detail");
    let detail = app.project.page_by_name("Detail").unwrap().id.clone();
    assert!(app.undo_history.can_undo());

    app.delete_page(&detail);
    app.perform_undo();

    assert!(!app.undo_history.can_undo());
    assert!(!app.current_page().unwrap().object(&id).unwrap().link.is_some());
    assert!(app.project.validate().is_empty());
}

#[test]
fn reordering_an_object_already_in_place_records_no_undo() {
    let mut app = test_app();
    let below = add_box(&mut app, "Below", 0.0, 0.0);
    let above = add_box(&mut app, "Above", 20.0, 20.0);

    app.select_object(Some(above.clone()));
    app.bring_selected_to_front();
    assert!(!app.undo_history.can_undo());

    app.select_object(Some(below));
    app.bring_selected_to_front();
    assert_eq!(app.undo_history.undo_len(), 1);
    app.bring_selected_to_front();
    assert_eq!(app.undo_history.undo_len(), 1);
}

#[test]
fn deleting_last_page_is_refused() {
    let mut app = test_app();
    let main_id = app.current_page_id().unwrap();

    app.delete_page(&main_id);

    assert_eq!(app.project.pages.len(), 1);
    assert_eq!(app.status_message, "The last page cannot be deleted");
}

#[test]
fn navigation_shortcut_goes_back() {
    let mut app = test_app();
    let main_id = app.current_page_id().unwrap();
    let child = app.add_child_page("Child").unwrap();
    app.switch_to_page(&child);

    let _ = run_ui_with(
        vec![egui::Event::Key {
            key: egui::Key::ArrowLeft,
            physical_key: Some(egui::Key::ArrowLeft),
            pressed: true,
            repeat: false,
            modifiers: egui::Modifiers {
                alt: true,
                ..Default::default()
            },
        }],
        |ctx| app.handle_navigation_keys(ctx),
    );

    assert_eq!(app.current_page_id(), Some(main_id));
}

#[test]
fn property_edits_on_one_selection_share_an_undo_step() {
    let mut app = test_app();
    let id = add_box(&mut app, "Pump", 0.0, 0.0);
    app.select_object(Some(id.clone()));

    let mut edited = app.selected_object().unwrap().clone();
    edited.name = "Pump A".to_string();
    app.apply_property_edit(edited.clone());
    edited.name = "Pump AB".to_string();
    app.apply_property_edit(edited);

    assert_eq!(app.undo_history.undo_len(), 1);
    app.perform_undo();
    assert_eq!(app.current_page().unwrap().object(&id).unwrap().name, "Pump");
}

#[test]
fn app_state_round_trip_keeps_ui_preferences_only() {
    let mut app = test_app();
    add_box(&mut app, "Pump", 0.0, 0.0);
    app.dark_mode = false;
    app.show_page_tree = false;
    app.canvas.zoom_factor = 2.0;
    app.mode = AppMode::View;

    let json = app.to_json().expect("serialize app state");
    let restored = ExploderApp::from_json(&json).expect("deserialize app state");

    assert!(!restored.dark_mode);
    assert!(!restored.show_page_tree);
    assert_eq!(restored.canvas.zoom_factor, 2.0);
    assert_eq!(restored.mode, AppMode::View);
    assert!(restored.current_page().unwrap().objects.is_empty());
}

#[test]
fn failed_file_operation_sets_status() {
    let mut app = test_app();
    app.apply_file_result(FileOperationResult::OperationFailed("disk full".to_string()));
    assert!(app.status_message.contains("disk full"));
}

#[test]
fn page_links_import_applies_and_is_undoable() {
    let mut app = test_app();
    let id = add_box(&mut app, "Pump", 0.0, 0.0);
    app.current_page_mut().unwrap().object_mut(&id).unwrap().link = Link::Url {
        url: "https://example.com".to_string(),
    };
    let bulk = export_page_links(&app.project, app.current_page().unwrap()).expect("page has links");
    app.current_page_mut().unwrap().object_mut(&id).unwrap().link = Link::None;

    let page_id = app.current_page_id().unwrap();

    app.apply_page_links(&page_id, &bulk);

    assert_eq!(app.status_message, "Applied 1 of 1 link configurations to 'Main Page'");
    assert!(app.current_page().unwrap().object(&id).unwrap().link.is_some());

    app.perform_undo();
    assert!(!app.current_page().unwrap().object(&id).unwrap().link.is_some());
}

#[test]
fn page_links_import_that_changes_nothing_records_no_undo() {
    let mut app = test_app();
    let id = add_box(&mut app, "Pump", 0.0, 0.0);
    app.current_page_mut().unwrap().object_mut(&id).unwrap().link = Link::Url {
        url: "https://example.com".to_string(),
    };
    let bulk = export_page_links(&app.project, app.current_page().unwrap()).expect("page has links");
    let page_id = app.current_page_id().unwrap();

    app.apply_page_links(&page_id, &bulk);

    assert!(!app.undo_history.can_undo());
    assert!(!app.file.has_unsaved_changes);
}

#[test]
fn page_links_import_lands_on_the_page_it_was_requested_for() {
    let mut app = test_app();
    let id = add_box(&mut app, "Pump", 0.0, 0.0);
    app.current_page_mut().unwrap().object_mut(&id).unwrap().link = Link::Url {
        url: "https://example.com".to_string(),
    };
    let bulk = export_page_links(&app.project, app.current_page().unwrap()).expect("page has links");
    app.current_page_mut().unwrap().object_mut(&id).unwrap().link = Link::None;
    let main_id = app.current_page_id().unwrap();

    app.import_page_links_dialog();
    assert_eq!(
        app.file.pending_load_operation,
        Some(PendingLoadOperation::ImportPageLinks(main_id.clone()))
    );

    let child = app.add_child_page("Child").unwrap();
    app.switch_to_page(&child);
    let mut on_child = CanvasObject::with_box(ObjectKind::Rectangle, 0.0, 0.0, 50.0, 50.0);
    on_child.name = "Pump".to_string();
    let child_object = app.current_page_mut().unwrap().add_object(on_child);

    app.apply_file_result(FileOperationResult::PageLinksLoaded(main_id.clone(), Box::new(bulk.clone())));

    let main = app.project.page(&main_id).unwrap();
    assert!(main.object(&id).unwrap().link.is_some());
    assert!(!app.current_page().unwrap().object(&child_object).unwrap().link.is_some());
    assert!(!app.undo_history.can_undo(), "the shown page was not edited");

    app.delete_page(&main_id);
    app.apply_page_links(&main_id, &bulk);
    assert_eq!(app.status_message, "The page no longer exists");
}

#[test]
fn edits_during_save_as_dialog_stay_unsaved() {
    let mut app = test_app();
    app.file.has_unsaved_changes = true;
    app.file.save_as_generation = Some(app.file.edit_generation);

    app.context_menu.world_pos = (40.0, 40.0);
    app.create_object_at_pos(ObjectKind::Rectangle);
    app.apply_file_result(FileOperationResult::SaveCompleted(
        std::env::temp_dir().join("exploder-save-as.exp"),
    ));

    assert!(app.file.has_unsaved_changes);
    assert_eq!(app.file.save_as_generation, None);

    app.file.save_as_generation = Some(app.file.edit_generation);
    app.apply_file_result(FileOperationResult::SaveCompleted(
        std::env::temp_dir().join("exploder-save-as.exp"),
    ));
    assert!(!app.file.has_unsaved_changes);
}

#[test]
fn object_link_import_targets_the_given_object() {
    let mut app = test_app();
    let source = add_box(&mut app, "Pump", 0.0, 0.0);
    let target = add_box(&mut app, "Valve", 200.0, 0.0);
    app.current_page_mut().unwrap().object_mut(&source).unwrap().link = Link::Url {
        url: "https://example.com".to_string(),
    };
    let configuration =
        LinkConfiguration::from_object(app.current_page().unwrap().object(&source).unwrap());

    app.apply_object_link(&target, &configuration);
    assert_eq!(app.status_message, "Imported link into 'Valve'");
    assert!(app.current_page().unwrap().object(&target).unwrap().link.is_some());

    app.apply_object_link("missing", &configuration);
    assert_eq!(app.status_message, "The object no longer exists on this page");
}

#[test]
fn save_and_reopen_project_file() {
    let dir = std::env::temp_dir().join(format!("exploder-ui-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("plant.exp");

    let mut app = test_app();
    add_box(&mut app, "Pump", 0.0, 0.0);
    app.file.has_unsaved_changes = true;
    app.save_to(&path);

    assert!(!app.file.has_unsaved_changes);
    assert_eq!(app.file.current_path.as_deref(), Some(path.as_path()));
    assert_eq!(app.project.path, dir);

    let mut reopened = test_app();
    reopened.open_project_file(&path);
    assert_eq!(reopened.current_page().unwrap().objects.len(), 1);
    assert_eq!(reopened.file.current_path.as_deref(), Some(path.as_path()));
    assert_eq!(reopened.status_message, "Opened project: Untitled");

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn opening_missing_file_keeps_current_project() {
    let mut app = test_app();
    let id = add_box(&mut app, "Pump", 0.0, 0.0);

    app.open_project_file(Path::new("/definitely/not/here.exp"));

    assert!(app.current_page().unwrap().object(&id).is_some());
    assert!(app.status_message.starts_with("Failed to open project"));
}

#[test]
fn drawing_canvas_with_objects_produces_shapes() {
    let mut app = test_app();
    app.canvas.show_grid = false;
    for (i, kind) in ObjectKind::ALL.into_iter().enumerate() {
        let mut object = CanvasObject::with_box(kind, 20.0 + 130.0 * i as f64, 40.0, 120.0, 80.0);
        object.text = Some(crate::types::TextStyle::new("Label text that wraps"));
        app.current_page_mut().unwrap().add_object(object);
    }

    let out = run_ui_with(vec![], |ctx| {
        egui::CentralPanel::default().show(ctx, |ui| {
            app.draw_canvas(ui);
        });
    });

    assert!(!out.shapes.is_empty(), "expected some shapes to be painted");
}

#[test]
fn image_objects_load_their_file_or_fall_back() {
    let dir = std::env::temp_dir().join(format!("exploder-ui-img-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    image::RgbaImage::from_pixel(4, 4, image::Rgba([0, 128, 255, 255]))
        .save(dir.join("pump.png"))
        .unwrap();

    let mut app = test_app();
    app.project.path = dir.clone();
    let mut picture = CanvasObject::with_box(ObjectKind::Image, 10.0, 10.0, 100.0, 100.0);
    picture.image = Some("pump.png".into());
    let mut missing = CanvasObject::with_box(ObjectKind::Image, 200.0, 10.0, 100.0, 100.0);
    missing.image = Some("gone.png".into());
    app.current_page_mut().unwrap().add_object(picture);
    app.current_page_mut().unwrap().add_object(missing);

    let _ = run_ui_with(vec![], |ctx| {
        egui::CentralPanel::default().show(ctx, |ui| app.draw_canvas(ui));
    });

    assert!(app.image_cache.get(&dir.join("pump.png")).is_some());
    assert!(app.image_cache.contains(&dir.join("gone.png")));
    assert!(app.image_cache.get(&dir.join("gone.png")).is_none());
    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn first_draw_centres_the_page() {
    let mut app = ExploderApp::default();
    assert!(!app.canvas.initialized);

    let _ = run_ui_with(vec![], |ctx| {
        egui::CentralPanel::default().show(ctx, |ui| app.draw_canvas(ui));
    });

    assert!(app.canvas.initialized);
    assert_ne!(app.canvas.offset, egui::Vec2::ZERO);
}

#[test]
fn side_panels_render_for_selection_and_page() {
    let mut app = test_app();
    let id = add_box(&mut app, "Pump", 0.0, 0.0);
    app.add_child_page("Child");

    let out = run_ui_with(vec![], |ctx| {
        egui::SidePanel::left("page_tree_panel").show(ctx, |ui| app.draw_page_tree(ui));
        egui::SidePanel::right("properties_panel").show(ctx, |ui| app.draw_properties_panel(ui));
    });
    assert!(!out.shapes.is_empty());

    app.select_object(Some(id));
    let _ = run_ui_with(vec![], |ctx| {
        egui::SidePanel::right("properties_panel").show(ctx, |ui| app.draw_properties_panel(ui));
    });
    assert!(!app.undo_history.can_undo(), "showing the panel does not edit");
}
