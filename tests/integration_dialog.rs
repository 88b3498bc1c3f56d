mod common;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use term_wnd::focus::handle_item_key;
use term_wnd::{
    LoopExit, Message, MessageKind, Toolkit, WindowFlags, WindowId, dispatch_pointer,
};

use common::{Log, headless};

struct Scene {
    toolkit: Toolkit,
    dialog: WindowId,
    a1: WindowId,
    a2: WindowId,
    b: WindowId,
    log: Log,
}

fn key(code: KeyCode) -> Message {
    Message::key(KeyEvent::new(code, KeyModifiers::NONE))
}

/// Root 40x12 with dialog A (items a1, a2) on the left and plain window B on
/// the right.
fn scene() -> Scene {
    let (toolkit, _screen) = headless(40, 12);
    let root = toolkit.root();
    let dialog = toolkit.create_child(root, 0, 0, 20, 10).unwrap();
    toolkit.insert_flags(dialog, WindowFlags::DIALOG);
    let a1 = toolkit.create_child(dialog, 1, 1, 10, 1).unwrap();
    let a2 = toolkit.create_child(dialog, 1, 3, 10, 1).unwrap();
    let b = toolkit.create_child(root, 20, 0, 20, 10).unwrap();
    let log = Log::default();
    for (name, item) in [("a1", a1), ("a2", a2)] {
        toolkit.insert_flags(item, WindowFlags::ITEM);
        let log = log.clone();
        toolkit.register_handler(item, MessageKind::KeyDown, move |tk, w, message| {
            log.push(format!("{name} key focused={}", tk.is_focused(w)));
            handle_item_key(tk, w, message);
        });
    }
    Scene {
        toolkit,
        dialog,
        a1,
        a2,
        b,
        log,
    }
}

#[test]
fn tab_moves_to_next_item_and_close_bubbles_to_dialog() {
    let s = scene();
    s.toolkit.send_message(s.a1, key(KeyCode::Tab));
    s.toolkit.send_message(s.a2, key(KeyCode::Esc));

    assert_eq!(s.toolkit.run_loop(s.dialog), LoopExit::Closed);
    assert_eq!(
        s.log.entries(),
        vec!["a1 key focused=true", "a2 key focused=true"]
    );
    assert_eq!(s.toolkit.current_item(s.dialog), Some(s.a2));
    assert_eq!(s.toolkit.focus(), None);
    for w in [s.dialog, s.a1, s.a2] {
        assert_eq!(s.toolkit.pending_messages(w), 0);
    }
}

#[test]
fn back_tab_wraps_to_the_last_item() {
    let s = scene();
    s.toolkit.send_message(s.a1, key(KeyCode::BackTab));
    s.toolkit.send_message(s.a2, key(KeyCode::Esc));
    assert_eq!(s.toolkit.run_loop(s.dialog), LoopExit::Closed);
    assert_eq!(s.toolkit.current_item(s.dialog), Some(s.a2));
}

#[test]
fn enter_closes_unless_the_item_wants_it() {
    let s = scene();
    s.toolkit.insert_flags(s.a1, WindowFlags::WANTS_ENTER);
    s.toolkit.send_message(s.a1, key(KeyCode::Enter));
    s.toolkit.send_message(s.a1, key(KeyCode::Tab));
    s.toolkit.send_message(s.a2, key(KeyCode::Enter));
    assert_eq!(s.toolkit.run_loop(s.dialog), LoopExit::Closed);
    assert_eq!(s.log.entries().len(), 3);
}

#[test]
fn pointer_press_resolves_to_window_under_it_and_notifies_focus() {
    let s = scene();
    let log = s.log.clone();
    s.toolkit
        .register_handler(s.b, MessageKind::MouseLeftClick, move |_, _, message| {
            log.push(format!("b click {:?}", message.point()));
        });
    let log = s.log.clone();
    s.toolkit
        .register_handler(s.a1, MessageKind::MouseOutsideFocus, move |tk, w, _| {
            log.push("a1 outside");
            tk.send_message(w, Message::close());
        });
    let log = s.log.clone();
    let b = s.b;
    s.toolkit
        .register_handler(s.a1, MessageKind::KeyDown, move |tk, _, _| {
            let target = dispatch_pointer(tk, MessageKind::MouseLeftClick, 25, 3);
            log.push(format!("resolved b={}", target == Some(b)));
        });

    s.toolkit.send_message(s.a1, key(KeyCode::Char('p')));
    assert_eq!(s.toolkit.run_loop(s.dialog), LoopExit::Closed);
    assert_eq!(
        s.log.entries(),
        vec!["b click Some((5, 3))", "resolved b=true", "a1 outside"]
    );
}

#[test]
fn pointer_press_on_focused_window_sends_no_outside_notice() {
    let s = scene();
    let log = s.log.clone();
    s.toolkit
        .register_handler(s.a1, MessageKind::MouseLeftClick, move |_, _, message| {
            log.push(format!("a1 click {:?}", message.point()));
        });
    let log = s.log.clone();
    s.toolkit
        .register_handler(s.a1, MessageKind::MouseOutsideFocus, move |_, _, _| {
            log.push("a1 outside");
        });
    s.toolkit
        .register_handler(s.a1, MessageKind::KeyDown, |tk, w, _| {
            dispatch_pointer(tk, MessageKind::MouseLeftClick, 2, 1);
            tk.send_message(w, Message::close());
        });
    s.toolkit.send_message(s.a1, key(KeyCode::Char('p')));
    assert_eq!(s.toolkit.run_loop(s.dialog), LoopExit::Closed);
    assert_eq!(s.log.entries(), vec!["a1 click Some((1, 0))"]);
}

#[test]
fn requested_focus_target_is_selected_directly() {
    let s = scene();
    s.toolkit
        .register_handler(s.a1, MessageKind::KeyDown, move |tk, w, _| {
            let target = tk.children(tk.parent(w).unwrap())[1];
            tk.send_message(w, Message::change_focus(Some(target)));
        });
    s.toolkit.send_message(s.a1, key(KeyCode::Char('x')));
    s.toolkit.send_message(s.a2, key(KeyCode::Esc));
    assert_eq!(s.toolkit.run_loop(s.dialog), LoopExit::Closed);
    assert_eq!(s.toolkit.current_item(s.dialog), Some(s.a2));
}

#[test]
fn dialog_without_children_runs_as_a_plain_window() {
    let (toolkit, _screen) = headless(10, 5);
    let dialog = toolkit.create_child(toolkit.root(), 0, 0, 5, 5).unwrap();
    toolkit.insert_flags(dialog, WindowFlags::DIALOG);
    toolkit.send_message(dialog, Message::close());
    assert_eq!(toolkit.run_loop(dialog), LoopExit::Closed);
    assert_eq!(toolkit.current_item(dialog), None);
}
