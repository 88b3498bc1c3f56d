mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::Color;
use term_wnd::{
    Message, MessageKind, ToolkitConfig, WindowError, WindowFlags, deliver_key, dispatch_pointer,
};

use common::{Log, headless, headless_with};

#[test]
fn child_geometry_is_absolute_and_validated() {
    let (toolkit, _screen) = headless(20, 10);
    let root = toolkit.root();
    let panel = toolkit.create_child(root, 4, 2, 10, 6).unwrap();
    let inner = toolkit.create_child(panel, 1, 1, 3, 2).unwrap();
    let geometry = toolkit.geometry(inner).unwrap();
    assert_eq!((geometry.x, geometry.y), (1, 1));
    assert_eq!((geometry.abs_x, geometry.abs_y), (5, 3));

    assert!(matches!(
        toolkit.create_child(root, 15, 0, 6, 1),
        Err(WindowError::InvalidGeometry { .. })
    ));
    assert!(matches!(
        toolkit.create_child(root, 0, 0, 0, 1),
        Err(WindowError::InvalidGeometry { .. })
    ));
    assert!(matches!(
        toolkit.create_child(panel, -5, 0, 1, 1),
        Err(WindowError::InvalidGeometry { .. })
    ));
    assert!(matches!(
        toolkit.create_child(panel, i32::MAX, 0, 1, 1),
        Err(WindowError::InvalidGeometry { .. })
    ));
    assert!(matches!(
        toolkit.create_child(panel, 0, i32::MIN, 1, 1),
        Err(WindowError::InvalidGeometry { .. })
    ));
    assert_eq!(toolkit.children(panel), vec![inner]);
    toolkit.destroy(panel);
    assert!(matches!(
        toolkit.create_child(panel, 0, 0, 1, 1),
        Err(WindowError::MissingParent(_))
    ));
}

#[test]
fn point_belongs_excludes_far_edges() {
    let (toolkit, _screen) = headless(20, 10);
    let w = toolkit.create_child(toolkit.root(), 2, 3, 4, 2).unwrap();
    assert!(toolkit.point_belongs(w, 2, 3));
    assert!(toolkit.point_belongs(w, 5, 4));
    assert!(!toolkit.point_belongs(w, 6, 3));
    assert!(!toolkit.point_belongs(w, 2, 5));
    assert!(!toolkit.point_belongs(w, 1, 3));
}

#[test]
fn destroy_tears_down_children_first_and_unlinks() {
    let (toolkit, _screen) = headless(20, 10);
    let root = toolkit.root();
    let parent = toolkit.create_child(root, 0, 0, 10, 10).unwrap();
    toolkit.set_child_id(parent, 7);
    let c1 = toolkit.create_child(parent, 0, 0, 2, 2).unwrap();
    let grandchild = toolkit.create_child(c1, 0, 0, 1, 1).unwrap();
    let c2 = toolkit.create_child(parent, 2, 0, 2, 2).unwrap();
    let c3 = toolkit.create_child(parent, 4, 0, 2, 2).unwrap();

    let log = Log::default();
    for (name, w) in [
        ("parent", parent),
        ("c1", c1),
        ("grandchild", grandchild),
        ("c2", c2),
        ("c3", c3),
    ] {
        let log = log.clone();
        toolkit.set_teardown(w, move |tk, w| {
            // already detached from its parent
            assert_eq!(tk.parent(w), None);
            log.push(name);
        });
    }
    assert_eq!(toolkit.find_child_by_id(root, 7), Some(parent));
    toolkit.destroy(parent);

    assert_eq!(
        log.entries(),
        vec!["grandchild", "c1", "c2", "c3", "parent"]
    );
    assert_eq!(toolkit.find_child_by_id(root, 7), None);
    assert!(toolkit.children(root).is_empty());
    assert_eq!(toolkit.window_count(), 1);
    for w in [parent, c1, grandchild, c2, c3] {
        assert!(!toolkit.is_live(w));
    }
}

#[test]
fn dead_handles_are_no_ops() {
    let (toolkit, _screen) = headless(10, 5);
    let w = toolkit.create_child(toolkit.root(), 0, 0, 2, 2).unwrap();
    toolkit.destroy(w);
    toolkit.send_message(w, Message::close());
    toolkit.destroy(w);
    assert_eq!(toolkit.pending_messages(w), 0);
    assert_eq!(toolkit.geometry(w), None);
    assert_eq!(toolkit.flags(w), WindowFlags::empty());
    assert!(!toolkit.point_belongs(w, 0, 0));
    assert_eq!(toolkit.cursor(w).x, 0);
    assert!(toolkit.with_surface(w, |_| ()).is_none());
}

#[test]
fn select_item_wraps_and_skips_unfocusable_items() {
    let (toolkit, _screen) = headless(20, 10);
    let dialog = toolkit.create_child(toolkit.root(), 0, 0, 10, 10).unwrap();
    toolkit.insert_flags(dialog, WindowFlags::DIALOG);
    let i1 = toolkit.create_child(dialog, 0, 0, 5, 1).unwrap();
    let i2 = toolkit.create_child(dialog, 0, 1, 5, 1).unwrap();
    let i3 = toolkit.create_child(dialog, 0, 2, 5, 1).unwrap();
    toolkit.insert_flags(i2, WindowFlags::NO_FOCUS);

    assert_eq!(toolkit.select_item(dialog, None), Some(i1));
    assert_eq!(toolkit.select_item(dialog, None), Some(i3));
    assert_eq!(toolkit.select_item(dialog, None), Some(i1));
    // an unfocusable request counts as no request
    assert_eq!(toolkit.select_item(dialog, Some(i2)), Some(i3));
    assert_eq!(toolkit.select_item(dialog, Some(i1)), Some(i1));
    assert_eq!(toolkit.current_item(dialog), Some(i1));
}

#[test]
fn select_item_keeps_the_only_focusable_item_and_gives_up_on_none() {
    let (toolkit, _screen) = headless(20, 10);
    let dialog = toolkit.create_child(toolkit.root(), 0, 0, 10, 10).unwrap();
    toolkit.insert_flags(dialog, WindowFlags::DIALOG);
    let only = toolkit.create_child(dialog, 0, 0, 5, 1).unwrap();
    let blocked = toolkit.create_child(dialog, 0, 1, 5, 1).unwrap();
    toolkit.insert_flags(blocked, WindowFlags::NO_FOCUS);
    assert_eq!(toolkit.select_item(dialog, None), Some(only));
    assert_eq!(toolkit.select_item(dialog, None), Some(only));

    toolkit.insert_flags(only, WindowFlags::NO_FOCUS);
    assert_eq!(toolkit.select_item(dialog, None), None);
    assert_eq!(toolkit.current_item(dialog), None);
}

#[test]
fn color_pairs_are_reused_until_the_table_is_full() {
    let config = ToolkitConfig::default().with_max_color_pairs(3);
    let (toolkit, _screen) = headless_with(config, 10, 5, None);
    let a = toolkit.init_pair(Color::Red, Color::Black);
    let b = toolkit.init_pair(Color::Green, Color::Black);
    assert_eq!((a, b), (1, 2));
    assert_eq!(toolkit.init_pair(Color::Red, Color::Black), a);
    assert_eq!(toolkit.init_pair(Color::Blue, Color::Black), 0);
    assert_eq!(toolkit.pair_content(b), Some((Color::Green, Color::Black)));
    assert_eq!(toolkit.pair_style(0), ratatui::style::Style::default());
}

#[test]
fn immediate_messages_skip_the_queue() {
    let (toolkit, _screen) = headless(10, 5);
    let w = toolkit.create_child(toolkit.root(), 0, 0, 2, 2).unwrap();
    let seen = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&seen);
    toolkit.register_handler(w, MessageKind::Notify, move |_, _, message| {
        if let term_wnd::Payload::Value(v) = message.payload {
            counter.fetch_add(v as usize, Ordering::SeqCst);
        }
    });
    toolkit.send_message(w, Message::notify(5));
    assert_eq!(seen.load(Ordering::SeqCst), 5);
    assert_eq!(toolkit.pending_messages(w), 0);

    toolkit.send_message(w, Message::outside_focus());
    assert_eq!(toolkit.pending_messages(w), 1);
}

#[test]
fn deferred_payload_is_released_by_the_loop() {
    struct Tracked(Arc<AtomicUsize>);
    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    let (toolkit, _screen) = headless(10, 5);
    let w = toolkit.create_child(toolkit.root(), 0, 0, 2, 2).unwrap();
    let drops = Arc::new(AtomicUsize::new(0));
    toolkit.send_message(w, Message::deferred_free(Tracked(Arc::clone(&drops))));
    assert_eq!(drops.load(Ordering::SeqCst), 0);
    toolkit.send_message(w, Message::close());
    toolkit.run_loop(w);
    assert_eq!(drops.load(Ordering::SeqCst), 1);
}

#[test]
fn redraw_key_repaints_and_is_still_delivered() {
    let (toolkit, screen) = headless(10, 5);
    let ctrl_l = KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL);
    deliver_key(&toolkit, ctrl_l);
    assert_eq!(screen.invalidations(), 1);
    assert_eq!(screen.commits(), 1);

    let w = toolkit.create_child(toolkit.root(), 0, 0, 2, 2).unwrap();
    let log = Log::default();
    let keys = log.clone();
    toolkit.register_handler(w, MessageKind::KeyDown, move |tk, w, message| {
        keys.push(format!("{:?}", message.key_event().map(|k| k.code)));
        tk.send_message(w, Message::close());
        deliver_key(tk, KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
    });
    toolkit.send_message(w, Message::key(ctrl_l));
    toolkit.run_loop(w);
    assert_eq!(log.entries(), vec!["Some(Char('l'))"]);
    // Esc was queued behind the close
    assert_eq!(toolkit.pending_messages(w), 1);
}

#[test]
fn default_handlers_can_be_chained() {
    let (toolkit, _screen) = headless(10, 5);
    let dialog = toolkit.create_child(toolkit.root(), 0, 0, 5, 5).unwrap();
    toolkit.insert_flags(dialog, WindowFlags::DIALOG);
    let item = toolkit.create_child(dialog, 0, 0, 2, 1).unwrap();
    toolkit.insert_flags(item, WindowFlags::ITEM);
    let log = Log::default();
    let closes = log.clone();
    let stock = term_wnd::Toolkit::default_handler(MessageKind::Close).unwrap();
    toolkit.register_handler(item, MessageKind::Close, move |tk, w, message| {
        closes.push("item close");
        stock(tk, w, message);
    });
    toolkit.send_message(item, Message::close());
    assert_eq!(toolkit.run_loop(dialog), term_wnd::LoopExit::Closed);
    assert_eq!(log.entries(), vec!["item close"]);
}

#[test]
fn pointer_dispatch_accepts_button_kinds_only() {
    let (toolkit, _screen) = headless(10, 4);
    let w = toolkit.create_child(toolkit.root(), 0, 0, 4, 2).unwrap();
    let log = Log::default();
    let clicks = log.clone();
    toolkit.register_handler(w, MessageKind::MouseLeftClick, move |_, _, message| {
        if let Some((x, y)) = message.point() {
            clicks.push(format!("click {x},{y}"));
        }
    });

    assert_eq!(dispatch_pointer(&toolkit, MessageKind::Close, 1, 1), None);
    assert_eq!(dispatch_pointer(&toolkit, MessageKind::KeyDown, 1, 1), None);
    assert_eq!(toolkit.pending_messages(w), 0);

    assert_eq!(
        dispatch_pointer(&toolkit, MessageKind::MouseLeftClick, 1, 1),
        Some(w)
    );
    assert_eq!(log.entries(), vec!["click 1,1"]);
}
