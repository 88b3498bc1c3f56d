use std::error::Error;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::Parser;
use crossterm::event::KeyCode;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, BorderType};

use term_wnd::focus::handle_item_key;
use term_wnd::{Message, MessageKind, Toolkit, ToolkitConfig, WindowError, WindowFlags, WindowId};

const ITEMS: [&str; 3] = ["Open", "Save", "Quit"];
const DIALOG_WIDTH: u16 = 30;
const DIALOG_HEIGHT: u16 = 2 * ITEMS.len() as u16 + 1;

#[derive(Parser, Debug)]
#[command(
    name = "term-wnd",
    version = env!("CARGO_PKG_VERSION"),
    about = "Dialog demo for the term-wnd windowing toolkit"
)]
struct Cli {
    /// Sleep between empty polls of the message queues and input sources.
    #[arg(long = "poll-interval-us", value_name = "MICROS", default_value_t = 1000)]
    poll_interval_us: u64,

    /// Write logs to this file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Start with pointer capture disabled.
    #[arg(long = "no-mouse")]
    no_mouse: bool,

    /// Color pairs the terminal supports, including the default pair.
    #[arg(long = "max-color-pairs", value_name = "N", default_value_t = 256)]
    max_color_pairs: u16,
}

impl Cli {
    fn toolkit_config(&self) -> ToolkitConfig {
        ToolkitConfig::default()
            .with_poll_interval(Duration::from_micros(self.poll_interval_us))
            .with_mouse_capture(!self.no_mouse)
            .with_max_color_pairs(self.max_color_pairs)
    }
}

type Status = Arc<Mutex<String>>;

fn set_status(status: &Status, text: String) {
    *status.lock().unwrap_or_else(|err| err.into_inner()) = text;
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    if let Some(path) = &cli.log_file {
        term_wnd::tracing_sub::set_log_file(path)?;
    }
    term_wnd::tracing_sub::init_default();

    let toolkit = Toolkit::console(cli.toolkit_config())?;
    let result = run_demo(&toolkit);
    toolkit.destroy(toolkit.root());
    Ok(result?)
}

fn run_demo(toolkit: &Toolkit) -> Result<(), WindowError> {
    let root = toolkit.root();
    let screen = toolkit.geometry(root).unwrap_or_default();
    let status: Status = Arc::new(Mutex::new(
        "Tab/BackTab moves, Enter or click selects, q/Esc quits".to_string(),
    ));

    let backdrop = toolkit.init_pair(Color::Gray, Color::Black);
    toolkit.register_handler(root, MessageKind::Display, move |tk, w, _| {
        let style = tk.pair_style(backdrop);
        tk.with_surface(w, |surface| {
            surface.clear();
            let area = surface.area();
            surface.buffer_mut().set_style(area, style);
            surface.set_style(style.add_modifier(Modifier::BOLD));
            surface.print(" term-wnd demo");
        });
    });

    let x = (i32::from(screen.width) - i32::from(DIALOG_WIDTH)).max(0) / 2;
    let y = (i32::from(screen.height) - i32::from(DIALOG_HEIGHT)).max(0) / 2;
    let dialog = toolkit.create_child(root, x, y, DIALOG_WIDTH, DIALOG_HEIGHT)?;
    toolkit.insert_flags(dialog, WindowFlags::DIALOG);
    toolkit.register_handler(dialog, MessageKind::Display, |tk, w, _| {
        tk.with_surface(w, |surface| {
            surface.clear();
            let area = surface.area();
            let block = Block::bordered()
                .border_type(BorderType::Rounded)
                .title(" Menu ");
            surface.frame().render_widget(block, area);
        });
    });
    toolkit.set_teardown(dialog, |_, w| tracing::debug!(window = ?w, "dialog torn down"));

    let normal = toolkit.init_pair(Color::White, Color::Blue);
    let selected = toolkit.init_pair(Color::Black, Color::Cyan);
    for (index, label) in ITEMS.into_iter().enumerate() {
        let row = 1 + 2 * index as i32;
        let item = toolkit.create_child(dialog, 2, row, DIALOG_WIDTH - 4, 1)?;
        toolkit.insert_flags(item, WindowFlags::ITEM | WindowFlags::WANTS_ENTER);
        toolkit.set_child_id(item, index as i16);
        add_item_handlers(toolkit, item, label, (normal, selected), &status);
    }

    let status_row = i32::from(screen.height) - 1;
    let status_line = toolkit.create_child(root, 0, status_row, screen.width, 1)?;
    toolkit.insert_flags(status_line, WindowFlags::NO_FOCUS);
    let shown = Arc::clone(&status);
    toolkit.register_handler(status_line, MessageKind::Display, move |tk, w, _| {
        let text = shown.lock().unwrap_or_else(|err| err.into_inner()).clone();
        tk.with_surface(w, |surface| {
            surface.clear();
            surface.set_style(Style::default().add_modifier(Modifier::REVERSED));
            surface.print(&text);
        });
    });

    let exit = toolkit.run_loop(dialog);
    tracing::info!(?exit, "dialog closed");
    Ok(())
}

fn add_item_handlers(
    toolkit: &Toolkit,
    item: WindowId,
    label: &'static str,
    (normal, selected): (u16, u16),
    status: &Status,
) {
    toolkit.register_handler(item, MessageKind::Display, move |tk, w, _| {
        let pair = if tk.is_focused(w) { selected } else { normal };
        let style = tk.pair_style(pair);
        tk.with_surface(w, |surface| {
            surface.clear();
            let area = surface.area();
            surface.buffer_mut().set_style(area, style);
            surface.set_style(style);
            surface.move_to(1, 0);
            surface.print(label);
        });
    });

    let on_key = Arc::clone(status);
    toolkit.register_handler(item, MessageKind::KeyDown, move |tk, w, message| {
        match message.key_event().map(|key| key.code) {
            Some(KeyCode::Enter) => set_status(&on_key, format!("Selected {label}")),
            Some(KeyCode::Char('q')) => tk.send_message(w, Message::close()),
            _ => handle_item_key(tk, w, message),
        }
    });

    let on_click = Arc::clone(status);
    toolkit.register_handler(item, MessageKind::MouseLeftClick, move |tk, w, _| {
        set_status(&on_click, format!("Clicked {label}"));
        // Move the dialog's focus through the item that currently holds it.
        if let Some(focus) = tk.focus()
            && focus != w
            && tk.is_dialog_item(focus)
        {
            tk.send_message(focus, Message::change_focus(Some(w)));
        }
        tk.send_message(w, Message::display());
    });

    let on_double = Arc::clone(status);
    toolkit.register_handler(item, MessageKind::MouseLeftDouble, move |tk, w, _| {
        set_status(&on_double, format!("Activated {label}"));
        tk.send_message(w, Message::display());
    });
}
