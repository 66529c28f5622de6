use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, size as terminal_size};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::io;
use std::time::{Duration, Instant};

use crate::config::KeyBindings;
use crate::tui::app::{Mode, Modal, TaskField};
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;
use crate::tui::App;
use crate::utils::{has_primary_modifier, parse_key_binding, ParsedKeyBinding};

/// Guard that restores the terminal even on panic, so a crash never
/// leaves the user's shell in raw mode or on the alternate screen.
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    /// Restore terminal state on normal exit; the drop becomes a no-op
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Already on a cleanup path, errors are ignored
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

/// Configured key bindings, parsed once at startup
pub struct KeyMap {
    pub quit: ParsedKeyBinding,
    pub new: ParsedKeyBinding,
    pub edit: ParsedKeyBinding,
    pub delete: ParsedKeyBinding,
    pub mark_done: ParsedKeyBinding,
    pub toggle_select: ParsedKeyBinding,
    pub menu: ParsedKeyBinding,
    pub filter: ParsedKeyBinding,
    pub refresh: ParsedKeyBinding,
    pub help: ParsedKeyBinding,
    pub list_up: ParsedKeyBinding,
    pub list_down: ParsedKeyBinding,
    pub save: ParsedKeyBinding,
}

impl KeyMap {
    pub fn from_config(bindings: &KeyBindings) -> Result<Self, TuiError> {
        let parse = |name: &str, value: &str| {
            parse_key_binding(value).map_err(|e| TuiError::KeyBindingError(format!("{}: {}", name, e)))
        };

        Ok(Self {
            quit: parse("quit", &bindings.quit)?,
            new: parse("new", &bindings.new)?,
            edit: parse("edit", &bindings.edit)?,
            delete: parse("delete", &bindings.delete)?,
            mark_done: parse("mark_done", &bindings.mark_done)?,
            toggle_select: parse("toggle_select", &bindings.toggle_select)?,
            menu: parse("menu", &bindings.menu)?,
            filter: parse("filter", &bindings.filter)?,
            refresh: parse("refresh", &bindings.refresh)?,
            help: parse("help", &bindings.help)?,
            list_up: parse("list_up", &bindings.list_up)?,
            list_down: parse("list_down", &bindings.list_down)?,
            save: parse("save", &bindings.save)?,
        })
    }
}

pub fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    let keymap = KeyMap::from_config(&app.config.key_bindings)?;

    // Check the size before entering the alternate screen so the error is readable
    let (width, height) = terminal_size()?;
    let min_width_with_border = Layout::MIN_WIDTH + 2;
    let min_height_with_border = Layout::MIN_HEIGHT + 2;
    if width < min_width_with_border || height < min_height_with_border {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width_with_border, min_height_with_border
        )));
    }

    let mut guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    loop {
        app.check_status_message_timeout();
        app.check_pending_notices(Instant::now());

        let size = terminal.size()?;
        let terminal_rect = Rect::new(0, 0, size.width, size.height);
        terminal.draw(|f| {
            let layout = Layout::calculate(terminal_rect);
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        if event::poll(Duration::from_millis(50))? {
            // Only Press events, Windows also reports Release
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press && handle_key_event(&mut app, &keymap, key_event) {
                    break;
                }
            }
        }
    }

    guard.restore()?;
    tracing::info!("leaving TUI, saving tasks");
    app.store.flush()?;

    Ok(())
}

/// Dispatch a key press. Returns true when the user asked to quit.
pub fn handle_key_event(app: &mut App, keymap: &KeyMap, key_event: KeyEvent) -> bool {
    if app.modal.is_some() {
        handle_modal(app, key_event);
        return false;
    }

    match app.ui.mode {
        Mode::Form => {
            handle_form_mode(app, keymap, key_event);
            false
        }
        Mode::Menu => {
            handle_menu_mode(app, key_event);
            false
        }
        Mode::Help => {
            if key_event.code == KeyCode::Esc || matches_key_event(key_event, &keymap.help) {
                app.exit_help_mode();
            }
            false
        }
        Mode::View => handle_view_mode(app, keymap, key_event),
    }
}

fn handle_modal(app: &mut App, key_event: KeyEvent) {
    match app.modal.take() {
        Some(Modal::Message { title, body }) => {
            if !matches!(key_event.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
                app.modal = Some(Modal::Message { title, body });
            }
        }
        Some(Modal::ConfirmDelete { ids, selection }) => match key_event.code {
            KeyCode::Up | KeyCode::Down | KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
                app.modal = Some(Modal::ConfirmDelete { ids, selection: 1 - selection.min(1) });
            }
            KeyCode::Char('y') => app.confirm_delete(&ids),
            KeyCode::Enter => {
                if selection == 0 {
                    app.confirm_delete(&ids);
                }
            }
            KeyCode::Esc | KeyCode::Char('n') => {}
            _ => app.modal = Some(Modal::ConfirmDelete { ids, selection }),
        },
        None => {}
    }
}

fn handle_menu_mode(app: &mut App, key_event: KeyEvent) {
    match key_event.code {
        KeyCode::Up | KeyCode::Char('k') => app.move_menu_selection(false),
        KeyCode::Down | KeyCode::Char('j') => app.move_menu_selection(true),
        KeyCode::Enter => app.run_menu_action(),
        KeyCode::Esc => app.close_menu(),
        _ => {}
    }
}

fn handle_form_mode(app: &mut App, keymap: &KeyMap, key_event: KeyEvent) {
    if key_event.code == KeyCode::Esc {
        app.exit_form_mode();
        return;
    }
    if key_event.code == KeyCode::Enter || matches_key_event(key_event, &keymap.save) {
        app.save_form();
        return;
    }

    let Some(form) = app.form.as_mut() else {
        return;
    };

    match key_event.code {
        KeyCode::Tab | KeyCode::Down => {
            form.navigate_field(true);
            return;
        }
        KeyCode::BackTab | KeyCode::Up => {
            form.navigate_field(false);
            return;
        }
        _ => {}
    }

    if matches!(form.current_field, TaskField::Priority | TaskField::Status) {
        if matches!(key_event.code, KeyCode::Left | KeyCode::Right | KeyCode::Char(' ')) {
            form.cycle_choice();
        }
        return;
    }

    if let Some(editor) = form.current_editor() {
        match key_event.code {
            KeyCode::Char(ch) if !has_primary_modifier(key_event.modifiers) => editor.insert_char(ch),
            KeyCode::Backspace => editor.delete_char(),
            KeyCode::Delete => editor.delete_forward(),
            KeyCode::Left => editor.move_cursor_left(),
            KeyCode::Right => editor.move_cursor_right(),
            KeyCode::Home => editor.move_cursor_home(),
            KeyCode::End => editor.move_cursor_end(),
            _ => {}
        }
    }
}

fn handle_view_mode(app: &mut App, keymap: &KeyMap, key_event: KeyEvent) -> bool {
    if matches_key_event(key_event, &keymap.quit) {
        return true;
    }

    if key_event.code == KeyCode::Up || matches_key_event(key_event, &keymap.list_up) {
        app.move_selection_up();
    } else if key_event.code == KeyCode::Down || matches_key_event(key_event, &keymap.list_down) {
        app.move_selection_down();
    } else if matches_key_event(key_event, &keymap.new) {
        app.enter_create_mode();
    } else if matches_key_event(key_event, &keymap.edit) {
        app.enter_edit_mode();
    } else if matches_key_event(key_event, &keymap.delete) {
        app.request_delete();
    } else if matches_key_event(key_event, &keymap.mark_done) {
        app.mark_done();
    } else if matches_key_event(key_event, &keymap.toggle_select) {
        app.toggle_mark();
    } else if matches_key_event(key_event, &keymap.menu) || key_event.code == KeyCode::Enter {
        app.open_menu();
    } else if matches_key_event(key_event, &keymap.filter) {
        app.cycle_filter();
    } else if matches_key_event(key_event, &keymap.refresh) {
        app.refresh();
        app.set_status_message("Task list refreshed".to_string());
    } else if matches_key_event(key_event, &keymap.help) {
        app.enter_help_mode();
    } else if key_event.code == KeyCode::Esc {
        app.ui.marked.clear();
    }

    false
}

fn matches_key_event(key_event: KeyEvent, binding: &ParsedKeyBinding) -> bool {
    // Shift only changes the character for plain keys
    let modifiers = key_event.modifiers.difference(KeyModifiers::SHIFT);
    if binding.requires_ctrl != has_primary_modifier(modifiers) {
        return false;
    }
    binding.key_code == key_event.code
}
