pub mod app;
pub mod event;
pub mod theme;
pub mod ui;

pub use app::App;
pub use theme::{resolve_theme, Theme, ThemeColors};

use std::time::Instant;

use crossterm::event::{DisableBracketedPaste, EnableBracketedPaste, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use event::{Event, EventHandler};

const TICK_RATE_MS: u64 = 50;

pub async fn run_tui(mut app: App) -> anyhow::Result<()> {
    // Buffer stderr while TUI is active to prevent output corrupting the display
    crate::stderr_buffer::activate();

    // Init terminal (sets up panic hooks automatically)
    let mut terminal = ratatui::init();
    if let Err(e) = execute!(std::io::stdout(), EnableBracketedPaste) {
        tracing::warn!(error = %e, "Bracketed paste unavailable");
    }

    // Short ticks so deferred removals land close to their delay
    let mut events = EventHandler::new(TICK_RATE_MS);

    let result = loop {
        if let Err(e) = terminal.draw(|frame| ui::draw(frame, &mut app)) {
            break Err(e.into());
        }

        let event = events.next().await;
        handle_event(&mut app, event, Instant::now());

        if app.should_quit {
            flush_before_quit(&mut app, Instant::now());
            break Ok(());
        }
    };

    // Restore terminal
    if let Err(e) = execute!(std::io::stdout(), DisableBracketedPaste) {
        tracing::debug!(error = %e, "Failed to disable bracketed paste");
    }
    ratatui::restore();

    // Flush buffered stderr messages now that the terminal is restored
    for msg in crate::stderr_buffer::drain() {
        eprintln!("{}", msg);
    }

    result
}

/// Commit removals still fading out so they are not lost on exit.
fn flush_before_quit(app: &mut App, now: Instant) {
    app.commit_due_removals(now + app::REMOVAL_DELAY);
}

/// Dispatch one event. `None` means input has ended and the app should quit.
fn handle_event(app: &mut App, event: Option<Event>, now: Instant) {
    match event {
        Some(Event::Key(key)) => handle_key_event(app, key),
        Some(Event::Paste(text)) => {
            if matches!(
                app.input_mode,
                app::InputMode::Normal | app::InputMode::EditName { .. }
            ) {
                app.paste(&text);
            }
        }
        Some(Event::Tick) => app.on_tick(now),
        None => {
            tracing::debug!("Terminal event stream ended, quitting");
            app.should_quit = true;
        }
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match app.input_mode {
        app::InputMode::Normal => match key.code {
            KeyCode::Char('q') => app.should_quit = true,

            // Navigation
            KeyCode::Char('j') | KeyCode::Down => app.next_row(),
            KeyCode::Char('k') | KeyCode::Up => app.previous_row(),
            KeyCode::Tab | KeyCode::Right | KeyCode::Char('l') => app.next_set(),
            KeyCode::BackTab | KeyCode::Left | KeyCode::Char('h') => app.previous_set(),
            KeyCode::Char(c @ '1'..='9') => {
                if let Some(digit) = c.to_digit(10) {
                    app.select_set(digit as usize - 1);
                }
            }

            // Editing
            KeyCode::Enter | KeyCode::Char('e') => app.start_edit(),
            KeyCode::Char('+') | KeyCode::Char('=') => app.nudge_selected(1.0),
            KeyCode::Char('-') => app.nudge_selected(-1.0),
            KeyCode::Char('a') => app.add_item(),
            KeyCode::Char('d') => app.mark_selected_for_removal(Instant::now()),
            KeyCode::Char('D') => app.distribute_current(),
            KeyCode::Char('c') => app.start_copy_from(),

            // Output
            KeyCode::Char('x') => app.export_csv(chrono::Local::now()),
            KeyCode::Char('y') => app.copy_tsv(),

            KeyCode::Char('R') => app.request_reset(),
            KeyCode::Char('?') => app.show_help(),
            _ => {}
        },
        app::InputMode::EditName { .. } => match key.code {
            KeyCode::Enter => app.confirm_edit(),
            KeyCode::Esc => app.finish_edit(),
            KeyCode::Backspace => app.edit_backspace(),
            KeyCode::Down | KeyCode::Tab => {
                app.finish_edit();
                app.next_row();
                app.start_edit();
            }
            KeyCode::Up | KeyCode::BackTab => {
                app.finish_edit();
                app.previous_row();
                app.start_edit();
            }
            KeyCode::Char(c) => app.edit_push(c),
            // Ignore all other keys (don't propagate to Normal mode)
            _ => {}
        },
        app::InputMode::CopyFrom => match key.code {
            KeyCode::Char(c @ '1'..='9') => {
                if let Some(digit) = c.to_digit(10) {
                    app.copy_from(digit as usize - 1);
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => app.cancel(),
            _ => {}
        },
        app::InputMode::ConfirmReset => match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') => app.confirm_reset(),
            _ => app.cancel(),
        },
        app::InputMode::Help => {
            // Any key exits help
            app.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::storage::{MemoryStore, Session};

    fn app() -> App {
        let mut config = Config::default();
        config.limits.min_items = 3;
        config.limits.max_items = 5;
        let session = Session::fresh(&config);
        App::new(session, config, Box::new(MemoryStore::new()), ThemeColors::dark())
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_typing_in_edit_mode_does_not_trigger_commands() {
        let mut app = app();
        press(&mut app, KeyCode::Char('e'));
        for c in "quad".chars() {
            press(&mut app, KeyCode::Char(c));
        }
        assert!(!app.should_quit);
        assert_eq!(app.current().unwrap().items()[0].name, "quad");
        assert_eq!(app.current().unwrap().len(), 3);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.input_mode, app::InputMode::Normal);
    }

    #[test]
    fn test_number_keys_select_set() {
        let mut app = app();
        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.current_set, 2);
        press(&mut app, KeyCode::Char('9'));
        assert_eq!(app.current_set, 2);
    }

    #[test]
    fn test_reset_requires_confirmation() {
        let mut app = app();
        press(&mut app, KeyCode::Char('e'));
        press(&mut app, KeyCode::Char('A'));
        press(&mut app, KeyCode::Esc);

        press(&mut app, KeyCode::Char('R'));
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.current().unwrap().items()[0].name, "A");

        press(&mut app, KeyCode::Char('R'));
        press(&mut app, KeyCode::Char('y'));
        assert_eq!(app.current().unwrap().items()[0].name, "");
    }

    #[test]
    fn test_end_of_input_quits_and_flushes_removals() {
        let mut app = app();
        let now = Instant::now();
        app.add_item();
        let marked = app.selected_item_id().unwrap();
        app.mark_selected_for_removal(now);

        handle_event(&mut app, Some(Event::Tick), now);
        assert!(!app.should_quit);
        assert!(app.current().unwrap().item(marked).is_some());

        handle_event(&mut app, None, now);
        assert!(app.should_quit);
        flush_before_quit(&mut app, now);
        assert!(app.current().unwrap().item(marked).is_none());
        assert!(app.pending_removals.is_empty());
    }

    #[test]
    fn test_ctrl_c_quits_from_any_mode() {
        let mut app = app();
        press(&mut app, KeyCode::Char('e'));
        handle_key_event(
            &mut app,
            KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
        );
        assert!(app.should_quit);
    }
}
