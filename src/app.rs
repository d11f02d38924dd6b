//! Terminal lifecycle and the interactive event loop.

use crate::client::AskClient;
use crate::config::Config;
use crate::events::{AppEvent, TuiEvent};
use crate::ui::chat::ChatController;
use anyhow::{Context, Result};
use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event as CEvent, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Run the interactive chat session until the user quits.
pub async fn run(config: Config) -> Result<()> {
    let client = AskClient::new(&config.endpoint);
    tracing::info!("starting interactive session against {}", client.endpoint());

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut terminal = match setup_terminal() {
        Ok(terminal) => terminal,
        Err(error) => {
            // Leave the terminal usable even when setup fails halfway.
            let _ = disable_raw_mode();
            return Err(error);
        }
    };

    let (reply_tx, reply_rx) = mpsc::unbounded_channel();
    let mut controller = ChatController::new(client, reply_tx, config.ui.timestamps);

    let result = run_loop(&mut terminal, &mut controller, reply_rx).await;

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )
    .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to restore cursor")?;

    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)
        .context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("Failed to build terminal")
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    controller: &mut ChatController,
    mut reply_rx: mpsc::UnboundedReceiver<AppEvent>,
) -> Result<()> {
    let (tui_tx, mut tui_rx) = mpsc::unbounded_channel();
    spawn_input_reader(tui_tx);

    loop {
        terminal.draw(|frame| controller.render(frame))?;

        tokio::select! {
            Some(event) = tui_rx.recv() => match event {
                TuiEvent::Key(key) if is_quit_key(&key) => break,
                TuiEvent::Key(key) => controller.handle_key(key),
                TuiEvent::Paste(text) => controller.handle_paste(&text),
                // Both just trigger the redraw at the top of the loop.
                TuiEvent::Resize | TuiEvent::Tick => {}
            },
            Some(AppEvent::Reply { id, result }) = reply_rx.recv() => {
                controller.apply_reply(id, result);
            }
            else => break,
        }
    }

    Ok(())
}

fn is_quit_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }

    match key.code {
        KeyCode::Esc => true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => true,
        _ => false,
    }
}

/// Forward terminal events into the loop, with a tick every 250ms so the
/// UI redraws even when the user is idle.
///
/// Runs on its own OS thread: `event::poll` and `event::read` block, and a
/// blocking loop inside the async runtime would pin one of its workers. The
/// unbounded sender is fine to use from a plain thread.
fn spawn_input_reader(tx: mpsc::UnboundedSender<TuiEvent>) {
    std::thread::spawn(move || {
        let mut last_tick = Instant::now();
        loop {
            if event::poll(Duration::from_millis(100)).unwrap_or(false) {
                match event::read() {
                    Ok(CEvent::Key(key)) => {
                        if tx.send(TuiEvent::Key(key)).is_err() {
                            return;
                        }
                    }
                    Ok(CEvent::Paste(text)) => {
                        if tx.send(TuiEvent::Paste(text)).is_err() {
                            return;
                        }
                    }
                    Ok(CEvent::Resize(_, _)) => {
                        if tx.send(TuiEvent::Resize).is_err() {
                            return;
                        }
                    }
                    Ok(_) => {}
                    Err(_) => return,
                }
            }

            if last_tick.elapsed() >= Duration::from_millis(250) {
                if tx.send(TuiEvent::Tick).is_err() {
                    return;
                }
                last_tick = Instant::now();
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn esc_and_ctrl_c_quit() {
        assert!(is_quit_key(&KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_quit_key(&KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
    }

    #[test]
    fn plain_typing_does_not_quit() {
        assert!(!is_quit_key(&KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::NONE
        )));
        assert!(!is_quit_key(&KeyEvent::new(
            KeyCode::Char('q'),
            KeyModifiers::NONE
        )));
    }

    #[test]
    fn key_release_does_not_quit() {
        let mut release = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        release.kind = KeyEventKind::Release;
        assert!(!is_quit_key(&release));
    }
}
