//! Crossterm painter and input loop.

use std::io::{self, Write};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::style::{
    Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetBackgroundColor,
    SetForegroundColor,
};
use crossterm::terminal::{self, ClearType};
use crossterm::{cursor, execute, queue};

use crate::screen::{Body, Screen, PERMISSION_QUESTION};
use crate::session::Session;
use crate::theme::Color;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

impl From<Color> for TermColor {
    fn from(color: Color) -> Self {
        TermColor::Rgb {
            r: color.red,
            g: color.green,
            b: color.blue,
        }
    }
}

/// Raw mode + alternate screen for as long as this lives
struct TerminalGuard;

impl TerminalGuard {
    fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        if let Err(e) = execute!(io::stdout(), terminal::EnterAlternateScreen, cursor::Hide) {
            let _ = terminal::disable_raw_mode();
            return Err(e);
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = execute!(
            io::stdout(),
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Command {
    ToggleTheme,
    Answer(bool),
    Quit,
    Ignore,
}

fn command_for(key: KeyEvent, prompting: bool) -> Command {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Command::Quit,
        KeyCode::Char('q') | KeyCode::Esc => Command::Quit,
        KeyCode::Char('t') => Command::ToggleTheme,
        KeyCode::Char('y') if prompting => Command::Answer(true),
        KeyCode::Char('n') if prompting => Command::Answer(false),
        _ => Command::Ignore,
    }
}

/// Run the screen until the user quits
pub fn run(session: &mut Session) -> anyhow::Result<()> {
    let _guard = TerminalGuard::enter()?;
    let mut stdout = io::stdout();
    let mut needs_draw = true;

    loop {
        if session.poll() {
            needs_draw = true;
        }
        if needs_draw {
            draw(&mut stdout, &session.screen())?;
            needs_draw = false;
        }

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                match command_for(key, session.is_prompting()) {
                    Command::Quit => break,
                    Command::ToggleTheme => {
                        let selection = session.toggle_theme();
                        tracing::info!("Theme toggled to {:?}", selection);
                        needs_draw = true;
                    }
                    Command::Answer(granted) => {
                        needs_draw |= session.answer_permission(granted);
                    }
                    Command::Ignore => {}
                }
            }
            Event::Resize(..) => needs_draw = true,
            _ => {}
        }
    }

    Ok(())
}

/// Column at which `text` starts when centred in `width`
fn centered(width: u16, text: &str) -> u16 {
    let len = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
    width.saturating_sub(len) / 2
}

fn draw(out: &mut impl Write, screen: &Screen) -> io::Result<()> {
    let (width, height) = terminal::size()?;
    let palette = screen.palette;

    queue!(
        out,
        SetBackgroundColor(palette.surface.into()),
        terminal::Clear(ClearType::All),
    )?;

    // Header
    queue!(
        out,
        cursor::MoveTo(2, 1),
        SetForegroundColor(palette.text_accent.into()),
        SetAttribute(Attribute::Bold),
        Print(screen.header.title),
        SetAttribute(Attribute::NormalIntensity),
        cursor::MoveTo(width.saturating_sub(7), 1),
        SetBackgroundColor(palette.switcher_background.into()),
        SetForegroundColor(palette.switcher_border.into()),
        Print("( "),
        SetForegroundColor(palette.text_accent.into()),
        Print(screen.header.toggle.glyph()),
        SetForegroundColor(palette.switcher_border.into()),
        Print(" )"),
        SetBackgroundColor(palette.surface.into()),
    )?;

    let middle = height / 2;
    let hint = match &screen.body {
        Body::Weather(card) => {
            let icon = format!("(  {}  )", card.icon.glyph());
            let top = middle.saturating_sub(3);
            queue!(
                out,
                cursor::MoveTo(centered(width, &icon), top),
                SetForegroundColor(palette.icon_border.into()),
                SetBackgroundColor(palette.surface_accent.into()),
                Print(&icon),
                SetBackgroundColor(palette.surface.into()),
                cursor::MoveTo(centered(width, &card.headline), top + 2),
                SetForegroundColor(palette.text_main.into()),
                SetAttribute(Attribute::Bold),
                Print(&card.headline),
                SetAttribute(Attribute::NormalIntensity),
            )?;
            if let Some(timestamp) = &card.timestamp {
                queue!(
                    out,
                    cursor::MoveTo(centered(width, timestamp), top + 4),
                    Print(timestamp),
                )?;
            }
            "t theme   q quit"
        }
        Body::Error(message) => {
            queue!(
                out,
                cursor::MoveTo(centered(width, message), middle),
                SetForegroundColor(palette.text_error.into()),
                SetAttribute(Attribute::Bold),
                Print(message),
                SetAttribute(Attribute::NormalIntensity),
            )?;
            "t theme   q quit"
        }
        Body::PermissionPrompt => {
            queue!(
                out,
                cursor::MoveTo(centered(width, PERMISSION_QUESTION), middle),
                SetForegroundColor(palette.text_main.into()),
                Print(PERMISSION_QUESTION),
            )?;
            "y allow   n deny   t theme   q quit"
        }
        Body::Empty => "t theme   q quit",
    };

    queue!(
        out,
        cursor::MoveTo(2, height.saturating_sub(1)),
        SetForegroundColor(palette.text_main.into()),
        SetAttribute(Attribute::Dim),
        Print(hint),
        SetAttribute(Attribute::NormalIntensity),
        ResetColor,
    )?;

    out.flush()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(command_for(key(KeyCode::Char('q')), false), Command::Quit);
        assert_eq!(command_for(key(KeyCode::Esc), true), Command::Quit);
        assert_eq!(
            command_for(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), false),
            Command::Quit
        );
    }

    #[test]
    fn test_plain_c_is_ignored() {
        assert_eq!(command_for(key(KeyCode::Char('c')), false), Command::Ignore);
    }

    #[test]
    fn test_answers_only_while_prompting() {
        assert_eq!(command_for(key(KeyCode::Char('y')), true), Command::Answer(true));
        assert_eq!(command_for(key(KeyCode::Char('n')), true), Command::Answer(false));
        assert_eq!(command_for(key(KeyCode::Char('y')), false), Command::Ignore);
    }

    #[test]
    fn test_toggle_key() {
        assert_eq!(command_for(key(KeyCode::Char('t')), true), Command::ToggleTheme);
    }

    #[test]
    fn test_centered() {
        assert_eq!(centered(20, "abcd"), 8);
        assert_eq!(centered(3, "too long"), 0);
        assert_eq!(centered(10, "☀☀"), 4);
    }

    #[test]
    fn test_color_conversion() {
        let color: TermColor = Color::from_hex(0x18181B).into();
        assert_eq!(
            color,
            TermColor::Rgb {
                r: 0x18,
                g: 0x18,
                b: 0x1B
            }
        );
    }
}
