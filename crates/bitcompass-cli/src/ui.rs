use std::io::IsTerminal;
use std::sync::OnceLock;

use crate::cli::{ColorMode, GlobalFlags, OutputFormat};

#[derive(Clone, Copy, Debug)]
pub struct UiPrefs {
    /// ANSI colors on stdout (text output only).
    pub color: bool,
    /// ANSI colors on stderr (error and warning lines).
    pub stderr_color: bool,
    pub progress: bool,
    pub term_width: Option<usize>,
}

/// Foreground colors used by the text renderers.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Tone {
    Green,
    Yellow,
    Red,
    Cyan,
    Dim,
}

impl Tone {
    const fn code(self) -> &'static str {
        match self {
            Self::Green => "32",
            Self::Yellow => "33",
            Self::Red => "31",
            Self::Cyan => "36",
            Self::Dim => "2",
        }
    }
}

static UI_PREFS: OnceLock<UiPrefs> = OnceLock::new();

pub fn init(flags: &GlobalFlags) {
    let _ = UI_PREFS.set(resolve(
        flags,
        std::io::stdout().is_terminal(),
        std::io::stderr().is_terminal(),
        std::env::var_os("NO_COLOR").is_some(),
    ));
}

fn resolve(flags: &GlobalFlags, stdout_tty: bool, stderr_tty: bool, no_color: bool) -> UiPrefs {
    let text = flags.format == OutputFormat::Text;
    let (color, stderr_color) = match flags.color {
        ColorMode::Always => (text, true),
        ColorMode::Never => (false, false),
        ColorMode::Auto => (
            stdout_tty && text && !no_color,
            stderr_tty && !no_color,
        ),
    };

    let term_width = std::env::var("COLUMNS")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|width| *width >= 40);

    UiPrefs {
        color,
        stderr_color,
        progress: stderr_tty && !flags.quiet && text,
        term_width,
    }
}

#[must_use]
pub fn prefs() -> UiPrefs {
    *UI_PREFS.get().unwrap_or(&UiPrefs {
        color: false,
        stderr_color: false,
        progress: false,
        term_width: None,
    })
}

/// Wrap `text` in an ANSI color when stdout colors are enabled.
#[must_use]
pub fn paint(tone: Tone, text: &str) -> String {
    paint_if(prefs().color, tone, text)
}

#[must_use]
pub fn paint_if(enabled: bool, tone: Tone, text: &str) -> String {
    if enabled {
        format!("\u{1b}[{}m{text}\u{1b}[0m", tone.code())
    } else {
        text.to_string()
    }
}

/// Print `bitcompass error: ...` on stderr.
pub fn error(message: &str) {
    let prefix = paint_if(prefs().stderr_color, Tone::Red, "bitcompass error:");
    eprintln!("{prefix} {message}");
}
