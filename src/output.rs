//! # Console Styling
//!
//! The progress log is plain text. Only the command's banner and summary are
//! decorated: with colour they use emoji markers and green or red status
//! text, without it bracketed tags such as `[OK]` that stay easy to grep.
//!
//! `--color auto` consults, in order: `NO_COLOR` (set disables),
//! `CLICOLOR=0` (disables), `CLICOLOR_FORCE` (non-empty, non-zero enables),
//! `TERM=dumb` (disables), and finally whether stdout is a colour terminal.
//!
//! ```
//! use multiclone::output::{ColorChoice, Console, Marker};
//!
//! let console = Console::new(ColorChoice::Never);
//! assert_eq!(console.marker(Marker::Failed), "[FAIL]");
//! ```

use std::env;

use clap::ValueEnum;
use console::style;

/// Value of `--color`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

/// The decorations the clone command prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Banner,
    Summary,
    Elapsed,
    Ok,
    Failed,
}

impl Marker {
    /// `(emoji, plain)` forms.
    fn forms(self) -> (&'static str, &'static str) {
        match self {
            Marker::Banner => ("📦", "[MULTICLONE]"),
            Marker::Summary => ("📊", "[SUMMARY]"),
            Marker::Elapsed => ("⏱️", "[TIME]"),
            Marker::Ok => ("✅", "[OK]"),
            Marker::Failed => ("❌", "[FAIL]"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Console {
    color: bool,
}

impl Console {
    pub fn new(choice: ColorChoice) -> Self {
        let color = match choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => color_from_env(|name| env::var_os(name).map(|v| v.to_string_lossy().into_owned()))
                .unwrap_or_else(|| console::Term::stdout().features().colors_supported()),
        };
        Self { color }
    }

    pub fn color(&self) -> bool {
        self.color
    }

    pub fn marker(&self, marker: Marker) -> &'static str {
        let (emoji, plain) = marker.forms();
        if self.color {
            emoji
        } else {
            plain
        }
    }

    /// `[OK]` or `[FAIL]` marker for a clone, a phase or the whole run.
    pub fn outcome(&self, ok: bool) -> &'static str {
        self.marker(if ok { Marker::Ok } else { Marker::Failed })
    }

    /// `text` in green or red, unchanged without colour.
    pub fn paint(&self, text: &str, ok: bool) -> String {
        if !self.color {
            return text.to_string();
        }
        let styled = if ok {
            style(text).green()
        } else {
            style(text).red()
        };
        styled.force_styling(true).to_string()
    }
}

/// Colour decision from the environment alone; `None` leaves it to the
/// terminal.
fn color_from_env(var: impl Fn(&str) -> Option<String>) -> Option<bool> {
    if var("NO_COLOR").is_some() {
        return Some(false);
    }
    if var("CLICOLOR").as_deref() == Some("0") {
        return Some(false);
    }
    if var("CLICOLOR_FORCE").is_some_and(|v| !v.is_empty() && v != "0") {
        return Some(true);
    }
    if var("TERM").as_deref() == Some("dumb") {
        return Some(false);
    }
    None
}
