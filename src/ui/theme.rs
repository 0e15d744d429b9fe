use owo_colors::Style;
use std::sync::OnceLock;

static THEME: OnceLock<Theme> = OnceLock::new();

/// Styles for menu headings, prompts and outcome messages
#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub prompt: Style,
    pub success: Style,
    pub error: Style,
    pub warn: Style,
    pub info: Style,
    pub dim: Style,
}

impl Theme {
    /// Build the palette; with `colored` off every style is a no-op
    pub fn new(colored: bool) -> Self {
        let pick = |style: Style| if colored { style } else { Style::new() };
        Self {
            header: pick(Style::new().cyan().bold()),
            prompt: pick(Style::new().bold()),
            success: pick(Style::new().green().bold()),
            error: pick(Style::new().red().bold()),
            warn: pick(Style::new().yellow().bold()),
            info: pick(Style::new().magenta()),
            dim: pick(Style::new().bright_black()),
        }
    }

    /// Color only when stdout is a terminal and `NO_COLOR` is unset
    pub fn for_stdout() -> Self {
        let colored = console::Term::stdout().is_term() && std::env::var_os("NO_COLOR").is_none();
        Self::new(colored)
    }
}

/// Process-wide theme, detected on first use
pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::for_stdout)
}
