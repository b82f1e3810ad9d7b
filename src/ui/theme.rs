use owo_colors::Style;
use std::sync::OnceLock;

use crate::counter::SoundCue;

static THEME: OnceLock<Theme> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Theme {
    pub header: Style,
    pub success: Style,
    pub error: Style,
    pub warn: Style,
    pub info: Style,
    pub dim: Style,
    /// Positive changes and the plus cue
    pub plus: Style,
    /// Negative changes and the minus cue
    pub minus: Style,
    /// Counter stuck at zero
    pub over: Style,
}

impl Theme {
    pub fn detect() -> Self {
        if !console::Term::stdout().is_term() {
            return Self::plain();
        }
        Self::colored()
    }

    pub fn colored() -> Self {
        Self {
            header: Style::new().cyan().bold(),
            success: Style::new().green().bold(),
            error: Style::new().red().bold(),
            warn: Style::new().yellow().bold(),
            info: Style::new().magenta(),
            dim: Style::new().white().dimmed(),
            plus: Style::new().green(),
            minus: Style::new().yellow(),
            over: Style::new().bright_magenta().bold(),
        }
    }

    pub fn plain() -> Self {
        Self {
            header: Style::new(),
            success: Style::new(),
            error: Style::new(),
            warn: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            plus: Style::new(),
            minus: Style::new(),
            over: Style::new(),
        }
    }

    pub fn for_cue(&self, cue: SoundCue) -> Style {
        match cue {
            SoundCue::Plus => self.plus.clone(),
            SoundCue::Minus => self.minus.clone(),
            SoundCue::Over => self.over.clone(),
        }
    }

    pub fn for_change(&self, change: i64) -> Style {
        if change >= 0 { self.plus.clone() } else { self.minus.clone() }
    }
}

pub fn theme() -> &'static Theme {
    THEME.get_or_init(Theme::detect)
}
