use crate::counter::SoundCue;
use crate::output::is_quiet;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::DATABASE, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().info.clone()),
        label.style(theme().dim.clone()),
        value
    );
}

pub fn section(title: &str) {
    if is_quiet() {
        return;
    }
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

/// Announce the sound cue chosen for an action
pub fn cue(cue: SoundCue) {
    if is_quiet() {
        return;
    }
    let icon = match cue {
        SoundCue::Plus => Icons::UP,
        SoundCue::Minus => Icons::DOWN,
        SoundCue::Over => Icons::STOP,
    };
    println!("{} {} {}", Icons::BELL, icon, cue.asset().style(theme().for_cue(cue)));
}
