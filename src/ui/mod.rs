pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{cue, error, header, info, section, success, warn};
pub use table::{history_table, HistoryRow};
pub use theme::{theme, Theme};
