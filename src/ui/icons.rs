pub struct Icons;

impl Icons {
    pub const CHECK: &str = "✅";
    pub const CROSS: &str = "❌";
    pub const WARN: &str = "⚠️";
    pub const INFO: &str = "ℹ️";
    pub const DATABASE: &str = "🗄️";
    pub const CLOCK: &str = "⏱️";
    pub const UP: &str = "⬆️";
    pub const DOWN: &str = "⬇️";
    pub const BELL: &str = "🔔";
    pub const STOP: &str = "🛑";
}
