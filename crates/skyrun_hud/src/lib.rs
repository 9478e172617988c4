pub mod hud;
pub mod layout;

pub use hud::{Hud, HudStats};
pub use layout::{hud_texts, HudText, TextAnchor};
