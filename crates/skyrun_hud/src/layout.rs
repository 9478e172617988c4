//! Where the HUD puts its text, in game viewport coordinates.

/// Which point of the text box sits at `pos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    LeftBaseline,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HudText {
    pub text: String,
    pub pos: [f32; 2],
    pub size: f32,
    pub anchor: TextAnchor,
}

pub const SCORE_POS: [f32; 2] = [20.0, 30.0];
pub const SCORE_SIZE: f32 = 20.0;
pub const BANNER_SIZE: f32 = 36.0;
pub const PROMPT_SIZE: f32 = 24.0;

pub fn hud_texts(
    display_score: u64,
    game_over: bool,
    viewport_width: f32,
    viewport_height: f32,
) -> Vec<HudText> {
    let mut texts = vec![HudText {
        text: format!("Score: {display_score}"),
        pos: SCORE_POS,
        size: SCORE_SIZE,
        anchor: TextAnchor::LeftBaseline,
    }];
    if game_over {
        // Roughly centred around the viewport middle, left-aligned.
        let center_x = viewport_width * 0.5;
        let center_y = viewport_height * 0.5;
        texts.push(HudText {
            text: "You fell!".to_string(),
            pos: [center_x - 80.0, center_y - 20.0],
            size: BANNER_SIZE,
            anchor: TextAnchor::LeftBaseline,
        });
        texts.push(HudText {
            text: "Press SPACE to revive".to_string(),
            pos: [center_x - 130.0, center_y + 20.0],
            size: PROMPT_SIZE,
            anchor: TextAnchor::LeftBaseline,
        });
    }
    texts
}
