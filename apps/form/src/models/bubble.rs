use rand::Rng;
use serde::Serialize;
use uuid::Uuid;

/// One decorative background element. Carries no form data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bubble {
    pub id: Uuid,
    /// Horizontal position, percent of the visible width.
    pub x_pct: f32,
    /// Vertical position, percent of the visible height.
    pub y_pct: f32,
    pub size_px: f32,
}

/// Size range for generated bubbles. Config load checks both are finite and `0 <= min < max`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BubbleBounds {
    pub min_size_px: f32,
    pub max_size_px: f32,
}

impl Default for BubbleBounds {
    fn default() -> Self {
        Self {
            min_size_px: 10.0,
            max_size_px: 60.0,
        }
    }
}

impl Bubble {
    /// Draws a bubble uniformly over the visible area with a size inside `bounds`.
    pub fn random<R: Rng + ?Sized>(rng: &mut R, bounds: &BubbleBounds) -> Self {
        Self {
            id: Uuid::new_v4(),
            x_pct: rng.gen_range(0.0..100.0),
            y_pct: rng.gen_range(0.0..100.0),
            size_px: rng.gen_range(bounds.min_size_px..bounds.max_size_px),
        }
    }
}
