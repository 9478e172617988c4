//! Platform geometry and the landing query.
//!
//! Platforms are one-way: the player only ever collides with a top surface
//! while moving down (or holding still), and passes through from below or
//! the side. Resolution is first-match in sequence order rather than
//! nearest-surface, so overlapping platforms resolve to whichever was
//! generated earlier.

/// Axis-aligned platform rectangle in world coordinates, y growing downward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Platform {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Platform {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Strict horizontal overlap with the extent `[left, left + width)`.
    pub fn overlaps_x(&self, left: f32, width: f32) -> bool {
        left + width > self.x && left < self.right()
    }

    /// Whether a feet line at `feet_y` sits inside the platform's slab,
    /// edges included.
    pub fn holds_feet(&self, feet_y: f32) -> bool {
        feet_y >= self.y && feet_y <= self.bottom()
    }
}

/// A body's horizontal extent and feet line for one landing query.
#[derive(Debug, Clone, Copy)]
pub struct FeetProbe {
    pub left: f32,
    pub width: f32,
    pub feet_y: f32,
    pub dy: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landing {
    /// Position of the platform in the scanned sequence.
    pub index: usize,
    pub surface_y: f32,
}

/// Scan `platforms` in order and return the first one the probe lands on.
pub fn find_landing<'a, I>(platforms: I, probe: FeetProbe) -> Option<Landing>
where
    I: IntoIterator<Item = &'a Platform>,
{
    if probe.dy < 0.0 {
        return None;
    }
    platforms
        .into_iter()
        .enumerate()
        .find(|(_, plat)| plat.overlaps_x(probe.left, probe.width) && plat.holds_feet(probe.feet_y))
        .map(|(index, plat)| Landing {
            index,
            surface_y: plat.y,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn probe(left: f32, feet_y: f32, dy: f32) -> FeetProbe {
        FeetProbe {
            left,
            width: 50.0,
            feet_y,
            dy,
        }
    }

    #[test]
    fn touching_edges_do_not_overlap() {
        let plat = Platform::new(100.0, 400.0, 50.0, 20.0);
        assert!(!plat.overlaps_x(50.0, 50.0), "right edge touching left edge");
        assert!(!plat.overlaps_x(150.0, 50.0), "left edge touching right edge");
        assert!(plat.overlaps_x(50.5, 50.0));
        assert!(plat.overlaps_x(149.5, 50.0));
    }

    #[test]
    fn feet_band_is_inclusive() {
        let plat = Platform::new(0.0, 400.0, 50.0, 20.0);
        assert!(plat.holds_feet(400.0));
        assert!(plat.holds_feet(420.0));
        assert!(!plat.holds_feet(399.9));
        assert!(!plat.holds_feet(420.1));
    }

    #[test]
    fn rising_body_never_lands() {
        let platforms = [Platform::new(0.0, 400.0, 200.0, 20.0)];
        assert!(find_landing(&platforms, probe(10.0, 405.0, -3.0)).is_none());
    }

    #[test]
    fn stationary_body_lands() {
        let platforms = [Platform::new(0.0, 400.0, 200.0, 20.0)];
        let landing = find_landing(&platforms, probe(10.0, 400.0, 0.0)).expect("should land");
        assert_eq!(landing.index, 0);
        assert!((landing.surface_y - 400.0).abs() < f32::EPSILON);
    }

    #[test]
    fn first_in_sequence_wins_over_nearest() {
        // The lower platform comes first, the upper one second; both bands
        // contain the feet line, and sequence order decides.
        let platforms = [
            Platform::new(0.0, 410.0, 200.0, 20.0),
            Platform::new(0.0, 400.0, 200.0, 20.0),
        ];
        let landing = find_landing(&platforms, probe(10.0, 415.0, 4.0)).expect("should land");
        assert_eq!(landing.index, 0);
        assert!((landing.surface_y - 410.0).abs() < f32::EPSILON);
    }

    #[test]
    fn skips_platforms_outside_horizontal_extent() {
        let platforms = [
            Platform::new(500.0, 400.0, 100.0, 20.0),
            Platform::new(0.0, 400.0, 100.0, 20.0),
        ];
        let landing = find_landing(&platforms, probe(20.0, 402.0, 6.0)).expect("should land");
        assert_eq!(landing.index, 1);
    }
}
