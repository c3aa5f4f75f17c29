use std::fmt;

const RED: Rgb = Rgb::new(239, 68, 68);
const AMBER: Rgb = Rgb::new(245, 158, 11);
const GREEN: Rgb = Rgb::new(16, 185, 129);

/// Per-channel amount the badge gradient's second stop is darkened by.
pub const BADGE_DARKEN: u8 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub const fn darken(self, delta: u8) -> Self {
        Self {
            r: self.r.saturating_sub(delta),
            g: self.g.saturating_sub(delta),
            b: self.b.saturating_sub(delta),
        }
    }

    fn lerp(start: Rgb, end: Rgb, t: f64) -> Self {
        Self {
            r: lerp_channel(start.r, end.r, t),
            g: lerp_channel(start.g, end.g, t),
            b: lerp_channel(start.b, end.b, t),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

fn lerp_channel(start: u8, end: u8, t: f64) -> u8 {
    let start = f64::from(start);
    let end = f64::from(end);
    (start + (end - start) * t).round().clamp(0.0, 255.0) as u8
}

/// Ring stroke colour plus the two stops of the score badge background.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreColor {
    pub ring: Rgb,
    pub badge_start: Rgb,
    pub badge_end: Rgb,
}

impl ScoreColor {
    pub fn gradient(&self) -> String {
        format!(
            "linear-gradient(135deg, {} 0%, {} 100%)",
            self.badge_start, self.badge_end
        )
    }
}

/// The one clamp every score visual goes through. NaN counts as 0.
pub fn clamp_percentage(percentage: f64) -> f64 {
    if percentage.is_nan() {
        return 0.0;
    }
    percentage.clamp(0.0, 100.0)
}

pub fn color_for_percentage(percentage: f64) -> ScoreColor {
    let p = clamp_percentage(percentage);
    let ring = if p <= 50.0 {
        Rgb::lerp(RED, AMBER, p / 50.0)
    } else {
        Rgb::lerp(AMBER, GREEN, (p - 50.0) / 50.0)
    };
    ScoreColor {
        ring,
        badge_start: ring,
        badge_end: ring.darken(BADGE_DARKEN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_colours_are_exact() {
        assert_eq!(color_for_percentage(0.0).ring, Rgb::new(239, 68, 68));
        assert_eq!(color_for_percentage(50.0).ring, Rgb::new(245, 158, 11));
        assert_eq!(color_for_percentage(100.0).ring, Rgb::new(16, 185, 129));
    }

    #[test]
    fn midpoints_round_per_channel() {
        // t = 0.5 on the first segment: 242, 113, 39.5 -> 40
        assert_eq!(color_for_percentage(25.0).ring, Rgb::new(242, 113, 40));
        // t = 0.5 on the second segment: 130.5 -> 131, 171.5 -> 172, 70
        assert_eq!(color_for_percentage(75.0).ring, Rgb::new(131, 172, 70));
    }

    #[test]
    fn out_of_range_input_is_clamped() {
        assert_eq!(color_for_percentage(-20.0), color_for_percentage(0.0));
        assert_eq!(color_for_percentage(180.0), color_for_percentage(100.0));
        assert_eq!(color_for_percentage(f64::NAN), color_for_percentage(0.0));
    }

    #[test]
    fn red_channel_rises_on_first_segment() {
        let mut prev = 0;
        for p in 0..=50 {
            let r = color_for_percentage(f64::from(p)).ring.r;
            assert!(r >= prev, "red channel dropped at {p}%");
            prev = r;
        }
    }

    #[test]
    fn badge_gradient_uses_darker_second_stop() {
        let color = color_for_percentage(100.0);
        assert_eq!(color.badge_end, Rgb::new(6, 175, 119));
        assert_eq!(
            color.gradient(),
            "linear-gradient(135deg, #10b981 0%, #06af77 100%)"
        );
    }

    #[test]
    fn darken_floors_at_zero() {
        assert_eq!(Rgb::new(5, 0, 200).darken(10), Rgb::new(0, 0, 190));
    }

    #[test]
    fn hex_is_zero_padded() {
        assert_eq!(Rgb::new(1, 2, 3).to_hex(), "#010203");
    }
}
