//! Score-to-visual encoding: colour, progress-ring geometry, grouping of checks
//! and the fixed display vocabulary.

pub mod color;
pub mod group;
pub mod labels;
pub mod ring;

pub use color::{Rgb, ScoreColor, clamp_percentage, color_for_percentage};
pub use group::{CheckGroup, StatusCounts, group_by_category, status_counts};
pub use labels::LevelText;
pub use ring::{RING_RADIUS, circumference, ring_fraction, ring_offset};
