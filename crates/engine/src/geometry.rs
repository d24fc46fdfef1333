//! Adaptive box expansion and collision detection.
//!
//! After translation and font scaling, an overcrowded shape may
//! widen, but only in the direction its alignment allows, never past the
//! slide margins, and never into a neighboring shape. Expansion is
//! best-effort, first acceptable solution: one candidate box, one
//! collision check, no nudging and no backtracking. A blocked
//! expansion falls back to word wrap.

use slideglot_core::units::emu_from_inches;
use slideglot_core::{Alignment, Rect, Shape};

/// How far a box may grow relative to its current width.
pub const WIDTH_EXPANSION_LIMIT: f64 = 1.15;

/// Slide edge margin that is always preserved (0.3 in).
pub fn edge_margin() -> i64 {
    emu_from_inches(0.3)
}

/// Slack for the directional neighbor filter (0.01 in).
fn directional_epsilon() -> i64 {
    emu_from_inches(0.01)
}

/// A shape's placement on its slide, for geometry computation only.
/// Always rebuilt from current shape state; never cached across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutBox {
    pub left: i64,
    pub top: i64,
    pub width: i64,
    pub height: i64,
    pub shape_id: u32,
}

impl LayoutBox {
    pub fn from_shape(shape: &Shape) -> Self {
        Self {
            left: shape.frame.left,
            top: shape.frame.top,
            width: shape.frame.width,
            height: shape.frame.height,
            shape_id: shape.id,
        }
    }

    pub fn right(&self) -> i64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> i64 {
        self.top + self.height
    }
}

/// Axis-aligned overlap test with a symmetric margin around both
/// boxes. With a zero margin, touching edges do NOT count as overlap.
pub fn overlaps(a: &LayoutBox, b: &LayoutBox, margin: i64) -> bool {
    let separated = a.right() + margin <= b.left - margin
        || b.right() + margin <= a.left - margin
        || a.bottom() + margin <= b.top - margin
        || b.bottom() + margin <= a.top - margin;
    !separated
}

/// A successful expansion: the new horizontal placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expansion {
    pub left: i64,
    pub width: i64,
}

/// Try to widen `shape_box` according to its alignment.
///
/// Left-aligned shapes grow rightward, right-aligned leftward,
/// centered symmetrically around their current center bounded by the
/// smaller half-space. Justified text keeps the left-aligned behavior.
/// Returns `None` when there is no room to grow or any non-excluded
/// neighbor overlaps the candidate box. A centered shape blocked on
/// one side only abandons expansion rather than shifting its center.
pub fn try_expand(
    shape_box: &LayoutBox,
    alignment: Alignment,
    slide_width: i64,
    neighbors: &[LayoutBox],
) -> Option<Expansion> {
    let margin = edge_margin();
    let old_left = shape_box.left;
    let old_width = shape_box.width;
    let old_right = shape_box.right();

    let max_possible_width = match alignment {
        Alignment::Left | Alignment::Justify => slide_width - margin - old_left,
        Alignment::Right => old_right - margin,
        Alignment::Center => {
            let center = old_left + old_width / 2;
            let left_space = center - margin;
            let right_space = (slide_width - margin) - center;
            left_space.min(right_space) * 2
        }
    };
    if max_possible_width <= old_width {
        return None;
    }

    let target_width =
        ((old_width as f64 * WIDTH_EXPANSION_LIMIT).min(max_possible_width as f64)) as i64;
    if target_width <= old_width {
        return None;
    }

    let new_left = match alignment {
        Alignment::Left | Alignment::Justify => old_left,
        Alignment::Right => old_right - target_width,
        Alignment::Center => old_left + old_width / 2 - target_width / 2,
    };

    let candidate = LayoutBox {
        left: new_left,
        top: shape_box.top,
        width: target_width,
        height: shape_box.height,
        shape_id: shape_box.shape_id,
    };

    let epsilon = directional_epsilon();
    for neighbor in neighbors {
        if neighbor.shape_id == shape_box.shape_id {
            continue;
        }

        // Directional filter: ignore neighbors entirely on the side
        // the shape is not growing toward.
        match alignment {
            Alignment::Left | Alignment::Justify => {
                if neighbor.right() <= old_right + epsilon {
                    continue;
                }
            }
            Alignment::Right => {
                if neighbor.left >= old_left - epsilon {
                    continue;
                }
            }
            Alignment::Center => {}
        }

        if overlaps(&candidate, neighbor, 0) {
            log::debug!(
                "Expansion of shape {} blocked by shape {}",
                shape_box.shape_id,
                neighbor.shape_id
            );
            return None;
        }
    }

    Some(Expansion {
        left: new_left,
        width: target_width,
    })
}

/// Convenience: the rectangle an expansion produces for a shape.
pub fn apply_expansion(frame: &mut Rect, expansion: Expansion) {
    frame.left = expansion.left;
    frame.width = expansion.width;
}
