//! Group-wise font scaling policy.
//!
//! Shapes on one slide that share base font size, alignment, and font
//! family form a scaling group and receive one shared reduction ratio,
//! so visually matched shapes (a title/subtitle pair, a row of boxes)
//! scale in lockstep instead of drifting apart.

use slideglot_core::Alignment;

/// Minimum readable font size; the applied size never goes below this.
pub const MIN_FONT_SIZE_PT: f32 = 12.0;

/// Policy anchors mapping visual length ratio to font reduction.
/// Ratios below the first anchor blend toward no reduction; ratios
/// beyond the last decay at -0.01 per unit, floored at the last value.
const RATIO_ANCHORS: &[(f64, f64)] = &[
    (1.0, 1.0),
    (1.2, 0.95),
    (1.5, 0.85),
    (2.0, 0.80),
    (2.5, 0.70),
    (3.0, 0.60),
    (4.0, 0.50),
];

/// Slope of the decay past the last anchor.
const BEYOND_ANCHOR_SLOPE: f64 = -0.01;

/// Hard floor for the reduction ratio.
const MIN_REDUCTION: f64 = 0.50;

/// A single pathological string must not drag the whole group down:
/// the group maximum is clamped when it exceeds this absolute cap...
const OUTLIER_ABS_CAP: f64 = 2.5;

/// ...and this multiple of the group median, both at once.
const OUTLIER_MEDIAN_FACTOR: f64 = 1.5;

/// Identity of a scaling group within one slide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    /// Base font size in centipoints (f32 sizes are not hashable).
    pub size_centi_pt: i32,
    pub alignment: Alignment,
    pub font: String,
}

impl GroupKey {
    pub fn new(size_pt: f32, alignment: Alignment, font: impl Into<String>) -> Self {
        Self {
            size_centi_pt: (size_pt * 100.0).round() as i32,
            alignment,
            font: font.into(),
        }
    }

    pub fn size_pt(&self) -> f32 {
        self.size_centi_pt as f32 / 100.0
    }
}

/// Map a visual length ratio to a font-size reduction ratio via
/// linear interpolation over the fixed anchor table.
pub fn reduction_ratio(length_ratio: f64) -> f64 {
    if !length_ratio.is_finite() || length_ratio <= 1.0 {
        return 1.0;
    }

    for window in RATIO_ANCHORS.windows(2) {
        let (r1, red1) = window[0];
        let (r2, red2) = window[1];
        if length_ratio <= r2 {
            return red1 + (red2 - red1) * (length_ratio - r1) / (r2 - r1);
        }
    }

    // Past the last anchor: slow linear decay, floored.
    let (last_ratio, last_reduction) = RATIO_ANCHORS[RATIO_ANCHORS.len() - 1];
    let decayed = last_reduction + BEYOND_ANCHOR_SLOPE * (length_ratio - last_ratio);
    decayed.max(MIN_REDUCTION)
}

/// The ratio one group scales against, with outlier suppression: the
/// group maximum is clamped to `min(median*1.5, 2.5)` when it exceeds
/// both 2.5 and 1.5x the median.
pub fn effective_group_ratio(ratios: &[f64]) -> f64 {
    if ratios.is_empty() {
        return 1.0;
    }

    let max = ratios.iter().copied().fold(f64::MIN, f64::max);
    let median = median(ratios);

    if max > OUTLIER_ABS_CAP && max > median * OUTLIER_MEDIAN_FACTOR {
        let clamped = (median * OUTLIER_MEDIAN_FACTOR).min(OUTLIER_ABS_CAP);
        log::info!(
            "Outlier ratio suppressed (max={max:.2}, median={median:.2}) -> {clamped:.2}"
        );
        clamped
    } else {
        max
    }
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Final font size for a group member: the reduced size, floored at
/// the minimum readable size.
pub fn apply_reduction(base_size_pt: f32, reduction: f64, floor_pt: f32) -> f32 {
    (base_size_pt as f64 * reduction).max(floor_pt as f64) as f32
}
