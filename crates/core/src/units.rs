//! Fixed-point length units used by OOXML drawing geometry.
//!
//! All shape geometry is stored in EMU (English Metric Units):
//! 914,400 per inch, 12,700 per point.

/// EMU per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// EMU per typographic point.
pub const EMU_PER_POINT: i64 = 12_700;

/// Convert inches to EMU.
pub fn emu_from_inches(inches: f64) -> i64 {
    (inches * EMU_PER_INCH as f64).round() as i64
}

/// Convert points to EMU.
pub fn emu_from_points(points: f64) -> i64 {
    (points * EMU_PER_POINT as f64).round() as i64
}

/// Convert EMU to inches.
pub fn inches_from_emu(emu: i64) -> f64 {
    emu as f64 / EMU_PER_INCH as f64
}

/// Convert EMU to points.
pub fn points_from_emu(emu: i64) -> f64 {
    emu as f64 / EMU_PER_POINT as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inch_round_trip() {
        assert_eq!(emu_from_inches(1.0), 914_400);
        assert_eq!(emu_from_inches(0.3), 274_320);
        assert!((inches_from_emu(914_400) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_point_conversion() {
        assert_eq!(emu_from_points(18.0), 228_600);
        assert!((points_from_emu(228_600) - 18.0).abs() < 1e-9);
    }
}
