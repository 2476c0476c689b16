//! Deterministic colour ramps for scalar rasters.

use serde::{Deserialize, Serialize};

/// Colour mapping applied to a unit-range field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    /// Single-channel greyscale.
    #[default]
    Grey,
    /// Hypsometric tint: lowland green through rock to snow.
    Terrain,
    /// White through blue, for flux and rivers.
    Water,
}

const TERRAIN_STOPS: [(f64, [u8; 3]); 5] = [
    (0.0, [38, 90, 60]),
    (0.35, [120, 160, 80]),
    (0.6, [180, 160, 110]),
    (0.8, [140, 110, 90]),
    (1.0, [250, 250, 250]),
];

const WATER_STOPS: [(f64, [u8; 3]); 3] = [
    (0.0, [245, 248, 250]),
    (0.5, [110, 170, 220]),
    (1.0, [10, 40, 120]),
];

fn ramp(stops: &[(f64, [u8; 3])], t: f64) -> [u8; 3] {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    for pair in stops.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t <= t1 {
            let f = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
            let mut out = [0u8; 3];
            for k in 0..3 {
                let v = f64::from(c0[k]) + (f64::from(c1[k]) - f64::from(c0[k])) * f;
                out[k] = v.round() as u8;
            }
            return out;
        }
    }
    stops[stops.len() - 1].1
}

impl Palette {
    /// True if this palette writes a single grey channel.
    pub fn is_grey(self) -> bool {
        self == Palette::Grey
    }

    /// RGB colour for `t` in `[0, 1]`; values outside are clamped and NaN maps to 0.
    pub fn rgb(self, t: f64) -> [u8; 3] {
        match self {
            Palette::Grey => {
                let g = unit_to_u8(t);
                [g, g, g]
            }
            Palette::Terrain => ramp(&TERRAIN_STOPS, t),
            Palette::Water => ramp(&WATER_STOPS, t),
        }
    }
}

/// Quantises `[0, 1]` to `[0, 255]`.
#[inline]
pub fn unit_to_u8(t: f64) -> u8 {
    if t.is_nan() {
        return 0;
    }
    (t.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Quantises `[0, 1]` to `[0, 65535]`.
#[inline]
pub fn unit_to_u16(t: f64) -> u16 {
    if t.is_nan() {
        return 0;
    }
    (t.clamp(0.0, 1.0) * 65535.0).round() as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_endpoints() {
        assert_eq!(Palette::Terrain.rgb(0.0), [38, 90, 60]);
        assert_eq!(Palette::Terrain.rgb(1.0), [250, 250, 250]);
        assert_eq!(Palette::Water.rgb(-3.0), [245, 248, 250]);
        assert_eq!(Palette::Water.rgb(7.0), [10, 40, 120]);
    }

    #[test]
    fn test_ramp_midpoint_interpolates() {
        // Halfway between the first two terrain stops.
        assert_eq!(Palette::Terrain.rgb(0.175), [79, 125, 70]);
    }

    #[test]
    fn test_grey_quantisation() {
        assert_eq!(unit_to_u8(0.0), 0);
        assert_eq!(unit_to_u8(1.0), 255);
        assert_eq!(unit_to_u8(0.5), 128);
        assert_eq!(unit_to_u8(f64::NAN), 0);
        assert_eq!(unit_to_u16(1.0), 65535);
        assert_eq!(Palette::Grey.rgb(1.0), [255, 255, 255]);
    }
}
