use serde::{Deserialize, Serialize};

/// An RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#rrggbb` form.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    fn mix(&self, other: &Rgb, t: f64) -> Rgb {
        let channel = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb::new(
            channel(self.r, other.r),
            channel(self.g, other.g),
            channel(self.b, other.b),
        )
    }
}

/// Stops of the sequential Blues ramp, light to dark.
const BLUES: [Rgb; 9] = [
    Rgb::new(0xf7, 0xfb, 0xff),
    Rgb::new(0xde, 0xeb, 0xf7),
    Rgb::new(0xc6, 0xdb, 0xef),
    Rgb::new(0x9e, 0xca, 0xe1),
    Rgb::new(0x6b, 0xae, 0xd6),
    Rgb::new(0x42, 0x92, 0xc6),
    Rgb::new(0x21, 0x71, 0xb5),
    Rgb::new(0x08, 0x51, 0x9c),
    Rgb::new(0x08, 0x30, 0x6b),
];

/// Sample the Blues ramp at `t` in `[0, 1]`.
fn blues_at(t: f64) -> Rgb {
    let t = t.clamp(0.0, 1.0) * (BLUES.len() - 1) as f64;
    let i = (t.floor() as usize).min(BLUES.len() - 2);
    BLUES[i].mix(&BLUES[i + 1], t - i as f64)
}

/// Per-cluster point colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterPalette {
    colors: Vec<Rgb>,
}

impl ClusterPalette {
    /// `count` evenly spaced shades of blue.
    pub fn blues(count: usize) -> Self {
        let colors = match count {
            0 => Vec::new(),
            1 => vec![blues_at(0.5)],
            n => (0..n).map(|i| blues_at(i as f64 / (n - 1) as f64)).collect(),
        };
        Self { colors }
    }

    pub fn hex_list(&self) -> Vec<String> {
        self.colors.iter().map(Rgb::to_hex).collect()
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

impl Default for ClusterPalette {
    fn default() -> Self {
        Self::blues(8)
    }
}
