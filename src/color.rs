use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RGB triple used in chart payloads
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    fn to_linear(self) -> LinSrgb {
        Srgb::new(self.0, self.1, self.2).into_format::<f32>().into_linear()
    }

    fn from_linear(c: LinSrgb) -> Self {
        let s: Srgb<f32> = Srgb::from_linear(c);
        let s: Srgb<u8> = s.into_format();
        Rgb(s.red, s.green, s.blue)
    }
}

// ---------------------------------------------------------------------------
// Fixed line palettes, light to dark
// ---------------------------------------------------------------------------

/// Reds for the diameter sweep.
pub const DIAMETER_PALETTE: [Rgb; 6] = [
    Rgb(255, 153, 154),
    Rgb(255, 102, 102),
    Rgb(255, 51, 51),
    Rgb(255, 0, 0),
    Rgb(204, 0, 0),
    Rgb(153, 0, 0),
];

/// Blues for the medium index sweep.
pub const INDEX_PALETTE: [Rgb; 6] = [
    Rgb(102, 178, 255),
    Rgb(51, 153, 255),
    Rgb(0, 128, 255),
    Rgb(0, 102, 244),
    Rgb(0, 76, 153),
    Rgb(0, 51, 102),
];

/// Colour for series `i` of `n`: the fixed palette while it lasts, then evenly
/// spaced hues.
pub fn series_color(palette: &[Rgb], i: usize, n: usize) -> Rgb {
    palette
        .get(i)
        .copied()
        .unwrap_or_else(|| generate_palette(n)[i % n.max(1)])
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb> {
    if n == 0 {
        return vec![Rgb(128, 128, 128)];
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Heatmap colour scale
// ---------------------------------------------------------------------------

/// Piecewise-linear colour scale over `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorScale {
    pub name: &'static str,
    stops: Vec<(f32, Rgb)>,
}

impl ColorScale {
    /// Plotly's `RdBu` with `reversescale`: low values blue, high values red.
    pub fn rd_bu_reversed() -> Self {
        let rd_bu = [
            (0.0, Rgb(5, 10, 172)),
            (0.35, Rgb(106, 137, 247)),
            (0.5, Rgb(190, 190, 190)),
            (0.6, Rgb(220, 170, 132)),
            (0.7, Rgb(230, 145, 90)),
            (1.0, Rgb(178, 10, 28)),
        ];
        ColorScale {
            name: "RdBu_r",
            stops: rd_bu.to_vec(),
        }
    }

    /// Colour at `t`, clamped to `[0, 1]`. NaN maps to the low end.
    pub fn sample(&self, t: f64) -> Rgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) as f32 };
        let Some(hi) = self.stops.iter().position(|&(pos, _)| pos >= t) else {
            return self.stops[self.stops.len() - 1].1;
        };
        if hi == 0 || self.stops[hi].0 == t {
            return self.stops[hi].1;
        }
        let (p0, c0) = self.stops[hi - 1];
        let (p1, c1) = self.stops[hi];
        let f = (t - p0) / (p1 - p0);
        Rgb::from_linear(c0.to_linear().mix(c1.to_linear(), f))
    }

    /// Colour for `value` normalised into `[lo, hi]`.
    pub fn map(&self, value: f64, lo: f64, hi: f64) -> Rgb {
        let span = hi - lo;
        if span.abs() < f64::EPSILON {
            return self.sample(0.5);
        }
        self.sample((value - lo) / span)
    }
}
