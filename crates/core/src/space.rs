//! Color space representations and pure conversion functions.
//!
//! All functions are total: out-of-gamut results are clamped when converted
//! back to a [`Color`], and hue is guarded against `atan2(0, 0)`.
//!
//! CIE conversions use the sRGB primaries with a D65 reference white.

use crate::color::Color;
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// D65 reference white, Y normalized to 1.
pub const D65_WHITE: Xyz = Xyz {
    x: 0.95047,
    y: 1.0,
    z: 1.08883,
};

/// CIE ε = 216/24389.
const CIE_EPSILON: f64 = 216.0 / 24389.0;
/// CIE κ = 24389/27.
const CIE_KAPPA: f64 = 24389.0 / 27.0;

/// HSL with hue in degrees [0, 360) and saturation/lightness in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

/// HSV with hue in degrees [0, 360) and saturation/value in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsv {
    pub h: f64,
    pub s: f64,
    pub v: f64,
}

/// CIE XYZ relative to a white with Y = 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Xyz {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// CIE L*a*b*. L is in [0, 100]; a and b are unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

/// Cylindrical form of [`Lab`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lch {
    pub l: f64,
    pub c: f64,
    pub h: f64,
}

/// Subtractive CMYK, each channel in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cmyk {
    pub c: f64,
    pub m: f64,
    pub y: f64,
    pub k: f64,
}

/// Names a color space a [`Color`] can be converted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpace {
    Rgb,
    Hsl,
    Hsv,
    Lab,
    Xyz,
    Cmyk,
}

impl ColorSpace {
    pub const ALL: [ColorSpace; 6] = [
        ColorSpace::Rgb,
        ColorSpace::Hsl,
        ColorSpace::Hsv,
        ColorSpace::Lab,
        ColorSpace::Xyz,
        ColorSpace::Cmyk,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColorSpace::Rgb => "rgb",
            ColorSpace::Hsl => "hsl",
            ColorSpace::Hsv => "hsv",
            ColorSpace::Lab => "lab",
            ColorSpace::Xyz => "xyz",
            ColorSpace::Cmyk => "cmyk",
        }
    }
}

impl fmt::Display for ColorSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColorSpace {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        ColorSpace::ALL
            .into_iter()
            .find(|space| space.as_str() == lower)
            .ok_or_else(|| ValidationError::InvalidOption {
                option: "space".to_string(),
                value: s.to_string(),
                expected: "rgb, hsl, hsv, lab, xyz or cmyk".to_string(),
            })
    }
}

/// A color expressed in one specific space, tagged with that space's name.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "space", rename_all = "lowercase")]
pub enum ColorSpaceValue {
    Rgb { r: u8, g: u8, b: u8 },
    Hsl(Hsl),
    Hsv(Hsv),
    Lab(Lab),
    Xyz(Xyz),
    Cmyk(Cmyk),
}

impl ColorSpaceValue {
    pub fn from_color(color: Color, target: ColorSpace) -> Self {
        match target {
            ColorSpace::Rgb => ColorSpaceValue::Rgb {
                r: color.r(),
                g: color.g(),
                b: color.b(),
            },
            ColorSpace::Hsl => ColorSpaceValue::Hsl(rgb_to_hsl(color)),
            ColorSpace::Hsv => ColorSpaceValue::Hsv(rgb_to_hsv(color)),
            ColorSpace::Lab => ColorSpaceValue::Lab(rgb_to_lab(color)),
            ColorSpace::Xyz => ColorSpaceValue::Xyz(rgb_to_xyz(color)),
            ColorSpace::Cmyk => ColorSpaceValue::Cmyk(rgb_to_cmyk(color)),
        }
    }

    /// Converts back to the canonical RGB color, clamping out-of-gamut values.
    pub fn to_color(self) -> Color {
        match self {
            ColorSpaceValue::Rgb { r, g, b } => Color::new(r, g, b),
            ColorSpaceValue::Hsl(hsl) => hsl_to_rgb(hsl),
            ColorSpaceValue::Hsv(hsv) => hsv_to_rgb(hsv),
            ColorSpaceValue::Lab(lab) => lab_to_rgb(lab),
            ColorSpaceValue::Xyz(xyz) => xyz_to_rgb(xyz),
            ColorSpaceValue::Cmyk(cmyk) => cmyk_to_rgb(cmyk),
        }
    }

    pub fn space(&self) -> ColorSpace {
        match self {
            ColorSpaceValue::Rgb { .. } => ColorSpace::Rgb,
            ColorSpaceValue::Hsl(_) => ColorSpace::Hsl,
            ColorSpaceValue::Hsv(_) => ColorSpace::Hsv,
            ColorSpaceValue::Lab(_) => ColorSpace::Lab,
            ColorSpaceValue::Xyz(_) => ColorSpace::Xyz,
            ColorSpaceValue::Cmyk(_) => ColorSpace::Cmyk,
        }
    }
}

// -- Hue helpers --

/// Normalizes a hue angle to [0, 360).
pub fn normalize_hue(h: f64) -> f64 {
    let wrapped = h.rem_euclid(360.0);
    // rem_euclid rounds tiny negatives up to exactly 360.0
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Interpolates between two hues along the shortest arc.
pub fn interpolate_hue(h0: f64, h1: f64, t: f64) -> f64 {
    normalize_hue(h0 + t * hue_delta(h0, h1))
}

/// Signed shortest-arc difference from `h0` to `h1`, in (-180, 180].
pub fn hue_delta(h0: f64, h1: f64) -> f64 {
    match (h1 - h0).rem_euclid(360.0) {
        d if d > 180.0 => d - 360.0,
        d => d,
    }
}

/// Hue from min/max chroma components, shared by HSL and HSV.
fn hue_from_rgb(r: f64, g: f64, b: f64, max: f64, delta: f64) -> f64 {
    if delta == 0.0 {
        return 0.0;
    }
    let h = if max == r {
        ((g - b) / delta).rem_euclid(6.0)
    } else if max == g {
        (b - r) / delta + 2.0
    } else {
        (r - g) / delta + 4.0
    };
    normalize_hue(h * 60.0)
}

/// Builds a color from chroma, the hue's secondary component and a lightness offset.
fn rgb_from_hue(h: f64, chroma: f64, m: f64) -> Color {
    let h = normalize_hue(h) / 60.0;
    let x = chroma * (1.0 - (h.rem_euclid(2.0) - 1.0).abs());
    let (r, g, b) = match h.floor() as u8 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };
    Color::from_unit_rgb(r + m, g + m, b + m)
}

// -- HSL / HSV --

pub fn rgb_to_hsl(color: Color) -> Hsl {
    let [r, g, b] = color.to_unit_rgb();
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let l = (max + min) / 2.0;
    let s = if delta == 0.0 {
        0.0
    } else {
        delta / (1.0 - (2.0 * l - 1.0).abs())
    };
    Hsl {
        h: hue_from_rgb(r, g, b, max, delta),
        s: s * 100.0,
        l: l * 100.0,
    }
}

/// Converts HSL to RGB. Saturation and lightness are clamped to [0, 100].
pub fn hsl_to_rgb(hsl: Hsl) -> Color {
    let s = hsl.s.clamp(0.0, 100.0) / 100.0;
    let l = hsl.l.clamp(0.0, 100.0) / 100.0;
    let chroma = (1.0 - (2.0 * l - 1.0).abs()) * s;
    rgb_from_hue(hsl.h, chroma, l - chroma / 2.0)
}

pub fn rgb_to_hsv(color: Color) -> Hsv {
    let [r, g, b] = color.to_unit_rgb();
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;
    let s = if max == 0.0 { 0.0 } else { delta / max };
    Hsv {
        h: hue_from_rgb(r, g, b, max, delta),
        s: s * 100.0,
        v: max * 100.0,
    }
}

/// Converts HSV to RGB. Saturation and value are clamped to [0, 100].
pub fn hsv_to_rgb(hsv: Hsv) -> Color {
    let s = hsv.s.clamp(0.0, 100.0) / 100.0;
    let v = hsv.v.clamp(0.0, 100.0) / 100.0;
    let chroma = v * s;
    rgb_from_hue(hsv.h, chroma, v - chroma)
}

// -- sRGB companding --

/// Inverse sRGB gamma for one channel in [0, 1].
pub fn srgb_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// sRGB gamma for one linear channel.
pub fn linear_to_srgb(c: f64) -> f64 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// The linearized channels of `color`.
pub fn to_linear_rgb(color: Color) -> [f64; 3] {
    color.to_unit_rgb().map(srgb_to_linear)
}

/// Re-encodes linear channels, clamping to [0, 1] before companding.
pub fn from_linear_rgb([r, g, b]: [f64; 3]) -> Color {
    let encode = |c: f64| linear_to_srgb(if c.is_nan() { 0.0 } else { c.clamp(0.0, 1.0) });
    Color::from_unit_rgb(encode(r), encode(g), encode(b))
}

// -- XYZ / LAB --

pub fn rgb_to_xyz(color: Color) -> Xyz {
    let [r, g, b] = to_linear_rgb(color);
    Xyz {
        x: 0.4124564 * r + 0.3575761 * g + 0.1804375 * b,
        y: 0.2126729 * r + 0.7151522 * g + 0.0721750 * b,
        z: 0.0193339 * r + 0.1191920 * g + 0.9503041 * b,
    }
}

pub fn xyz_to_rgb(xyz: Xyz) -> Color {
    let r = 3.2404542 * xyz.x - 1.5371385 * xyz.y - 0.4985314 * xyz.z;
    let g = -0.9692660 * xyz.x + 1.8760108 * xyz.y + 0.0415560 * xyz.z;
    let b = 0.0556434 * xyz.x - 0.2040259 * xyz.y + 1.0572252 * xyz.z;
    from_linear_rgb([r, g, b])
}

pub fn xyz_to_lab(xyz: Xyz) -> Lab {
    let f = |t: f64| {
        if t > CIE_EPSILON {
            t.cbrt()
        } else {
            (CIE_KAPPA * t + 16.0) / 116.0
        }
    };
    let fx = f(xyz.x / D65_WHITE.x);
    let fy = f(xyz.y / D65_WHITE.y);
    let fz = f(xyz.z / D65_WHITE.z);
    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

pub fn lab_to_xyz(lab: Lab) -> Xyz {
    let fy = (lab.l + 16.0) / 116.0;
    let fx = fy + lab.a / 500.0;
    let fz = fy - lab.b / 200.0;
    let finv = |f: f64| {
        let cube = f * f * f;
        if cube > CIE_EPSILON {
            cube
        } else {
            (116.0 * f - 16.0) / CIE_KAPPA
        }
    };
    let yr = if lab.l > CIE_KAPPA * CIE_EPSILON {
        fy * fy * fy
    } else {
        lab.l / CIE_KAPPA
    };
    Xyz {
        x: finv(fx) * D65_WHITE.x,
        y: yr * D65_WHITE.y,
        z: finv(fz) * D65_WHITE.z,
    }
}

pub fn rgb_to_lab(color: Color) -> Lab {
    xyz_to_lab(rgb_to_xyz(color))
}

/// Converts LAB to RGB, clamping out-of-gamut results.
pub fn lab_to_rgb(lab: Lab) -> Color {
    xyz_to_rgb(lab_to_xyz(lab))
}

/// Converts LAB to LCh.
///
/// NaN guard: below a chroma of 1e-10 the hue is set to 0.0 instead of the
/// indeterminate `atan2(0, 0)`.
pub fn lab_to_lch(lab: Lab) -> Lch {
    let c = (lab.a * lab.a + lab.b * lab.b).sqrt();
    let h = if c < 1e-10 {
        0.0
    } else {
        normalize_hue(lab.b.atan2(lab.a).to_degrees())
    };
    Lch { l: lab.l, c, h }
}

pub fn lch_to_lab(lch: Lch) -> Lab {
    let h = lch.h.to_radians();
    Lab {
        l: lch.l,
        a: lch.c * h.cos(),
        b: lch.c * h.sin(),
    }
}

// -- CMYK --

pub fn rgb_to_cmyk(color: Color) -> Cmyk {
    let [r, g, b] = color.to_unit_rgb();
    let k = 1.0 - r.max(g).max(b);
    if k >= 1.0 {
        return Cmyk {
            c: 0.0,
            m: 0.0,
            y: 0.0,
            k: 1.0,
        };
    }
    let scale = 1.0 - k;
    Cmyk {
        c: (1.0 - r - k) / scale,
        m: (1.0 - g - k) / scale,
        y: (1.0 - b - k) / scale,
        k,
    }
}

pub fn cmyk_to_rgb(cmyk: Cmyk) -> Color {
    let ink = |v: f64| v.clamp(0.0, 1.0);
    let white = 1.0 - ink(cmyk.k);
    Color::from_unit_rgb(
        (1.0 - ink(cmyk.c)) * white,
        (1.0 - ink(cmyk.m)) * white,
        (1.0 - ink(cmyk.y)) * white,
    )
}
