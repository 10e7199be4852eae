//! Perceptual metrics: luminance, contrast ratio, color difference.

use crate::color::Color;
use crate::space::{self, Lab};
use serde::{Deserialize, Serialize};

/// Minimum W3C brightness difference (0..255 scale) for visible text.
pub const BRIGHTNESS_DIFFERENCE_THRESHOLD: f64 = 125.0;
/// Minimum W3C color difference (sum of channel deltas) for visible text.
pub const COLOR_DIFFERENCE_THRESHOLD: u32 = 500;

/// Perceived brightness above which a color counts as light.
const LIGHT_THRESHOLD: f64 = 0.6;
/// Perceived brightness below which a color counts as dark.
const DARK_THRESHOLD: f64 = 0.4;

/// WCAG relative luminance in [0, 1]: BT.709 weights on linearized channels.
pub fn relative_luminance(color: Color) -> f64 {
    let [r, g, b] = space::to_linear_rgb(color);
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// WCAG contrast ratio in [1, 21]. Argument order does not matter.
pub fn contrast_ratio(a: Color, b: Color) -> f64 {
    let la = relative_luminance(a);
    let lb = relative_luminance(b);
    let (lighter, darker) = if la >= lb { (la, lb) } else { (lb, la) };
    (lighter + 0.05) / (darker + 0.05)
}

/// CIEDE2000 difference between two colors.
///
/// The pair is put in a canonical order before computing, so
/// `perceptual_distance(a, b)` and `perceptual_distance(b, a)` are bit-identical.
pub fn perceptual_distance(a: Color, b: Color) -> f64 {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    ciede2000(first.to_lab(), second.to_lab())
}

/// CIEDE2000 color difference (Sharma, Wu & Dalal 2005) with kL = kC = kH = 1.
pub fn ciede2000(lab1: Lab, lab2: Lab) -> f64 {
    const POW25_7: f64 = 6_103_515_625.0; // 25^7

    let c1 = lab1.a.hypot(lab1.b);
    let c2 = lab2.a.hypot(lab2.b);
    let avg_c = 0.5 * (c1 + c2);
    let avg_c7 = avg_c.powi(7);
    let g = 0.5 * (1.0 - (avg_c7 / (avg_c7 + POW25_7)).sqrt());

    let a1p = (1.0 + g) * lab1.a;
    let a2p = (1.0 + g) * lab2.a;
    let c1p = a1p.hypot(lab1.b);
    let c2p = a2p.hypot(lab2.b);
    let h1p = prime_hue(lab1.b, a1p);
    let h2p = prime_hue(lab2.b, a2p);
    let chroma_product = c1p * c2p;

    let delta_lp = lab2.l - lab1.l;
    let delta_cp = c2p - c1p;
    let delta_hp = if chroma_product == 0.0 {
        0.0
    } else {
        match h2p - h1p {
            d if d > 180.0 => d - 360.0,
            d if d < -180.0 => d + 360.0,
            d => d,
        }
    };
    let delta_big_hp = 2.0 * chroma_product.sqrt() * (delta_hp.to_radians() / 2.0).sin();

    let avg_lp = 0.5 * (lab1.l + lab2.l);
    let avg_cp = 0.5 * (c1p + c2p);
    let avg_hp = if chroma_product == 0.0 {
        h1p + h2p
    } else if (h1p - h2p).abs() <= 180.0 {
        0.5 * (h1p + h2p)
    } else if h1p + h2p < 360.0 {
        0.5 * (h1p + h2p + 360.0)
    } else {
        0.5 * (h1p + h2p - 360.0)
    };

    let t = 1.0 - 0.17 * (avg_hp - 30.0).to_radians().cos()
        + 0.24 * (2.0 * avg_hp).to_radians().cos()
        + 0.32 * (3.0 * avg_hp + 6.0).to_radians().cos()
        - 0.20 * (4.0 * avg_hp - 63.0).to_radians().cos();
    let delta_theta = 30.0 * (-((avg_hp - 275.0) / 25.0).powi(2)).exp();
    let avg_cp7 = avg_cp.powi(7);
    let rc = 2.0 * (avg_cp7 / (avg_cp7 + POW25_7)).sqrt();
    let lp50 = (avg_lp - 50.0).powi(2);
    let sl = 1.0 + 0.015 * lp50 / (20.0 + lp50).sqrt();
    let sc = 1.0 + 0.045 * avg_cp;
    let sh = 1.0 + 0.015 * avg_cp * t;
    let rt = -(2.0 * delta_theta).to_radians().sin() * rc;

    let dl = delta_lp / sl;
    let dc = delta_cp / sc;
    let dh = delta_big_hp / sh;
    (dl * dl + dc * dc + dh * dh + rt * dc * dh).max(0.0).sqrt()
}

fn prime_hue(b: f64, a_prime: f64) -> f64 {
    if b == 0.0 && a_prime == 0.0 {
        0.0
    } else {
        space::normalize_hue(b.atan2(a_prime).to_degrees())
    }
}

/// Euclidean distance in LAB (CIE76).
pub fn cie76_distance(a: Color, b: Color) -> f64 {
    let (la, lb) = (a.to_lab(), b.to_lab());
    ((la.l - lb.l).powi(2) + (la.a - lb.a).powi(2) + (la.b - lb.b).powi(2)).sqrt()
}

/// Perceived brightness in [0, 1] using the 0.299/0.587/0.114 weights.
pub fn brightness(color: Color) -> f64 {
    let [r, g, b] = color.to_unit_rgb();
    0.299 * r + 0.587 * g + 0.114 * b
}

/// W3C brightness difference on the 0..255 scale.
pub fn brightness_difference(a: Color, b: Color) -> f64 {
    (brightness(a) - brightness(b)).abs() * 255.0
}

/// W3C color difference: sum of absolute channel differences, 0..=765.
pub fn color_difference(a: Color, b: Color) -> u32 {
    a.rgb()
        .iter()
        .zip(b.rgb().iter())
        .map(|(x, y)| u32::from(x.abs_diff(*y)))
        .sum()
}

/// Whether a pair clears both W3C visibility heuristics.
pub fn has_sufficient_visibility(a: Color, b: Color) -> bool {
    brightness_difference(a, b) >= BRIGHTNESS_DIFFERENCE_THRESHOLD
        && color_difference(a, b) >= COLOR_DIFFERENCE_THRESHOLD
}

/// Smallest CIEDE2000 distance over all pairs, or `None` with fewer than two colors.
pub fn min_pairwise_distance(colors: &[Color]) -> Option<f64> {
    pairwise_distances(colors).reduce(f64::min)
}

/// Mean pairwise CIEDE2000 distance scaled by 1/100 and clamped to [0, 1].
///
/// Fewer than two colors score 1.0: nothing can be confused.
pub fn distinctiveness_score(colors: &[Color]) -> f64 {
    let (sum, count) = pairwise_distances(colors).fold((0.0, 0usize), |(s, n), d| (s + d, n + 1));
    if count == 0 {
        return 1.0;
    }
    (sum / count as f64 / 100.0).clamp(0.0, 1.0)
}

fn pairwise_distances(colors: &[Color]) -> impl Iterator<Item = f64> + '_ {
    colors.iter().enumerate().flat_map(move |(i, &a)| {
        colors[i + 1..]
            .iter()
            .map(move |&b| perceptual_distance(a, b))
    })
}

/// Light/dark distribution of a set of colors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceMetrics {
    /// Mean perceived brightness in [0, 1].
    pub average_brightness: f64,
    /// Mean HSL saturation in [0, 1].
    pub average_saturation: f64,
    pub light_count: usize,
    pub dark_count: usize,
    /// 1.0 when the mean brightness sits at mid-gray, falling to 0.0 at black or white.
    pub balance_score: f64,
}

/// Computes [`BalanceMetrics`]; an empty slice is perfectly balanced mid-gray.
pub fn balance(colors: &[Color]) -> BalanceMetrics {
    if colors.is_empty() {
        return BalanceMetrics {
            average_brightness: 0.5,
            average_saturation: 0.0,
            light_count: 0,
            dark_count: 0,
            balance_score: 1.0,
        };
    }
    let n = colors.len() as f64;
    let levels: Vec<f64> = colors.iter().copied().map(brightness).collect();
    let average_brightness = levels.iter().sum::<f64>() / n;
    let average_saturation = colors.iter().map(|c| c.to_hsl().s / 100.0).sum::<f64>() / n;
    BalanceMetrics {
        average_brightness,
        average_saturation,
        light_count: levels.iter().filter(|&&b| b > LIGHT_THRESHOLD).count(),
        dark_count: levels.iter().filter(|&&b| b < DARK_THRESHOLD).count(),
        balance_score: (1.0 - (average_brightness - 0.5).abs() * 2.0).clamp(0.0, 1.0),
    }
}
