//! Color specification normalization.
//!
//! Callers spell colors however suits them: a name (`"cornflowerblue"`),
//! a function-style scheme (`"rgb(100,149,237)"`, `"hsla(...)"`), or a
//! bare hex run. The renderer only understands one form, so everything
//! funnels through [`normalize_color`] down to a canonical 4-channel
//! RGBA value. Normalization is pure and deterministic: equal colors in
//! the same syntax always produce identical bytes.
//!
//! Resolution order is fixed with no fallthrough between branches:
//! named table, then scheme grammar, then hex run. A spec that matches
//! a scheme with the wrong channel count is a hard error, not a
//! candidate for the next branch.

mod named;

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use smallvec::SmallVec;

use crate::error::Error;

/// Scheme bases of the function-style grammar; each also exists with a
/// trailing `a` that consumes one extra alpha channel.
const SCHEME_BASES: [&str; 5] = ["rgb", "gray", "hsb", "hsl", "cmyk"];

static SCHEME_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(rgb|gray|hsb|hsl|cmyk)(a)?\s*\(\s*([^()]*?)\s*\)$").unwrap()
});

static HEX_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        "^(?:",
        "[0-9a-fA-F]{3}|[0-9a-fA-F]{4}|[0-9a-fA-F]{6}|",
        "[0-9a-fA-F]{8}|[0-9a-fA-F]{12}|[0-9a-fA-F]{16}",
        ")$",
    ))
    .unwrap()
});

static CHANNEL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)?%?$").unwrap());

static ALPHA: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(?:\.\d+)?$").unwrap());

/// A normalized color: four bytes, one per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CanonicalColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl CanonicalColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// The 8-character lowercase `rrggbbaa` form the wire format carries.
    pub fn to_hex(self) -> String {
        format!("{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
    }
}

impl fmt::Display for CanonicalColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}{:02x}{:02x}{:02x}",
            self.r, self.g, self.b, self.a
        )
    }
}

/// Normalizes a color specification to its canonical RGBA form.
pub fn normalize_color(spec: &str) -> Result<CanonicalColor, Error> {
    if let Some([r, g, b]) = named::lookup(spec) {
        return Ok(CanonicalColor::new(r, g, b, 0xff));
    }
    if let Some(captures) = SCHEME_COLOR.captures(spec) {
        return parse_scheme(spec, &captures);
    }
    if HEX_COLOR.is_match(spec) {
        return parse_hex_run(spec);
    }
    Err(invalid(spec))
}

/// Readline-style completion over color names and scheme prefixes.
pub fn complete_color(prefix: &str) -> Vec<String> {
    let mut completions: Vec<String> = named::NAMED_COLORS
        .iter()
        .map(|(name, _)| *name)
        .filter(|name| name.starts_with(prefix))
        .map(String::from)
        .collect();
    for base in SCHEME_BASES {
        for scheme in [base.to_string(), format!("{base}a")] {
            if scheme.starts_with(prefix) {
                completions.push(format!("{scheme}("));
            }
        }
    }
    completions
}

fn invalid(spec: &str) -> Error {
    Error::InvalidColorSpec(spec.to_owned())
}

/// A single parsed channel token. Bare tokens are integers in 0-255;
/// percentages may be fractional.
#[derive(Clone, Copy)]
enum Channel {
    Percent(f64),
    Scalar(u8),
}

impl Channel {
    fn parse(token: &str, spec: &str) -> Result<Self, Error> {
        if !CHANNEL.is_match(token) {
            return Err(invalid(spec));
        }
        if let Some(number) = token.strip_suffix('%') {
            let value: f64 = number.parse().map_err(|_| invalid(spec))?;
            if value > 100.0 {
                return Err(invalid(spec));
            }
            Ok(Self::Percent(value))
        } else {
            // Fractions are only expressible as percentages.
            let value: u8 = token.parse().map_err(|_| invalid(spec))?;
            Ok(Self::Scalar(value))
        }
    }

    /// Channel as a byte, for the rgb-direct path.
    fn as_byte(self) -> u8 {
        match self {
            Self::Percent(value) => (value * 255.0 / 100.0).round() as u8,
            Self::Scalar(value) => value,
        }
    }

    /// Channel scaled into 0-1, for the converting paths.
    fn as_unit(self) -> f64 {
        match self {
            Self::Percent(value) => value / 100.0,
            Self::Scalar(value) => f64::from(value) / 255.0,
        }
    }
}

fn parse_scheme(spec: &str, captures: &regex::Captures<'_>) -> Result<CanonicalColor, Error> {
    let scheme = &captures[1];
    let has_alpha = captures.get(2).is_some();
    let tokens: SmallVec<[&str; 5]> = captures[3].split(',').map(str::trim).collect();

    let (channel_tokens, alpha) = if has_alpha {
        let (last, rest) = tokens.split_last().ok_or_else(|| invalid(spec))?;
        (rest, parse_alpha(last, spec)?)
    } else {
        (&tokens[..], 0xff)
    };

    let mut channels: SmallVec<[Channel; 4]> = SmallVec::new();
    for token in channel_tokens {
        channels.push(Channel::parse(token, spec)?);
    }

    let [r, g, b] = match (scheme, channels.as_slice()) {
        ("rgb", [r, g, b]) => [r.as_byte(), g.as_byte(), b.as_byte()],
        ("gray", [i]) => {
            let gray = unit_to_byte(i.as_unit());
            [gray; 3]
        }
        ("hsb", [h, s, v]) => {
            let (r, g, b) = hsv_to_rgb(h.as_unit(), s.as_unit(), v.as_unit());
            [unit_to_byte(r), unit_to_byte(g), unit_to_byte(b)]
        }
        // hsl(...) channels arrive as H,S,L; the converter takes
        // H,L,S order.
        ("hsl", [h, s, l]) => {
            let (r, g, b) = hls_to_rgb(h.as_unit(), l.as_unit(), s.as_unit());
            [unit_to_byte(r), unit_to_byte(g), unit_to_byte(b)]
        }
        ("cmyk", [c, m, y, k]) => {
            let k = k.as_unit();
            [c, m, y].map(|channel| unit_to_byte((1.0 - k) * (1.0 - channel.as_unit())))
        }
        // Matched scheme, wrong channel count: hard error.
        _ => return Err(invalid(spec)),
    };

    Ok(CanonicalColor::new(r, g, b, alpha))
}

fn parse_alpha(token: &str, spec: &str) -> Result<u8, Error> {
    if !ALPHA.is_match(token) {
        return Err(invalid(spec));
    }
    let value: f64 = token.parse().map_err(|_| invalid(spec))?;
    if value > 1.0 {
        return Err(invalid(spec));
    }
    Ok(unit_to_byte(value))
}

fn unit_to_byte(value: f64) -> u8 {
    (value * 255.0).round() as u8
}

/// Standard HSV to RGB, all components in 0-1.
fn hsv_to_rgb(h: f64, s: f64, v: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (v, v, v);
    }
    let sector = (h * 6.0).floor();
    let f = h * 6.0 - sector;
    let p = v * (1.0 - s);
    let q = v * (1.0 - s * f);
    let t = v * (1.0 - s * (1.0 - f));
    match (sector as i64).rem_euclid(6) {
        0 => (v, t, p),
        1 => (q, v, p),
        2 => (p, v, t),
        3 => (p, q, v),
        4 => (v, p, q),
        _ => (t, p, q),
    }
}

/// Standard HLS to RGB, all components in 0-1. Note the argument order:
/// hue, lightness, saturation.
fn hls_to_rgb(h: f64, l: f64, s: f64) -> (f64, f64, f64) {
    const ONE_THIRD: f64 = 1.0 / 3.0;
    if s == 0.0 {
        return (l, l, l);
    }
    let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let m1 = 2.0 * l - m2;
    (
        hls_component(m1, m2, h + ONE_THIRD),
        hls_component(m1, m2, h),
        hls_component(m1, m2, h - ONE_THIRD),
    )
}

fn hls_component(m1: f64, m2: f64, hue: f64) -> f64 {
    const ONE_SIXTH: f64 = 1.0 / 6.0;
    const TWO_THIRDS: f64 = 2.0 / 3.0;
    let hue = hue.rem_euclid(1.0);
    if hue < ONE_SIXTH {
        m1 + (m2 - m1) * hue * 6.0
    } else if hue < 0.5 {
        m2
    } else if hue < TWO_THIRDS {
        m1 + (m2 - m1) * (TWO_THIRDS - hue) * 6.0
    } else {
        m1
    }
}

fn parse_hex_run(run: &str) -> Result<CanonicalColor, Error> {
    let byte = |start: usize| -> Result<u8, Error> {
        u8::from_str_radix(&run[start..start + 2], 16).map_err(|_| invalid(run))
    };
    // A single digit stands for the doubled pair: f means ff.
    let doubled = |index: usize| -> Result<u8, Error> {
        let digit =
            u8::from_str_radix(&run[index..index + 1], 16).map_err(|_| invalid(run))?;
        Ok(digit * 0x11)
    };

    match run.len() {
        3 => Ok(CanonicalColor::new(
            doubled(0)?,
            doubled(1)?,
            doubled(2)?,
            0xff,
        )),
        4 => Ok(CanonicalColor::new(
            doubled(0)?,
            doubled(1)?,
            doubled(2)?,
            doubled(3)?,
        )),
        6 => Ok(CanonicalColor::new(byte(0)?, byte(2)?, byte(4)?, 0xff)),
        8 => Ok(CanonicalColor::new(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
        // Wide runs keep only the high-order byte of each channel; this
        // drops precision by design, so distinct high-depth inputs may
        // normalize to the same bytes.
        12 => Ok(CanonicalColor::new(byte(0)?, byte(4)?, byte(8)?, 0xff)),
        16 => Ok(CanonicalColor::new(byte(0)?, byte(4)?, byte(8)?, byte(12)?)),
        _ => Err(invalid(run)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(spec: &str) -> String {
        normalize_color(spec).unwrap().to_hex()
    }

    #[test]
    fn equal_colors_normalize_identically() {
        assert_eq!(hex("red"), "ff0000ff");
        assert_eq!(hex("rgb(255,0,0)"), "ff0000ff");
        assert_eq!(hex("ff0000"), "ff0000ff");
        assert_eq!(hex("ff0000ff"), "ff0000ff");
        assert_eq!(hex("f00"), "ff0000ff");
    }

    #[test]
    fn the_arial_example_colors() {
        assert_eq!(hex("white"), "ffffffff");
        assert_eq!(hex("black"), "000000ff");
    }

    #[test]
    fn percentages_scale_by_2_55() {
        // 50% is exactly 127.5, which must round up to 128.
        assert_eq!(hex("rgb(50%,50%,50%)"), hex("rgb(128,128,128)"));
        assert_eq!(hex("rgb(50%,50%,50%)"), "808080ff");
        assert_eq!(hex("rgb(100%,0%,0%)"), "ff0000ff");
    }

    #[test]
    fn scheme_grammar_tolerates_whitespace() {
        assert_eq!(hex("rgb ( 255 , 0 , 0 )"), "ff0000ff");
    }

    #[test]
    fn rgba_alpha_is_a_fraction() {
        assert_eq!(hex("rgba(255,0,0,0.5)"), "ff000080");
        assert_eq!(hex("rgba(255,0,0,1)"), "ff0000ff");
        assert_eq!(hex("rgba(255,0,0,0)"), "ff000000");
    }

    #[test]
    fn gray_replicates_the_intensity() {
        assert_eq!(hex("gray(50%)"), "808080ff");
        assert_eq!(hex("gray(0)"), "000000ff");
        assert_eq!(hex("graya(50%,0.5)"), "80808080");
    }

    #[test]
    fn hsb_converts_as_hsv() {
        assert_eq!(hex("hsb(0,100%,100%)"), "ff0000ff");
        assert_eq!(hex("hsb(0,0,100%)"), "ffffffff");
        assert_eq!(hex("hsb(0,0,0)"), "000000ff");
    }

    #[test]
    fn hsl_channel_order_is_h_s_l() {
        // Lightness 100% is white regardless of saturation; if the
        // converter consumed the channels in the written order this
        // would come out red instead.
        assert_eq!(hex("hsl(0,50%,100%)"), "ffffffff");
        assert_eq!(hex("hsl(0,100%,50%)"), "ff0000ff");
    }

    #[test]
    fn cmyk_matches_the_subtractive_formula() {
        assert_eq!(hex("cmyk(100%,0,0,0)"), hex("cyan"));
        assert_eq!(hex("cmyk(0,0,0,100%)"), "000000ff");
        assert_eq!(hex("cmyk(0,0,0,0)"), "ffffffff");
        assert_eq!(hex("cmyka(0,100%,100%,0,0.5)"), "ff000080");
    }

    #[test]
    fn hex_runs_carry_or_imply_alpha() {
        assert_eq!(hex("abc"), "aabbccff");
        assert_eq!(hex("abcd"), "aabbccdd");
        assert_eq!(hex("0a0B0c"), "0a0b0cff");
        assert_eq!(hex("00ff7f80"), "00ff7f80");
    }

    #[test]
    fn wide_hex_runs_keep_the_high_bytes() {
        assert_eq!(hex("ff8800aabb11"), hex("ff00bb"));
        assert_eq!(hex("ffff00000000"), hex("ff0000"));
        assert_eq!(hex("ffff000000008000"), "ff000080");
    }

    #[test]
    fn wrong_channel_count_is_a_hard_error() {
        assert!(matches!(
            normalize_color("rgb(1,2)"),
            Err(Error::InvalidColorSpec(_))
        ));
        assert!(matches!(
            normalize_color("gray(1,2)"),
            Err(Error::InvalidColorSpec(_))
        ));
        assert!(matches!(
            normalize_color("cmyk(1,2,3)"),
            Err(Error::InvalidColorSpec(_))
        ));
    }

    #[test]
    fn out_of_range_channels_are_rejected() {
        assert!(normalize_color("rgb(300,0,0)").is_err());
        assert!(normalize_color("rgb(150%,0,0)").is_err());
        assert!(normalize_color("rgba(0,0,0,1.5)").is_err());
        assert!(normalize_color("rgba(0,0,0,50%)").is_err());
    }

    #[test]
    fn bare_fractions_are_not_channels() {
        assert!(normalize_color("rgb(12.5,0,0)").is_err());
        assert_eq!(hex("rgb(12,0,0)"), "0c0000ff");
    }

    #[test]
    fn garbage_and_partial_matches_are_rejected() {
        assert!(normalize_color("").is_err());
        assert!(normalize_color("Red").is_err());
        assert!(normalize_color("ff00").is_ok()); // 4-digit run
        assert!(normalize_color("ff000").is_err()); // 5 digits fits no run
        assert!(normalize_color("ff0000zz").is_err());
        assert!(normalize_color("rgb(1,2,3) trailing").is_err());
        assert!(normalize_color("hsv(0,0,0)").is_err());
    }

    #[test]
    fn completion_covers_names_and_schemes() {
        let completions = complete_color("gr");
        assert!(completions.contains(&"gray".to_string()));
        assert!(completions.contains(&"green".to_string()));
        assert!(completions.contains(&"gray(".to_string()));
        assert!(completions.contains(&"graya(".to_string()));
        assert!(!completions.contains(&"red".to_string()));
    }
}
