use image::Rgba;

// ============================================================================
// COLOR MODEL — hex parsing, tolerance matching, blending
// ============================================================================

/// Color returned for any hex string that does not parse.
pub const FALLBACK_COLOR: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Overlay weight used by [`blend`] callers that have no preference.
pub const DEFAULT_BLEND_ALPHA: f32 = 0.7;

/// Result of parsing a user- or palette-supplied hex string.
///
/// The public contract ([`hex_to_color`]) collapses every failure to
/// [`FALLBACK_COLOR`]; this keeps the distinction between "nothing chosen" and
/// "typo" for callers that care.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParsedHex {
    Parsed(Rgba<u8>),
    /// Empty or whitespace-only input.
    Empty,
    /// Wrong length, stray characters, or non-hex digits.
    Malformed,
}

impl ParsedHex {
    pub fn color(self) -> Rgba<u8> {
        match self {
            ParsedHex::Parsed(c) => c,
            ParsedHex::Empty | ParsedHex::Malformed => FALLBACK_COLOR,
        }
    }

    pub fn is_parsed(self) -> bool {
        matches!(self, ParsedHex::Parsed(_))
    }
}

/// Parse `RRGGBB` or `#RRGGBB` (case-insensitive) into an opaque color.
pub fn parse_hex(hex: &str) -> ParsedHex {
    if hex.trim().is_empty() {
        return ParsedHex::Empty;
    }
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    let bytes = digits.as_bytes();
    if bytes.len() != 6 {
        return ParsedHex::Malformed;
    }

    let channel = |i: usize| -> Option<u8> {
        let hi = hex_digit(bytes[i])?;
        let lo = hex_digit(bytes[i + 1])?;
        Some(hi << 4 | lo)
    };

    match (channel(0), channel(2), channel(4)) {
        (Some(r), Some(g), Some(b)) => ParsedHex::Parsed(Rgba([r, g, b, 255])),
        _ => ParsedHex::Malformed,
    }
}

#[inline]
const fn hex_digit(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

/// Lenient hex decode: malformed input yields [`FALLBACK_COLOR`], never an error.
pub fn hex_to_color(hex: &str) -> Rgba<u8> {
    parse_hex(hex).color()
}

/// Format as `#RRGGBB` (alpha is dropped).
pub fn color_to_hex(color: Rgba<u8>) -> String {
    let [r, g, b, _] = color.0;
    format!("#{:02X}{:02X}{:02X}", r, g, b)
}

/// True when every channel, alpha included, differs by at most `tolerance`.
#[inline]
pub fn colors_match(a: Rgba<u8>, b: Rgba<u8>, tolerance: u32) -> bool {
    a.0.iter()
        .zip(b.0.iter())
        .all(|(&x, &y)| u32::from(x.abs_diff(y)) <= tolerance)
}

/// Linear mix of the RGB channels; the result is always opaque.
pub fn blend(base: Rgba<u8>, overlay: Rgba<u8>, alpha: f32) -> Rgba<u8> {
    let alpha = if alpha.is_nan() { 0.0 } else { alpha.clamp(0.0, 1.0) };
    let mix = |b: u8, o: u8| -> u8 {
        (b as f32 * (1.0 - alpha) + o as f32 * alpha)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    Rgba([
        mix(base.0[0], overlay.0[0]),
        mix(base.0[1], overlay.0[1]),
        mix(base.0[2], overlay.0[2]),
        255,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_to_color_red() {
        assert_eq!(hex_to_color("#FF0000"), Rgba([255, 0, 0, 255]));
    }

    #[test]
    fn test_hex_to_color_without_hash_and_lowercase() {
        assert_eq!(hex_to_color("1a2b3c"), Rgba([0x1a, 0x2b, 0x3c, 255]));
        assert_eq!(hex_to_color("#aBcDeF"), Rgba([0xab, 0xcd, 0xef, 255]));
    }

    #[test]
    fn test_hex_to_color_fallback() {
        assert_eq!(hex_to_color("not-a-color"), FALLBACK_COLOR);
        assert_eq!(hex_to_color(""), FALLBACK_COLOR);
        assert_eq!(hex_to_color("#FFF"), FALLBACK_COLOR);
        assert_eq!(hex_to_color("##FF0000"), FALLBACK_COLOR);
        assert_eq!(hex_to_color("#FF00GG"), FALLBACK_COLOR);
        assert_eq!(hex_to_color("#FF00000"), FALLBACK_COLOR);
    }

    #[test]
    fn test_parse_hex_distinguishes_empty_from_typo() {
        assert_eq!(parse_hex(""), ParsedHex::Empty);
        assert_eq!(parse_hex("   "), ParsedHex::Empty);
        assert_eq!(parse_hex("#12345"), ParsedHex::Malformed);
        assert_eq!(parse_hex("#123456"), ParsedHex::Parsed(Rgba([0x12, 0x34, 0x56, 255])));
    }

    #[test]
    fn test_parse_hex_rejects_multibyte_input() {
        // Six bytes, but not six hex digits.
        assert_eq!(parse_hex("ééé"), ParsedHex::Malformed);
    }

    #[test]
    fn test_color_to_hex() {
        assert_eq!(color_to_hex(Rgba([255, 128, 1, 10])), "#FF8001");
        assert_eq!(hex_to_color(&color_to_hex(Rgba([9, 8, 7, 255]))), Rgba([9, 8, 7, 255]));
    }

    #[test]
    fn test_colors_match_exact() {
        let a = Rgba([10, 20, 30, 255]);
        assert!(colors_match(a, a, 0));
        assert!(!colors_match(a, Rgba([10, 20, 31, 255]), 0));
    }

    #[test]
    fn test_colors_match_includes_alpha() {
        let a = Rgba([10, 20, 30, 255]);
        let b = Rgba([10, 20, 30, 200]);
        assert!(!colors_match(a, b, 54));
        assert!(colors_match(a, b, 55));
    }

    #[test]
    fn test_colors_match_tolerance_boundary() {
        let a = Rgba([100, 100, 100, 255]);
        let b = Rgba([130, 70, 100, 255]);
        assert!(colors_match(a, b, 30));
        assert!(!colors_match(a, b, 29));
        assert!(colors_match(Rgba([0, 0, 0, 0]), Rgba([255, 255, 255, 255]), 255));
        assert!(colors_match(Rgba([0, 0, 0, 0]), Rgba([255, 255, 255, 255]), 1000));
    }

    #[test]
    fn test_blend() {
        let base = Rgba([0, 0, 0, 10]);
        let overlay = Rgba([255, 100, 50, 10]);
        assert_eq!(blend(base, overlay, 0.0), Rgba([0, 0, 0, 255]));
        assert_eq!(blend(base, overlay, 1.0), Rgba([255, 100, 50, 255]));
        assert_eq!(blend(base, overlay, 0.5), Rgba([128, 50, 25, 255]));
        let overlay = Rgba([200, 100, 50, 10]);
        assert_eq!(blend(base, overlay, DEFAULT_BLEND_ALPHA), Rgba([140, 70, 35, 255]));
    }

    #[test]
    fn test_blend_clamps_alpha() {
        let base = Rgba([10, 10, 10, 255]);
        let overlay = Rgba([200, 200, 200, 255]);
        assert_eq!(blend(base, overlay, 2.0), Rgba([200, 200, 200, 255]));
        assert_eq!(blend(base, overlay, -1.0), Rgba([10, 10, 10, 255]));
        assert_eq!(blend(base, overlay, f32::NAN), Rgba([10, 10, 10, 255]));
    }
}
