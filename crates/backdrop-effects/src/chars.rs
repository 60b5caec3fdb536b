//! Character constants for the animation layers.

/// Glyphs used by the procedural rain: digits and half-width katakana.
pub const RAIN_CHARS: &[char] = &[
    '0', '1', 'ｱ', 'ｲ', 'ｳ', 'ｴ', 'ｵ', 'ｶ', 'ｷ', 'ｸ', 'ｹ', 'ｺ', 'ｻ', 'ｼ', 'ｽ', 'ｾ', 'ｿ', 'ﾀ',
    'ﾁ', 'ﾂ', 'ﾃ', 'ﾄ', 'ﾅ', 'ﾆ', 'ﾇ', 'ﾈ', 'ﾉ', 'ﾊ', 'ﾋ', 'ﾌ', 'ﾍ', 'ﾎ', 'ﾏ', 'ﾐ', 'ﾑ', 'ﾒ',
    'ﾓ', 'ﾔ', 'ﾕ', 'ﾖ', 'ﾗ', 'ﾘ', 'ﾙ', 'ﾚ', 'ﾛ', 'ﾜ', 'ｦ', 'ﾝ',
];

/// Disc glyphs by increasing radius.
pub const DISC_SMALL: char = '·';
pub const DISC_MEDIUM: char = '•';
pub const DISC_LARGE: char = '●';
/// Fill for discs that span several cells.
pub const DISC_AREA: char = '░';

/// Glyph used for line segments and glow halos.
pub const STROKE: char = '·';
