//! Tiny 3×5 bitmap font used for titles, tick labels and legends.
//!
//! Letters are drawn upper-case only; lower-case input is folded.

pub const GLYPH_WIDTH: i32 = 3;
pub const GLYPH_HEIGHT: i32 = 5;
/// Horizontal advance per character, one column of spacing included.
pub const ADVANCE: i32 = 4;

pub type Glyph = [&'static str; 5];

pub fn glyph(ch: char) -> Glyph {
    match ch.to_ascii_uppercase() {
        '0' => ["###", "# #", "# #", "# #", "###"],
        '1' => ["  #", "  #", "  #", "  #", "  #"],
        '2' => ["###", "  #", "###", "#  ", "###"],
        '3' => ["###", "  #", "###", "  #", "###"],
        '4' => ["# #", "# #", "###", "  #", "  #"],
        '5' => ["###", "#  ", "###", "  #", "###"],
        '6' => ["###", "#  ", "###", "# #", "###"],
        '7' => ["###", "  #", "  #", "  #", "  #"],
        '8' => ["###", "# #", "###", "# #", "###"],
        '9' => ["###", "# #", "###", "  #", "###"],
        'A' => [" # ", "# #", "###", "# #", "# #"],
        'B' => ["## ", "# #", "## ", "# #", "## "],
        'C' => [" ##", "#  ", "#  ", "#  ", " ##"],
        'D' => ["## ", "# #", "# #", "# #", "## "],
        'E' => ["###", "#  ", "## ", "#  ", "###"],
        'F' => ["###", "#  ", "## ", "#  ", "#  "],
        'G' => [" ##", "#  ", "# #", "# #", " ##"],
        'H' => ["# #", "# #", "###", "# #", "# #"],
        'I' => ["###", " # ", " # ", " # ", "###"],
        'J' => ["  #", "  #", "  #", "# #", " # "],
        'K' => ["# #", "# #", "## ", "# #", "# #"],
        'L' => ["#  ", "#  ", "#  ", "#  ", "###"],
        'M' => ["# #", "###", "###", "# #", "# #"],
        'N' => ["###", "# #", "# #", "# #", "# #"],
        'O' => [" # ", "# #", "# #", "# #", " # "],
        'P' => ["## ", "# #", "## ", "#  ", "#  "],
        'Q' => [" # ", "# #", "# #", "## ", " ##"],
        'R' => ["## ", "# #", "## ", "# #", "# #"],
        'S' => [" ##", "#  ", " # ", "  #", "## "],
        'T' => ["###", " # ", " # ", " # ", " # "],
        'U' => ["# #", "# #", "# #", "# #", "###"],
        'V' => ["# #", "# #", "# #", "# #", " # "],
        'W' => ["# #", "# #", "###", "###", "# #"],
        'X' => ["# #", "# #", " # ", "# #", "# #"],
        'Y' => ["# #", "# #", " # ", " # ", " # "],
        'Z' => ["###", "  #", " # ", "#  ", "###"],
        ':' => ["   ", " # ", "   ", " # ", "   "],
        '.' => ["   ", "   ", "   ", "   ", " # "],
        ',' => ["   ", "   ", "   ", " # ", "#  "],
        '-' => ["   ", "   ", "###", "   ", "   "],
        '+' => ["   ", " # ", "###", " # ", "   "],
        '=' => ["   ", "###", "   ", "###", "   "],
        '(' => [" # ", "#  ", "#  ", "#  ", " # "],
        ')' => [" # ", "  #", "  #", "  #", " # "],
        '/' => ["  #", "  #", " # ", "#  ", "#  "],
        '^' => [" # ", "# #", "   ", "   ", "   "],
        '_' => ["   ", "   ", "   ", "   ", "###"],
        ' ' => ["   ", "   ", "   ", "   ", "   "],
        _ => ["###", "  #", " # ", "   ", " # "],
    }
}

/// Width in pixels of `text` at `scale`, without trailing spacing.
pub fn text_width(text: &str, scale: u32) -> i32 {
    let n = text.chars().count() as i32;
    if n == 0 {
        0
    } else {
        ((n - 1) * ADVANCE + GLYPH_WIDTH) * scale as i32
    }
}

pub fn text_height(scale: u32) -> i32 {
    GLYPH_HEIGHT * scale as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_case_folds_to_upper() {
        assert_eq!(glyph('a'), glyph('A'));
        assert_ne!(glyph('A'), glyph('B'));
    }

    #[test]
    fn glyphs_are_three_by_five() {
        for ch in ('0'..='9').chain('A'..='Z').chain(":.,-+=()/^_ ?".chars()) {
            for row in glyph(ch) {
                assert_eq!(row.len(), GLYPH_WIDTH as usize, "{:?}", ch);
            }
        }
    }

    #[test]
    fn widths_scale_linearly() {
        assert_eq!(text_width("", 2), 0);
        assert_eq!(text_width("1", 1), 3);
        assert_eq!(text_width("10", 2), 14);
    }
}
