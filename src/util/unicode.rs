use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells. Tabs count as 4 cells.
pub fn display_width(s: &str) -> usize {
    s.graphemes(true).map(grapheme_display_width).sum()
}

/// Cut `s` down to `max_cells`, ending in `…` when anything was dropped.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    let Some(room) = max_cells.checked_sub(1) else {
        return String::new();
    };
    let mut used = 0;
    let mut out: String = s
        .graphemes(true)
        .take_while(|g| {
            used += grapheme_display_width(g);
            used <= room
        })
        .collect();
    out.push('\u{2026}');
    out
}

/// Word-wrap text into rows of at most `width` cells.
///
/// Newlines always break. Words longer than a row are split at grapheme
/// boundaries. Runs of whitespace collapse to a single space between words.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut rows = Vec::new();
    for line in text.lines() {
        let mut row = String::new();
        let mut row_width = 0;
        for word in line.split_whitespace() {
            let ww = display_width(word);
            let gap = usize::from(!row.is_empty());
            if row_width + gap + ww <= width {
                if gap == 1 {
                    row.push(' ');
                }
                row.push_str(word);
                row_width += gap + ww;
                continue;
            }
            if !row.is_empty() {
                rows.push(std::mem::take(&mut row));
                row_width = 0;
            }
            // split an overlong word
            for g in word.graphemes(true) {
                let gw = grapheme_display_width(g);
                if row_width + gw > width && !row.is_empty() {
                    rows.push(std::mem::take(&mut row));
                    row_width = 0;
                }
                row.push_str(g);
                row_width += gw;
            }
        }
        rows.push(row);
    }
    if rows.is_empty() {
        rows.push(String::new());
    }
    rows
}

fn grapheme_display_width(g: &str) -> usize {
    if g == "\t" {
        4
    } else {
        UnicodeWidthStr::width(g)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_width_mixed() {
        assert_eq!(display_width("note日本"), 8);
        assert_eq!(display_width("cafe\u{0301}"), 4);
        assert_eq!(display_width("a\tb"), 6);
    }

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate_to_width("Ship it", 7), "Ship it");
        assert_eq!(truncate_to_width("Write docs", 6), "Write\u{2026}");
        assert_eq!(truncate_to_width("Write docs", 1), "\u{2026}");
        assert_eq!(truncate_to_width("Write docs", 0), "");
    }

    #[test]
    fn truncate_never_splits_wide_glyphs() {
        assert_eq!(truncate_to_width("日本語テキスト", 6), "日本\u{2026}");
    }

    #[test]
    fn wrap_breaks_on_words() {
        assert_eq!(
            wrap_text("the quick brown fox", 10),
            vec!["the quick", "brown fox"]
        );
    }

    #[test]
    fn wrap_keeps_newlines_and_splits_long_words() {
        assert_eq!(wrap_text("ab\nabcdefg", 3), vec!["ab", "abc", "def", "g"]);
    }

    #[test]
    fn wrap_empty_is_one_row() {
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }
}
