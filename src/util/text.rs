use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width in terminal cells.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a string to fit within `max_cells` terminal cells, appending `…`
/// if truncated.
pub fn truncate_to_width(s: &str, max_cells: usize) -> String {
    if max_cells == 0 {
        return String::new();
    }
    if display_width(s) <= max_cells {
        return s.to_string();
    }
    if max_cells <= 1 {
        return "\u{2026}".to_string();
    }
    let budget = max_cells - 1;
    let mut width = 0;
    let mut result = String::new();
    for grapheme in s.graphemes(true) {
        let gw = display_width(grapheme);
        if width + gw > budget {
            break;
        }
        width += gw;
        result.push_str(grapheme);
    }
    result.push('\u{2026}');
    result
}

/// Greedy word wrap by display width. Words wider than the limit are broken
/// at grapheme boundaries. Empty input yields no lines.
pub fn wrap_text(s: &str, max_cells: usize) -> Vec<String> {
    if max_cells == 0 || s.trim().is_empty() {
        return Vec::new();
    }
    let mut lines = Vec::new();
    for source_line in s.lines() {
        if source_line.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        let mut current_width = 0;
        for word in source_line.split_whitespace() {
            let word_width = display_width(word);
            if word_width > max_cells {
                // Hard-break an overlong word.
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                let mut piece = String::new();
                let mut piece_width = 0;
                for grapheme in word.graphemes(true) {
                    let gw = display_width(grapheme);
                    if piece_width + gw > max_cells {
                        lines.push(std::mem::take(&mut piece));
                        piece_width = 0;
                    }
                    piece.push_str(grapheme);
                    piece_width += gw;
                }
                current = piece;
                current_width = piece_width;
                continue;
            }
            let sep = if current.is_empty() { 0 } else { 1 };
            if current_width + sep + word_width > max_cells {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            if !current.is_empty() {
                current.push(' ');
                current_width += 1;
            }
            current.push_str(word);
            current_width += word_width;
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_preserves_short_strings() {
        assert_eq!(truncate_to_width("short", 10), "short");
    }

    #[test]
    fn truncate_appends_ellipsis() {
        assert_eq!(truncate_to_width("hello world", 6), "hello…");
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap_text("validate the incoming order form", 10);
        assert!(lines.iter().all(|l| display_width(l) <= 10));
        assert_eq!(lines.join(" "), "validate the incoming order form");
    }

    #[test]
    fn wrap_breaks_overlong_words() {
        let lines = wrap_text("antidisestablishmentarianism", 10);
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| display_width(l) <= 10));
    }

    #[test]
    fn wrap_empty_yields_no_lines() {
        assert!(wrap_text("", 10).is_empty());
        assert!(wrap_text("   ", 10).is_empty());
    }
}
