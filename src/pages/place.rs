//! Text placement helpers used to lay out page bodies.
//!
//! These work on whole blocks: a block is centered as a unit, the lines inside
//! it keep their relative alignment.

use ratatui::style::Style;
use ratatui::symbols::border;
use ratatui::text::{Line, Span, Text};

/// Center a block horizontally within `width` columns.
pub fn place_horizontal(mut text: Text<'static>, width: u16) -> Text<'static> {
    let pad = usize::from(width).saturating_sub(text.width()) / 2;
    if pad == 0 {
        return text;
    }
    let indent = " ".repeat(pad);
    for line in &mut text.lines {
        line.spans.insert(0, Span::raw(indent.clone()));
    }
    text
}

/// Center a block vertically within `height` rows by adding leading blank lines.
pub fn place_vertical(mut text: Text<'static>, height: u16) -> Text<'static> {
    let pad = usize::from(height).saturating_sub(text.height()) / 2;
    if pad == 0 {
        return text;
    }
    let mut lines = vec![Line::default(); pad];
    lines.append(&mut text.lines);
    text.lines = lines;
    text
}

/// Center every line relative to the widest line of the block.
pub fn center_lines(mut text: Text<'static>) -> Text<'static> {
    let block = text.width();
    for line in &mut text.lines {
        let pad = block.saturating_sub(line.width()) / 2;
        if pad > 0 {
            line.spans.insert(0, Span::raw(" ".repeat(pad)));
        }
    }
    text
}

/// Stack blocks on top of each other.
pub fn join_vertical(blocks: impl IntoIterator<Item = Text<'static>>) -> Text<'static> {
    let mut joined = Text::default();
    for block in blocks {
        joined.lines.extend(block.lines);
    }
    joined
}

/// Greedy word wrap to at most `width` columns.
///
/// A single word longer than `width` gets a line of its own.
pub fn wrap_words(input: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in input.split_whitespace() {
        let needed = if current.is_empty() {
            word.len()
        } else {
            current.len() + 1 + word.len()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Wrap `lines` in a rounded border, padding each line to `inner_width`.
pub fn boxed(lines: Vec<Line<'static>>, inner_width: usize, border_style: Style) -> Text<'static> {
    let set = border::ROUNDED;
    let rule = set.horizontal_top.repeat(inner_width);
    let mut out = Vec::with_capacity(lines.len() + 2);

    out.push(Line::from(Span::styled(
        format!("{}{}{}", set.top_left, rule, set.top_right),
        border_style,
    )));
    for mut line in lines {
        let fill = inner_width.saturating_sub(line.width());
        let mut spans = vec![Span::styled(set.vertical_left, border_style)];
        spans.append(&mut line.spans);
        spans.push(Span::raw(" ".repeat(fill)));
        spans.push(Span::styled(set.vertical_right, border_style));
        out.push(Line::from(spans));
    }
    out.push(Line::from(Span::styled(
        format!(
            "{}{}{}",
            set.bottom_left,
            set.horizontal_bottom.repeat(inner_width),
            set.bottom_right
        ),
        border_style,
    )));
    Text::from(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_place_horizontal_centers_block() {
        let text = Text::from(vec![Line::from("abcd"), Line::from("ab")]);
        let placed = place_horizontal(text, 10);
        assert_eq!(plain(&placed.lines[0]), "   abcd");
        assert_eq!(plain(&placed.lines[1]), "   ab");
    }

    #[test]
    fn test_place_horizontal_narrower_than_block_is_noop() {
        let text = Text::from("too wide for this");
        let placed = place_horizontal(text.clone(), 4);
        assert_eq!(placed, text);
    }

    #[test]
    fn test_place_vertical_adds_leading_rows() {
        let text = Text::from(vec![Line::from("a"), Line::from("b")]);
        let placed = place_vertical(text, 10);
        assert_eq!(placed.height(), 6);
        assert_eq!(plain(&placed.lines[4]), "a");
    }

    #[test]
    fn test_center_lines() {
        let text = Text::from(vec![Line::from("abcdef"), Line::from("ab")]);
        let centered = center_lines(text);
        assert_eq!(plain(&centered.lines[0]), "abcdef");
        assert_eq!(plain(&centered.lines[1]), "  ab");
    }

    #[test]
    fn test_wrap_words() {
        let lines = wrap_words("the quick brown fox jumps", 10);
        assert_eq!(lines, vec!["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn test_wrap_words_long_word() {
        let lines = wrap_words("a supercalifragilistic b", 5);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn test_boxed_pads_to_inner_width() {
        let text = boxed(vec![Line::from("hi")], 6, Style::default());
        assert_eq!(text.height(), 3);
        assert_eq!(plain(&text.lines[0]), "╭──────╮");
        assert_eq!(plain(&text.lines[1]), "│hi    │");
        assert_eq!(plain(&text.lines[2]), "╰──────╯");
    }
}
