use crate::pages::Page;
use crate::ui::app::{App, FocusPane};
use crate::ui::theme::Theme;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, BorderType, HighlightSpacing, List, ListItem, ListState, Padding, Paragraph},
    Frame,
};

pub const LIST_TITLE: &str = " l0calhost.xyz ";

pub fn render(frame: &mut Frame, app: &App, theme: &Theme) {
    let area = frame.area();
    if area.is_empty() {
        return;
    }

    if !app.is_ready() {
        frame.render_widget(Paragraph::new("\n  Initializing..."), area);
        return;
    }

    let layout = app.layout();
    // The layout is computed from clamped dimensions and can be larger than the
    // real terminal.
    let list_area = layout.list_area().intersection(area);
    let viewport_area = layout.viewport_area().intersection(area);

    if !list_area.is_empty() {
        render_page_list(frame, app, theme, list_area);
    }
    if !viewport_area.is_empty() {
        render_viewport(frame, app, theme, viewport_area);
    }
}

fn border_style(app: &App, pane: FocusPane, theme: &Theme) -> Style {
    if app.focus() == pane {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.fg_dim)
    }
}

fn render_page_list(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let items: Vec<ListItem> = Page::ALL
        .iter()
        .map(|page| ListItem::new(page.title()).style(Style::default().fg(theme.fg)))
        .collect();

    let title = Line::styled(
        LIST_TITLE,
        Style::default()
            .fg(theme.fg)
            .bg(theme.banner)
            .add_modifier(Modifier::BOLD),
    );

    let list = List::new(items)
        .block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .border_style(border_style(app, FocusPane::PageList, theme))
                .title(title)
                .padding(Padding::top(1)),
        )
        .highlight_style(Style::default().fg(theme.accent))
        .highlight_symbol("│ ")
        .highlight_spacing(HighlightSpacing::Always);

    let mut state = ListState::default().with_selected(Some(app.cursor().index()));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_viewport(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let viewport = app.viewport();

    let mut block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(border_style(app, FocusPane::Viewport, theme))
        .padding(Padding::horizontal(1));

    let max = viewport.max_offset();
    if max > 0 {
        let percent = viewport.offset() * 100 / max;
        block = block.title_bottom(
            Line::styled(format!(" {percent}% "), Style::default().fg(theme.fg_dim)).right_aligned(),
        );
    }

    let offset = u16::try_from(viewport.offset()).unwrap_or(u16::MAX);
    let paragraph = Paragraph::new(viewport.content().clone())
        .block(block)
        .scroll((offset, 0));

    frame.render_widget(paragraph, area);
}
