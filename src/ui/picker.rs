use crate::app::forms::{CatalogEntry, Picker};
use crate::app::state::AppState;
use crate::ui::layout::popup_area;
use crate::ui::theme::Theme;
use crate::ui::key_hints;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};

/// Most rows a catalog picker popup shows at once.
pub const PICKER_ROWS: usize = 12;

/// Popup for a catalog picker on a terminal of the given size.
fn picker_popup(area: Rect) -> Rect {
    // filter + header + sep + rows + footer + help, inside borders
    popup_area(area, (60, 80), (50, PICKER_ROWS as u16 + 7))
}

/// Entry rows the picker popup has room for on a terminal of this size.
pub fn picker_rows(area: Rect) -> usize {
    let inner = picker_popup(area).height.saturating_sub(2);
    (inner as usize).saturating_sub(5).min(PICKER_ROWS)
}

pub fn render(frame: &mut Frame, state: &AppState) {
    let create = &state.create;
    if create.sections.open {
        render_picker(frame, "Sections", &create.sections);
    } else if create.topics.open {
        render_picker(frame, "Topics", &create.topics);
    }
}

fn render_picker<T: CatalogEntry>(frame: &mut Frame, kind: &str, picker: &Picker<T>) {
    let popup = picker_popup(frame.area());
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(format!(" {} ({} selected) ", kind, picker.chosen.len()))
        .title_style(Theme::title())
        .borders(Borders::ALL)
        .border_type(Theme::border_type())
        .border_style(Style::default().fg(Theme::ACCENT_LAVENDER))
        .style(Style::default().bg(Theme::BG_SURFACE));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    if inner.height < 6 || inner.width < 20 {
        return;
    }

    // Search bar
    let search = &picker.search.text;
    let search_line = Line::from(vec![
        Span::styled(" Search: ", Theme::key_hint()),
        Span::styled(
            if search.is_empty() { "(type to search)" } else { search.as_str() },
            if search.is_empty() { Theme::muted() } else { Theme::text() },
        ),
        Span::styled("█", Style::default().fg(Theme::ACCENT_TEAL)),
    ]);
    frame.render_widget(Paragraph::new(search_line), Rect::new(inner.x, inner.y, inner.width, 1));

    let header = Line::from(Span::styled(
        format!("  {:<4}{:<40} {:>9}", "", kind, "Questions"),
        Theme::heading(),
    ));
    frame.render_widget(Paragraph::new(header), Rect::new(inner.x, inner.y + 1, inner.width, 1));
    let sep = Line::from(Span::styled(
        "─".repeat(inner.width as usize),
        Style::default().fg(Theme::BORDER_DIM),
    ));
    frame.render_widget(Paragraph::new(sep), Rect::new(inner.x, inner.y + 2, inner.width, 1));

    let list_h = picker_rows(frame.area());
    let list_area = Rect::new(inner.x, inner.y + 3, inner.width.saturating_sub(1), list_h as u16);

    if picker.entries.is_empty() {
        let msg = if search.is_empty() { "  Nothing to choose from." } else { "  No matches." };
        frame.render_widget(Paragraph::new(Span::styled(msg, Theme::muted())), list_area);
    } else {
        let end = (picker.scroll_offset + list_h).min(picker.entries.len());
        let lines: Vec<Line> = (picker.scroll_offset..end)
            .map(|i| {
                let entry = &picker.entries[i];
                let check = if picker.is_chosen(entry) { "[x]" } else { "[ ]" };
                let title = truncate(entry.title(), 40);
                let text = format!("  {:<4}{:<40} {:>9}", check, title, entry.count());
                let style = if i == picker.cursor { Theme::selected() } else { Theme::text() };
                Line::from(Span::styled(text, style))
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), list_area);

        if picker.entries.len() > list_h {
            let bar_area = Rect::new(inner.x + inner.width.saturating_sub(1), inner.y + 3, 1, list_h as u16);
            let mut bar_state = ScrollbarState::new(picker.entries.len().saturating_sub(list_h))
                .position(picker.scroll_offset);
            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .thumb_style(Theme::scrollbar_thumb())
                    .track_style(Theme::scrollbar_track()),
                bar_area,
                &mut bar_state,
            );
        }
    }

    let footer = Line::from(Span::styled(
        format!(" {}", picker.summary()),
        Theme::secondary(),
    ));
    frame.render_widget(
        Paragraph::new(footer),
        Rect::new(inner.x, inner.y + inner.height - 2, inner.width, 1),
    );
    frame.render_widget(
        Paragraph::new(key_hints(&[("↑↓", "Navigate"), ("Enter", "Toggle"), ("Esc", "Done")])),
        Rect::new(inner.x, inner.y + inner.height - 1, inner.width, 1),
    );
}

/// Truncate at a char boundary, marking the cut with `...`.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut)
}
