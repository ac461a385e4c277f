use crate::app::{App, Hover};
use crate::braille::BrailleCanvas;
use crate::map::{legend, MapLayers};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
    Frame,
};

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Split into map area and status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_map(frame, app, chunks[0]);
    render_status_bar(frame, app, chunks[1]);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let title = match app.selection_summary() {
        Some(summary) => format!(" {summary} "),
        None if app.atlas.has_counties() => " US Book Bans ".to_string(),
        None => " US Book Bans (no county data) ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut viewport = app.viewport.clone();
    // Braille gives 2x4 resolution per character
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let focus = app.focus();
    let layers = app.map_renderer.render(
        &app.atlas,
        &app.tables.bans,
        focus.as_ref(),
        inner.width as usize,
        inner.height as usize,
        &viewport,
    );

    let cursor_pos = app.mouse_pixel_pos().and_then(|(px, py)| {
        // Convert braille pixels to character position
        let cx = (px / 2) as u16;
        let cy = (py / 4) as u16;
        if cx < inner.width && cy < inner.height {
            Some((cx, cy))
        } else {
            None
        }
    });

    frame.render_widget(MapWidget { layers, cursor_pos }, inner);

    if let (Some(hover), Some((cx, cy))) = (app.hover(), cursor_pos) {
        render_hover(frame, &hover, inner, cx, cy);
    }
}

/// Braille map with the cursor marker on top
struct MapWidget {
    layers: MapLayers,
    cursor_pos: Option<(u16, u16)>,
}

impl MapWidget {
    /// Draw every inked cell of a layer. `color` overrides the cell's own ink.
    fn render_layer(canvas: &BrailleCanvas, color: Option<Color>, area: Rect, buf: &mut Buffer) {
        for row in 0..area.height {
            for col in 0..area.width {
                let Some((ch, ink)) = canvas.cell(col as usize, row as usize) else {
                    continue;
                };
                let cell = &mut buf[(area.x + col, area.y + row)];
                cell.set_char(ch);
                if let Some(fg) = color.or(ink) {
                    cell.set_fg(fg);
                }
            }
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Back to front: choropleth, state borders, county borders, selection
        Self::render_layer(&self.layers.fills, None, area, buf);
        Self::render_layer(&self.layers.state_borders, Some(Color::White), area, buf);
        Self::render_layer(&self.layers.county_borders, Some(Color::DarkGray), area, buf);
        Self::render_layer(&self.layers.outline, Some(Color::Yellow), area, buf);

        if let Some((cx, cy)) = self.cursor_pos {
            let x = area.x + cx;
            let y = area.y + cy;
            if x < area.x + area.width && y < area.y + area.height {
                buf[(x, y)].set_char('╋').set_fg(Color::Red);
            }
        }
    }
}

/// Popup next to the cursor, flipped to the other side near the edges
fn render_hover(frame: &mut Frame, hover: &Hover, map: Rect, cx: u16, cy: u16) {
    let width = (hover.title.chars().count().max(hover.detail.chars().count()) as u16 + 4).min(map.width);
    let height = 4.min(map.height);

    let x = if cx + 2 + width <= map.width {
        map.x + cx + 2
    } else {
        map.x + cx.saturating_sub(width + 1)
    };
    let y = if cy + 1 + height <= map.height {
        map.y + cy + 1
    } else {
        map.y + cy.saturating_sub(height)
    };
    let popup = Rect::new(x, y, width, height);

    let body = Paragraph::new(Line::from(Span::styled(
        hover.detail.as_str(),
        Style::default().fg(Color::White),
    )))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(Span::styled(
                hover.title.as_str(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
    );

    frame.render_widget(Clear, popup);
    frame.render_widget(body, popup);
}

fn toggle<'a>(on: bool, on_label: &'a str, off_label: &'a str) -> Span<'a> {
    Span::styled(
        if on { on_label } else { off_label },
        Style::default().fg(if on { Color::Green } else { Color::DarkGray }),
    )
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let settings = &app.map_renderer.settings;

    let mut spans = vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        toggle(settings.show_fills, "[F]ill ", "[f]ill "),
        toggle(settings.show_borders, "[B]order ", "[b]order "),
        toggle(settings.show_counties, "[Y]county ", "[y]county "),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
    ];

    for (count, color) in legend() {
        spans.push(Span::styled("█", Style::default().fg(color)));
        spans.push(Span::styled(format!("{count} "), Style::default().fg(Color::DarkGray)));
    }

    spans.push(Span::styled(
        "| click:select esc:clear hjkl:pan +/-:zoom r:reset q:quit",
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::FallbackPolicy;
    use crate::data::Tables;
    use crate::region::tests::sample_atlas;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        let buf = terminal.backend().buffer();
        (0..buf.area.height)
            .map(|y| (0..buf.area.width).map(|x| buf[(x, y)].symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn test_status_bar_lists_toggles_and_legend() {
        let app = App::new(sample_atlas(), Tables::builtin(), FallbackPolicy::default(), 160, 12);
        let text = screen(&app, 160, 12);
        assert!(text.contains("US Book Bans"));
        assert!(text.contains("[F]ill"));
        assert!(text.contains("315"));
    }

    #[test]
    fn test_hover_popup_drawn() {
        let mut app = App::new(sample_atlas(), Tables::builtin(), FallbackPolicy::default(), 60, 12);
        let bounds = app.atlas.bounds();
        app.viewport.fit_bounds(&bounds, 0);
        let (px, py) = app.viewport.project(1.0, 0.5);
        app.set_mouse_pos((px / 2 + 1) as u16, (py / 4 + 1) as u16);

        let text = screen(&app, 60, 12);
        // Sample states are missing from the built-in ban table
        assert!(text.contains("Alpha"));
        assert!(text.contains("Book bans: 0"));
    }
}
