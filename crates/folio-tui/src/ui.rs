use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
};
use folio_core::{ProjectStatus, Role};

use crate::app::{App, Screen};

const PANEL_WIDTH: u16 = 52;
const PANEL_HEIGHT: u16 = 26;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("**") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("**") else {
            break;
        };
        if start > 0 {
            spans.push(Span::raw(rest[..start].to_string()));
        }
        let bold = &after[..end];
        if bold.is_empty() {
            spans.push(Span::raw("****"));
        } else {
            spans.push(Span::styled(
                bold.to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        }
        rest = &after[end + 2..];
    }

    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    Line::from(spans)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Home => render_home(app, frame, body_area),
        Screen::Dashboard => render_dashboard(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);

    // The chat widget floats over the page
    if app.chat.state().is_panel_open() {
        app.launcher_area = None;
        render_chat_panel(app, frame, body_area);
    } else {
        app.chat_area = None;
        app.suggestions_area = None;
        render_launcher(app, frame, body_area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![Span::styled(
        format!(" {} ", app.portfolio.owner),
        Style::default().fg(Color::Cyan).bold(),
    )];

    for (i, screen) in [Screen::Home, Screen::Dashboard].iter().enumerate() {
        let style = if *screen == app.screen {
            Style::default().fg(Color::Black).bg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!(" {} {} ", i + 1, screen.title()), style));
    }

    spans.push(Span::raw(" "));
    spans.push(Span::styled(
        format!("v{}", env!("CARGO_PKG_VERSION")),
        Style::default().fg(Color::DarkGray),
    ));

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let state = app.chat.state();

    let (mode_text, mode_style) = if !state.is_panel_open() {
        (" PAGE ", Style::default().bg(Color::Blue).fg(Color::White))
    } else if app.input_focused {
        (" TYPE ", Style::default().bg(Color::Yellow).fg(Color::Black))
    } else {
        (" CHAT ", Style::default().bg(Color::Magenta).fg(Color::White))
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);
    let hint = |key: &'static str, label: &'static str| {
        [Span::styled(key, key_style), Span::styled(label, label_style)]
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];

    if !state.is_panel_open() {
        spans.extend(hint(" c ", " chat "));
        spans.extend(hint(" Tab ", " page "));
        spans.extend(hint(" j/k ", " scroll "));
        spans.extend(hint(" q ", " quit "));
    } else if app.input_focused {
        spans.extend(hint(" Enter ", " send "));
        if app.chat.show_suggestions() {
            spans.extend(hint(" Up/Down ", " suggestion "));
        } else {
            spans.extend(hint(" PgUp/PgDn ", " scroll "));
        }
        spans.extend(hint(" Esc ", " stop typing "));
    } else {
        spans.extend(hint(" i ", " type "));
        if app.chat.show_suggestions() {
            spans.extend(hint(" 1-4 ", " ask "));
        } else {
            spans.extend(hint(" j/k ", " scroll "));
        }
        spans.extend(hint(" Esc ", " close "));
        spans.extend(hint(" q ", " quit "));
    }

    if state.is_awaiting_response() {
        spans.push(Span::styled(
            " waiting for reply ",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::ITALIC),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_home(app: &mut App, frame: &mut Frame, area: Rect) {
    let p = &app.portfolio;

    // Vertically center the intro block
    let content_height = 5;
    let top_pad = area.height.saturating_sub(content_height) / 2;

    let mut lines: Vec<Line> = (0..top_pad).map(|_| Line::default()).collect();
    lines.push(Line::from(Span::styled(
        p.owner.clone(),
        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(p.tagline.clone(), Style::default().fg(Color::Gray))));
    lines.push(Line::default());
    lines.push(Line::from(Span::styled(p.intro.clone(), Style::default().fg(Color::DarkGray))));

    let home = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .scroll((app.page_scroll, 0));

    frame.render_widget(home, area);
}

fn render_dashboard(app: &mut App, frame: &mut Frame, area: Rect) {
    let [title_area, stats_area, middle_area, skills_area] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Length(5),
        Constraint::Min(8),
        Constraint::Length(5),
    ])
    .areas(area);

    let p = &app.portfolio;

    let title = Paragraph::new(vec![
        Line::from(Span::styled(p.owner.clone(), Style::default().fg(Color::White).bold())),
        Line::from(Span::styled(p.tagline.clone(), Style::default().fg(Color::Gray))),
    ]);
    frame.render_widget(title, title_area);

    // Stat cards
    if !p.stats.is_empty() {
        let constraints = vec![Constraint::Ratio(1, p.stats.len() as u32); p.stats.len()];
        let cards = Layout::horizontal(constraints).split(stats_area);
        for (card, cell) in p.stats.iter().zip(cards.iter()) {
            let block = Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(Span::styled(format!(" {} ", card.label), Style::default().fg(Color::Gray)));
            let mut lines = vec![Line::from(Span::styled(
                card.value.clone(),
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ))];
            if let Some(trend) = &card.trend {
                lines.push(Line::from(Span::styled(trend.clone(), Style::default().fg(Color::Green))));
            }
            frame.render_widget(Paragraph::new(lines).block(block), *cell);
        }
    }

    let [projects_area, overview_area] = Layout::horizontal([
        Constraint::Percentage(66),
        Constraint::Percentage(34),
    ])
    .areas(middle_area);

    // Recent projects
    let project_lines: Vec<Line> = p
        .recent_work
        .iter()
        .flat_map(|work| {
            let status_style = match work.status {
                ProjectStatus::Completed => Style::default().fg(Color::Green),
                ProjectStatus::Active => Style::default().fg(Color::Blue),
            };
            [
                Line::from(vec![
                    Span::styled(work.title.clone(), Style::default().fg(Color::White).bold()),
                    Span::raw("  "),
                    Span::styled(format!("[{}]", work.status.as_str()), status_style),
                ]),
                Line::from(Span::styled(
                    format!("{} · {}", work.category, work.date),
                    Style::default().fg(Color::DarkGray),
                )),
                Line::default(),
            ]
        })
        .collect();

    let projects = Paragraph::new(project_lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue))
                .title(" Recent Projects "),
        )
        .scroll((app.page_scroll, 0));
    frame.render_widget(projects, projects_area);

    // Overview gauges
    let overview_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue))
        .title(" Overview ");
    let inner = overview_block.inner(overview_area);
    frame.render_widget(overview_block, overview_area);

    let gauge_colors = [Color::Green, Color::Blue, Color::Magenta];
    let rows = Layout::vertical(vec![Constraint::Length(2); p.overview.len()]).split(inner);
    for (i, (metric, row)) in p.overview.iter().zip(rows.iter()).enumerate() {
        let gauge = Gauge::default()
            .block(Block::default().title(Span::styled(
                metric.label.clone(),
                Style::default().fg(Color::Gray),
            )))
            .gauge_style(Style::default().fg(gauge_colors[i % gauge_colors.len()]))
            .ratio(metric.ratio())
            .label(format!("{}%", metric.percent.min(100)));
        frame.render_widget(gauge, *row);
    }

    // Skills
    let mut skill_spans = Vec::new();
    for skill in &p.skills {
        skill_spans.push(Span::styled(
            format!(" {} ", skill),
            Style::default().fg(Color::LightBlue).bg(Color::Rgb(30, 41, 59)),
        ));
        skill_spans.push(Span::raw("  "));
    }
    let skills = Paragraph::new(Line::from(skill_spans))
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Blue))
                .title(" Technical Skills "),
        );
    frame.render_widget(skills, skills_area);
}

fn render_launcher(app: &mut App, frame: &mut Frame, area: Rect) {
    let width = 18.min(area.width);
    let height = 3.min(area.height);
    let launcher_area = Rect::new(
        area.x + area.width.saturating_sub(width + 1),
        area.y + area.height.saturating_sub(height),
        width,
        height,
    );
    app.launcher_area = Some(launcher_area);

    frame.render_widget(Clear, launcher_area);
    let launcher = Paragraph::new(Line::from(vec![
        Span::styled(" Ask me ", Style::default().fg(Color::White).bold()),
        Span::styled("(c)", Style::default().fg(Color::Gray)),
    ]))
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Blue))
            .style(Style::default().bg(Color::Blue)),
    );
    frame.render_widget(launcher, launcher_area);
}

fn render_chat_panel(app: &mut App, frame: &mut Frame, area: Rect) {
    let width = PANEL_WIDTH.min(area.width.saturating_sub(2));
    let height = PANEL_HEIGHT.min(area.height);
    let panel_area = Rect::new(
        area.x + area.width.saturating_sub(width + 1),
        area.y + area.height.saturating_sub(height),
        width,
        height,
    );

    frame.render_widget(Clear, panel_area);

    let panel_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue))
        .title(Span::styled(
            format!(" {} ", app.portfolio.assistant_title),
            Style::default().fg(Color::White).bold(),
        ))
        .title_bottom(Line::from(Span::styled(
            format!(" {} ", app.portfolio.assistant_subtitle),
            Style::default().fg(Color::LightBlue),
        )));
    let inner = panel_block.inner(panel_area);
    frame.render_widget(panel_block, panel_area);

    let suggestions_height = if app.chat.show_suggestions() {
        (app.portfolio.suggested_prompts.len() as u16 + 2).min(inner.height / 2)
    } else {
        0
    };

    let [messages_area, suggestions_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(suggestions_height),
        Constraint::Length(3),
    ])
    .areas(inner);

    render_messages(app, frame, messages_area);

    if suggestions_height > 0 {
        render_suggestions(app, frame, suggestions_area);
        app.suggestions_area = Some(suggestions_area);
    } else {
        app.suggestions_area = None;
    }

    render_input(app, frame, input_area);
}

fn render_messages(app: &mut App, frame: &mut Frame, area: Rect) {
    // Store dimensions for scroll calculations
    app.chat_area = Some(area);
    app.chat_height = area.height;
    app.chat_width = area.width;
    if app.scroll_to_end_pending {
        app.scroll_chat_to_end();
    }

    let mut lines: Vec<Line> = Vec::new();

    for msg in app.chat.state().messages() {
        match msg.role() {
            Role::User => {
                lines.push(
                    Line::from(vec![
                        Span::styled(msg.time_label(), Style::default().fg(Color::DarkGray)),
                        Span::raw(" "),
                        Span::styled(
                            "You",
                            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                        ),
                    ])
                    .alignment(Alignment::Right),
                );
                for line in msg.content().lines() {
                    lines.push(
                        Line::from(Span::styled(line.to_string(), Style::default().fg(Color::Cyan)))
                            .alignment(Alignment::Right),
                    );
                }
            }
            Role::Agent => {
                lines.push(Line::from(vec![
                    Span::styled(
                        "Assistant",
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(" "),
                    Span::styled(msg.time_label(), Style::default().fg(Color::DarkGray)),
                ]));
                // Split response into lines and parse markdown
                for line in msg.content().lines() {
                    lines.push(parse_markdown_line(line));
                }
            }
        }
        if msg.content().is_empty() {
            lines.push(Line::default());
        }
        lines.push(Line::default());
    }

    if app.chat.is_awaiting_response() {
        lines.push(Line::from(Span::styled(
            "Assistant",
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            typing_indicator(app.animation_frame),
            Style::default().fg(Color::DarkGray),
        )));
    }

    let messages = Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));

    frame.render_widget(messages, area);
}

fn typing_indicator(frame: u8) -> &'static str {
    match frame % 3 {
        0 => "● · ·",
        1 => "· ● ·",
        _ => "· · ●",
    }
}

fn render_suggestions(app: &mut App, frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = app
        .portfolio
        .suggested_prompts
        .iter()
        .enumerate()
        .map(|(i, prompt)| ListItem::new(format!("{}. {}", i + 1, prompt)))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::DarkGray))
                .title(" Try asking: "),
        )
        .style(Style::default().fg(Color::Gray))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut app.suggestion_state);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let awaiting = app.chat.is_awaiting_response();
    let can_send = app.chat.can_send();

    let border_color = if app.input_focused {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let send_hint = if awaiting {
        Span::styled(" sending... ", Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
    } else if can_send {
        Span::styled(" Enter to send ", Style::default().fg(Color::Green))
    } else {
        Span::styled(" Enter to send ", Style::default().fg(Color::DarkGray))
    };

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Message ")
        .title(Line::from(send_hint).alignment(Alignment::Right));

    let input = app.chat.input();

    if input.text().is_empty() {
        let placeholder = Paragraph::new(Span::styled(
            "Ask about skills, projects...",
            Style::default().fg(Color::DarkGray),
        ))
        .block(input_block);
        frame.render_widget(placeholder, area);
    } else {
        // Calculate visible portion of input with horizontal scrolling
        // Inner width = total width - 2 (for borders)
        let inner_width = area.width.saturating_sub(2) as usize;
        let cursor_pos = input.cursor();

        // Calculate scroll offset to keep cursor visible
        let scroll_offset = if inner_width == 0 {
            0
        } else if cursor_pos >= inner_width {
            cursor_pos - inner_width + 1
        } else {
            0
        };

        let visible_text: String = input
            .text()
            .chars()
            .skip(scroll_offset)
            .take(inner_width)
            .collect();

        let paragraph = Paragraph::new(visible_text)
            .style(Style::default().fg(Color::Cyan))
            .block(input_block);
        frame.render_widget(paragraph, area);
    }

    // Show cursor when the input has focus
    if app.input_focused {
        let inner_width = area.width.saturating_sub(2) as usize;
        let cursor_pos = input.cursor();
        let visible_cursor = cursor_pos.min(inner_width.saturating_sub(1));
        frame.set_cursor_position((area.x + visible_cursor as u16 + 1, area.y + 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::tests::test_app;
    use ratatui::{backend::TestBackend, Terminal};

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn bold_markdown_is_styled() {
        let line = parse_markdown_line("Knows **Rust** and **Go**!");
        assert_eq!(line_text(&line), "Knows Rust and Go!");
        assert!(line.spans[1].style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(line.spans[1].content, "Rust");
    }

    #[test]
    fn unclosed_bold_is_literal() {
        let line = parse_markdown_line("a **b");
        assert_eq!(line_text(&line), "a **b");
    }

    #[tokio::test]
    async fn home_page_shows_owner_and_launcher() {
        let mut app = test_app(false);
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();

        terminal.draw(|f| render(&mut app, f)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Shreyas Kapale"));
        assert!(text.contains("Ask me"));
        assert!(app.launcher_area.is_some());
        assert!(app.chat_area.is_none());
    }

    #[tokio::test]
    async fn open_panel_shows_greeting_and_suggestions() {
        let mut app = test_app(false);
        app.open_chat();
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();

        terminal.draw(|f| render(&mut app, f)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Ask me about Shreyas"));
        assert!(text.contains("Try asking:"));
        assert!(text.contains("Ask about skills, projects..."));
        assert!(app.suggestions_area.is_some());
        assert!(app.chat_height > 0);
    }

    #[tokio::test]
    async fn pending_request_shows_typing_indicator() {
        let mut app = test_app(false);
        app.open_chat();
        app.chat.begin_submit("skills?");
        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();

        terminal.draw(|f| render(&mut app, f)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("sending..."));
        assert!(!text.contains("Try asking:"));
        assert!(app.suggestions_area.is_none());
    }

    #[tokio::test]
    async fn cursor_stays_on_screen_in_tiny_terminal() {
        let mut app = test_app(false);
        app.open_chat();
        app.input_focused = true;
        app.chat.input_mut().insert_str(&"x".repeat(100));
        let mut terminal = Terminal::new(TestBackend::new(4, 8)).unwrap();

        terminal.draw(|f| render(&mut app, f)).unwrap();

        let cursor = terminal.get_cursor_position().unwrap();
        assert!(cursor.x < 4);
    }

    #[tokio::test]
    async fn dashboard_renders_sections() {
        let mut app = test_app(false);
        app.screen = Screen::Dashboard;
        let mut terminal = Terminal::new(TestBackend::new(140, 40)).unwrap();

        terminal.draw(|f| render(&mut app, f)).unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Recent Projects"));
        assert!(text.contains("Overview"));
        assert!(text.contains("Technical Skills"));
        assert!(text.contains("Projects Completed"));
    }
}
