use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
};
use unicode_width::UnicodeWidthChar;
use crate::app::App;
use crate::chat::{ChatSession, Sender};
use crate::pages::{self, format_usd};
use crate::router::Route;

const ACCENT: Color = Color::Red;

/// Parse a line of text and convert **bold** markdown to styled spans
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = text.chars().peekable();
    let mut current_text = String::new();

    while let Some(c) = chars.next() {
        if c == '*' && chars.peek() == Some(&'*') {
            chars.next();

            if !current_text.is_empty() {
                spans.push(Span::raw(std::mem::take(&mut current_text)));
            }

            // Find closing **
            let mut bold_text = String::new();
            let mut found_close = false;
            while let Some(c) = chars.next() {
                if c == '*' && chars.peek() == Some(&'*') {
                    chars.next();
                    found_close = true;
                    break;
                }
                bold_text.push(c);
            }

            if found_close && !bold_text.is_empty() {
                spans.push(Span::styled(
                    bold_text,
                    Style::default().add_modifier(Modifier::BOLD),
                ));
            } else {
                // No closing **, treat as literal
                current_text.push_str("**");
                current_text.push_str(&bold_text);
            }
        } else {
            current_text.push(c);
        }
    }

    if !current_text.is_empty() {
        spans.push(Span::raw(current_text));
    }

    Line::from(spans)
}

/// Rows past the bottom of `area` once `paragraph` is wrapped to its width.
fn max_scroll(paragraph: &Paragraph, area: Rect) -> u16 {
    let rows = paragraph.line_count(area.width);
    u16::try_from(rows).unwrap_or(u16::MAX).saturating_sub(area.height)
}

/// The slice of `input` that fits in `width` cells with the cursor (a char
/// index) kept on screen, and the cursor's cell column within that slice.
fn input_viewport(input: &str, cursor: usize, width: usize) -> (String, u16) {
    if width == 0 {
        return (String::new(), 0);
    }
    let chars: Vec<char> = input.chars().collect();
    let cursor = cursor.min(chars.len());

    // Leave one cell for the cursor itself
    let mut start = cursor;
    let mut before = 0;
    while start > 0 {
        let w = chars[start - 1].width().unwrap_or(0);
        if before + w > width - 1 {
            break;
        }
        before += w;
        start -= 1;
    }

    let mut used = 0;
    let visible: String = chars[start..]
        .iter()
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= width
        })
        .collect();

    (visible, before as u16)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, navigation, page, footer
    let [header_area, nav_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(frame, header_area);
    render_navigation(app, frame, nav_area);
    render_page(app, frame, body_area);
    render_footer(app, frame, footer_area);

    if app.is_chat_open() {
        render_chat(app, frame, body_area);
    }
}

fn render_header(frame: &mut Frame, area: Rect) {
    let title = Line::from(vec![
        Span::styled(format!(" {} ", pages::UNIVERSITY), Style::default().fg(Color::White).bold()),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(ACCENT));
    frame.render_widget(header, area);
}

fn render_navigation(app: &App, frame: &mut Frame, area: Rect) {
    let titles: Vec<Line> = Route::ALL
        .iter()
        .enumerate()
        .map(|(i, route)| Line::from(format!("{} {}", i + 1, route.title())))
        .collect();

    let tabs = Tabs::new(titles)
        .select(app.route.index())
        .style(Style::default().fg(Color::White).bg(Color::DarkGray))
        .highlight_style(Style::default().fg(Color::White).bg(ACCENT).add_modifier(Modifier::BOLD))
        .divider(" ");

    frame.render_widget(tabs, area);
}

fn heading(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
}

fn section_title(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        text.to_string(),
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    ))
}

fn button(text: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("[ {} ]", text),
        Style::default().fg(Color::White).bg(ACCENT).add_modifier(Modifier::BOLD),
    ))
    .alignment(Alignment::Center)
}

fn home_lines() -> Vec<Line<'static>> {
    vec![
        Line::default(),
        Line::default(),
        heading(pages::HOME_HEADLINE),
        Line::default(),
        Line::from(pages::HOME_TAGLINE).alignment(Alignment::Center),
        Line::default(),
        Line::default(),
        button(pages::HOME_CHAT_BUTTON),
        Line::from(Span::styled("press c or Enter", Style::default().fg(Color::DarkGray)))
            .alignment(Alignment::Center),
    ]
}

fn requirements_lines() -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::default(),
        heading(pages::REQUIREMENTS_HEADING),
        Line::default(),
        Line::from(pages::REQUIREMENTS_INTRO),
        Line::default(),
    ];

    for section in pages::REQUIREMENT_SECTIONS {
        lines.push(section_title(section.title));
        for item in section.items {
            lines.push(Line::from(format!("  • {}", item)));
        }
        lines.push(Line::default());
    }

    lines.push(
        Line::from(Span::styled(pages::REQUIREMENTS_OUTRO, Style::default().fg(Color::Gray)))
            .alignment(Alignment::Center),
    );
    lines
}

fn tuition_row(cells: [&str; 4]) -> String {
    format!("  {:<22}{:>10}{:>10}{:>18}", cells[0], cells[1], cells[2], cells[3])
}

fn tuition_lines() -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::default(),
        heading(pages::TUITION_HEADING),
        Line::default(),
        Line::from(pages::TUITION_INTRO),
        Line::default(),
        section_title(pages::TUITION_TABLE_TITLE),
        Line::from(Span::styled(
            tuition_row(pages::TUITION_COLUMNS).to_uppercase(),
            Style::default().fg(Color::Gray).add_modifier(Modifier::BOLD),
        )),
        Line::from(format!("  {}", "─".repeat(60))),
    ];

    for row in pages::TUITION_ROWS {
        let tuition = format_usd(row.tuition);
        let fees = format_usd(row.fees);
        let total = format_usd(row.total());
        lines.push(Line::from(vec![
            Span::raw(format!("  {:<22}{:>10}{:>10}", row.program, tuition, fees)),
            Span::styled(format!("{:>18}", total), Style::default().add_modifier(Modifier::BOLD)),
        ]));
    }

    lines.extend([
        Line::default(),
        Line::from(Span::styled(pages::TUITION_NOTE, Style::default().fg(Color::DarkGray))),
        Line::default(),
        section_title(pages::AID_TITLE),
    ]);

    for option in pages::AID_OPTIONS {
        lines.push(Line::from(Span::styled(
            format!("  ■ {}", option.title),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(format!("    {}", option.description)));
    }

    lines.extend([
        Line::default(),
        Line::from(Span::styled(pages::AID_OUTRO, Style::default().fg(Color::Gray)))
            .alignment(Alignment::Center),
        Line::default(),
        button(pages::AID_PORTAL_BUTTON),
    ]);
    lines
}

fn page_lines(route: Route) -> Vec<Line<'static>> {
    match route {
        Route::Home => home_lines(),
        Route::Requirements => requirements_lines(),
        Route::Tuition => tuition_lines(),
    }
}

fn render_page(app: &mut App, frame: &mut Frame, area: Rect) {
    let lines = page_lines(app.route);

    let page = Paragraph::new(lines).wrap(Wrap { trim: false });

    app.page_area = Some(area);
    app.page_height = area.height;
    app.page_max_scroll = max_scroll(&page, area);
    app.page_scroll = app.page_scroll.min(app.page_max_scroll);

    let page = page.scroll((app.page_scroll, 0));

    frame.render_widget(page, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = if app.is_chat_open() {
        Style::default().bg(Color::Yellow).fg(Color::Black)
    } else {
        Style::default().bg(Color::Blue).fg(Color::White)
    };

    let mode_text = if app.is_chat_open() {
        " CHAT ".to_string()
    } else {
        format!(" {} ", app.route.path())
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hints = if app.is_chat_open() {
        vec![
            Span::styled(" Enter ", key_style),
            Span::styled(" send ", label_style),
            Span::styled(" ↑/↓ ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" Esc ", key_style),
            Span::styled(" close ", label_style),
        ]
    } else {
        vec![
            Span::styled(" 1-3/Tab ", key_style),
            Span::styled(" page ", label_style),
            Span::styled(" j/k ", key_style),
            Span::styled(" scroll ", label_style),
            Span::styled(" c ", key_style),
            Span::styled(" chat ", label_style),
            Span::styled(" q ", key_style),
            Span::styled(" quit ", label_style),
        ]
    };

    let footer_content = Line::from(
        vec![
            Span::styled(mode_text, mode_style),
            Span::styled(" ", label_style),
        ]
        .into_iter()
        .chain(hints)
        .collect::<Vec<_>>(),
    );

    let footer = Paragraph::new(footer_content).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

/// Bottom-right corner of `area`, like a floating chat bubble.
fn chat_popup_area(area: Rect) -> Rect {
    let width = 60.min(area.width.saturating_sub(2));
    let height = 24.min(area.height);
    let x = area.x + area.width.saturating_sub(width + 1);
    let y = area.y + area.height.saturating_sub(height);
    Rect::new(x, y, width, height)
}

fn transcript_lines(chat: &ChatSession, animation_frame: u8) -> Vec<Line<'static>> {
    if chat.messages().is_empty() && !chat.is_pending() {
        return vec![
            Line::default(),
            Line::default(),
            Line::from(Span::styled(
                "How can I help you today about Coding University?",
                Style::default().fg(Color::DarkGray),
            ))
            .alignment(Alignment::Center),
        ];
    }

    let user_label = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let bot_label = Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = Vec::new();
    for msg in chat.messages() {
        match msg.sender {
            Sender::User => {
                lines.push(Line::from(Span::styled("You", user_label)).alignment(Alignment::Right));
                for line in msg.text.lines() {
                    lines.push(
                        Line::from(Span::styled(line.to_string(), Style::default().fg(Color::Cyan)))
                            .alignment(Alignment::Right),
                    );
                }
            }
            Sender::Bot => {
                lines.push(Line::from(Span::styled("Bot", bot_label)));
                for line in msg.text.lines() {
                    lines.push(parse_markdown_line(line));
                }
            }
        }
        lines.push(Line::default());
    }

    if chat.is_pending() {
        lines.push(Line::from(Span::styled("Bot", bot_label)));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Thinking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let animation_frame = app.animation_frame;
    let Some(chat) = app.chat.as_mut() else {
        return;
    };

    let popup_area = chat_popup_area(area);
    app.chat_area = Some(popup_area);

    // Clear the area behind the popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(Line::from(vec![
            Span::styled(" Coding University Bot ", Style::default().fg(Color::White).bg(ACCENT).bold()),
            Span::styled(format!(" {} ", app.model_name), Style::default().fg(Color::DarkGray)),
        ]));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let [transcript_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
    ])
    .areas(inner);

    let transcript = Paragraph::new(Text::from(transcript_lines(chat, animation_frame)))
        .wrap(Wrap { trim: false });
    chat.max_scroll = max_scroll(&transcript, transcript_area);

    let transcript = transcript.scroll((chat.scroll_offset(), 0));
    frame.render_widget(transcript, transcript_area);

    render_chat_input(chat, frame, input_area);
}

fn render_chat_input(chat: &ChatSession, frame: &mut Frame, area: Rect) {
    let pending = chat.is_pending();

    let input_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if pending { Color::DarkGray } else { Color::Yellow }));

    if pending {
        let waiting = Paragraph::new("Waiting for reply...")
            .style(Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))
            .block(input_block);
        frame.render_widget(waiting, area);
        return;
    }

    // Inner width = total width - 2 (for borders)
    let inner_width = area.width.saturating_sub(2) as usize;
    let (visible_text, cursor_x) = input_viewport(chat.input(), chat.cursor(), inner_width);

    let input = if chat.input().is_empty() {
        Paragraph::new("Ask me about Coding University...")
            .style(Style::default().fg(Color::DarkGray))
    } else {
        Paragraph::new(visible_text).style(Style::default().fg(Color::Cyan))
    };

    frame.render_widget(input.block(input_block), area);
    frame.set_cursor_position((area.x + cursor_x + 1, area.y + 1));
}
