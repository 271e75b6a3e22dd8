use std::time::Instant;

use crate::application::{
    App, CardView, ConnectionsView, FeedView, NoticeLevel, PageButton, ReviewView, Screen, Snapshot,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Tabs, Wrap},
    Frame,
};

/// How many cards of the deck are drawn (and so hold a swipe trigger).
pub const DECK_DEPTH: usize = 3;

const NO_PHOTO: &str = "(no photo)";

pub fn render_ui(f: &mut Frame, app: &App, snapshot: &Snapshot) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_tabs(f, app, chunks[0]);
    match app.screen {
        Screen::Feed => render_feed(f, &snapshot.feed, chunks[1]),
        Screen::Requests => render_requests(f, app, &snapshot.requests, &snapshot.pages, chunks[1]),
        Screen::Connections => render_connections(f, &snapshot.connections, chunks[1]),
    }
    render_status_bar(f, app, chunks[2]);
}

fn render_tabs(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<&str> = Screen::ALL.iter().map(|s| s.title()).collect();
    let selected = Screen::ALL.iter().position(|s| *s == app.screen).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .block(Block::default().borders(Borders::ALL).title("matchdeck"))
        .style(Style::default().fg(Color::Gray))
        .highlight_style(Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD));
    f.render_widget(tabs, area);
}

fn render_message(f: &mut Frame, area: Rect, title: &str, text: &str, style: Style) {
    let message = Paragraph::new(text.to_string())
        .alignment(Alignment::Center)
        .style(style)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    f.render_widget(message, area);
}

fn render_feed(f: &mut Frame, view: &FeedView, area: Rect) {
    match view {
        FeedView::Loading => render_message(f, area, "Feed", "Loading users...", Style::default().fg(Color::Magenta)),
        FeedView::Error(message) => render_message(f, area, "Feed", message, Style::default().fg(Color::Red)),
        FeedView::Empty => render_message(f, area, "Feed", "No new users found!", Style::default().fg(Color::Gray)),
        FeedView::Deck(cards) => render_deck(f, cards, area),
    }
}

fn render_deck(f: &mut Frame, cards: &[CardView], area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(3)])
        .split(area);

    if let Some(top) = cards.first() {
        render_card(f, top, chunks[0]);
    }

    let upcoming: Vec<String> = cards
        .iter()
        .skip(1)
        .take(DECK_DEPTH - 1)
        .map(|c| c.candidate.display_name())
        .collect();
    let rest = cards.len().saturating_sub(DECK_DEPTH);
    let mut line = if upcoming.is_empty() {
        "Last card".to_string()
    } else {
        format!("Up next: {}", upcoming.join(", "))
    };
    if rest > 0 {
        line.push_str(&format!(" (+{rest} more)"));
    }
    let footer = Paragraph::new(line).block(Block::default().borders(Borders::ALL).title("Deck"));
    f.render_widget(footer, chunks[1]);
}

fn render_card(f: &mut Frame, card: &CardView, area: Rect) {
    let candidate = &card.candidate;
    let mut lines = vec![
        Line::from(Span::styled(
            candidate.display_name(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    if let Some(subtitle) = candidate.subtitle() {
        lines.push(Line::from(subtitle));
    }
    lines.push(Line::from(Span::styled(
        candidate.photo_url.clone().unwrap_or_else(|| NO_PHOTO.to_string()),
        Style::default().fg(Color::DarkGray),
    )));
    if let Some(about) = &candidate.about {
        lines.push(Line::from(""));
        lines.push(Line::from(about.clone()));
    }
    lines.push(Line::from(""));

    let ignore = if card.buttons.ignored { "Processing..." } else { "[x] Ignore" };
    let interested = if card.buttons.interested { "Processing..." } else { "[i] Interested" };
    lines.push(Line::from(vec![
        Span::styled(ignore, Style::default().fg(Color::Blue)),
        Span::raw("    "),
        Span::styled(interested, Style::default().fg(Color::Magenta)),
    ]));

    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title("Candidate"));
    f.render_widget(widget, area);
}

fn render_requests(f: &mut Frame, app: &App, view: &ReviewView, pages: &[PageButton], area: Rect) {
    let (rows, refreshing, total_items) = match view {
        ReviewView::Loading => {
            return render_message(f, area, "Received Requests", "Loading...", Style::default().fg(Color::Magenta));
        }
        ReviewView::Error(message) => {
            return render_message(f, area, "Received Requests", message, Style::default().fg(Color::Red));
        }
        ReviewView::Empty => {
            return render_message(
                f,
                area,
                "No New Requests",
                "Your received requests list is empty for now.",
                Style::default().fg(Color::Gray),
            );
        }
        ReviewView::List { rows, refreshing, total_items, .. } => (rows, *refreshing, *total_items),
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let marker = if i == app.selected_request { "> " } else { "  " };
            let actions = if row.submitting { "  ..." } else { "  [a] Accept  [r] Reject" };
            let style = if i == app.selected_request {
                Style::default().fg(Color::Magenta)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::styled(format!("{marker}{}", row.request.from_user.display_name()), style),
                Span::styled(" wants to connect with you.", Style::default().fg(Color::DarkGray)),
                Span::raw(actions),
            ]))
        })
        .collect();

    let title = if refreshing {
        format!("Received Requests ({total_items}) - refreshing")
    } else {
        format!("Received Requests ({total_items})")
    };
    f.render_widget(
        List::new(items).block(Block::default().borders(Borders::ALL).title(title)),
        chunks[0],
    );

    let buttons: Vec<Span> = pages
        .iter()
        .map(|page| {
            let style = if page.current {
                Style::default().bg(Color::Magenta).fg(Color::White)
            } else {
                Style::default()
            };
            Span::styled(format!(" {} ", page.number), style)
        })
        .collect();
    let pagination = Paragraph::new(Line::from(buttons))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Pages"));
    f.render_widget(pagination, chunks[1]);
}

fn render_connections(f: &mut Frame, view: &ConnectionsView, area: Rect) {
    let connections = match view {
        ConnectionsView::Loading => {
            return render_message(f, area, "Your Connections", "Loading...", Style::default().fg(Color::Magenta));
        }
        ConnectionsView::Error(message) => {
            return render_message(f, area, "Your Connections", message, Style::default().fg(Color::Red));
        }
        ConnectionsView::Empty => {
            return render_message(
                f,
                area,
                "No Connections Yet",
                "Start exploring and connect with new people!",
                Style::default().fg(Color::Gray),
            );
        }
        ConnectionsView::List(connections) => connections,
    };

    let items: Vec<ListItem> = connections
        .iter()
        .map(|c| {
            let mut spans = vec![Span::styled(c.display_name(), Style::default().add_modifier(Modifier::BOLD))];
            if let (Some(age), Some(gender)) = (c.age, c.gender.as_deref()) {
                spans.push(Span::raw(format!("  {age}, {gender}")));
            }
            spans.push(Span::styled(
                format!("  {}", c.about.as_deref().unwrap_or("No bio available.")),
                Style::default().fg(Color::DarkGray),
            ));
            ListItem::new(Line::from(spans))
        })
        .collect();

    f.render_widget(
        List::new(items).block(Block::default().borders(Borders::ALL).title("Your Connections")),
        area,
    );
}

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let (text, style) = match app.current_notice(Instant::now()) {
        Some(notice) => {
            let color = match notice.level {
                NoticeLevel::Success => Color::Green,
                NoticeLevel::Error => Color::Red,
            };
            (notice.text.clone(), Style::default().fg(color))
        }
        None => (help_line(app.screen).to_string(), Style::default()),
    };

    let status = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(style);
    f.render_widget(status, area);
}

fn help_line(screen: Screen) -> &'static str {
    match screen {
        Screen::Feed => "←/→: swipe | x: ignore | i: interested | Tab: next screen | q: quit",
        Screen::Requests => "↑↓: select | a: accept | r: reject | n/p or 1-9: page | Tab: next screen | q: quit",
        Screen::Connections => "Tab: next screen | q: quit",
    }
}
