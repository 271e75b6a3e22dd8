use crate::application::{App, Command, FeedView, ReviewView, Screen, Snapshot};
use crate::domain::{FeedDecision, ReviewDecision, SwipeDirection};
use crossterm::event::{KeyCode, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    /// Maps a key press to the commands it asks for. Pure UI moves (selection,
    /// screen switches, quitting) are applied to `app` directly.
    pub fn handle_key_event(app: &mut App, snapshot: &Snapshot, key: KeyCode, modifiers: KeyModifiers) -> Vec<Command> {
        if modifiers.contains(KeyModifiers::CONTROL) && key == KeyCode::Char('c') {
            app.should_quit = true;
            return Vec::new();
        }

        match key {
            KeyCode::Char('q') => {
                app.should_quit = true;
                return Vec::new();
            }
            KeyCode::Tab => return app.switch_to(app.screen.next()),
            KeyCode::BackTab => return app.switch_to(app.screen.next().next()),
            _ => {}
        }

        match app.screen {
            Screen::Feed => Self::handle_feed(snapshot, key),
            Screen::Requests => Self::handle_requests(app, snapshot, key),
            Screen::Connections => Vec::new(),
        }
    }

    fn handle_feed(snapshot: &Snapshot, key: KeyCode) -> Vec<Command> {
        let FeedView::Deck(cards) = &snapshot.feed else {
            return Vec::new();
        };
        let Some(top) = cards.first() else {
            return Vec::new();
        };
        let candidate_id = top.candidate.id.clone();

        let swipe = |direction| vec![Command::Swipe { candidate_id: candidate_id.clone(), direction }];
        let press = |decision| vec![Command::Press { candidate_id: candidate_id.clone(), decision }];

        match key {
            KeyCode::Left | KeyCode::Char('h') => swipe(SwipeDirection::Left),
            KeyCode::Right | KeyCode::Char('l') => swipe(SwipeDirection::Right),
            KeyCode::Up | KeyCode::Char('k') => swipe(SwipeDirection::Up),
            KeyCode::Down | KeyCode::Char('j') => swipe(SwipeDirection::Down),
            KeyCode::Char('x') => press(FeedDecision::Ignored),
            KeyCode::Char('i') => press(FeedDecision::Interested),
            _ => Vec::new(),
        }
    }

    fn handle_requests(app: &mut App, snapshot: &Snapshot, key: KeyCode) -> Vec<Command> {
        let ReviewView::List { rows, current_page, total_pages, .. } = &snapshot.requests else {
            return Vec::new();
        };
        app.clamp_selection(rows.len());

        let selected = app.selected_request;
        let review = |decision| -> Vec<Command> {
            rows.get(selected)
                .filter(|row| !row.submitting)
                .map(|row| Command::Review { request_id: row.request.id.clone(), decision })
                .into_iter()
                .collect()
        };

        match key {
            KeyCode::Up | KeyCode::Char('k') => {
                app.select_previous_request();
                Vec::new()
            }
            KeyCode::Down | KeyCode::Char('j') => {
                app.select_next_request(rows.len());
                Vec::new()
            }
            KeyCode::Char('a') => review(ReviewDecision::Accepted),
            KeyCode::Char('r') => review(ReviewDecision::Rejected),
            KeyCode::Right | KeyCode::Char('n') if current_page < total_pages => {
                vec![Command::GoToPage(current_page + 1)]
            }
            KeyCode::Left | KeyCode::Char('p') if *current_page > 1 => {
                vec![Command::GoToPage(current_page - 1)]
            }
            KeyCode::Char(c) if c.is_ascii_digit() => match c.to_digit(10) {
                Some(page) if page >= 1 && page <= *total_pages && page != *current_page => {
                    vec![Command::GoToPage(page)]
                }
                _ => Vec::new(),
            },
            _ => Vec::new(),
        }
    }
}
