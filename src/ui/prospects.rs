use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};
use uuid::Uuid;

use super::{render_error, render_navbar, View};
use crate::models::Prospect;

// Represents the state of the prospects table
pub struct ProspectsState {
    prospects: Vec<Prospect>,
    table_state: TableState,
    loading: bool,
    error: Option<String>,
}

pub enum ProspectAction {
    Quit,
    SwitchView,
    Refresh,
    NewProspect,
    EditProspect(Uuid),
    DeleteProspect(Uuid),
}

impl ProspectsState {
    pub fn new() -> Self {
        Self {
            prospects: Vec::new(),
            table_state: TableState::default(),
            loading: true,
            error: None,
        }
    }

    /// Replace the table contents with a fresh fetch
    pub fn set_prospects(&mut self, prospects: Vec<Prospect>) {
        self.prospects = prospects;
        self.loading = false;
        self.error = None;

        let selected = match self.table_state.selected() {
            _ if self.prospects.is_empty() => None,
            Some(i) => Some(i.min(self.prospects.len() - 1)),
            None => Some(0),
        };
        self.table_state.select(selected);
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }

    pub fn next(&mut self) {
        if self.prospects.is_empty() {
            return;
        }

        let i = match self.table_state.selected() {
            Some(i) if i + 1 < self.prospects.len() => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.prospects.is_empty() {
            return;
        }

        let i = match self.table_state.selected() {
            Some(0) | None => self.prospects.len() - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    pub fn selected_prospect(&self) -> Option<&Prospect> {
        self.table_state
            .selected()
            .and_then(|i| self.prospects.get(i))
    }

    pub fn selected_prospect_id(&self) -> Option<Uuid> {
        self.selected_prospect().map(|p| p.id)
    }
}

impl Default for ProspectsState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_prospects<B: Backend>(frame: &mut Frame<B>, state: &mut ProspectsState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(2),
            ]
            .as_ref(),
        )
        .split(frame.size());

    render_navbar(frame, chunks[0], View::Prospects);

    if state.loading {
        let loading = Paragraph::new("Loading...")
            .block(Block::default().title("Prospects").borders(Borders::ALL));
        frame.render_widget(loading, chunks[1]);
    } else {
        let header = Row::new(vec!["Name", "Place", "Location"])
            .style(Style::default().add_modifier(Modifier::BOLD))
            .bottom_margin(1);

        let rows: Vec<Row> = state
            .prospects
            .iter()
            .map(|prospect| {
                Row::new(vec![
                    Cell::from(prospect.name.as_str()),
                    Cell::from(prospect.place.as_str()),
                    Cell::from(prospect.location.as_deref().unwrap_or("")),
                ])
            })
            .collect();

        let table = Table::new(rows)
            .header(header)
            .block(Block::default().title("Prospects").borders(Borders::ALL))
            .widths(&[
                Constraint::Percentage(40),
                Constraint::Percentage(30),
                Constraint::Percentage(30),
            ])
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            );

        frame.render_stateful_widget(table, chunks[1], &mut state.table_state);
    }

    render_error(frame, chunks[2], state.error.as_deref());

    let buttons_text = if state.selected_prospect().is_some() {
        "<N> Add | <E> Edit | <D> Delete | <R> Refresh | <Tab> Clients | <Q> Quit"
    } else {
        "<N> Add | <R> Refresh | <Tab> Clients | <Q> Quit"
    };

    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));

    frame.render_widget(buttons, chunks[3]);
}

pub fn handle_input(state: &mut ProspectsState) -> Result<Option<ProspectAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }
    Ok(None)
}

pub fn handle_key(state: &mut ProspectsState, key: KeyCode) -> Option<ProspectAction> {
    match key {
        KeyCode::Char('q') | KeyCode::Esc => Some(ProspectAction::Quit),
        KeyCode::Tab => Some(ProspectAction::SwitchView),
        KeyCode::Char('r') => Some(ProspectAction::Refresh),
        KeyCode::Char('n') => Some(ProspectAction::NewProspect),
        KeyCode::Char('e') => state
            .selected_prospect_id()
            .map(ProspectAction::EditProspect),
        KeyCode::Char('d') => state
            .selected_prospect_id()
            .map(ProspectAction::DeleteProspect),
        KeyCode::Down => {
            state.next();
            None
        }
        KeyCode::Up => {
            state.previous();
            None
        }
        _ => None,
    }
}
