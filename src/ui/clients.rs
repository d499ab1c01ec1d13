use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Spans,
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};
use uuid::Uuid;

use super::{centered_rect, edit_text, render_error, render_navbar, View};
use crate::models::{Client, ClientStatus};

/// Clients matching a free-text query on name, location or phone and an
/// optional exact status.
pub fn filter_clients<'a>(
    clients: &'a [Client],
    query: &str,
    status: Option<ClientStatus>,
) -> Vec<&'a Client> {
    let query = query.trim().to_lowercase();

    clients
        .iter()
        .filter(|client| status.map_or(true, |status| client.status == status))
        .filter(|client| {
            query.is_empty()
                || [
                    Some(client.name.as_str()),
                    client.location.as_deref(),
                    client.phone.as_deref(),
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&query))
        })
        .collect()
}

// Represents the state of the clients table
pub struct ClientsState {
    clients: Vec<Client>,
    table_state: TableState,
    query: String,
    status_filter: Option<ClientStatus>,
    searching: bool,
    show_delete_confirmation: bool,
    loading: bool,
    error: Option<String>,
}

pub enum ClientAction {
    Quit,
    SwitchView,
    Refresh,
    NewClient,
    EditClient(Uuid),
    DeleteClient(Uuid),
}

impl ClientsState {
    pub fn new() -> Self {
        Self {
            clients: Vec::new(),
            table_state: TableState::default(),
            query: String::new(),
            status_filter: None,
            searching: false,
            show_delete_confirmation: false,
            loading: true,
            error: None,
        }
    }

    pub fn set_clients(&mut self, clients: Vec<Client>) {
        self.clients = clients;
        self.loading = false;
        self.error = None;
        self.clamp_selection();
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.error = Some(message.into());
    }

    /// Rows currently shown, after search and status filtering
    pub fn visible(&self) -> Vec<&Client> {
        filter_clients(&self.clients, &self.query, self.status_filter)
    }

    // Merge server responses into the local list without refetching

    pub fn apply_created(&mut self, client: Client) {
        self.clients.push(client);
        self.error = None;
        self.clamp_selection();
    }

    pub fn apply_updated(&mut self, client: Client) {
        match self.clients.iter_mut().find(|c| c.id == client.id) {
            Some(existing) => *existing = client,
            None => self.clients.push(client),
        }
        self.error = None;
        self.clamp_selection();
    }

    pub fn apply_deleted(&mut self, id: Uuid) {
        self.clients.retain(|c| c.id != id);
        self.error = None;
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        let selected = match self.table_state.selected() {
            _ if len == 0 => None,
            Some(i) => Some(i.min(len - 1)),
            None => Some(0),
        };
        self.table_state.select(selected);
    }

    fn reset_selection(&mut self) {
        self.table_state.select(None);
        self.clamp_selection();
    }

    pub fn cycle_status_filter(&mut self) {
        self.status_filter = match self.status_filter {
            None => Some(ClientStatus::Started),
            Some(ClientStatus::Closed) => None,
            Some(status) => Some(status.next()),
        };
        self.reset_selection();
    }

    pub fn clear_filters(&mut self) {
        self.query.clear();
        self.status_filter = None;
        self.reset_selection();
    }

    pub fn next(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }

        let i = match self.table_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.visible().len();
        if len == 0 {
            return;
        }

        let i = match self.table_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    pub fn toggle_delete_confirmation(&mut self) {
        self.show_delete_confirmation = !self.show_delete_confirmation;
    }

    pub fn selected_client(&self) -> Option<&Client> {
        self.table_state
            .selected()
            .and_then(|i| self.visible().get(i).copied())
    }

    pub fn selected_client_id(&self) -> Option<Uuid> {
        self.selected_client().map(|c| c.id)
    }
}

impl Default for ClientsState {
    fn default() -> Self {
        Self::new()
    }
}

fn status_color(status: ClientStatus) -> Color {
    match status {
        ClientStatus::Started => Color::Yellow,
        ClientStatus::Ongoing => Color::Green,
        ClientStatus::Closed => Color::Gray,
    }
}

pub fn render_clients<B: Backend>(frame: &mut Frame<B>, state: &mut ClientsState) {
    let size = frame.size();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(1),
                Constraint::Length(2),
            ]
            .as_ref(),
        )
        .split(size);

    render_navbar(frame, chunks[0], View::Clients);

    let filter_text = format!(
        "Search: {}{}   Status: {}",
        state.query,
        if state.searching { "|" } else { "" },
        state
            .status_filter
            .map_or("all".to_string(), |s| s.to_string()),
    );
    let filter_style = if state.searching {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let filters = Paragraph::new(filter_text)
        .style(filter_style)
        .block(Block::default().title("Filter").borders(Borders::ALL));
    frame.render_widget(filters, chunks[1]);

    if state.loading {
        let loading = Paragraph::new("Loading...")
            .block(Block::default().title("Clients").borders(Borders::ALL));
        frame.render_widget(loading, chunks[2]);
    } else {
        let header = Row::new(vec![
            "Name",
            "Phone",
            "Location",
            "First visit",
            "Next visit",
            "Amount",
            "Status",
        ])
        .style(Style::default().add_modifier(Modifier::BOLD))
        .bottom_margin(1);

        let rows: Vec<Row> = state
            .visible()
            .into_iter()
            .map(|client| {
                Row::new(vec![
                    Cell::from(client.name.clone()),
                    Cell::from(client.phone.clone().unwrap_or_default()),
                    Cell::from(client.location.clone().unwrap_or_default()),
                    Cell::from(
                        client
                            .first_visit
                            .map(|d| d.to_string())
                            .unwrap_or_default(),
                    ),
                    Cell::from(
                        client
                            .next_visit
                            .map(|d| d.to_string())
                            .unwrap_or_default(),
                    ),
                    Cell::from(
                        client
                            .amount
                            .map(|a| format!("{a:.2}"))
                            .unwrap_or_default(),
                    ),
                    Cell::from(client.status.to_string())
                        .style(Style::default().fg(status_color(client.status))),
                ])
            })
            .collect();

        let title = format!("Clients ({}/{})", rows.len(), state.clients.len());
        let table = Table::new(rows)
            .header(header)
            .block(Block::default().title(title).borders(Borders::ALL))
            .widths(&[
                Constraint::Percentage(20),
                Constraint::Percentage(14),
                Constraint::Percentage(16),
                Constraint::Percentage(12),
                Constraint::Percentage(12),
                Constraint::Percentage(12),
                Constraint::Percentage(14),
            ])
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            );

        frame.render_stateful_widget(table, chunks[2], &mut state.table_state);
    }

    render_error(frame, chunks[3], state.error.as_deref());

    let buttons_text = if state.searching {
        "Type to search | <Enter> Done | <Esc> Clear search"
    } else if state.selected_client().is_some() {
        "<N> Add | <E> Edit | <D> Delete | </> Search | <F> Status | <C> Clear | <R> Refresh | <Tab> Prospects | <Q> Quit"
    } else {
        "<N> Add | </> Search | <F> Status | <C> Clear | <R> Refresh | <Tab> Prospects | <Q> Quit"
    };

    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));

    frame.render_widget(buttons, chunks[4]);

    if state.show_delete_confirmation {
        let name = state
            .selected_client()
            .map(|c| c.name.clone())
            .unwrap_or_default();
        render_delete_confirmation(frame, size, &name);
    }
}

fn render_delete_confirmation<B: Backend>(frame: &mut Frame<B>, size: Rect, name: &str) {
    let popup_area = centered_rect(50, 20, size);

    let popup = Paragraph::new(vec![
        Spans::from(""),
        Spans::from(format!("Delete client \"{name}\"?")),
        Spans::from(""),
        Spans::from("<Y> Yes  <N> No"),
    ])
    .block(Block::default().title("Confirm Delete").borders(Borders::ALL))
    .style(Style::default().fg(Color::White).bg(Color::Black));

    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup, popup_area);
}

pub fn handle_input(state: &mut ClientsState) -> Result<Option<ClientAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }
    Ok(None)
}

pub fn handle_key(state: &mut ClientsState, key: KeyCode) -> Option<ClientAction> {
    if state.searching {
        match key {
            KeyCode::Enter => state.searching = false,
            KeyCode::Esc => {
                state.searching = false;
                state.query.clear();
                state.reset_selection();
            }
            _ => {
                edit_text(&mut state.query, key);
                state.reset_selection();
            }
        }
        return None;
    }

    if state.show_delete_confirmation {
        match key {
            KeyCode::Char('y') => {
                state.toggle_delete_confirmation();
                return state.selected_client_id().map(ClientAction::DeleteClient);
            }
            KeyCode::Char('n') | KeyCode::Esc => state.toggle_delete_confirmation(),
            _ => {}
        }
        return None;
    }

    match key {
        KeyCode::Char('q') => return Some(ClientAction::Quit),
        KeyCode::Tab => return Some(ClientAction::SwitchView),
        KeyCode::Char('r') => return Some(ClientAction::Refresh),
        KeyCode::Char('n') => return Some(ClientAction::NewClient),
        KeyCode::Char('e') => return state.selected_client_id().map(ClientAction::EditClient),
        KeyCode::Char('d') => {
            if state.selected_client().is_some() {
                state.toggle_delete_confirmation();
            }
        }
        KeyCode::Char('/') => state.searching = true,
        KeyCode::Char('f') => state.cycle_status_filter(),
        KeyCode::Char('c') | KeyCode::Esc => state.clear_filters(),
        KeyCode::Down => state.next(),
        KeyCode::Up => state.previous(),
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn client(name: &str, location: &str, phone: &str, status: ClientStatus) -> Client {
        let now = Utc::now();
        Client {
            id: Uuid::new_v4(),
            name: name.into(),
            first_visit: None,
            next_visit: None,
            amount: None,
            phone: Some(phone.into()),
            location: Some(location.into()),
            status,
            created_at: now,
            updated_at: now,
        }
    }

    fn sample() -> Vec<Client> {
        vec![
            client("Abebe Kebede", "Bole", "0911111111", ClientStatus::Started),
            client("Sara Tesfaye", "Piassa", "0922222222", ClientStatus::Ongoing),
            client("Dawit Alemu", "Bole Bulbula", "0933333333", ClientStatus::Closed),
        ]
    }

    fn names(clients: Vec<&Client>) -> Vec<&str> {
        clients.into_iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_search_matches_name_location_and_phone() {
        let clients = sample();
        assert_eq!(
            names(filter_clients(&clients, "bole", None)),
            vec!["Abebe Kebede", "Dawit Alemu"]
        );
        assert_eq!(
            names(filter_clients(&clients, "SARA", None)),
            vec!["Sara Tesfaye"]
        );
        assert_eq!(
            names(filter_clients(&clients, "0933", None)),
            vec!["Dawit Alemu"]
        );
        assert_eq!(filter_clients(&clients, "", None).len(), 3);
    }

    #[test]
    fn test_status_filter_combines_with_search() {
        let clients = sample();
        assert_eq!(
            names(filter_clients(&clients, "bole", Some(ClientStatus::Closed))),
            vec!["Dawit Alemu"]
        );
        assert!(filter_clients(&clients, "sara", Some(ClientStatus::Started)).is_empty());
    }

    #[test]
    fn test_clients_without_optional_fields_still_match_by_name() {
        let mut bare = client("Hanna", "", "", ClientStatus::Started);
        bare.location = None;
        bare.phone = None;
        let clients = vec![bare];
        assert_eq!(filter_clients(&clients, "han", None).len(), 1);
        assert!(filter_clients(&clients, "bole", None).is_empty());
    }

    #[test]
    fn test_optimistic_merges() {
        let mut state = ClientsState::new();
        state.set_clients(sample());

        let extra = client("Meron", "Kazanchis", "0944444444", ClientStatus::Started);
        let extra_id = extra.id;
        state.apply_created(extra.clone());
        assert_eq!(state.clients.len(), 4);

        let mut changed = extra;
        changed.status = ClientStatus::Ongoing;
        state.apply_updated(changed);
        let merged = state.clients.iter().find(|c| c.id == extra_id).unwrap();
        assert_eq!(merged.status, ClientStatus::Ongoing);
        assert_eq!(state.clients.len(), 4);

        state.apply_deleted(extra_id);
        assert_eq!(state.clients.len(), 3);
        assert!(state.clients.iter().all(|c| c.id != extra_id));
    }

    #[test]
    fn test_selection_follows_visible_rows() {
        let mut state = ClientsState::new();
        state.set_clients(sample());
        state.next();
        assert_eq!(state.selected_client().unwrap().name, "Sara Tesfaye");

        handle_key(&mut state, KeyCode::Char('f'));
        assert_eq!(state.status_filter, Some(ClientStatus::Started));
        assert_eq!(state.selected_client().unwrap().name, "Abebe Kebede");

        handle_key(&mut state, KeyCode::Char('c'));
        assert_eq!(state.visible().len(), 3);
    }

    #[test]
    fn test_search_mode_captures_keys() {
        let mut state = ClientsState::new();
        state.set_clients(sample());

        handle_key(&mut state, KeyCode::Char('/'));
        for c in "piassa".chars() {
            assert!(handle_key(&mut state, KeyCode::Char(c)).is_none());
        }
        handle_key(&mut state, KeyCode::Enter);
        assert_eq!(names(state.visible()), vec!["Sara Tesfaye"]);
        assert_eq!(state.selected_client().unwrap().name, "Sara Tesfaye");

        // 'q' quits again once search mode is left
        assert!(matches!(
            handle_key(&mut state, KeyCode::Char('q')),
            Some(ClientAction::Quit)
        ));
    }

    #[test]
    fn test_delete_needs_confirmation() {
        let mut state = ClientsState::new();
        state.set_clients(sample());
        let first = state.selected_client_id().unwrap();

        assert!(handle_key(&mut state, KeyCode::Char('d')).is_none());
        assert!(handle_key(&mut state, KeyCode::Char('n')).is_none());
        assert!(!state.show_delete_confirmation);

        handle_key(&mut state, KeyCode::Char('d'));
        match handle_key(&mut state, KeyCode::Char('y')) {
            Some(ClientAction::DeleteClient(id)) => assert_eq!(id, first),
            _ => panic!("expected a delete action"),
        }
    }

    #[test]
    fn test_status_filter_cycles_back_to_all() {
        let mut state = ClientsState::new();
        for expected in [
            Some(ClientStatus::Started),
            Some(ClientStatus::Ongoing),
            Some(ClientStatus::Closed),
            None,
        ] {
            state.cycle_status_filter();
            assert_eq!(state.status_filter, expected);
        }
    }
}
