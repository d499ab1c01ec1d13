use anyhow::Result;
use crossterm::event::{self, Event, KeyCode};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use uuid::Uuid;

use super::components::date_input::DateInputState;
use super::{edit_text, non_empty, render_error};
use crate::models::{Client, ClientPatch, ClientStatus, NewClient};

#[derive(Debug, Clone, PartialEq)]
pub enum ClientSubmission {
    Create(NewClient),
    Update(Uuid, ClientPatch),
}

pub enum ClientWizardAction {
    Cancel,
    Save(ClientSubmission),
}

#[derive(Clone, PartialEq, Copy, Debug)]
pub enum ClientField {
    Name,
    Phone,
    Location,
    Amount,
    FirstVisit,
    NextVisit,
    Status,
}

impl ClientField {
    const ORDER: [ClientField; 7] = [
        ClientField::Name,
        ClientField::Phone,
        ClientField::Location,
        ClientField::Amount,
        ClientField::FirstVisit,
        ClientField::NextVisit,
        ClientField::Status,
    ];

    fn label(self) -> &'static str {
        match self {
            ClientField::Name => "Name *",
            ClientField::Phone => "Phone",
            ClientField::Location => "Location",
            ClientField::Amount => "Amount",
            ClientField::FirstVisit => "First visit",
            ClientField::NextVisit => "Next visit",
            ClientField::Status => "Status",
        }
    }

    fn position(self) -> usize {
        Self::ORDER.iter().position(|f| *f == self).unwrap_or(0)
    }
}

pub struct ClientWizardState {
    pub editing_id: Option<Uuid>,
    pub name: String,
    pub phone: String,
    pub location: String,
    pub amount: String,
    pub first_visit: DateInputState,
    pub next_visit: DateInputState,
    pub status: ClientStatus,
    pub current_field: ClientField,
    pub editing: bool,
    pub error: Option<String>,
}

impl ClientWizardState {
    pub fn new() -> Self {
        Self {
            editing_id: None,
            name: String::new(),
            phone: String::new(),
            location: String::new(),
            amount: String::new(),
            first_visit: DateInputState::new(None),
            next_visit: DateInputState::new(None),
            status: ClientStatus::default(),
            current_field: ClientField::Name,
            editing: false,
            error: None,
        }
    }

    pub fn from_existing(client: &Client) -> Self {
        Self {
            editing_id: Some(client.id),
            name: client.name.clone(),
            phone: client.phone.clone().unwrap_or_default(),
            location: client.location.clone().unwrap_or_default(),
            amount: client.amount.map(|a| a.to_string()).unwrap_or_default(),
            first_visit: DateInputState::new(client.first_visit),
            next_visit: DateInputState::new(client.next_visit),
            status: client.status,
            ..Self::new()
        }
    }

    pub fn toggle_editing(&mut self) {
        match self.current_field {
            // Status has no text to edit; Enter cycles it instead
            ClientField::Status => self.status = self.status.next(),
            ClientField::FirstVisit => {
                self.first_visit.toggle_editing();
                self.editing = self.first_visit.editing;
            }
            ClientField::NextVisit => {
                self.next_visit.toggle_editing();
                self.editing = self.next_visit.editing;
            }
            _ => self.editing = !self.editing,
        }
    }

    pub fn next_field(&mut self) {
        let i = (self.current_field.position() + 1) % ClientField::ORDER.len();
        self.current_field = ClientField::ORDER[i];
    }

    pub fn previous_field(&mut self) {
        let len = ClientField::ORDER.len();
        let i = (self.current_field.position() + len - 1) % len;
        self.current_field = ClientField::ORDER[i];
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match self.current_field {
            ClientField::Name => edit_text(&mut self.name, key),
            ClientField::Phone => edit_text(&mut self.phone, key),
            ClientField::Location => edit_text(&mut self.location, key),
            ClientField::Amount => match key {
                KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => self.amount.push(c),
                KeyCode::Backspace => {
                    self.amount.pop();
                }
                _ => {}
            },
            ClientField::FirstVisit => {
                self.first_visit.handle_input(key);
                self.editing = self.first_visit.editing;
            }
            ClientField::NextVisit => {
                self.next_visit.handle_input(key);
                self.editing = self.next_visit.editing;
            }
            ClientField::Status => {}
        }
    }

    fn parsed_amount(&self) -> Result<Option<f64>, String> {
        match non_empty(&self.amount) {
            None => Ok(None),
            Some(raw) => raw
                .parse::<f64>()
                .ok()
                .filter(|a| a.is_finite() && *a >= 0.0)
                .map(Some)
                .ok_or_else(|| format!("Amount `{raw}` is not a valid number")),
        }
    }

    /// The create or update request for the current form, or the reason
    /// the form cannot be saved yet
    pub fn submission(&self) -> Result<ClientSubmission, String> {
        let name = non_empty(&self.name).ok_or_else(|| "Name is required".to_string())?;
        let amount = self.parsed_amount()?;
        let phone = non_empty(&self.phone);
        let location = non_empty(&self.location);
        let first_visit = self.first_visit.date;
        let next_visit = self.next_visit.date;

        // An update sends every field, so blanked fields are cleared
        Ok(match self.editing_id {
            Some(id) => ClientSubmission::Update(
                id,
                ClientPatch {
                    name: Some(name),
                    first_visit: Some(first_visit),
                    next_visit: Some(next_visit),
                    amount: Some(amount),
                    phone: Some(phone),
                    location: Some(location),
                    status: Some(self.status),
                },
            ),
            None => ClientSubmission::Create(NewClient {
                name,
                first_visit,
                next_visit,
                amount,
                phone,
                location,
                status: self.status,
            }),
        })
    }
}

impl Default for ClientWizardState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_client_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ClientWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(9),
                Constraint::Length(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title_text = if state.editing_id.is_some() {
        "Update Client"
    } else {
        "Add Client"
    };

    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);
    render_error(f, chunks[2], state.error.as_deref());

    let help_text = match state.current_field {
        ClientField::FirstVisit | ClientField::NextVisit if state.editing => {
            "Digits - Fill date part | Left/Right - Switch part | Del - Clear date | Enter - Done"
        }
        _ if state.editing => "Enter - Save field | Esc - Stop editing",
        ClientField::Status => {
            "Enter - Change status | Up/Down - Navigate fields | S - Save client | Esc - Cancel"
        }
        _ => "Enter - Edit field | Up/Down - Navigate fields | S - Save client | Esc - Cancel",
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);
}

fn field_value(state: &ClientWizardState, field: ClientField) -> String {
    match field {
        ClientField::Name => state.name.clone(),
        ClientField::Phone => state.phone.clone(),
        ClientField::Location => state.location.clone(),
        ClientField::Amount => state.amount.clone(),
        ClientField::FirstVisit => state.first_visit.get_display_string(),
        ClientField::NextVisit => state.next_visit.get_display_string(),
        ClientField::Status => state.status.to_string(),
    }
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &ClientWizardState, area: Rect) {
    let items: Vec<ListItem> = ClientField::ORDER
        .iter()
        .map(|&field| {
            let selected = field == state.current_field;
            let label_style = if selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };

            let value = field_value(state, field);
            let is_text = !matches!(
                field,
                ClientField::FirstVisit | ClientField::NextVisit | ClientField::Status
            );
            let value_span = if selected && state.editing {
                let cursor = if is_text { "|" } else { "" };
                Span::styled(
                    format!("{value}{cursor}"),
                    Style::default().add_modifier(Modifier::BOLD),
                )
            } else {
                Span::raw(value)
            };

            ListItem::new(Spans::from(vec![
                Span::styled(format!("{}: ", field.label()), label_style),
                value_span,
            ]))
        })
        .collect();

    let form_list =
        List::new(items).block(Block::default().borders(Borders::ALL).title("Client Details"));

    f.render_widget(form_list, area);
}

pub fn handle_input(state: &mut ClientWizardState) -> Result<Option<ClientWizardAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }
    Ok(None)
}

pub fn handle_key(state: &mut ClientWizardState, key: KeyCode) -> Option<ClientWizardAction> {
    match key {
        KeyCode::Enter => state.toggle_editing(),
        KeyCode::Esc if state.editing => state.toggle_editing(),
        KeyCode::Esc => return Some(ClientWizardAction::Cancel),
        KeyCode::Up | KeyCode::BackTab if !state.editing => state.previous_field(),
        KeyCode::Down | KeyCode::Tab if !state.editing => state.next_field(),
        KeyCode::Char('s') if !state.editing => match state.submission() {
            Ok(submission) => return Some(ClientWizardAction::Save(submission)),
            Err(reason) => state.error = Some(reason),
        },
        _ if state.editing => state.edit_current_field(key),
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    fn type_text(state: &mut ClientWizardState, text: &str) {
        handle_key(state, KeyCode::Enter);
        for c in text.chars() {
            handle_key(state, KeyCode::Char(c));
        }
        handle_key(state, KeyCode::Enter);
    }

    fn go_to(state: &mut ClientWizardState, field: ClientField) {
        while state.current_field != field {
            handle_key(state, KeyCode::Down);
        }
    }

    #[test]
    fn test_new_client_submission() {
        let mut state = ClientWizardState::new();
        type_text(&mut state, "Abebe");
        go_to(&mut state, ClientField::Amount);
        type_text(&mut state, "120.50");
        go_to(&mut state, ClientField::Status);
        handle_key(&mut state, KeyCode::Enter);

        match handle_key(&mut state, KeyCode::Char('s')) {
            Some(ClientWizardAction::Save(ClientSubmission::Create(input))) => {
                assert_eq!(input.name, "Abebe");
                assert_eq!(input.amount, Some(120.5));
                assert_eq!(input.status, ClientStatus::Ongoing);
                assert!(input.phone.is_none());
                assert!(input.first_visit.is_none());
            }
            _ => panic!("expected a create submission"),
        }
    }

    #[test]
    fn test_existing_client_submits_update() {
        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4(),
            name: "Sara".into(),
            first_visit: NaiveDate::from_ymd_opt(2024, 5, 1),
            next_visit: None,
            amount: Some(99.0),
            phone: Some("0922".into()),
            location: None,
            status: ClientStatus::Closed,
            created_at: now,
            updated_at: now,
        };
        let state = ClientWizardState::from_existing(&client);

        match state.submission().unwrap() {
            ClientSubmission::Update(id, patch) => {
                assert_eq!(id, client.id);
                assert_eq!(patch.name.as_deref(), Some("Sara"));
                assert_eq!(patch.first_visit, Some(client.first_visit));
                assert_eq!(patch.amount, Some(Some(99.0)));
                assert_eq!(patch.status, Some(ClientStatus::Closed));
                assert_eq!(patch.location, Some(None));
            }
            other => panic!("unexpected submission {other:?}"),
        }
    }

    #[test]
    fn test_cleared_fields_are_removed_on_update() {
        let now = Utc::now();
        let mut client = Client {
            id: Uuid::new_v4(),
            name: "Sara".into(),
            first_visit: None,
            next_visit: NaiveDate::from_ymd_opt(2024, 4, 1),
            amount: Some(10.0),
            phone: Some("0911".into()),
            location: Some("Bole".into()),
            status: ClientStatus::Started,
            created_at: now,
            updated_at: now,
        };
        let mut state = ClientWizardState::from_existing(&client);

        go_to(&mut state, ClientField::Phone);
        handle_key(&mut state, KeyCode::Enter);
        for _ in 0..4 {
            handle_key(&mut state, KeyCode::Backspace);
        }
        handle_key(&mut state, KeyCode::Enter);
        go_to(&mut state, ClientField::NextVisit);
        handle_key(&mut state, KeyCode::Enter);
        handle_key(&mut state, KeyCode::Delete);

        let patch = match handle_key(&mut state, KeyCode::Char('s')) {
            Some(ClientWizardAction::Save(ClientSubmission::Update(_, patch))) => patch,
            _ => panic!("expected an update submission"),
        };
        assert_eq!(patch.phone, Some(None));
        assert_eq!(patch.next_visit, Some(None));

        patch.apply_to(&mut client);
        assert!(client.phone.is_none());
        assert!(client.next_visit.is_none());
        assert_eq!(client.location.as_deref(), Some("Bole"));
        assert_eq!(client.amount, Some(10.0));
    }

    #[test]
    fn test_missing_name_blocks_save() {
        let mut state = ClientWizardState::new();
        assert!(handle_key(&mut state, KeyCode::Char('s')).is_none());
        assert_eq!(state.error.as_deref(), Some("Name is required"));
    }

    #[test]
    fn test_bad_amount_blocks_save() {
        let mut state = ClientWizardState::new();
        state.name = "Abebe".into();
        state.amount = "1.2.3".into();
        assert!(state.submission().is_err());
    }

    #[test]
    fn test_amount_accepts_only_numeric_keys() {
        let mut state = ClientWizardState::new();
        go_to(&mut state, ClientField::Amount);
        type_text(&mut state, "1a5x0");
        assert_eq!(state.amount, "150");
    }

    #[test]
    fn test_date_field_editing() {
        let mut state = ClientWizardState::new();
        go_to(&mut state, ClientField::NextVisit);
        handle_key(&mut state, KeyCode::Enter);
        assert!(state.editing);
        for c in "2025".chars() {
            handle_key(&mut state, KeyCode::Char(c));
        }
        handle_key(&mut state, KeyCode::Right);
        for c in "07".chars() {
            handle_key(&mut state, KeyCode::Char(c));
        }
        handle_key(&mut state, KeyCode::Right);
        for c in "04".chars() {
            handle_key(&mut state, KeyCode::Char(c));
        }
        handle_key(&mut state, KeyCode::Enter);
        assert!(!state.editing);
        assert_eq!(state.next_visit.date, NaiveDate::from_ymd_opt(2025, 7, 4));

        handle_key(&mut state, KeyCode::Enter);
        handle_key(&mut state, KeyCode::Delete);
        assert!(!state.editing);
        assert!(state.next_visit.date.is_none());
    }

    #[test]
    fn test_field_navigation_wraps() {
        let mut state = ClientWizardState::new();
        handle_key(&mut state, KeyCode::Up);
        assert_eq!(state.current_field, ClientField::Status);
        handle_key(&mut state, KeyCode::Down);
        assert_eq!(state.current_field, ClientField::Name);
    }
}
