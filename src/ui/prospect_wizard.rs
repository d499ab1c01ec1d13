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

use super::{edit_text, non_empty, render_error};
use crate::models::{NewProspect, Prospect, ProspectPatch};

/// What saving the form should do: the form creates unless it was opened
/// on an existing record.
#[derive(Debug, Clone, PartialEq)]
pub enum ProspectSubmission {
    Create(NewProspect),
    Update(Uuid, ProspectPatch),
}

pub enum ProspectWizardAction {
    Cancel,
    Save(ProspectSubmission),
}

#[derive(Clone, PartialEq, Copy, Debug)]
pub enum ProspectField {
    Name,
    Place,
    Location,
}

pub struct ProspectWizardState {
    pub editing_id: Option<Uuid>,
    pub name: String,
    pub place: String,
    pub location: String,
    pub current_field: ProspectField,
    pub editing: bool,
    pub error: Option<String>,
}

impl ProspectWizardState {
    pub fn new() -> Self {
        Self {
            editing_id: None,
            name: String::new(),
            place: String::new(),
            location: String::new(),
            current_field: ProspectField::Name,
            editing: false,
            error: None,
        }
    }

    pub fn from_existing(prospect: &Prospect) -> Self {
        Self {
            editing_id: Some(prospect.id),
            name: prospect.name.clone(),
            place: prospect.place.clone(),
            location: prospect.location.clone().unwrap_or_default(),
            ..Self::new()
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            ProspectField::Name => ProspectField::Place,
            ProspectField::Place => ProspectField::Location,
            ProspectField::Location => ProspectField::Name,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            ProspectField::Name => ProspectField::Location,
            ProspectField::Place => ProspectField::Name,
            ProspectField::Location => ProspectField::Place,
        };
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        let field_value = match self.current_field {
            ProspectField::Name => &mut self.name,
            ProspectField::Place => &mut self.place,
            ProspectField::Location => &mut self.location,
        };
        edit_text(field_value, key);
    }

    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && !self.place.trim().is_empty()
    }

    pub fn submission(&self) -> ProspectSubmission {
        let name = self.name.trim().to_string();
        let place = self.place.trim().to_string();
        let location = non_empty(&self.location);

        match self.editing_id {
            Some(id) => ProspectSubmission::Update(
                id,
                ProspectPatch {
                    name: Some(name),
                    place: Some(place),
                    location: Some(location),
                },
            ),
            None => ProspectSubmission::Create(NewProspect {
                name,
                place,
                location,
            }),
        }
    }
}

impl Default for ProspectWizardState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_prospect_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ProspectWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title_text = if state.editing_id.is_some() {
        "Update Prospect"
    } else {
        "Add Prospect"
    };

    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);
    render_error(f, chunks[2], state.error.as_deref());

    let help_text = if state.editing {
        "Enter - Save field | Esc - Stop editing"
    } else {
        "Enter - Edit field | Up/Down - Navigate fields | S - Save prospect | Esc - Cancel"
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &ProspectWizardState, area: Rect) {
    let fields = [
        (ProspectField::Name, "Name *", &state.name),
        (ProspectField::Place, "Place *", &state.place),
        (ProspectField::Location, "Location", &state.location),
    ];

    let items: Vec<ListItem> = fields
        .iter()
        .map(|(field, label, value)| {
            let selected = *field == state.current_field;
            let label_style = if selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };

            let value_span = if selected && state.editing {
                Span::styled(
                    format!("{value}|"),
                    Style::default().add_modifier(Modifier::BOLD),
                )
            } else {
                Span::raw(value.as_str())
            };

            ListItem::new(Spans::from(vec![
                Span::styled(format!("{label}: "), label_style),
                value_span,
            ]))
        })
        .collect();

    let form_list =
        List::new(items).block(Block::default().borders(Borders::ALL).title("Prospect Details"));

    f.render_widget(form_list, area);
}

pub fn handle_input(state: &mut ProspectWizardState) -> Result<Option<ProspectWizardAction>> {
    if let Event::Key(key) = event::read()? {
        return Ok(handle_key(state, key.code));
    }
    Ok(None)
}

pub fn handle_key(state: &mut ProspectWizardState, key: KeyCode) -> Option<ProspectWizardAction> {
    match key {
        KeyCode::Esc if state.editing => state.toggle_editing(),
        KeyCode::Esc => return Some(ProspectWizardAction::Cancel),
        KeyCode::Enter => state.toggle_editing(),
        KeyCode::Up | KeyCode::BackTab if !state.editing => state.previous_field(),
        KeyCode::Down | KeyCode::Tab if !state.editing => state.next_field(),
        KeyCode::Char('s') if !state.editing => {
            if state.is_valid() {
                return Some(ProspectWizardAction::Save(state.submission()));
            }
            state.error = Some("Name and place are required".to_string());
        }
        _ if state.editing => state.edit_current_field(key),
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn type_text(state: &mut ProspectWizardState, text: &str) {
        handle_key(state, KeyCode::Enter);
        for c in text.chars() {
            handle_key(state, KeyCode::Char(c));
        }
        handle_key(state, KeyCode::Enter);
    }

    #[test]
    fn test_new_form_creates() {
        let mut state = ProspectWizardState::new();
        type_text(&mut state, "Acme");
        handle_key(&mut state, KeyCode::Down);
        type_text(&mut state, "Addis");

        match handle_key(&mut state, KeyCode::Char('s')) {
            Some(ProspectWizardAction::Save(ProspectSubmission::Create(input))) => {
                assert_eq!(input.name, "Acme");
                assert_eq!(input.place, "Addis");
                assert!(input.location.is_none());
            }
            _ => panic!("expected a create submission"),
        }
    }

    #[test]
    fn test_existing_form_updates() {
        let now = Utc::now();
        let prospect = Prospect {
            id: Uuid::new_v4(),
            name: "Acme".into(),
            place: "Addis".into(),
            location: Some("Bole".into()),
            created_at: now,
            updated_at: now,
        };
        let state = ProspectWizardState::from_existing(&prospect);

        assert_eq!(
            state.submission(),
            ProspectSubmission::Update(
                prospect.id,
                ProspectPatch {
                    name: Some("Acme".into()),
                    place: Some("Addis".into()),
                    location: Some(Some("Bole".into())),
                }
            )
        );
    }

    #[test]
    fn test_blanked_location_is_cleared_on_update() {
        let now = Utc::now();
        let prospect = Prospect {
            id: Uuid::new_v4(),
            name: "Acme".into(),
            place: "Addis".into(),
            location: Some("Bole".into()),
            created_at: now,
            updated_at: now,
        };
        let mut state = ProspectWizardState::from_existing(&prospect);
        state.location.clear();

        match state.submission() {
            ProspectSubmission::Update(_, patch) => assert_eq!(patch.location, Some(None)),
            other => panic!("unexpected submission {other:?}"),
        }
    }

    #[test]
    fn test_save_requires_name_and_place() {
        let mut state = ProspectWizardState::new();
        type_text(&mut state, "Acme");
        assert!(handle_key(&mut state, KeyCode::Char('s')).is_none());
        assert!(state.error.is_some());
    }

    #[test]
    fn test_typed_s_is_text_while_editing() {
        let mut state = ProspectWizardState::new();
        type_text(&mut state, "Sisay");
        assert_eq!(state.name, "Sisay");
    }

    #[test]
    fn test_escape_cancels_only_when_not_editing() {
        let mut state = ProspectWizardState::new();
        handle_key(&mut state, KeyCode::Enter);
        assert!(handle_key(&mut state, KeyCode::Esc).is_none());
        assert!(matches!(
            handle_key(&mut state, KeyCode::Esc),
            Some(ProspectWizardAction::Cancel)
        ));
    }
}
