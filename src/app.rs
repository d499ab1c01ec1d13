use std::io;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};
use tui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use crate::api::{ApiClient, Clients, Prospects};
use crate::config::Config;
use crate::ui::{
    client_wizard::{
        handle_input as handle_client_wizard_input, render_client_wizard, ClientSubmission,
        ClientWizardAction, ClientWizardState,
    },
    clients::{handle_input as handle_clients_input, render_clients, ClientAction, ClientsState},
    prospect_wizard::{
        handle_input as handle_prospect_wizard_input, render_prospect_wizard,
        ProspectSubmission, ProspectWizardAction, ProspectWizardState,
    },
    prospects::{
        handle_input as handle_prospects_input, render_prospects, ProspectAction, ProspectsState,
    },
};

// Represents the current screen in the app
enum AppScreen {
    Prospects,
    ProspectWizard,
    Clients,
    ClientWizard,
}

// Main application state
struct AppState {
    api: ApiClient,
    screen: AppScreen,
    prospects_state: ProspectsState,
    prospect_wizard_state: Option<ProspectWizardState>,
    clients_state: ClientsState,
    client_wizard_state: Option<ClientWizardState>,
}

impl AppState {
    fn new(api: ApiClient) -> Self {
        Self {
            api,
            screen: AppScreen::Prospects,
            prospects_state: ProspectsState::new(),
            prospect_wizard_state: None,
            clients_state: ClientsState::new(),
            client_wizard_state: None,
        }
    }
}

/// Run the terminal frontend against the configured API
pub async fn run(config: &Config) -> Result<()> {
    let api = ApiClient::new(&config.api_base_url);
    tracing::info!(base_url = %config.api_base_url, "starting terminal frontend");

    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app_state = AppState::new(api);
    load_prospects(&mut app_state).await;

    let result = run_app(&mut terminal, &mut app_state).await;

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        tracing::error!(error = %err, "terminal frontend stopped");
    }
    result
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app_state: &mut AppState) -> Result<()> {
    loop {
        terminal.draw(|f| match app_state.screen {
            AppScreen::Prospects => render_prospects(f, &mut app_state.prospects_state),
            AppScreen::ProspectWizard => {
                if let Some(state) = &mut app_state.prospect_wizard_state {
                    render_prospect_wizard(f, state);
                }
            }
            AppScreen::Clients => render_clients(f, &mut app_state.clients_state),
            AppScreen::ClientWizard => {
                if let Some(state) = &mut app_state.client_wizard_state {
                    render_client_wizard(f, state);
                }
            }
        })?;

        let should_quit = match app_state.screen {
            AppScreen::Prospects => handle_prospects_screen(app_state).await?,
            AppScreen::ProspectWizard => handle_prospect_wizard_screen(app_state).await?,
            AppScreen::Clients => handle_clients_screen(app_state).await?,
            AppScreen::ClientWizard => handle_client_wizard_screen(app_state).await?,
        };

        if should_quit {
            break;
        }
    }

    Ok(())
}

async fn load_prospects(app_state: &mut AppState) {
    match app_state.api.list::<Prospects>().await {
        Ok(prospects) => app_state.prospects_state.set_prospects(prospects),
        Err(err) => {
            tracing::warn!(error = %err, "failed to fetch prospects");
            app_state.prospects_state.set_error("Failed to fetch prospects");
        }
    }
    app_state.screen = AppScreen::Prospects;
}

async fn load_clients(app_state: &mut AppState) {
    match app_state.api.list::<Clients>().await {
        Ok(clients) => app_state.clients_state.set_clients(clients),
        Err(err) => {
            tracing::warn!(error = %err, "failed to fetch clients");
            app_state.clients_state.set_error("Failed to fetch clients");
        }
    }
    app_state.screen = AppScreen::Clients;
}

async fn handle_prospects_screen(app_state: &mut AppState) -> Result<bool> {
    match handle_prospects_input(&mut app_state.prospects_state)? {
        Some(ProspectAction::Quit) => return Ok(true),
        Some(ProspectAction::SwitchView) => load_clients(app_state).await,
        Some(ProspectAction::Refresh) => load_prospects(app_state).await,
        Some(ProspectAction::NewProspect) => {
            app_state.prospect_wizard_state = Some(ProspectWizardState::new());
            app_state.screen = AppScreen::ProspectWizard;
        }
        Some(ProspectAction::EditProspect(id)) => {
            // Edit the server's current copy, falling back to the listed row
            let fetched = match app_state.api.get::<Prospects>(id).await {
                Ok(prospect) => Some(prospect),
                Err(err) => {
                    tracing::warn!(error = %err, %id, "failed to fetch prospect");
                    app_state.prospects_state.selected_prospect().cloned()
                }
            };
            if let Some(prospect) = fetched {
                app_state.prospect_wizard_state = Some(ProspectWizardState::from_existing(&prospect));
                app_state.screen = AppScreen::ProspectWizard;
            }
        }
        Some(ProspectAction::DeleteProspect(id)) => {
            match app_state.api.delete::<Prospects>(id).await {
                Ok(()) => load_prospects(app_state).await,
                Err(err) => {
                    tracing::warn!(error = %err, %id, "failed to delete prospect");
                    app_state.prospects_state.set_error("Failed to delete prospect");
                }
            }
        }
        None => {}
    }

    Ok(false)
}

async fn handle_prospect_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    let Some(state) = &mut app_state.prospect_wizard_state else {
        app_state.screen = AppScreen::Prospects;
        return Ok(false);
    };

    match handle_prospect_wizard_input(state)? {
        Some(ProspectWizardAction::Cancel) => {
            app_state.prospect_wizard_state = None;
            app_state.screen = AppScreen::Prospects;
        }
        Some(ProspectWizardAction::Save(submission)) => {
            let saved = match &submission {
                ProspectSubmission::Create(input) => {
                    app_state.api.create::<Prospects>(input).await.map(|_| ())
                }
                ProspectSubmission::Update(id, patch) => {
                    app_state.api.update::<Prospects>(*id, patch).await.map(|_| ())
                }
            };

            match saved {
                Ok(()) => {
                    app_state.prospect_wizard_state = None;
                    load_prospects(app_state).await;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to save prospect");
                    state.error = Some(format!("Failed to save prospect: {err}"));
                }
            }
        }
        None => {}
    }

    Ok(false)
}

async fn handle_clients_screen(app_state: &mut AppState) -> Result<bool> {
    match handle_clients_input(&mut app_state.clients_state)? {
        Some(ClientAction::Quit) => return Ok(true),
        Some(ClientAction::SwitchView) => load_prospects(app_state).await,
        Some(ClientAction::Refresh) => load_clients(app_state).await,
        Some(ClientAction::NewClient) => {
            app_state.client_wizard_state = Some(ClientWizardState::new());
            app_state.screen = AppScreen::ClientWizard;
        }
        Some(ClientAction::EditClient(id)) => {
            let fetched = match app_state.api.get::<Clients>(id).await {
                Ok(client) => Some(client),
                Err(err) => {
                    tracing::warn!(error = %err, %id, "failed to fetch client");
                    app_state.clients_state.selected_client().cloned()
                }
            };
            if let Some(client) = fetched {
                app_state.client_wizard_state = Some(ClientWizardState::from_existing(&client));
                app_state.screen = AppScreen::ClientWizard;
            }
        }
        Some(ClientAction::DeleteClient(id)) => match app_state.api.delete::<Clients>(id).await {
            Ok(()) => app_state.clients_state.apply_deleted(id),
            Err(err) => {
                tracing::warn!(error = %err, %id, "failed to delete client");
                app_state.clients_state.set_error("Failed to delete client");
            }
        },
        None => {}
    }

    Ok(false)
}

async fn handle_client_wizard_screen(app_state: &mut AppState) -> Result<bool> {
    let Some(state) = &mut app_state.client_wizard_state else {
        app_state.screen = AppScreen::Clients;
        return Ok(false);
    };

    match handle_client_wizard_input(state)? {
        Some(ClientWizardAction::Cancel) => {
            app_state.client_wizard_state = None;
            app_state.screen = AppScreen::Clients;
        }
        Some(ClientWizardAction::Save(submission)) => {
            let saved = match &submission {
                ClientSubmission::Create(input) => app_state
                    .api
                    .create::<Clients>(input)
                    .await
                    .map(|client| app_state.clients_state.apply_created(client)),
                ClientSubmission::Update(id, patch) => app_state
                    .api
                    .update::<Clients>(*id, patch)
                    .await
                    .map(|client| app_state.clients_state.apply_updated(client)),
            };

            match saved {
                Ok(()) => {
                    app_state.client_wizard_state = None;
                    app_state.screen = AppScreen::Clients;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "failed to save client");
                    state.error = Some(format!("Failed to save client: {err}"));
                }
            }
        }
        None => {}
    }

    Ok(false)
}
