use std::sync::{Arc, OnceLock};
use std::time::Instant;

use regex::Regex;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::dashboard::{available_actions, Dashboard, Mutation, MutationOutcome, RowAction};
use crate::error::Result;
use crate::models::{DraftSummary, IntegrationStatus};
use crate::services::DraftsClient;
use crate::tui::AppAction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Subject,
    Body,
}

#[derive(Debug, Clone)]
pub struct EditForm {
    pub draft_id: String,
    pub subject: String,
    pub body: String,
    pub field: EditField,
}

#[derive(Debug, Clone)]
pub struct SendForm {
    pub draft_id: String,
    pub recipient: String,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub enum Mode {
    #[default]
    Normal,
    Search,
    ViewDraft,
    Edit(EditForm),
    Send(SendForm),
    ConfirmDelete(String),
    Integrations,
    Help,
}

// Message for completed integration panel requests
enum IntegrationResult {
    Status(std::result::Result<IntegrationStatus, String>),
    Disconnected {
        platform: String,
        result: std::result::Result<(), String>,
    },
}

pub struct App {
    pub dashboard: Dashboard,

    // UI State
    pub selected_index: usize,
    pub mode: Mode,
    pub search_input: String,
    pub flash: Option<String>,

    // Integrations panel
    pub integrations: Option<IntegrationStatus>,
    pub integrations_loading: bool,
    pub integrations_error: Option<String>,
    pub integration_index: usize,
    integration_rx: mpsc::Receiver<IntegrationResult>,
    integration_tx: mpsc::Sender<IntegrationResult>,

    // Services
    client: Arc<DraftsClient>,
}

impl App {
    pub fn new(config: &Config) -> Result<Self> {
        let client = Arc::new(DraftsClient::new(config)?);
        let dashboard = Dashboard::new(client.clone(), config.search_debounce());
        let (integration_tx, integration_rx) = mpsc::channel(4);

        Ok(Self {
            dashboard,
            selected_index: 0,
            mode: Mode::Normal,
            search_input: String::new(),
            flash: None,
            integrations: None,
            integrations_loading: false,
            integrations_error: None,
            integration_index: 0,
            integration_rx,
            integration_tx,
            client,
        })
    }

    pub fn selected_draft(&self) -> Option<&DraftSummary> {
        self.dashboard.items().get(self.selected_index)
    }

    /// Advance timers and apply finished background work. Called once per loop iteration.
    pub fn tick(&mut self, now: Instant) {
        self.dashboard.tick(now);
        self.dashboard.poll_fetch_result(now);

        if let Some(outcome) = self.dashboard.poll_mutation_result() {
            self.on_mutation_finished(&outcome);
        }

        self.poll_integration_result();

        let len = self.dashboard.items().len();
        if self.selected_index >= len {
            self.selected_index = len.saturating_sub(1);
        }
    }

    pub fn handle_action(&mut self, action: AppAction, now: Instant) -> Result<bool> {
        match action {
            AppAction::Quit => return Ok(true),

            AppAction::MoveUp if matches!(self.mode, Mode::Integrations) => {
                self.move_integration_selection(false);
            }

            AppAction::MoveDown if matches!(self.mode, Mode::Integrations) => {
                self.move_integration_selection(true);
            }

            AppAction::MoveUp => {
                if self.selected_index > 0 {
                    self.selected_index -= 1;
                }
            }

            AppAction::MoveDown => {
                let len = self.dashboard.items().len();
                if len > 0 && self.selected_index < len - 1 {
                    self.selected_index += 1;
                }
            }

            AppAction::NextPage => {
                let page = self.dashboard.query().page;
                if page < self.dashboard.total_pages() {
                    self.dashboard.set_page(page + 1);
                    self.selected_index = 0;
                }
            }

            AppAction::PrevPage => {
                let page = self.dashboard.query().page;
                if page > 1 {
                    self.dashboard.set_page(page - 1);
                    self.selected_index = 0;
                }
            }

            AppAction::CycleStatus => {
                let next = self.dashboard.query().status.cycle();
                self.dashboard.set_status(next);
                self.selected_index = 0;
            }

            AppAction::CycleDateRange => {
                let next = self.dashboard.query().date_range.cycle();
                self.dashboard.set_date_range(next);
                self.selected_index = 0;
            }

            AppAction::StartSearch => {
                self.search_input = self.dashboard.query().search.clone();
                self.mode = Mode::Search;
            }

            AppAction::SearchChar(c) => {
                self.search_input.push(c);
                self.dashboard.set_search(&self.search_input, now);
            }

            AppAction::SearchBackspace => {
                self.search_input.pop();
                self.dashboard.set_search(&self.search_input, now);
            }

            AppAction::SearchDone => {
                self.mode = Mode::Normal;
                self.selected_index = 0;
            }

            AppAction::ClearFilters => {
                self.search_input.clear();
                self.dashboard.clear_all();
                self.selected_index = 0;
            }

            AppAction::Refresh => {
                self.dashboard.refresh();
            }

            AppAction::ViewDraft => {
                if self.selected_draft().is_some() {
                    self.mode = Mode::ViewDraft;
                }
            }

            AppAction::EditDraft => self.start_edit(),

            AppAction::SendDraft => self.start_send(),

            AppAction::DeleteDraft => {
                if let Some(draft) = self.selected_draft() {
                    if available_actions(draft.status).contains(&RowAction::Delete) {
                        self.mode = Mode::ConfirmDelete(draft.id.clone());
                    } else {
                        self.flash = Some(format!("Can't delete a {} draft", draft.status.label()));
                    }
                }
            }

            AppAction::ConfirmYes => {
                if let Mode::ConfirmDelete(draft_id) = &self.mode {
                    self.dashboard.mutate(Mutation::Delete {
                        draft_id: draft_id.clone(),
                    });
                }
            }

            AppAction::OpenInBrowser => {
                if let Some(draft) = self.selected_draft() {
                    match self.client.draft_page_url(&draft.id) {
                        Ok(url) => {
                            if let Err(e) = open::that(url.as_str()) {
                                tracing::warn!("Failed to open {}: {}", url, e);
                            }
                        }
                        Err(e) => tracing::warn!("No browser link for draft {}: {}", draft.id, e),
                    }
                }
            }

            AppAction::FormChar(c) => self.form_input(Some(c)),

            AppAction::FormBackspace => self.form_input(None),

            AppAction::FormNextField => {
                if let Mode::Edit(form) = &mut self.mode {
                    form.field = match form.field {
                        EditField::Subject => EditField::Body,
                        EditField::Body => EditField::Subject,
                    };
                }
            }

            AppAction::FormNewline => {
                if let Mode::Edit(form) = &mut self.mode {
                    if form.field == EditField::Body {
                        form.body.push('\n');
                    }
                }
            }

            AppAction::FormConfirm => self.submit_form(),

            AppAction::ClosePopup => {
                if !matches!(self.mode, Mode::Search) {
                    self.dashboard.mutation_error = None;
                }
                self.mode = Mode::Normal;
            }

            AppAction::ShowIntegrations => {
                self.mode = Mode::Integrations;
                self.integration_index = 0;
                self.load_integrations();
            }

            AppAction::DisconnectPlatform => {
                let platform = self
                    .integrations
                    .as_ref()
                    .and_then(|s| s.keys().nth(self.integration_index).cloned());
                if let Some(platform) = platform {
                    self.disconnect_platform(platform);
                }
            }

            AppAction::ShowHelp => {
                self.mode = Mode::Help;
            }
        }

        Ok(false)
    }

    fn move_integration_selection(&mut self, down: bool) {
        let len = self.integrations.as_ref().map_or(0, |s| s.len());
        if down && self.integration_index + 1 < len {
            self.integration_index += 1;
        } else if !down && self.integration_index > 0 {
            self.integration_index -= 1;
        }
    }

    fn start_edit(&mut self) {
        let Some(draft) = self.selected_draft() else {
            return;
        };
        if !available_actions(draft.status).contains(&RowAction::Edit) {
            self.flash = Some(format!("Can't edit a {} draft", draft.status.label()));
            return;
        }
        self.mode = Mode::Edit(EditForm {
            draft_id: draft.id.clone(),
            subject: draft.subject.clone().unwrap_or_default(),
            body: draft.body.clone().unwrap_or_default(),
            field: EditField::Subject,
        });
    }

    fn start_send(&mut self) {
        let Some(draft) = self.selected_draft() else {
            return;
        };
        if !available_actions(draft.status).contains(&RowAction::Send) {
            self.flash = Some(format!("Can't send a {} draft", draft.status.label()));
            return;
        }
        let recipient = draft
            .sent_to
            .clone()
            .or_else(|| draft.host_email().map(str::to_string))
            .unwrap_or_default();
        self.mode = Mode::Send(SendForm {
            draft_id: draft.id.clone(),
            recipient,
            error: None,
        });
    }

    fn form_input(&mut self, c: Option<char>) {
        let target = match &mut self.mode {
            Mode::Edit(form) => match form.field {
                EditField::Subject => &mut form.subject,
                EditField::Body => &mut form.body,
            },
            Mode::Send(form) => {
                form.error = None;
                &mut form.recipient
            }
            _ => return,
        };
        match c {
            Some(c) => target.push(c),
            None => {
                target.pop();
            }
        }
    }

    fn submit_form(&mut self) {
        let mutation = match &mut self.mode {
            Mode::Edit(form) => Mutation::Update {
                draft_id: form.draft_id.clone(),
                subject: form.subject.trim().to_string(),
                body: form.body.clone(),
            },
            Mode::Send(form) => {
                let recipient = form.recipient.trim();
                if !is_valid_email(recipient) {
                    form.error = Some(format!("'{}' is not a valid email address", recipient));
                    return;
                }
                Mutation::Send {
                    draft_id: form.draft_id.clone(),
                    recipient_email: recipient.to_string(),
                }
            }
            _ => return,
        };
        self.dashboard.mutate(mutation);
    }

    fn on_mutation_finished(&mut self, outcome: &MutationOutcome) {
        let Ok(message_id) = &outcome.result else {
            // Popup stays open with the inline error
            return;
        };

        self.flash = Some(match message_id {
            Some(id) => format!("Draft sent (message {})", id),
            None => format!("Draft {} {}d", outcome.draft_id, outcome.kind.label()),
        });

        let popup_matches = match &self.mode {
            Mode::Edit(form) => form.draft_id == outcome.draft_id,
            Mode::Send(form) => form.draft_id == outcome.draft_id,
            Mode::ConfirmDelete(id) => *id == outcome.draft_id,
            _ => false,
        };
        if popup_matches {
            self.mode = Mode::Normal;
        }
    }

    fn load_integrations(&mut self) {
        self.integrations_loading = true;
        self.integrations_error = None;

        let client = Arc::clone(&self.client);
        let tx = self.integration_tx.clone();
        tokio::spawn(async move {
            let result = client.connection_status().await.map_err(|e| e.to_string());
            let _ = tx.send(IntegrationResult::Status(result)).await;
        });
    }

    fn disconnect_platform(&mut self, platform: String) {
        self.integrations_loading = true;

        let client = Arc::clone(&self.client);
        let tx = self.integration_tx.clone();
        tokio::spawn(async move {
            let result = client
                .disconnect_platform(&platform)
                .await
                .map_err(|e| e.to_string());
            let _ = tx
                .send(IntegrationResult::Disconnected { platform, result })
                .await;
        });
    }

    /// Poll for completed integration requests (non-blocking)
    fn poll_integration_result(&mut self) {
        let Ok(result) = self.integration_rx.try_recv() else {
            return;
        };

        match result {
            IntegrationResult::Status(Ok(status)) => {
                self.integrations_loading = false;
                self.integration_index = self.integration_index.min(status.len().saturating_sub(1));
                self.integrations = Some(status);
            }
            IntegrationResult::Status(Err(e)) => {
                tracing::error!("Failed to load integrations: {}", e);
                self.integrations_loading = false;
                self.integrations_error = Some(e);
            }
            IntegrationResult::Disconnected {
                platform,
                result: Ok(()),
            } => {
                tracing::info!("Disconnected {}", platform);
                self.load_integrations();
            }
            IntegrationResult::Disconnected {
                platform,
                result: Err(e),
            } => {
                tracing::error!("Failed to disconnect {}: {}", platform, e);
                self.integrations_loading = false;
                self.integrations_error = Some(format!("Couldn't disconnect {}: {}", platform, e));
            }
        }
    }
}

fn is_valid_email(s: &str) -> bool {
    static EMAIL_RE: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL_RE
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(s))
}
