use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use keywarden_core::{ApiKeyRecord, CreateApiKey};
use keywarden_service::BlockingHttpService;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Wrap};

use crate::components::key_table::KeyTable;

/// What the app is currently doing
#[derive(Debug, Clone)]
pub enum Mode {
    /// Normal key-table navigation
    Normal,
    /// Create-key dialog
    CreateKey {
        name: String,
        models: ModelOptions,
        /// Index into the loaded model list. `None` is the placeholder:
        /// no model chosen yet.
        selected: Option<usize>,
        field: CreateField,
    },
    /// One-time secret reveal after a successful create
    ShowSecret { secret: String },
    /// Confirm delete of a key
    ConfirmDelete { key: ApiKeyRecord },
}

/// Outcome of the lazy model load that happens when the create dialog opens.
#[derive(Debug, Clone)]
pub enum ModelOptions {
    /// Models in the order the backend reported them.
    Loaded(Vec<String>),
    /// The load failed; the picker shows a single disabled placeholder.
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateField {
    Name,
    Model,
}

pub struct App {
    service: BlockingHttpService,
    table: KeyTable,
    mode: Mode,
    status_message: Option<String>,
}

impl App {
    pub fn new(service: BlockingHttpService) -> Result<Self> {
        let mut app = Self {
            service,
            table: KeyTable::new(Vec::new()),
            mode: Mode::Normal,
            status_message: None,
        };
        app.refresh_keys();
        Ok(app)
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn keys(&self) -> &[ApiKeyRecord] {
        self.table.keys()
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Whether key events belong to the current dialog. While any dialog is
    /// open, 'q' dismisses or feeds the dialog instead of quitting the app.
    pub fn is_input_mode(&self) -> bool {
        !matches!(self.mode, Mode::Normal)
    }

    /// Re-fetch the key list and replace the table wholesale. The table is
    /// never patched in place; what the server returns is what gets shown.
    /// On failure the previous rows stay visible and the status line says so.
    pub fn refresh_keys(&mut self) {
        match self.service.list_keys() {
            Ok(keys) => {
                let selected = self.table.selected_key().map(|k| k.id.clone());
                self.table = KeyTable::new(keys);
                if let Some(id) = selected {
                    self.table.select_key_by_id(&id);
                }
            }
            Err(e) => {
                self.status_message = Some(format!("Failed to load keys: {e} (press r to retry)"));
            }
        }
    }

    /// Open the create dialog. The model list is fetched fresh every time so
    /// the picker never shows a stale catalog.
    fn open_create(&mut self) {
        let models = match self.service.list_models() {
            Ok(models) => ModelOptions::Loaded(models),
            Err(_) => ModelOptions::Error,
        };
        self.mode = Mode::CreateKey {
            name: String::new(),
            models,
            selected: None,
            field: CreateField::Name,
        };
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.status_message = None;

        match &self.mode.clone() {
            Mode::Normal => self.handle_normal(key),
            Mode::CreateKey {
                name,
                models,
                selected,
                field,
            } => self.handle_create_key(key, name.clone(), models.clone(), *selected, *field),
            Mode::ShowSecret { .. } => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char('q')) {
                    // Dropping the mode value is the last place the full
                    // secret exists client-side.
                    self.mode = Mode::Normal;
                }
            }
            Mode::ConfirmDelete { key: record } => {
                self.handle_confirm_delete(key, record.clone())
            }
        }
    }

    fn handle_normal(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('n') => self.open_create(),
            KeyCode::Char('r') => self.refresh_keys(),
            KeyCode::Char('d') => {
                if let Some(record) = self.table.selected_key() {
                    self.mode = Mode::ConfirmDelete {
                        key: record.clone(),
                    };
                }
            }
            _ => self.table.handle_key(key),
        }
    }

    fn handle_create_key(
        &mut self,
        key: KeyEvent,
        mut name: String,
        models: ModelOptions,
        mut selected: Option<usize>,
        mut field: CreateField,
    ) {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                return;
            }
            KeyCode::Tab => {
                field = match field {
                    CreateField::Name => CreateField::Model,
                    CreateField::Model => CreateField::Name,
                };
            }
            KeyCode::Enter => {
                self.submit_create(&name, &models, selected);
                return;
            }
            _ => match field {
                CreateField::Name => match key.code {
                    KeyCode::Char(c) => name.push(c),
                    KeyCode::Backspace => {
                        name.pop();
                    }
                    _ => {}
                },
                CreateField::Model => {
                    if let ModelOptions::Loaded(ref list) = models {
                        match key.code {
                            KeyCode::Char('j') | KeyCode::Down => {
                                selected = match selected {
                                    None if !list.is_empty() => Some(0),
                                    Some(i) if i + 1 < list.len() => Some(i + 1),
                                    other => other,
                                };
                            }
                            KeyCode::Char('k') | KeyCode::Up => {
                                selected = match selected {
                                    Some(0) | None => None,
                                    Some(i) => Some(i - 1),
                                };
                            }
                            _ => {}
                        }
                    }
                }
            },
        }

        self.mode = Mode::CreateKey {
            name,
            models,
            selected,
            field,
        };
    }

    fn submit_create(&mut self, name: &str, models: &ModelOptions, selected: Option<usize>) {
        if name.trim().is_empty() {
            // The dialog's required field; nothing is sent without a name.
            self.status_message = Some("Key name is required".into());
            return;
        }

        // Submitting with the placeholder still selected posts an empty
        // model name; the server rejects it and the dialog stays open.
        let model_name = match (models, selected) {
            (ModelOptions::Loaded(list), Some(i)) => {
                list.get(i).cloned().unwrap_or_default()
            }
            _ => String::new(),
        };

        match self.service.create_key(&CreateApiKey {
            name: name.trim().to_string(),
            model_name,
        }) {
            Ok(created) => {
                self.refresh_keys();
                self.table.select_key_by_id(&created.record.id);
                self.mode = Mode::ShowSecret {
                    secret: created.secret_key,
                };
            }
            Err(e) => {
                self.status_message =
                    Some(format!("Failed to create key: {e}. Make sure a model is selected."));
            }
        }
    }

    fn handle_confirm_delete(&mut self, key: KeyEvent, record: ApiKeyRecord) {
        if key.code == KeyCode::Char('y') {
            match self.service.delete_key(&record.id) {
                Ok(()) => {
                    self.refresh_keys();
                    self.status_message = Some("Key deleted".into());
                }
                Err(e) => {
                    // The key may still exist server-side, so the stale row
                    // stays until the next successful sync.
                    self.status_message = Some(format!("Failed to delete key: {e}"));
                }
            }
        }
        // Any key other than 'y' aborts without a network call.
        self.mode = Mode::Normal;
    }

    // ---- Rendering ----

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_title_bar(frame, layout[0]);
        self.table.render(frame, layout[1]);
        self.render_status_bar(frame, layout[2]);

        match &self.mode {
            Mode::Normal => {}
            Mode::CreateKey {
                name,
                models,
                selected,
                field,
            } => self.render_create_dialog(frame, name, models, *selected, *field, area),
            Mode::ShowSecret { secret } => self.render_show_secret(frame, secret, area),
            Mode::ConfirmDelete { key } => self.render_confirm_delete(frame, key, area),
        }
    }

    fn render_title_bar(&self, frame: &mut Frame, area: Rect) {
        let title = Line::from(vec![
            Span::styled(" keywarden ", Style::default().bold().fg(Color::Cyan)),
            Span::raw("| "),
            Span::styled("API key manager", Style::default().fg(Color::Yellow)),
        ]);
        frame.render_widget(title, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        if let Some(ref msg) = self.status_message {
            let line = Line::from(Span::styled(
                format!(" {msg}"),
                Style::default().fg(Color::Red),
            ));
            frame.render_widget(line, area);
            return;
        }

        let hints = match &self.mode {
            Mode::Normal => vec![
                ("q", "quit"),
                ("j/k", "keys"),
                ("n", "new"),
                ("d", "delete"),
                ("r", "refresh"),
            ],
            Mode::CreateKey { .. } => vec![
                ("Tab", "field"),
                ("j/k", "model"),
                ("Enter", "create"),
                ("Esc", "cancel"),
            ],
            Mode::ShowSecret { .. } => vec![("Enter", "done")],
            Mode::ConfirmDelete { .. } => vec![("y", "confirm"), ("any", "cancel")],
        };

        let spans: Vec<Span> = hints
            .into_iter()
            .flat_map(|(key, desc)| {
                vec![
                    Span::styled(format!(" {key}"), Style::default().fg(Color::Yellow).bold()),
                    Span::raw(format!(" {desc} ")),
                ]
            })
            .collect();

        frame.render_widget(Line::from(spans), area);
    }

    fn render_create_dialog(
        &self,
        frame: &mut Frame,
        name: &str,
        models: &ModelOptions,
        selected: Option<usize>,
        field: CreateField,
        area: Rect,
    ) {
        let popup = centered_rect(50, 60, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(" Create API Key ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(inner);

        let name_style = if field == CreateField::Name {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let name_input = Paragraph::new(name).block(
            Block::default()
                .title(" Name ")
                .borders(Borders::ALL)
                .border_style(name_style),
        );
        frame.render_widget(name_input, chunks[0]);

        let model_style = if field == CreateField::Model {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let model_block = Block::default()
            .title(" Model ")
            .borders(Borders::ALL)
            .border_style(model_style);

        let items: Vec<ListItem> = match models {
            ModelOptions::Error => vec![ListItem::new(Span::styled(
                "Error loading models",
                Style::default().fg(Color::Red).italic(),
            ))],
            ModelOptions::Loaded(list) => {
                let mut items = vec![ListItem::new(Span::styled(
                    "Select a model...",
                    Style::default().fg(Color::DarkGray).italic(),
                ))];
                for (i, model) in list.iter().enumerate() {
                    let style = if selected == Some(i) {
                        Style::default().fg(Color::Black).bg(Color::Cyan).bold()
                    } else {
                        Style::default()
                    };
                    items.push(ListItem::new(Span::styled(model.clone(), style)));
                }
                items
            }
        };

        frame.render_widget(List::new(items).block(model_block), chunks[1]);
    }

    fn render_show_secret(&self, frame: &mut Frame, secret: &str, area: Rect) {
        let popup = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(" API Key Created ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green));

        let lines = vec![
            Line::from("Copy your key now. It will not be shown again."),
            Line::from(""),
            Line::from(Span::styled(
                secret.to_string(),
                Style::default().fg(Color::Yellow).bold(),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter when done.",
                Style::default().fg(Color::DarkGray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, popup);
    }

    fn render_confirm_delete(&self, frame: &mut Frame, key: &ApiKeyRecord, area: Rect) {
        let popup = centered_rect(50, 20, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(" Confirm Delete ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));

        let text = format!(
            "Delete key \"{}\"? This cannot be undone.\n\n(y)es / (any key) cancel",
            key.name
        );
        let paragraph = Paragraph::new(text)
            .block(block)
            .wrap(Wrap { trim: false })
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, popup);
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
