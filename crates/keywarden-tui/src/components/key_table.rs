use chrono::Local;
use crossterm::event::{KeyCode, KeyEvent};
use keywarden_core::ApiKeyRecord;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Cell, Row, Table, TableState};

/// The key list view. Rows are replaced wholesale on every sync; the table
/// never mutates individual rows.
pub struct KeyTable {
    keys: Vec<ApiKeyRecord>,
    state: TableState,
}

impl KeyTable {
    pub fn new(keys: Vec<ApiKeyRecord>) -> Self {
        let mut state = TableState::default();
        if !keys.is_empty() {
            state.select(Some(0));
        }
        Self { keys, state }
    }

    pub fn keys(&self) -> &[ApiKeyRecord] {
        &self.keys
    }

    /// Returns the currently highlighted key, if any.
    pub fn selected_key(&self) -> Option<&ApiKeyRecord> {
        let idx = self.state.selected()?;
        self.keys.get(idx)
    }

    /// Attempt to select the key with the given ID.
    /// Returns `true` if the key was found and selected, `false` otherwise.
    pub fn select_key_by_id(&mut self, id: &str) -> bool {
        if let Some(idx) = self.keys.iter().position(|k| k.id == id) {
            self.state.select(Some(idx));
            return true;
        }
        false
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                let current = self.state.selected().unwrap_or(0);
                if current + 1 < self.keys.len() {
                    self.state.select(Some(current + 1));
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                let current = self.state.selected().unwrap_or(0);
                if current > 0 {
                    self.state.select(Some(current - 1));
                }
            }
            KeyCode::Char('g') => {
                if !self.keys.is_empty() {
                    self.state.select(Some(0));
                }
            }
            KeyCode::Char('G') => {
                if !self.keys.is_empty() {
                    self.state.select(Some(self.keys.len() - 1));
                }
            }
            _ => {}
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let title = format!(" API Keys ({}) ", self.keys.len());
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let header = Row::new(vec!["Name", "Key", "Created", "Model"])
            .style(Style::default().fg(Color::DarkGray).bold());

        let rows: Vec<Row> = self
            .keys
            .iter()
            .map(|key| {
                Row::new(vec![
                    Cell::from(key.name.clone()),
                    Cell::from(key.secret_key_display.clone())
                        .style(Style::default().fg(Color::Yellow)),
                    Cell::from(
                        key.created_at
                            .with_timezone(&Local)
                            .format("%Y-%m-%d")
                            .to_string(),
                    ),
                    Cell::from(key.project_access.clone())
                        .style(Style::default().fg(Color::Magenta)),
                ])
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(30),
                Constraint::Percentage(25),
                Constraint::Percentage(15),
                Constraint::Percentage(30),
            ],
        )
        .header(header)
        .block(block)
        .row_highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan).bold())
        .highlight_symbol("> ");

        let mut state = self.state.clone();
        frame.render_stateful_widget(table, area, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn make_key(id: &str) -> ApiKeyRecord {
        ApiKeyRecord {
            id: id.to_string(),
            name: format!("key {id}"),
            secret_key_display: "sk-ollama-aa...0011".into(),
            created_at: Utc::now(),
            project_access: "llama3:8b".into(),
        }
    }

    fn make_table() -> KeyTable {
        KeyTable::new(vec![make_key("a"), make_key("b"), make_key("c")])
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, crossterm::event::KeyModifiers::NONE)
    }

    #[test]
    fn first_row_selected_by_default() {
        let table = make_table();
        assert_eq!(table.selected_key().unwrap().id, "a");
    }

    #[test]
    fn empty_table_has_no_selection() {
        let table = KeyTable::new(vec![]);
        assert!(table.selected_key().is_none());
    }

    #[test]
    fn j_and_k_move_selection_within_bounds() {
        let mut table = make_table();
        table.handle_key(key(KeyCode::Char('j')));
        assert_eq!(table.selected_key().unwrap().id, "b");
        table.handle_key(key(KeyCode::Char('j')));
        table.handle_key(key(KeyCode::Char('j')));
        assert_eq!(table.selected_key().unwrap().id, "c");
        table.handle_key(key(KeyCode::Char('k')));
        assert_eq!(table.selected_key().unwrap().id, "b");
    }

    #[test]
    fn g_and_shift_g_jump_to_ends() {
        let mut table = make_table();
        table.handle_key(key(KeyCode::Char('G')));
        assert_eq!(table.selected_key().unwrap().id, "c");
        table.handle_key(key(KeyCode::Char('g')));
        assert_eq!(table.selected_key().unwrap().id, "a");
    }

    #[test]
    fn select_by_id() {
        let mut table = make_table();
        assert!(table.select_key_by_id("b"));
        assert_eq!(table.selected_key().unwrap().id, "b");
        assert!(!table.select_key_by_id("nonexistent"));
        assert_eq!(table.selected_key().unwrap().id, "b");
    }
}
