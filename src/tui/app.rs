use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use ratatui::widgets::TableState;

use super::theme::ThemeColors;
use crate::clipboard::ClipboardHandle;
use crate::config::Config;
use crate::output::{
    default_export_path, format_score, to_delimited_text, write_csv_file, DelimitedFormat,
};
use crate::rating::{ItemId, ItemSet, SetId};
use crate::storage::{clear_session, save_session, Session, StateStore};

/// How long a row stays visible (faded) between `d` and its actual removal
pub const REMOVAL_DELAY: Duration = Duration::from_millis(200);

const FLASH_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    EditName { item: ItemId },
    CopyFrom,
    ConfirmReset,
    Help,
}

#[derive(Debug, Clone)]
pub struct Flash {
    pub message: String,
    pub is_error: bool,
    pub shown_at: Instant,
}

/// A row marked with `d`, removed once [`REMOVAL_DELAY`] has passed.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingRemoval {
    pub set_id: SetId,
    pub item_id: ItemId,
    pub marked_at: Instant,
}

pub struct App {
    pub session: Session,
    pub config: Config,
    store: Box<dyn StateStore>,
    pub current_set: usize,
    pub table_state: TableState,
    pub input_mode: InputMode,
    pub name_input: String,
    pub flash: Option<Flash>,
    pub pending_removals: Vec<PendingRemoval>,
    pub should_quit: bool,
    pub colors: ThemeColors,
    clipboard: ClipboardHandle,
}

impl App {
    pub fn new(
        session: Session,
        config: Config,
        store: Box<dyn StateStore>,
        colors: ThemeColors,
    ) -> Self {
        let mut table_state = TableState::default();
        if session.collection.by_index(0).is_some_and(|set| !set.is_empty()) {
            table_state.select(Some(0));
        }

        Self {
            session,
            config,
            store,
            current_set: 0,
            table_state,
            input_mode: InputMode::Normal,
            name_input: String::new(),
            flash: None,
            pending_removals: Vec::new(),
            should_quit: false,
            colors,
            clipboard: ClipboardHandle::new(),
        }
    }

    pub fn store(&self) -> &dyn StateStore {
        self.store.as_ref()
    }

    pub fn current(&self) -> Option<&ItemSet> {
        self.session.collection.by_index(self.current_set)
    }

    fn current_mut(&mut self) -> Option<&mut ItemSet> {
        self.session.collection.by_index_mut(self.current_set)
    }

    pub fn current_title(&self) -> &str {
        self.current()
            .map(|set| self.session.titles.get(set.set_id()))
            .unwrap_or_default()
    }

    pub fn selected_item_id(&self) -> Option<ItemId> {
        let set = self.current()?;
        let index = self.table_state.selected()?;
        set.items().get(index).map(|item| item.id)
    }

    pub fn is_pending_removal(&self, set_id: &SetId, item_id: ItemId) -> bool {
        self.pending_removals
            .iter()
            .any(|pending| &pending.set_id == set_id && pending.item_id == item_id)
    }

    // Navigation

    pub fn next_row(&mut self) {
        let len = self.current().map_or(0, ItemSet::len);
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.table_state.select(Some(i));
    }

    pub fn previous_row(&mut self) {
        let len = self.current().map_or(0, ItemSet::len);
        if len == 0 {
            return;
        }
        let i = match self.table_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.table_state.select(Some(i));
    }

    pub fn select_set(&mut self, index: usize) {
        if index >= self.session.collection.len() || index == self.current_set {
            return;
        }
        self.current_set = index;
        self.table_state.select(None);
        self.clamp_selection();
    }

    pub fn next_set(&mut self) {
        let count = self.session.collection.len();
        if count > 1 {
            self.select_set((self.current_set + 1) % count);
        }
    }

    pub fn previous_set(&mut self) {
        let count = self.session.collection.len();
        if count > 1 {
            self.select_set((self.current_set + count - 1) % count);
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.current().map_or(0, ItemSet::len);
        match self.table_state.selected() {
            _ if len == 0 => self.table_state.select(None),
            Some(i) if i >= len => self.table_state.select(Some(len - 1)),
            None => self.table_state.select(Some(0)),
            Some(_) => {}
        }
    }

    // Name editing

    pub fn start_edit(&mut self) {
        let Some(id) = self.selected_item_id() else {
            return;
        };
        self.name_input = self
            .current()
            .and_then(|set| set.item(id))
            .map(|item| item.name.clone())
            .unwrap_or_default();
        self.input_mode = InputMode::EditName { item: id };
    }

    pub fn edit_push(&mut self, c: char) {
        self.name_input.push(c);
        self.apply_name_input();
    }

    pub fn edit_backspace(&mut self) {
        if self.name_input.pop().is_some() {
            self.apply_name_input();
        }
    }

    /// Names are applied on every keystroke so the scores update live.
    fn apply_name_input(&mut self) {
        let InputMode::EditName { item } = self.input_mode else {
            return;
        };
        let name = self.name_input.clone();
        let changed = self
            .current_mut()
            .is_some_and(|set| set.set_name(item, name));
        if changed {
            self.persist();
        }
    }

    /// Enter: keep the name and continue editing the next row, if any.
    pub fn confirm_edit(&mut self) {
        let InputMode::EditName { item } = self.input_mode else {
            return;
        };
        let len = self.current().map_or(0, ItemSet::len);
        let position = self.current().and_then(|set| set.position_of(item));
        match position {
            Some(i) if i + 1 < len => {
                self.table_state.select(Some(i + 1));
                self.start_edit();
            }
            _ => self.finish_edit(),
        }
    }

    pub fn finish_edit(&mut self) {
        self.input_mode = InputMode::Normal;
        self.name_input.clear();
    }

    // Scores and items

    /// Nudge the selected score by `steps` increments of the configured step.
    pub fn nudge_selected(&mut self, steps: f64) {
        let Some(id) = self.selected_item_id() else {
            return;
        };
        let Some(set) = self.current_mut() else {
            return;
        };
        let delta = set.step() * steps;
        if set.nudge_score(id, delta) {
            self.persist();
        }
    }

    pub fn add_item(&mut self) {
        let Some(set) = self.current_mut() else {
            return;
        };
        match set.add_item() {
            Some(id) => {
                let position = set.position_of(id);
                self.table_state.select(position);
                self.persist();
            }
            None => {
                let max = set.max_count();
                self.show_error(format!("ワインは最大{}本までです", max));
            }
        }
    }

    /// Mark the selected row for removal. The removal itself happens in
    /// [`App::commit_due_removals`] once the fade delay has passed.
    pub fn mark_selected_for_removal(&mut self, now: Instant) {
        let Some(item_id) = self.selected_item_id() else {
            return;
        };
        let Some(set) = self.current() else {
            return;
        };
        let set_id = set.set_id().clone();
        if self.is_pending_removal(&set_id, item_id) {
            return;
        }

        let already_pending = self
            .pending_removals
            .iter()
            .filter(|pending| pending.set_id == set_id)
            .count();
        if set.len().saturating_sub(already_pending) <= set.min_count() {
            let min = set.min_count();
            self.show_error(format!("ワインは最低{}本必要です", min));
            return;
        }

        self.pending_removals.push(PendingRemoval {
            set_id,
            item_id,
            marked_at: now,
        });
    }

    /// Remove every marked row whose delay has elapsed. Items are resolved
    /// by id, so earlier removals never shift a later one onto the wrong row.
    pub fn commit_due_removals(&mut self, now: Instant) {
        let (due, waiting): (Vec<_>, Vec<_>) = self
            .pending_removals
            .drain(..)
            .partition(|pending| now.duration_since(pending.marked_at) >= REMOVAL_DELAY);
        self.pending_removals = waiting;

        let mut removed = 0;
        for pending in due {
            if let Some(set) = self.session.collection.get_mut(&pending.set_id) {
                if set.remove_item(pending.item_id) {
                    removed += 1;
                }
            }
        }

        if removed > 0 {
            tracing::debug!(removed, "Committed pending removals");
            if let InputMode::EditName { item } = self.input_mode {
                if self.current().is_none_or(|set| set.item(item).is_none()) {
                    self.finish_edit();
                }
            }
            self.clamp_selection();
            self.persist();
        }
    }

    pub fn distribute_current(&mut self) {
        let Some(set) = self.current_mut() else {
            return;
        };
        set.force_distribute();
        let total = format_score(set.total());
        self.persist();
        self.show_flash(format!("均等に配分しました (合計 {})", total));
    }

    // Copy names between sets

    pub fn start_copy_from(&mut self) {
        if self.session.collection.len() < 2 {
            self.show_error("コピー元のセットがありません".to_string());
            return;
        }
        self.input_mode = InputMode::CopyFrom;
    }

    /// Copy names from the set at `source_index` into the current set.
    pub fn copy_from(&mut self, source_index: usize) {
        self.input_mode = InputMode::Normal;
        let collection = &self.session.collection;
        let (Some(target), Some(source)) = (
            collection.by_index(self.current_set).map(|s| s.set_id().clone()),
            collection.by_index(source_index).map(|s| s.set_id().clone()),
        ) else {
            return;
        };

        if self.session.collection.copy_names(&target, &source) {
            let title = self.session.titles.get(&source).to_string();
            self.clamp_selection();
            self.persist();
            self.show_flash(format!("{}から名前をコピーしました", title));
        }
    }

    /// Bracketed paste: one name per line, starting at the selected row.
    ///
    /// A single line pasted while editing is inserted into the name instead.
    pub fn paste(&mut self, text: &str) {
        let names: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if names.is_empty() {
            return;
        }

        if let InputMode::EditName { .. } = self.input_mode {
            if names.len() == 1 {
                self.name_input.push_str(names[0]);
                self.apply_name_input();
                return;
            }
            self.finish_edit();
        }

        let Some(start) = self.selected_item_id() else {
            return;
        };
        let applied = self
            .current_mut()
            .map_or(0, |set| set.bulk_assign_names(start, &names));
        if applied > 0 {
            self.persist();
        }
        if applied < names.len() {
            self.show_error(format!(
                "{}件を貼り付けました ({}件は上限を超えたため無視)",
                applied,
                names.len() - applied
            ));
        } else {
            self.show_flash(format!("{}件の名前を貼り付けました", applied));
        }
    }

    // Export

    pub fn export_csv(&mut self, now: DateTime<Local>) {
        let path = default_export_path(&self.config, now);
        match write_csv_file(&path, &self.session.collection, &self.session.titles) {
            Ok(()) => self.show_flash(format!("CSVを保存しました: {}", path.display())),
            Err(e) => {
                tracing::warn!(error = %e, "CSV export failed");
                self.show_error(format!("CSVの保存に失敗しました: {}", e));
            }
        }
    }

    pub fn copy_tsv(&mut self) {
        let text = match to_delimited_text(
            &self.session.collection,
            &self.session.titles,
            DelimitedFormat::Tsv,
        ) {
            Ok(text) => text,
            Err(e) => {
                self.show_error(format!("コピーに失敗しました: {}", e));
                return;
            }
        };
        match self.clipboard.copy_text(&text) {
            Ok(_) => self.show_flash("クリップボードにコピーしました".to_string()),
            Err(e) => self.show_error(format!("コピーに失敗しました: {}", e)),
        }
    }

    // Reset

    pub fn request_reset(&mut self) {
        self.input_mode = InputMode::ConfirmReset;
    }

    pub fn confirm_reset(&mut self) {
        self.session = clear_session(self.store.as_ref(), &self.config);
        self.pending_removals.clear();
        self.input_mode = InputMode::Normal;
        self.table_state.select(None);
        self.clamp_selection();
        self.show_flash("すべてのデータをリセットしました".to_string());
    }

    pub fn cancel(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn show_help(&mut self) {
        self.input_mode = InputMode::Help;
    }

    // Flash messages and ticks

    pub fn show_flash(&mut self, message: String) {
        self.flash = Some(Flash {
            message,
            is_error: false,
            shown_at: Instant::now(),
        });
    }

    pub fn show_error(&mut self, message: String) {
        self.flash = Some(Flash {
            message,
            is_error: true,
            shown_at: Instant::now(),
        });
    }

    pub fn update_flash(&mut self, now: Instant) {
        if let Some(flash) = &self.flash {
            if now.duration_since(flash.shown_at) >= FLASH_DURATION {
                self.flash = None;
            }
        }
    }

    pub fn on_tick(&mut self, now: Instant) {
        self.update_flash(now);
        self.commit_due_removals(now);
    }

    fn persist(&mut self) {
        if let Err(e) = save_session(self.store.as_ref(), &self.session) {
            tracing::warn!(error = %e, "Failed to save ratings");
            self.show_error(format!("保存に失敗しました: {}", e));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{decode, MemoryStore};

    fn config() -> Config {
        let mut config = Config::default();
        config.limits.min_items = 3;
        config.limits.max_items = 5;
        config
    }

    fn app() -> App {
        let config = config();
        let session = Session::fresh(&config);
        App::new(
            session,
            config,
            Box::new(MemoryStore::new()),
            ThemeColors::dark(),
        )
    }

    fn type_name(app: &mut App, name: &str) {
        for c in name.chars() {
            app.edit_push(c);
        }
    }

    fn scores(app: &App) -> Vec<f64> {
        app.current().unwrap().items().iter().map(|i| i.score).collect()
    }

    fn saved_names(app: &App) -> Vec<String> {
        let text = app.store().load().unwrap().unwrap();
        let record = decode(&text).unwrap();
        record.sets[&SetId::new("set1")]
            .wines
            .iter()
            .map(|wine| wine.name.clone())
            .collect()
    }

    #[test]
    fn test_row_navigation_wraps() {
        let mut app = app();
        assert_eq!(app.table_state.selected(), Some(0));
        app.previous_row();
        assert_eq!(app.table_state.selected(), Some(2));
        app.next_row();
        assert_eq!(app.table_state.selected(), Some(0));
    }

    #[test]
    fn test_set_switching_resets_selection() {
        let mut app = app();
        app.next_row();
        app.next_set();
        assert_eq!(app.current_set, 1);
        assert_eq!(app.table_state.selected(), Some(0));
        app.previous_set();
        app.previous_set();
        assert_eq!(app.current_set, 3);
        app.select_set(9);
        assert_eq!(app.current_set, 3);
    }

    #[test]
    fn test_editing_updates_scores_live_and_saves() {
        let mut app = app();
        app.start_edit();
        type_name(&mut app, "Chablis");
        assert_eq!(scores(&app), vec![10.0, 0.0, 0.0]);

        app.confirm_edit();
        assert_eq!(app.input_mode, InputMode::EditName { item: app.selected_item_id().unwrap() });
        assert_eq!(app.table_state.selected(), Some(1));
        type_name(&mut app, "Soave");
        assert_eq!(scores(&app), vec![5.0, 5.0, 0.0]);
        assert_eq!(saved_names(&app), vec!["Chablis", "Soave", ""]);
    }

    #[test]
    fn test_confirm_edit_on_last_row_leaves_edit_mode() {
        let mut app = app();
        app.previous_row();
        app.start_edit();
        type_name(&mut app, "Gavi");
        app.confirm_edit();
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.name_input.is_empty());
    }

    #[test]
    fn test_backspace_reapplies_name() {
        let mut app = app();
        app.start_edit();
        app.edit_push('A');
        app.edit_backspace();
        assert_eq!(scores(&app), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_nudge_switches_to_manual() {
        let mut app = app();
        app.nudge_selected(1.0);
        assert!(app.current().unwrap().is_manual());
        assert_eq!(scores(&app)[0], 0.25);
        app.nudge_selected(-2.0);
        assert_eq!(scores(&app)[0], 0.0);

        app.distribute_current();
        assert!(!app.current().unwrap().is_manual());
        assert!(app.flash.is_some());
    }

    #[test]
    fn test_add_item_selects_new_row_and_stops_at_max() {
        let mut app = app();
        app.add_item();
        assert_eq!(app.table_state.selected(), Some(3));
        app.add_item();
        app.add_item();
        assert_eq!(app.current().unwrap().len(), 5);
        assert!(app.flash.as_ref().unwrap().is_error);
    }

    #[test]
    fn test_removal_is_deferred_until_delay() {
        let mut app = app();
        app.add_item();
        let marked = app.selected_item_id().unwrap();
        let now = Instant::now();
        app.mark_selected_for_removal(now);
        assert!(app.is_pending_removal(&SetId::new("set1"), marked));

        app.commit_due_removals(now + Duration::from_millis(50));
        assert_eq!(app.current().unwrap().len(), 4);

        app.commit_due_removals(now + REMOVAL_DELAY);
        assert_eq!(app.current().unwrap().len(), 3);
        assert!(app.current().unwrap().item(marked).is_none());
        assert!(app.pending_removals.is_empty());
        assert_eq!(app.table_state.selected(), Some(2));
    }

    #[test]
    fn test_removing_edited_row_ends_edit() {
        let mut app = app();
        app.add_item();
        let marked = app.selected_item_id().unwrap();
        let now = Instant::now();
        app.mark_selected_for_removal(now);
        app.start_edit();
        app.edit_push('X');
        assert_eq!(app.input_mode, InputMode::EditName { item: marked });

        app.commit_due_removals(now + REMOVAL_DELAY);
        assert!(app.current().unwrap().item(marked).is_none());
        assert_eq!(app.input_mode, InputMode::Normal);
        assert!(app.name_input.is_empty());

        // Typing now edits nothing instead of a vanished row
        app.edit_push('Y');
        assert!(app.current().unwrap().items().iter().all(|item| item.name.is_empty()));
    }

    #[test]
    fn test_removing_other_row_keeps_edit() {
        let mut app = app();
        app.add_item();
        let now = Instant::now();
        app.mark_selected_for_removal(now);
        app.previous_row();
        let edited = app.selected_item_id().unwrap();
        app.start_edit();

        app.commit_due_removals(now + REMOVAL_DELAY);
        assert_eq!(app.input_mode, InputMode::EditName { item: edited });
    }

    #[test]
    fn test_pending_removals_respect_minimum() {
        let mut app = app();
        app.add_item();
        let now = Instant::now();
        app.mark_selected_for_removal(now);
        app.previous_row();
        app.mark_selected_for_removal(now);
        assert_eq!(app.pending_removals.len(), 1);
        assert!(app.flash.as_ref().unwrap().is_error);
    }

    #[test]
    fn test_removals_resolve_by_identity() {
        let mut app = app();
        app.add_item();
        app.add_item();
        let now = Instant::now();
        // Mark rows 0 and 1; removing row 0 first must not shift the second removal
        let first = app.current().unwrap().items()[0].id;
        let second = app.current().unwrap().items()[1].id;
        let third = app.current().unwrap().items()[2].id;
        app.table_state.select(Some(0));
        app.mark_selected_for_removal(now);
        app.table_state.select(Some(1));
        app.mark_selected_for_removal(now);

        app.commit_due_removals(now + REMOVAL_DELAY);
        let set = app.current().unwrap();
        assert!(set.item(first).is_none());
        assert!(set.item(second).is_none());
        assert!(set.item(third).is_some());
    }

    #[test]
    fn test_copy_from_other_set() {
        let mut app = app();
        app.start_edit();
        type_name(&mut app, "Chablis");
        app.finish_edit();

        app.select_set(1);
        app.start_copy_from();
        assert_eq!(app.input_mode, InputMode::CopyFrom);
        app.copy_from(0);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.current().unwrap().items()[0].name, "Chablis");
        assert_eq!(app.flash.as_ref().unwrap().message, "セット1から名前をコピーしました");
    }

    #[test]
    fn test_copy_from_self_is_noop() {
        let mut app = app();
        app.copy_from(0);
        assert!(app.flash.is_none());
    }

    #[test]
    fn test_paste_assigns_lines_from_selection() {
        let mut app = app();
        app.next_row();
        app.paste("Chablis\n\n  Soave \r\nGavi\nBarolo\nBarbaresco");
        let names: Vec<String> = app
            .current()
            .unwrap()
            .items()
            .iter()
            .map(|i| i.name.clone())
            .collect();
        assert_eq!(names, vec!["", "Chablis", "Soave", "Gavi", "Barolo"]);
        assert!(app.flash.as_ref().unwrap().is_error);
    }

    #[test]
    fn test_single_line_paste_while_editing() {
        let mut app = app();
        app.start_edit();
        app.edit_push('A');
        app.paste("lsace\n");
        assert_eq!(app.name_input, "Alsace");
        assert_eq!(app.current().unwrap().items()[0].name, "Alsace");
    }

    #[test]
    fn test_reset_clears_store() {
        let mut app = app();
        app.start_edit();
        type_name(&mut app, "Chablis");
        app.finish_edit();
        assert!(app.store().load().unwrap().is_some());

        app.request_reset();
        assert_eq!(app.input_mode, InputMode::ConfirmReset);
        app.confirm_reset();
        assert!(app.store().load().unwrap().is_none());
        assert!(app.current().unwrap().items().iter().all(|i| i.name.is_empty()));
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn test_export_csv_writes_into_export_dir() {
        let mut app = app();
        let dir = tempfile::tempdir().unwrap();
        app.config.export_dir = Some(dir.path().display().to_string());
        let now = Local::now();
        app.export_csv(now);
        let path = default_export_path(&app.config, now);
        assert!(path.exists());
        assert!(!app.flash.as_ref().unwrap().is_error);
    }

    #[test]
    fn test_flash_expires() {
        let mut app = app();
        app.show_flash("hello".to_string());
        let shown = app.flash.as_ref().unwrap().shown_at;
        app.update_flash(shown + Duration::from_secs(1));
        assert!(app.flash.is_some());
        app.update_flash(shown + FLASH_DURATION);
        assert!(app.flash.is_none());
    }
}
