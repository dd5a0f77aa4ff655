//! Interactive directory browser.
//!
//! [`Navigator`] owns all session state: the directory being shown, the
//! selection and its scroll window, and the chart cursor for the selected
//! entry's history. Every key press maps to one [`Action`]; the terminal
//! front end in [`ui`] only draws what the navigator exposes.

pub mod chart;
pub mod input;
pub mod units;
#[cfg(feature = "tui")]
pub mod ui;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::store::{SizePoint, Store};
use crate::util::Unit;
use chart::{ChartLayout, Viewport};
pub use input::Action;
use units::UnitCycle;

pub const PARENT_ENTRY: &str = "..";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    /// latest recorded size, 0 when never recorded
    pub size: u64,
}

impl Entry {
    fn parent() -> Self {
        Entry {
            name: PARENT_ENTRY.to_string(),
            size: 0,
        }
    }

    pub fn is_parent(&self) -> bool {
        self.name == PARENT_ENTRY
    }
}

/// Inclusive range of list rows currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollWindow {
    pub start: usize,
    pub end: usize,
}

impl ScrollWindow {
    fn at(start: usize, rows: usize) -> Self {
        ScrollWindow {
            start,
            end: start + rows.max(1) - 1,
        }
    }

    pub fn rows(&self) -> usize {
        self.end - self.start + 1
    }
}

pub struct Navigator {
    store: Store,
    current: PathBuf,
    previous: Option<PathBuf>,
    entries: Vec<Entry>,
    selected: usize,
    window: ScrollWindow,
    chart_offset: usize,
    chart_selected: usize,
    chart_capacity: usize,
    // rows only change between recorder runs, so a session never refetches
    history: HashMap<PathBuf, Vec<SizePoint>>,
    units: HashMap<PathBuf, UnitCycle>,
    quit: bool,
}

impl Navigator {
    pub fn new(store: Store, start: PathBuf, list_rows: usize, chart_capacity: usize) -> Self {
        let mut nav = Navigator {
            store,
            current: start.clone(),
            previous: None,
            entries: Vec::new(),
            selected: 0,
            window: ScrollWindow::at(0, list_rows),
            chart_offset: 0,
            chart_selected: 0,
            chart_capacity: chart_capacity.max(1),
            history: HashMap::new(),
            units: HashMap::new(),
            quit: false,
        };
        nav.change_directory(start, None);
        nav
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::Quit => self.quit = true,
            Action::SelectUp => self.move_up(),
            Action::SelectDown => self.move_down(),
            Action::Enter => self.enter_selected(),
            Action::Parent => self.go_parent(),
            Action::JumpTop => self.jump_top(),
            Action::ChartLeft => self.chart_left(),
            Action::ChartRight => self.chart_right(),
            Action::CycleUnit => self.cycle_unit(),
            Action::None => {}
        }
    }

    /// Adapts to the space the front end has for the list and the chart.
    pub fn set_viewport(&mut self, list_rows: usize, chart_capacity: usize) {
        let list_rows = list_rows.max(1);
        if list_rows != self.window.rows() {
            self.window = ScrollWindow::at(self.window.start, list_rows);
            self.keep_selection_visible();
        }

        let chart_capacity = chart_capacity.max(1);
        if chart_capacity != self.chart_capacity {
            self.chart_capacity = chart_capacity;
            self.reset_chart();
        }
    }

    /// Re-lists the current directory. Called before every redraw so the
    /// listing always reflects the filesystem and the store.
    pub fn refresh(&mut self) {
        let selected_name = self.selected_entry().map(|e| e.name.clone());
        self.entries = self.list_entries();

        let found = selected_name.and_then(|name| self.entries.iter().position(|e| e.name == name));
        match found {
            Some(idx) => self.selected = idx,
            None => {
                self.selected = self.selected.min(self.entries.len().saturating_sub(1));
                self.reset_chart();
            }
        }
        self.keep_selection_visible();

        if let Some(path) = self.selected_path() {
            let size = self.selected_size();
            if let Some(cycle) = self.units.get_mut(&path) {
                cycle.resize(size);
            }
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn current(&self) -> &Path {
        &self.current
    }

    pub fn previous(&self) -> Option<&Path> {
        self.previous.as_deref()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn window(&self) -> ScrollWindow {
        self.window
    }

    pub fn chart_offset(&self) -> usize {
        self.chart_offset
    }

    pub fn chart_selected(&self) -> usize {
        self.chart_selected
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.entries.get(self.selected)
    }

    /// Entries inside the scroll window, paired with their list index.
    pub fn visible_entries(&self) -> impl Iterator<Item = (usize, &Entry)> {
        self.entries
            .iter()
            .enumerate()
            .skip(self.window.start)
            .take(self.window.rows())
    }

    /// Filesystem path behind the selection; `..` resolves to the parent.
    pub fn selected_path(&self) -> Option<PathBuf> {
        let entry = self.selected_entry()?;
        if entry.is_parent() {
            self.current.parent().map(Path::to_path_buf)
        } else {
            Some(self.current.join(&entry.name))
        }
    }

    /// Latest size of the directory behind the selection. `..` carries no
    /// size of its own, so the parent's newest history point is used.
    pub fn selected_size(&mut self) -> u64 {
        let own = match self.selected_entry() {
            Some(entry) if entry.is_parent() => None,
            Some(entry) => Some(entry.size),
            None => Some(0),
        };
        own.unwrap_or_else(|| self.selected_history().last().map(|p| p.size).unwrap_or(0))
    }

    pub fn active_unit(&self) -> Unit {
        self.selected_path()
            .and_then(|p| self.units.get(&p))
            .map(UnitCycle::current)
            .unwrap_or(Unit::Human)
    }

    pub fn selected_history(&mut self) -> &[SizePoint] {
        let Some(path) = self.selected_path() else {
            return &[];
        };
        let store = &self.store;
        self.history
            .entry(path)
            .or_insert_with_key(|path| load_history(store, path))
    }

    pub fn chart(&mut self, viewport: Viewport) -> ChartLayout {
        let offset = self.chart_offset;
        let selected = self.chart_selected;
        let unit = self.active_unit();
        chart::layout(self.selected_history(), viewport, offset, selected, unit)
    }

    fn move_up(&mut self) {
        if self.selected == 0 {
            return;
        }
        self.selected -= 1;
        if self.selected < self.window.start {
            self.window = ScrollWindow::at(self.selected, self.window.rows());
        }
        self.reset_chart();
    }

    fn move_down(&mut self) {
        if self.selected + 1 >= self.entries.len() {
            return;
        }
        self.selected += 1;
        if self.selected > self.window.end {
            let rows = self.window.rows();
            self.window = ScrollWindow::at(self.selected + 1 - rows, rows);
        }
        self.reset_chart();
    }

    fn enter_selected(&mut self) {
        let Some(entry) = self.selected_entry() else {
            return;
        };

        if entry.is_parent() {
            self.go_parent();
        } else {
            let target = self.current.join(&entry.name);
            self.change_directory(target, None);
        }
    }

    fn go_parent(&mut self) {
        let Some(parent) = self.current.parent().map(Path::to_path_buf) else {
            return;
        };
        let child = self.current.clone();
        self.change_directory(parent, Some(child));
    }

    fn jump_top(&mut self) {
        self.selected = 0;
        self.window = ScrollWindow::at(0, self.window.rows());
        self.chart_offset = 0;
        self.chart_selected = 0;
    }

    fn chart_left(&mut self) {
        if self.chart_offset > 0 {
            self.chart_offset -= 1;
        }
        self.chart_selected = self.chart_selected.saturating_sub(1);
    }

    fn chart_right(&mut self) {
        let len = self.selected_history().len();
        let capacity = self.chart_capacity;

        if self.chart_offset + capacity < len {
            self.chart_offset += 1;
            self.chart_selected = (self.chart_selected + 1).min(capacity - 1);
        } else {
            let visible = len.saturating_sub(self.chart_offset).min(capacity);
            if self.chart_selected + 1 < visible {
                self.chart_selected += 1;
            }
        }
    }

    fn cycle_unit(&mut self) {
        let Some(path) = self.selected_path() else {
            return;
        };
        let size = self.selected_size();

        let cycle = self
            .units
            .entry(path)
            .or_insert_with(|| UnitCycle::for_size(size));
        cycle.resize(size);
        cycle.advance();
    }

    fn change_directory(&mut self, dir: PathBuf, previous: Option<PathBuf>) {
        debug!(dir = %dir.display(), "entering directory");
        self.current = dir;
        self.previous = previous;
        self.entries = self.list_entries();

        let rows = self.window.rows();
        let restored = self
            .previous
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy())
            .and_then(|name| {
                self.entries
                    .iter()
                    .position(|e| !e.is_parent() && e.name == name)
            });

        match restored {
            Some(idx) => {
                self.selected = idx;
                self.window = ScrollWindow::at(idx.saturating_sub(rows / 2), rows);
            }
            None => {
                self.selected = 0;
                self.window = ScrollWindow::at(0, rows);
            }
        }

        self.reset_chart();
    }

    fn keep_selection_visible(&mut self) {
        let rows = self.window.rows();
        if self.selected < self.window.start {
            self.window = ScrollWindow::at(self.selected, rows);
        } else if self.selected > self.window.end {
            self.window = ScrollWindow::at(self.selected + 1 - rows, rows);
        }
    }

    /// Points the chart at the most recent history of the selection.
    fn reset_chart(&mut self) {
        let len = self.selected_history().len();
        let capacity = self.chart_capacity;
        self.chart_offset = len.saturating_sub(capacity);
        self.chart_selected = len.min(capacity).saturating_sub(1);
    }

    fn list_entries(&self) -> Vec<Entry> {
        let mut entries = Vec::new();

        match fs::read_dir(&self.current) {
            Ok(read_dir) => {
                for dir_entry in read_dir.flatten() {
                    let is_dir = dir_entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                    if is_dir {
                        entries.push(Entry {
                            name: dir_entry.file_name().to_string_lossy().into_owned(),
                            size: 0,
                        });
                    }
                }
            }
            Err(e) => debug!(dir = %self.current.display(), error = %e, "cannot list directory"),
        }

        let latest = self
            .store
            .latest_under(&child_prefix(&self.current))
            .unwrap_or_else(|e| {
                warn!(dir = %self.current.display(), error = %e, "could not read latest sizes");
                HashMap::new()
            });

        for entry in &mut entries {
            let key = self.current.join(&entry.name);
            entry.size = latest.get(&*key.to_string_lossy()).copied().unwrap_or(0);
        }

        entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.name.cmp(&b.name)));

        if self.current.parent().is_some() {
            entries.insert(0, Entry::parent());
        }

        entries
    }
}

fn load_history(store: &Store, path: &Path) -> Vec<SizePoint> {
    store.history(&path.to_string_lossy()).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "could not read history");
        Vec::new()
    })
}

fn child_prefix(dir: &Path) -> String {
    let mut prefix = dir.to_string_lossy().into_owned();
    if !prefix.ends_with(std::path::MAIN_SEPARATOR) {
        prefix.push(std::path::MAIN_SEPARATOR);
    }
    prefix
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        _dir: tempfile::TempDir,
        root: PathBuf,
    }

    impl Fixture {
        /// root/{big,mid,small,empty}, with big/inner
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let root = dir.path().canonicalize().unwrap();
            for sub in ["big/inner", "mid", "small", "empty"] {
                fs::create_dir_all(root.join(sub)).unwrap();
            }
            fs::write(root.join("not-a-dir.txt"), "x").unwrap();
            Fixture { _dir: dir, root }
        }

        fn key(&self, sub: &str) -> String {
            self.root.join(sub).to_string_lossy().into_owned()
        }

        fn store(&self) -> Store {
            let store = Store::open_in_memory().unwrap();
            store.append(&self.key("big"), 3000, 100).unwrap();
            store.append(&self.key("big/inner"), 3000, 100).unwrap();
            store.append(&self.key("mid"), 2000, 100).unwrap();
            store.append(&self.key("small"), 500, 100).unwrap();
            store
        }

        fn navigator(&self, rows: usize) -> Navigator {
            Navigator::new(self.store(), self.root.clone(), rows, 10)
        }
    }

    fn names(nav: &Navigator) -> Vec<&str> {
        nav.entries().iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn listing_sorted_by_size_with_parent_first() {
        let fx = Fixture::new();
        let nav = fx.navigator(10);
        assert_eq!(names(&nav), vec!["..", "big", "mid", "small", "empty"]);
        assert_eq!(nav.entries()[1].size, 3000);
        assert_eq!(nav.entries()[4].size, 0);
    }

    #[test]
    fn filesystem_root_has_no_parent_entry() {
        let nav = Navigator::new(Store::open_in_memory().unwrap(), PathBuf::from("/"), 10, 10);
        assert!(nav.entries().iter().all(|e| !e.is_parent()));
    }

    #[test]
    fn parent_action_at_root_is_noop() {
        let mut nav = Navigator::new(Store::open_in_memory().unwrap(), PathBuf::from("/"), 10, 10);
        nav.apply(Action::Parent);
        assert_eq!(nav.current(), Path::new("/"));
    }

    #[test]
    fn moves_stop_at_list_boundaries() {
        let fx = Fixture::new();
        let mut nav = fx.navigator(10);

        nav.apply(Action::SelectUp);
        assert_eq!(nav.selected(), 0);

        for _ in 0..20 {
            nav.apply(Action::SelectDown);
        }
        assert_eq!(nav.selected(), 4);
    }

    #[test]
    fn scroll_window_follows_selection() {
        let fx = Fixture::new();
        let mut nav = fx.navigator(2);
        assert_eq!(nav.window(), ScrollWindow { start: 0, end: 1 });

        nav.apply(Action::SelectDown);
        assert_eq!(nav.window(), ScrollWindow { start: 0, end: 1 });

        nav.apply(Action::SelectDown);
        assert_eq!(nav.selected(), 2);
        assert_eq!(nav.window(), ScrollWindow { start: 1, end: 2 });

        nav.apply(Action::SelectUp);
        nav.apply(Action::SelectUp);
        assert_eq!(nav.window(), ScrollWindow { start: 0, end: 1 });

        let visible: Vec<&str> = nav.visible_entries().map(|(_, e)| e.name.as_str()).collect();
        assert_eq!(visible, vec!["..", "big"]);
    }

    #[test]
    fn entering_subdirectory_resets_state() {
        let fx = Fixture::new();
        let mut nav = fx.navigator(10);
        nav.apply(Action::SelectDown);
        nav.apply(Action::Enter);

        assert_eq!(nav.current(), fx.root.join("big"));
        assert_eq!(nav.previous(), None);
        assert_eq!(nav.selected(), 0);
        assert_eq!(names(&nav), vec!["..", "inner"]);
    }

    #[test]
    fn returning_to_parent_restores_selection() {
        let fx = Fixture::new();
        let mut nav = fx.navigator(10);
        nav.apply(Action::SelectDown);
        nav.apply(Action::SelectDown);
        nav.apply(Action::SelectDown);
        assert_eq!(nav.selected_entry().unwrap().name, "small");

        nav.apply(Action::Enter);
        assert_eq!(nav.current(), fx.root.join("small"));

        nav.apply(Action::Enter);
        assert_eq!(nav.current(), fx.root);
        assert_eq!(nav.previous(), Some(fx.root.join("small").as_path()));
        assert_eq!(nav.selected_entry().unwrap().name, "small");
    }

    #[test]
    fn restored_selection_is_centered_in_window() {
        let fx = Fixture::new();
        let mut nav = fx.navigator(2);
        for _ in 0..4 {
            nav.apply(Action::SelectDown);
        }
        nav.apply(Action::Enter);
        nav.apply(Action::Parent);

        assert_eq!(nav.selected(), 4);
        assert_eq!(nav.window(), ScrollWindow { start: 3, end: 4 });
    }

    #[test]
    fn jump_top_resets_selection_and_chart() {
        let fx = Fixture::new();
        let mut nav = fx.navigator(2);
        nav.apply(Action::SelectDown);
        nav.apply(Action::SelectDown);
        nav.apply(Action::SelectDown);

        nav.apply(Action::JumpTop);
        assert_eq!(nav.selected(), 0);
        assert_eq!(nav.window(), ScrollWindow { start: 0, end: 1 });
        assert_eq!(nav.chart_offset(), 0);
    }

    #[test]
    fn quit_sets_flag() {
        let fx = Fixture::new();
        let mut nav = fx.navigator(5);
        assert!(!nav.should_quit());
        nav.apply(Action::Quit);
        assert!(nav.should_quit());
    }

    fn history_navigator(points: usize, capacity: usize) -> (Fixture, Navigator) {
        let fx = Fixture::new();
        let store = Store::open_in_memory().unwrap();
        for i in 0..points {
            store.append(&fx.key("mid"), 1000 + i as u64, 100 * (i as i64 + 1)).unwrap();
        }
        let mut nav = Navigator::new(store, fx.root.clone(), 10, capacity);
        while nav.selected_entry().map(|e| e.name.as_str()) != Some("mid") {
            nav.apply(Action::SelectDown);
        }
        (fx, nav)
    }

    #[test]
    fn selection_change_shows_most_recent_history() {
        let (_fx, mut nav) = history_navigator(5, 3);
        assert_eq!(nav.selected_history().len(), 5);
        assert_eq!(nav.chart_offset(), 2);
        assert_eq!(nav.chart_selected(), 2);
    }

    #[test]
    fn chart_scrolls_left_until_start() {
        let (_fx, mut nav) = history_navigator(5, 3);

        nav.apply(Action::ChartLeft);
        assert_eq!((nav.chart_offset(), nav.chart_selected()), (1, 1));
        nav.apply(Action::ChartLeft);
        assert_eq!((nav.chart_offset(), nav.chart_selected()), (0, 0));
        nav.apply(Action::ChartLeft);
        assert_eq!((nav.chart_offset(), nav.chart_selected()), (0, 0));
    }

    #[test]
    fn chart_scrolls_right_until_latest() {
        let (_fx, mut nav) = history_navigator(5, 3);
        nav.apply(Action::ChartLeft);
        nav.apply(Action::ChartLeft);

        nav.apply(Action::ChartRight);
        assert_eq!((nav.chart_offset(), nav.chart_selected()), (1, 1));
        nav.apply(Action::ChartRight);
        assert_eq!((nav.chart_offset(), nav.chart_selected()), (2, 2));
        nav.apply(Action::ChartRight);
        assert_eq!((nav.chart_offset(), nav.chart_selected()), (2, 2));
    }

    #[test]
    fn short_history_moves_highlight_only() {
        let (_fx, mut nav) = history_navigator(2, 10);
        assert_eq!((nav.chart_offset(), nav.chart_selected()), (0, 1));

        nav.apply(Action::ChartLeft);
        assert_eq!((nav.chart_offset(), nav.chart_selected()), (0, 0));
        nav.apply(Action::ChartRight);
        nav.apply(Action::ChartRight);
        assert_eq!((nav.chart_offset(), nav.chart_selected()), (0, 1));
    }

    #[test]
    fn unit_cycle_for_small_directory() {
        let fx = Fixture::new();
        let mut nav = fx.navigator(10);
        while nav.selected_entry().map(|e| e.name.as_str()) != Some("small") {
            nav.apply(Action::SelectDown);
        }

        let mut seen = Vec::new();
        for _ in 0..4 {
            nav.apply(Action::CycleUnit);
            seen.push(nav.active_unit());
        }
        assert_eq!(seen, vec![Unit::Bytes, Unit::KiB, Unit::Human, Unit::Bytes]);
    }

    #[test]
    fn unit_choice_is_per_directory() {
        let fx = Fixture::new();
        let mut nav = fx.navigator(10);
        nav.apply(Action::SelectDown);
        nav.apply(Action::CycleUnit);
        assert_eq!(nav.active_unit(), Unit::Bytes);

        nav.apply(Action::SelectDown);
        assert_eq!(nav.active_unit(), Unit::Human);

        nav.apply(Action::SelectUp);
        assert_eq!(nav.active_unit(), Unit::Bytes);
    }

    #[test]
    fn unit_cycle_on_parent_entry_uses_parent_size() {
        let fx = Fixture::new();
        let store = fx.store();
        store.append(&fx.key("big"), 5 * 1024 * 1024, 200).unwrap();
        let mut nav = Navigator::new(store, fx.root.join("big"), 10, 10);

        // step into inner so that .. stands for big
        nav.apply(Action::SelectDown);
        nav.apply(Action::Enter);
        assert!(nav.selected_entry().unwrap().is_parent());
        assert_eq!(nav.selected_size(), 5 * 1024 * 1024);

        let mut seen = Vec::new();
        for _ in 0..4 {
            nav.apply(Action::CycleUnit);
            seen.push(nav.active_unit());
        }
        assert_eq!(seen, vec![Unit::Bytes, Unit::KiB, Unit::MiB, Unit::Human]);
    }

    #[test]
    fn refresh_picks_up_new_directories() {
        let fx = Fixture::new();
        let mut nav = fx.navigator(10);
        nav.apply(Action::SelectDown);

        fs::create_dir(fx.root.join("aaa-new")).unwrap();
        nav.refresh();

        assert!(names(&nav).contains(&"aaa-new"));
        assert_eq!(nav.selected_entry().unwrap().name, "big");
    }

    #[test]
    fn refresh_clamps_selection_when_entry_disappears() {
        let fx = Fixture::new();
        let mut nav = fx.navigator(10);
        for _ in 0..4 {
            nav.apply(Action::SelectDown);
        }
        assert_eq!(nav.selected_entry().unwrap().name, "empty");

        fs::remove_dir(fx.root.join("empty")).unwrap();
        nav.refresh();
        assert_eq!(nav.selected(), 3);
    }

    #[test]
    fn vanished_directory_lists_only_parent() {
        let fx = Fixture::new();
        let mut nav = fx.navigator(10);
        nav.apply(Action::SelectDown);
        fs::remove_dir_all(fx.root.join("big")).unwrap();
        nav.apply(Action::Enter);

        assert_eq!(names(&nav), vec![".."]);
        nav.apply(Action::Enter);
        assert_eq!(nav.current(), fx.root);
    }

    #[test]
    fn parent_entry_charts_the_parent_directory() {
        let fx = Fixture::new();
        let store = fx.store();
        store.append(&fx.root.to_string_lossy(), 5500, 100).unwrap();
        let mut nav = Navigator::new(store, fx.root.clone(), 10, 10);

        assert!(nav.selected_entry().unwrap().is_parent());
        assert_eq!(nav.selected_path(), fx.root.parent().map(Path::to_path_buf));

        nav.apply(Action::SelectDown);
        nav.apply(Action::Enter);
        nav.apply(Action::JumpTop);
        assert_eq!(nav.selected_history().len(), 1);
    }
}
