//! Data Table Model
//!
//! Column definitions and the table state machine (sorting, filtering,
//! pagination, selection, column visibility). Rendering lives in
//! `components::data_table`; everything here is plain data.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::Arc;

use leptos::prelude::AnyView;
use thiserror::Error;

use crate::models::Entity;

/// Reserved id of the checkbox column the table adds itself
pub const SELECT_COLUMN: &str = "select";

pub const DEFAULT_FILTER_COLUMN: &str = "name";

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl CellValue {
    pub fn display(&self) -> String {
        match self {
            CellValue::Text(text) => text.clone(),
            CellValue::Number(n) => n.to_string(),
            CellValue::Bool(flag) => flag.to_string(),
            CellValue::Empty => String::new(),
        }
    }

    /// Total order used for sorting; empty cells sink to the end
    pub fn compare(&self, other: &CellValue) -> Ordering {
        match (self, other) {
            (CellValue::Empty, CellValue::Empty) => Ordering::Equal,
            (CellValue::Empty, _) => Ordering::Greater,
            (_, CellValue::Empty) => Ordering::Less,
            (CellValue::Number(a), CellValue::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            (a, b) => a.display().to_lowercase().cmp(&b.display().to_lowercase()),
        }
    }
}

pub type Accessor<T> = fn(&T) -> CellValue;
pub type CellRenderer<T> = Arc<dyn Fn(&T) -> AnyView + Send + Sync>;

pub struct ColumnDef<T> {
    pub id: &'static str,
    pub header: String,
    /// Raw value used for sorting, filtering and default rendering
    pub accessor: Option<Accessor<T>>,
    pub cell: Option<CellRenderer<T>>,
    pub sortable: bool,
    pub hideable: bool,
}

impl<T> Clone for ColumnDef<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            header: self.header.clone(),
            accessor: self.accessor,
            cell: self.cell.clone(),
            sortable: self.sortable,
            hideable: self.hideable,
        }
    }
}

impl<T> ColumnDef<T> {
    /// Data column backed by an accessor
    pub fn accessor(id: &'static str, header: impl Into<String>, accessor: Accessor<T>) -> Self {
        Self {
            id,
            header: header.into(),
            accessor: Some(accessor),
            cell: None,
            sortable: true,
            hideable: true,
        }
    }

    /// Render-only column (actions and the like)
    pub fn display(
        id: &'static str,
        header: impl Into<String>,
        cell: impl Fn(&T) -> AnyView + Send + Sync + 'static,
    ) -> Self {
        Self {
            id,
            header: header.into(),
            accessor: None,
            cell: Some(Arc::new(cell)),
            sortable: false,
            hideable: false,
        }
    }

    pub fn cell(mut self, cell: impl Fn(&T) -> AnyView + Send + Sync + 'static) -> Self {
        self.cell = Some(Arc::new(cell));
        self
    }

    pub fn not_sortable(mut self) -> Self {
        self.sortable = false;
        self
    }

    pub fn not_hideable(mut self) -> Self {
        self.hideable = false;
        self
    }

    pub fn value(&self, row: &T) -> CellValue {
        self.accessor.map(|get| get(row)).unwrap_or(CellValue::Empty)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("Column id \"{0}\" is reserved for row selection")]
    ReservedColumn(String),

    #[error("Column id \"{0}\" is used more than once")]
    DuplicateColumn(String),
}

pub fn check_columns<T>(columns: &[ColumnDef<T>]) -> Result<(), TableError> {
    let mut seen = HashSet::new();
    for column in columns {
        if column.id == SELECT_COLUMN {
            return Err(TableError::ReservedColumn(column.id.to_string()));
        }
        if !seen.insert(column.id) {
            return Err(TableError::DuplicateColumn(column.id.to_string()));
        }
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSelection {
    All,
    Some,
    None,
}

/// Rows of the current page plus counts for the footer
pub struct RowModel<'a, T> {
    pub rows: Vec<&'a T>,
    pub filtered_count: usize,
    pub page_index: usize,
    pub page_count: usize,
}

impl<T> RowModel<'_, T> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableState {
    sorting: Vec<(&'static str, SortDirection)>,
    multi_sort: bool,
    filter_column: &'static str,
    filter: String,
    page_index: usize,
    page_size: usize,
    hidden: HashSet<&'static str>,
    selected: HashSet<u32>,
}

impl Default for TableState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl TableState {
    pub fn new(page_size: usize) -> Self {
        Self {
            sorting: Vec::new(),
            multi_sort: false,
            filter_column: DEFAULT_FILTER_COLUMN,
            filter: String::new(),
            page_index: 0,
            page_size: page_size.max(1),
            hidden: HashSet::new(),
            selected: HashSet::new(),
        }
    }

    pub fn with_filter_column(mut self, column: &'static str) -> Self {
        self.filter_column = column;
        self
    }

    pub fn with_multi_sort(mut self) -> Self {
        self.multi_sort = true;
        self
    }

    // ========================
    // Sorting
    // ========================

    /// Cycle a column through asc -> desc -> unsorted.
    /// `additive` keeps other sorted columns when multi-sort is enabled.
    pub fn toggle_sort(&mut self, column: &'static str, additive: bool) {
        let next = match self.sort_direction(column) {
            None => Some(SortDirection::Asc),
            Some(SortDirection::Asc) => Some(SortDirection::Desc),
            Some(SortDirection::Desc) => None,
        };
        if !(self.multi_sort && additive) {
            self.sorting.retain(|(id, _)| *id == column);
        }
        match next {
            Some(direction) => match self.sorting.iter_mut().find(|(id, _)| *id == column) {
                Some(entry) => entry.1 = direction,
                None => self.sorting.push((column, direction)),
            },
            None => self.sorting.retain(|(id, _)| *id != column),
        }
    }

    pub fn sort_direction(&self, column: &str) -> Option<SortDirection> {
        self.sorting.iter().find(|(id, _)| *id == column).map(|(_, dir)| *dir)
    }

    // ========================
    // Filtering & paging
    // ========================

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn filter_column(&self) -> &'static str {
        self.filter_column
    }

    pub fn set_filter(&mut self, text: impl Into<String>) {
        self.filter = text.into();
        self.page_index = 0;
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn page_count(&self, row_count: usize) -> usize {
        row_count.div_ceil(self.page_size).max(1)
    }

    pub fn next_page(&mut self, row_count: usize) {
        if self.page_index + 1 < self.page_count(row_count) {
            self.page_index += 1;
        }
    }

    pub fn previous_page(&mut self) {
        self.page_index = self.page_index.saturating_sub(1);
    }

    // ========================
    // Visibility
    // ========================

    pub fn is_visible(&self, column: &str) -> bool {
        !self.hidden.contains(column)
    }

    /// Non-hideable columns ignore the toggle
    pub fn toggle_visibility<T>(&mut self, column: &ColumnDef<T>) {
        if !column.hideable {
            return;
        }
        if !self.hidden.remove(column.id) {
            self.hidden.insert(column.id);
        }
    }

    pub fn visible_columns<'c, T>(&self, columns: &'c [ColumnDef<T>]) -> Vec<&'c ColumnDef<T>> {
        columns.iter().filter(|c| self.is_visible(c.id)).collect()
    }

    // ========================
    // Selection
    // ========================

    pub fn is_selected(&self, id: u32) -> bool {
        self.selected.contains(&id)
    }

    pub fn toggle_row(&mut self, id: u32) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Drop selections whose rows are gone; returns how many were dropped
    pub fn retain_rows(&mut self, row_ids: &[u32]) -> usize {
        let before = self.selected.len();
        self.selected.retain(|id| row_ids.contains(id));
        before - self.selected.len()
    }

    pub fn page_selection(&self, page_ids: &[u32]) -> PageSelection {
        let picked = page_ids.iter().filter(|id| self.selected.contains(id)).count();
        match picked {
            0 => PageSelection::None,
            n if n == page_ids.len() => PageSelection::All,
            _ => PageSelection::Some,
        }
    }

    /// Select every row on the page, or clear them if all were selected
    pub fn toggle_page_selection(&mut self, page_ids: &[u32]) {
        if self.page_selection(page_ids) == PageSelection::All {
            for id in page_ids {
                self.selected.remove(id);
            }
        } else {
            self.selected.extend(page_ids.iter().copied());
        }
    }

    // ========================
    // Row model
    // ========================

    /// Filter, sort and slice `rows` into the current page
    pub fn row_model<'a, T: Entity>(&self, columns: &[ColumnDef<T>], rows: &'a [T]) -> RowModel<'a, T> {
        let needle = self.filter.trim().to_lowercase();
        let filter_column = columns.iter().find(|c| c.id == self.filter_column);
        let mut visible: Vec<&T> = match (needle.is_empty(), filter_column) {
            (false, Some(column)) => rows
                .iter()
                .filter(|row| column.value(row).display().to_lowercase().contains(&needle))
                .collect(),
            _ => rows.iter().collect(),
        };

        let sort_columns: Vec<(&ColumnDef<T>, SortDirection)> = self
            .sorting
            .iter()
            .filter_map(|(id, dir)| columns.iter().find(|c| c.id == *id).map(|c| (c, *dir)))
            .collect();
        if !sort_columns.is_empty() {
            visible.sort_by(|a, b| {
                sort_columns
                    .iter()
                    .map(|(column, dir)| {
                        let ord = column.value(a).compare(&column.value(b));
                        match dir {
                            SortDirection::Asc => ord,
                            SortDirection::Desc => ord.reverse(),
                        }
                    })
                    .find(|ord| *ord != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }

        let filtered_count = visible.len();
        let page_count = self.page_count(filtered_count);
        let page_index = self.page_index.min(page_count - 1);
        let rows = visible
            .into_iter()
            .skip(page_index * self.page_size)
            .take(self.page_size)
            .collect();

        RowModel { rows, filtered_count, page_index, page_count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: u32,
        name: String,
        price: f64,
    }

    impl Entity for Item {
        fn id(&self) -> u32 {
            self.id
        }
    }

    fn item(id: u32, name: &str, price: f64) -> Item {
        Item { id, name: name.to_string(), price }
    }

    fn columns() -> Vec<ColumnDef<Item>> {
        vec![
            ColumnDef::accessor("id", "#", |i: &Item| CellValue::Number(i.id as f64)).not_hideable(),
            ColumnDef::accessor("name", "Name", |i: &Item| CellValue::Text(i.name.clone())),
            ColumnDef::accessor("price", "Price", |i: &Item| CellValue::Number(i.price)),
        ]
    }

    fn names(model: &RowModel<'_, Item>) -> Vec<String> {
        model.rows.iter().map(|i| i.name.clone()).collect()
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let rows = vec![item(1, "A", 1.0), item(2, "Bike", 2.0)];
        let mut state = TableState::default();

        state.set_filter("bi");
        assert_eq!(names(&state.row_model(&columns(), &rows)), vec!["Bike"]);

        state.set_filter("");
        assert_eq!(names(&state.row_model(&columns(), &rows)), vec!["A", "Bike"]);
    }

    #[test]
    fn test_no_match_gives_empty_model() {
        let rows = vec![item(1, "A", 1.0)];
        let mut state = TableState::default();
        state.set_filter("zzz");
        let model = state.row_model(&columns(), &rows);
        assert!(model.is_empty());
        assert_eq!(model.filtered_count, 0);
        assert_eq!(model.page_count, 1);
    }

    #[test]
    fn test_sort_cycles_through_three_states() {
        let rows = vec![item(1, "b", 2.0), item(2, "a", 3.0), item(3, "c", 1.0)];
        let mut state = TableState::default();

        state.toggle_sort("price", false);
        assert_eq!(names(&state.row_model(&columns(), &rows)), vec!["c", "b", "a"]);
        state.toggle_sort("price", false);
        assert_eq!(names(&state.row_model(&columns(), &rows)), vec!["a", "b", "c"]);
        state.toggle_sort("price", false);
        assert_eq!(state.sort_direction("price"), None);
        assert_eq!(names(&state.row_model(&columns(), &rows)), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_single_sort_replaces_previous_column() {
        let mut state = TableState::default();
        state.toggle_sort("price", false);
        state.toggle_sort("name", true);
        assert_eq!(state.sort_direction("price"), None);
        assert_eq!(state.sort_direction("name"), Some(SortDirection::Asc));
    }

    #[test]
    fn test_multi_sort_keeps_both_columns() {
        let rows = vec![item(1, "b", 1.0), item(2, "a", 2.0), item(3, "a", 1.0)];
        let mut state = TableState::default().with_multi_sort();
        state.toggle_sort("name", false);
        state.toggle_sort("price", true);
        let ids: Vec<u32> = state.row_model(&columns(), &rows).rows.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn test_pagination_and_filter_reset() {
        let rows: Vec<Item> = (1..=25).map(|n| item(n, &format!("Item {}", n), n as f64)).collect();
        let mut state = TableState::default();
        assert_eq!(state.page_count(rows.len()), 3);

        state.next_page(rows.len());
        state.next_page(rows.len());
        state.next_page(rows.len());
        let model = state.row_model(&columns(), &rows);
        assert_eq!(model.page_index, 2);
        assert_eq!(model.rows.len(), 5);

        state.set_filter("item 1");
        let model = state.row_model(&columns(), &rows);
        assert_eq!(model.page_index, 0);
        assert_eq!(model.filtered_count, 11);
    }

    #[test]
    fn test_selection_survives_resort() {
        let rows = vec![item(1, "b", 2.0), item(2, "a", 1.0)];
        let mut state = TableState::default();
        state.toggle_row(1);
        state.toggle_sort("name", false);
        let model = state.row_model(&columns(), &rows);
        assert_eq!(model.rows[1].id, 1);
        assert!(state.is_selected(1));
        assert!(!state.is_selected(2));
    }

    #[test]
    fn test_removed_rows_leave_selection() {
        let mut rows = vec![item(1, "a", 1.0), item(2, "b", 2.0), item(3, "c", 3.0)];
        let mut state = TableState::default();
        let all: Vec<u32> = rows.iter().map(|r| r.id).collect();
        state.toggle_page_selection(&all);
        assert_eq!(state.selected_count(), 3);

        rows.retain(|r| r.id != 2);
        let remaining: Vec<u32> = rows.iter().map(|r| r.id).collect();
        assert_eq!(state.retain_rows(&remaining), 1);

        let model = state.row_model(&columns(), &rows);
        assert_eq!(state.selected_count(), 2);
        assert_eq!(model.filtered_count, 2);
        assert!(!state.is_selected(2));
        assert_eq!(state.retain_rows(&remaining), 0);
    }

    #[test]
    fn test_page_selection_toggle() {
        let mut state = TableState::default();
        let page = [1, 2, 3];
        state.toggle_row(2);
        assert_eq!(state.page_selection(&page), PageSelection::Some);

        state.toggle_page_selection(&page);
        assert_eq!(state.page_selection(&page), PageSelection::All);

        state.toggle_page_selection(&page);
        assert_eq!(state.page_selection(&page), PageSelection::None);
        assert_eq!(state.selected_count(), 0);
    }

    #[test]
    fn test_only_hideable_columns_toggle() {
        let cols = columns();
        let mut state = TableState::default();
        state.toggle_visibility(&cols[0]);
        state.toggle_visibility(&cols[2]);
        let visible: Vec<&str> = state.visible_columns(&cols).iter().map(|c| c.id).collect();
        assert_eq!(visible, vec!["id", "name"]);
    }

    #[test]
    fn test_select_column_id_is_reserved() {
        let mut cols = columns();
        cols.push(ColumnDef::accessor("select", "Pick", |_: &Item| CellValue::Empty));
        assert_eq!(check_columns(&cols), Err(TableError::ReservedColumn("select".to_string())));
        assert_eq!(check_columns(&columns()), Ok(()));
    }
}
