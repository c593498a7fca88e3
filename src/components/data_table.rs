//! Data Table Component
//!
//! Renders column definitions over row data with a filter box, column
//! visibility menu, tri-state sort headers, row selection and paging.
//! All state lives in a `TableState`; this file only draws it.

use leptos::prelude::*;

use crate::models::Entity;
use crate::table::{check_columns, ColumnDef, PageSelection, RowModel, SortDirection, TableState, DEFAULT_PAGE_SIZE};

/// Footer and select-all view of the current page
#[derive(Debug, Clone, PartialEq)]
struct PageSummary {
    ids: Vec<u32>,
    filtered_count: usize,
    page_index: usize,
    page_count: usize,
}

impl<T: Entity> From<&RowModel<'_, T>> for PageSummary {
    fn from(model: &RowModel<'_, T>) -> Self {
        Self {
            ids: model.rows.iter().map(|row| row.id()).collect(),
            filtered_count: model.filtered_count,
            page_index: model.page_index,
            page_count: model.page_count,
        }
    }
}

fn sort_indicator(direction: Option<SortDirection>) -> &'static str {
    match direction {
        Some(SortDirection::Asc) => "▲",
        Some(SortDirection::Desc) => "▼",
        None => "↕",
    }
}

fn render_cell<T>(column: &ColumnDef<T>, row: &T) -> AnyView {
    match &column.cell {
        Some(render) => render(row),
        None => column.value(row).display().into_any(),
    }
}

#[component]
pub fn DataTable<T>(
    columns: Vec<ColumnDef<T>>,
    #[prop(into)] rows: Signal<Vec<T>>,
    /// Column the filter box searches (defaults to "name")
    #[prop(optional)] filter_column: Option<&'static str>,
    #[prop(into, optional)] filter_placeholder: MaybeProp<String>,
    #[prop(optional)] page_size: Option<usize>,
    #[prop(optional)] multi_sort: bool,
    /// Toolbar slot, e.g. a "create" button
    #[prop(optional, into)] toolbar: Option<ViewFn>,
    #[prop(into, optional)] loading: MaybeProp<bool>,
) -> impl IntoView
where
    T: Entity + Clone + Send + Sync + 'static,
{
    if let Err(e) = check_columns(&columns) {
        log::error!("Invalid table columns: {}", e);
    }

    let mut initial = TableState::new(page_size.unwrap_or(DEFAULT_PAGE_SIZE));
    if let Some(column) = filter_column {
        initial = initial.with_filter_column(column);
    }
    if multi_sort {
        initial = initial.with_multi_sort();
    }
    let table = RwSignal::new(initial);
    let columns = StoredValue::new(columns);
    let (menu_open, set_menu_open) = signal(false);

    // Forget selections whose rows were deleted or reloaded away
    Effect::new(move |_| {
        let ids: Vec<u32> = rows.with(|rows| rows.iter().map(|row| row.id()).collect());
        table.maybe_update(|state| state.retain_rows(&ids) > 0);
    });

    let page = Memo::new(move |_| {
        rows.with(|rows| {
            table.with(|state| columns.with_value(|cols| PageSummary::from(&state.row_model(cols, rows))))
        })
    });
    let page_selection = move || page.with(|p| table.with(|state| state.page_selection(&p.ids)));
    let filtered_count = move || page.with(|p| p.filtered_count);
    let visible_count = move || table.with(|state| columns.with_value(|cols| state.visible_columns(cols).len()));

    let headers = move || {
        table.with(|state| {
            columns.with_value(|cols| {
                state
                    .visible_columns(cols)
                    .into_iter()
                    .map(|column| {
                        let id = column.id;
                        let header = column.header.clone();
                        if column.sortable {
                            let indicator = sort_indicator(state.sort_direction(id));
                            view! {
                                <th>
                                    <button
                                        class="sort-btn"
                                        on:click=move |ev: web_sys::MouseEvent| {
                                            table.update(|s| s.toggle_sort(id, ev.shift_key()))
                                        }
                                    >
                                        {header}
                                        <span class="sort-indicator">{indicator}</span>
                                    </button>
                                </th>
                            }
                            .into_any()
                        } else {
                            view! { <th>{header}</th> }.into_any()
                        }
                    })
                    .collect_view()
            })
        })
    };

    let body = move || {
        rows.with(|rows| {
            table.with(|state| {
                columns.with_value(|cols| {
                    let model = state.row_model(cols, rows);
                    let visible = state.visible_columns(cols);
                    if model.is_empty() {
                        let span = (visible.len() + 1).to_string();
                        return view! {
                            <tr>
                                <td class="table-empty" colspan=span>"No results."</td>
                            </tr>
                        }
                        .into_any();
                    }
                    model
                        .rows
                        .into_iter()
                        .map(|row| {
                            let id = row.id();
                            let selected = state.is_selected(id);
                            let cells = visible
                                .iter()
                                .map(|&column| view! { <td>{render_cell(column, row)}</td> })
                                .collect_view();
                            view! {
                                <tr class:selected=selected>
                                    <td class="select-cell">
                                        <input
                                            type="checkbox"
                                            aria-label="Select row"
                                            prop:checked=selected
                                            on:change=move |_| table.update(|s| s.toggle_row(id))
                                        />
                                    </td>
                                    {cells}
                                </tr>
                            }
                        })
                        .collect_view()
                        .into_any()
                })
            })
        })
    };

    let column_menu = move || {
        columns.with_value(|cols| {
            cols.iter()
                .filter(|c| c.hideable)
                .map(|column| {
                    let id = column.id;
                    let header = column.header.clone();
                    view! {
                        <label class="column-toggle">
                            <input
                                type="checkbox"
                                prop:checked=move || table.with(|s| s.is_visible(id))
                                on:change=move |_| {
                                    columns.with_value(|cols| {
                                        if let Some(column) = cols.iter().find(|c| c.id == id) {
                                            table.update(|s| s.toggle_visibility(column));
                                        }
                                    })
                                }
                            />
                            {header}
                        </label>
                    }
                })
                .collect_view()
        })
    };

    let page_info = move || page.with(|p| format!("Page {} of {}", p.page_index + 1, p.page_count));

    view! {
        <div class="data-table">
            <div class="table-toolbar">
                <input
                    class="table-filter"
                    type="search"
                    placeholder=move || filter_placeholder.get().unwrap_or_else(|| "Filter...".to_string())
                    prop:value=move || table.with(|s| s.filter().to_string())
                    on:input=move |ev| table.update(|s| s.set_filter(event_target_value(&ev)))
                />
                <div class="column-menu">
                    <button class="btn btn-secondary" on:click=move |_| set_menu_open.update(|o| *o = !*o)>
                        "Columns"
                    </button>
                    <Show when=move || menu_open.get()>
                        <div class="column-menu-list">{column_menu}</div>
                    </Show>
                </div>
                {toolbar.map(|toolbar| view! { <div class="table-actions">{toolbar.run()}</div> })}
            </div>

            <table class="table" class:loading=move || loading.get().unwrap_or(false)>
                <thead>
                    <tr>
                        <th class="select-cell">
                            <input
                                type="checkbox"
                                aria-label="Select all"
                                prop:checked=move || page_selection() == PageSelection::All
                                prop:indeterminate=move || page_selection() == PageSelection::Some
                                on:change=move |_| {
                                    let ids = page.with(|p| p.ids.clone());
                                    table.update(|s| s.toggle_page_selection(&ids));
                                }
                            />
                        </th>
                        {headers}
                    </tr>
                </thead>
                <tbody>
                    <Show
                        when=move || !loading.get().unwrap_or(false)
                        fallback=move || view! {
                            <tr>
                                <td class="table-empty" colspan=move || (visible_count() + 1).to_string()>"Loading..."</td>
                            </tr>
                        }
                    >
                        {body}
                    </Show>
                </tbody>
            </table>

            <div class="table-footer">
                <span class="selection-count">
                    {move || format!("{} of {} row(s) selected.", table.with(|s| s.selected_count()), filtered_count())}
                </span>
                <span class="page-info">{page_info}</span>
                <div class="pager">
                    <button
                        class="btn btn-secondary"
                        disabled=move || page.with(|p| p.page_index == 0)
                        on:click=move |_| table.update(|s| s.previous_page())
                    >
                        "Previous"
                    </button>
                    <button
                        class="btn btn-secondary"
                        disabled=move || page.with(|p| p.page_index + 1 >= p.page_count)
                        on:click=move |_| {
                            let count = filtered_count();
                            table.update(|s| s.next_page(count));
                        }
                    >
                        "Next"
                    </button>
                </div>
            </div>
        </div>
    }
}
