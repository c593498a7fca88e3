//! Navigation Bar Component
//!
//! Tab bar for switching between the console pages, with the user menu on
//! the right.

use leptos::prelude::*;

use crate::components::UserMenu;

/// Console pages reachable from the tab bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Products,
    Suppliers,
}

impl Page {
    pub const ALL: [Page; 2] = [Page::Products, Page::Suppliers];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Products => "Products",
            Page::Suppliers => "Suppliers",
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Page::Products => "/products",
            Page::Suppliers => "/suppliers",
        }
    }

    /// Page for a location path; anything unknown lands on products
    pub fn from_path(path: &str) -> Self {
        Page::ALL
            .into_iter()
            .find(|page| path.starts_with(page.path()))
            .unwrap_or(Page::Products)
    }
}

#[component]
pub fn NavBar(current_page: ReadSignal<Page>, set_current_page: WriteSignal<Page>) -> impl IntoView {
    view! {
        <nav class="nav-bar">
            <span class="nav-brand">"Inventory"</span>
            <div class="nav-tabs">
                {Page::ALL
                    .into_iter()
                    .map(|page| {
                        let tab_class = move || {
                            if current_page.get() == page { "nav-tab active" } else { "nav-tab" }
                        };
                        view! {
                            <button class=tab_class on:click=move |_| set_current_page.set(page)>
                                {page.title()}
                            </button>
                        }
                    })
                    .collect_view()}
            </div>
            <UserMenu />
        </nav>
    }
}
