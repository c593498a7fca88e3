//! UI Components
//!
//! Reusable Leptos components and the console pages built from them.

mod form_field;
mod generic_form;
mod form_dialog;
mod data_table;
mod delete_confirm_button;
mod toaster;
mod nav_bar;
mod user_menu;
mod login_page;
mod product_list;
mod supplier_list;

pub use form_field::FormField;
pub use generic_form::{spawn_submit, GenericForm};
pub use form_dialog::{DialogState, GenericFormDialog};
pub use data_table::DataTable;
pub use delete_confirm_button::DeleteConfirmButton;
pub use toaster::Toaster;
pub use nav_bar::{NavBar, Page};
pub use user_menu::UserMenu;
pub use login_page::LoginPage;
pub use product_list::ProductList;
pub use supplier_list::SupplierList;
