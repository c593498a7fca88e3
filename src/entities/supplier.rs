//! Supplier form model, field layout and table columns

use std::sync::OnceLock;

use leptos::prelude::*;
use regex::Regex;

use crate::forms::validate::Check;
use crate::forms::{FieldConfig, FieldErrors, FieldKind, FieldValue, FormModel};
use crate::models::{Supplier, SupplierInput};
use crate::table::{CellValue, ColumnDef};

static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| Regex::new(r"^[\d\s\-+()]+$").expect("valid phone regex"))
}

#[derive(Debug, Clone, PartialEq)]
pub struct SupplierForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub is_active: bool,
}

impl Default for SupplierForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            is_active: true,
        }
    }
}

impl From<&Supplier> for SupplierForm {
    fn from(supplier: &Supplier) -> Self {
        Self {
            name: supplier.name.clone(),
            email: supplier.email.clone(),
            phone: supplier.phone.clone(),
            address: supplier.address.clone(),
            is_active: supplier.is_active,
        }
    }
}

impl SupplierForm {
    pub fn to_input(&self) -> SupplierInput {
        SupplierInput {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            address: self.address.trim().to_string(),
            is_active: self.is_active,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SupplierField {
    Name,
    Email,
    Phone,
    Address,
    IsActive,
}

impl FormModel for SupplierForm {
    type Field = SupplierField;

    fn value(&self, field: SupplierField) -> FieldValue {
        match field {
            SupplierField::Name => FieldValue::Text(self.name.clone()),
            SupplierField::Email => FieldValue::Text(self.email.clone()),
            SupplierField::Phone => FieldValue::Text(self.phone.clone()),
            SupplierField::Address => FieldValue::Text(self.address.clone()),
            SupplierField::IsActive => FieldValue::Bool(self.is_active),
        }
    }

    fn set_value(&mut self, field: SupplierField, value: FieldValue) {
        match field {
            SupplierField::Name => self.name = value.as_text(),
            SupplierField::Email => self.email = value.as_text(),
            SupplierField::Phone => self.phone = value.as_text(),
            SupplierField::Address => self.address = value.as_text(),
            SupplierField::IsActive => self.is_active = value.as_bool(),
        }
    }

    fn validate(&self) -> FieldErrors<SupplierField> {
        let mut errors = FieldErrors::new();
        errors.check(
            SupplierField::Name,
            Check::new(&self.name)
                .required("Name is required")
                .min_len(2, "Name must be at least 2 characters")
                .max_len(100, "Name cannot exceed 100 characters")
                .finish(),
        );
        errors.check(
            SupplierField::Email,
            Check::new(&self.email)
                .required("Email is required")
                .email("Must be a valid email")
                .max_len(150, "Email cannot exceed 150 characters")
                .finish(),
        );
        errors.check(
            SupplierField::Phone,
            Check::new(&self.phone)
                .required("Phone is required")
                .min_len(8, "Phone must have at least 8 digits")
                .max_len(15, "Phone cannot exceed 15 digits")
                .matches(
                    phone_regex(),
                    "Phone may only contain digits, spaces, dashes, parentheses and +",
                )
                .finish(),
        );
        errors.check(
            SupplierField::Address,
            Check::new(&self.address)
                .required("Address is required")
                .min_len(5, "Address must be at least 5 characters")
                .max_len(200, "Address cannot exceed 200 characters")
                .finish(),
        );
        errors
    }
}

pub fn form_fields() -> Vec<FieldConfig<SupplierField>> {
    vec![
        FieldConfig::new(SupplierField::Name, "Name", FieldKind::Text)
            .placeholder("Supplier name")
            .required()
            .col_span(6),
        FieldConfig::new(SupplierField::Phone, "Phone", FieldKind::Phone)
            .placeholder("+1 234 567 8900")
            .required()
            .col_span(6),
        FieldConfig::new(SupplierField::Email, "Email", FieldKind::Email)
            .placeholder("name@example.com")
            .required()
            .full_width(),
        FieldConfig::new(SupplierField::Address, "Address", FieldKind::TextArea { rows: 3 })
            .placeholder("Full street address")
            .required()
            .full_width(),
        FieldConfig::new(SupplierField::IsActive, "Active", FieldKind::Toggle)
            .description("Active suppliers can be assigned to products")
            .full_width(),
    ]
}

fn status_badge(active: bool) -> AnyView {
    let (class, label) = if active {
        ("badge badge-success", "Active")
    } else {
        ("badge badge-muted", "Inactive")
    };
    view! { <span class=class>{label}</span> }.into_any()
}

/// Table columns; `actions` renders the per-row action cell
pub fn columns(actions: impl Fn(&Supplier) -> AnyView + Send + Sync + 'static) -> Vec<ColumnDef<Supplier>> {
    vec![
        ColumnDef::accessor("id", "#", |s: &Supplier| CellValue::Number(f64::from(s.id))).not_hideable(),
        ColumnDef::accessor("name", "Name", |s: &Supplier| CellValue::Text(s.name.clone())),
        ColumnDef::accessor("email", "Email", |s: &Supplier| CellValue::Text(s.email.clone())).cell(|s| {
            let email = s.email.clone();
            view! { <span class="text-link">{email}</span> }.into_any()
        }),
        ColumnDef::accessor("phone", "Phone", |s: &Supplier| CellValue::Text(s.phone.clone())),
        ColumnDef::accessor("address", "Address", |s: &Supplier| CellValue::Text(s.address.clone())).not_sortable(),
        ColumnDef::accessor("is_active", "Status", |s: &Supplier| CellValue::Bool(s.is_active))
            .cell(|s| status_badge(s.is_active)),
        ColumnDef::display("actions", "Actions", actions),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{check_fields, FormState, SubmitBlocked};

    fn filled() -> SupplierForm {
        SupplierForm {
            name: "Acme".to_string(),
            email: "sales@acme.test".to_string(),
            phone: "(555) 010-0000".to_string(),
            address: "1 Industrial Way".to_string(),
            is_active: true,
        }
    }

    #[test]
    fn test_field_config_is_consistent() {
        let fields = form_fields();
        assert_eq!(check_fields(&fields), Ok(()));
        assert_eq!(fields[0].layout.span(), 6);
        assert_eq!(fields[2].layout.span(), 12);
    }

    #[test]
    fn test_empty_email_blocks_submit() {
        let mut form = FormState::new(SupplierForm::default());
        for (field, value) in [
            (SupplierField::Name, "Acme"),
            (SupplierField::Phone, "555 0100 22"),
            (SupplierField::Address, "1 Industrial Way"),
        ] {
            form.set(field, FieldValue::Text(value.to_string()));
        }

        assert_eq!(form.begin_submit(false), Err(SubmitBlocked::Invalid));
        assert_eq!(form.error(SupplierField::Email), Some("Email is required"));
        assert_eq!(form.errors().len(), 1);
    }

    #[test]
    fn test_phone_rules() {
        let mut model = filled();
        model.phone = "555-CALL-NOW".to_string();
        assert_eq!(
            model.validate().get(SupplierField::Phone),
            Some("Phone may only contain digits, spaces, dashes, parentheses and +")
        );
        model.phone = "123".to_string();
        assert_eq!(model.validate().get(SupplierField::Phone), Some("Phone must have at least 8 digits"));
        assert!(filled().validate().is_empty());
    }

    #[test]
    fn test_edit_defaults_and_input_trim() {
        let supplier = Supplier {
            id: 4,
            name: "Globex".to_string(),
            email: "info@globex.test".to_string(),
            phone: "5550100200".to_string(),
            address: "2 Elm St".to_string(),
            is_active: false,
            created_at: String::new(),
            updated_at: String::new(),
        };
        let mut form = SupplierForm::from(&supplier);
        assert!(!form.is_active);
        form.name = "  Globex  ".to_string();
        assert_eq!(form.to_input().name, "Globex");
    }
}
