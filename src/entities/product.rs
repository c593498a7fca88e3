//! Product form model, field layout and table columns

use leptos::prelude::*;

use crate::forms::validate::{Check, NumberCheck};
use crate::forms::{FieldConfig, FieldErrors, FieldKind, FieldValue, FormModel, SelectOption};
use crate::models::{Product, ProductInput, Supplier};
use crate::table::{CellValue, ColumnDef};

/// Fixed category catalogue (id, label)
pub const CATEGORIES: &[(u32, &str)] = &[
    (1, "Electronics"),
    (2, "Clothing"),
    (3, "Food"),
    (4, "Books"),
    (5, "Toys"),
    (6, "Health"),
    (7, "Sports"),
    (8, "Automotive"),
];

const MAX_PRICE: f64 = 999_999.99;

#[derive(Debug, Clone, PartialEq)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub stock: f64,
    /// Select values are carried as strings; "" means nothing picked
    pub category_id: String,
    pub supplier_id: String,
    pub status: bool,
}

impl Default for ProductForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            price: 0.0,
            stock: 0.0,
            category_id: String::new(),
            supplier_id: String::new(),
            status: true,
        }
    }
}

impl From<&Product> for ProductForm {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            stock: product.stock as f64,
            category_id: product.category.id.to_string(),
            supplier_id: product.supplier_id.map(|id| id.to_string()).unwrap_or_default(),
            status: product.status,
        }
    }
}

impl ProductForm {
    /// Only meaningful after `validate` passed
    pub fn to_input(&self) -> ProductInput {
        ProductInput {
            name: self.name.trim().to_string(),
            price: self.price,
            stock: self.stock as i64,
            description: self.description.trim().to_string(),
            status: self.status,
            category_id: self.category_id.parse().unwrap_or_default(),
            supplier_id: self.supplier_id.parse().ok(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductField {
    Name,
    Description,
    Price,
    Stock,
    Category,
    Supplier,
    Status,
}

impl FormModel for ProductForm {
    type Field = ProductField;

    fn value(&self, field: ProductField) -> FieldValue {
        match field {
            ProductField::Name => FieldValue::Text(self.name.clone()),
            ProductField::Description => FieldValue::Text(self.description.clone()),
            ProductField::Price => FieldValue::Number(self.price),
            ProductField::Stock => FieldValue::Number(self.stock),
            ProductField::Category => FieldValue::Text(self.category_id.clone()),
            ProductField::Supplier => FieldValue::Text(self.supplier_id.clone()),
            ProductField::Status => FieldValue::Bool(self.status),
        }
    }

    fn set_value(&mut self, field: ProductField, value: FieldValue) {
        match field {
            ProductField::Name => self.name = value.as_text(),
            ProductField::Description => self.description = value.as_text(),
            ProductField::Price => self.price = value.as_number(),
            ProductField::Stock => self.stock = value.as_number(),
            ProductField::Category => self.category_id = value.as_text(),
            ProductField::Supplier => self.supplier_id = value.as_text(),
            ProductField::Status => self.status = value.as_bool(),
        }
    }

    fn validate(&self) -> FieldErrors<ProductField> {
        let mut errors = FieldErrors::new();
        errors.check(
            ProductField::Name,
            Check::new(&self.name)
                .required("Name is required")
                .min_len(2, "Name must be at least 2 characters")
                .max_len(100, "Name cannot exceed 100 characters")
                .finish(),
        );
        errors.check(
            ProductField::Description,
            Check::new(&self.description)
                .required("Description is required")
                .min_len(10, "Description must be at least 10 characters")
                .max_len(500, "Description cannot exceed 500 characters")
                .finish(),
        );
        errors.check(
            ProductField::Price,
            NumberCheck::new(self.price, "Price must be a number")
                .positive("Price must be greater than 0")
                .max(MAX_PRICE, "Price cannot exceed $999,999.99")
                .finish(),
        );
        errors.check(
            ProductField::Stock,
            NumberCheck::new(self.stock, "Stock must be a number")
                .integer("Stock must be a whole number")
                .min(0.0, "Stock cannot be negative")
                .finish(),
        );
        errors.check(
            ProductField::Category,
            Check::new(&self.category_id)
                .required("Category is required")
                .ensure(|v| v.parse::<u32>().is_ok_and(|id| id > 0), "Category is required")
                .finish(),
        );
        errors.check(
            ProductField::Supplier,
            Check::new(&self.supplier_id)
                .ensure(|v| v.parse::<u32>().is_ok_and(|id| id > 0), "Select a supplier")
                .finish(),
        );
        errors
    }
}

pub fn category_options() -> Vec<SelectOption> {
    CATEGORIES
        .iter()
        .map(|(id, label)| SelectOption::new(id.to_string(), *label))
        .collect()
}

/// Active suppliers as select options
pub fn supplier_options(suppliers: &[Supplier]) -> Vec<SelectOption> {
    suppliers
        .iter()
        .filter(|s| s.is_active)
        .map(|s| SelectOption::new(s.id.to_string(), s.name.clone()))
        .collect()
}

/// Field list; supplier options arrive once the active-supplier query resolves
pub fn form_fields(suppliers: &[Supplier]) -> Vec<FieldConfig<ProductField>> {
    vec![
        FieldConfig::new(ProductField::Name, "Product name", FieldKind::Text)
            .placeholder("Enter the product name")
            .required(),
        FieldConfig::new(ProductField::Description, "Description", FieldKind::TextArea { rows: 4 })
            .placeholder("Describe the product in detail...")
            .required(),
        FieldConfig::new(ProductField::Price, "Price", FieldKind::Number { step: Some(0.01) })
            .placeholder("0.00")
            .required()
            .col_span(6),
        FieldConfig::new(ProductField::Stock, "Stock", FieldKind::Number { step: Some(1.0) })
            .placeholder("0")
            .required()
            .col_span(6),
        FieldConfig::new(ProductField::Category, "Category", FieldKind::Select(category_options()))
            .placeholder("Select a category")
            .required()
            .col_span(6),
        FieldConfig::new(ProductField::Supplier, "Supplier", FieldKind::Select(supplier_options(suppliers)))
            .placeholder("Select a supplier")
            .required()
            .col_span(6),
        FieldConfig::new(ProductField::Status, "Active product", FieldKind::Toggle)
            .description("Available for sale"),
    ]
}

pub fn format_price(price: f64) -> String {
    let cents = (price * 100.0).round() as i64;
    let whole = (cents / 100).abs().to_string();
    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if cents < 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, (cents % 100).abs())
}

pub fn columns(actions: impl Fn(&Product) -> AnyView + Send + Sync + 'static) -> Vec<ColumnDef<Product>> {
    vec![
        ColumnDef::accessor("id", "#", |p: &Product| CellValue::Number(f64::from(p.id))).not_hideable(),
        ColumnDef::accessor("name", "Name", |p: &Product| CellValue::Text(p.name.clone())),
        ColumnDef::accessor("price", "Price", |p: &Product| CellValue::Number(p.price)).cell(|p| {
            let price = format_price(p.price);
            view! { <span>{price}</span> }.into_any()
        }),
        ColumnDef::accessor("stock", "Stock", |p: &Product| CellValue::Number(p.stock as f64)),
        ColumnDef::accessor("description", "Description", |p: &Product| CellValue::Text(p.description.clone()))
            .not_sortable(),
        ColumnDef::accessor("status", "Status", |p: &Product| CellValue::Bool(p.status)).cell(|p| {
            let (class, label) = if p.status {
                ("badge badge-success", "Active")
            } else {
                ("badge badge-muted", "Inactive")
            };
            view! { <span class=class>{label}</span> }.into_any()
        }),
        ColumnDef::accessor("category", "Category", |p: &Product| CellValue::Text(p.category.name.clone())),
        ColumnDef::display("actions", "Actions", actions),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::{check_fields, parse_number};
    use crate::models::Category;

    fn supplier(id: u32, name: &str, is_active: bool) -> Supplier {
        Supplier {
            id,
            name: name.to_string(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            is_active,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    fn valid() -> ProductForm {
        ProductForm {
            name: "Bike".to_string(),
            description: "Aluminium mountain bike".to_string(),
            price: 199.9,
            stock: 4.0,
            category_id: "7".to_string(),
            supplier_id: "2".to_string(),
            status: true,
        }
    }

    #[test]
    fn test_supplier_select_uses_active_subset() {
        let options = supplier_options(&[supplier(1, "Old Co", false), supplier(2, "Acme", true)]);
        assert_eq!(options, vec![SelectOption::new("2", "Acme")]);
    }

    #[test]
    fn test_empty_supplier_list_is_flagged() {
        assert!(check_fields(&form_fields(&[])).is_err());
        assert!(check_fields(&form_fields(&[supplier(2, "Acme", true)])).is_ok());
    }

    #[test]
    fn test_number_rules() {
        let mut form = valid();
        form.stock = 2.5;
        form.price = parse_number("abc");
        let errors = form.validate();
        assert_eq!(errors.get(ProductField::Stock), Some("Stock must be a whole number"));
        assert_eq!(errors.get(ProductField::Price), Some("Price must be a number"));
        assert!(valid().validate().is_empty());
    }

    #[test]
    fn test_supplier_required() {
        let mut form = valid();
        form.supplier_id = String::new();
        assert_eq!(form.validate().get(ProductField::Supplier), Some("Select a supplier"));
    }

    #[test]
    fn test_to_input_and_back() {
        let input = valid().to_input();
        assert_eq!(input.category_id, 7);
        assert_eq!(input.supplier_id, Some(2));
        assert_eq!(input.stock, 4);

        let product = Product {
            id: 9,
            name: input.name.clone(),
            price: input.price,
            stock: input.stock,
            description: input.description.clone(),
            status: input.status,
            category: Category { id: 7, name: "Sports".to_string() },
            supplier_id: Some(2),
        };
        assert_eq!(ProductForm::from(&product), valid());
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(1234.5), "$1,234.50");
        assert_eq!(format_price(0.0), "$0.00");
        assert_eq!(format_price(999999.99), "$999,999.99");
    }
}
