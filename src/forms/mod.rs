//! Generic Form Engine
//!
//! Forms are described by a model type implementing `FormModel` plus a list
//! of `FieldConfig`s. Field names are the model's own `Field` enum, so a
//! config can only name attributes the model actually has. `FormState`
//! holds values, errors and the submit flag; the components render it.

pub mod validate;

use std::collections::HashMap;
use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use thiserror::Error;

/// CSS for the form grid container: one column on narrow screens, twelve from `md` up
pub const GRID_CLASS: &str = "grid grid-cols-1 md:grid-cols-12 gap-4";

pub const GRID_COLUMNS: u8 = 12;

// ========================
// Values
// ========================

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    /// NaN when the input does not parse
    Number(f64),
}

impl FieldValue {
    /// Value as shown in a text-like input
    pub fn as_text(&self) -> String {
        match self {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Bool(flag) => flag.to_string(),
            FieldValue::Number(n) if n.is_nan() => String::new(),
            FieldValue::Number(n) => n.to_string(),
        }
    }

    pub fn as_bool(&self) -> bool {
        matches!(self, FieldValue::Bool(true))
    }

    pub fn as_number(&self) -> f64 {
        match self {
            FieldValue::Number(n) => *n,
            FieldValue::Text(text) => parse_number(text),
            FieldValue::Bool(_) => f64::NAN,
        }
    }
}

/// Empty or malformed input becomes NaN
pub fn parse_number(raw: &str) -> f64 {
    raw.trim().parse::<f64>().unwrap_or(f64::NAN)
}

// ========================
// Field configuration
// ========================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self { value: value.into(), label: label.into() }
    }
}

/// Control kinds; each maps to exactly one control in `form_field`
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text,
    Email,
    Password,
    Phone,
    TextArea { rows: u32 },
    Number { step: Option<f64> },
    Select(Vec<SelectOption>),
    Toggle,
}

impl FieldKind {
    /// `type` attribute for `<input>`-rendered kinds
    pub fn input_type(&self) -> &'static str {
        match self {
            FieldKind::Email => "email",
            FieldKind::Password => "password",
            FieldKind::Phone => "tel",
            FieldKind::Number { .. } => "number",
            FieldKind::Text | FieldKind::TextArea { .. } | FieldKind::Select(_) | FieldKind::Toggle => "text",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Layout {
    pub full_width: bool,
    pub col_span: Option<u8>,
    pub col_start: Option<u8>,
    pub col_end: Option<u8>,
    pub order: Option<u8>,
}

impl Layout {
    /// Columns covered on wide screens
    pub fn span(&self) -> u8 {
        if self.full_width {
            GRID_COLUMNS
        } else {
            self.col_span.unwrap_or(GRID_COLUMNS)
        }
    }

    pub fn grid_class(&self) -> String {
        let mut classes = vec![if self.full_width {
            "col-span-1 md:col-span-full".to_string()
        } else {
            match self.col_span {
                Some(span) => format!("col-span-1 md:col-span-{}", span),
                None => format!("md:col-span-{}", GRID_COLUMNS),
            }
        }];
        if let Some(start) = self.col_start {
            classes.push(format!("md:col-start-{}", start));
        }
        if let Some(end) = self.col_end {
            classes.push(format!("md:col-end-{}", end));
        }
        if let Some(order) = self.order {
            classes.push(format!("order-{}", order));
        }
        classes.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldConfig<F> {
    pub name: F,
    pub label: String,
    pub kind: FieldKind,
    pub placeholder: Option<String>,
    pub description: Option<String>,
    pub required: bool,
    pub disabled: bool,
    pub layout: Layout,
}

impl<F> FieldConfig<F> {
    pub fn new(name: F, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name,
            label: label.into(),
            kind,
            placeholder: None,
            description: None,
            required: false,
            disabled: false,
            layout: Layout::default(),
        }
    }

    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.placeholder = Some(text.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn full_width(mut self) -> Self {
        self.layout.full_width = true;
        self
    }

    pub fn col_span(mut self, span: u8) -> Self {
        self.layout.col_span = Some(span);
        self
    }

    pub fn col_start(mut self, start: u8) -> Self {
        self.layout.col_start = Some(start);
        self
    }

    pub fn col_end(mut self, end: u8) -> Self {
        self.layout.col_end = Some(end);
        self
    }

    pub fn order(mut self, order: u8) -> Self {
        self.layout.order = Some(order);
        self
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum FieldConfigError {
    #[error("Field {0} is configured more than once")]
    Duplicate(String),

    #[error("Field {field} spans {span} columns, expected 1 to 12")]
    SpanOutOfRange { field: String, span: u8 },

    #[error("Select field {0} has no options")]
    EmptyOptions(String),

    #[error("Field {0} ends before it starts")]
    InvalidColumns(String),
}

/// Static sanity checks over a field list
pub fn check_fields<F: Copy + Eq + Hash + Debug>(fields: &[FieldConfig<F>]) -> Result<(), FieldConfigError> {
    let mut seen = HashSet::new();
    for field in fields {
        let name = format!("{:?}", field.name);
        if !seen.insert(field.name) {
            return Err(FieldConfigError::Duplicate(name));
        }
        if let Some(span) = field.layout.col_span {
            if span == 0 || span > GRID_COLUMNS {
                return Err(FieldConfigError::SpanOutOfRange { field: name, span });
            }
        }
        if let (Some(start), Some(end)) = (field.layout.col_start, field.layout.col_end) {
            if end <= start {
                return Err(FieldConfigError::InvalidColumns(name));
            }
        }
        if matches!(&field.kind, FieldKind::Select(options) if options.is_empty()) {
            return Err(FieldConfigError::EmptyOptions(name));
        }
    }
    Ok(())
}

// ========================
// Model & state
// ========================

/// Per-field error messages, at most one per field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldErrors<F: Eq + Hash>(HashMap<F, String>);

impl<F: Eq + Hash> Default for FieldErrors<F> {
    fn default() -> Self {
        Self(HashMap::new())
    }
}

impl<F: Copy + Eq + Hash> FieldErrors<F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of a check; `None` means the field passed
    pub fn check(&mut self, field: F, outcome: Option<String>) {
        if let Some(message) = outcome {
            self.0.entry(field).or_insert(message);
        }
    }

    pub fn get(&self, field: F) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// A form's value object
pub trait FormModel: Clone + PartialEq + Send + Sync + 'static {
    type Field: Copy + Eq + Hash + Debug + Send + Sync + 'static;

    fn value(&self, field: Self::Field) -> FieldValue;
    fn set_value(&mut self, field: Self::Field, value: FieldValue);
    fn validate(&self) -> FieldErrors<Self::Field>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitBlocked {
    #[error("A submit is already running")]
    Busy,
    #[error("The form has validation errors")]
    Invalid,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormState<M: FormModel> {
    initial: M,
    values: M,
    errors: FieldErrors<M::Field>,
    submitting: bool,
    attempted: bool,
}

impl<M: FormModel> FormState<M> {
    pub fn new(initial: M) -> Self {
        Self {
            values: initial.clone(),
            initial,
            errors: FieldErrors::default(),
            submitting: false,
            attempted: false,
        }
    }

    pub fn values(&self) -> &M {
        &self.values
    }

    pub fn value(&self, field: M::Field) -> FieldValue {
        self.values.value(field)
    }

    pub fn error(&self, field: M::Field) -> Option<&str> {
        self.errors.get(field)
    }

    pub fn errors(&self) -> &FieldErrors<M::Field> {
        &self.errors
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_dirty(&self) -> bool {
        self.values != self.initial
    }

    /// Update one field; after a failed submit, errors follow the input
    pub fn set(&mut self, field: M::Field, value: FieldValue) {
        self.values.set_value(field, value);
        if self.attempted {
            self.errors = self.values.validate();
        }
    }

    /// Back to the values given at construction
    pub fn reset(&mut self) {
        self.values = self.initial.clone();
        self.errors = FieldErrors::default();
        self.submitting = false;
        self.attempted = false;
    }

    /// Adopt new defaults (dialog opened for a different entity) and reset
    pub fn reset_to(&mut self, defaults: M) {
        self.initial = defaults;
        self.reset();
    }

    pub fn can_submit(&self, external_loading: bool) -> bool {
        !self.submitting && !external_loading
    }

    /// Validate and, if clean, mark the form as submitting and hand out the values
    pub fn begin_submit(&mut self, external_loading: bool) -> Result<M, SubmitBlocked> {
        if !self.can_submit(external_loading) {
            return Err(SubmitBlocked::Busy);
        }
        self.attempted = true;
        self.errors = self.values.validate();
        if !self.errors.is_empty() {
            log::debug!("Submit blocked by {} field error(s)", self.errors.len());
            return Err(SubmitBlocked::Invalid);
        }
        self.submitting = true;
        Ok(self.values.clone())
    }

    pub fn finish_submit(&mut self) {
        self.submitting = false;
    }
}

#[cfg(test)]
mod tests {
    use super::validate::Check;
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Contact {
        name: String,
        email: String,
        subscribed: bool,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum ContactField {
        Name,
        Email,
        Subscribed,
    }

    impl FormModel for Contact {
        type Field = ContactField;

        fn value(&self, field: ContactField) -> FieldValue {
            match field {
                ContactField::Name => FieldValue::Text(self.name.clone()),
                ContactField::Email => FieldValue::Text(self.email.clone()),
                ContactField::Subscribed => FieldValue::Bool(self.subscribed),
            }
        }

        fn set_value(&mut self, field: ContactField, value: FieldValue) {
            match field {
                ContactField::Name => self.name = value.as_text(),
                ContactField::Email => self.email = value.as_text(),
                ContactField::Subscribed => self.subscribed = value.as_bool(),
            }
        }

        fn validate(&self) -> FieldErrors<ContactField> {
            let mut errors = FieldErrors::new();
            errors.check(ContactField::Name, Check::new(&self.name).required("Name is required").finish());
            errors.check(
                ContactField::Email,
                Check::new(&self.email).required("Email is required").email("Must be a valid email").finish(),
            );
            errors
        }
    }

    fn blank() -> Contact {
        Contact { name: String::new(), email: String::new(), subscribed: false }
    }

    #[test]
    fn test_layout_spans() {
        for span in 1..=12u8 {
            let layout = Layout { col_span: Some(span), ..Default::default() };
            assert_eq!(layout.span(), span);
            assert_eq!(layout.grid_class(), format!("col-span-1 md:col-span-{}", span));

            let full = Layout { full_width: true, col_span: Some(span), ..Default::default() };
            assert_eq!(full.span(), 12);
            assert_eq!(full.grid_class(), "col-span-1 md:col-span-full");
        }
        let unset = Layout::default();
        assert_eq!(unset.span(), 12);
        assert_eq!(unset.grid_class(), "md:col-span-12");
    }

    #[test]
    fn test_layout_placement_classes() {
        let field = FieldConfig::new(ContactField::Name, "Name", FieldKind::Text)
            .col_span(4)
            .col_start(2)
            .col_end(6)
            .order(1);
        assert_eq!(
            field.layout.grid_class(),
            "col-span-1 md:col-span-4 md:col-start-2 md:col-end-6 order-1"
        );
    }

    #[test]
    fn test_check_fields() {
        let ok = vec![
            FieldConfig::new(ContactField::Name, "Name", FieldKind::Text).col_span(6),
            FieldConfig::new(ContactField::Email, "Email", FieldKind::Email).col_span(6),
        ];
        assert_eq!(check_fields(&ok), Ok(()));

        let duplicate = vec![
            FieldConfig::new(ContactField::Name, "Name", FieldKind::Text),
            FieldConfig::new(ContactField::Name, "Again", FieldKind::Text),
        ];
        assert_eq!(check_fields(&duplicate), Err(FieldConfigError::Duplicate("Name".to_string())));

        let wide = vec![FieldConfig::new(ContactField::Name, "Name", FieldKind::Text).col_span(13)];
        assert!(matches!(check_fields(&wide), Err(FieldConfigError::SpanOutOfRange { span: 13, .. })));

        let empty_select = vec![FieldConfig::new(ContactField::Subscribed, "List", FieldKind::Select(vec![]))];
        assert_eq!(
            check_fields(&empty_select),
            Err(FieldConfigError::EmptyOptions("Subscribed".to_string()))
        );

        let backwards = vec![FieldConfig::new(ContactField::Name, "Name", FieldKind::Text).col_start(5).col_end(3)];
        assert_eq!(check_fields(&backwards), Err(FieldConfigError::InvalidColumns("Name".to_string())));
    }

    #[test]
    fn test_required_email_blocks_submit() {
        let mut form = FormState::new(blank());
        form.set(ContactField::Name, FieldValue::Text("Acme".to_string()));

        assert_eq!(form.begin_submit(false), Err(SubmitBlocked::Invalid));
        assert_eq!(form.error(ContactField::Email), Some("Email is required"));
        assert!(!form.is_submitting());

        // Errors track edits once a submit was attempted
        form.set(ContactField::Email, FieldValue::Text("acme@example.com".to_string()));
        assert_eq!(form.error(ContactField::Email), None);
    }

    #[test]
    fn test_submit_lifecycle() {
        let mut form = FormState::new(blank());
        form.set(ContactField::Name, FieldValue::Text("Acme".to_string()));
        form.set(ContactField::Email, FieldValue::Text("acme@example.com".to_string()));

        assert!(!form.can_submit(true));
        assert_eq!(form.begin_submit(true), Err(SubmitBlocked::Busy));

        let values = form.begin_submit(false).unwrap();
        assert_eq!(values.name, "Acme");
        assert!(form.is_submitting());
        assert_eq!(form.begin_submit(false), Err(SubmitBlocked::Busy));

        form.finish_submit();
        assert!(form.can_submit(false));
    }

    #[test]
    fn test_reset_restores_initial_values() {
        let initial = Contact { name: "Acme".to_string(), email: "a@b.co".to_string(), subscribed: true };
        let mut form = FormState::new(initial.clone());
        form.set(ContactField::Name, FieldValue::Text(String::new()));
        let _ = form.begin_submit(false);
        assert!(form.is_dirty());

        form.reset();
        assert_eq!(form.values(), &initial);
        assert!(form.errors().is_empty());

        form.reset_to(blank());
        assert_eq!(form.values(), &blank());
    }

    #[test]
    fn test_number_parsing() {
        assert_eq!(parse_number(" 12.5 "), 12.5);
        assert!(parse_number("").is_nan());
        assert_eq!(FieldValue::Number(f64::NAN).as_text(), "");
    }
}
