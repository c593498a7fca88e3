//! Login, registration and profile forms

use std::sync::OnceLock;

use regex::Regex;

use crate::forms::validate::Check;
use crate::forms::{FieldConfig, FieldErrors, FieldKind, FieldValue, FormModel};
use crate::models::{LoginRequest, RegisterRequest, User, UserPatch};

static USERNAME_RE: OnceLock<Regex> = OnceLock::new();

fn username_regex() -> &'static Regex {
    USERNAME_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid username regex"))
}

fn has_mixed_case_and_digit(password: &str) -> bool {
    password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

// ========================
// Login
// ========================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoginField {
    Email,
    Password,
}

impl LoginForm {
    pub fn to_request(&self) -> LoginRequest {
        LoginRequest { email: self.email.trim().to_string(), password: self.password.clone() }
    }
}

impl FormModel for LoginForm {
    type Field = LoginField;

    fn value(&self, field: LoginField) -> FieldValue {
        match field {
            LoginField::Email => FieldValue::Text(self.email.clone()),
            LoginField::Password => FieldValue::Text(self.password.clone()),
        }
    }

    fn set_value(&mut self, field: LoginField, value: FieldValue) {
        match field {
            LoginField::Email => self.email = value.as_text(),
            LoginField::Password => self.password = value.as_text(),
        }
    }

    fn validate(&self) -> FieldErrors<LoginField> {
        let mut errors = FieldErrors::new();
        errors.check(
            LoginField::Email,
            Check::new(&self.email).required("Email is required").email("Must be a valid email").finish(),
        );
        errors.check(
            LoginField::Password,
            Check::new(&self.password)
                .required("Password is required")
                .min_len(8, "Password must be at least 8 characters")
                .finish(),
        );
        errors
    }
}

pub fn login_fields() -> Vec<FieldConfig<LoginField>> {
    vec![
        FieldConfig::new(LoginField::Email, "Email", FieldKind::Email)
            .placeholder("you@example.com")
            .required(),
        FieldConfig::new(LoginField::Password, "Password", FieldKind::Password).required(),
    ]
}

// ========================
// Registration
// ========================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterField {
    Username,
    Email,
    Password,
    PasswordConfirm,
    FirstName,
    LastName,
}

impl RegisterForm {
    pub fn to_request(&self) -> RegisterRequest {
        RegisterRequest {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            password_confirm: self.password_confirm.clone(),
            first_name: optional(&self.first_name),
            last_name: optional(&self.last_name),
        }
    }
}

impl FormModel for RegisterForm {
    type Field = RegisterField;

    fn value(&self, field: RegisterField) -> FieldValue {
        let text = match field {
            RegisterField::Username => &self.username,
            RegisterField::Email => &self.email,
            RegisterField::Password => &self.password,
            RegisterField::PasswordConfirm => &self.password_confirm,
            RegisterField::FirstName => &self.first_name,
            RegisterField::LastName => &self.last_name,
        };
        FieldValue::Text(text.clone())
    }

    fn set_value(&mut self, field: RegisterField, value: FieldValue) {
        let slot = match field {
            RegisterField::Username => &mut self.username,
            RegisterField::Email => &mut self.email,
            RegisterField::Password => &mut self.password,
            RegisterField::PasswordConfirm => &mut self.password_confirm,
            RegisterField::FirstName => &mut self.first_name,
            RegisterField::LastName => &mut self.last_name,
        };
        *slot = value.as_text();
    }

    fn validate(&self) -> FieldErrors<RegisterField> {
        let mut errors = FieldErrors::new();
        errors.check(
            RegisterField::Username,
            Check::new(&self.username)
                .required("Username is required")
                .min_len(3, "Username must be at least 3 characters")
                .max_len(150, "Username cannot exceed 150 characters")
                .matches(username_regex(), "Only letters, numbers and underscores are allowed")
                .finish(),
        );
        errors.check(
            RegisterField::Email,
            Check::new(&self.email).required("Email is required").email("Must be a valid email").finish(),
        );
        errors.check(
            RegisterField::Password,
            Check::new(&self.password)
                .required("Password is required")
                .min_len(8, "Password must be at least 8 characters")
                .ensure(
                    has_mixed_case_and_digit,
                    "Password must contain an uppercase letter, a lowercase letter and a number",
                )
                .finish(),
        );
        let password = self.password.as_str();
        errors.check(
            RegisterField::PasswordConfirm,
            Check::new(&self.password_confirm)
                .required("Confirm your password")
                .ensure(|confirm| confirm == password, "Passwords do not match")
                .finish(),
        );
        errors
    }
}

pub fn register_fields() -> Vec<FieldConfig<RegisterField>> {
    vec![
        FieldConfig::new(RegisterField::FirstName, "First name", FieldKind::Text).col_span(6),
        FieldConfig::new(RegisterField::LastName, "Last name", FieldKind::Text).col_span(6),
        FieldConfig::new(RegisterField::Username, "Username", FieldKind::Text).required(),
        FieldConfig::new(RegisterField::Email, "Email", FieldKind::Email)
            .placeholder("you@example.com")
            .required(),
        FieldConfig::new(RegisterField::Password, "Password", FieldKind::Password)
            .required()
            .col_span(6),
        FieldConfig::new(RegisterField::PasswordConfirm, "Confirm password", FieldKind::Password)
            .required()
            .col_span(6),
    ]
}

// ========================
// Profile
// ========================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileField {
    FirstName,
    LastName,
    Email,
}

impl From<&User> for ProfileForm {
    fn from(user: &User) -> Self {
        Self {
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }
}

impl ProfileForm {
    pub fn to_patch(&self) -> UserPatch {
        UserPatch {
            first_name: Some(self.first_name.trim().to_string()),
            last_name: Some(self.last_name.trim().to_string()),
            email: Some(self.email.trim().to_string()),
            ..Default::default()
        }
    }
}

impl FormModel for ProfileForm {
    type Field = ProfileField;

    fn value(&self, field: ProfileField) -> FieldValue {
        let text = match field {
            ProfileField::FirstName => &self.first_name,
            ProfileField::LastName => &self.last_name,
            ProfileField::Email => &self.email,
        };
        FieldValue::Text(text.clone())
    }

    fn set_value(&mut self, field: ProfileField, value: FieldValue) {
        let slot = match field {
            ProfileField::FirstName => &mut self.first_name,
            ProfileField::LastName => &mut self.last_name,
            ProfileField::Email => &mut self.email,
        };
        *slot = value.as_text();
    }

    fn validate(&self) -> FieldErrors<ProfileField> {
        let mut errors = FieldErrors::new();
        errors.check(
            ProfileField::FirstName,
            Check::optional(&self.first_name).max_len(150, "First name cannot exceed 150 characters").finish(),
        );
        errors.check(
            ProfileField::LastName,
            Check::optional(&self.last_name).max_len(150, "Last name cannot exceed 150 characters").finish(),
        );
        errors.check(
            ProfileField::Email,
            Check::new(&self.email).required("Email is required").email("Must be a valid email").finish(),
        );
        errors
    }
}

pub fn profile_fields() -> Vec<FieldConfig<ProfileField>> {
    vec![
        FieldConfig::new(ProfileField::FirstName, "First name", FieldKind::Text).col_span(6),
        FieldConfig::new(ProfileField::LastName, "Last name", FieldKind::Text).col_span(6),
        FieldConfig::new(ProfileField::Email, "Email", FieldKind::Email).required().full_width(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forms::check_fields;

    fn registration() -> RegisterForm {
        RegisterForm {
            username: "ada_l".to_string(),
            email: "ada@example.com".to_string(),
            password: "Analytic1".to_string(),
            password_confirm: "Analytic1".to_string(),
            first_name: "Ada".to_string(),
            last_name: String::new(),
        }
    }

    #[test]
    fn test_field_lists_are_consistent() {
        assert!(check_fields(&login_fields()).is_ok());
        assert!(check_fields(&register_fields()).is_ok());
        assert!(check_fields(&profile_fields()).is_ok());
    }

    #[test]
    fn test_login_password_length() {
        let form = LoginForm { email: "ada@example.com".to_string(), password: "short".to_string() };
        assert_eq!(
            form.validate().get(LoginField::Password),
            Some("Password must be at least 8 characters")
        );
    }

    #[test]
    fn test_register_rules() {
        assert!(registration().validate().is_empty());

        let mut form = registration();
        form.password = "alllowercase1".to_string();
        form.password_confirm = "different".to_string();
        form.username = "ada lovelace".to_string();
        let errors = form.validate();
        assert_eq!(
            errors.get(RegisterField::Password),
            Some("Password must contain an uppercase letter, a lowercase letter and a number")
        );
        assert_eq!(errors.get(RegisterField::PasswordConfirm), Some("Passwords do not match"));
        assert_eq!(
            errors.get(RegisterField::Username),
            Some("Only letters, numbers and underscores are allowed")
        );
    }

    #[test]
    fn test_register_request_drops_blank_names() {
        let request = registration().to_request();
        assert_eq!(request.first_name.as_deref(), Some("Ada"));
        assert_eq!(request.last_name, None);
    }

    #[test]
    fn test_profile_patch() {
        let form = ProfileForm {
            first_name: " Ada ".to_string(),
            last_name: "Byron".to_string(),
            email: "ada@example.com".to_string(),
        };
        let patch = form.to_patch();
        assert_eq!(patch.first_name.as_deref(), Some("Ada"));
        assert_eq!(patch.username, None);
    }
}
