//! Field Validation Rules
//!
//! A small chainable checker. Rules run in order and the first failure
//! wins, so a blank required field reports "required" rather than
//! "too short".

use std::sync::OnceLock;

use regex::Regex;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"))
}

pub fn is_email(value: &str) -> bool {
    email_regex().is_match(value)
}

pub struct Check<'a> {
    value: &'a str,
    skip: bool,
    error: Option<String>,
}

impl<'a> Check<'a> {
    pub fn new(value: &'a str) -> Self {
        Self { value, skip: false, error: None }
    }

    /// Every rule is skipped while the value is blank
    pub fn optional(value: &'a str) -> Self {
        Self { value, skip: value.trim().is_empty(), error: None }
    }

    fn rule(mut self, ok: impl FnOnce(&str) -> bool, message: &str) -> Self {
        if self.error.is_none() && !self.skip && !ok(self.value) {
            self.error = Some(message.to_string());
        }
        self
    }

    pub fn required(self, message: &str) -> Self {
        self.rule(|v| !v.trim().is_empty(), message)
    }

    pub fn min_len(self, min: usize, message: &str) -> Self {
        self.rule(|v| v.chars().count() >= min, message)
    }

    pub fn max_len(self, max: usize, message: &str) -> Self {
        self.rule(|v| v.chars().count() <= max, message)
    }

    pub fn email(self, message: &str) -> Self {
        self.rule(is_email, message)
    }

    pub fn matches(self, pattern: &Regex, message: &str) -> Self {
        self.rule(|v| pattern.is_match(v), message)
    }

    /// Arbitrary predicate over the value
    pub fn ensure(self, ok: impl FnOnce(&str) -> bool, message: &str) -> Self {
        self.rule(ok, message)
    }

    pub fn finish(self) -> Option<String> {
        self.error
    }
}

/// Numeric checks; NaN stands for "not a number" input and always fails
pub struct NumberCheck {
    value: f64,
    error: Option<String>,
}

impl NumberCheck {
    pub fn new(value: f64, message: &str) -> Self {
        let error = value.is_nan().then(|| message.to_string());
        Self { value, error }
    }

    fn rule(mut self, ok: bool, message: &str) -> Self {
        if self.error.is_none() && !ok {
            self.error = Some(message.to_string());
        }
        self
    }

    pub fn positive(self, message: &str) -> Self {
        let ok = self.value > 0.0;
        self.rule(ok, message)
    }

    pub fn min(self, min: f64, message: &str) -> Self {
        let ok = self.value >= min;
        self.rule(ok, message)
    }

    pub fn max(self, max: f64, message: &str) -> Self {
        let ok = self.value <= max;
        self.rule(ok, message)
    }

    pub fn integer(self, message: &str) -> Self {
        let ok = self.value.fract() == 0.0;
        self.rule(ok, message)
    }

    pub fn finish(self) -> Option<String> {
        self.error
    }
}
