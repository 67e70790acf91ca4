// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cell::Cell;
use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::ClientType;

pub const PLACEHOLDER_EMAIL_DOMAIN: &str = "afakedomain.net";
pub const DEFAULT_GROUP_ID: &str = "lead";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QuickField {
    BusinessName,
    FirstName,
    LastName,
    Email,
}

impl QuickField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::BusinessName => "business name",
            Self::FirstName => "first name",
            Self::LastName => "last name",
            Self::Email => "email",
        }
    }
}

pub type FieldErrors = BTreeMap<QuickField, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickClientForm {
    pub client_type: ClientType,
    pub business_name: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub group_id: String,
    pub send_credentials: bool,
    use_placeholder_email: bool,
}

impl Default for QuickClientForm {
    fn default() -> Self {
        Self {
            client_type: ClientType::Individual,
            business_name: String::new(),
            first_name: String::new(),
            middle_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            phone: String::new(),
            group_id: DEFAULT_GROUP_ID.to_owned(),
            send_credentials: true,
            use_placeholder_email: false,
        }
    }
}

/// What a valid quick-add form hands to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickClientRequest {
    pub client_type: ClientType,
    pub business_name: Option<String>,
    pub first_name: String,
    pub middle_name: Option<String>,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub group_id: String,
    pub send_credentials: bool,
}

impl QuickClientRequest {
    pub fn display_name(&self) -> String {
        match (&self.client_type, &self.business_name) {
            (ClientType::Business, Some(name)) => name.clone(),
            _ => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

impl QuickClientForm {
    pub fn uses_placeholder_email(&self) -> bool {
        self.use_placeholder_email
    }

    /// Switching the placeholder on fills the email with a generated
    /// address; switching it off blanks the email.
    pub fn set_placeholder_email(&mut self, enabled: bool, unique_id: u64) {
        self.use_placeholder_email = enabled;
        self.email = if enabled {
            placeholder_email(unique_id)
        } else {
            String::new()
        };
    }

    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.client_type == ClientType::Business && self.business_name.trim().is_empty() {
            errors.insert(QuickField::BusinessName, "Business name is required".to_owned());
        }
        if self.first_name.trim().is_empty() {
            errors.insert(QuickField::FirstName, "First name is required".to_owned());
        }
        if self.last_name.trim().is_empty() {
            errors.insert(QuickField::LastName, "Last name is required".to_owned());
        }
        if !self.use_placeholder_email {
            if self.email.trim().is_empty() {
                errors.insert(QuickField::Email, "Email is required".to_owned());
            } else if !is_plausible_email(&self.email) {
                errors.insert(
                    QuickField::Email,
                    "Please enter a valid email address".to_owned(),
                );
            }
        }
        errors
    }

    pub fn request(&self) -> QuickClientRequest {
        let non_empty = |value: &str| (!value.is_empty()).then(|| value.to_owned());
        QuickClientRequest {
            client_type: self.client_type,
            business_name: match self.client_type {
                ClientType::Business => Some(self.business_name.clone()),
                ClientType::Individual => None,
            },
            first_name: self.first_name.clone(),
            middle_name: non_empty(&self.middle_name),
            last_name: self.last_name.clone(),
            email: self.email.clone(),
            phone: non_empty(&self.phone),
            group_id: self.group_id.clone(),
            send_credentials: self.send_credentials,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

pub fn placeholder_email(unique_id: u64) -> String {
    format!("{unique_id}@{PLACEHOLDER_EMAIL_DOMAIN}")
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
pub fn is_plausible_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(index, ch)| ch == '.' && index > 0 && index + 1 < domain.len())
}

/// In-flight flag for the quick-add submit. Only one submission runs at a
/// time; the flag clears when the guard drops, on success or failure.
#[derive(Debug, Default)]
pub struct SubmissionGate {
    in_flight: Cell<bool>,
}

impl SubmissionGate {
    pub fn is_submitting(&self) -> bool {
        self.in_flight.get()
    }

    pub fn begin(&self) -> Option<SubmitGuard<'_>> {
        if self.in_flight.replace(true) {
            return None;
        }
        Some(SubmitGuard { gate: self })
    }
}

#[derive(Debug)]
pub struct SubmitGuard<'a> {
    gate: &'a SubmissionGate,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.gate.in_flight.set(false);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome<T> {
    Rejected(FieldErrors),
    Busy,
    Created(T),
}

/// Validates, then runs `create` behind the gate. The form is reset only
/// after `create` succeeds.
pub fn submit<T>(
    form: &mut QuickClientForm,
    gate: &SubmissionGate,
    create: impl FnOnce(QuickClientRequest) -> Result<T>,
) -> Result<SubmitOutcome<T>> {
    let errors = form.validate();
    if !errors.is_empty() {
        return Ok(SubmitOutcome::Rejected(errors));
    }
    let Some(_guard) = gate.begin() else {
        return Ok(SubmitOutcome::Busy);
    };
    let created = create(form.request())?;
    tracing::info!(group = %form.group_id, "quick client created");
    form.reset();
    Ok(SubmitOutcome::Created(created))
}
