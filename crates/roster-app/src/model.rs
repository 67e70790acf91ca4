// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::Date;

use crate::ids::*;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// Team members a single client can be assigned to from the roster.
pub const TEAM_MEMBERS: [&str; 5] = [
    "Sarah Johnson",
    "Mike Brown",
    "Emily Davis",
    "John Smith",
    "Lisa Chen",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClientType {
    Individual,
    Business,
}

impl ClientType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "Individual",
            Self::Business => "Business",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Individual" | "individual" => Some(Self::Individual),
            "Business" | "business" => Some(Self::Business),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: ClientId,
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub client_type: ClientType,
    pub email: String,
    pub phone: String,
    pub tags: Vec<String>,
    pub assigned_to: String,
    #[serde(with = "iso_date")]
    pub created_date: Date,
}

impl ClientRecord {
    /// No tags, or a blank email or phone.
    pub fn has_missing_info(&self) -> bool {
        self.tags.is_empty() || self.email.is_empty() || self.phone.is_empty()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|existing| existing == tag)
    }
}

/// Partial update the roster asks its host to apply to one client.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientUpdate {
    pub tags: Option<Vec<String>>,
    pub assigned_to: Option<String>,
}

impl ClientUpdate {
    pub fn tags(tags: Vec<String>) -> Self {
        Self {
            tags: Some(tags),
            assigned_to: None,
        }
    }

    pub fn assigned_to(member: impl Into<String>) -> Self {
        Self {
            tags: None,
            assigned_to: Some(member.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_none() && self.assigned_to.is_none()
    }

    pub fn apply_to(&self, client: &mut ClientRecord) {
        if let Some(tags) = &self.tags {
            client.tags = tags.clone();
        }
        if let Some(member) = &self.assigned_to {
            client.assigned_to = member.clone();
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Individual,
    Business,
    MissingInfo,
}

impl TypeFilter {
    pub const ALL: [Self; 4] = [
        Self::All,
        Self::Individual,
        Self::Business,
        Self::MissingInfo,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Individual => "Individual",
            Self::Business => "Business",
            Self::MissingInfo => "Missing Info",
        }
    }

    pub fn matches(self, client: &ClientRecord) -> bool {
        match self {
            Self::All => true,
            Self::Individual => client.client_type == ClientType::Individual,
            Self::Business => client.client_type == ClientType::Business,
            Self::MissingInfo => client.has_missing_info(),
        }
    }

    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortField {
    #[default]
    Name,
    Type,
    AssignedTo,
    CreatedDate,
}

impl SortField {
    pub const ALL: [Self; 4] = [Self::Name, Self::Type, Self::AssignedTo, Self::CreatedDate];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Type => "type",
            Self::AssignedTo => "assignedTo",
            Self::CreatedDate => "createdDate",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(Self::Name),
            "type" => Some(Self::Type),
            "assignedTo" => Some(Self::AssignedTo),
            "createdDate" => Some(Self::CreatedDate),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Type => "type",
            Self::AssignedTo => "assigned",
            Self::CreatedDate => "created",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn flipped(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ViewMode {
    #[default]
    Card,
    List,
    Table,
}

impl ViewMode {
    pub const ALL: [Self; 3] = [Self::Card, Self::List, Self::Table];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Card => "card",
            Self::List => "list",
            Self::Table => "table",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "card" => Some(Self::Card),
            "list" => Some(Self::List),
            "table" => Some(Self::Table),
            _ => None,
        }
    }

    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|mode| *mode == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

/// Resizable columns of the table view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Column {
    Client,
    Contact,
    AssignedTo,
    Created,
    Tags,
}

impl Column {
    pub const COUNT: usize = 5;
    pub const ALL: [Self; Self::COUNT] = [
        Self::Client,
        Self::Contact,
        Self::AssignedTo,
        Self::Created,
        Self::Tags,
    ];

    pub const fn index(self) -> usize {
        match self {
            Self::Client => 0,
            Self::Contact => 1,
            Self::AssignedTo => 2,
            Self::Created => 3,
            Self::Tags => 4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Contact => "contact",
            Self::AssignedTo => "assigned to",
            Self::Created => "created",
            Self::Tags => "tags",
        }
    }

    pub const fn default_width(self) -> u32 {
        match self {
            Self::Client => 220,
            Self::Contact => 160,
            Self::AssignedTo => 140,
            Self::Created => 110,
            Self::Tags => 140,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientRecord, ClientType, ClientUpdate, Column, SortField, TypeFilter, ViewMode};
    use crate::ClientId;
    use time::macros::date;

    fn client(tags: &[&str], email: &str, phone: &str) -> ClientRecord {
        ClientRecord {
            id: ClientId::new(1),
            name: "Ann Lee".to_owned(),
            first_name: "Ann".to_owned(),
            last_name: "Lee".to_owned(),
            client_type: ClientType::Individual,
            email: email.to_owned(),
            phone: phone.to_owned(),
            tags: tags.iter().map(|tag| (*tag).to_owned()).collect(),
            assigned_to: String::new(),
            created_date: date!(2025 - 03 - 14),
        }
    }

    #[test]
    fn missing_info_requires_tags_email_and_phone() {
        assert!(!client(&["Lead"], "ann@example.com", "555-0100").has_missing_info());
        assert!(client(&[], "ann@example.com", "555-0100").has_missing_info());
        assert!(client(&["Lead"], "", "555-0100").has_missing_info());
        assert!(client(&["Lead"], "ann@example.com", "").has_missing_info());
    }

    #[test]
    fn type_filter_cycles_through_all_variants() {
        let mut filter = TypeFilter::All;
        for _ in 0..TypeFilter::ALL.len() {
            filter = filter.next();
        }
        assert_eq!(filter, TypeFilter::All);
        assert_eq!(TypeFilter::MissingInfo.label(), "Missing Info");
    }

    #[test]
    fn sort_field_parse_round_trips_labels() {
        for field in SortField::ALL {
            assert_eq!(SortField::parse(field.as_str()), Some(field));
        }
        assert_eq!(SortField::parse("email"), None);
    }

    #[test]
    fn view_mode_parse_rejects_unknown_values() {
        assert_eq!(ViewMode::parse("table"), Some(ViewMode::Table));
        assert_eq!(ViewMode::parse("grid"), None);
    }

    #[test]
    fn column_indexes_match_declaration_order() {
        for (position, column) in Column::ALL.iter().enumerate() {
            assert_eq!(column.index(), position);
            assert!(column.default_width() >= 100);
        }
    }

    #[test]
    fn client_update_only_touches_present_fields() {
        let mut record = client(&["Lead"], "ann@example.com", "555-0100");
        ClientUpdate::assigned_to("Mike Brown").apply_to(&mut record);
        assert_eq!(record.assigned_to, "Mike Brown");
        assert_eq!(record.tags, vec!["Lead".to_owned()]);

        ClientUpdate::tags(Vec::new()).apply_to(&mut record);
        assert!(record.tags.is_empty());
        assert_eq!(record.assigned_to, "Mike Brown");
    }
}
