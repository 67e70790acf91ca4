// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::{ClientId, ClientRecord, ClientType, SortDirection, SortField, TypeFilter};

/// Active sort column and direction for the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

/// Header indicator for a sortable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortIcon {
    Neutral,
    Ascending,
    Descending,
}

impl SortIcon {
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Neutral => "↕",
            Self::Ascending => "↑",
            Self::Descending => "↓",
        }
    }
}

impl SortState {
    pub const fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Re-selecting the active field flips direction; any other field starts ascending.
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.flipped();
        } else {
            self.field = field;
            self.direction = SortDirection::Asc;
        }
    }

    pub fn icon(self, field: SortField) -> SortIcon {
        if self.field != field {
            return SortIcon::Neutral;
        }
        match self.direction {
            SortDirection::Asc => SortIcon::Ascending,
            SortDirection::Desc => SortIcon::Descending,
        }
    }
}

pub fn matches_search(client: &ClientRecord, search_term: &str) -> bool {
    if search_term.is_empty() {
        return true;
    }
    let needle = search_term.to_lowercase();
    [&client.name, &client.first_name, &client.last_name]
        .into_iter()
        .any(|value| value.to_lowercase().contains(&needle))
}

/// Search and type predicates combined, keeping input order.
pub fn filter_clients<'a>(
    clients: &'a [ClientRecord],
    search_term: &str,
    type_filter: TypeFilter,
) -> Vec<&'a ClientRecord> {
    clients
        .iter()
        .filter(|client| matches_search(client, search_term) && type_filter.matches(client))
        .collect()
}

/// Collation close to a browser `localeCompare`: case-insensitive first, then
/// lowercase before uppercase, then code points so distinct strings never tie.
pub fn locale_cmp(left: &str, right: &str) -> Ordering {
    let folded = left
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(right.chars().flat_map(char::to_lowercase));
    folded
        .then_with(|| case_order(left, right))
        .then_with(|| left.cmp(right))
}

fn case_order(left: &str, right: &str) -> Ordering {
    for (l, r) in left.chars().zip(right.chars()) {
        if l == r {
            continue;
        }
        match (l.is_lowercase(), r.is_lowercase()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
    }
    Ordering::Equal
}

pub fn compare_clients(left: &ClientRecord, right: &ClientRecord, field: SortField) -> Ordering {
    match field {
        SortField::Name => locale_cmp(&left.name, &right.name),
        SortField::Type => locale_cmp(left.client_type.as_str(), right.client_type.as_str()),
        SortField::AssignedTo => locale_cmp(&left.assigned_to, &right.assigned_to),
        SortField::CreatedDate => left.created_date.cmp(&right.created_date),
    }
}

/// Stable sort; equal keys keep their filtered order.
pub fn sort_clients(rows: &mut [&ClientRecord], sort: SortState) {
    rows.sort_by(|left, right| {
        let order = compare_clients(left, right, sort.field);
        match sort.direction {
            SortDirection::Asc => order,
            SortDirection::Desc => order.reverse(),
        }
    });
}

/// Moves the expanded client to the front without disturbing the others.
pub fn pin_expanded<'a>(
    rows: Vec<&'a ClientRecord>,
    expanded: Option<ClientId>,
) -> Vec<&'a ClientRecord> {
    let Some(expanded) = expanded else {
        return rows;
    };
    let Some(position) = rows.iter().position(|client| client.id == expanded) else {
        return rows;
    };
    let mut rows = rows;
    let pinned = rows.remove(position);
    rows.insert(0, pinned);
    rows
}

/// Full render order: filter, then sort, then pin.
pub fn project_rows<'a>(
    clients: &'a [ClientRecord],
    search_term: &str,
    type_filter: TypeFilter,
    sort: SortState,
    expanded: Option<ClientId>,
) -> Vec<&'a ClientRecord> {
    let mut rows = filter_clients(clients, search_term, type_filter);
    sort_clients(&mut rows, sort);
    pin_expanded(rows, expanded)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RosterCounts {
    pub all: usize,
    pub individual: usize,
    pub business: usize,
    pub missing_info: usize,
}

impl RosterCounts {
    pub fn from_clients(clients: &[ClientRecord]) -> Self {
        clients.iter().fold(Self::default(), |mut counts, client| {
            counts.all += 1;
            match client.client_type {
                ClientType::Individual => counts.individual += 1,
                ClientType::Business => counts.business += 1,
            }
            if client.has_missing_info() {
                counts.missing_info += 1;
            }
            counts
        })
    }

    pub const fn for_filter(self, filter: TypeFilter) -> usize {
        match filter {
            TypeFilter::All => self.all,
            TypeFilter::Individual => self.individual,
            TypeFilter::Business => self.business,
            TypeFilter::MissingInfo => self.missing_info,
        }
    }
}
