// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientGroup {
    pub id: String,
    pub name: String,
    pub description: String,
    pub is_default: bool,
}

const DEFAULT_GROUPS: [(&str, &str, &str); 27] = [
    ("lead", "Lead", "Prospective client or new lead"),
    ("1040", "1040", "Standard individual return"),
    ("1040ez", "1040EZ", "Simplified individual return (legacy)"),
    ("1040nr", "1040NR", "Nonresident return"),
    ("1040py", "1040PY", "Part-year resident"),
    ("sch-a", "Sch A", "Itemized deductions"),
    ("sch-b", "Sch B", "Interest & dividends"),
    ("sch-c", "Sch C", "Sole proprietor / self-employment"),
    ("sch-d", "Sch D", "Capital gains / losses"),
    ("sch-e", "Sch E", "Rental, partnership, or S-Corp income"),
    ("sch-f", "Sch F", "Farming income (optional)"),
    ("1065", "1065", "Partnership return"),
    ("1120s", "1120S", "S-Corporation return"),
    ("1120", "1120", "C-Corporation return"),
    ("1041", "1041", "Trust / Estate return"),
    ("990", "990", "Nonprofit organization return"),
    ("940", "940", "Federal unemployment (FUTA)"),
    ("941", "941", "Employer's quarterly payroll return"),
    ("sch-l", "Sch L", "Balance sheet schedule (business returns)"),
    ("bookkeeping", "Bookkeeping", "Monthly or quarterly accounting work"),
    ("sales-tax", "Sales Tax", "State or local sales/use filings"),
    ("multi-state", "Multi-State", "Income or nexus across multiple states"),
    ("international", "International", "Foreign income, FBAR, or related filings"),
    ("catch-up", "Catch-Up Work", "Prior-year or back-filed returns"),
    ("advisory", "Advisory", "Tax planning or CFO-type advisory"),
    ("entity-formation", "Entity Formation", "New entity setup or registration"),
    ("missing-info", "Missing Info", "Client has incomplete or missing information"),
];

const BUSINESS_RETURNS: [&str; 5] = ["1065", "1120S", "1120", "1041", "990"];
const PAYROLL: [&str; 2] = ["940", "941"];
const SERVICES: [&str; 7] = [
    "Bookkeeping",
    "Sales Tax",
    "Multi-State",
    "International",
    "Catch-Up Work",
    "Advisory",
    "Entity Formation",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupCategory {
    IndividualReturns,
    Schedules,
    BusinessReturns,
    Payroll,
    Services,
    Other,
}

impl GroupCategory {
    pub const ALL: [Self; 6] = [
        Self::IndividualReturns,
        Self::Schedules,
        Self::BusinessReturns,
        Self::Payroll,
        Self::Services,
        Self::Other,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::IndividualReturns => "Individual Returns",
            Self::Schedules => "Schedules",
            Self::BusinessReturns => "Business Returns",
            Self::Payroll => "Payroll",
            Self::Services => "Services",
            Self::Other => "Other",
        }
    }

    /// Classification is by display name, so renamed groups move.
    pub fn of(name: &str) -> Self {
        if name.starts_with("1040") {
            Self::IndividualReturns
        } else if name.starts_with("Sch") {
            Self::Schedules
        } else if BUSINESS_RETURNS.contains(&name) {
            Self::BusinessReturns
        } else if PAYROLL.contains(&name) {
            Self::Payroll
        } else if SERVICES.contains(&name) {
            Self::Services
        } else {
            Self::Other
        }
    }
}

/// Lowercased name with each whitespace run, edges included, turned into `-`.
pub fn group_id_for(name: &str) -> String {
    let mut id = String::with_capacity(name.len());
    let mut in_space = false;
    for ch in name.to_lowercase().chars() {
        if ch.is_whitespace() {
            if !in_space {
                id.push('-');
            }
            in_space = true;
        } else {
            id.push(ch);
            in_space = false;
        }
    }
    id
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientGroups {
    groups: Vec<ClientGroup>,
}

impl Default for ClientGroups {
    fn default() -> Self {
        Self {
            groups: DEFAULT_GROUPS
                .iter()
                .map(|(id, name, description)| ClientGroup {
                    id: (*id).to_owned(),
                    name: (*name).to_owned(),
                    description: (*description).to_owned(),
                    is_default: true,
                })
                .collect(),
        }
    }
}

impl ClientGroups {
    pub fn from_groups(groups: Vec<ClientGroup>) -> Self {
        Self { groups }
    }

    pub fn all(&self) -> &[ClientGroup] {
        &self.groups
    }

    pub fn get(&self, id: &str) -> Option<&ClientGroup> {
        self.groups.iter().find(|group| group.id == id)
    }

    pub fn names(&self) -> Vec<&str> {
        self.groups.iter().map(|group| group.name.as_str()).collect()
    }

    /// Blank names and ids that already exist are ignored.
    pub fn add(&mut self, name: &str, description: &str) -> Option<&ClientGroup> {
        if name.trim().is_empty() {
            return None;
        }
        let id = group_id_for(name);
        if self.get(&id).is_some() {
            return None;
        }
        self.groups.push(ClientGroup {
            id,
            name: name.to_owned(),
            description: description.to_owned(),
            is_default: false,
        });
        self.groups.last()
    }

    pub fn update(&mut self, id: &str, name: &str, description: &str) -> bool {
        if name.trim().is_empty() {
            return false;
        }
        let Some(group) = self.groups.iter_mut().find(|group| group.id == id) else {
            return false;
        };
        group.name = name.to_owned();
        group.description = description.to_owned();
        true
    }

    pub fn remove(&mut self, id: &str) -> Option<ClientGroup> {
        let index = self.groups.iter().position(|group| group.id == id)?;
        Some(self.groups.remove(index))
    }

    /// Case-insensitive match on name or description.
    pub fn search(&self, query: &str) -> Vec<&ClientGroup> {
        let needle = query.to_lowercase();
        self.groups
            .iter()
            .filter(|group| {
                group.name.to_lowercase().contains(&needle)
                    || group.description.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Non-empty categories in display order.
    pub fn categorized<'a>(
        groups: &[&'a ClientGroup],
    ) -> Vec<(GroupCategory, Vec<&'a ClientGroup>)> {
        GroupCategory::ALL
            .into_iter()
            .filter_map(|category| {
                let members: Vec<&ClientGroup> = groups
                    .iter()
                    .copied()
                    .filter(|group| GroupCategory::of(&group.name) == category)
                    .collect();
                (!members.is_empty()).then_some((category, members))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientGroups, GroupCategory, group_id_for};

    #[test]
    fn defaults_have_unique_ids() {
        let groups = ClientGroups::default();
        assert_eq!(groups.all().len(), 27);
        let mut ids: Vec<&str> = groups.all().iter().map(|group| group.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 27);
        assert!(groups.all().iter().all(|group| group.is_default));
    }

    #[test]
    fn group_id_collapses_whitespace_runs() {
        assert_eq!(group_id_for("Estate  Planning Team"), "estate-planning-team");
        assert_eq!(group_id_for("Crypto"), "crypto");
    }

    #[test]
    fn group_ids_keep_edge_whitespace_as_dashes() {
        assert_eq!(group_id_for(" VIP"), "-vip");
        assert_eq!(group_id_for("Key Client\t "), "key-client-");

        let mut groups = ClientGroups::default();
        let added = groups.add(" VIP", "").map(|group| group.id.clone());
        assert_eq!(added.as_deref(), Some("-vip"));
        assert!(groups.add("VIP", "").is_some());
    }

    #[test]
    fn add_ignores_blank_and_duplicate_names() {
        let mut groups = ClientGroups::default();
        assert!(groups.add("   ", "nothing").is_none());
        assert!(groups.add("Bookkeeping", "again").is_none());

        let added = groups.add("Crypto Assets", "Digital asset reporting").cloned();
        let added = added.expect("new group");
        assert_eq!(added.id, "crypto-assets");
        assert!(!added.is_default);
        assert_eq!(groups.all().len(), 28);
    }

    #[test]
    fn update_and_remove_by_id() {
        let mut groups = ClientGroups::default();
        assert!(groups.update("advisory", "Advisory Plus", "Expanded planning"));
        assert_eq!(
            groups.get("advisory").map(|group| group.name.as_str()),
            Some("Advisory Plus")
        );
        assert!(!groups.update("advisory", " ", "blank"));
        assert!(!groups.update("nope", "Name", ""));

        assert!(groups.remove("sch-f").is_some());
        assert!(groups.remove("sch-f").is_none());
    }

    #[test]
    fn search_matches_description_case_insensitively() {
        let groups = ClientGroups::default();
        let hits: Vec<&str> = groups
            .search("PAYROLL")
            .iter()
            .map(|group| group.id.as_str())
            .collect();
        assert_eq!(hits, vec!["941"]);
    }

    #[test]
    fn categories_follow_display_names() {
        assert_eq!(GroupCategory::of("1040NR"), GroupCategory::IndividualReturns);
        assert_eq!(GroupCategory::of("Sch L"), GroupCategory::Schedules);
        assert_eq!(GroupCategory::of("1120S"), GroupCategory::BusinessReturns);
        assert_eq!(GroupCategory::of("940"), GroupCategory::Payroll);
        assert_eq!(GroupCategory::of("Catch-Up Work"), GroupCategory::Services);
        assert_eq!(GroupCategory::of("Missing Info"), GroupCategory::Other);
        assert_eq!(GroupCategory::of("Lead"), GroupCategory::Other);
    }

    #[test]
    fn categorized_defaults_cover_every_group_once() {
        let groups = ClientGroups::default();
        let all: Vec<_> = groups.all().iter().collect();
        let categorized = ClientGroups::categorized(&all);
        assert_eq!(categorized.len(), GroupCategory::ALL.len());
        let total: usize = categorized.iter().map(|(_, members)| members.len()).sum();
        assert_eq!(total, 27);
        assert_eq!(categorized[0].1.len(), 4);
        assert_eq!(categorized[1].1.len(), 7);
    }
}
