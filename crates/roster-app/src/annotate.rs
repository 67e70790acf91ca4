// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::macros::format_description;

use crate::ClientRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FolderTab {
    #[default]
    Snapshot,
    Demographics,
    Activity,
    Communication,
    Invoices,
    Signatures,
    Documents,
    Notes,
    Organizer,
    Teams,
}

impl FolderTab {
    pub const ALL: [Self; 10] = [
        Self::Snapshot,
        Self::Demographics,
        Self::Activity,
        Self::Communication,
        Self::Invoices,
        Self::Signatures,
        Self::Documents,
        Self::Notes,
        Self::Organizer,
        Self::Teams,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Snapshot => "Snapshot",
            Self::Demographics => "Demographics",
            Self::Activity => "Activity",
            Self::Communication => "Communication",
            Self::Invoices => "Invoices",
            Self::Signatures => "Signatures",
            Self::Documents => "Documents",
            Self::Notes => "Notes",
            Self::Organizer => "Organizer",
            Self::Teams => "Teams",
        }
    }

    pub fn next(self) -> Self {
        let index = Self::ALL.iter().position(|tab| *tab == self).unwrap_or(0);
        Self::ALL[(index + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let index = Self::ALL.iter().position(|tab| *tab == self).unwrap_or(0);
        Self::ALL[(index + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommunicationSubTab {
    Internal,
    External,
    Texting,
    Email,
    CallbackHistory,
}

impl CommunicationSubTab {
    pub const ALL: [Self; 5] = [
        Self::Internal,
        Self::External,
        Self::Texting,
        Self::Email,
        Self::CallbackHistory,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
            Self::Texting => "texting",
            Self::Email => "email",
            Self::CallbackHistory => "callback-history",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|sub_tab| sub_tab.as_str() == value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoValue {
    Count(u32),
    Text(String),
    /// Rendered as an absolute "Mon D, h:mm AM" stamp.
    Timestamp(OffsetDateTime),
    /// Rendered relative to now once under a day old.
    Recent(OffsetDateTime),
}

impl InfoValue {
    pub fn render(&self, now: OffsetDateTime) -> String {
        match self {
            Self::Count(count) => count.to_string(),
            Self::Text(text) => text.clone(),
            Self::Timestamp(at) => format_absolute_time(*at),
            Self::Recent(at) => format_relative_time(now, *at),
        }
    }
}

/// Tab-specific fields for one client, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContextInfo {
    fields: Vec<(&'static str, InfoValue)>,
}

impl ContextInfo {
    pub fn get(&self, field: &str) -> Option<&InfoValue> {
        self.fields
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &InfoValue)> + '_ {
        self.fields.iter().map(|(name, value)| (*name, value))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

pub fn context_fields(tab: FolderTab, sub_tab: Option<CommunicationSubTab>) -> &'static [&'static str] {
    match (tab, sub_tab) {
        (FolderTab::Snapshot | FolderTab::Demographics, _) => &["email", "phone"],
        (FolderTab::Teams, _) => &["teamMembers", "assignedTo"],
        (FolderTab::Communication, Some(CommunicationSubTab::Internal)) => {
            &["unreadCount", "lastPoster", "lastTime"]
        }
        (FolderTab::Communication, Some(CommunicationSubTab::External)) => {
            &["unreadCount", "lastMessage", "lastTime"]
        }
        (FolderTab::Communication, Some(CommunicationSubTab::Email)) => {
            &["unreadCount", "lastSubject", "lastTime"]
        }
        (FolderTab::Communication, Some(CommunicationSubTab::Texting)) => {
            &["unreadCount", "lastText", "lastTime"]
        }
        (FolderTab::Communication, Some(CommunicationSubTab::CallbackHistory)) => {
            &["openCount", "notReachedCount", "completedCount"]
        }
        (FolderTab::Communication, None) => &["lastContact", "unreadCount", "lastMessage"],
        (FolderTab::Invoices, _) => &["paidCount", "pendingCount", "overdueCount"],
        (FolderTab::Signatures, _) => &["pending", "completed"],
        (FolderTab::Documents, _) => &["receivedCount", "pendingCount", "needReviewCount"],
        (FolderTab::Activity, _) => &["lastActivity"],
        (FolderTab::Notes, _) => &["count", "lastNote"],
        (FolderTab::Organizer, _) => &["pending", "completed"],
    }
}

/// Source of the per-tab summary values. Implementations must be
/// deterministic for a given client, tab and field.
pub trait ContextualInfoProvider {
    fn field_value(
        &self,
        client: &ClientRecord,
        tab: FolderTab,
        sub_tab: Option<CommunicationSubTab>,
        field: &str,
    ) -> Option<InfoValue>;
}

/// Values the client record answers directly, for providers to fall back on.
pub fn client_field(client: &ClientRecord, field: &str) -> Option<InfoValue> {
    match field {
        "email" => Some(InfoValue::Text(client.email.clone())),
        "phone" => Some(InfoValue::Text(client.phone.clone())),
        "assignedTo" => Some(InfoValue::Text(client.assigned_to.clone())),
        _ => None,
    }
}

/// Fields the provider leaves unanswered are omitted; anything outside the
/// tab's shape is never asked for.
pub fn annotate<P: ContextualInfoProvider + ?Sized>(
    provider: &P,
    client: &ClientRecord,
    tab: FolderTab,
    sub_tab: Option<CommunicationSubTab>,
) -> ContextInfo {
    let sub_tab = if tab == FolderTab::Communication {
        sub_tab
    } else {
        None
    };
    let fields = context_fields(tab, sub_tab)
        .iter()
        .filter_map(|field| {
            provider
                .field_value(client, tab, sub_tab, field)
                .map(|value| (*field, value))
        })
        .collect();
    ContextInfo { fields }
}

pub fn format_absolute_time(at: OffsetDateTime) -> String {
    at.format(format_description!(
        "[month repr:short] [day padding:none], [hour repr:12 padding:none]:[minute] [period]"
    ))
    .unwrap_or_else(|_| at.date().to_string())
}

/// "Just now", "Nm ago" and "Nh ago" inside a day, absolute after that.
/// Timestamps in the future read as "Just now".
pub fn format_relative_time(now: OffsetDateTime, then: OffsetDateTime) -> String {
    let elapsed = now - then;
    if elapsed.is_negative() {
        return "Just now".to_owned();
    }
    let hours = elapsed.whole_hours();
    if hours >= 24 {
        return format_absolute_time(then);
    }
    if hours > 0 {
        return format!("{hours}h ago");
    }
    match elapsed.whole_minutes() {
        0 | 1 => "Just now".to_owned(),
        minutes => format!("{minutes}m ago"),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CommunicationSubTab, ContextualInfoProvider, FolderTab, InfoValue, annotate, client_field,
        context_fields, format_relative_time,
    };
    use crate::{ClientId, ClientRecord, ClientType};
    use time::Duration;
    use time::macros::{date, datetime};

    fn client() -> ClientRecord {
        ClientRecord {
            id: ClientId::new(4),
            name: "Ann Lee".to_owned(),
            first_name: "Ann".to_owned(),
            last_name: "Lee".to_owned(),
            client_type: ClientType::Individual,
            email: "ann@example.com".to_owned(),
            phone: "555-0100".to_owned(),
            tags: vec!["Lead".to_owned()],
            assigned_to: "Lisa Chen".to_owned(),
            created_date: date!(2025 - 01 - 02),
        }
    }

    /// Answers every field, including ones outside any shape.
    struct Chatty;

    impl ContextualInfoProvider for Chatty {
        fn field_value(
            &self,
            client: &ClientRecord,
            _tab: FolderTab,
            _sub_tab: Option<CommunicationSubTab>,
            field: &str,
        ) -> Option<InfoValue> {
            client_field(client, field).or(Some(InfoValue::Count(field.len() as u32)))
        }
    }

    struct Silent;

    impl ContextualInfoProvider for Silent {
        fn field_value(
            &self,
            _client: &ClientRecord,
            _tab: FolderTab,
            _sub_tab: Option<CommunicationSubTab>,
            _field: &str,
        ) -> Option<InfoValue> {
            None
        }
    }

    #[test]
    fn snapshot_shows_contact_fields_from_the_record() {
        let info = annotate(&Chatty, &client(), FolderTab::Snapshot, None);
        let fields: Vec<&str> = info.iter().map(|(name, _)| name).collect();
        assert_eq!(fields, vec!["email", "phone"]);
        assert_eq!(
            info.get("email"),
            Some(&InfoValue::Text("ann@example.com".to_owned()))
        );
    }

    #[test]
    fn communication_shape_depends_on_sub_tab() {
        let internal = annotate(
            &Chatty,
            &client(),
            FolderTab::Communication,
            Some(CommunicationSubTab::Internal),
        );
        assert!(internal.get("lastPoster").is_some());
        assert!(internal.get("lastMessage").is_none());

        let fallback = annotate(&Chatty, &client(), FolderTab::Communication, None);
        let fields: Vec<&str> = fallback.iter().map(|(name, _)| name).collect();
        assert_eq!(fields, vec!["lastContact", "unreadCount", "lastMessage"]);
    }

    #[test]
    fn sub_tab_is_ignored_outside_communication() {
        assert_eq!(
            annotate(
                &Chatty,
                &client(),
                FolderTab::Invoices,
                Some(CommunicationSubTab::Email)
            )
            .len(),
            context_fields(FolderTab::Invoices, None).len()
        );
    }

    #[test]
    fn unanswered_fields_are_omitted() {
        assert!(annotate(&Silent, &client(), FolderTab::Teams, None).is_empty());
    }

    #[test]
    fn every_tab_has_a_non_empty_shape() {
        for tab in FolderTab::ALL {
            assert!(!context_fields(tab, None).is_empty(), "{}", tab.label());
        }
        for sub_tab in CommunicationSubTab::ALL {
            assert_eq!(context_fields(FolderTab::Communication, Some(sub_tab)).len(), 3);
            assert_eq!(CommunicationSubTab::parse(sub_tab.as_str()), Some(sub_tab));
        }
    }

    #[test]
    fn tabs_cycle_in_both_directions() {
        assert_eq!(FolderTab::Teams.next(), FolderTab::Snapshot);
        assert_eq!(FolderTab::Snapshot.prev(), FolderTab::Teams);
        assert_eq!(FolderTab::Activity.prev().next(), FolderTab::Activity);
    }

    #[test]
    fn relative_time_buckets() {
        let now = datetime!(2025-06-10 15:30 UTC);
        assert_eq!(format_relative_time(now, now), "Just now");
        assert_eq!(format_relative_time(now, now - Duration::seconds(110)), "Just now");
        assert_eq!(format_relative_time(now, now - Duration::minutes(7)), "7m ago");
        assert_eq!(format_relative_time(now, now - Duration::minutes(59)), "59m ago");
        assert_eq!(format_relative_time(now, now - Duration::hours(5)), "5h ago");
        assert_eq!(format_relative_time(now, now - Duration::hours(23)), "23h ago");
        assert_eq!(format_relative_time(now, now + Duration::hours(2)), "Just now");
    }

    #[test]
    fn day_old_timestamps_render_absolute() {
        let now = datetime!(2025-06-10 15:30 UTC);
        assert_eq!(
            format_relative_time(now, datetime!(2025-06-03 09:05 UTC)),
            "Jun 3, 9:05 AM"
        );
        assert_eq!(
            InfoValue::Timestamp(datetime!(2025-06-10 13:45 UTC)).render(now),
            "Jun 10, 1:45 PM"
        );
        assert_eq!(InfoValue::Count(3).render(now), "3");
    }
}
