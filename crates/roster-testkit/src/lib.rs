// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use roster_app::{
    ClientGroups, ClientId, ClientRecord, ClientType, CommunicationSubTab, ContextualInfoProvider,
    FolderTab, InfoValue, TEAM_MEMBERS, client_field,
};
use time::{Date, Duration, Month, OffsetDateTime, Time};

const FIRST_NAMES: [&str; 16] = [
    "James", "Maria", "Robert", "Linda", "David", "Susan", "Carlos", "Aisha", "Kevin", "Priya",
    "Thomas", "Elena", "Marcus", "Grace", "Daniel", "Nora",
];

const LAST_NAMES: [&str; 18] = [
    "Anderson", "Baker", "Chen", "Delgado", "Evans", "Fischer", "Garcia", "Hughes", "Ito",
    "Johnson", "Kowalski", "Lopez", "Mitchell", "Nguyen", "Okafor", "Patel", "Reyes", "Sullivan",
];

const BUSINESS_STEMS: [&str; 12] = [
    "Harbor", "Summit", "Bluebird", "Ironwood", "Maple", "Crescent", "Granite", "Pioneer",
    "Riverside", "Evergreen", "Beacon", "Keystone",
];

const BUSINESS_KINDS: [&str; 8] = [
    "Bakery",
    "Dental",
    "Logistics",
    "Landscaping",
    "Consulting",
    "Auto Repair",
    "Design Studio",
    "Properties",
];

const BUSINESS_SUFFIXES: [&str; 4] = ["LLC", "Inc", "Co", "Group"];

const INTERNAL_POSTERS: [&str; 4] = ["Sarah J.", "Mike B.", "Emily D.", "Alex K."];

const EXTERNAL_MESSAGES: [&str; 5] = [
    "Can we reschedule?",
    "Thanks for the help!",
    "Got the documents",
    "Quick question...",
    "All set, thank you",
];

const EMAIL_SUBJECTS: [&str; 5] = [
    "Q4 Tax Documents",
    "Meeting Follow-up",
    "Invoice #2847",
    "Year-End Planning",
    "Quick Update",
];

const TEXT_MESSAGES: [&str; 5] = [
    "Got it, thanks!",
    "On my way",
    "Can you call me?",
    "Perfect",
    "See you then",
];

const FOLLOW_UP_MESSAGES: [&str; 5] = [
    "Following up on documents",
    "Thanks for the update",
    "Meeting confirmed for next week",
    "Please review the attached files",
    "All set, see you soon!",
];

const REFERENCE_YEAR: i32 = 2026;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn int_range(&mut self, min: u32, max: u32) -> u32 {
        if max <= min {
            return min;
        }
        min + (self.next_u64() % u64::from(max - min + 1)) as u32
    }

    fn chance(&mut self, one_in: usize) -> bool {
        self.int_n(one_in) == 0
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.int_n(items.len())]
    }
}

#[derive(Debug, Clone)]
pub struct ClientFaker {
    rng: DeterministicRng,
    seed: u64,
    group_names: Vec<String>,
}

impl ClientFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
            group_names: ClientGroups::default()
                .names()
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Roughly one client in five comes out with missing info.
    pub fn client(&mut self, id: i64) -> ClientRecord {
        let first_name = self.rng.pick(&FIRST_NAMES).to_owned();
        let last_name = self.rng.pick(&LAST_NAMES).to_owned();
        let client_type = if self.rng.chance(3) {
            ClientType::Business
        } else {
            ClientType::Individual
        };
        let name = match client_type {
            ClientType::Business => format!(
                "{} {} {}",
                self.rng.pick(&BUSINESS_STEMS),
                self.rng.pick(&BUSINESS_KINDS),
                self.rng.pick(&BUSINESS_SUFFIXES)
            ),
            ClientType::Individual => format!("{first_name} {last_name}"),
        };

        let mut email = format!(
            "{}.{}@example.com",
            first_name.to_lowercase(),
            last_name.to_lowercase()
        );
        let mut phone = format!(
            "+1 ({}) {}-{:04}",
            self.rng.int_range(201, 989),
            self.rng.int_range(200, 999),
            self.rng.int_range(0, 9999)
        );
        let mut tags = self.tags();
        if self.rng.chance(5) {
            match self.rng.int_n(3) {
                0 => email.clear(),
                1 => phone.clear(),
                _ => tags.clear(),
            }
        }

        let assigned_to = if self.rng.chance(6) {
            String::new()
        } else {
            self.rng.pick(&TEAM_MEMBERS).to_owned()
        };

        ClientRecord {
            id: ClientId::new(id),
            name,
            first_name,
            last_name,
            client_type,
            email,
            phone,
            tags,
            assigned_to,
            created_date: self.created_date(),
        }
    }

    /// Ids run from 1 to `count`.
    pub fn roster(&mut self, count: usize) -> Vec<ClientRecord> {
        (1..=count as i64).map(|id| self.client(id)).collect()
    }

    fn tags(&mut self) -> Vec<String> {
        let wanted = 1 + self.rng.int_n(3);
        let mut tags: Vec<String> = Vec::with_capacity(wanted);
        for _ in 0..wanted {
            let name = &self.group_names[self.rng.int_n(self.group_names.len())];
            if !tags.contains(name) {
                tags.push(name.clone());
            }
        }
        tags
    }

    fn created_date(&mut self) -> Date {
        let back = i64::from(self.rng.int_range(0, 3 * 365));
        reference_now().date() - Duration::days(back)
    }
}

/// Summary values derived from a hash of the client, tab and field, so the
/// same inputs always render the same numbers.
#[derive(Debug, Clone)]
pub struct SeededContextProvider {
    seed: u64,
    now: OffsetDateTime,
}

impl SeededContextProvider {
    pub fn new(seed: u64, now: OffsetDateTime) -> Self {
        Self { seed, now }
    }

    pub fn now(&self) -> OffsetDateTime {
        self.now
    }

    fn rng_for(
        &self,
        client: &ClientRecord,
        tab: FolderTab,
        sub_tab: Option<CommunicationSubTab>,
        field: &str,
    ) -> DeterministicRng {
        let mut hash = fnv1a(self.seed, &client.id.get().to_le_bytes());
        hash = fnv1a(hash, tab.label().as_bytes());
        hash = fnv1a(hash, sub_tab.map_or("", CommunicationSubTab::as_str).as_bytes());
        hash = fnv1a(hash, field.as_bytes());
        DeterministicRng::new(hash)
    }

    fn ago(&self, rng: &mut DeterministicRng, max_days: u32) -> OffsetDateTime {
        let seconds = rng.next_u64() % (u64::from(max_days) * 24 * 60 * 60);
        self.now - Duration::seconds(seconds as i64)
    }
}

impl ContextualInfoProvider for SeededContextProvider {
    fn field_value(
        &self,
        client: &ClientRecord,
        tab: FolderTab,
        sub_tab: Option<CommunicationSubTab>,
        field: &str,
    ) -> Option<InfoValue> {
        if let Some(value) = client_field(client, field) {
            return Some(value);
        }
        let mut rng = self.rng_for(client, tab, sub_tab, field);
        let count = |rng: &mut DeterministicRng, min: u32, max: u32| {
            Some(InfoValue::Count(rng.int_range(min, max)))
        };
        let text = |rng: &mut DeterministicRng, items: &[&str]| {
            Some(InfoValue::Text(rng.pick(items).to_owned()))
        };
        match (tab, field) {
            (FolderTab::Teams, "teamMembers") => count(&mut rng, 1, 5),
            (FolderTab::Communication, "unreadCount") => match sub_tab {
                Some(CommunicationSubTab::Internal) => count(&mut rng, 0, 4),
                Some(CommunicationSubTab::External) => count(&mut rng, 1, 3),
                Some(CommunicationSubTab::Email) => count(&mut rng, 0, 3),
                Some(CommunicationSubTab::Texting) => count(&mut rng, 0, 2),
                Some(CommunicationSubTab::CallbackHistory) | None => count(&mut rng, 0, 7),
            },
            (FolderTab::Communication, "lastPoster") => text(&mut rng, &INTERNAL_POSTERS),
            (FolderTab::Communication, "lastMessage") => match sub_tab {
                Some(CommunicationSubTab::External) => text(&mut rng, &EXTERNAL_MESSAGES),
                _ => text(&mut rng, &FOLLOW_UP_MESSAGES),
            },
            (FolderTab::Communication, "lastSubject") => text(&mut rng, &EMAIL_SUBJECTS),
            (FolderTab::Communication, "lastText") => text(&mut rng, &TEXT_MESSAGES),
            (FolderTab::Communication, "lastTime") => {
                Some(InfoValue::Recent(self.ago(&mut rng, 10)))
            }
            (FolderTab::Communication, "lastContact") => {
                Some(InfoValue::Timestamp(self.ago(&mut rng, 10)))
            }
            (FolderTab::Communication, "openCount") => count(&mut rng, 0, 2),
            (FolderTab::Communication, "notReachedCount") => count(&mut rng, 1, 4),
            (FolderTab::Communication, "completedCount") => count(&mut rng, 5, 14),
            (FolderTab::Invoices, "paidCount") => count(&mut rng, 5, 14),
            (FolderTab::Invoices, "pendingCount") => count(&mut rng, 0, 4),
            (FolderTab::Invoices, "overdueCount") => count(&mut rng, 0, 2),
            (FolderTab::Signatures, "pending") => count(&mut rng, 0, 3),
            (FolderTab::Signatures, "completed") => count(&mut rng, 1, 10),
            (FolderTab::Documents, "receivedCount") => count(&mut rng, 10, 39),
            (FolderTab::Documents, "pendingCount") => count(&mut rng, 0, 7),
            (FolderTab::Documents, "needReviewCount") => count(&mut rng, 0, 4),
            (FolderTab::Activity, "lastActivity") => {
                Some(InfoValue::Timestamp(self.ago(&mut rng, 14)))
            }
            (FolderTab::Notes, "count") => count(&mut rng, 1, 20),
            (FolderTab::Notes, "lastNote") => Some(InfoValue::Timestamp(self.ago(&mut rng, 5))),
            (FolderTab::Organizer, "pending") => count(&mut rng, 0, 7),
            (FolderTab::Organizer, "completed") => count(&mut rng, 5, 19),
            _ => None,
        }
    }
}

fn fnv1a(mut hash: u64, bytes: &[u8]) -> u64 {
    const PRIME: u64 = 0x0000_0100_0000_01B3;
    hash ^= 0xCBF2_9CE4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(PRIME);
    }
    hash
}

pub fn reference_now() -> OffsetDateTime {
    midnight_utc(REFERENCE_YEAR, Month::January, 15)
}

fn midnight_utc(year: i32, month: Month, day: u8) -> OffsetDateTime {
    let date = Date::from_calendar_date(year, month, day).expect("valid calendar date");
    date.with_time(Time::MIDNIGHT).assume_utc()
}

/// Small hand-written roster for tests that need exact names.
pub fn sample_roster() -> Vec<ClientRecord> {
    let make = |id: i64, first: &str, last: &str, client_type: ClientType, tags: &[&str]| {
        let name = match client_type {
            ClientType::Business => format!("{last} {first}"),
            ClientType::Individual => format!("{first} {last}"),
        };
        ClientRecord {
            id: ClientId::new(id),
            name,
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            client_type,
            email: format!("{}@example.com", first.to_lowercase()),
            phone: format!("+1 (555) 010-{id:04}"),
            tags: tags.iter().map(|tag| (*tag).to_owned()).collect(),
            assigned_to: TEAM_MEMBERS[(id as usize) % TEAM_MEMBERS.len()].to_owned(),
            created_date: reference_now().date() - Duration::days(id * 30),
        }
    };
    vec![
        make(1, "Ann", "Lee", ClientType::Individual, &["1040", "Sch C"]),
        make(2, "Holdings", "Acme", ClientType::Business, &["1120S", "Payroll"]),
        make(3, "Bob", "Lee", ClientType::Individual, &[]),
        make(4, "Cara", "Diaz", ClientType::Individual, &["Lead"]),
    ]
}
