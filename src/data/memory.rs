use async_trait::async_trait;
use chrono::Utc;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::data::{
    DataError, EventStore, ModeratorQuery, ModeratorRecord, NewModerator, NewParticipant,
    ParticipantQuery, ParticipantRecord, SAFETY_CAP,
};

#[derive(Default)]
struct Tables {
    moderators: Vec<ModeratorRecord>,
    participants: Vec<ParticipantRecord>,
    next_moderator_id: i64,
    next_participant_id: i64,
}

/// Process-local store. Natural order is insertion order.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with five moderators and ten participants.
    pub fn with_sample_data() -> Self {
        let store = Self::new();
        for (name, city, description, email, phone, expertise) in SAMPLE_MODERATORS {
            let added = store.add_moderator(NewModerator {
                name: name.to_string(),
                city: Some(city.to_string()),
                description: Some(description.to_string()),
                email: Some(email.to_string()),
                phone: Some(phone.to_string()),
                expertise: Some(expertise.to_string()),
            });
            if let Err(e) = added {
                log::warn!("Skipping sample moderator '{}': {}", name, e);
            }
        }
        for (name, email, company, role, phone) in SAMPLE_PARTICIPANTS {
            let added = store.add_participant(NewParticipant {
                name: name.to_string(),
                email: email.to_string(),
                company: Some(company.to_string()),
                role: Some(role.to_string()),
                phone: Some(phone.to_string()),
            });
            if let Err(e) = added {
                log::warn!("Skipping sample participant '{}': {}", name, e);
            }
        }
        store
    }

    fn read(&self) -> RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_moderator(&self, new: NewModerator) -> Result<ModeratorRecord, DataError> {
        if new.name.trim().is_empty() {
            return Err(DataError::InvalidRecord(
                "moderator name is required".to_string(),
            ));
        }
        let mut tables = self.write();
        tables.next_moderator_id += 1;
        let record = ModeratorRecord {
            id: tables.next_moderator_id,
            name: new.name,
            city: new.city,
            description: new.description,
            email: new.email,
            phone: new.phone,
            expertise: new.expertise,
            created_at: Utc::now(),
        };
        tables.moderators.push(record.clone());
        Ok(record)
    }

    pub fn add_participant(&self, new: NewParticipant) -> Result<ParticipantRecord, DataError> {
        if new.name.trim().is_empty() || new.email.trim().is_empty() {
            return Err(DataError::InvalidRecord(
                "participant name and email are required".to_string(),
            ));
        }
        let mut tables = self.write();
        if tables.participants.iter().any(|p| p.email == new.email) {
            return Err(DataError::DuplicateEmail(new.email));
        }
        tables.next_participant_id += 1;
        let record = ParticipantRecord {
            id: tables.next_participant_id,
            name: new.name,
            email: new.email,
            company: new.company,
            role: new.role,
            phone: new.phone,
            created_at: Utc::now(),
        };
        tables.participants.push(record.clone());
        Ok(record)
    }

    pub fn moderator_count(&self) -> usize {
        self.read().moderators.len()
    }

    pub fn participant_count(&self) -> usize {
        self.read().participants.len()
    }
}

#[async_trait]
impl EventStore for InMemoryStore {
    async fn fetch_moderators(
        &self,
        query: &ModeratorQuery,
    ) -> Result<Vec<ModeratorRecord>, DataError> {
        let tables = self.read();
        let rows = tables.moderators.iter();
        let records = match query {
            ModeratorQuery::All => rows.take(SAFETY_CAP).cloned().collect(),
            ModeratorQuery::Names(names) => rows
                .filter(|m| names.contains(&m.name))
                .take(SAFETY_CAP)
                .cloned()
                .collect(),
            ModeratorQuery::Expertise(expertise) => {
                let needle = expertise.to_lowercase();
                rows.filter(|m| {
                    m.expertise
                        .as_deref()
                        .is_some_and(|e| e.to_lowercase().contains(&needle))
                })
                .take(SAFETY_CAP)
                .cloned()
                .collect()
            }
        };
        Ok(records)
    }

    async fn fetch_participants(
        &self,
        query: &ParticipantQuery,
    ) -> Result<Vec<ParticipantRecord>, DataError> {
        let tables = self.read();
        let rows = tables.participants.iter();
        let records = match query {
            ParticipantQuery::All => rows.take(SAFETY_CAP).cloned().collect(),
            ParticipantQuery::Names(names) => rows
                .filter(|p| names.contains(&p.name))
                .take(SAFETY_CAP)
                .cloned()
                .collect(),
            ParticipantQuery::Limit(limit) => rows.take((*limit).min(SAFETY_CAP)).cloned().collect(),
        };
        Ok(records)
    }
}

const SAMPLE_MODERATORS: [(&str, &str, &str, &str, &str, &str); 5] = [
    (
        "Jai Kumar",
        "Hyderabad",
        "Experienced technical event moderator with 10+ years",
        "jai.kumar@example.com",
        "+91-9876543210",
        "Technical, AI/ML, Cloud Computing",
    ),
    (
        "Priya Sharma",
        "Bangalore",
        "Expert in corporate events and team building activities",
        "priya.sharma@example.com",
        "+91-9876543211",
        "Corporate, Team Building, Leadership",
    ),
    (
        "Rahul Verma",
        "Mumbai",
        "Specialist in tech conferences and workshops",
        "rahul.verma@example.com",
        "+91-9876543212",
        "Conferences, Workshops, Technology",
    ),
    (
        "Anita Desai",
        "Delhi",
        "Professional moderator for academic and research events",
        "anita.desai@example.com",
        "+91-9876543213",
        "Academic, Research, Science",
    ),
    (
        "Vikram Singh",
        "Chennai",
        "Creative events and cultural program coordinator",
        "vikram.singh@example.com",
        "+91-9876543214",
        "Cultural, Creative, Entertainment",
    ),
];

const SAMPLE_PARTICIPANTS: [(&str, &str, &str, &str, &str); 10] = [
    ("Alice Smith", "alice.smith@techcorp.com", "TechCorp", "Software Engineer", "+1-555-0101"),
    ("Bob Johnson", "bob.johnson@innovate.com", "Innovate Inc", "Product Manager", "+1-555-0102"),
    ("Carol White", "carol.white@datalytics.com", "DataLytics", "Data Scientist", "+1-555-0103"),
    ("David Brown", "david.brown@cloudnet.com", "CloudNet", "DevOps Engineer", "+1-555-0104"),
    ("Emma Davis", "emma.davis@aitech.com", "AI Tech", "ML Engineer", "+1-555-0105"),
    ("Frank Miller", "frank.miller@startup.io", "StartupIO", "CTO", "+1-555-0106"),
    ("Grace Lee", "grace.lee@enterprise.com", "Enterprise Co", "Architect", "+1-555-0107"),
    ("Henry Wilson", "henry.wilson@solutions.com", "Solutions Ltd", "Consultant", "+1-555-0108"),
    ("Iris Taylor", "iris.taylor@innovation.com", "Innovation Labs", "Researcher", "+1-555-0109"),
    ("Jack Anderson", "jack.anderson@digital.com", "Digital Corp", "Team Lead", "+1-555-0110"),
];
