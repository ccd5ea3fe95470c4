use jiff::ToSpan;
use jiff::civil::{Date, Time};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Days ahead of today within which a refill counts as due soon.
pub const REFILL_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub instructions: String,
    pub next_dose: Time,
    pub refill_date: Date,
    pub remaining: u32,
    #[serde(default)]
    pub status: MedicationStatus,
    pub created_at: jiff::Timestamp,
    pub updated_at: jiff::Timestamp,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MedicationStatus {
    #[default]
    Upcoming,
    Taken,
    Missed,
}

/// Request body for creating a medication.
#[derive(Debug, Clone, Deserialize)]
pub struct NewMedication {
    pub name: String,
    #[serde(default)]
    pub instructions: String,
    pub next_dose: Time,
    pub refill_date: Date,
    pub remaining: u32,
    #[serde(default)]
    pub status: MedicationStatus,
}

impl NewMedication {
    pub fn into_medication(self) -> Medication {
        let now = jiff::Timestamp::now();
        Medication {
            id: Uuid::new_v4(),
            name: self.name,
            instructions: self.instructions,
            next_dose: self.next_dose,
            refill_date: self.refill_date,
            remaining: self.remaining,
            status: self.status,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MedicationUpdate {
    pub name: Option<String>,
    pub instructions: Option<String>,
    pub next_dose: Option<Time>,
    pub refill_date: Option<Date>,
    pub remaining: Option<u32>,
    pub status: Option<MedicationStatus>,
    /// Notes for the log entry written when the update marks a dose taken.
    pub notes: Option<String>,
}

impl Medication {
    /// Apply a partial update. Returns `true` when the update sets the status
    /// to [`MedicationStatus::Taken`], which callers record as a dose log.
    pub fn apply(&mut self, update: MedicationUpdate) -> bool {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(instructions) = update.instructions {
            self.instructions = instructions;
        }
        if let Some(next_dose) = update.next_dose {
            self.next_dose = next_dose;
        }
        if let Some(refill_date) = update.refill_date {
            self.refill_date = refill_date;
        }
        if let Some(remaining) = update.remaining {
            self.remaining = remaining;
        }
        let taken = update.status == Some(MedicationStatus::Taken);
        if let Some(status) = update.status {
            self.status = status;
        }
        self.updated_at = jiff::Timestamp::now();
        taken
    }

    pub fn mark_taken(&mut self, notes: impl Into<String>) -> MedicationLog {
        self.status = MedicationStatus::Taken;
        self.updated_at = jiff::Timestamp::now();
        MedicationLog::taken(self.id, notes)
    }

    pub fn refill_due_by(&self, today: Date) -> bool {
        self.refill_date <= today.saturating_add(REFILL_WINDOW_DAYS.days())
    }
}

/// A record of a dose being taken (or missed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MedicationLog {
    pub id: Uuid,
    pub medication_id: Uuid,
    pub taken_at: jiff::Timestamp,
    pub status: MedicationStatus,
    #[serde(default)]
    pub notes: String,
}

impl MedicationLog {
    pub fn taken(medication_id: Uuid, notes: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            medication_id,
            taken_at: jiff::Timestamp::now(),
            status: MedicationStatus::Taken,
            notes: notes.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicationStats {
    pub total: usize,
    pub upcoming: usize,
    pub taken: usize,
    pub missed: usize,
    pub refill_soon: usize,
}

impl MedicationStats {
    pub fn compute(medications: &[Medication], today: Date) -> Self {
        let mut stats = Self {
            total: medications.len(),
            ..Self::default()
        };
        for med in medications {
            match med.status {
                MedicationStatus::Upcoming => stats.upcoming += 1,
                MedicationStatus::Taken => stats.taken += 1,
                MedicationStatus::Missed => stats.missed += 1,
            }
            if med.refill_due_by(today) {
                stats.refill_soon += 1;
            }
        }
        stats
    }
}

/// Order medications by time of next dose, earliest first.
pub fn sort_by_next_dose(medications: &mut [Medication]) {
    medications.sort_by_key(|m| m.next_dose);
}

#[cfg(test)]
mod tests {
    use jiff::civil::{date, time};

    use super::*;

    fn medication(name: &str, hour: i8, refill: Date, status: MedicationStatus) -> Medication {
        NewMedication {
            name: name.to_string(),
            instructions: String::new(),
            next_dose: time(hour, 0, 0, 0),
            refill_date: refill,
            remaining: 10,
            status,
        }
        .into_medication()
    }

    #[test]
    fn stats_count_statuses_and_refills() {
        let today = date(2025, 4, 5);
        let meds = vec![
            medication("ibuprofen", 8, date(2025, 4, 12), MedicationStatus::Upcoming),
            medication("metformin", 9, date(2025, 4, 13), MedicationStatus::Taken),
            medication("lisinopril", 20, date(2025, 4, 1), MedicationStatus::Missed),
        ];

        let stats = MedicationStats::compute(&meds, today);
        assert_eq!(
            stats,
            MedicationStats {
                total: 3,
                upcoming: 1,
                taken: 1,
                missed: 1,
                refill_soon: 2,
            }
        );
    }

    #[test]
    fn update_reports_taken_transition() {
        let mut med = medication("ibuprofen", 8, date(2025, 5, 1), MedicationStatus::Upcoming);
        let taken = med.apply(MedicationUpdate {
            remaining: Some(9),
            status: Some(MedicationStatus::Taken),
            ..MedicationUpdate::default()
        });
        assert!(taken);
        assert_eq!(med.remaining, 9);
        assert_eq!(med.status, MedicationStatus::Taken);

        let taken = med.apply(MedicationUpdate {
            name: Some("advil".into()),
            ..MedicationUpdate::default()
        });
        assert!(!taken);
        assert_eq!(med.name, "advil");
    }

    #[test]
    fn mark_taken_produces_log() {
        let mut med = medication("ibuprofen", 8, date(2025, 5, 1), MedicationStatus::Upcoming);
        let log = med.mark_taken("with food");
        assert_eq!(log.medication_id, med.id);
        assert_eq!(log.status, MedicationStatus::Taken);
        assert_eq!(log.notes, "with food");
        assert_eq!(med.status, MedicationStatus::Taken);
    }

    #[test]
    fn sorted_by_next_dose() {
        let refill = date(2025, 5, 1);
        let mut meds = vec![
            medication("evening", 20, refill, MedicationStatus::Upcoming),
            medication("morning", 7, refill, MedicationStatus::Upcoming),
        ];
        sort_by_next_dose(&mut meds);
        assert_eq!(meds[0].name, "morning");
    }
}
