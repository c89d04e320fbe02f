//! Dose logging: records a caregiver's action against a medication and,
//! for a taken dose, advances the medication's schedule.
//!
//! The store behind the recorder is a trait so the engine can run against
//! the SQLite repository, a test double, or whatever backend the host
//! application wires in. Recording is two sequential writes with no
//! rollback — the outcome type keeps the partial-failure case visible
//! instead of folding it into a generic error.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::db::repository::{find_active_medication, insert_log_entry, update_next_dose};
use crate::db::DatabaseError;
use crate::dosing::next_dose_after;
use crate::models::enums::DoseLogStatus;
use crate::models::{Medication, MedicationLogEntry};

/// Persistence operations the recorder needs. Mirrors the calls the
/// dashboard makes against its backing store, nothing more.
pub trait DoseStore {
    /// Medication by id, only if still on the active schedule.
    fn find_active_medication(&self, med_id: &Uuid) -> Result<Option<Medication>, DatabaseError>;

    /// Append one immutable log entry.
    fn insert_log_entry(&self, entry: &MedicationLogEntry) -> Result<(), DatabaseError>;

    /// Persist a recomputed next-dose instant.
    fn update_next_dose(
        &self,
        med_id: &Uuid,
        next_dose: DateTime<Utc>,
    ) -> Result<(), DatabaseError>;
}

impl DoseStore for Connection {
    fn find_active_medication(&self, med_id: &Uuid) -> Result<Option<Medication>, DatabaseError> {
        find_active_medication(self, med_id)
    }

    fn insert_log_entry(&self, entry: &MedicationLogEntry) -> Result<(), DatabaseError> {
        insert_log_entry(self, entry)
    }

    fn update_next_dose(
        &self,
        med_id: &Uuid,
        next_dose: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        update_next_dose(self, med_id, next_dose)
    }
}

/// What `record_dose` did, when at least the log write landed.
#[derive(Debug)]
pub enum RecordDoseOutcome {
    /// Log entry written; for a taken dose the schedule moved to
    /// `new_next_dose` (None for missed/snooze, which never reschedule).
    FullSuccess {
        entry: MedicationLogEntry,
        new_next_dose: Option<DateTime<Utc>>,
    },
    /// The log entry landed but the next-dose update failed, leaving a
    /// recorded dose against a stale schedule. Callers should treat the
    /// operation as failed and offer a retry of just the reschedule.
    LoggedButRescheduleFailed {
        entry: MedicationLogEntry,
        error: DatabaseError,
    },
}

impl RecordDoseOutcome {
    /// True only when every write the action required has landed.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::FullSuccess { .. })
    }

    pub fn entry(&self) -> &MedicationLogEntry {
        match self {
            Self::FullSuccess { entry, .. } => entry,
            Self::LoggedButRescheduleFailed { entry, .. } => entry,
        }
    }
}

/// Recording failed before any durable state changed — or at the first
/// write, before the medication record could be touched.
#[derive(Debug, Error)]
pub enum RecordDoseError {
    /// No active medication with this id; nothing was written.
    #[error("No active medication with id {id}")]
    UnknownMedication { id: Uuid },

    /// The existence check itself failed; nothing was written.
    #[error("Medication lookup failed: {0}")]
    Lookup(#[source] DatabaseError),

    /// The log insert failed; the medication record was not touched.
    #[error("Failed to record dose log: {0}")]
    LogFailed(#[source] DatabaseError),
}

/// Record a caregiver action against a medication.
///
/// Appends a log entry stamped with `now` and the acting caregiver. Only a
/// `Taken` status recomputes the schedule: `next_dose_time` becomes
/// `now + interval(frequency)`. `Missed` and `Snooze` leave the schedule
/// untouched — an overdue medication stays overdue until a taken dose is
/// logged, which keeps the alert in front of the care team until someone
/// actually administers it.
///
/// The caller is expected to re-fetch its medication list after a
/// successful call; the recorder owns no cache and pushes nothing.
pub fn record_dose<S: DoseStore>(
    store: &S,
    medication_id: Uuid,
    status: DoseLogStatus,
    logged_by: Uuid,
    now: DateTime<Utc>,
) -> Result<RecordDoseOutcome, RecordDoseError> {
    let medication = store
        .find_active_medication(&medication_id)
        .map_err(RecordDoseError::Lookup)?
        .ok_or(RecordDoseError::UnknownMedication { id: medication_id })?;

    let entry = MedicationLogEntry::new(medication_id, status, logged_by, now);
    store
        .insert_log_entry(&entry)
        .map_err(RecordDoseError::LogFailed)?;

    if status != DoseLogStatus::Taken {
        tracing::info!(
            medication_id = %medication_id,
            status = status.as_str(),
            "Dose action logged, schedule unchanged"
        );
        return Ok(RecordDoseOutcome::FullSuccess {
            entry,
            new_next_dose: None,
        });
    }

    let new_next_dose = next_dose_after(now, &medication.frequency);
    match store.update_next_dose(&medication_id, new_next_dose) {
        Ok(()) => {
            tracing::info!(
                medication_id = %medication_id,
                next_dose = %new_next_dose,
                "Dose taken, schedule advanced"
            );
            Ok(RecordDoseOutcome::FullSuccess {
                entry,
                new_next_dose: Some(new_next_dose),
            })
        }
        Err(error) => {
            tracing::warn!(
                medication_id = %medication_id,
                error = %error,
                "Dose logged but reschedule failed; next_dose_time is stale"
            );
            Ok(RecordDoseOutcome::LoggedButRescheduleFailed { entry, error })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{
        fetch_logs_for_medication, find_medication, insert_caregiver, insert_medication,
        insert_patient,
    };
    use crate::db::sqlite::open_memory_database;
    use crate::dosing::{classify, DoseStatus};
    use crate::models::enums::{CareRole, PatientStatus};
    use crate::models::{CaregiverAccount, Patient};
    use chrono::{Duration, TimeZone};
    use std::cell::RefCell;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap()
    }

    fn seed(conn: &Connection, frequency: &str, next_dose: DateTime<Utc>) -> (Uuid, Uuid) {
        let patient = Patient {
            id: Uuid::new_v4(),
            full_name: "Margaret Okafor".into(),
            status: PatientStatus::Active,
            date_of_birth: None,
        };
        insert_patient(conn, &patient).unwrap();

        let caregiver = CaregiverAccount {
            id: Uuid::new_v4(),
            email: "sarah@example.com".into(),
            full_name: "Sarah Lindqvist".into(),
            role: CareRole::Caregiver,
            phone: None,
            is_active: true,
        };
        insert_caregiver(conn, &caregiver).unwrap();

        let med = Medication {
            id: Uuid::new_v4(),
            patient_id: patient.id,
            name: "Metformin".into(),
            dosage: "500mg".into(),
            frequency: frequency.into(),
            instructions: None,
            prescriber: None,
            start_date: None,
            next_dose_time: next_dose,
            is_active: true,
        };
        insert_medication(conn, &med).unwrap();

        (med.id, caregiver.id)
    }

    #[test]
    fn taken_advances_schedule_by_frequency_interval() {
        let conn = open_memory_database().unwrap();
        // overdue by an hour
        let (med_id, user_id) = seed(&conn, "twice daily", now() - Duration::hours(1));

        let outcome =
            record_dose(&conn, med_id, DoseLogStatus::Taken, user_id, now()).unwrap();

        match outcome {
            RecordDoseOutcome::FullSuccess { new_next_dose, .. } => {
                assert_eq!(new_next_dose, Some(now() + Duration::hours(12)));
            }
            other => panic!("expected FullSuccess, got {other:?}"),
        }

        let med = find_medication(&conn, &med_id).unwrap().unwrap();
        assert_eq!(med.next_dose_time, now() + Duration::hours(12));
        // the overdue alert clears the moment the dose is taken
        assert_eq!(classify(med.next_dose_time, now()), DoseStatus::Normal);
    }

    #[test]
    fn missed_keeps_next_dose_time_unchanged() {
        let conn = open_memory_database().unwrap();
        let stale = Utc.timestamp_opt(1_770_000_000, 123_456_789).unwrap();
        let (med_id, user_id) = seed(&conn, "twice daily", stale);

        let outcome =
            record_dose(&conn, med_id, DoseLogStatus::Missed, user_id, now()).unwrap();
        assert!(outcome.is_complete());

        let med = find_medication(&conn, &med_id).unwrap().unwrap();
        assert_eq!(med.next_dose_time, stale); // bit-for-bit: nanoseconds included

        let history = fetch_logs_for_medication(&conn, &med_id).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, DoseLogStatus::Missed);
        assert_eq!(history[0].logged_by, user_id);
    }

    #[test]
    fn snooze_only_appends_a_log_entry() {
        let conn = open_memory_database().unwrap();
        let (med_id, user_id) = seed(&conn, "once daily", now() + Duration::hours(2));

        let outcome =
            record_dose(&conn, med_id, DoseLogStatus::Snooze, user_id, now()).unwrap();
        match outcome {
            RecordDoseOutcome::FullSuccess { new_next_dose, .. } => {
                assert_eq!(new_next_dose, None)
            }
            other => panic!("expected FullSuccess, got {other:?}"),
        }

        let med = find_medication(&conn, &med_id).unwrap().unwrap();
        assert_eq!(med.next_dose_time, now() + Duration::hours(2));
    }

    #[test]
    fn unknown_medication_writes_nothing() {
        let conn = open_memory_database().unwrap();
        let (_, user_id) = seed(&conn, "once daily", now());
        let ghost = Uuid::new_v4();

        let err = record_dose(&conn, ghost, DoseLogStatus::Taken, user_id, now()).unwrap_err();
        assert!(matches!(err, RecordDoseError::UnknownMedication { id } if id == ghost));

        let logged: i64 = conn
            .query_row("SELECT COUNT(*) FROM medication_logs", [], |row| row.get(0))
            .unwrap();
        assert_eq!(logged, 0);
    }

    #[test]
    fn deactivated_medication_is_rejected() {
        let conn = open_memory_database().unwrap();
        let (med_id, user_id) = seed(&conn, "once daily", now());
        crate::db::repository::set_medication_active(&conn, &med_id, false).unwrap();

        let err = record_dose(&conn, med_id, DoseLogStatus::Taken, user_id, now()).unwrap_err();
        assert!(matches!(err, RecordDoseError::UnknownMedication { .. }));
    }

    // Store double with injectable failures for the paths SQLite won't
    // produce on demand.
    struct FlakyStore {
        medication: Medication,
        fail_insert: bool,
        fail_update: bool,
        log: RefCell<Vec<MedicationLogEntry>>,
        rescheduled: RefCell<Option<DateTime<Utc>>>,
    }

    impl FlakyStore {
        fn new(medication: Medication) -> Self {
            Self {
                medication,
                fail_insert: false,
                fail_update: false,
                log: RefCell::new(Vec::new()),
                rescheduled: RefCell::new(None),
            }
        }
    }

    impl DoseStore for FlakyStore {
        fn find_active_medication(
            &self,
            med_id: &Uuid,
        ) -> Result<Option<Medication>, DatabaseError> {
            Ok(Some(self.medication.clone()).filter(|m| &m.id == med_id && m.is_active))
        }

        fn insert_log_entry(&self, entry: &MedicationLogEntry) -> Result<(), DatabaseError> {
            if self.fail_insert {
                return Err(DatabaseError::ConstraintViolation("store offline".into()));
            }
            self.log.borrow_mut().push(entry.clone());
            Ok(())
        }

        fn update_next_dose(
            &self,
            _med_id: &Uuid,
            next_dose: DateTime<Utc>,
        ) -> Result<(), DatabaseError> {
            if self.fail_update {
                return Err(DatabaseError::ConstraintViolation("store offline".into()));
            }
            *self.rescheduled.borrow_mut() = Some(next_dose);
            Ok(())
        }
    }

    fn overdue_medication() -> Medication {
        Medication {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            name: "Lisinopril".into(),
            dosage: "10mg".into(),
            frequency: "once daily".into(),
            instructions: None,
            prescriber: None,
            start_date: None,
            next_dose_time: now() - Duration::hours(2),
            is_active: true,
        }
    }

    #[test]
    fn failed_log_insert_aborts_before_reschedule() {
        let med = overdue_medication();
        let med_id = med.id;
        let mut store = FlakyStore::new(med);
        store.fail_insert = true;

        let err =
            record_dose(&store, med_id, DoseLogStatus::Taken, Uuid::new_v4(), now()).unwrap_err();
        assert!(matches!(err, RecordDoseError::LogFailed(_)));
        assert!(store.rescheduled.borrow().is_none());
        assert!(store.log.borrow().is_empty());
    }

    #[test]
    fn failed_reschedule_reports_partial_outcome() {
        let med = overdue_medication();
        let med_id = med.id;
        let mut store = FlakyStore::new(med);
        store.fail_update = true;

        let outcome =
            record_dose(&store, med_id, DoseLogStatus::Taken, Uuid::new_v4(), now()).unwrap();

        assert!(!outcome.is_complete());
        match outcome {
            RecordDoseOutcome::LoggedButRescheduleFailed { entry, .. } => {
                assert_eq!(entry.status, DoseLogStatus::Taken);
            }
            other => panic!("expected partial outcome, got {other:?}"),
        }
        // the log write survived even though the operation failed overall
        assert_eq!(store.log.borrow().len(), 1);
    }

    #[test]
    fn missed_never_calls_update_even_when_update_would_fail() {
        let med = overdue_medication();
        let med_id = med.id;
        let mut store = FlakyStore::new(med);
        store.fail_update = true;

        let outcome =
            record_dose(&store, med_id, DoseLogStatus::Missed, Uuid::new_v4(), now()).unwrap();
        assert!(outcome.is_complete());
    }
}
