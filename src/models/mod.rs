pub mod caregiver;
pub mod enums;
pub mod medication;
pub mod patient;

pub use caregiver::CaregiverAccount;
pub use enums::{CareRole, DoseLogStatus, PatientStatus};
pub use medication::{Medication, MedicationLogEntry};
pub use patient::Patient;
