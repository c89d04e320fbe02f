use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = DatabaseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(DatabaseError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(DoseLogStatus {
    Taken => "taken",
    Missed => "missed",
    Snooze => "snooze",
});

str_enum!(CareRole {
    Admin => "admin",
    Caregiver => "caregiver",
    Family => "family",
});

str_enum!(PatientStatus {
    Active => "active",
    Inactive => "inactive",
});

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn dose_log_status_round_trip() {
        for status in [DoseLogStatus::Taken, DoseLogStatus::Missed, DoseLogStatus::Snooze] {
            assert_eq!(DoseLogStatus::from_str(status.as_str()).unwrap(), status);
        }
    }

    #[test]
    fn unrecognized_dose_log_status_rejected() {
        let err = DoseLogStatus::from_str("skipped").unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidEnum { .. }));
    }

    #[test]
    fn care_role_parses_all_three() {
        assert_eq!(CareRole::from_str("admin").unwrap(), CareRole::Admin);
        assert_eq!(CareRole::from_str("caregiver").unwrap(), CareRole::Caregiver);
        assert_eq!(CareRole::from_str("family").unwrap(), CareRole::Family);
        assert!(CareRole::from_str("superuser").is_err());
    }

    #[test]
    fn serde_uses_snake_case_strings() {
        let json = serde_json::to_string(&DoseLogStatus::Taken).unwrap();
        assert_eq!(json, "\"taken\"");
    }
}
