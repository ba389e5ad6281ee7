use crate::db::DatabaseError;
use serde::{Deserialize, Serialize};

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
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

str_enum!(Gender {
    Male => "Male",
    Female => "Female",
    Other => "Other",
});

str_enum!(UlcerFinding {
    Normal => "Normal",
    UlcerDetected => "Ulcer Detected",
});

/// Binary diabetes risk class. Stored as the integer class label the
/// tabular classifier emits (0 = low, 1 = high).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiabetesRisk {
    Low,
    High,
}

impl DiabetesRisk {
    pub fn class_label(self) -> i64 {
        match self {
            DiabetesRisk::Low => 0,
            DiabetesRisk::High => 1,
        }
    }

    pub fn from_class_label(label: i64) -> Result<Self, DatabaseError> {
        match label {
            0 => Ok(DiabetesRisk::Low),
            1 => Ok(DiabetesRisk::High),
            other => Err(DatabaseError::InvalidEnum {
                field: "DiabetesRisk".into(),
                value: other.to_string(),
            }),
        }
    }

    /// Label used in reports and the records view.
    pub fn label(self) -> &'static str {
        match self {
            DiabetesRisk::Low => "Low",
            DiabetesRisk::High => "High",
        }
    }
}
