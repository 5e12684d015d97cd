use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + std::str::FromStr pattern.
/// The string form is also the serde wire form.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.pad(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

str_enum!(Sender {
    Student => "student",
    Patient => "patient",
    System => "system",
});

str_enum!(Difficulty {
    Basic => "basic",
    Intermediate => "intermediate",
    Advanced => "advanced",
});

str_enum!(CaseCategory {
    Acute => "acute",
    Chronic => "chronic",
    Emergency => "emergency",
    Outpatient => "outpatient",
});

str_enum!(ResultStatus {
    Normal => "Normal",
    High => "High",
    Low => "Low",
    Critical => "Critical",
});

str_enum!(EconomicLevel {
    LowIncome => "low-income",
    MiddleIncome => "middle-income",
    HighIncome => "high-income",
});

str_enum!(ResourceLevel {
    Basic => "basic",
    Standard => "standard",
    Advanced => "advanced",
});

impl Sender {
    /// Student and patient turns make up the transcript; system notes do not.
    pub fn is_dialogue(&self) -> bool {
        matches!(self, Self::Student | Self::Patient)
    }
}

impl Difficulty {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Basic => {
                "straightforward presentation with clear symptoms, suitable for novice medical students"
            }
            Self::Intermediate => {
                "moderate complexity with some atypical features, suitable for intermediate students"
            }
            Self::Advanced => {
                "complex presentation with multiple differentials or complications, suitable for advanced students"
            }
        }
    }
}

impl CaseCategory {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Acute => "sudden onset requiring immediate attention",
            Self::Chronic => "long-standing condition with gradual progression",
            Self::Emergency => "life-threatening condition requiring urgent intervention",
            Self::Outpatient => "stable condition suitable for outpatient management",
        }
    }
}
