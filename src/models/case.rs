use serde::{Deserialize, Serialize};

use super::enums::{CaseCategory, Difficulty};
use super::location::LocationInfo;

/// Heading that marks a pediatric case history; its presence switches the
/// simulated patient into child + caregiver mode.
pub const CAREGIVER_SECTION: &str = "## CAREGIVER INFORMATION";

/// A clinical department the student can train in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl Department {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    pub fn is_pediatric(&self) -> bool {
        is_pediatric_department(&self.name)
    }
}

pub fn is_pediatric_department(name: &str) -> bool {
    name == "Pediatrics"
}

/// Departments offered out of the box.
pub fn builtin_departments() -> Vec<Department> {
    vec![
        Department::new("Obstetrics", "Pregnancy, childbirth, and reproductive health"),
        Department::new("Pediatrics", "Children's health and development"),
        Department::new("Gynecology", "Women's reproductive health"),
    ]
}

/// Look up a built-in department by case-insensitive name.
pub fn find_department(name: &str) -> Option<Department> {
    builtin_departments()
        .into_iter()
        .find(|d| d.name.eq_ignore_ascii_case(name.trim()))
}

/// One synthetic clinical scenario. Immutable once generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub diagnosis: String,
    /// Markdown-structured history; the single source of truth for the
    /// simulated patient.
    pub primary_info: String,
    pub opening_line: String,
    pub visual_appearance: String,
}

impl Case {
    pub fn has_caregiver(&self) -> bool {
        self.primary_info.contains(CAREGIVER_SECTION)
    }
}

/// Knobs that bias case generation. All optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseGenerationOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<CaseCategory>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub avoid_similar_to: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationInfo>,
}
