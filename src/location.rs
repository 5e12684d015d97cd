//! Country medical profiles used to localize generated cases.
//!
//! Reverse geocoding happens on the client; this module only maps a
//! country name to its disease/resource profile.

use crate::models::{EconomicLevel, LocationInfo, ResourceLevel};

pub const UNKNOWN_COUNTRY: &str = "Unknown";

struct CountryProfile {
    country: &'static str,
    region: &'static str,
    economic_level: EconomicLevel,
    common_diseases: &'static [&'static str],
    available_resources: ResourceLevel,
}

use EconomicLevel::{HighIncome, LowIncome, MiddleIncome};
use ResourceLevel::{Advanced, Basic, Standard};

const WESTERN_BURDEN: &[&str] = &["Heart disease", "Cancer", "Stroke", "Diabetes", "COPD"];

static COUNTRY_PROFILES: &[CountryProfile] = &[
    // Sub-Saharan Africa
    CountryProfile {
        country: "Nigeria",
        region: "West Africa",
        economic_level: LowIncome,
        common_diseases: &["Malaria", "Tuberculosis", "HIV/AIDS", "Typhoid fever", "Hepatitis B", "Sickle cell disease"],
        available_resources: Basic,
    },
    CountryProfile {
        country: "Kenya",
        region: "East Africa",
        economic_level: LowIncome,
        common_diseases: &["Malaria", "Tuberculosis", "HIV/AIDS", "Typhoid fever", "Dengue fever"],
        available_resources: Basic,
    },
    CountryProfile {
        country: "South Africa",
        region: "Southern Africa",
        economic_level: MiddleIncome,
        common_diseases: &["HIV/AIDS", "Tuberculosis", "Hypertension", "Diabetes", "Malaria"],
        available_resources: Standard,
    },
    // Asia
    CountryProfile {
        country: "India",
        region: "South Asia",
        economic_level: MiddleIncome,
        common_diseases: &["Malaria", "Dengue fever", "Tuberculosis", "Diabetes", "Typhoid fever", "Chikungunya"],
        available_resources: Standard,
    },
    CountryProfile {
        country: "Bangladesh",
        region: "South Asia",
        economic_level: LowIncome,
        common_diseases: &["Malaria", "Dengue fever", "Tuberculosis", "Typhoid fever", "Hepatitis B"],
        available_resources: Basic,
    },
    CountryProfile {
        country: "China",
        region: "East Asia",
        economic_level: MiddleIncome,
        common_diseases: &["Hypertension", "Diabetes", "Tuberculosis", "Hepatitis B", "Stroke"],
        available_resources: Standard,
    },
    CountryProfile {
        country: "Japan",
        region: "East Asia",
        economic_level: HighIncome,
        common_diseases: &["Hypertension", "Diabetes", "Stroke", "Cancer", "Heart disease"],
        available_resources: Advanced,
    },
    // Europe
    CountryProfile {
        country: "United Kingdom",
        region: "Western Europe",
        economic_level: HighIncome,
        common_diseases: WESTERN_BURDEN,
        available_resources: Advanced,
    },
    CountryProfile {
        country: "Germany",
        region: "Western Europe",
        economic_level: HighIncome,
        common_diseases: WESTERN_BURDEN,
        available_resources: Advanced,
    },
    CountryProfile {
        country: "France",
        region: "Western Europe",
        economic_level: HighIncome,
        common_diseases: WESTERN_BURDEN,
        available_resources: Advanced,
    },
    // Americas
    CountryProfile {
        country: "United States",
        region: "North America",
        economic_level: HighIncome,
        common_diseases: &["Heart disease", "Cancer", "Stroke", "Diabetes", "COPD", "Alzheimer's"],
        available_resources: Advanced,
    },
    CountryProfile {
        country: "Canada",
        region: "North America",
        economic_level: HighIncome,
        common_diseases: WESTERN_BURDEN,
        available_resources: Advanced,
    },
    CountryProfile {
        country: "Brazil",
        region: "South America",
        economic_level: MiddleIncome,
        common_diseases: &["Dengue fever", "Zika virus", "Tuberculosis", "Hypertension", "Diabetes"],
        available_resources: Standard,
    },
    CountryProfile {
        country: "Mexico",
        region: "North America",
        economic_level: MiddleIncome,
        common_diseases: &["Diabetes", "Hypertension", "Dengue fever", "Tuberculosis", "Heart disease"],
        available_resources: Standard,
    },
    // Middle East
    CountryProfile {
        country: "Saudi Arabia",
        region: "Middle East",
        economic_level: HighIncome,
        common_diseases: &["Diabetes", "Hypertension", "Heart disease", "MERS-CoV", "Stroke"],
        available_resources: Advanced,
    },
    CountryProfile {
        country: "Egypt",
        region: "North Africa",
        economic_level: MiddleIncome,
        common_diseases: &["Hepatitis C", "Diabetes", "Hypertension", "Tuberculosis", "Heart disease"],
        available_resources: Standard,
    },
];

static FALLBACK_PROFILE: CountryProfile = CountryProfile {
    country: UNKNOWN_COUNTRY,
    region: UNKNOWN_COUNTRY,
    economic_level: MiddleIncome,
    common_diseases: &["Hypertension", "Diabetes", "Heart disease", "Stroke", "Cancer"],
    available_resources: Standard,
};

/// Build the location profile for a country name.
///
/// Unknown countries keep their name but get the fallback profile and an
/// "Unknown" region.
pub fn lookup_location(country: &str) -> LocationInfo {
    let country = country.trim();
    let profile = COUNTRY_PROFILES
        .iter()
        .find(|p| p.country.eq_ignore_ascii_case(country));

    match profile {
        Some(p) => p.to_info(p.country),
        None => {
            tracing::debug!(country, "No medical profile for country, using fallback");
            if country.is_empty() {
                return default_location();
            }
            FALLBACK_PROFILE.to_info(country)
        }
    }
}

/// Profile used when location access is denied or fails.
pub fn default_location() -> LocationInfo {
    FALLBACK_PROFILE.to_info(UNKNOWN_COUNTRY)
}

/// Countries with a dedicated profile, in table order.
pub fn known_countries() -> impl Iterator<Item = &'static str> {
    COUNTRY_PROFILES.iter().map(|p| p.country)
}

impl CountryProfile {
    fn to_info(&self, country: &str) -> LocationInfo {
        LocationInfo {
            country: country.to_string(),
            region: self.region.to_string(),
            economic_level: self.economic_level,
            common_diseases: self.common_diseases.iter().map(|d| d.to_string()).collect(),
            available_resources: self.available_resources,
        }
    }
}
