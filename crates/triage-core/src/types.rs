use crate::error::TriageError;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Ward
// ---------------------------------------------------------------------------

/// Triage outcome derived from a severity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ward {
    General,
    Trauma,
    Icu,
}

impl Ward {
    pub fn all() -> &'static [Ward] {
        &[Ward::General, Ward::Trauma, Ward::Icu]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Ward::General => "general",
            Ward::Trauma => "trauma",
            Ward::Icu => "icu",
        }
    }

    /// Label shown next to the severity meter.
    pub fn label(self) -> &'static str {
        match self {
            Ward::General => "General Ward",
            Ward::Trauma => "Trauma ICU",
            Ward::Icu => "ICU Admission",
        }
    }

    /// Recommendation text in the given language.
    pub fn recommendation(self, lang: Language) -> &'static str {
        match (self, lang) {
            (Ward::General, Language::En) => "General Ward",
            (Ward::Trauma, Language::En) => "Trauma ICU",
            (Ward::Icu, Language::En) => "ICU Admission Required",
            (Ward::General, Language::Ta) => "பொது வார்டு",
            (Ward::Trauma, Language::Ta) => "காயம் ICU",
            (Ward::Icu, Language::Ta) => "ICU அனுமதி தேவை",
        }
    }
}

impl fmt::Display for Ward {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Ward {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general" => Ok(Ward::General),
            "trauma" => Ok(Ward::Trauma),
            "icu" => Ok(Ward::Icu),
            _ => Err(TriageError::InvalidWard(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Care-team role an alert is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Doctor,
    Nurse,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::Nurse => "nurse",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "doctor" => Ok(Role::Doctor),
            "nurse" => Ok(Role::Nurse),
            "admin" => Ok(Role::Admin),
            _ => Err(TriageError::InvalidRole(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Profile {
    Normal,
    Critical,
}

impl Profile {
    pub fn as_str(self) -> &'static str {
        match self {
            Profile::Normal => "normal",
            Profile::Critical => "critical",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Profile {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Profile::Normal),
            "critical" => Ok(Profile::Critical),
            _ => Err(TriageError::InvalidProfile(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Stage / StepStatus
// ---------------------------------------------------------------------------

/// One stage of the ambulance-to-admission sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Dispatch,
    EnRoute,
    Arrived,
    Admitted,
}

impl Stage {
    pub fn all() -> &'static [Stage] {
        &[Stage::Dispatch, Stage::EnRoute, Stage::Arrived, Stage::Admitted]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Dispatch => "dispatch",
            Stage::EnRoute => "en_route",
            Stage::Arrived => "arrived",
            Stage::Admitted => "admitted",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Active,
    Completed,
}

impl StepStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Active => "active",
            StepStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Specialty / Availability
// ---------------------------------------------------------------------------

/// ICU specialty a hospital or ward is equipped for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Specialty {
    Trauma,
    Cardiac,
    Pediatric,
    General,
}

impl Specialty {
    pub fn as_str(self) -> &'static str {
        match self {
            Specialty::Trauma => "trauma",
            Specialty::Cardiac => "cardiac",
            Specialty::Pediatric => "pediatric",
            Specialty::General => "general",
        }
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Specialty {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trauma" => Ok(Specialty::Trauma),
            "cardiac" => Ok(Specialty::Cardiac),
            "pediatric" => Ok(Specialty::Pediatric),
            "general" => Ok(Specialty::General),
            _ => Err(TriageError::InvalidSpecialty(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    Limited,
    Full,
}

impl Availability {
    /// More than five free beds is comfortable, any free bed is limited.
    pub fn from_free_beds(free: u32) -> Self {
        if free > 5 {
            Availability::Available
        } else if free > 0 {
            Availability::Limited
        } else {
            Availability::Full
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Availability::Available => "available",
            Availability::Limited => "limited",
            Availability::Full => "full",
        }
    }

    pub fn label(self, lang: Language) -> &'static str {
        match (self, lang) {
            (Availability::Available, Language::En) => "Available",
            (Availability::Limited, Language::En) => "Limited",
            (Availability::Full, Language::En) => "Full",
            (Availability::Available, Language::Ta) => "கிடைக்கும்",
            (Availability::Limited, Language::Ta) => "குறைந்த",
            (Availability::Full, Language::Ta) => "நிரம்பியது",
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Language / NetworkMode
// ---------------------------------------------------------------------------

/// Display language for static labels. No translation engine behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    En,
    Ta,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ta => "ta",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Language::En),
            "ta" => Ok(Language::Ta),
            _ => Err(TriageError::InvalidInput(format!("unknown language '{s}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkMode {
    #[default]
    Online,
    Mesh,
}

impl NetworkMode {
    pub fn as_str(self) -> &'static str {
        match self {
            NetworkMode::Online => "online",
            NetworkMode::Mesh => "mesh",
        }
    }
}

impl fmt::Display for NetworkMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ward_from_str() {
        for &w in Ward::all() {
            assert_eq!(w.as_str().parse::<Ward>().unwrap(), w);
        }
        assert!("morgue".parse::<Ward>().is_err());
    }

    #[test]
    fn ward_recommendation_text() {
        assert_eq!(Ward::Icu.recommendation(Language::En), "ICU Admission Required");
        assert_eq!(Ward::General.recommendation(Language::Ta), "பொது வார்டு");
        assert_eq!("ta".parse::<Language>().unwrap(), Language::Ta);
        assert!("fr".parse::<Language>().is_err());
    }

    #[test]
    fn wards_order_by_acuity() {
        assert!(Ward::General < Ward::Trauma);
        assert!(Ward::Trauma < Ward::Icu);
    }

    #[test]
    fn role_and_profile_parse() {
        assert_eq!("nurse".parse::<Role>().unwrap(), Role::Nurse);
        assert_eq!("critical".parse::<Profile>().unwrap(), Profile::Critical);
        assert!(matches!(
            "janitor".parse::<Role>(),
            Err(TriageError::InvalidRole(_))
        ));
    }

    #[test]
    fn availability_thresholds() {
        assert_eq!(Availability::from_free_beds(12), Availability::Available);
        assert_eq!(Availability::from_free_beds(6), Availability::Available);
        assert_eq!(Availability::from_free_beds(5), Availability::Limited);
        assert_eq!(Availability::from_free_beds(1), Availability::Limited);
        assert_eq!(Availability::from_free_beds(0), Availability::Full);
    }

    #[test]
    fn stage_serializes_snake_case() {
        let json = serde_json::to_string(&Stage::EnRoute).unwrap();
        assert_eq!(json, "\"en_route\"");
    }
}
