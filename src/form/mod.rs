pub mod catalog;
pub mod client;
pub mod record;
pub mod render;
pub mod sessions;
pub mod submission;

use std::{fmt, str::FromStr};

use catalog::OptionCatalog;
pub use record::{AnswerRecord, PredictionRequest, RecordError};
pub use submission::{PredictionResult, SubmissionState, SubmitRejected};

/// Every question on the form, in the order the form asks them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Age,
    HadDiabetes,
    HadHeartDisease,
    HadHypertension,
    HadObesity,
    HadStroke,
    HadBlueLips,
    HadAnkleSwelling,
    HadPuffiness,
    HadDiffBreathing,
    FastBreathing,
    HadWheezed,
    HadChestPain,
    PhysicalActionPainful,
    UrineStop,
    HadLostConsciousness,
    HadConfusion,
    PainLocation,
    BreathingOnOff,
    ChestPainDuration,
}

impl Field {
    pub const ALL: [Field; 20] = [
        Field::Age,
        Field::HadDiabetes,
        Field::HadHeartDisease,
        Field::HadHypertension,
        Field::HadObesity,
        Field::HadStroke,
        Field::HadBlueLips,
        Field::HadAnkleSwelling,
        Field::HadPuffiness,
        Field::HadDiffBreathing,
        Field::FastBreathing,
        Field::HadWheezed,
        Field::HadChestPain,
        Field::PhysicalActionPainful,
        Field::UrineStop,
        Field::HadLostConsciousness,
        Field::HadConfusion,
        Field::PainLocation,
        Field::BreathingOnOff,
        Field::ChestPainDuration,
    ];

    /// Key used in the request body.
    pub fn key(self) -> &'static str {
        match self {
            Field::Age => "age",
            Field::HadDiabetes => "had_diabetes",
            Field::HadHeartDisease => "had_heart_disease",
            Field::HadHypertension => "had_hypertension",
            Field::HadObesity => "had_obesity",
            Field::HadStroke => "had_stroke",
            Field::HadBlueLips => "had_blue_lips",
            Field::HadAnkleSwelling => "had_ankle_swelling",
            Field::HadPuffiness => "had_puffiness",
            Field::HadDiffBreathing => "had_diff_breathing",
            Field::FastBreathing => "fast_breathing",
            Field::HadWheezed => "had_wheezed",
            Field::HadChestPain => "had_chest_pain",
            Field::PhysicalActionPainful => "physical_action_painful",
            Field::UrineStop => "urine_stop",
            Field::HadLostConsciousness => "had_lost_consciousness",
            Field::HadConfusion => "had_confusion",
            Field::PainLocation => "pain_location",
            Field::BreathingOnOff => "breathing_on_off",
            Field::ChestPainDuration => "chest_pain_duration",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::Age => "Age",
            Field::HadDiabetes => "Did deceased have diabetes?",
            Field::HadHeartDisease => "Did deceased have heart disease?",
            Field::HadHypertension => "Did deceased have hypertension?",
            Field::HadObesity => "Did deceased have obesity?",
            Field::HadStroke => "Did deceased have a stroke?",
            Field::HadBlueLips => "Did deceased have blue lips?",
            Field::HadAnkleSwelling => "Did deceased have ankle swelling?",
            Field::HadPuffiness => "Did deceased experience puffiness?",
            Field::HadDiffBreathing => "Did deceased have difficulty breathing?",
            Field::FastBreathing => "Did deceased experience fast breathing?",
            Field::HadWheezed => "Did deceased experience wheezing?",
            Field::HadChestPain => "Did deceased have chest pain?",
            Field::PhysicalActionPainful => "Was physical activity painful?",
            Field::UrineStop => "Did deceased have difficulty urinating?",
            Field::HadLostConsciousness => "Did deceased lose consciousness?",
            Field::HadConfusion => "Did deceased experience confusion?",
            Field::PainLocation => "Where was the pain located?",
            Field::BreathingOnOff => "Breathing pattern",
            Field::ChestPainDuration => "Chest pain duration",
        }
    }

    /// `None` for the numeric age field.
    pub fn catalog(self) -> Option<&'static OptionCatalog> {
        match self {
            Field::Age => None,
            Field::PainLocation => Some(&catalog::PAIN_LOCATION),
            Field::BreathingOnOff => Some(&catalog::BREATHING),
            Field::ChestPainDuration => Some(&catalog::PAIN_DURATION),
            _ => Some(&catalog::STANDARD),
        }
    }

    pub fn from_key(key: &str) -> Option<Field> {
        Field::ALL.into_iter().find(|f| f.key() == key)
    }

    pub fn from_label(label: &str) -> Option<Field> {
        let label = label.trim();
        Field::ALL.into_iter().find(|f| f.label() == label)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Field {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Field::from_key(s).ok_or_else(|| RecordError::UnknownField(s.to_string()))
    }
}

/// One form instance: what has been answered so far and where the last
/// submission stands.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HealthForm {
    pub answers: AnswerRecord,
    pub submission: SubmissionState,
}

impl HealthForm {
    pub fn new() -> Self {
        Self::default()
    }
}
