/// Label of the empty entry every catalog starts with.
pub const PLACEHOLDER_LABEL: &str = "Select an option";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerOption {
    pub value: &'static str,
    pub label: &'static str,
}

const fn option(value: &'static str, label: &'static str) -> AnswerOption {
    AnswerOption { value, label }
}

const PLACEHOLDER: AnswerOption = option("", PLACEHOLDER_LABEL);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    Standard,
    PainLocation,
    Breathing,
    PainDuration,
}

/// The fixed, ordered answers one question can take.
#[derive(Debug, PartialEq, Eq)]
pub struct OptionCatalog {
    pub kind: CatalogKind,
    options: &'static [AnswerOption],
}

pub static STANDARD: OptionCatalog = OptionCatalog {
    kind: CatalogKind::Standard,
    options: &[
        PLACEHOLDER,
        option("Yes", "Yes"),
        option("No", "No"),
        option("Don't Know", "Don't Know"),
        option("Refused to Answer", "Refused to Answer"),
    ],
};

pub static PAIN_LOCATION: OptionCatalog = OptionCatalog {
    kind: CatalogKind::PainLocation,
    options: &[
        PLACEHOLDER,
        option("Upper/middle chest", "Upper/middle chest"),
        option("Lower chest", "Lower chest"),
        option("Left Arm", "Left Arm"),
        option("Other", "Other"),
        option("Refused to Answer", "Refused to Answer"),
        option("Don't Know", "Don't Know"),
    ],
};

pub static BREATHING: OptionCatalog = OptionCatalog {
    kind: CatalogKind::Breathing,
    options: &[
        PLACEHOLDER,
        option("Continuous", "Continuous"),
        option("On and Off", "On and Off"),
        option("Don't Know", "Don't Know"),
    ],
};

pub static PAIN_DURATION: OptionCatalog = OptionCatalog {
    kind: CatalogKind::PainDuration,
    options: &[
        PLACEHOLDER,
        option("<30 minutes", "Less than 30 minutes"),
        option("0.5-24 hours", "30 minutes to 24 hours"),
        option(">24 hr", "More than 24 hours"),
        option("Don't Know", "Don't Know"),
        option("Refused to Answer", "Refused to Answer"),
    ],
};

impl OptionCatalog {
    /// All entries, placeholder first.
    pub fn options(&self) -> &'static [AnswerOption] {
        self.options
    }

    /// Entries a user can actually pick.
    pub fn selectable(&self) -> impl Iterator<Item = &'static AnswerOption> {
        self.options.iter().filter(|o| !o.value.is_empty())
    }

    pub fn contains(&self, value: &str) -> bool {
        self.selectable().any(|o| o.value == value)
    }

    /// Maps what the user typed or pressed (a label or a raw value) to the
    /// stored value. The placeholder and free text resolve to nothing.
    pub fn resolve(&self, input: &str) -> Option<&'static str> {
        let input = input.trim();
        self.selectable()
            .find(|o| o.label == input || o.value == input)
            .map(|o| o.value)
    }

    /// Display label for a stored value, the placeholder label when empty.
    pub fn label_for(&self, value: &str) -> Option<&'static str> {
        self.options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label)
    }
}
