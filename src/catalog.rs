//! Static conference data backing the enumerated form fields.
//!
//! Countries, research tracks and fee tiers are closed sets: the form stores the
//! selected id and validators check membership here.
use crate::draft::Field;

/// A selectable option with a stable id and a display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Choice {
    pub id: &'static str,
    pub label: &'static str,
}

pub const COUNTRIES: [Choice; 5] = [
    Choice {
        id: "india",
        label: "India",
    },
    Choice {
        id: "usa",
        label: "United States",
    },
    Choice {
        id: "uk",
        label: "United Kingdom",
    },
    Choice {
        id: "singapore",
        label: "Singapore",
    },
    Choice {
        id: "other",
        label: "Other",
    },
];

pub const TRACKS: [Choice; 8] = [
    Choice {
        id: "track1",
        label: "Track 1: Digital Transformation & Strategic Management",
    },
    Choice {
        id: "track2",
        label: "Track 2: Technology & Innovation Management",
    },
    Choice {
        id: "track3",
        label: "Track 3: Sustainability & Resilience",
    },
    Choice {
        id: "track4",
        label: "Track 4: Human Resource Management",
    },
    Choice {
        id: "track5",
        label: "Track 5: Financial Management & Fintech",
    },
    Choice {
        id: "track6",
        label: "Track 6: Marketing & Consumer Behavior",
    },
    Choice {
        id: "track7",
        label: "Track 7: Operations & Supply Chain",
    },
    Choice {
        id: "track8",
        label: "Track 8: Entrepreneurship & Strategy",
    },
];

/// Participant origin used to split the fee table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Indian,
    International,
}

impl Origin {
    pub fn label(self) -> &'static str {
        match self {
            Origin::Indian => "Indian Participants",
            Origin::International => "International Participants",
        }
    }
}

/// Early bird or regular pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rate {
    EarlyBird,
    Regular,
}

impl Rate {
    pub fn label(self) -> &'static str {
        match self {
            Rate::EarlyBird => "Early Bird",
            Rate::Regular => "Regular",
        }
    }
}

/// One row of the fee table; `id` is what the amount-paid field stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeTier {
    pub id: &'static str,
    pub category: &'static str,
    pub origin: Origin,
    pub rate: Rate,
    pub amount: &'static str,
}

impl FeeTier {
    pub fn label(&self) -> String {
        format!(
            "{} ({}), {}: {}",
            self.category,
            match self.origin {
                Origin::Indian => "Indian",
                Origin::International => "International",
            },
            self.rate.label(),
            self.amount
        )
    }
}

macro_rules! fee {
    ($id:literal, $category:literal, $origin:ident, $rate:ident, $amount:literal) => {
        FeeTier {
            id: $id,
            category: $category,
            origin: Origin::$origin,
            rate: Rate::$rate,
            amount: $amount,
        }
    };
}

pub const FEE_TIERS: [FeeTier; 12] = [
    fee!("student-indian-early", "Student", Indian, EarlyBird, "₹800"),
    fee!("student-indian-regular", "Student", Indian, Regular, "₹1,200"),
    fee!("faculty-indian-early", "Faculty/Researcher", Indian, EarlyBird, "₹2,000"),
    fee!("faculty-indian-regular", "Faculty/Researcher", Indian, Regular, "₹3,000"),
    fee!("industry-indian-early", "Industry/Practitioner", Indian, EarlyBird, "₹3,000"),
    fee!("industry-indian-regular", "Industry/Practitioner", Indian, Regular, "₹4,000"),
    fee!("student-intl-early", "Student", International, EarlyBird, "$60"),
    fee!("student-intl-regular", "Student", International, Regular, "$80"),
    fee!("faculty-intl-early", "Faculty/Researcher", International, EarlyBird, "$80"),
    fee!("faculty-intl-regular", "Faculty/Researcher", International, Regular, "$100"),
    fee!("industry-intl-early", "Industry/Practitioner", International, EarlyBird, "$120"),
    fee!("industry-intl-regular", "Industry/Practitioner", International, Regular, "$150"),
];

pub const EARLY_BIRD_DEADLINE: &str = "March 31, 2026";
pub const CO_AUTHOR_CERTIFICATE_FEE: &str = "Rs. 500";

/// Bank details printed on the payment view.
pub const BANK_DETAILS: [(&str, &str); 7] = [
    ("Account Name", "BNMIT-MBA"),
    ("Bank Name", "Canara Bank"),
    ("Account Number", "1147101031035"),
    ("IFSC Code", "CNRB0001147"),
    (
        "Branch Address",
        "24/25, 27th Cross, Sevakshetra Complex, Banashankari II Stage, Bangalore - 560070",
    ),
    ("Branch Code", "1147"),
    ("MICR Code", "560015006"),
];

pub fn find_country(id: &str) -> Option<&'static Choice> {
    COUNTRIES.iter().find(|choice| choice.id == id)
}

pub fn find_track(id: &str) -> Option<&'static Choice> {
    TRACKS.iter().find(|choice| choice.id == id)
}

pub fn find_fee_tier(id: &str) -> Option<&'static FeeTier> {
    FEE_TIERS.iter().find(|tier| tier.id == id)
}

/// Membership check for the enumerated fields; other fields have no permitted set.
pub fn is_valid_choice(field: Field, id: &str) -> bool {
    match field {
        Field::Country => find_country(id).is_some(),
        Field::TrackNumber => find_track(id).is_some(),
        Field::AmountPaid => find_fee_tier(id).is_some(),
        _ => false,
    }
}

/// Human-readable label for a stored choice id, falling back to the raw id.
pub fn choice_label(field: Field, id: &str) -> String {
    let label = match field {
        Field::Country => find_country(id).map(|choice| choice.label.to_string()),
        Field::TrackNumber => find_track(id).map(|choice| choice.label.to_string()),
        Field::AmountPaid => find_fee_tier(id).map(FeeTier::label),
        _ => None,
    };
    label.unwrap_or_else(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn fee_tier_ids_are_unique() {
        let ids: BTreeSet<_> = FEE_TIERS.iter().map(|tier| tier.id).collect();
        assert_eq!(ids.len(), FEE_TIERS.len());
    }

    #[test]
    fn choices_are_scoped_to_their_field() {
        assert!(is_valid_choice(Field::Country, "india"));
        assert!(!is_valid_choice(Field::TrackNumber, "india"));
        assert!(is_valid_choice(Field::TrackNumber, "track8"));
        assert!(!is_valid_choice(Field::TrackNumber, "track9"));
        assert!(is_valid_choice(Field::AmountPaid, "faculty-intl-regular"));
        assert!(!is_valid_choice(Field::Name, "india"));
    }

    #[test]
    fn choice_label_falls_back_to_id() {
        assert_eq!(choice_label(Field::Country, "uk"), "United Kingdom");
        assert_eq!(choice_label(Field::Country, "mars"), "mars");
        assert_eq!(
            choice_label(Field::AmountPaid, "student-indian-early"),
            "Student (Indian), Early Bird: ₹800"
        );
    }
}
