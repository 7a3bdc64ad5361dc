use super::FormState;
use crate::draft::{Field, FieldValue, RegistrationDraft};
use crate::test_support::valid_draft;
use crate::validate::{INVALID_EMAIL_MESSAGE, INVALID_PHONE_MESSAGE};

#[test]
fn set_value_marks_touched_and_validates() {
    let mut form = FormState::default();
    form.set_value(Field::Phone, FieldValue::text("12345"))
        .expect("set phone");
    assert!(form.is_touched(Field::Phone));
    assert_eq!(form.visible_error(Field::Phone), Some(INVALID_PHONE_MESSAGE));

    form.set_value(Field::Phone, FieldValue::text("+91 98765 43210"))
        .expect("fix phone");
    assert_eq!(form.visible_error(Field::Phone), None);
    assert!(!form.errors().contains_key(&Field::Phone));
}

#[test]
fn email_edit_waits_for_blur() {
    let mut form = FormState::default();
    form.set_value(Field::Email, FieldValue::text("bob@x"))
        .expect("set email");
    assert!(!form.is_touched(Field::Email));
    assert_eq!(form.visible_error(Field::Email), None);
    assert!(!form.errors().contains_key(&Field::Email));

    form.mark_touched(Field::Email);
    assert_eq!(form.visible_error(Field::Email), Some(INVALID_EMAIL_MESSAGE));

    // Editing again drops the message for the old value until the next blur.
    form.set_value(Field::Email, FieldValue::text("bob@example.com"))
        .expect("fix email");
    assert_eq!(form.visible_error(Field::Email), None);
}

#[test]
fn errors_for_untouched_fields_stay_hidden() {
    let mut form = FormState::default();
    assert!(form.revalidate(Field::Name));
    assert!(form.errors().contains_key(&Field::Name));
    assert_eq!(form.visible_error(Field::Name), None);

    form.mark_touched(Field::Name);
    assert_eq!(form.visible_error(Field::Name), Some("Full name is required"));

    form.force_error(Field::Email, "Please verify your email address");
    assert_eq!(
        form.visible_error(Field::Email),
        Some("Please verify your email address")
    );
}

#[test]
fn full_validation_on_empty_draft_reports_every_mandatory_field() {
    let mut form = FormState::default();
    let invalid = form.validate_all();
    let mandatory: Vec<Field> = Field::mandatory().collect();
    assert_eq!(invalid, mandatory);
    for field in mandatory {
        let message = form.visible_error(field).expect("error shown after force-touch");
        assert!(
            message.contains("required") || message.starts_with("Please select"),
            "{field}: {message}"
        );
    }
    assert!(!form.is_valid());
    assert_eq!(form.visible_error(Field::DietaryRequirements), None);
}

#[test]
fn malformed_email_keeps_form_invalid() {
    let mut draft = valid_draft();
    draft.personal.email = "bob@x".to_string();
    let mut form = FormState::new(draft);
    assert!(!form.is_valid());
    assert_eq!(form.validate_all(), vec![Field::Email]);
    assert_eq!(form.visible_error(Field::Email), Some(INVALID_EMAIL_MESSAGE));
}

#[test]
fn validity_flag_matches_partial_fill_table() {
    type Edit = fn(&mut RegistrationDraft);
    let cases: [(&str, Edit, bool); 13] = [
        ("complete", |_| {}, true),
        ("no name", |d| d.personal.name.clear(), false),
        ("blank institution", |d| d.personal.institution = "   ".into(), false),
        ("no country", |d| d.personal.country.clear(), false),
        ("no track", |d| d.paper.track_number.clear(), false),
        ("no paper id", |d| d.paper.paper_id.clear(), false),
        ("no amount", |d| d.payment.amount_paid.clear(), false),
        ("no transaction", |d| d.payment.transaction_id.clear(), false),
        ("no proof", |d| d.payment.proof = None, false),
        ("bad email", |d| d.personal.email = "bob@x".into(), false),
        ("bad phone", |d| d.personal.phone = "98765".into(), false),
        ("no dietary", |d| d.paper.dietary_requirements.clear(), true),
        ("no accommodation", |d| d.paper.accommodation = false, true),
    ];
    for (label, edit, expected) in cases {
        let mut draft = valid_draft();
        edit(&mut draft);
        assert_eq!(FormState::new(draft).is_valid(), expected, "{label}");
    }
}

#[test]
fn in_flight_submission_blocks_edits() {
    let mut form = FormState::new(valid_draft());
    form.set_submitting(true);
    assert!(form
        .set_value(Field::Name, FieldValue::text("Someone Else"))
        .is_err());
    assert_eq!(form.draft().personal.name, "Asha Rao");
    form.set_submitting(false);
    form.set_value(Field::Name, FieldValue::text("Someone Else"))
        .expect("edit after submission settles");
}

#[test]
fn reset_clears_everything() {
    let mut form = FormState::new(valid_draft());
    form.validate_all();
    form.reset();
    assert_eq!(form.draft(), &RegistrationDraft::default());
    assert!(Field::ALL.iter().all(|field| !form.is_touched(*field)));
    assert!(form.errors().is_empty());
}
