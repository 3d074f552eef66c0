//! End-to-end form behaviour through the public API

use pretty_assertions::assert_eq;
use travelform::core::header::ingest;
use travelform::core::{
    CategoryValueSet, FormState, LoadOutcome, NoticeLevel, SlotState, SubmissionError,
    UploadedFile,
};
use travelform::{Side, SlotRole};

const DESTINATIONS: &str = "ID,lat,lon,kind\r\nA,1,x\r\nB,2,y\r\nC,1,x\r\n";

fn load(form: &mut FormState, side: Side, name: &str, text: &str) -> LoadOutcome {
    let ticket = form.select_file(side, UploadedFile::from_path(name)).unwrap();
    form.complete_load(ticket, Ok(ingest(text)))
}

#[test]
fn test_header_populates_origin_dropdowns() {
    let mut form = FormState::default();
    assert_eq!(load(&mut form, Side::Origin, "blocks.csv", "id,lat,lon,pop"), LoadOutcome::Applied);

    let group = form.group(Side::Origin);
    assert_eq!(group.state(), SlotState::Loaded);
    assert_eq!(group.slots().len(), 4);
    for slot in group.slots() {
        assert!(slot.dropdown.is_enabled(), "{} should be enabled", slot.role);
        assert_eq!(slot.dropdown.option_values(), vec!["id", "lat", "lon", "pop"]);
    }
}

#[test]
fn test_one_option_per_non_empty_token_in_order() {
    let mut form = FormState::default();
    load(&mut form, Side::Origin, "o.csv", " b , a ,, b ,c,  \nrow");
    let slot = form.group(Side::Origin).slot(SlotRole::Latitude).unwrap();
    // duplicates are kept, blanks are skipped
    assert_eq!(slot.dropdown.option_values(), vec!["b", "a", "b", "c"]);
}

#[test]
fn test_category_values_follow_source_column() {
    let mut form = FormState::default();
    load(&mut form, Side::Destination, "sites.csv", DESTINATIONS);
    assert!(!form.categories().is_enabled());
    assert!(!form.categories_label_active());

    // index 2 is "lat" once the sentinel is counted
    form.select_slot(Side::Destination, SlotRole::Category, 2).unwrap();
    assert!(form.categories().is_enabled());
    assert!(form.categories_label_active());
    assert_eq!(form.categories().options(), &["1", "2"]);

    form.select_slot(Side::Destination, SlotRole::Category, 0).unwrap();
    assert!(!form.categories().is_enabled());
    assert!(form.categories().is_empty());
}

#[test]
fn test_category_extraction_is_repeatable() {
    let body = ["A,1,x", "B,2,y", "C,1,x", "short"];
    let first = CategoryValueSet::derive(&body, 3);
    let second = CategoryValueSet::derive(&body, 3);
    assert_eq!(first, second);
    assert_eq!(first.values(), &["x", "y"]);
}

#[test]
fn test_clearing_disables_everything_in_group() {
    let mut form = FormState::default();
    load(&mut form, Side::Destination, "sites.csv", DESTINATIONS);
    form.select_slot(Side::Destination, SlotRole::Category, 4).unwrap();
    form.clear_file(Side::Destination);

    let group = form.group(Side::Destination);
    assert_eq!(group.state(), SlotState::Empty);
    assert!(group.file().is_none());
    assert!(group.slots().iter().all(|s| !s.dropdown.is_enabled() && !s.label_active));
    assert!(!form.categories().is_enabled());

    // clearing an already empty side is not an error
    form.clear_file(Side::Origin);
    assert_eq!(form.group(Side::Origin).state(), SlotState::Empty);
}

#[test]
fn test_pdf_is_refused_without_mutation() {
    let mut form = FormState::default();
    load(&mut form, Side::Origin, "blocks.csv", "id,lat,lon,pop");
    let before = form.group(Side::Origin).slots().to_vec();
    let generation = form.group(Side::Origin).generation();

    assert!(form.select_file(Side::Origin, UploadedFile::from_path("report.pdf")).is_err());

    let group = form.group(Side::Origin);
    assert_eq!(group.slots(), before.as_slice());
    assert_eq!(group.generation(), generation);
    let notice = form.notice.clone().unwrap();
    assert_eq!(notice.level, NoticeLevel::Warning);
    assert_eq!(
        notice.message,
        "File not supported! 'report.pdf' has media type 'application/pdf'"
    );
}

#[test]
fn test_last_selection_wins() {
    let mut form = FormState::default();
    let first = form.select_file(Side::Origin, UploadedFile::from_path("a.csv")).unwrap();
    let second = form.select_file(Side::Origin, UploadedFile::from_path("b.csv")).unwrap();

    // The newer read finishes first, then the older one arrives late
    assert_eq!(form.complete_load(second, Ok(ingest("b1,b2"))), LoadOutcome::Applied);
    assert_eq!(form.complete_load(first, Ok(ingest("a1,a2"))), LoadOutcome::Stale);

    let group = form.group(Side::Origin);
    assert_eq!(group.header().columns(), &["b1", "b2"]);
    assert_eq!(group.file().map(|f| f.name.as_str()), Some("b.csv"));
}

#[test]
fn test_full_submission() {
    let mut form = FormState::default();
    form.set_access(true);
    load(&mut form, Side::Origin, "blocks.csv", "geoid,lat,lon,population\n1,2,3,4");
    load(&mut form, Side::Destination, "sites.csv", DESTINATIONS);
    form.select_slot(Side::Destination, SlotRole::Category, 2).unwrap();
    form.toggle_category_value(1).unwrap();
    form.set_weights("1, 0.5");

    let submission = form.submission().unwrap();
    assert!(submission.access_measures);
    assert!(!submission.coverage_measures);
    assert_eq!(submission.destination_categories, Some(vec!["2".to_string()]));
    assert_eq!(submission.custom_weight_dict.as_deref(), Some("1, 0.5"));
    // population is hidden without coverage measures
    assert!(!submission.origin_field_mapping.contains_key("population"));
    assert_eq!(submission.destination_field_mapping.get("category").map(String::as_str), Some("lat"));

    let json: serde_json::Value = serde_json::from_str(&submission.to_json().unwrap()).unwrap();
    assert_eq!(json["origin_file"], "blocks.csv");
}

#[test]
fn test_submission_errors_are_all_reported() {
    let form = FormState::default();
    assert_eq!(
        form.submission().unwrap_err(),
        vec![
            SubmissionError::NoMeasureSelected,
            SubmissionError::MissingOriginFile,
            SubmissionError::MissingDestinationFile,
        ]
    );
}
