use super::*;

fn form() -> Form {
    Form::with_defaults(
        Limits::default(),
        DisplayResolution {
            width: 2560,
            height: 1440,
        },
    )
}

#[test]
fn defaults_prefill_display_and_start_pristine() {
    let form = form();
    assert_eq!(form.field(FieldName::ImageWidth).value(), "2560");
    assert_eq!(form.field(FieldName::ImageHeight).value(), "1440");
    assert_eq!(form.field(FieldName::BackgroundsCount).value(), "");
    assert_eq!(form.field(FieldName::DownloadPath).value(), "");
    assert!(form.fields().all(Field::is_valid));
}

#[test]
fn set_field_value_never_leaves_stale_validity() {
    let mut form = form();

    assert!(!form.set_field_value(FieldName::BackgroundsCount, "99"));
    let field = form.field(FieldName::BackgroundsCount);
    assert_eq!(field.value(), "99");
    assert!(!field.is_valid());
    assert_eq!(
        field.error_message().as_deref(),
        Some("At most 50 can be retrieved at one time")
    );

    assert!(form.set_field_value(FieldName::BackgroundsCount, "5"));
    let field = form.field(FieldName::BackgroundsCount);
    assert!(field.is_valid());
    assert_eq!(field.error(), None);
}

#[test]
fn validate_all_catches_invalid_defaults() {
    let mut form = form();
    assert!(form.is_valid(), "pristine fields report valid");

    assert!(!form.validate_all());
    assert!(!form.field(FieldName::BackgroundsCount).is_valid());
    assert!(!form.field(FieldName::DownloadPath).is_valid());
    assert!(form.field(FieldName::ImageWidth).is_valid());
    assert!(form.field(FieldName::ImageHeight).is_valid());
    assert!(!form.is_valid());
}

#[test]
fn to_request_requires_a_valid_form() {
    let mut form = form();
    form.set_field_value(FieldName::BackgroundsCount, "0");
    assert_eq!(form.to_request(), Err(FormError::Invalid));
}

#[test]
fn to_request_coerces_numeric_fields() {
    let mut form = form();
    form.set_field_value(FieldName::BackgroundsCount, " 5 ");
    form.set_field_value(FieldName::ImageWidth, "1920.0");
    form.set_field_value(FieldName::ImageHeight, "1080");
    form.set_field_value(FieldName::DownloadPath, "/tmp/x");
    assert!(form.validate_all());

    let request = form.to_request().expect("valid form");
    assert_eq!(
        request,
        BulkRequest {
            item_count: 5,
            width: 1920,
            height: 1080,
            destination_path: "/tmp/x".into(),
        }
    );
}

#[test]
fn to_request_refuses_values_that_were_never_validated() {
    // Count is blank but pristine, so is_valid() holds until validate_all runs.
    let mut form = form();
    form.set_field_value(FieldName::DownloadPath, "/tmp/x");
    assert_eq!(form.to_request(), Err(FormError::Invalid));
}

#[test]
fn to_request_refuses_a_blank_path_that_was_never_validated() {
    let mut form = form();
    assert!(form.set_field_value(FieldName::BackgroundsCount, "5"));
    assert!(form.is_valid(), "path is pristine");
    assert_eq!(form.to_request(), Err(FormError::Invalid));
    assert!(
        form.field(FieldName::DownloadPath).is_valid(),
        "building a request does not record field errors"
    );
}

#[test]
fn cleared_height_reports_its_own_field() {
    let mut form = form();
    assert!(!form.set_field_value(FieldName::ImageHeight, ""));
    assert_eq!(
        form.field(FieldName::ImageHeight).error(),
        Some(&ValidationError::MissingValue(FieldName::ImageHeight))
    );
    assert!(form.field(FieldName::ImageWidth).is_valid());
}
