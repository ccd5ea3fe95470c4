use medassist_core::error::CoreError;
use medassist_core::query::{QueryInputs, assemble_query};

#[test]
fn text_with_caption() {
    let query = assemble_query(Some("fever"), None, Some("rash on arm")).unwrap();
    assert_eq!(query, "fever\n\nThe medical image shows: rash on arm");
}

#[test]
fn transcript_only() {
    let query = assemble_query(None, Some("I have a headache"), None).unwrap();
    assert_eq!(query, "I have a headache");
}

#[test]
fn caption_only() {
    let query = assemble_query(None, None, Some("x-ray of chest")).unwrap();
    assert_eq!(query, "Please analyze this medical image: x-ray of chest");
}

#[test]
fn nothing_is_an_empty_query_error() {
    let err = assemble_query(None, None, None).unwrap_err();
    assert!(matches!(err, CoreError::EmptyQuery));
}

#[test]
fn text_takes_precedence_over_transcript() {
    let query = assemble_query(Some("sore throat"), Some("ignored"), None).unwrap();
    assert_eq!(query, "sore throat");
}

#[test]
fn transcript_with_caption() {
    let query = assemble_query(None, Some("it itches"), Some("red patch")).unwrap();
    assert_eq!(query, "it itches\n\nThe medical image shows: red patch");
}

#[test]
fn blank_inputs_count_as_absent() {
    let query = assemble_query(Some("   "), Some("dizzy"), Some("")).unwrap();
    assert_eq!(query, "dizzy");

    let err = assemble_query(Some(" \n"), Some("\t"), None).unwrap_err();
    assert!(matches!(err, CoreError::EmptyQuery));
}

#[test]
fn inputs_report_when_transcript_is_needed() {
    let typed = QueryInputs {
        text: Some("cough".into()),
        ..QueryInputs::default()
    };
    assert!(!typed.needs_transcript());
    assert_eq!(typed.assemble().unwrap(), "cough");

    let spoken = QueryInputs {
        transcript: Some("back pain".into()),
        ..QueryInputs::default()
    };
    assert!(spoken.needs_transcript());
    assert_eq!(spoken.assemble().unwrap(), "back pain");
}
