use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        RecorderError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        RecorderError::config("x")
            .to_string()
            .contains("configuration error:")
    );
    assert!(
        RecorderError::encode("x")
            .to_string()
            .contains("encode error:")
    );
    assert!(
        RecorderError::scene("x")
            .to_string()
            .contains("scene error:")
    );
    assert_eq!(
        RecorderError::RecordingInProgress.to_string(),
        "recording already in progress"
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = RecorderError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
