use parcelbot::setup_logging;

#[test]
fn test_logging_setup() {
    // Calling twice must not panic: the second init is ignored.
    let result = std::panic::catch_unwind(|| {
        setup_logging();
        setup_logging();
    });

    assert!(result.is_ok(), "setup_logging function should not panic");
}
