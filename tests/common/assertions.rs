//! Custom assertion macros

/// Assert a `TestResponse` status, printing the body on mismatch
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "unexpected status, body: {}",
            $response.body
        );
    };
}

/// Assert the `{error, status}` body of a failed request
#[macro_export]
macro_rules! assert_error_body {
    ($response:expr, $status:expr) => {
        assert_status!($response, $status);
        assert_eq!($response.body["status"], $status.as_u16());
        assert!(
            $response.body["error"].is_string(),
            "missing error message: {}",
            $response.body
        );
    };
}

/// Assert that a slice of floats is strictly ascending
#[macro_export]
macro_rules! assert_strictly_ascending {
    ($values:expr) => {
        let values: &[f64] = &$values;
        assert!(
            values.windows(2).all(|w| w[0] < w[1]),
            "not strictly ascending: {:?}",
            values
        );
    };
}
