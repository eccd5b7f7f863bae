/*!
 * Tests for error types and conversions
 */

use fandikana::errors::{ProviderError, TranslationError};

#[test]
fn test_providerError_apiError_shouldDisplayStatusAndMessage() {
    let error = ProviderError::ApiError {
        status_code: 503,
        message: "Model is currently loading".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("503"));
    assert!(display.contains("Model is currently loading"));
}

#[test]
fn test_providerError_fromStatus_shouldClassifyAuthAndRateLimit() {
    assert!(matches!(ProviderError::from_status(401, "bad token"), ProviderError::AuthenticationError(_)));
    assert!(matches!(ProviderError::from_status(403, "forbidden"), ProviderError::AuthenticationError(_)));
    assert!(matches!(ProviderError::from_status(429, "slow down"), ProviderError::RateLimitExceeded(_)));
    assert!(matches!(
        ProviderError::from_status(500, "boom"),
        ProviderError::ApiError { status_code: 500, .. }
    ));
}

#[test]
fn test_translationError_fromProviderError_shouldWrapAndDisplay() {
    let error: TranslationError = ProviderError::ConnectionError("Host unreachable".to_string()).into();
    assert!(matches!(error, TranslationError::Provider(ProviderError::ConnectionError(_))));

    let display = format!("{}", error);
    assert!(display.contains("Provider error"));
    assert!(display.contains("Host unreachable"));
}

#[test]
fn test_translationError_configuration_shouldDisplayReason() {
    let error = TranslationError::Configuration("Invalid endpoint URL 'not a url'".to_string());
    let display = format!("{}", error);
    assert!(display.contains("Configuration error"));
    assert!(display.contains("not a url"));
}
