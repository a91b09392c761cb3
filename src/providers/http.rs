//! Shared HTTP fetch path for the provider adapters: bounded exponential
//! backoff with transient/permanent classification of upstream failures.

use super::ProviderError;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::StatusCode;
use std::time::Duration;

/// Send a GET request with retries and return the parsed JSON body.
///
/// Network errors, HTTP 429, and 5xx responses are retried for up to 30
/// seconds; other client errors and body parse failures are permanent.
pub(crate) async fn fetch_json(
    request: reqwest::RequestBuilder,
) -> Result<serde_json::Value, ProviderError> {
    let backoff = ExponentialBackoff {
        max_elapsed_time: Some(Duration::from_secs(30)),
        ..Default::default()
    };

    retry(backoff, || async {
        // GET requests carry no body, so the builder is always cloneable
        let request = request.try_clone().ok_or_else(|| {
            backoff::Error::permanent(ProviderError::Network(
                "request cannot be retried".to_string(),
            ))
        })?;

        let response = request
            .send()
            .await
            .map_err(|e| backoff::Error::transient(ProviderError::Network(e.to_string())))?;

        check_status(response.status())?;

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| backoff::Error::permanent(ProviderError::Parse(e.to_string())))
    })
    .await
}

fn check_status(status: StatusCode) -> Result<(), backoff::Error<ProviderError>> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(backoff::Error::transient(ProviderError::RateLimited));
    }
    if status.is_server_error() {
        return Err(backoff::Error::transient(ProviderError::Http {
            status: status.as_u16(),
            message: "Server error".to_string(),
        }));
    }
    if !status.is_success() {
        return Err(backoff::Error::permanent(ProviderError::Http {
            status: status.as_u16(),
            message: "Client error".to_string(),
        }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_is_transient() {
        let err = check_status(StatusCode::TOO_MANY_REQUESTS).unwrap_err();
        assert!(matches!(
            err,
            backoff::Error::Transient {
                err: ProviderError::RateLimited,
                ..
            }
        ));
    }

    #[test]
    fn test_server_error_is_transient() {
        let err = check_status(StatusCode::INTERNAL_SERVER_ERROR).unwrap_err();
        assert!(matches!(
            err,
            backoff::Error::Transient {
                err: ProviderError::Http { status: 500, .. },
                ..
            }
        ));
    }

    #[test]
    fn test_client_error_is_permanent() {
        let err = check_status(StatusCode::UNAUTHORIZED).unwrap_err();
        assert!(matches!(
            err,
            backoff::Error::Permanent(ProviderError::Http { status: 401, .. })
        ));
    }

    #[test]
    fn test_success_passes() {
        assert!(check_status(StatusCode::OK).is_ok());
        assert!(check_status(StatusCode::CREATED).is_ok());
    }
}
