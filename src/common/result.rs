use crate::common::error::MetapinError;

/// Result alias used across the crate.
///
/// # Examples
///
/// ```
/// use metapin::common::result::MetapinResult;
/// use metapin::common::error::MetapinError;
///
/// fn example_function() -> MetapinResult<String> {
///     Ok("success".to_string())
/// }
///
/// fn example_with_error() -> MetapinResult<()> {
///     Err(MetapinError::internal_error("Something went wrong"))
/// }
/// ```
pub type MetapinResult<T> = Result<T, MetapinError>;

/// Conversion helpers from `Option` into [`MetapinResult`].
pub trait OptionExt<T> {
    /// Turn `None` into [`MetapinError::InvalidComponent`].
    ///
    /// ```
    /// use metapin::common::result::{MetapinResult, OptionExt};
    ///
    /// let missing: Option<&str> = None;
    /// let result: MetapinResult<&str> = missing.ok_or_invalid_component("env");
    /// assert!(result.is_err());
    /// ```
    fn ok_or_invalid_component(self, name: impl Into<String>) -> MetapinResult<T>;

    /// Turn `None` into [`MetapinError::InternalError`].
    fn ok_or_internal_error(self, message: impl Into<String>) -> MetapinResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_invalid_component(self, name: impl Into<String>) -> MetapinResult<T> {
        self.ok_or_else(|| MetapinError::invalid_component(name))
    }

    fn ok_or_internal_error(self, message: impl Into<String>) -> MetapinResult<T> {
        self.ok_or_else(|| MetapinError::internal_error(message))
    }
}

/// async関数用のヘルパー
pub mod async_helpers {
    use super::{MetapinError, MetapinResult};
    use std::future::Future;
    use std::time::Duration;

    /// Await `f`, failing with [`MetapinError::Timeout`] once `timeout` elapses.
    ///
    /// `None` waits without a limit.
    pub async fn with_timeout<F, T>(f: F, timeout: Option<Duration>) -> MetapinResult<T>
    where
        F: Future<Output = MetapinResult<T>>,
    {
        let Some(timeout_duration) = timeout else {
            return f.await;
        };

        match tokio::time::timeout(timeout_duration, f).await {
            Ok(result) => result,
            Err(_) => Err(MetapinError::timeout(timeout_duration.as_secs())),
        }
    }
}
