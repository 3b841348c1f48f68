//! Language code helpers shared by the processor and its callers.

use crate::constants::DEFAULT_LANGUAGE;
use crate::errors::CapabilityError;
use crate::types::UserProfile;
use std::future::Future;
use std::time::Duration;

/// Normalizes a language code to its first two characters, lower-cased.
pub fn truncate_language_code(code: &str) -> String {
    code.trim().chars().take(2).collect::<String>().to_lowercase()
}

/// Picks the reply language: the profile's preference, then the detected
/// language, then English.
pub fn resolve_language(profile: &UserProfile, detected: &str) -> String {
    let chosen = profile
        .preferred_language
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .or(Some(detected.trim()).filter(|l| !l.is_empty()))
        .unwrap_or(DEFAULT_LANGUAGE);
    truncate_language_code(chosen)
}

/// Runs a capability call under `limit`, mapping expiry to [`CapabilityError::Timeout`].
pub(crate) async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, CapabilityError>
where
    F: Future<Output = Result<T, CapabilityError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| CapabilityError::Timeout(limit))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preferred_language_wins() {
        let profile = UserProfile::new().with_preferred_language("Tamil");
        assert_eq!(resolve_language(&profile, "hi"), "ta");
    }

    #[test]
    fn test_blank_preference_falls_back_to_detected() {
        let profile = UserProfile::new().with_preferred_language("  ");
        assert_eq!(resolve_language(&profile, "hi-IN"), "hi");
    }

    #[test]
    fn test_nothing_known_means_english() {
        assert_eq!(resolve_language(&UserProfile::default(), ""), "en");
    }

    #[test]
    fn test_truncation_is_character_based() {
        assert_eq!(truncate_language_code("zh-cn"), "zh");
        assert_eq!(truncate_language_code("e"), "e");
    }

    #[tokio::test]
    async fn test_with_timeout_maps_expiry() {
        let slow = async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok::<_, CapabilityError>(())
        };
        let err = with_timeout(Duration::from_millis(10), slow).await.unwrap_err();
        assert!(matches!(err, CapabilityError::Timeout(_)));
    }
}
