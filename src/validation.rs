//! Input validation for the HTTP surface
//!
//! Ensures data integrity before any store write or network call.

use anyhow::{Result, anyhow};

/// Maximum lengths for security
pub const MAX_USER_ID_LENGTH: usize = 128;
pub const MAX_CONTENT_LENGTH: usize = 50_000; // 50KB
pub const MAX_TITLE_LENGTH: usize = 512;
pub const MAX_ACTIVITIES: usize = 25;

/// Validate user_id
pub fn validate_user_id(user_id: &str) -> Result<()> {
    if user_id.is_empty() {
        return Err(anyhow!("user_id cannot be empty"));
    }

    if user_id.len() > MAX_USER_ID_LENGTH {
        return Err(anyhow!(
            "user_id too long: {} chars (max: {})",
            user_id.len(),
            MAX_USER_ID_LENGTH
        ));
    }

    // Only allow alphanumeric, dash, underscore, @, .
    if !user_id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_' || c == '@' || c == '.')
    {
        return Err(anyhow!(
            "user_id contains invalid characters (allowed: alphanumeric, -, _, @, .)"
        ));
    }

    Ok(())
}

/// Validate journal entry content
pub fn validate_content(content: &str) -> Result<()> {
    if content.trim().is_empty() {
        return Err(anyhow!("content cannot be empty"));
    }

    if content.len() > MAX_CONTENT_LENGTH {
        return Err(anyhow!(
            "content too long: {} chars (max: {})",
            content.len(),
            MAX_CONTENT_LENGTH
        ));
    }

    Ok(())
}

/// Validate a candidate or entry title
pub fn validate_title(title: &str) -> Result<()> {
    if title.trim().is_empty() {
        return Err(anyhow!("title cannot be empty"));
    }

    if title.len() > MAX_TITLE_LENGTH {
        return Err(anyhow!(
            "title too long: {} chars (max: {})",
            title.len(),
            MAX_TITLE_LENGTH
        ));
    }

    Ok(())
}

/// Validate confidence threshold
pub fn validate_confidence_threshold(threshold: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(anyhow!(
            "confidence_threshold must be between 0.0 and 1.0, got: {threshold}"
        ));
    }
    Ok(())
}

/// Validate the activities list attached to an analysis request
pub fn validate_activities(activities: &[String]) -> Result<()> {
    if activities.len() > MAX_ACTIVITIES {
        return Err(anyhow!(
            "too many activities: {} (max: {})",
            activities.len(),
            MAX_ACTIVITIES
        ));
    }

    for activity in activities {
        if activity.trim().is_empty() {
            return Err(anyhow!("activity labels cannot be empty"));
        }
        if activity.len() > MAX_TITLE_LENGTH {
            return Err(anyhow!("activity label too long: {} chars", activity.len()));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_user_id() {
        assert!(validate_user_id("alice").is_ok());
        assert!(validate_user_id("user-123").is_ok());
        assert!(validate_user_id("test_user").is_ok());
        assert!(validate_user_id("user@example.com").is_ok());
    }

    #[test]
    fn test_invalid_user_id() {
        assert!(validate_user_id("").is_err()); // empty
        assert!(validate_user_id("user/123").is_err()); // invalid char
        assert!(validate_user_id(&"a".repeat(200)).is_err()); // too long
    }

    #[test]
    fn test_valid_content() {
        assert!(validate_content("Today was a good day.").is_ok());
    }

    #[test]
    fn test_invalid_content() {
        assert!(validate_content("").is_err());
        assert!(validate_content("   \n\t ").is_err()); // whitespace only
        assert!(validate_content(&"x".repeat(100_000)).is_err()); // too long
    }

    #[test]
    fn test_title() {
        assert!(validate_title("Buy groceries").is_ok());
        assert!(validate_title("").is_err());
        assert!(validate_title(&"t".repeat(600)).is_err());
    }

    #[test]
    fn test_confidence_threshold() {
        assert!(validate_confidence_threshold(0.0).is_ok());
        assert!(validate_confidence_threshold(0.5).is_ok());
        assert!(validate_confidence_threshold(1.0).is_ok());
        assert!(validate_confidence_threshold(-0.1).is_err());
        assert!(validate_confidence_threshold(1.5).is_err());
    }

    #[test]
    fn test_activities() {
        assert!(validate_activities(&["running".to_string()]).is_ok());
        assert!(validate_activities(&[]).is_ok());
        assert!(validate_activities(&["".to_string()]).is_err());

        let too_many: Vec<String> = (0..50).map(|i| format!("activity{i}")).collect();
        assert!(validate_activities(&too_many).is_err());
    }
}
