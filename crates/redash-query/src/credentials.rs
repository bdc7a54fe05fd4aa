use crate::error::{QueryError, Result};

/// Redash endpoint and API key, validated once and then shared read-only
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    base_url: String,
    api_key: String,
}

impl Credentials {
    /// Build credentials from raw, possibly absent settings.
    ///
    /// Absent or blank values are a configuration error; a trailing `/` on
    /// the base URL is dropped so endpoint paths can be appended directly.
    pub fn from_parts(base_url: Option<String>, api_key: Option<String>) -> Result<Self> {
        let base_url = base_url
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());
        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        match (base_url, api_key) {
            (Some(base_url), Some(api_key)) => Ok(Self { base_url, api_key }),
            _ => Err(QueryError::Configuration(
                "Redash URL and API key must be configured".to_string(),
            )),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Value of the `Authorization` header sent with every request
    pub fn authorization(&self) -> String {
        format!("Key {}", self.api_key)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("api_key", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_credentials() {
        let creds = Credentials::from_parts(
            Some("https://redash.example.com/".to_string()),
            Some("secret".to_string()),
        )
        .unwrap();

        assert_eq!(creds.base_url(), "https://redash.example.com");
        assert_eq!(creds.authorization(), "Key secret");
    }

    #[test]
    fn test_missing_url_is_configuration_error() {
        let err = Credentials::from_parts(None, Some("secret".to_string())).unwrap_err();
        assert!(matches!(err, QueryError::Configuration(_)));
    }

    #[test]
    fn test_blank_key_is_configuration_error() {
        let err = Credentials::from_parts(
            Some("https://redash.example.com".to_string()),
            Some("   ".to_string()),
        )
        .unwrap_err();
        assert!(matches!(err, QueryError::Configuration(_)));
    }

    #[test]
    fn test_debug_hides_api_key() {
        let creds = Credentials::from_parts(
            Some("https://redash.example.com".to_string()),
            Some("secret".to_string()),
        )
        .unwrap();

        assert!(!format!("{:?}", creds).contains("secret"));
    }
}
