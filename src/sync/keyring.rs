use std::collections::HashMap;

pub(crate) const SERVICE_NAME: &str = "taskflow";
const ANTHROPIC_SERVER: &str = "anthropic-api";

/// Environment variable checked before the keyring.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

fn attributes(server: &str) -> HashMap<&str, &str> {
    let mut attrs = HashMap::new();
    attrs.insert("service", SERVICE_NAME);
    attrs.insert("server", server);
    attrs
}

/// Store the Anthropic API key in the system keyring via Secret Service.
pub async fn store_api_key(key: &str) -> Result<(), String> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {}", e))?;

    keyring
        .create_item(
            "TaskFlow Anthropic API Key",
            &attributes(ANTHROPIC_SERVER),
            key.trim().as_bytes(),
            true, // replace existing
        )
        .await
        .map_err(|e| format!("Failed to store API key: {}", e))?;

    Ok(())
}

/// Load the Anthropic API key from the system keyring.
pub async fn load_api_key() -> Result<Option<String>, String> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {}", e))?;

    let items = keyring
        .search_items(&attributes(ANTHROPIC_SERVER))
        .await
        .map_err(|e| format!("Failed to search keyring: {}", e))?;

    if let Some(item) = items.first() {
        let secret_bytes = item
            .secret()
            .await
            .map_err(|e| format!("Failed to read secret: {}", e))?;
        let key = String::from_utf8(secret_bytes.to_vec())
            .map_err(|e| format!("Invalid UTF-8 in secret: {}", e))?;
        if !key.is_empty() {
            return Ok(Some(key));
        }
    }

    Ok(None)
}

/// Delete the Anthropic API key from the system keyring.
pub async fn delete_api_key() -> Result<(), String> {
    let keyring = oo7::Keyring::new()
        .await
        .map_err(|e| format!("Failed to connect to keyring: {}", e))?;

    let items = keyring
        .search_items(&attributes(ANTHROPIC_SERVER))
        .await
        .map_err(|e| format!("Failed to search keyring: {}", e))?;

    for item in items {
        item.delete()
            .await
            .map_err(|e| format!("Failed to delete API key: {}", e))?;
    }

    Ok(())
}

/// Environment first, then keyring. Keyring failures are logged and treated as "no key".
pub async fn resolve_api_key() -> Option<String> {
    if let Some(key) = key_from_env(std::env::var(API_KEY_ENV).ok()) {
        return Some(key);
    }
    match load_api_key().await {
        Ok(key) => key,
        Err(e) => {
            log::warn!("Could not read API key from keyring: {}", e);
            None
        }
    }
}

fn key_from_env(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_key_must_be_non_blank() {
        assert_eq!(key_from_env(None), None);
        assert_eq!(key_from_env(Some("   ".to_string())), None);
        assert_eq!(
            key_from_env(Some(" sk-abc \n".to_string())),
            Some("sk-abc".to_string())
        );
    }

    #[test]
    fn attributes_scope_the_service() {
        let attrs = attributes(ANTHROPIC_SERVER);
        assert_eq!(attrs.get("service"), Some(&SERVICE_NAME));
        assert_eq!(attrs.get("server"), Some(&ANTHROPIC_SERVER));
    }
}
