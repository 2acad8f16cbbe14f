use std::collections::HashMap;

use crate::config::Credentials;
use crate::error::{Error, Result};

pub(crate) const SERVICE_NAME: &str = "ticktick-sync";

fn attributes(account: &str) -> HashMap<&str, &str> {
    let mut attrs = HashMap::new();
    attrs.insert("service", SERVICE_NAME);
    attrs.insert("account", account);
    attrs
}

async fn open() -> Result<oo7::Keyring> {
    oo7::Keyring::new()
        .await
        .map_err(|e| Error::Keyring(format!("Failed to connect to keyring: {}", e)))
}

/// Store TickTick credentials in the system keyring via Secret Service.
///
/// `account` names the entry, normally the API host.
pub async fn store_credentials(account: &str, credentials: &Credentials) -> Result<()> {
    let keyring = open().await?;
    let secret = encode_secret(credentials);

    keyring
        .create_item(
            &format!("TickTick ({})", account),
            &attributes(account),
            secret.as_bytes(),
            true, // replace existing
        )
        .await
        .map_err(|e| Error::Keyring(format!("Failed to store credentials: {}", e)))?;

    Ok(())
}

/// Load TickTick credentials from the system keyring.
pub async fn load_credentials(account: &str) -> Result<Option<Credentials>> {
    let keyring = open().await?;

    let items = keyring
        .search_items(&attributes(account))
        .await
        .map_err(|e| Error::Keyring(format!("Failed to search keyring: {}", e)))?;

    if let Some(item) = items.first() {
        let secret_bytes = item
            .secret()
            .await
            .map_err(|e| Error::Keyring(format!("Failed to read secret: {}", e)))?;
        let secret = String::from_utf8(secret_bytes.to_vec())
            .map_err(|e| Error::Keyring(format!("Invalid UTF-8 in secret: {}", e)))?;
        return Ok(parse_secret(&secret));
    }

    Ok(None)
}

pub async fn delete_credentials(account: &str) -> Result<()> {
    let keyring = open().await?;

    let items = keyring
        .search_items(&attributes(account))
        .await
        .map_err(|e| Error::Keyring(format!("Failed to search keyring: {}", e)))?;

    for item in items {
        item.delete()
            .await
            .map_err(|e| Error::Keyring(format!("Failed to delete credential: {}", e)))?;
    }

    Ok(())
}

fn encode_secret(credentials: &Credentials) -> String {
    format!("{}:{}", credentials.username, credentials.password)
}

/// Usernames are emails, so split on the first colon only.
fn parse_secret(secret: &str) -> Option<Credentials> {
    let (username, password) = secret.split_once(':')?;
    if username.is_empty() {
        return None;
    }
    Some(Credentials::new(username, password))
}
