//! OS keychain storage for the photo service access key.

use anyhow::{Context, Result};
use keyring::Entry;

const SERVICE_NAME: &str = "travelbuddy";

/// Keychain account holding the Unsplash access key.
const PHOTO_KEY_ACCOUNT: &str = "unsplash_access_key";

pub struct CredentialStore;

impl CredentialStore {
    pub fn store_photo_key(key: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, PHOTO_KEY_ACCOUNT)
            .context("Failed to create keyring entry")?;
        entry
            .set_password(key.trim())
            .context("Failed to store access key in keychain")?;
        Ok(())
    }

    /// `None` when nothing is stored or the keychain is unavailable.
    pub fn photo_key() -> Option<String> {
        let entry = Entry::new(SERVICE_NAME, PHOTO_KEY_ACCOUNT).ok()?;
        entry.get_password().ok()
    }

    pub fn delete_photo_key() -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, PHOTO_KEY_ACCOUNT)
            .context("Failed to create keyring entry")?;
        entry
            .delete_credential()
            .context("Failed to delete access key from keychain")?;
        Ok(())
    }
}
