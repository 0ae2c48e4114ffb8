//! # Application State
//!
//! Everything a command needs, built once per invocation.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  AppState                                                               │
//! │  ├── config: ClientConfig    (defaults → pharmacart.toml → PHARMA_*)    │
//! │  └── token: Option<String>   (--token / PHARMA_TOKEN)                   │
//! │                                                                         │
//! │  storefront() ──► Storefront<FileStorage>  (cart from <data_dir>/cart)  │
//! │  admin()      ──► Admin                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use pharma_client::{Admin, BackendClient, ClientConfig, Credential, FileStorage, Storefront};
use pharma_core::CartStore;
use tracing::debug;

use crate::error::{CliError, CliResult, ErrorCode};

#[derive(Debug, Clone)]
pub struct AppState {
    pub config: ClientConfig,
    token: Option<String>,
}

impl AppState {
    pub fn new(config: ClientConfig, token: Option<String>) -> Self {
        AppState { config, token }
    }

    fn client(&self) -> CliResult<BackendClient> {
        let client = BackendClient::new(&self.config.backend)?;
        let credential = self.token.as_deref().and_then(Credential::new);
        Ok(client.with_credential(credential))
    }

    /// Opens the cart persisted under the configured data directory.
    pub fn open_cart(&self) -> CliResult<CartStore<FileStorage>> {
        let dir = self.config.data_dir().ok_or_else(|| {
            CliError::new(
                ErrorCode::ConfigError,
                "No data directory available; set PHARMA_DATA_DIR",
            )
        })?;
        debug!(dir = %dir.display(), "Opening cart storage");
        let storage = FileStorage::open(dir)?;
        Ok(CartStore::open(storage)?)
    }

    pub fn storefront(&self) -> CliResult<Storefront<FileStorage>> {
        let cart = self.open_cart()?;
        Ok(Storefront::new(
            self.client()?,
            cart,
            self.config.pricing.clone(),
        ))
    }

    /// Back-office session. Requires a token.
    pub fn admin(&self) -> CliResult<Admin> {
        let client = self.client()?;
        if client.credential().is_none() {
            return Err(CliError::new(
                ErrorCode::AuthRequired,
                "Admin commands need a token (--token or PHARMA_TOKEN)",
            ));
        }
        Ok(Admin::new(client))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pharma_core::{CartItem, Money};
    use tempfile::TempDir;

    fn state(dir: &TempDir, token: Option<&str>) -> AppState {
        let mut config = ClientConfig::default();
        config.storage.data_dir = Some(dir.path().to_path_buf());
        AppState::new(config, token.map(str::to_string))
    }

    #[test]
    fn test_cart_survives_between_invocations() {
        let dir = TempDir::new().unwrap();

        let mut first = state(&dir, None).storefront().unwrap();
        first
            .add_to_cart(CartItem::new("vit-c", "Vitamin C", Money::from_cents(1299), 2))
            .unwrap();
        drop(first);

        let second = state(&dir, None).storefront().unwrap();
        assert_eq!(second.cart().item_count(), 2);
        assert_eq!(second.cart().total(), Money::from_cents(2598));
    }

    #[test]
    fn test_token_signs_in() {
        let dir = TempDir::new().unwrap();
        assert!(state(&dir, Some("abc")).storefront().unwrap().is_signed_in());
        assert!(!state(&dir, Some("  ")).storefront().unwrap().is_signed_in());
    }

    #[test]
    fn test_admin_requires_token() {
        let dir = TempDir::new().unwrap();
        let err = state(&dir, None).admin().unwrap_err();
        assert_eq!(err.code, ErrorCode::AuthRequired);
        assert!(state(&dir, Some("admin-token")).admin().is_ok());
    }
}
