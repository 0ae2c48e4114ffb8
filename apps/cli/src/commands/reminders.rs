//! # Reminder Commands
//!
//! Medication reminders for the signed-in customer.

use pharma_client::Storefront;
use pharma_core::{CartStorage, Reminder, ReminderLog};
use serde::Serialize;

use crate::error::{CliError, CliResult};

pub async fn list<S: CartStorage>(shop: &Storefront<S>) -> CliResult<Vec<Reminder>> {
    shop.reminders()
        .await
        .map_err(|e| CliError::from_client(e, "Failed to load reminders."))
}

/// Creates an active reminder.
pub async fn create<S: CartStorage>(
    shop: &Storefront<S>,
    title: &str,
    description: Option<&str>,
    schedule_time: &str,
) -> CliResult<Reminder> {
    let reminder = Reminder {
        id: None,
        customer_id: None,
        title: title.trim().to_string(),
        description: description.unwrap_or_default().trim().to_string(),
        schedule_time: schedule_time.trim().to_string(),
        is_active: true,
    };
    shop.create_reminder(&reminder)
        .await
        .map_err(|e| CliError::from_client(e, "Failed to create reminder."))
}

pub async fn toggle<S: CartStorage>(shop: &Storefront<S>, id: &str) -> CliResult<Reminder> {
    shop.toggle_reminder(id)
        .await
        .map_err(|e| CliError::from_client(e, "Failed to update reminder."))
}

#[derive(Debug, Clone, Serialize)]
pub struct Deleted {
    pub id: String,
    pub deleted: bool,
}

pub async fn delete<S: CartStorage>(shop: &Storefront<S>, id: &str) -> CliResult<Deleted> {
    shop.delete_reminder(id)
        .await
        .map_err(|e| CliError::from_client(e, "Failed to delete reminder."))?;
    Ok(Deleted {
        id: id.to_string(),
        deleted: true,
    })
}

pub async fn logs<S: CartStorage>(shop: &Storefront<S>, id: &str) -> CliResult<Vec<ReminderLog>> {
    shop.reminder_logs(id)
        .await
        .map_err(|e| CliError::from_client(e, "Failed to load reminder history."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use pharma_client::{BackendClient, BackendSettings, Credential};
    use pharma_core::{CartStore, MemoryStorage, PricingPolicy};

    #[tokio::test]
    async fn test_blank_title_rejected_before_request() {
        let client = BackendClient::new(&BackendSettings {
            url: "http://127.0.0.1:9".to_string(),
            ..BackendSettings::default()
        })
        .unwrap();
        let cart = CartStore::open(MemoryStorage::new()).unwrap();
        let mut shop = Storefront::new(client, cart, PricingPolicy::default());
        shop.sign_in(Credential::new("token").unwrap());

        let err = create(&shop, "   ", None, "08:00").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
