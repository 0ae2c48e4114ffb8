//! Medication reminder endpoints.

use pharma_core::{CoreError, Reminder, ReminderLog, ValidationError};
use reqwest::Method;
use serde::Deserialize;

use crate::error::ClientResult;
use crate::http::BackendClient;

#[derive(Deserialize)]
#[serde(untagged)]
enum RemindersResponse {
    Bare(Vec<Reminder>),
    Wrapped { reminders: Vec<Reminder> },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ReminderLogsResponse {
    Bare(Vec<ReminderLog>),
    Wrapped { logs: Vec<ReminderLog> },
}

fn validate_reminder(reminder: &Reminder) -> Result<(), ValidationError> {
    if reminder.title.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "title".to_string(),
        });
    }
    if reminder.title.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "title".to_string(),
            max: 200,
        });
    }
    if reminder.schedule_time.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "schedule_time".to_string(),
        });
    }
    Ok(())
}

impl BackendClient {
    /// `GET /reminders`
    pub async fn list_reminders(&self) -> ClientResult<Vec<Reminder>> {
        let builder = self.request(Method::GET, &["reminders"])?;
        Ok(match self.send_json::<RemindersResponse>(builder).await? {
            RemindersResponse::Bare(r) | RemindersResponse::Wrapped { reminders: r } => r,
        })
    }

    /// `GET /admin/reminders`
    pub async fn list_all_reminders(&self) -> ClientResult<Vec<Reminder>> {
        let builder = self.request(Method::GET, &["admin", "reminders"])?;
        Ok(match self.send_json::<RemindersResponse>(builder).await? {
            RemindersResponse::Bare(r) | RemindersResponse::Wrapped { reminders: r } => r,
        })
    }

    /// `POST /reminders`
    pub async fn create_reminder(&self, reminder: &Reminder) -> ClientResult<Reminder> {
        validate_reminder(reminder).map_err(CoreError::from)?;
        let builder = self.request(Method::POST, &["reminders"])?.json(reminder);
        self.send_json(builder).await
    }

    /// `PUT /reminders/{id}`
    pub async fn update_reminder(&self, id: &str, reminder: &Reminder) -> ClientResult<Reminder> {
        validate_reminder(reminder).map_err(CoreError::from)?;
        let builder = self
            .request(Method::PUT, &["reminders", id])?
            .json(reminder);
        self.send_json(builder).await
    }

    /// `DELETE /reminders/{id}`
    pub async fn delete_reminder(&self, id: &str) -> ClientResult<()> {
        let builder = self.request(Method::DELETE, &["reminders", id])?;
        self.send_empty(builder).await
    }

    /// `PATCH /reminders/{id}` with an empty body flips `is_active`.
    pub async fn toggle_reminder(&self, id: &str) -> ClientResult<Reminder> {
        let builder = self.request(Method::PATCH, &["reminders", id])?;
        self.send_json(builder).await
    }

    /// `GET /reminders/{id}/logs`
    pub async fn reminder_logs(&self, id: &str) -> ClientResult<Vec<ReminderLog>> {
        let builder = self.request(Method::GET, &["reminders", id, "logs"])?;
        Ok(match self.send_json::<ReminderLogsResponse>(builder).await? {
            ReminderLogsResponse::Bare(l) | ReminderLogsResponse::Wrapped { logs: l } => l,
        })
    }
}
