use super::*;

use mymatch_application::LogoutOutcome;

impl ConsoleContext {
    pub(super) async fn login(&self, username: &str, password: &str) -> AppResult<Value> {
        self.auth_service.login(username, password).await?;
        info!(username, "logged in");

        Ok(json!({ "session": "active" }))
    }

    pub(super) async fn logout(&self) -> AppResult<Value> {
        match self.auth_service.logout().await? {
            LogoutOutcome::Acknowledged => {
                info!("logged out");
                Ok(json!({ "session": "closed", "backend": "acknowledged" }))
            }
            LogoutOutcome::LocalOnly { reason } => {
                warn!(reason = %reason, "backend logout skipped, local credentials cleared");
                Ok(json!({ "session": "closed", "backend": "skipped", "reason": reason }))
            }
        }
    }

    pub(super) async fn status(&self) -> AppResult<Value> {
        let active = self.auth_service.has_session().await?;

        Ok(json!({ "session": if active { "active" } else { "none" } }))
    }
}
