use tracing::{debug, info, warn};

use crate::http::ApiRequest;
use crate::session::Session;

impl Session {
    /// Poll the health endpoint until the backend answers successfully.
    /// Returns `false` once the configured attempt limit is used up.
    pub async fn wait_until_ready(&self) -> bool {
        let interval = self.options().health_poll_interval;
        let max_attempts = self.options().health_max_attempts.max(1);
        for attempt in 1..=max_attempts {
            match self.send(ApiRequest::get("/administration/health/")).await {
                Ok(_) => {
                    info!(attempt, "backend ready");
                    return true;
                }
                Err(err) => debug!(attempt, ?err, "backend not ready"),
            }
            if attempt < max_attempts {
                tokio::time::sleep(interval).await;
            }
        }
        warn!(max_attempts, "backend did not become ready");
        false
    }
}
