use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::otp::OtpManager;

/// Periodically reap expired codes for subjects that never come back to validate.
///
/// Must be called from within a tokio runtime. The first tick fires after one
/// full `every`.
pub fn spawn_sweeper(manager: OtpManager, every: Duration) -> JoinHandle<()> {
    info!(interval_secs = every.as_secs(), "otp sweeper enabled");
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let purged = manager.purge_expired();
            if purged > 0 {
                debug!(purged, remaining = manager.pending(), "swept expired otps");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sweeper_reaps_without_validate() {
        let m = OtpManager::new(Duration::from_millis(10));
        m.generate("+15550001");
        m.generate("+15550002");
        let handle = spawn_sweeper(m.clone(), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(m.pending(), 0);
        handle.abort();
    }
}
