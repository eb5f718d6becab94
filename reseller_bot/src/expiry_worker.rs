use log::*;
use reseller_engine::RechargeSessions;
use tokio::task::JoinHandle;

/// Starts the recharge session expiry worker. Do not await the returned JoinHandle, as it will run indefinitely.
pub fn start_expiry_worker(sessions: RechargeSessions, period: std::time::Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut timer = tokio::time::interval(period);
        info!("🕰️ Recharge session expiry worker started");
        loop {
            timer.tick().await;
            trace!("🕰️ Running recharge session expiry job");
            let purged = sessions.purge_expired();
            if purged > 0 {
                info!("🕰️ {purged} idle recharge sessions expired. {} still open", sessions.len());
            }
        }
    })
}
