use std::time::Duration;

use tokio::time::sleep;

/// Linear backoff: `base_backoff * attempt`, saturating. Attempt zero waits
/// nothing.
pub(crate) fn calculate_retry_delay(base_backoff: Duration, attempt: u8) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    base_backoff.saturating_mul(u32::from(attempt))
}

pub(crate) async fn sleep_with_backoff(backoff: Duration) {
    if backoff.is_zero() {
        return;
    }

    sleep(backoff).await;
}
