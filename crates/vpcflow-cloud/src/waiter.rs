//! NAT gateway deletion wait (exponential backoff)
//!
//! NAT gateway deletion is asynchronous on the provider side, and deleting
//! the subnet or VPC underneath a gateway that is still draining fails. The
//! decommissioner therefore polls until the gateway reports `deleted`.

use crate::error::Result;
use crate::provider::{NatGatewayState, NetworkProvider};
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// Polling schedule: the delay starts at `initial_delay` and is multiplied
/// by `multiplier` after each attempt, capped at `max_delay`.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: f64,
    /// Give up after this long; `None` waits until a terminal state
    pub timeout: Option<Duration>,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
            timeout: None,
        }
    }
}

impl WaitConfig {
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Delay before the poll following `attempt` (zero-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.max(1.0).powi(attempt.min(64) as i32);
        let delay = self.initial_delay.as_secs_f64() * factor;
        Duration::try_from_secs_f64(delay)
            .map(|delay| delay.min(self.max_delay))
            .unwrap_or(self.max_delay)
    }
}

/// How a wait ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    Deleted { polls: u32 },
    TimedOut { polls: u32, last_state: NatGatewayState },
}

/// Poll until the NAT gateway reports `deleted` or the timeout elapses.
///
/// Non-terminal observations (`pending`, `available`, `deleting`, `failed`)
/// are tolerated. A failing describe call is returned as an error.
pub async fn wait_for_nat_gateway_deletion<P>(
    provider: &P,
    nat_gateway_id: &str,
    config: &WaitConfig,
) -> Result<WaitOutcome>
where
    P: NetworkProvider + ?Sized,
{
    let started = Instant::now();
    let mut attempt = 0u32;
    loop {
        let state = provider.describe_nat_gateway(nat_gateway_id).await?;
        let polls = attempt + 1;
        if state.is_deleted() {
            debug!(nat_gateway_id, polls, "NAT gateway deleted");
            return Ok(WaitOutcome::Deleted { polls });
        }

        let delay = config.delay_for_attempt(attempt);
        if let Some(timeout) = config.timeout {
            if started.elapsed() + delay > timeout {
                return Ok(WaitOutcome::TimedOut {
                    polls,
                    last_state: state,
                });
            }
        }

        debug!(
            nat_gateway_id,
            state = %state,
            delay_ms = delay.as_millis() as u64,
            "NAT gateway not deleted yet"
        );
        sleep(delay).await;
        attempt += 1;
    }
}
