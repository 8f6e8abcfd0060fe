//! Bounded fixed-delay polling against eventually consistent state.

use std::future::Future;

use crate::application::ports::Sleeper;
use crate::domain::RetryPolicy;

/// What a single probe observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    /// The awaited value is available.
    Ready(T),
    /// Not there yet; try again after the policy delay.
    Pending,
    /// Waiting cannot help; stop without retrying.
    Abandon,
}

/// How a polling run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollResult<T> {
    Ready { value: T, attempts: u32 },
    Abandoned { attempts: u32 },
    Exhausted { attempts: u32 },
}

impl<T> PollResult<T> {
    pub fn into_value(self) -> Option<T> {
        match self {
            Self::Ready { value, .. } => Some(value),
            Self::Abandoned { .. } | Self::Exhausted { .. } => None,
        }
    }
}

/// Run `probe` until it reports `Ready` or `Abandon`, or until
/// `policy.max_attempts` probes have been made.
///
/// `probe` receives the 1-based attempt number. The sleeper is called
/// between attempts only, so `n` probes cost `n - 1` delays.
///
/// # Errors
///
/// Returns the first error a probe reports; probing stops there.
pub async fn poll_until<T, E, F, Fut>(
    policy: RetryPolicy,
    sleeper: &impl Sleeper,
    mut probe: F,
) -> Result<PollResult<T>, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Probe<T>, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    for attempt in 1..=max_attempts {
        match probe(attempt).await? {
            Probe::Ready(value) => return Ok(PollResult::Ready { value, attempts: attempt }),
            Probe::Abandon => return Ok(PollResult::Abandoned { attempts: attempt }),
            Probe::Pending if attempt < max_attempts => {
                tracing::debug!(attempt, max_attempts, delay = ?policy.delay, "not ready, retrying");
                sleeper.sleep(policy.delay).await;
            }
            Probe::Pending => {}
        }
    }
    Ok(PollResult::Exhausted {
        attempts: max_attempts,
    })
}
