//! Wait for asynchronously rendered text to stop changing.

use crate::Result;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep_until, timeout_at, Instant};
use tracing::debug;

/// Outcome of a stabilization watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stabilization {
    /// Settled text, or the last sample taken if the ceiling was reached.
    pub text: String,
    /// Whether the text settled before the ceiling.
    pub settled: bool,
    /// Number of samples that completed.
    pub samples: u32,
}

/// Sample text every `interval` until it settles or `ceiling` elapses.
///
/// Settled means the previous sample was empty and the current one is not,
/// or the current sample is non-empty and equal to the previous one. If the
/// last regular sample lands before the ceiling, one more is taken at the
/// ceiling, so the text returned is as of the ceiling. Samples are cut off at
/// the ceiling; the final one gets at most one `interval`. Sampling errors
/// propagate.
pub async fn watch<F, Fut>(mut sample: F, interval: Duration, ceiling: Duration) -> Result<Stabilization>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String>>,
{
    let deadline = Instant::now() + ceiling;
    let mut samples = 0;

    let mut previous = match timeout_at(deadline, sample()).await {
        Ok(text) => text?,
        Err(_) => {
            return Ok(Stabilization {
                text: String::new(),
                settled: false,
                samples,
            })
        }
    };
    samples += 1;

    loop {
        let next = Instant::now() + interval;
        let last = next > deadline;
        if last {
            if Instant::now() >= deadline {
                break;
            }
            sleep_until(deadline).await;
        } else {
            sleep_until(next).await;
        }

        let bound = if last { deadline + interval } else { deadline };
        let current = match timeout_at(bound, sample()).await {
            Ok(text) => text?,
            Err(_) => break,
        };
        samples += 1;
        debug!("Sample {}: {} chars", samples, current.len());

        if is_settled(&previous, &current) {
            return Ok(Stabilization {
                text: current,
                settled: true,
                samples,
            });
        }
        previous = current;
        if last {
            break;
        }
    }

    debug!("Text did not settle within {:?}", ceiling);
    Ok(Stabilization {
        text: previous,
        settled: false,
        samples,
    })
}

fn is_settled(previous: &str, current: &str) -> bool {
    let appeared = previous.is_empty() && !current.is_empty();
    let unchanged = !current.is_empty() && current == previous;
    appeared || unchanged
}
