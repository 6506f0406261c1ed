use std::{
    future::Future,
    time::{Duration, Instant},
};

/// Run `operation` to completion and report its wall-clock duration,
/// including any time spent suspended.
pub async fn timed<F, T>(operation: F) -> (Duration, T)
where
    F: Future<Output = T>,
{
    let start = Instant::now();
    let value = operation.await;
    (start.elapsed(), value)
}
