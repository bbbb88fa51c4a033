//! Cooperative cancellation over a `watch<bool>` shutdown signal.

use std::time::Duration;

use tokio::sync::watch;

use crate::error::{Error, Result};

/// Sleep for `duration` unless `shutdown` turns true first.
///
/// # Errors
///
/// Returns [`Error::Cancelled`] when the shutdown signal wins.
pub async fn sleep_or_cancel(duration: Duration, shutdown: &mut watch::Receiver<bool>) -> Result<()> {
    if *shutdown.borrow() {
        return Err(Error::Cancelled);
    }
    tokio::select! {
        () = tokio::time::sleep(duration) => Ok(()),
        () = cancelled(shutdown) => Err(Error::Cancelled),
    }
}

/// Resolves once `shutdown` is true. Never resolves if the sender is gone.
pub async fn cancelled(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sleep_completes_without_signal() {
        let (_tx, mut rx) = watch::channel(false);
        assert!(sleep_or_cancel(Duration::from_secs(5), &mut rx).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_signal_interrupts_sleep() {
        let (tx, mut rx) = watch::channel(false);
        let started = tokio::time::Instant::now();
        let sleeper = tokio::spawn(async move { sleep_or_cancel(Duration::from_secs(60), &mut rx).await });

        tokio::time::sleep(Duration::from_secs(1)).await;
        tx.send(true).unwrap();
        let result = sleeper.await.unwrap();

        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(started.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_raised_signal_fails_fast() {
        let (tx, mut rx) = watch::channel(false);
        tx.send(true).unwrap();
        assert!(matches!(
            sleep_or_cancel(Duration::from_secs(60), &mut rx).await,
            Err(Error::Cancelled)
        ));
    }
}
