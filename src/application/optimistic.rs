use crate::infrastructure::error::InfraError;
use std::future::Future;

/// A local write requested while an optimistic update is in flight.
#[derive(Debug)]
pub enum LocalWrite<'a, T> {
    /// Show `value` before the remote call resolves.
    Apply { value: &'a T },
    /// The remote accepted; `server` replaces `optimistic`.
    Commit { optimistic: &'a T, server: &'a T },
    /// The remote refused; `original` replaces `optimistic`.
    Revert { optimistic: &'a T, original: &'a T },
}

/// Apply locally, call remote, then reconcile or revert.
///
/// `write` is called with [`LocalWrite::Apply`] before `remote` is first
/// polled, then exactly once more with the outcome. The caller decides how a
/// write lands in its own state.
pub async fn apply_optimistic<T, W, Fut>(
    original: T,
    optimistic: T,
    mut write: W,
    remote: Fut,
) -> Result<T, InfraError>
where
    W: FnMut(LocalWrite<'_, T>),
    Fut: Future<Output = Result<T, InfraError>>,
{
    write(LocalWrite::Apply { value: &optimistic });
    match remote.await {
        Ok(server) => {
            write(LocalWrite::Commit {
                optimistic: &optimistic,
                server: &server,
            });
            Ok(server)
        }
        Err(error) => {
            write(LocalWrite::Revert {
                optimistic: &optimistic,
                original: &original,
            });
            Err(error)
        }
    }
}
