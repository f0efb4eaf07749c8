use tokio::select;
use tokio_util::sync::CancellationToken;

/// Cancels `cancellation` on Ctrl-C. Returns early if something else cancelled it first, so it
/// can be joined with the work it guards.
pub async fn detect_shutdown(cancellation: CancellationToken) {
    select! {
        _ = tokio::signal::ctrl_c() => {
            cancellation.cancel();
        },
        _ = cancellation.cancelled() => (),
    };
}
