use anyhow::Result;

/// Everything tapclock does happens on one thread: a tap, a refresh tick, a file write.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
