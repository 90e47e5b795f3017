use anyhow::Result;

/// The report is a single sequential run, so a current-thread runtime is all the HTTP client needs.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}
