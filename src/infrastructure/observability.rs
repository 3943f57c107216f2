use tracing_subscriber::EnvFilter;

/// Logs go to stderr; stdout is reserved for the deployment report.
pub fn init_tracing() {
    let use_json = std::env::var("LOG_JSON").map(|v| v == "true").unwrap_or(false);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if use_json {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_safe() {
        init_tracing();
        init_tracing();
    }
}
