/// Build-time metadata of this binary, stamped by build.rs.
///
/// Not to be confused with [`crate::provenance`], which resolves the
/// provenance of the deployment being advertised at request time.
pub const BUILD_VERSION: &str = env!("APP_BUILD_VERSION");
pub const BUILD_COMMIT: &str = env!("APP_BUILD_COMMIT");
pub const BUILD_TIMESTAMP: &str = env!("APP_BUILD_TIMESTAMP");

/// Human-readable summary combining Cargo version and build metadata.
pub fn summary() -> String {
    format!(
        "{} (build {}, commit {}, built at {})",
        env!("CARGO_PKG_VERSION"),
        BUILD_VERSION,
        BUILD_COMMIT,
        BUILD_TIMESTAMP
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_mentions_every_stamp() {
        let text = summary();
        assert!(text.starts_with(env!("CARGO_PKG_VERSION")));
        assert!(text.contains(BUILD_COMMIT));
        assert!(text.contains(BUILD_TIMESTAMP));
    }
}
