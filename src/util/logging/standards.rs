//! Centralised logging metadata (event names, shared keys, etc.).

/// Canonical event names used across the service.
pub mod events {
    /// Build metadata resolution.
    pub const RESOLVER_INIT: &str = "provenance.resolver_init";
    pub const RESOLVE_COMPLETE: &str = "provenance.resolve_complete";
    pub const VCS_QUERY_FAILED: &str = "provenance.vcs_query_failed";
    pub const REMOTE_UNRECOGNIZED: &str = "provenance.remote_unrecognized";

    /// Receipt page output.
    pub const PAGE_RENDERED: &str = "page.rendered";
    pub const PAGE_WRITTEN: &str = "page.written";

    /// HTTP request lifecycle.
    pub const REQUEST_PAGE: &str = "request.page";
    pub const REQUEST_META: &str = "request.meta";
    pub const REQUEST_ERROR: &str = "request.error";

    /// Logging subsystem.
    pub const LOG_INIT: &str = "log.init";
    pub const LOG_RETENTION: &str = "log.retention";

    /// Configuration.
    pub const CONFIG_LOADED: &str = "config.load.success";
    pub const CONFIG_TEMPLATE_WRITTEN: &str = "config.template.written";
    pub const CONFIG_INVALID: &str = "config.invalid";

    pub const PANIC_RAISED: &str = "panic.raised";
}
