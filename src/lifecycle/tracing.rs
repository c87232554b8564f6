//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the global subscriber for the studio binary.
//! Log levels come from `RUST_LOG`; the compact format hides module paths and
//! shows span names inline.
//!
//! ## What Gets Traced
//!
//! - **Studio lifecycle**: startup, shutdown and the final tree size.
//! - **Reorders**: the applied move (`from`, `to`, `seq`), then `Reorder committed`,
//!   `Reorder failed, rolling back` or `Stale reorder response discarded`.
//! - **Expansion**: `Fetching children`, `Joining fetch in flight`, `Children loaded`, `Fetch failed`.
//! - **Backend**: every HTTP call runs inside a span carrying its URL.
//!
//! ## Usage Examples
//!
//! ```bash
//! # State changes only
//! RUST_LOG=info cargo run
//!
//! # Request payloads and ignored drags as well
//! RUST_LOG=debug cargo run
//!
//! # Only the studio actor
//! RUST_LOG=course_studio::studio=debug cargo run
//! ```
//!
//! With `RUST_LOG=info` a reorder that the server rejects reads:
//!
//! ```text
//! INFO reorder: Reorder applied key=paths active_id=D from=2 to=0 seq=1
//! WARN Reorder failed, rolling back key=paths seq=1 error=API error 500: boom
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
