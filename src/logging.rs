//! Log output for the host binary and the test suites.
//!
//! Both entry points install one process-wide subscriber that filters through
//! `RUST_LOG`, falling back to a default level when the variable is unset or
//! unparseable. Whichever runs first wins; later calls are no-ops.

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Host logging: INFO by default, written to stderr so stdout stays free for results.
pub fn init() {
    install(Level::INFO, Target::Stderr);
}

/// Test logging: DEBUG by default, routed through the test harness capture.
///
/// Installed globally, so engine tasks on runtime worker threads log too.
pub fn init_for_tests() {
    install(Level::DEBUG, Target::TestHarness);
}

#[derive(Clone, Copy)]
enum Target {
    Stderr,
    TestHarness,
}

fn install(default_level: Level, target: Target) {
    INIT.call_once(|| {
        let filter = EnvFilter::builder()
            .with_default_directive(default_level.into())
            .from_env_lossy();

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_target(true)
            .compact();

        let installed = match target {
            Target::Stderr => builder.with_writer(std::io::stderr).try_init(),
            Target::TestHarness => builder.with_test_writer().try_init(),
        };
        if let Err(e) = installed {
            eprintln!("Failed to initialize logging: {}", e);
        }
    });
}
