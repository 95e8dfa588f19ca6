//! Logging macros used across the crate, and the error report hook for
//! binaries.
pub use color_eyre::eyre::eyre;
pub use tracing::{debug, error, info, trace, warn};

/// Frames from these crates are runtime and HTTP plumbing, never console
/// code, so reports leave them out.
const PLUMBING_FRAMES: &[&str] = &[
    "tokio::",
    "tracing::",
    "color_eyre::",
    "reqwest::",
    "hyper::",
    "<core::",
];

fn is_plumbing(name: Option<&str>) -> bool {
    name.is_some_and(|name| PLUMBING_FRAMES.iter().any(|prefix| name.starts_with(prefix)))
}

/// Install color_eyre as the global error handler.
#[tracing::instrument]
pub fn install_color_eyre() -> color_eyre::eyre::Result<()> {
    color_eyre::config::HookBuilder::default()
        .display_env_section(false)
        .add_default_filters()
        .add_frame_filter(Box::new(|frames| {
            frames.retain(|frame| !is_plumbing(frame.name.as_deref()));
        }))
        .install()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_that_only_plumbing_frames_are_filtered() {
        assert!(is_plumbing(Some("tokio::runtime::task::harness::poll")));
        assert!(is_plumbing(Some("reqwest::async_impl::client::execute")));
        assert!(!is_plumbing(Some("deck::console::driver::Console::run")));
        assert!(!is_plumbing(None));
    }
}
