//! Process-wide subscriber installation

use std::sync::Once;

use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Output style of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Compact human-readable lines, debug level
    Development,
    /// One JSON object per event, info level
    Production,
    /// Nothing is printed; `init_test_capture()` supplies the layer
    Test,
}

impl Profile {
    fn directive(self) -> &'static str {
        match self {
            Profile::Development => "gedgraph_core=debug",
            Profile::Production => "gedgraph_core=info",
            Profile::Test => "gedgraph_core=trace",
        }
    }

    /// `RUST_LOG` when set, otherwise the profile's own directive
    fn filter(self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directive()))
    }
}

static INSTALLED: Once = Once::new();

/// Install the global subscriber for `profile`
///
/// Only the first call in a process has an effect. A subscriber installed
/// by the host application is left in place.
pub fn init(profile: Profile) {
    INSTALLED.call_once(|| {
        // an error only means the host application already owns the process
        match profile {
            Profile::Development => {
                let _ = tracing_subscriber::fmt()
                    .compact()
                    .with_env_filter(profile.filter())
                    .try_init();
            }
            Profile::Production => {
                let _ = tracing_subscriber::fmt()
                    .json()
                    .flatten_event(true)
                    .with_env_filter(profile.filter())
                    .try_init();
            }
            Profile::Test => {
                let _ = tracing_subscriber::registry().try_init();
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_is_harmless() {
        init(Profile::Test);
        init(Profile::Production);
    }

    #[test]
    fn test_directives_target_this_crate() {
        for profile in [Profile::Development, Profile::Production, Profile::Test] {
            assert!(profile.directive().starts_with("gedgraph_core="));
        }
        assert_ne!(Profile::Development.directive(), Profile::Production.directive());
    }
}
