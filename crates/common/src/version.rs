use std::fmt;

use serde::Serialize;

/// Version and build details of the running binary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildInfo {
    pub version: &'static str,
    pub build_profile: &'static str,
    pub build_features: Vec<&'static str>,
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "santa {} ({})", self.version, self.build_profile)?;
        if !self.build_features.is_empty() {
            write!(f, " [{}]", self.build_features.join(", "))?;
        }
        Ok(())
    }
}

pub fn build_info() -> BuildInfo {
    let build_profile = if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    };

    let mut build_features = Vec::new();
    if cfg!(test) {
        build_features.push("test");
    }

    BuildInfo {
        version: env!("CARGO_PKG_VERSION"),
        build_profile,
        build_features,
    }
}

/// Build info for the crate invoking the macro, e.g. a binary
#[macro_export]
macro_rules! build_info {
    () => {
        $crate::version::BuildInfo {
            version: env!("CARGO_PKG_VERSION"),
            build_profile: if cfg!(debug_assertions) {
                "debug"
            } else {
                "release"
            },
            build_features: Vec::new(),
        }
    };
}
