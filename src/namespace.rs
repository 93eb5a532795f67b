use std::fmt;
use clap::ValueEnum;

/// Deployment namespaces get their own working subdirectory, so a dev
/// submission can never touch prod job state
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum PlatformNamespace {
    Dev,
    Test,
    Prod
}

impl fmt::Display for PlatformNamespace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlatformNamespace::Dev => write!(f, "dev"),
            PlatformNamespace::Test => write!(f, "test"),
            PlatformNamespace::Prod => write!(f, "prod")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespace_directory_names_are_lowercase() {
        assert_eq!(PlatformNamespace::Dev.to_string(), "dev");
        assert_eq!(PlatformNamespace::Prod.to_string(), "prod");
    }
}
