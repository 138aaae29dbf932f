//! Parser limits

/// Default maximum element nesting depth
pub const DEFAULT_MAX_DEPTH: usize = 128;
/// Default maximum input size in bytes
pub const DEFAULT_MAX_SIZE: usize = 10 * 1024 * 1024;
/// Default number of physical lines a logical line may swallow with a space.
/// One continuation means an opening tag spans at most two physical lines.
pub const DEFAULT_MAX_CONTINUATION_LINES: usize = 1;

/// Configuration for the scanner
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Maximum nesting depth (0 means unlimited)
    pub max_depth: usize,
    /// Maximum input size in bytes (0 means unlimited)
    pub max_size: usize,
    /// Maximum space-joined continuation lines per logical line
    pub max_continuation_lines: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_size: DEFAULT_MAX_SIZE,
            max_continuation_lines: DEFAULT_MAX_CONTINUATION_LINES,
        }
    }
}

impl Config {
    /// Create a new config with unlimited depth and size
    pub const fn unlimited() -> Self {
        Self {
            max_depth: 0,
            max_size: 0,
            max_continuation_lines: DEFAULT_MAX_CONTINUATION_LINES,
        }
    }

    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub const fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub const fn with_max_continuation_lines(mut self, lines: usize) -> Self {
        self.max_continuation_lines = lines;
        self
    }

    pub(crate) const fn depth_exceeded(&self, depth: usize) -> bool {
        self.max_depth != 0 && depth > self.max_depth
    }

    pub(crate) const fn size_exceeded(&self, size: usize) -> bool {
        self.max_size != 0 && size > self.max_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.max_depth, 128);
        assert_eq!(config.max_size, 10 * 1024 * 1024);
        assert_eq!(config.max_continuation_lines, 1);
    }

    #[test]
    fn test_config_unlimited() {
        let config = Config::unlimited();
        assert!(!config.depth_exceeded(usize::MAX));
        assert!(!config.size_exceeded(usize::MAX));
    }

    #[test]
    fn test_config_builders() {
        let config = Config::default()
            .with_max_depth(4)
            .with_max_size(64)
            .with_max_continuation_lines(3);
        assert!(config.depth_exceeded(5));
        assert!(!config.depth_exceeded(4));
        assert!(config.size_exceeded(65));
        assert_eq!(config.max_continuation_lines, 3);
    }
}
