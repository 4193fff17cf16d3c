use thiserror::Error;

/// Which side of a comparison an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Base,
    Target,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Base => f.write_str("base"),
            Self::Target => f.write_str("target"),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// Configuration that could not be used as given. The parameter policy
    /// recovers from these on its own; the variant exists for callers that
    /// want to validate strictly before sanitizing.
    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParams { name: &'static str, reason: String },

    #[error("no {0} image provided")]
    MissingImageSource(Side),

    #[error("mismatching image sizes: {base_w}x{base_h} vs {target_w}x{target_h}")]
    SizeMismatch {
        base_w: u32,
        base_h: u32,
        target_w: u32,
        target_h: u32,
    },

    #[error(
        "rasterizer returned {actual_w}x{actual_h} ({actual_len} samples), \
         expected {expected_w}x{expected_h}"
    )]
    Dimension {
        expected_w: u32,
        expected_h: u32,
        actual_w: u32,
        actual_h: u32,
        actual_len: usize,
    },

    #[error("cannot compute a percentage of a zero-area image")]
    DivisionByZero,

    #[error("{width}x{height} buffer needs {expected} samples, got {actual}")]
    InvalidBuffer {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
}
