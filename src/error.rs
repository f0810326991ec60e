//! Error types for service construction and per-frame detection.

/// Construction-time failures. No service is produced.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No compiled-in table has this name
    #[error("unknown tag family {name:?} (supported: {})", .supported.join(", "))]
    UnknownTagFamily {
        /// Name as passed by the caller
        name: String,
        /// Names available in this build
        supported: Vec<&'static str>,
    },
    /// Border override below one or past `u32::MAX`
    #[error("black border width must be a positive integer, got {value}")]
    InvalidBorderWidth {
        /// Rejected override
        value: i64,
    },
}

/// Failures raised by a detection engine for a single frame.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Frame data does not hold `width * height` bytes
    #[error("image data holds {len} bytes, expected {expected} for {width}x{height}")]
    ImageSize {
        /// Bytes present
        len: usize,
        /// Frame width
        width: usize,
        /// Frame height
        height: usize,
        /// `width * height`
        expected: usize,
    },
}

/// Failures of one `detect` call. The service stays usable afterwards.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectError {
    /// A dimension is zero or the pixel count overflows
    #[error("invalid argument `{argument}`: {reason}")]
    InvalidArgument {
        /// Offending parameter, `width` or `height`
        argument: &'static str,
        /// What was wrong with it
        reason: String,
    },
    /// Length matches none of the gray, RGB or RGBA layouts
    #[error(
        "invalid buffer size {len} for {width}x{height} (expected {} gray, {} RGB or {} RGBA bytes)",
        .expected[0], .expected[1], .expected[2]
    )]
    InvalidBufferSize {
        /// Bytes passed
        len: usize,
        /// Frame width
        width: usize,
        /// Frame height
        height: usize,
        /// Accepted lengths for gray, RGB and RGBA
        expected: [usize; 3],
    },
    /// The engine rejected the frame
    #[error(transparent)]
    Engine(#[from] EngineError),
}

impl DetectError {
    pub(crate) fn invalid_argument(argument: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = ConfigError::UnknownTagFamily {
            name: "99h1".to_string(),
            supported: vec!["36h11"],
        };
        assert_eq!(
            err.to_string(),
            "unknown tag family \"99h1\" (supported: 36h11)"
        );

        let err = DetectError::InvalidBufferSize {
            len: 5,
            width: 2,
            height: 2,
            expected: [4, 12, 16],
        };
        assert_eq!(
            err.to_string(),
            "invalid buffer size 5 for 2x2 (expected 4 gray, 12 RGB or 16 RGBA bytes)"
        );

        let err = DetectError::invalid_argument("width", "must be positive");
        assert_eq!(err.to_string(), "invalid argument `width`: must be positive");
    }

    #[test]
    fn engine_errors_convert() {
        let err: DetectError = EngineError::ImageSize {
            len: 1,
            width: 2,
            height: 2,
            expected: 4,
        }
        .into();
        assert!(matches!(err, DetectError::Engine(_)));
    }
}
