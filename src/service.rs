//! Configure-once, detect-many tag detection service.

use log::debug;

use crate::config::{DetectorOptions, EngineParams};
use crate::decoder::{FamilyRegistry, TagFamily};
use crate::engine::{DetectionEngine, QuadDecoder};
use crate::error::{ConfigError, DetectError};
use crate::models::{DetectionResult, GrayImage, TagRecord};
use crate::normalizer::normalize;

/// Family and border width a service was built with. Fixed for the
/// service's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagFamilyConfig {
    /// Resolved codeword table
    pub family: &'static TagFamily,
    /// Dark rings around the payload, at least one
    pub black_border: u32,
}

impl TagFamilyConfig {
    /// Resolve `name` against the compiled-in families and validate the
    /// border override.
    pub fn resolve(name: &str, options: &DetectorOptions) -> Result<Self, ConfigError> {
        let family = FamilyRegistry::builtin().resolve(name)?;
        let black_border = match options.black_border {
            None => family.default_black_border,
            Some(value) => u32::try_from(value)
                .ok()
                .filter(|&v| v > 0)
                .ok_or(ConfigError::InvalidBorderWidth { value })?,
        };
        Ok(Self {
            family,
            black_border,
        })
    }

    /// Family name, e.g. `36h11`
    pub fn name(&self) -> &'static str {
        self.family.name
    }
}

/// Tag detection service owning one detection engine.
///
/// `detect` runs synchronously on the calling thread. The service takes
/// `&self`, but an engine is not required to be reentrant: hosts sharing one
/// instance across threads must serialize calls themselves. Separate
/// instances share no mutable state.
///
/// ```
/// use apriltag_service::{DetectorOptions, TagDetectionService};
///
/// let service = TagDetectionService::new("36h11", DetectorOptions::default())?;
/// let tags = service.detect(&vec![0u8; 64 * 48], 64, 48)?;
/// assert!(tags.is_empty());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug)]
pub struct TagDetectionService<E: DetectionEngine = QuadDecoder> {
    config: TagFamilyConfig,
    engine: E,
}

impl TagDetectionService<QuadDecoder> {
    /// Build a service for the family called `name`.
    ///
    /// Fails with [`ConfigError::UnknownTagFamily`] when no table of that
    /// name is compiled in, and with [`ConfigError::InvalidBorderWidth`]
    /// when `options.black_border` is not a positive integer.
    pub fn new(name: &str, options: DetectorOptions) -> Result<Self, ConfigError> {
        Self::with_params(name, options, EngineParams::default())
    }

    /// [`TagDetectionService::new`] with explicit engine tunables.
    pub fn with_params(
        name: &str,
        options: DetectorOptions,
        params: EngineParams,
    ) -> Result<Self, ConfigError> {
        let config = TagFamilyConfig::resolve(name, &options)?;
        debug!(
            "tag detection service for {} with black border {}",
            config.name(),
            config.black_border
        );
        let engine = QuadDecoder::new(config.family, config.black_border, params);
        Ok(Self { config, engine })
    }
}

impl<E: DetectionEngine> TagDetectionService<E> {
    /// Wrap a custom engine. `config` is reported back by the accessors
    /// and is expected to describe what `engine` was built for.
    pub fn with_engine(config: TagFamilyConfig, engine: E) -> Self {
        Self { config, engine }
    }

    /// Family this service detects
    pub fn family(&self) -> &'static TagFamily {
        self.config.family
    }

    /// Border width this service expects
    pub fn black_border(&self) -> u32 {
        self.config.black_border
    }

    /// Configuration fixed at construction
    pub fn config(&self) -> &TagFamilyConfig {
        &self.config
    }

    /// The wrapped engine
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Detect tags in a raw `width` x `height` buffer of gray, RGB or RGBA
    /// bytes.
    ///
    /// Records come back in engine emission order. An empty result means no
    /// tag was recognized.
    pub fn detect(
        &self,
        buffer: &[u8],
        width: usize,
        height: usize,
    ) -> Result<DetectionResult, DetectError> {
        if width == 0 {
            return Err(DetectError::invalid_argument("width", "must be a positive integer"));
        }
        if height == 0 {
            return Err(DetectError::invalid_argument("height", "must be a positive integer"));
        }
        let image = normalize(buffer, width, height)?;
        self.detect_gray(&image)
    }

    /// Detect tags in an already normalized luma frame.
    pub fn detect_gray(&self, image: &GrayImage) -> Result<DetectionResult, DetectError> {
        let raw = self.engine.extract_tags(image)?;
        Ok(raw.iter().map(TagRecord::from).collect::<Vec<_>>().into())
    }

    /// Detect tags in a decoded image of any pixel format.
    ///
    /// Colour images go through the same luma weights as RGB and RGBA
    /// buffers passed to [`detect`](Self::detect); gray images keep their
    /// values. Zero-sized images fail like zero dimensions do.
    pub fn detect_image(
        &self,
        image: &image::DynamicImage,
    ) -> Result<DetectionResult, DetectError> {
        let (width, height) = (image.width() as usize, image.height() as usize);
        if image.color().has_color() {
            self.detect(image.to_rgba8().as_raw(), width, height)
        } else {
            self.detect(image.to_luma8().as_raw(), width, height)
        }
    }
}
