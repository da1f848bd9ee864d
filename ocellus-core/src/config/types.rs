//! Configuration type definitions

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::render::raster::LidShape;
use crate::render::ring::Axes;

/// Top-level runtime configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub render: RenderConfig,
    pub eyelid: EyelidConfig,
    pub gaze: GazeConfig,
    pub actuator: ActuatorConfig,
    pub cache: CacheConfig,
}

impl Config {
    /// Check every section and the constraints between them
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.display.validate()?;
        self.render.validate()?;
        self.eyelid.validate()?;
        self.gaze.validate()?;
        self.actuator.validate()?;

        // Composited frames are half-canvas crops and must fill the panel
        let crop = self.render.canvas_size / 2;
        if crop != self.display.width || crop != self.display.height {
            return Err(ConfigError::invalid(
                "render.canvas_size",
                format!(
                    "half of {} must equal the panel size {}x{}",
                    self.render.canvas_size, self.display.width, self.display.height
                ),
            ));
        }

        let pins = [
            Some(self.display.left.reset_pin),
            Some(self.display.left.dc_pin),
            Some(self.display.right.reset_pin),
            Some(self.display.right.dc_pin),
            self.display.backlight_pin,
        ];
        for (i, a) in pins.iter().enumerate() {
            for b in &pins[i + 1..] {
                if a.is_some() && a == b {
                    return Err(ConfigError::invalid(
                        "display",
                        format!("GPIO {} assigned twice", a.unwrap_or_default()),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// One panel's bus and control pins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelConfig {
    /// spidev node, e.g. `/dev/spidev3.0`
    pub spi: String,
    /// Hardware reset GPIO
    pub reset_pin: u32,
    /// Data/command select GPIO
    pub dc_pin: u32,
    /// Lens alignment correction `[x, y]` in pixels, added to every crop
    #[serde(default)]
    pub trim: [i32; 2],
}

/// Display streaming configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Panel width in pixels
    pub width: u32,
    /// Panel height in pixels
    pub height: u32,
    /// Controller row offset of the visible area
    pub row_offset: u16,
    /// Largest single SPI transfer in bytes
    pub chunk_size: usize,
    /// SPI clock in Hz
    pub spi_speed_hz: u32,
    /// Output cadence per panel
    pub fps: u32,
    /// Re-initializations attempted after a bus failure before giving up
    pub max_reinit_attempts: u32,
    /// Shared backlight enable GPIO (none when hard-wired)
    pub backlight_pin: Option<u32>,
    pub left: PanelConfig,
    pub right: PanelConfig,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 240,
            height: 240,
            row_offset: 40,
            chunk_size: 4096,
            spi_speed_hz: 80_000_000,
            fps: 30,
            max_reinit_attempts: 3,
            backlight_pin: Some(11),
            left: PanelConfig {
                spi: "/dev/spidev3.0".into(),
                reset_pin: 13,
                dc_pin: 15,
                trim: [0, 0],
            },
            right: PanelConfig {
                spi: "/dev/spidev3.1".into(),
                reset_pin: 16,
                dc_pin: 18,
                trim: [0, 0],
            },
        }
    }
}

impl DisplayConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::invalid("display", "panel size must be non-zero"));
        }
        if self.width > 0xFFFF || self.height + self.row_offset as u32 > 0xFFFF {
            return Err(ConfigError::invalid(
                "display",
                "window does not fit 16-bit addressing",
            ));
        }
        if self.chunk_size < 2 || self.chunk_size % 2 != 0 {
            return Err(ConfigError::invalid(
                "display.chunk_size",
                "must be a positive even number of bytes",
            ));
        }
        if self.fps == 0 {
            return Err(ConfigError::invalid("display.fps", "must be non-zero"));
        }
        if self.spi_speed_hz == 0 {
            return Err(ConfigError::invalid("display.spi_speed_hz", "must be non-zero"));
        }
        Ok(())
    }

    /// Bytes in one full-panel RGB565 frame
    pub fn frame_bytes(&self) -> usize {
        self.width as usize * self.height as usize * 2
    }
}

/// Texture files and the sizes they are resampled to before warping
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    pub iris_left: String,
    pub iris_right: String,
    pub sclera: String,
    /// `[width, height]` of the resampled iris texture
    pub iris_size: [u32; 2],
    /// `[width, height]` of the resampled sclera texture
    pub sclera_size: [u32; 2],
}

impl Default for TextureConfig {
    fn default() -> Self {
        Self {
            iris_left: "assets/iris-L.png".into(),
            iris_right: "assets/iris-R.png".into(),
            sclera: "assets/sclera.png".into(),
            iris_size: [1024, 80],
            sclera_size: [24000, 512],
        }
    }
}

/// Iris and sclera geometry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Edge length of every animation frame
    pub canvas_size: u32,
    pub sclera_inner: Axes,
    pub sclera_outer: Axes,
    /// Iris inner ellipse at the smallest pupil
    pub iris_inner_normal: Axes,
    /// Iris inner ellipse at full dilation
    pub iris_inner_max: Axes,
    pub iris_outer: Axes,
    /// Frames in the iris table
    pub iris_steps: usize,
    pub textures: TextureConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            canvas_size: 480,
            sclera_inner: Axes(70, 72),
            sclera_outer: Axes(120, 120),
            iris_inner_normal: Axes(10, 69),
            iris_inner_max: Axes(18, 71),
            iris_outer: Axes(70, 72),
            iris_steps: 10,
            textures: TextureConfig::default(),
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas_size < 2 {
            return Err(ConfigError::invalid("render.canvas_size", "must be at least 2"));
        }
        if self.iris_steps < 2 {
            return Err(ConfigError::invalid("render.iris_steps", "must be at least 2"));
        }
        let t = &self.textures;
        if t.iris_size.contains(&0) || t.sclera_size.contains(&0) {
            return Err(ConfigError::invalid(
                "render.textures",
                "texture sizes must be non-zero",
            ));
        }
        Ok(())
    }

    /// Radius of the pupil disc, just covering the largest iris opening
    pub fn pupil_radius(&self) -> u32 {
        self.iris_inner_max.b() + 2
    }
}

/// Eyelid shape and animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EyelidConfig {
    /// Lid colour as `#rrggbb`
    pub color: String,
    /// Frames in the eyelid table
    pub steps: usize,
    /// Opening semi-axes when fully open
    pub open: Axes,
    /// Opening semi-axes when fully closed
    pub closed: Axes,
    /// Rotation of the opening in degrees
    pub angle_deg: f64,
    /// Exponent of the vertical narrowing
    pub sharpness: f64,
}

impl Default for EyelidConfig {
    fn default() -> Self {
        Self {
            color: "#000000".into(),
            steps: 16,
            open: Axes(110, 80),
            closed: Axes(110, 1),
            angle_deg: 15.0,
            sharpness: 6.0,
        }
    }
}

impl EyelidConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rgb()?;
        if self.steps < 2 {
            return Err(ConfigError::invalid("eyelid.steps", "must be at least 2"));
        }
        if !self.angle_deg.is_finite() || !self.sharpness.is_finite() || self.sharpness < 0.0 {
            return Err(ConfigError::invalid(
                "eyelid",
                "angle and sharpness must be finite, sharpness non-negative",
            ));
        }
        Ok(())
    }

    /// Parsed lid colour
    pub fn rgb(&self) -> Result<[u8; 3], ConfigError> {
        parse_hex_color(&self.color)
            .ok_or_else(|| ConfigError::invalid("eyelid.color", format!("bad colour {:?}", self.color)))
    }

    /// Shape for one frame with the given opening
    pub fn shape(&self, axes: Axes) -> Result<LidShape, ConfigError> {
        Ok(LidShape {
            axes,
            angle_deg: self.angle_deg,
            sharpness: self.sharpness,
            color: self.rgb()?,
        })
    }
}

/// Parse `#rrggbb` (leading `#` optional)
pub fn parse_hex_color(s: &str) -> Option<[u8; 3]> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

/// Gains turning normalized gaze into crop offsets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GazeConfig {
    /// How fast the iris foreshortens as the gaze moves sideways
    pub perspective_gain: f32,
    /// Eyelid crop offset in pixels at full deflection `[x, y]`
    pub lid_gain: [f32; 2],
    /// Iris crop offset in pixels at full deflection `[x, y]`
    pub iris_gain: [f32; 2],
}

impl Default for GazeConfig {
    fn default() -> Self {
        Self {
            perspective_gain: 1.5,
            lid_gain: [3.0, 12.0],
            iris_gain: [100.0, 100.0],
        }
    }
}

impl GazeConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let all = [
            self.perspective_gain,
            self.lid_gain[0],
            self.lid_gain[1],
            self.iris_gain[0],
            self.iris_gain[1],
        ];
        if all.iter().any(|g| !g.is_finite()) || self.perspective_gain < 0.0 {
            return Err(ConfigError::invalid(
                "gaze",
                "gains must be finite, perspective gain non-negative",
            ));
        }
        Ok(())
    }
}

/// PWM controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    /// Disable to run displays only
    pub enabled: bool,
    /// i2c-dev node
    pub i2c: String,
    /// 7-bit device address
    pub address: u8,
    /// PWM frequency in Hz
    pub frequency_hz: u32,
    /// Interval between breathing steps
    pub breath_step_ms: u64,
    /// Poll interval of an idle breathing worker
    pub breath_idle_ms: u64,
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            i2c: "/dev/i2c-5".into(),
            address: 0x40,
            frequency_hz: 1000,
            breath_step_ms: 10,
            breath_idle_ms: 100,
        }
    }
}

impl ActuatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.address > 0x7F {
            return Err(ConfigError::invalid("actuator.address", "not a 7-bit address"));
        }
        if self.frequency_hz == 0 {
            return Err(ConfigError::invalid("actuator.frequency_hz", "must be non-zero"));
        }
        if self.breath_step_ms == 0 || self.breath_idle_ms == 0 {
            return Err(ConfigError::invalid(
                "actuator",
                "breath intervals must be non-zero",
            ));
        }
        Ok(())
    }
}

/// Animation table cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub enabled: bool,
    pub dir: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: "cache".into(),
        }
    }
}
