//! Concrete hardware for the Linux target
//!
//! Tasks cannot be generic, so the driver stacks they own are fixed here.

use anyhow::{Context, Result};
use log::info;

use ocellus_core::config::{ActuatorConfig, DisplayConfig, PanelConfig};
use ocellus_drivers::display::{St7789, St7789Config};
use ocellus_drivers::pwm::Pca9685;
use ocellus_hal::spi::{Mode, SpiConfig};
use ocellus_hal_linux::{LinuxI2c, OutputPin, PinBank, Spidev, StdDelay, SysfsPin};

/// One eye panel on spidev with sysfs control pins
pub type Panel = St7789<Spidev, SysfsPin, StdDelay>;

/// PWM controller on i2c-dev
pub type Pwm = Pca9685<LinuxI2c, StdDelay>;

/// Open a panel's bus and pins; the panel is not initialized yet
pub fn open_panel(bank: &mut PinBank, panel: &PanelConfig, display: &DisplayConfig) -> Result<Panel> {
    let spi = Spidev::open(
        &panel.spi,
        SpiConfig {
            frequency: display.spi_speed_hz,
            mode: Mode::Mode0,
        },
    )?;
    let dc = bank.take(panel.dc_pin)?;
    let rst = bank.take(panel.reset_pin)?;
    // Sizes were checked to fit 16 bits during validation
    let config = St7789Config {
        width: display.width as u16,
        height: display.height as u16,
        row_offset: display.row_offset,
        chunk_size: display.chunk_size,
    };
    Ok(St7789::new(spi, dc, rst, StdDelay, config))
}

/// Drive the shared backlight on; the pin must be kept alive to stay on
pub fn backlight_on(bank: &mut PinBank, pin: u32) -> Result<SysfsPin> {
    let mut backlight = bank.take(pin)?;
    backlight
        .set_high()
        .with_context(|| format!("backlight GPIO {}", pin))?;
    info!("Backlight on (GPIO {})", pin);
    Ok(backlight)
}

/// Open, reset and clock the PWM controller
pub fn open_pwm(config: &ActuatorConfig) -> Result<Pwm> {
    let i2c = LinuxI2c::open(&config.i2c)?;
    let mut pwm = Pca9685::new(i2c, config.address, StdDelay);
    pwm.init()
        .with_context(|| format!("PCA9685 at {:#04x} on {}", config.address, config.i2c))?;
    pwm.set_frequency(config.frequency_hz)
        .with_context(|| format!("PWM frequency {} Hz", config.frequency_hz))?;
    info!(
        "PCA9685 at {:#04x} on {}, {} Hz",
        config.address, config.i2c, config.frequency_hz
    );
    Ok(pwm)
}
