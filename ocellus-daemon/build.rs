//! Build script for ocellus-daemon
//!
//! Checks the embedded ocellus.toml so a broken default never ships.

use std::fs;
use std::path::Path;

/// Tables every default config must carry
const REQUIRED_SECTIONS: &[&str] = &["display", "render", "eyelid", "gaze", "actuator", "cache"];

/// Panel sub-tables under `[display]`
const PANELS: &[&str] = &["left", "right"];

fn main() {
    println!("cargo:rerun-if-changed=ocellus.toml");
    println!("cargo:rerun-if-changed=build.rs");

    let path = Path::new("ocellus.toml");
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => panic!("ocellus.toml could not be read: {}", e),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => panic!("ocellus.toml is not valid TOML:\n{}", e),
    };

    let mut errors = Vec::new();
    for section in REQUIRED_SECTIONS {
        if config.get(section).and_then(|v| v.as_table()).is_none() {
            errors.push(format!("missing [{}] section", section));
        }
    }
    if let Some(display) = config.get("display") {
        for panel in PANELS {
            match display.get(panel) {
                Some(t) if t.get("spi").and_then(|v| v.as_str()).is_some() => {}
                _ => errors.push(format!("[display.{}] needs an spi device", panel)),
            }
        }
    }

    if !errors.is_empty() {
        panic!("ocellus.toml failed validation:\n  {}", errors.join("\n  "));
    }
}
