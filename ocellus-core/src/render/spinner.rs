//! Loading placeholder shown while the animation tables build

use core::f64::consts::PI;

use super::Canvas;

/// Dots around the spinner ring
pub const SPINNER_DOTS: u32 = 8;

const BACKGROUND: [u8; 4] = [0, 0, 0, 255];
const DIM: [u8; 4] = [60, 60, 60, 255];
const LIT: [u8; 4] = [255, 255, 255, 255];

/// Ring of dots on black with dot `step % SPINNER_DOTS` highlighted
pub fn spinner_frame(width: u32, height: u32, step: u32) -> Canvas {
    let mut out = Canvas::filled(width, height, BACKGROUND);
    let size = width.min(height) as f64;
    let (cx, cy) = (width as f64 / 2.0, height as f64 / 2.0);
    let ring = size * 0.3;
    let dot = (size * 0.05).max(1.0);
    let lit = step % SPINNER_DOTS;

    for i in 0..SPINNER_DOTS {
        let theta = 2.0 * PI * i as f64 / SPINNER_DOTS as f64 - PI / 2.0;
        let (dx, dy) = (cx + ring * theta.cos(), cy + ring * theta.sin());
        let color = if i == lit { LIT } else { DIM };

        let x0 = (dx - dot).floor().max(0.0) as u32;
        let y0 = (dy - dot).floor().max(0.0) as u32;
        let x1 = ((dx + dot).ceil() as u32).min(width.saturating_sub(1));
        let y1 = ((dy + dot).ceil() as u32).min(height.saturating_sub(1));
        for y in y0..=y1 {
            for x in x0..=x1 {
                let (px, py) = (x as f64 - dx, y as f64 - dy);
                if px * px + py * py <= dot * dot {
                    out.put_pixel(x, y, color);
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_highlight_rotates() {
        let a = spinner_frame(100, 100, 0);
        let b = spinner_frame(100, 100, 1);
        assert_ne!(a, b);
        assert_eq!(spinner_frame(100, 100, SPINNER_DOTS), a);
        // dot 0 sits straight above the centre
        assert_eq!(a.pixel(50, 20), LIT);
        assert_eq!(b.pixel(50, 20), DIM);
        assert_eq!(a.pixel(50, 50), BACKGROUND);
    }

    #[test]
    fn test_opaque() {
        assert!(spinner_frame(32, 24, 3).pixels().all(|p| p[3] == 255));
    }
}
