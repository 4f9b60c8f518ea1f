//! Driver colors: a fixed palette allocated in order, and hue/saturation
//! variants that tell several laps of the same driver apart.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::LaptraceError;

/// High contrast colors handed out to drivers in this order
pub const DRIVER_PALETTE: [Rgb; 10] = [
    Rgb::new(0xff, 0x00, 0x00), // red
    Rgb::new(0x00, 0xff, 0x00), // green
    Rgb::new(0x00, 0x00, 0xff), // blue
    Rgb::new(0xff, 0xff, 0x00), // yellow
    Rgb::new(0xff, 0x00, 0xff), // magenta
    Rgb::new(0x00, 0xff, 0xff), // cyan
    Rgb::new(0xff, 0x80, 0x00), // orange
    Rgb::new(0x80, 0x00, 0xff), // purple
    Rgb::new(0x00, 0x80, 0xff), // light blue
    Rgb::new(0xff, 0x00, 0x80), // pink
];

pub const MAX_DRIVERS: usize = DRIVER_PALETTE.len();

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or `rrggbb`
    pub fn from_hex(value: &str) -> Result<Self, LaptraceError> {
        let invalid = || LaptraceError::InvalidColor {
            value: value.to_string(),
        };
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<Rgb> for egui::Color32 {
    fn from(value: Rgb) -> Self {
        egui::Color32::from_rgb(value.r, value.g, value.b)
    }
}

/// Hue in degrees [0, 360), saturation and lightness in percent [0, 100]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    /// Rotates the hue and shifts saturation/lightness, clamping both to [0, 100]
    pub fn adjust(&self, hue_deg: f64, saturation: f64, lightness: f64) -> Self {
        Self {
            h: (self.h + hue_deg).rem_euclid(360.),
            s: (self.s + saturation).clamp(0., 100.),
            l: (self.l + lightness).clamp(0., 100.),
        }
    }
}

impl From<Rgb> for Hsl {
    fn from(value: Rgb) -> Self {
        let r = value.r as f64 / 255.;
        let g = value.g as f64 / 255.;
        let b = value.b as f64 / 255.;

        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.;

        if max == min {
            return Self {
                h: 0.,
                s: 0.,
                l: l * 100.,
            };
        }

        let d = max - min;
        let s = if l > 0.5 {
            d / (2. - max - min)
        } else {
            d / (max + min)
        };
        let h = if max == r {
            (g - b) / d + if g < b { 6. } else { 0. }
        } else if max == g {
            (b - r) / d + 2.
        } else {
            (r - g) / d + 4.
        };

        Self {
            h: h / 6. * 360.,
            s: s * 100.,
            l: l * 100.,
        }
    }
}

impl From<Hsl> for Rgb {
    fn from(value: Hsl) -> Self {
        let l = value.l / 100.;
        let a = value.s * l.min(1. - l) / 100.;
        let channel = |n: f64| {
            let k = (n + value.h / 30.).rem_euclid(12.);
            let color = l - a * (k - 3.).min(9. - k).min(1.).max(-1.);
            (255. * color).round().clamp(0., 255.) as u8
        };
        Rgb::new(channel(0.), channel(8.), channel(4.))
    }
}

/// Ten variants of a driver's color, one per selected telemetry lap
pub fn lap_variants(base: Rgb) -> [Rgb; 10] {
    let hsl = Hsl::from(base);
    [
        base,
        hsl.adjust(60., 0., 0.).into(),
        hsl.adjust(180., 0., 0.).into(),
        hsl.adjust(120., 0., 0.).into(),
        hsl.adjust(240., 0., 0.).into(),
        hsl.adjust(300., 0., 0.).into(),
        hsl.adjust(0., 30., 20.).into(),
        hsl.adjust(30., 20., 0.).into(),
        hsl.adjust(330., 0., 10.).into(),
        hsl.adjust(150., -10., 0.).into(),
    ]
}

/// Color of the `index`-th lap (0 based) selected for a driver
pub fn lap_color(base: Rgb, index: usize) -> Rgb {
    let variants = lap_variants(base);
    variants[index % variants.len()]
}

#[derive(Clone, Debug, PartialEq)]
pub struct DriverColor {
    pub driver_number: String,
    pub name: String,
    pub color: Rgb,
}

/// Assigns palette colors to selected drivers. Drivers are kept in selection
/// order.
#[derive(Clone, Debug, Default)]
pub struct ColorAllocator {
    drivers: Vec<DriverColor>,
}

impl ColorAllocator {
    pub fn allocate(&mut self, driver_number: &str, name: &str) -> Result<Rgb, LaptraceError> {
        if self.get(driver_number).is_some() {
            return Err(LaptraceError::DriverAlreadySelected {
                driver_number: driver_number.to_string(),
            });
        }
        let color = DRIVER_PALETTE
            .iter()
            .find(|c| !self.drivers.iter().any(|d| d.color == **c))
            .copied()
            .ok_or(LaptraceError::PaletteExhausted)?;

        self.drivers.push(DriverColor {
            driver_number: driver_number.to_string(),
            name: name.to_string(),
            color,
        });
        Ok(color)
    }

    pub fn release(&mut self, driver_number: &str) -> Option<DriverColor> {
        let index = self
            .drivers
            .iter()
            .position(|d| d.driver_number == driver_number)?;
        Some(self.drivers.remove(index))
    }

    pub fn get(&self, driver_number: &str) -> Option<&DriverColor> {
        self.drivers.iter().find(|d| d.driver_number == driver_number)
    }

    pub fn drivers(&self) -> &[DriverColor] {
        &self.drivers
    }

    pub fn is_full(&self) -> bool {
        self.drivers.len() >= MAX_DRIVERS
    }

    pub fn clear(&mut self) {
        self.drivers.clear();
    }
}
