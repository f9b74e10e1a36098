//! Biquad filters for the 3-band equalizer (RBJ audio-EQ cookbook).

use std::f32::consts::PI;

use super::types::{EqSettings, FilterKind, HIGH_SHELF_HZ, LOW_SHELF_HZ, PEAKING_HZ, PEAKING_Q};

/// Normalized biquad coefficients (a0 == 1).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Coefficients {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl Coefficients {
    pub const IDENTITY: Self = Self {
        b0: 1.0,
        b1: 0.0,
        b2: 0.0,
        a1: 0.0,
        a2: 0.0,
    };

    /// Design a filter. For shelves `q` is the shelf slope S.
    pub fn design(kind: FilterKind, sample_rate: f32, frequency: f32, q: f32, gain_db: f32) -> Self {
        if sample_rate < 1.0 || q <= 0.0 {
            return Self::IDENTITY;
        }

        let a = 10.0_f32.powf(gain_db / 40.0);
        // Keep well below Nyquist.
        let freq = frequency.min(sample_rate * 0.45);
        let w0 = 2.0 * PI * freq / sample_rate;
        let (sin_w0, cos_w0) = w0.sin_cos();

        let (b0, b1, b2, a0, a1, a2) = match kind {
            FilterKind::Peaking => {
                let alpha = sin_w0 / (2.0 * q);
                (
                    1.0 + alpha * a,
                    -2.0 * cos_w0,
                    1.0 - alpha * a,
                    1.0 + alpha / a,
                    -2.0 * cos_w0,
                    1.0 - alpha / a,
                )
            }
            FilterKind::LowShelf => {
                let alpha = sin_w0 / 2.0 * ((a + 1.0 / a) * (1.0 / q - 1.0) + 2.0).sqrt();
                let beta = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) - (a - 1.0) * cos_w0 + beta),
                    2.0 * a * ((a - 1.0) - (a + 1.0) * cos_w0),
                    a * ((a + 1.0) - (a - 1.0) * cos_w0 - beta),
                    (a + 1.0) + (a - 1.0) * cos_w0 + beta,
                    -2.0 * ((a - 1.0) + (a + 1.0) * cos_w0),
                    (a + 1.0) + (a - 1.0) * cos_w0 - beta,
                )
            }
            FilterKind::HighShelf => {
                let alpha = sin_w0 / 2.0 * ((a + 1.0 / a) * (1.0 / q - 1.0) + 2.0).sqrt();
                let beta = 2.0 * a.sqrt() * alpha;
                (
                    a * ((a + 1.0) + (a - 1.0) * cos_w0 + beta),
                    -2.0 * a * ((a - 1.0) + (a + 1.0) * cos_w0),
                    a * ((a + 1.0) + (a - 1.0) * cos_w0 - beta),
                    (a + 1.0) - (a - 1.0) * cos_w0 + beta,
                    2.0 * ((a - 1.0) - (a + 1.0) * cos_w0),
                    (a + 1.0) - (a - 1.0) * cos_w0 - beta,
                )
            }
        };

        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }
}

/// Direct form I state for one channel.
#[derive(Debug, Copy, Clone, Default)]
struct History {
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

/// One biquad with independent history per channel.
#[derive(Debug, Clone)]
pub struct Biquad {
    coeffs: Coefficients,
    history: Vec<History>,
}

impl Biquad {
    pub fn new(channels: usize) -> Self {
        Self {
            coeffs: Coefficients::IDENTITY,
            history: vec![History::default(); channels.max(1)],
        }
    }

    pub fn set_coefficients(&mut self, coeffs: Coefficients) {
        self.coeffs = coeffs;
    }

    pub fn process(&mut self, channel: usize, x: f32) -> f32 {
        let c = self.coeffs;
        let idx = channel % self.history.len();
        let h = &mut self.history[idx];
        let mut y = c.b0 * x + c.b1 * h.x1 + c.b2 * h.x2 - c.a1 * h.y1 - c.a2 * h.y2;
        // Flush denormals.
        if y.abs() < 1.0e-20 {
            y = 0.0;
        }
        h.x2 = h.x1;
        h.x1 = x;
        h.y2 = h.y1;
        h.y1 = y;
        y
    }

    pub fn reset(&mut self) {
        self.history.iter_mut().for_each(|h| *h = History::default());
    }
}

/// The fixed low-shelf / peaking / high-shelf cascade.
#[derive(Debug, Clone)]
pub struct ThreeBand {
    low: Biquad,
    mid: Biquad,
    high: Biquad,
}

impl ThreeBand {
    pub fn new(channels: usize) -> Self {
        Self {
            low: Biquad::new(channels),
            mid: Biquad::new(channels),
            high: Biquad::new(channels),
        }
    }

    pub fn configure(&mut self, sample_rate: f32, eq: EqSettings) {
        self.low.set_coefficients(Coefficients::design(
            FilterKind::LowShelf,
            sample_rate,
            LOW_SHELF_HZ,
            1.0,
            eq.low,
        ));
        self.mid.set_coefficients(Coefficients::design(
            FilterKind::Peaking,
            sample_rate,
            PEAKING_HZ,
            PEAKING_Q,
            eq.mid,
        ));
        self.high.set_coefficients(Coefficients::design(
            FilterKind::HighShelf,
            sample_rate,
            HIGH_SHELF_HZ,
            1.0,
            eq.high,
        ));
    }

    pub fn process(&mut self, channel: usize, x: f32) -> f32 {
        let y = self.low.process(channel, x);
        let y = self.mid.process(channel, y);
        self.high.process(channel, y)
    }

    pub fn reset(&mut self) {
        self.low.reset();
        self.mid.reset();
        self.high.reset();
    }
}
