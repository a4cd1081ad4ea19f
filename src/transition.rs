//! Geanimeerde verplaatsing van een marker.

use crate::map::{GeoPoint, PixelPoint, Projection};

/// Beweging van de laatst getekende pixelpositie naar een geografisch doel.
///
/// Het doel wordt elk frame opnieuw geprojecteerd: de kaart kan tijdens de
/// animatie verschuiven.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    from: PixelPoint,
    target: GeoPoint,
    started: f64,
    duration: f64,
}

impl Transition {
    #[must_use]
    pub fn new(from: PixelPoint, target: GeoPoint, started: f64, duration: f64) -> Self {
        Self {
            from,
            target,
            started,
            duration,
        }
    }

    #[must_use]
    pub fn target(&self) -> GeoPoint {
        self.target
    }

    /// Voortgang tussen 0 en 1.
    #[must_use]
    pub fn progress(&self, now: f64) -> f64 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.started) / self.duration).clamp(0.0, 1.0)
    }

    /// Pixelpositie op tijdstip `now`, en of de transitie klaar is.
    #[must_use]
    pub fn sample(&self, now: f64, projection: &dyn Projection) -> (PixelPoint, bool) {
        let t = self.progress(now);
        let target = projection.to_pixel(self.target);
        if t >= 1.0 {
            (target, true)
        } else {
            (self.from.lerp(target, ease_cubic_in_out(t)), false)
        }
    }
}

/// d3's standaard easing.
#[must_use]
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}
