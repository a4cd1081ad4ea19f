//! Abstractie van de host-kaartwidget: projectie, viewport en overlay-registratie.

use serde::Serialize;

#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Pixelpositie binnen de overlay-laag van de kaart.
#[derive(Debug, Copy, Clone, PartialEq, Default, Serialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }
}

/// Geografische bounding box in graden.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    /// Kleinste box rond alle punten; `None` voor een lege invoer.
    pub fn from_points<I: IntoIterator<Item = GeoPoint>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            south: first.lat,
            west: first.lng,
            north: first.lat,
            east: first.lng,
        };
        for point in iter {
            bounds.south = bounds.south.min(point.lat);
            bounds.north = bounds.north.max(point.lat);
            bounds.west = bounds.west.min(point.lng);
            bounds.east = bounds.east.max(point.lng);
        }
        Some(bounds)
    }

    /// Vergroot de box symmetrisch tot elke as minstens `min_extent` graden beslaat.
    #[must_use]
    pub fn padded(self, min_extent: f64) -> Self {
        let mut bounds = self;
        let lat_span = bounds.north - bounds.south;
        if lat_span < min_extent {
            let pad = (min_extent - lat_span) / 2.0;
            bounds.south = (bounds.south - pad).max(-90.0);
            bounds.north = (bounds.north + pad).min(90.0);
        }
        let lng_span = bounds.east - bounds.west;
        if lng_span < min_extent {
            let pad = (min_extent - lng_span) / 2.0;
            bounds.west -= pad;
            bounds.east += pad;
        }
        bounds
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        (self.north - self.south) * (self.east - self.west)
    }

    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.south..=self.north).contains(&point.lat) && (self.west..=self.east).contains(&point.lng)
    }
}

/// Omrekening van geografische coördinaten naar overlay-pixels.
pub trait Projection {
    fn to_pixel(&self, point: GeoPoint) -> PixelPoint;
}

/// Identifier van een overlay binnen de host.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize)]
pub struct OverlayId(pub u32);

/// Identifier van een geregistreerde listener.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ListenerId(pub u32);

/// Gebeurtenissen waarop een overlay zichzelf opnieuw tekent.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum OverlayEvent {
    PositionChanged,
    TextChanged,
}

impl OverlayEvent {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PositionChanged => "position_changed",
            Self::TextChanged => "text_changed",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "position_changed" => Some(Self::PositionChanged),
            "text_changed" => Some(Self::TextChanged),
            _ => None,
        }
    }
}

/// Berekende weergave van een label, klaar om door de host geplaatst te worden.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelFrame {
    pub left: f64,
    pub top: f64,
    pub text: String,
    pub opacity: f64,
    pub visible: bool,
}

/// Wat de synchronisatie van de kaartwidget nodig heeft.
///
/// De projectie is pas beschikbaar nadat de host zijn eerste renderpass heeft
/// gedaan; tot dan geeft [`MapHost::projection`] `None`. Om dezelfde reden kan
/// [`MapHost::mount_label`] weigeren: `false` betekent dat het label later
/// opnieuw gemonteerd moet worden.
pub trait MapHost {
    fn projection(&self) -> Option<&dyn Projection>;
    fn fit_bounds(&mut self, bounds: GeoBounds);
    fn add_listener(&mut self, overlay: OverlayId, event: OverlayEvent) -> ListenerId;
    fn remove_listener(&mut self, listener: ListenerId);
    fn mount_label(&mut self, overlay: OverlayId, text: &str) -> bool;
    fn render_label(&mut self, overlay: OverlayId, frame: &LabelFrame);
    fn unmount_label(&mut self, overlay: OverlayId);
}
