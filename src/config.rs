//! Vaste weergave-parameters en runtime weergave-opties.

use serde::{Deserialize, Serialize};

/// Afmetingen en drempels voor tabel, boom en kaart.
///
/// Alle waarden zijn compile-time standaarden; de host mag een deelverzameling
/// overschrijven via [`crate::Viewer::with_config`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Breedte van het boomgedeelte van het SVG-canvas.
    pub width: f64,
    /// Extra breedte voor de plaatsenlijst rechts van de boom.
    pub place_list_width: f64,
    /// Minimale hoogte van het SVG-canvas.
    pub height: f64,
    /// Horizontale afstand tussen boomniveaus.
    pub node_width: f64,
    /// Verticale afstand tussen naburige knopen.
    pub node_height: f64,
    pub margin_left: f64,
    /// Toewijzingen met een lagere likelihood vallen weg, tenzij hun rang
    /// binnen `rank_cutoff` valt.
    pub likelihood_threshold: f64,
    pub rank_cutoff: usize,
    /// Duur van een marker-transitie in milliseconden.
    pub transition_ms: f64,
    pub moving_opacity: f64,
    /// Minimale omvang (graden) van een bounding box bij het passend maken van de kaart.
    pub min_bounds_extent: f64,
    /// Extra ruimte na elke gemarkeerde plaats in de plaatsenlijst.
    pub highlight_gap: f64,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            place_list_width: 200.0,
            height: 500.0,
            node_width: 80.0,
            node_height: 30.0,
            margin_left: 30.0,
            likelihood_threshold: 0.000_000_5,
            rank_cutoff: 15,
            transition_ms: 150.0,
            moving_opacity: 0.5,
            min_bounds_extent: 0.05,
            highlight_gap: 15.0,
        }
    }
}

/// Welk puntvlag bepaalt of een punt "gemarkeerd" is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightPolicy {
    /// Primaire interpretatie volgens de backend (`likely`).
    #[default]
    Likely,
    /// Interpretatie op basis van nabijheid (`prox_likely`).
    Proximity,
}

impl HighlightPolicy {
    /// Herkent de namen die de UI doorgeeft; onbekende waarden geven `None`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "likely" | "primary" => Some(Self::Likely),
            "proximity" | "prox" | "prox_likely" => Some(Self::Proximity),
            _ => None,
        }
    }
}

/// Toggles die de gedeelde weergavestatus bepalen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewOptions {
    /// Toon alle kandidaatpunten in plaats van alleen de gemarkeerde.
    pub show_all: bool,
    pub highlight: HighlightPolicy,
    /// Pas de kaart na elke synchronisatie aan de zichtbare punten aan.
    pub fit_bounds: bool,
}
