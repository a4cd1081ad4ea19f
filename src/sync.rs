//! Houdt de kaartmarkers gelijk aan de zichtbare puntenset.
//!
//! Elke marker heeft een sleutel. Zonder "toon alles" is dat de plaatsnaam,
//! zodat een marker blijft staan (en verschuift) wanneer een andere
//! interpretatie van dezelfde naam gekozen wordt. Met "toon alles" is het de
//! recordsleutel, omdat meerdere kandidaten dezelfde naam delen.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::config::{ViewConfig, ViewOptions};
use crate::map::{GeoBounds, MapHost, OverlayEvent, OverlayId};
use crate::model::{Point, record_keys};
use crate::overlay::LabelOverlay;
use crate::transition::Transition;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
pub enum KeyMode {
    #[default]
    ByName,
    ByRecord,
}

impl KeyMode {
    #[must_use]
    pub fn for_options(options: &ViewOptions) -> Self {
        if options.show_all {
            Self::ByRecord
        } else {
            Self::ByName
        }
    }
}

/// Een punt dat op de kaart hoort, met zijn beide mogelijke sleutels.
#[derive(Debug, Clone, PartialEq)]
pub struct VisiblePoint<'a> {
    pub point: &'a Point,
    pub record_key: String,
}

impl VisiblePoint<'_> {
    #[must_use]
    pub fn key(&self, mode: KeyMode) -> String {
        match mode {
            KeyMode::ByName => self.point.name_key(),
            KeyMode::ByRecord => self.record_key.clone(),
        }
    }
}

/// Punten die bij de huidige opties getoond worden, in invoervolgorde.
#[must_use]
pub fn visible_points<'a>(points: &'a [Point], options: &ViewOptions) -> Vec<VisiblePoint<'a>> {
    let keyed = points.iter().zip(record_keys(points));
    if options.show_all {
        return keyed
            .map(|(point, record_key)| VisiblePoint { point, record_key })
            .collect();
    }

    let mut names = HashSet::new();
    keyed
        .filter(|(point, _)| point.is_highlighted(options.highlight))
        .filter(|(point, _)| names.insert(point.name.clone()))
        .map(|(point, record_key)| VisiblePoint { point, record_key })
        .collect()
}

#[derive(Debug)]
pub struct Marker {
    overlay: LabelOverlay,
    record_key: String,
    name_key: String,
    transition: Option<Transition>,
}

impl Marker {
    #[must_use]
    pub fn overlay(&self) -> &LabelOverlay {
        &self.overlay
    }

    #[must_use]
    pub fn record_key(&self) -> &str {
        &self.record_key
    }

    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.transition.is_some()
    }

    fn key(&self, mode: KeyMode) -> &str {
        match mode {
            KeyMode::ByName => &self.name_key,
            KeyMode::ByRecord => &self.record_key,
        }
    }
}

/// Wat één synchronisatie aan de markerset veranderd heeft.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncReport {
    pub entered: Vec<String>,
    pub updated: Vec<String>,
    pub exited: Vec<String>,
    pub remapped: Vec<(String, String)>,
}

#[derive(Debug)]
struct Displayed {
    name_key: String,
    record_key: String,
}

impl Displayed {
    fn key(&self, mode: KeyMode) -> &str {
        match mode {
            KeyMode::ByName => &self.name_key,
            KeyMode::ByRecord => &self.record_key,
        }
    }
}

#[derive(Debug)]
pub struct MarkerSync {
    markers: HashMap<String, Marker>,
    displayed: Vec<Displayed>,
    mode: KeyMode,
    next_overlay: u32,
    transition_ms: f64,
    moving_opacity: f64,
    min_bounds_extent: f64,
}

impl MarkerSync {
    #[must_use]
    pub fn new(config: &ViewConfig) -> Self {
        Self {
            markers: HashMap::new(),
            displayed: Vec::new(),
            mode: KeyMode::default(),
            next_overlay: 0,
            transition_ms: config.transition_ms,
            moving_opacity: config.moving_opacity,
            min_bounds_extent: config.min_bounds_extent,
        }
    }

    #[must_use]
    pub fn mode(&self) -> KeyMode {
        self.mode
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Gesorteerde sleutels van alle levende markers.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.markers.keys().cloned().collect();
        keys.sort();
        keys
    }

    #[must_use]
    pub fn marker(&self, key: &str) -> Option<&Marker> {
        self.markers.get(key)
    }

    /// Sleutel van de marker die bij een overlay hoort.
    #[must_use]
    pub fn key_for_overlay(&self, overlay: OverlayId) -> Option<&str> {
        self.markers
            .iter()
            .find(|(_, marker)| marker.overlay.id() == overlay)
            .map(|(key, _)| key.as_str())
    }

    #[must_use]
    pub fn active_transitions(&self) -> usize {
        self.markers.values().filter(|m| m.is_moving()).count()
    }

    pub fn sync(
        &mut self,
        points: &[Point],
        options: &ViewOptions,
        host: &mut dyn MapHost,
        now: f64,
    ) -> SyncReport {
        let mut report = SyncReport::default();
        let mode = KeyMode::for_options(options);
        let visible = visible_points(points, options);
        let desired: HashSet<String> = visible.iter().map(|v| v.key(mode)).collect();

        if mode != self.mode {
            self.remap(mode, &visible, &mut report);
        }
        let old_mode = self.mode;
        self.mode = mode;

        for displayed in std::mem::take(&mut self.displayed) {
            let key = displayed.key(mode);
            if desired.contains(key) {
                continue;
            }
            match self.take_marker(key, displayed.key(old_mode), &desired) {
                Some((key, mut marker)) => {
                    marker.overlay.detach(host);
                    report.exited.push(key);
                }
                None => log::warn!("geen marker gevonden voor `{key}` bij verwijderen"),
            }
        }

        let orphans: Vec<String> = self
            .markers
            .keys()
            .filter(|key| !desired.contains(*key))
            .cloned()
            .collect();
        for key in orphans {
            if let Some(mut marker) = self.markers.remove(&key) {
                log::debug!("verweesde marker `{key}` opgeruimd");
                marker.overlay.detach(host);
                report.exited.push(key);
            }
        }

        for entry in &visible {
            let key = entry.key(mode);
            let target = entry.point.geo();
            if let Some(marker) = self.markers.get_mut(&key) {
                marker.record_key.clone_from(&entry.record_key);
                marker.name_key = entry.point.name_key();
                let from = marker
                    .overlay
                    .pixel()
                    .or_else(|| host.projection().map(|p| p.to_pixel(marker.overlay.position())));
                match from {
                    Some(from) if marker.overlay.is_attached() => {
                        marker.overlay.set_opacity(self.moving_opacity, host);
                        marker.overlay.move_silently(target);
                        marker.transition =
                            Some(Transition::new(from, target, now, self.transition_ms));
                    }
                    _ => marker.overlay.set_position(target, host),
                }
                report.updated.push(key);
            } else {
                self.next_overlay += 1;
                let mut overlay =
                    LabelOverlay::new(OverlayId(self.next_overlay), target, entry.point.name.clone());
                overlay.attach(host);
                self.markers.insert(
                    key.clone(),
                    Marker {
                        overlay,
                        record_key: entry.record_key.clone(),
                        name_key: entry.point.name_key(),
                        transition: None,
                    },
                );
                report.entered.push(key);
            }
        }

        self.displayed = visible
            .iter()
            .map(|v| Displayed {
                name_key: v.point.name_key(),
                record_key: v.record_key.clone(),
            })
            .collect();

        if options.fit_bounds {
            if let Some(bounds) = GeoBounds::from_points(visible.iter().map(|v| v.point.geo())) {
                host.fit_bounds(bounds.padded(self.min_bounds_extent));
            }
        }

        log::debug!(
            "markers: {} nieuw, {} verplaatst, {} weg",
            report.entered.len(),
            report.updated.len(),
            report.exited.len()
        );
        report
    }

    /// Verhang levende markers naar hun sleutel onder de nieuwe modus.
    ///
    /// Records die ook na de wissel zichtbaar blijven gaan voor: delen
    /// meerdere records een naam, dan houdt het zichtbare record zijn eigen
    /// marker. Andere records volgen in weergavevolgorde.
    fn remap(&mut self, mode: KeyMode, visible: &[VisiblePoint<'_>], report: &mut SyncReport) {
        let old_mode = self.mode;
        let kept: HashSet<&str> = visible.iter().map(|v| v.record_key.as_str()).collect();
        let (first, rest): (Vec<&Displayed>, Vec<&Displayed>) = self
            .displayed
            .iter()
            .partition(|d| kept.contains(d.record_key.as_str()));
        let moves: Vec<(String, String)> = first
            .into_iter()
            .chain(rest)
            .map(|d| (d.key(old_mode).to_owned(), d.key(mode).to_owned()))
            .collect();

        for (old, new) in moves {
            if old == new || self.markers.contains_key(&new) {
                continue;
            }
            let Some(marker) = self.markers.remove(&old) else {
                continue;
            };
            self.markers.insert(new.clone(), marker);
            report.remapped.push((old, new));
        }
    }

    /// Zoek op de nieuwe sleutel, val terug op de oude. De oude sleutel telt
    /// alleen als die marker niet gewenst is en echt bij dit record hoort.
    fn take_marker(
        &mut self,
        key: &str,
        old_key: &str,
        desired: &HashSet<String>,
    ) -> Option<(String, Marker)> {
        if let Some(marker) = self.markers.remove(key) {
            return Some((key.to_owned(), marker));
        }
        let fallback = self.markers.get(old_key).is_some_and(|marker| {
            !desired.contains(old_key) && marker.key(self.mode) != old_key
        });
        if !fallback {
            return None;
        }
        log::debug!("marker `{key}` gevonden onder oude sleutel `{old_key}`");
        self.markers
            .remove(old_key)
            .map(|marker| (old_key.to_owned(), marker))
    }

    /// Schuif lopende transities op; geeft het aantal nog lopende terug.
    pub fn tick(&mut self, now: f64, host: &mut dyn MapHost) -> usize {
        let mut running = 0;
        for marker in self.markers.values_mut() {
            let Some(transition) = marker.transition.as_ref() else {
                continue;
            };
            let Some((pixel, done)) = host.projection().map(|p| transition.sample(now, p)) else {
                running += 1;
                continue;
            };
            if done {
                marker.transition = None;
                marker.overlay.set_opacity(1.0, host);
            } else {
                marker.overlay.place(pixel, host);
                running += 1;
            }
        }
        running
    }

    /// Na pannen of zoomen: monteer labels die nog wachten en teken alle
    /// stilstaande markers opnieuw.
    pub fn redraw_all(&mut self, host: &mut dyn MapHost) {
        for marker in self.markers.values_mut() {
            if marker.overlay.is_pending() {
                marker.overlay.attach(host);
            } else if marker.transition.is_none() {
                marker.overlay.draw(host);
            }
        }
    }

    /// Geeft `false` als de sleutel onbekend is.
    pub fn handle_overlay_event(
        &mut self,
        key: &str,
        event: OverlayEvent,
        host: &mut dyn MapHost,
    ) -> bool {
        match self.markers.get_mut(key) {
            Some(marker) => {
                marker.overlay.handle_event(event, host);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self, host: &mut dyn MapHost) {
        for (_, mut marker) in self.markers.drain() {
            marker.overlay.detach(host);
        }
        self.displayed.clear();
    }
}
