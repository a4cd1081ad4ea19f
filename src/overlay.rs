//! Tekstlabel dat op een geografische coördinaat verankerd is.
//!
//! Levenscyclus: `Unattached -> Attached -> Removed`. Alleen een gekoppelde
//! overlay tekent, en alleen wanneer de host al een projectie heeft.

use crate::map::{GeoPoint, LabelFrame, ListenerId, MapHost, OverlayEvent, OverlayId, PixelPoint};

/// Listeners die bij het koppelen geregistreerd zijn. [`Attachment::release`]
/// meldt ze allemaal weer af.
#[derive(Debug)]
#[must_use = "een koppeling moet vrijgegeven worden om listeners af te melden"]
pub struct Attachment {
    listeners: Vec<ListenerId>,
}

impl Attachment {
    fn acquire(id: OverlayId, host: &mut dyn MapHost) -> Self {
        let listeners = [OverlayEvent::PositionChanged, OverlayEvent::TextChanged]
            .into_iter()
            .map(|event| host.add_listener(id, event))
            .collect();
        Self { listeners }
    }

    pub fn release(self, host: &mut dyn MapHost) {
        for listener in self.listeners {
            host.remove_listener(listener);
        }
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

#[derive(Debug)]
pub enum OverlayState {
    Unattached,
    Attached(Attachment),
    Removed,
}

#[derive(Debug)]
pub struct LabelOverlay {
    id: OverlayId,
    position: GeoPoint,
    text: String,
    opacity: f64,
    // Laatst getekende pixelpositie, vertrekpunt voor transities.
    pixel: Option<PixelPoint>,
    state: OverlayState,
}

impl LabelOverlay {
    #[must_use]
    pub fn new(id: OverlayId, position: GeoPoint, text: impl Into<String>) -> Self {
        Self {
            id,
            position,
            text: text.into(),
            opacity: 1.0,
            pixel: None,
            state: OverlayState::Unattached,
        }
    }

    #[must_use]
    pub fn id(&self) -> OverlayId {
        self.id
    }

    #[must_use]
    pub fn position(&self) -> GeoPoint {
        self.position
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    #[must_use]
    pub fn pixel(&self) -> Option<PixelPoint> {
        self.pixel
    }

    #[must_use]
    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        matches!(self.state, OverlayState::Attached(_))
    }

    /// Koppel aan de kaart. Een tweede aanroep, of een aanroep na `detach`,
    /// doet niets. Kan de host het label nog niet plaatsen, dan blijft de
    /// overlay ongekoppeld en geeft dit `false`; bij een latere aanroep volgt
    /// een nieuwe poging.
    pub fn attach(&mut self, host: &mut dyn MapHost) -> bool {
        match self.state {
            OverlayState::Attached(_) => return true,
            OverlayState::Removed => return false,
            OverlayState::Unattached => {}
        }
        if !host.mount_label(self.id, &self.text) {
            log::debug!("overlay {:?} wacht op de kaart", self.id);
            return false;
        }
        self.state = OverlayState::Attached(Attachment::acquire(self.id, host));
        self.draw(host);
        true
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self.state, OverlayState::Unattached)
    }

    /// Ontkoppel van de kaart en meld alle listeners af.
    pub fn detach(&mut self, host: &mut dyn MapHost) {
        match std::mem::replace(&mut self.state, OverlayState::Removed) {
            OverlayState::Attached(attachment) => {
                attachment.release(host);
                host.unmount_label(self.id);
            }
            OverlayState::Unattached | OverlayState::Removed => {}
        }
    }

    /// Herbereken de pixelpositie en laat de host het label plaatsen.
    ///
    /// Zonder projectie of koppeling blijft het label verborgen en geeft dit `None`.
    pub fn draw(&mut self, host: &mut dyn MapHost) -> Option<PixelPoint> {
        if !self.is_attached() {
            return None;
        }
        let pixel = host.projection()?.to_pixel(self.position);
        self.place(pixel, host);
        Some(pixel)
    }

    /// Plaats het label op een expliciete pixelpositie (tussenframes van een transitie).
    pub fn place(&mut self, pixel: PixelPoint, host: &mut dyn MapHost) {
        if !self.is_attached() {
            return;
        }
        self.pixel = Some(pixel);
        let frame = LabelFrame {
            left: pixel.x,
            top: pixel.y,
            text: self.text.clone(),
            opacity: self.opacity,
            visible: true,
        };
        host.render_label(self.id, &frame);
    }

    pub fn set_position(&mut self, position: GeoPoint, host: &mut dyn MapHost) {
        self.position = position;
        self.draw(host);
    }

    /// Verplaats zonder te tekenen; de lopende transitie plaatst het label.
    pub fn move_silently(&mut self, position: GeoPoint) {
        self.position = position;
    }

    pub fn set_text(&mut self, text: impl Into<String>, host: &mut dyn MapHost) {
        self.text = text.into();
        self.draw(host);
    }

    pub fn set_opacity(&mut self, opacity: f64, host: &mut dyn MapHost) {
        self.opacity = opacity;
        self.draw(host);
    }

    /// Reactie op een listener-gebeurtenis die de host heeft afgevuurd.
    pub fn handle_event(&mut self, event: OverlayEvent, host: &mut dyn MapHost) {
        log::debug!("overlay {:?}: {}", self.id, event.name());
        self.draw(host);
    }
}


#[cfg(test)]
mod tests {
    use super::test_host::RecordingHost;
    use super::*;

    #[test]
    fn draw_is_a_noop_without_projection() {
        let mut host = RecordingHost::default();
        let mut label = LabelOverlay::new(OverlayId(1), GeoPoint::new(1.0, 2.0), "Rome");
        label.attach(&mut host);

        assert!(host.frames.is_empty(), "label blijft verborgen");
        assert_eq!(label.draw(&mut host), None);

        host = RecordingHost {
            mounted: host.mounted,
            listeners: host.listeners,
            next_listener: host.next_listener,
            ..RecordingHost::ready()
        };
        let pixel = label.draw(&mut host).expect("projectie beschikbaar");
        assert_eq!(pixel, PixelPoint::new(20.0, -10.0));
        assert!(host.frames[&OverlayId(1)].visible);
    }

    #[test]
    fn unattached_label_never_draws() {
        let mut host = RecordingHost::ready();
        let mut label = LabelOverlay::new(OverlayId(2), GeoPoint::new(0.0, 0.0), "Athens");
        assert_eq!(label.draw(&mut host), None);
        assert!(host.frames.is_empty());
    }

    #[test]
    fn detach_releases_all_listeners() {
        let mut host = RecordingHost::ready();
        let mut label = LabelOverlay::new(OverlayId(3), GeoPoint::new(0.0, 0.0), "Dublin");
        label.attach(&mut host);
        assert_eq!(host.listeners.len(), 2);
        assert!(host.mounted.contains_key(&OverlayId(3)));

        label.detach(&mut host);
        assert!(host.listeners.is_empty());
        assert!(host.mounted.is_empty());
        assert!(matches!(label.state(), OverlayState::Removed));

        // Opnieuw koppelen na verwijderen is niet toegestaan.
        label.attach(&mut host);
        assert!(host.listeners.is_empty());
        label.detach(&mut host);
    }

    #[test]
    fn attach_waits_until_the_host_can_mount() {
        let mut host = RecordingHost {
            pane_missing: true,
            ..RecordingHost::ready()
        };
        let mut label = LabelOverlay::new(OverlayId(5), GeoPoint::new(1.0, 1.0), "Cork");

        assert!(!label.attach(&mut host));
        assert!(label.is_pending());
        assert!(host.listeners.is_empty());
        assert_eq!(label.draw(&mut host), None);

        host.pane_missing = false;
        assert!(label.attach(&mut host));
        assert!(label.is_attached());
        assert_eq!(host.listeners.len(), 2);
        assert_eq!(host.frames[&OverlayId(5)].left, 10.0);
    }

    #[test]
    fn text_and_position_changes_redraw() {
        let mut host = RecordingHost::ready();
        let mut label = LabelOverlay::new(OverlayId(4), GeoPoint::new(0.0, 0.0), "A");
        label.attach(&mut host);

        label.set_text("B", &mut host);
        assert_eq!(host.frames[&OverlayId(4)].text, "B");

        label.set_position(GeoPoint::new(1.0, 1.0), &mut host);
        assert_eq!(host.frames[&OverlayId(4)].left, 10.0);
        assert_eq!(host.frames[&OverlayId(4)].top, -10.0);

        label.set_opacity(0.5, &mut host);
        assert_eq!(host.frames[&OverlayId(4)].opacity, 0.5);
    }
}
