//! [`MapHost`] bovenop een kaartwidget aan de JS-kant.

use std::collections::HashMap;

use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlElement};

use crate::dom;
use crate::map::{
    GeoBounds, GeoPoint, LabelFrame, ListenerId, MapHost, OverlayEvent, OverlayId, PixelPoint,
    Projection,
};

#[wasm_bindgen]
extern "C" {
    /// Dunne JS-adapter rond de kaart. De pagina levert een object met deze
    /// methoden; het ruilt alleen getallen en strings uit.
    #[derive(Clone, Debug)]
    pub type MapBridge;

    #[wasm_bindgen(method, js_name = hasProjection)]
    fn has_projection(this: &MapBridge) -> bool;

    /// `[x, y]` in pixels van de overlay-laag.
    #[wasm_bindgen(method, js_name = fromLatLngToDivPixel)]
    fn from_lat_lng_to_div_pixel(this: &MapBridge, lat: f64, lng: f64) -> js_sys::Array;

    #[wasm_bindgen(method, js_name = fitBounds)]
    fn fit_bounds(this: &MapBridge, south: f64, west: f64, north: f64, east: f64);

    /// Registreert een listener die `Viewer::overlay_event(overlay, event)` aanroept.
    #[wasm_bindgen(method, js_name = addListener)]
    fn add_listener(this: &MapBridge, overlay: u32, event: &str) -> u32;

    #[wasm_bindgen(method, js_name = removeListener)]
    fn remove_listener(this: &MapBridge, listener: u32);

    #[wasm_bindgen(method, js_name = overlayPane)]
    fn overlay_pane(this: &MapBridge) -> Option<Element>;
}

struct BridgeProjection(MapBridge);

impl Projection for BridgeProjection {
    fn to_pixel(&self, point: GeoPoint) -> PixelPoint {
        let xy = self.0.from_lat_lng_to_div_pixel(point.lat, point.lng);
        PixelPoint::new(
            xy.get(0).as_f64().unwrap_or(f64::NAN),
            xy.get(1).as_f64().unwrap_or(f64::NAN),
        )
    }
}

pub struct JsMapHost {
    bridge: MapBridge,
    projection: BridgeProjection,
    labels: HashMap<OverlayId, HtmlElement>,
}

impl JsMapHost {
    #[must_use]
    pub fn new(bridge: MapBridge) -> Self {
        Self {
            projection: BridgeProjection(bridge.clone()),
            bridge,
            labels: HashMap::new(),
        }
    }
}

impl MapHost for JsMapHost {
    fn projection(&self) -> Option<&dyn Projection> {
        if self.bridge.has_projection() {
            Some(&self.projection)
        } else {
            None
        }
    }

    fn fit_bounds(&mut self, bounds: GeoBounds) {
        self.bridge
            .fit_bounds(bounds.south, bounds.west, bounds.north, bounds.east);
    }

    fn add_listener(&mut self, overlay: OverlayId, event: OverlayEvent) -> ListenerId {
        ListenerId(self.bridge.add_listener(overlay.0, event.name()))
    }

    fn remove_listener(&mut self, listener: ListenerId) {
        self.bridge.remove_listener(listener.0);
    }

    fn mount_label(&mut self, overlay: OverlayId, text: &str) -> bool {
        if self.labels.contains_key(&overlay) {
            return true;
        }
        let Some(document) = dom::document() else {
            return false;
        };
        let Some(pane) = self.bridge.overlay_pane() else {
            log::debug!("kaart heeft nog geen overlay-laag voor {overlay:?}");
            return false;
        };
        let mounted = dom::create_label(&document, overlay, text)
            .and_then(|element| pane.append_child(&element).map(|_| element));
        match mounted {
            Ok(element) => {
                self.labels.insert(overlay, element);
                true
            }
            Err(err) => {
                log::warn!("label {overlay:?} niet geplaatst: {err:?}");
                false
            }
        }
    }

    fn render_label(&mut self, overlay: OverlayId, frame: &LabelFrame) {
        if let Some(element) = self.labels.get(&overlay) {
            if let Err(err) = dom::apply_frame(element, frame) {
                log::warn!("label {overlay:?} niet bijgewerkt: {err:?}");
            }
        }
    }

    fn unmount_label(&mut self, overlay: OverlayId) {
        if let Some(element) = self.labels.remove(&overlay) {
            element.remove();
        }
    }
}
