#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod controller;
pub mod dom;
pub mod fetch;
pub mod host;
pub mod layout;
pub mod map;
pub mod model;
pub mod overlay;
pub mod scene;
pub mod svg;
pub mod sync;
pub mod table;
pub mod taxonomy;
pub mod transition;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use config::{HighlightPolicy, ViewConfig};
use controller::{Controller, SAMPLE_INPUTS};
use host::{JsMapHost, MapBridge};
use map::{OverlayEvent, OverlayId};
use model::ResponseError;
use serde::Serialize;
use taxonomy::TaxonomyError;
use thiserror::Error;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

/// Fouten die de wasm-grens over kunnen gaan. Netwerkfouten horen hier niet
/// bij: `submit` keert terug voor het antwoord er is, dus die worden in
/// `fetch::geocode` gelogd.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error(transparent)]
    Response(#[from] ResponseError),
    #[error(transparent)]
    Taxonomy(#[from] TaxonomyError),
    #[error("rij {0} bestaat niet")]
    RowOutOfRange(usize),
    #[error("onbekend markeringsbeleid `{0}`")]
    UnknownPolicy(String),
}

/// Publiek toegangspunt voor de pagina.
#[wasm_bindgen]
pub struct Viewer {
    inner: Rc<RefCell<Controller<JsMapHost>>>,
}

#[wasm_bindgen]
impl Viewer {
    #[wasm_bindgen(constructor)]
    pub fn new(bridge: MapBridge) -> Viewer {
        Viewer::from_config(bridge, ViewConfig::default())
    }

    /// Zoals `new`, maar met (een deel van) de weergaveparameters overschreven.
    #[wasm_bindgen]
    pub fn with_config(bridge: MapBridge, config: JsValue) -> Result<Viewer, JsValue> {
        let config: ViewConfig = if config.is_undefined() || config.is_null() {
            ViewConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config).map_err(to_js_error)?
        };
        Ok(Viewer::from_config(bridge, config))
    }

    /// Vraag de backend om interpretaties van de ingevoerde regels. Geeft het
    /// aantal verstuurde namen terug; het resultaat verschijnt asynchroon.
    #[wasm_bindgen]
    pub fn submit(&self, text: &str) -> u32 {
        let names = fetch::split_input(text);
        let count = u32::try_from(names.len()).unwrap_or(u32::MAX);
        let ticket = self.inner.borrow_mut().begin_request();
        debug_log!("geotag-verzoek {ticket:?} met {count} namen");

        let inner = Rc::clone(&self.inner);
        fetch::geocode(names, move |response| {
            let mut controller = inner.borrow_mut();
            match controller.accept_response(ticket, response) {
                Ok(true) => render_view(&controller),
                Ok(false) => {}
                Err(err) => log::warn!("antwoord niet verwerkt: {err}"),
            }
        });
        count
    }

    /// Maak een tabelrij de actieve toewijzing.
    #[wasm_bindgen]
    pub fn select_row(&self, row: usize) -> Result<(), JsValue> {
        let mut controller = self.inner.borrow_mut();
        controller.select(row, now()).map_err(to_js_error)?;
        render_view(&controller);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_show_all(&self, show_all: bool) -> Result<JsValue, JsValue> {
        let mut controller = self.inner.borrow_mut();
        let report = controller.set_show_all(show_all, now()).map_err(to_js_error)?;
        render_view(&controller);
        to_js(&report)
    }

    #[wasm_bindgen]
    pub fn set_highlight_policy(&self, name: &str) -> Result<JsValue, JsValue> {
        let policy = HighlightPolicy::from_name(name)
            .ok_or_else(|| to_js_error(ViewError::UnknownPolicy(name.to_owned())))?;
        let mut controller = self.inner.borrow_mut();
        let report = controller
            .set_highlight_policy(policy, now())
            .map_err(to_js_error)?;
        render_view(&controller);
        to_js(&report)
    }

    #[wasm_bindgen]
    pub fn set_fit_bounds(&self, fit_bounds: bool) -> Result<JsValue, JsValue> {
        let report = self
            .inner
            .borrow_mut()
            .set_fit_bounds(fit_bounds, now())
            .map_err(to_js_error)?;
        to_js(&report)
    }

    /// Animatieframe met `now` in milliseconden volgens `Date.now()`; geeft het
    /// aantal nog lopende transities terug.
    #[wasm_bindgen]
    pub fn tick(&self, now: f64) -> u32 {
        let running = self.inner.borrow_mut().tick(now);
        u32::try_from(running).unwrap_or(u32::MAX)
    }

    /// Na pannen of zoomen van de kaart.
    #[wasm_bindgen]
    pub fn redraw(&self) {
        if let Ok(mut controller) = self.inner.try_borrow_mut() {
            controller.redraw();
        }
    }

    /// Doorgifte van een listener die via `MapBridge.addListener` geregistreerd is.
    /// Rust tekent labels zelf opnieuw; deze weg is voor `MapBridge.notify`
    /// vanuit de pagina.
    #[wasm_bindgen]
    pub fn overlay_event(&self, overlay: u32, event: &str) -> bool {
        let Some(event) = OverlayEvent::from_name(event) else {
            return false;
        };
        match self.inner.try_borrow_mut() {
            Ok(mut controller) => controller.overlay_event(OverlayId(overlay), event),
            Err(_) => {
                // Synchroon afgevuurd tijdens een sync, die zelf al tekent.
                log::debug!("overlay-gebeurtenis tijdens synchronisatie overgeslagen");
                false
            }
        }
    }

    #[wasm_bindgen]
    pub fn rows(&self) -> Result<JsValue, JsValue> {
        to_js(self.inner.borrow().rows())
    }

    #[wasm_bindgen]
    pub fn tree_svg(&self) -> String {
        self.inner.borrow().tree_svg()
    }

    #[wasm_bindgen]
    pub fn sample_input(index: usize) -> Option<String> {
        SAMPLE_INPUTS.get(index).map(|s| (*s).to_owned())
    }

    #[wasm_bindgen]
    pub fn sample_count() -> usize {
        SAMPLE_INPUTS.len()
    }
}

impl Viewer {
    fn from_config(bridge: MapBridge, config: ViewConfig) -> Viewer {
        Viewer {
            inner: Rc::new(RefCell::new(Controller::new(JsMapHost::new(bridge), config))),
        }
    }
}

/// Tabel en boom naar de pagina. Ontbrekende containers worden overgeslagen.
fn render_view(controller: &Controller<JsMapHost>) {
    let Some(document) = dom::document() else {
        return;
    };
    if let Some(tbody) = document.get_element_by_id(dom::RESULTS_BODY_ID) {
        let state = controller.state();
        if let Err(err) = dom::render_rows(&document, &tbody, &state.rows, state.selected) {
            log::warn!("tabel niet getekend: {err:?}");
        }
    }
    if let Some(container) = document.get_element_by_id(dom::TREE_CONTAINER_ID) {
        dom::mount_tree(&container, &controller.tree_svg());
    }
}

fn now() -> f64 {
    js_sys::Date::now()
}

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|err| JsError::new(&err.to_string()).into())
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
