//! Gedeelde weergavestatus: antwoord, tabel, selectie, opties en markers.

use crate::ViewError;
use crate::config::{HighlightPolicy, ViewConfig, ViewOptions};
use crate::fetch::{RequestTicket, RequestTracker};
use crate::map::{MapHost, OverlayEvent, OverlayId};
use crate::model::GeotagResponse;
use crate::scene::TreeScene;
use crate::svg;
use crate::sync::{MarkerSync, SyncReport, visible_points};
use crate::table::{ResultRow, build_rows};
use crate::taxonomy::NodeLabeler;

/// Voorbeeldlijsten voor de knoppen onder het invoerveld.
pub const SAMPLE_INPUTS: &[&str] = &[
    "Washington\nNew York",
    "Dublin\nAthens\nRome",
    "Arlington\nLaurel\nColumbia",
    "Paris\nLondon\nBerlin\nMadrid",
    "Springfield\nPortland\nSalem",
];

#[derive(Debug)]
pub struct ViewState {
    pub response: Option<GeotagResponse>,
    pub rows: Vec<ResultRow>,
    /// Index in `rows`, niet in de toewijzingen.
    pub selected: Option<usize>,
    pub options: ViewOptions,
    pub scene: TreeScene,
}

pub struct Controller<H: MapHost> {
    config: ViewConfig,
    host: H,
    state: ViewState,
    markers: MarkerSync,
    requests: RequestTracker,
}

impl<H: MapHost> Controller<H> {
    pub fn new(host: H, config: ViewConfig) -> Self {
        let state = ViewState {
            response: None,
            rows: Vec::new(),
            selected: None,
            options: ViewOptions::default(),
            scene: TreeScene::empty(&config),
        };
        Self {
            markers: MarkerSync::new(&config),
            requests: RequestTracker::new(),
            config,
            host,
            state,
        }
    }

    pub fn config(&self) -> &ViewConfig {
        &self.config
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn markers(&self) -> &MarkerSync {
        &self.markers
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.state.rows
    }

    pub fn scene(&self) -> &TreeScene {
        &self.state.scene
    }

    pub fn tree_svg(&self) -> String {
        svg::render_tree(&self.state.scene)
    }

    pub fn begin_request(&mut self) -> RequestTicket {
        self.requests.next_ticket()
    }

    /// Neem een antwoord over. Geeft `false` als er intussen een nieuwer
    /// verzoek loopt; het antwoord wordt dan genegeerd.
    pub fn accept_response(
        &mut self,
        ticket: RequestTicket,
        response: GeotagResponse,
    ) -> Result<bool, ViewError> {
        if !self.requests.is_current(ticket) {
            log::debug!("verouderd antwoord {ticket:?} genegeerd");
            return Ok(false);
        }

        let rows = build_rows(&response, &self.config)?;
        self.markers.clear(&mut self.host);
        self.state.rows = rows;
        self.state.selected = None;
        self.state.scene = TreeScene::empty(&self.config);
        self.state.response = Some(response);
        Ok(true)
    }

    /// Maak `row` de enige actieve toewijzing en herteken boom en kaart.
    pub fn select(&mut self, row: usize, now: f64) -> Result<&TreeScene, ViewError> {
        if row >= self.state.rows.len() {
            return Err(ViewError::RowOutOfRange(row));
        }
        self.state.selected = Some(row);
        self.resync(now)?;
        Ok(&self.state.scene)
    }

    pub fn set_show_all(&mut self, show_all: bool, now: f64) -> Result<SyncReport, ViewError> {
        self.state.options.show_all = show_all;
        self.resync(now)
    }

    pub fn set_highlight_policy(
        &mut self,
        policy: HighlightPolicy,
        now: f64,
    ) -> Result<SyncReport, ViewError> {
        self.state.options.highlight = policy;
        self.resync(now)
    }

    pub fn set_fit_bounds(&mut self, fit_bounds: bool, now: f64) -> Result<SyncReport, ViewError> {
        self.state.options.fit_bounds = fit_bounds;
        self.resync(now)
    }

    pub fn tick(&mut self, now: f64) -> usize {
        self.markers.tick(now, &mut self.host)
    }

    pub fn redraw(&mut self) {
        self.markers.redraw_all(&mut self.host);
    }

    pub fn overlay_event(&mut self, overlay: OverlayId, event: OverlayEvent) -> bool {
        let Some(key) = self.markers.key_for_overlay(overlay).map(str::to_owned) else {
            log::debug!("gebeurtenis {} voor onbekende overlay {overlay:?}", event.name());
            return false;
        };
        self.markers.handle_overlay_event(&key, event, &mut self.host)
    }

    /// Bouw de boom en synchroniseer de markers voor de huidige selectie.
    /// Zonder selectie verandert er niets.
    fn resync(&mut self, now: f64) -> Result<SyncReport, ViewError> {
        let (Some(response), Some(selected)) = (self.state.response.as_ref(), self.state.selected)
        else {
            return Ok(SyncReport::default());
        };
        let index = self.state.rows[selected].assignment;
        let assignment = response
            .assignments
            .get(index)
            .ok_or(ViewError::RowOutOfRange(selected))?;
        let points = assignment.primary_points(index)?;
        let options = self.state.options;

        let visible = visible_points(points, &options);
        let places: Vec<_> = visible.iter().map(|v| v.point).collect();
        self.state.scene = TreeScene::build(
            points,
            &places,
            &NodeLabeler::new(&response.cat_node_text),
            options.highlight,
            &self.config,
        )?;

        Ok(self.markers.sync(points, &options, &mut self.host, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Assignment, Category, CategoryStats, Point};
    use crate::overlay::test_host::RecordingHost;

    fn point(name: &str, id: i64, lat: f64, lng: f64, likely: bool) -> Point {
        Point {
            name: name.to_owned(),
            latitude: lat,
            longitude: lng,
            geonameid: Some(id),
            likely,
            cat: ["_|P|PPL".into(), "_|EU|IE".into(), "_|Prominent6".into()],
            ..Point::default()
        }
    }

    fn assignment(likelihood: f64, points: Vec<Point>) -> Assignment {
        Assignment {
            likelihood,
            categories: vec![Category {
                category: ["_|P|PPL".into(), "_|EU".into(), "_|Prominent6".into()],
                stats: CategoryStats {
                    coverage: 1.0,
                    total: 1.0,
                    ambiguity: 1.0,
                },
                normalized_prob: likelihood,
                txt: None,
            }],
            cell_interpretations: vec![points],
        }
    }

    fn response() -> GeotagResponse {
        GeotagResponse {
            assignments: vec![
                assignment(
                    0.8,
                    vec![
                        point("Dublin", 1, 53.35, -6.26, true),
                        point("Dublin", 2, 32.54, -82.9, false),
                    ],
                ),
                assignment(0.2, vec![point("Dublin", 2, 32.54, -82.9, true)]),
            ],
            ..GeotagResponse::default()
        }
    }

    fn controller() -> Controller<RecordingHost> {
        Controller::new(RecordingHost::ready(), ViewConfig::default())
    }

    #[test]
    fn stale_responses_are_ignored() {
        let mut controller = controller();
        let first = controller.begin_request();
        let second = controller.begin_request();

        assert!(!controller.accept_response(first, response()).unwrap());
        assert!(controller.rows().is_empty());

        assert!(controller.accept_response(second, response()).unwrap());
        assert_eq!(controller.rows().len(), 2);
        assert_eq!(controller.state().selected, None);
    }

    #[test]
    fn selecting_a_row_builds_scene_and_markers() {
        let mut controller = controller();
        let ticket = controller.begin_request();
        controller.accept_response(ticket, response()).unwrap();

        let scene = controller.select(0, 0.0).unwrap();
        assert_eq!(scene.dimension_nodes().count(), 3);
        assert_eq!(scene.places.len(), 1);
        assert_eq!(controller.markers().keys(), ["Dublin"]);
        assert!(controller.tree_svg().contains("Dublin"));

        // Andere interpretatie van dezelfde naam: marker blijft, verschuift.
        controller.select(1, 10.0).unwrap();
        let marker = controller.markers().marker("Dublin").unwrap();
        assert_eq!(marker.record_key(), "2:Dublin");
        assert!(marker.is_moving());
        assert_eq!(controller.tick(1000.0), 0);
    }

    #[test]
    fn options_resync_immediately() {
        let mut controller = controller();
        let ticket = controller.begin_request();
        controller.accept_response(ticket, response()).unwrap();
        controller.select(0, 0.0).unwrap();

        let report = controller.set_show_all(true, 5.0).unwrap();
        assert_eq!(report.entered, ["2:Dublin"]);
        assert_eq!(controller.markers().len(), 2);

        controller.set_show_all(false, 6.0).unwrap();
        assert_eq!(controller.markers().len(), 1);

        controller.set_fit_bounds(true, 7.0).unwrap();
        assert_eq!(controller.host().fitted.len(), 1);

        let report = controller
            .set_highlight_policy(HighlightPolicy::Proximity, 8.0)
            .unwrap();
        assert_eq!(report.exited, ["Dublin"]);
        assert!(controller.markers().is_empty());
    }

    #[test]
    fn out_of_range_selection_fails() {
        let mut controller = controller();
        assert!(matches!(controller.select(0, 0.0), Err(ViewError::RowOutOfRange(0))));
    }

    #[test]
    fn new_response_clears_markers() {
        let mut controller = controller();
        let ticket = controller.begin_request();
        controller.accept_response(ticket, response()).unwrap();
        controller.select(0, 0.0).unwrap();
        assert_eq!(controller.host().mounted.len(), 1);

        let ticket = controller.begin_request();
        controller.accept_response(ticket, response()).unwrap();
        assert!(controller.host().mounted.is_empty());
        assert!(controller.scene().nodes.is_empty());
    }

    #[test]
    fn overlay_events_reach_their_marker() {
        let mut controller = controller();
        let ticket = controller.begin_request();
        controller.accept_response(ticket, response()).unwrap();
        controller.select(0, 0.0).unwrap();

        let id = controller.markers().marker("Dublin").unwrap().overlay().id();
        assert!(controller.overlay_event(id, OverlayEvent::PositionChanged));
        assert!(!controller.overlay_event(OverlayId(999), OverlayEvent::PositionChanged));
    }

    #[test]
    fn sample_inputs_are_non_empty() {
        assert!(SAMPLE_INPUTS.iter().all(|s| s.lines().count() >= 2));
        assert_eq!(SAMPLE_INPUTS[1], "Dublin\nAthens\nRome");
    }
}
