use std::collections::{BTreeMap, HashSet};

use geowhiz_view::config::{HighlightPolicy, ViewConfig};
use geowhiz_view::controller::Controller;
use geowhiz_view::map::{
    GeoBounds, GeoPoint, LabelFrame, ListenerId, MapHost, OverlayEvent, OverlayId, PixelPoint,
    Projection,
};
use geowhiz_view::model::parse_response;

const FIXTURE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/dublin.json"));

struct Mercatorish;

impl Projection for Mercatorish {
    fn to_pixel(&self, point: GeoPoint) -> PixelPoint {
        PixelPoint::new(point.lng * 4.0, -point.lat * 4.0)
    }
}

#[derive(Default)]
struct TestHost {
    ready: bool,
    listeners: HashSet<u32>,
    next_listener: u32,
    labels: BTreeMap<OverlayId, String>,
    frames: BTreeMap<OverlayId, LabelFrame>,
    fitted: Vec<GeoBounds>,
}

impl MapHost for TestHost {
    fn projection(&self) -> Option<&dyn Projection> {
        if self.ready { Some(&Mercatorish) } else { None }
    }

    fn fit_bounds(&mut self, bounds: GeoBounds) {
        self.fitted.push(bounds);
    }

    fn add_listener(&mut self, _overlay: OverlayId, _event: OverlayEvent) -> ListenerId {
        self.next_listener += 1;
        self.listeners.insert(self.next_listener);
        ListenerId(self.next_listener)
    }

    fn remove_listener(&mut self, listener: ListenerId) {
        assert!(self.listeners.remove(&listener.0), "listener dubbel afgemeld");
    }

    fn mount_label(&mut self, overlay: OverlayId, text: &str) -> bool {
        self.labels.insert(overlay, text.to_owned());
        true
    }

    fn render_label(&mut self, overlay: OverlayId, frame: &LabelFrame) {
        assert!(self.labels.contains_key(&overlay), "label niet gemonteerd");
        self.frames.insert(overlay, frame.clone());
    }

    fn unmount_label(&mut self, overlay: OverlayId) {
        self.labels.remove(&overlay);
        self.frames.remove(&overlay);
    }
}

fn ready_controller() -> Controller<TestHost> {
    let host = TestHost {
        ready: true,
        ..TestHost::default()
    };
    Controller::new(host, ViewConfig::default())
}

#[test]
fn single_dublin_assignment_end_to_end() {
    let json = r#"{
        "assignments": [{
            "likelihood": 0.9,
            "categories": [{
                "category": ["dim0|Europe|Ireland|Dublin", "dim1|EU|IE", "dim2|Prominent3"],
                "stats": {"coverage": 1, "total": 1, "ambiguity": 1},
                "normalized_prob": 0.9
            }],
            "cell_interpretations": [[{
                "name": "Dublin",
                "latitude": 53.35,
                "longitude": -6.26,
                "likely": true,
                "cat": ["dim0|Europe|Ireland|Dublin", "dim1|EU|IE", "dim2|Prominent3"]
            }]]
        }]
    }"#;

    let mut controller = ready_controller();
    let ticket = controller.begin_request();
    assert!(controller.accept_response(ticket, parse_response(json).unwrap()).unwrap());
    assert!(!controller.rows().is_empty());

    let scene = controller.select(0, 0.0).unwrap();
    assert!(scene.dimension_nodes().count() >= 3);
    assert_eq!(scene.places.len(), 1);
    assert_eq!(scene.places[0].name, "Dublin");
    assert_eq!(scene.place_edges.iter().filter(|e| e.place == 0).count(), 3);

    let markers = controller.markers();
    assert_eq!(markers.len(), 1);
    let marker = markers.marker("Dublin").unwrap();
    assert_eq!(marker.overlay().position(), GeoPoint::new(53.35, -6.26));
    assert_eq!(controller.host().labels.len(), 1);
}

#[test]
fn fixture_rows_tree_and_markers() {
    let response = parse_response(FIXTURE).unwrap();
    let mut controller = ready_controller();
    let ticket = controller.begin_request();
    controller.accept_response(ticket, response).unwrap();

    let rows = controller.rows();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].text, "European capitals");
    assert_eq!(rows[1].text, "PPL, _|NA|US, Prominent5");
    assert!(rows[0].opacity > rows[1].opacity);

    controller.select(0, 0.0).unwrap();
    assert_eq!(controller.markers().keys(), ["Athens", "Dublin", "Rome"]);
    let svg = controller.tree_svg();
    assert!(svg.contains(">Ireland<"));
    assert!(svg.contains(">United States<"));
    assert!(svg.contains(">Location<"));
    assert_eq!(svg.matches(r#"class="place highlighted""#).count(), 3);

    // Amerikaanse interpretatie: dezelfde namen, dus dezelfde markers.
    let ids: Vec<_> = ["Athens", "Dublin", "Rome"]
        .iter()
        .map(|name| controller.markers().marker(name).unwrap().overlay().id())
        .collect();
    controller.select(1, 100.0).unwrap();
    assert_eq!(controller.markers().active_transitions(), 3);
    assert_eq!(controller.tick(175.0), 3);
    assert_eq!(controller.tick(300.0), 0);

    for (name, id) in ["Athens", "Dublin", "Rome"].iter().zip(ids) {
        let marker = controller.markers().marker(name).unwrap();
        assert_eq!(marker.overlay().id(), id);
        assert_eq!(controller.host().frames[&id].opacity, 1.0);
    }
    let rome = controller.markers().marker("Rome").unwrap();
    assert_eq!(rome.overlay().position(), GeoPoint::new(34.26, -85.16));
}

#[test]
fn show_all_and_policy_toggles() {
    let mut controller = ready_controller();
    let ticket = controller.begin_request();
    controller
        .accept_response(ticket, parse_response(FIXTURE).unwrap())
        .unwrap();
    controller.select(0, 0.0).unwrap();

    let report = controller.set_show_all(true, 1.0).unwrap();
    assert_eq!(report.remapped.len(), 3);
    assert_eq!(report.entered.len(), 2);
    assert_eq!(controller.markers().len(), 5);
    assert_eq!(controller.scene().places.len(), 5);
    assert_eq!(controller.host().listeners.len(), 10);

    controller.set_show_all(false, 2.0).unwrap();
    assert_eq!(controller.markers().keys(), ["Athens", "Dublin", "Rome"]);
    assert_eq!(controller.host().labels.len(), 3);
    assert_eq!(controller.host().listeners.len(), 6);

    controller.set_fit_bounds(true, 3.0).unwrap();
    let bounds = controller.host().fitted.last().copied().unwrap();
    assert!(bounds.contains(GeoPoint::new(53.35, -6.26)));
    assert!(bounds.contains(GeoPoint::new(37.98, 23.73)));

    controller
        .set_highlight_policy(HighlightPolicy::Proximity, 4.0)
        .unwrap();
    assert_eq!(controller.markers().len(), 3);
}

#[test]
fn markers_wait_for_the_projection() {
    let mut controller = Controller::new(TestHost::default(), ViewConfig::default());
    let ticket = controller.begin_request();
    controller
        .accept_response(ticket, parse_response(FIXTURE).unwrap())
        .unwrap();
    controller.select(0, 0.0).unwrap();
    assert_eq!(controller.host().labels.len(), 3);
    assert!(controller.host().frames.is_empty());

    controller.host_mut().ready = true;
    controller.redraw();
    assert_eq!(controller.host().frames.len(), 3);
}

#[test]
fn a_newer_request_wins() {
    let mut controller = ready_controller();
    let old = controller.begin_request();
    let new = controller.begin_request();

    let response = parse_response(FIXTURE).unwrap();
    assert!(controller.accept_response(new, response.clone()).unwrap());
    controller.select(0, 0.0).unwrap();
    assert!(!controller.accept_response(old, response).unwrap());
    assert_eq!(controller.state().selected, Some(0));
    assert_eq!(controller.markers().len(), 3);
}
