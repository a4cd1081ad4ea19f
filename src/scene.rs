//! Volledige boomscène: taxonomieknopen, plaatsenlijst en verbindingen.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::{HighlightPolicy, ViewConfig};
use crate::layout::{NodePosition, TreeLayout};
use crate::model::{DIMENSIONS, Point};
use crate::taxonomy::{NodeIdx, NodeLabeler, Taxonomy, TaxonomyError};

/// d3 `category10`.
const PALETTE: [(u8, u8, u8); 10] = [
    (0x1f, 0x77, 0xb4),
    (0xff, 0x7f, 0x0e),
    (0x2c, 0xa0, 0x2c),
    (0xd6, 0x27, 0x28),
    (0x94, 0x67, 0xbd),
    (0x8c, 0x56, 0x4b),
    (0xe3, 0x77, 0xc2),
    (0x7f, 0x7f, 0x7f),
    (0xbc, 0xbd, 0x22),
    (0x17, 0xbe, 0xcf),
];

const DIMMED_DASH: &str = "4,3";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneNode {
    pub path: String,
    pub name: String,
    pub position: NodePosition,
    pub dimension: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SceneLink {
    pub source: NodePosition,
    pub target: NodePosition,
}

/// Eén zichtbaar punt in de plaatsenlijst.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenePlace {
    pub name: String,
    pub position: NodePosition,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeStyle {
    pub stroke: String,
    pub width: f64,
    pub dash: Option<&'static str>,
    pub opacity: f64,
}

impl EdgeStyle {
    fn for_place(color: &str, highlighted: bool) -> Self {
        if highlighted {
            Self {
                stroke: color.to_owned(),
                width: 2.0,
                dash: None,
                opacity: 1.0,
            }
        } else {
            Self {
                stroke: color.to_owned(),
                width: 1.0,
                dash: Some(DIMMED_DASH),
                opacity: 0.5,
            }
        }
    }
}

/// Verbinding van een plaats naar de knoop van één van haar dimensies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaceEdge {
    pub place: usize,
    pub node_path: String,
    pub source: NodePosition,
    pub target: NodePosition,
    pub style: EdgeStyle,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeScene {
    pub width: f64,
    pub height: f64,
    pub margin_left: f64,
    pub margin_top: f64,
    pub nodes: Vec<SceneNode>,
    pub links: Vec<SceneLink>,
    pub places: Vec<ScenePlace>,
    pub place_edges: Vec<PlaceEdge>,
}

impl TreeScene {
    #[must_use]
    pub fn empty(config: &ViewConfig) -> Self {
        Self {
            width: config.width + config.place_list_width,
            height: config.height,
            margin_left: config.margin_left,
            margin_top: config.node_height,
            nodes: Vec::new(),
            links: Vec::new(),
            places: Vec::new(),
            place_edges: Vec::new(),
        }
    }

    /// Bouw de scène. De boom komt uit `all_points`, de plaatsenlijst uit
    /// `visible`; elk zichtbaar punt moet dus ook in `all_points` voorkomen.
    pub fn build(
        all_points: &[Point],
        visible: &[&Point],
        labels: &NodeLabeler<'_>,
        policy: HighlightPolicy,
        config: &ViewConfig,
    ) -> Result<Self, TaxonomyError> {
        let taxonomy = Taxonomy::from_points(all_points, labels)?;
        let mut layout = TreeLayout::compute(&taxonomy, config);

        // Gemarkeerde punten bovenaan, verder in de oorspronkelijke volgorde.
        let mut ordered: Vec<&Point> = visible.to_vec();
        ordered.sort_by_key(|point| !point.is_highlighted(policy));

        let mut places = Vec::with_capacity(ordered.len());
        let mut cursor = 0.0;
        for point in &ordered {
            let highlighted = point.is_highlighted(policy);
            places.push(ScenePlace {
                name: point.name.clone(),
                position: NodePosition {
                    x: config.width,
                    y: cursor,
                },
                highlighted,
            });
            cursor += config.node_height;
            if highlighted {
                cursor += config.highlight_gap;
            }
        }

        let places_bottom = places.last().map_or(0.0, |place| place.position.y);
        let content = layout.bottom().max(places_bottom) + 2.0 * config.node_height;
        let height = config.height.max(content);
        let slack = (height - content) / 2.0;
        if slack > 0.0 {
            layout.shift(slack);
            for place in &mut places {
                place.position.y += slack;
            }
        }

        let mut nodes = Vec::with_capacity(taxonomy.len());
        let mut links = Vec::new();
        for (i, node) in taxonomy.nodes().iter().enumerate().skip(1) {
            let Some(position) = layout.position(NodeIdx(i)) else {
                continue;
            };
            nodes.push(SceneNode {
                path: node.path.clone(),
                name: node.name.clone(),
                position,
                dimension: node.dimension,
            });
            let parent = node.parent.and_then(|parent| layout.position(parent));
            if let Some(source) = parent {
                links.push(SceneLink {
                    source,
                    target: position,
                });
            }
        }

        let mut colors = ColorScale::default();
        let mut place_edges = Vec::with_capacity(ordered.len() * DIMENSIONS);
        for (index, (point, place)) in ordered.iter().zip(&places).enumerate() {
            let color = colors.brighter(&point.name);
            for dimension in 0..DIMENSIONS {
                let idx = taxonomy.point_node(point, dimension)?;
                let target = layout
                    .position(idx)
                    .ok_or_else(|| TaxonomyError::MissingNode {
                        path: taxonomy.node(idx).path.clone(),
                        point: point.name.clone(),
                    })?;
                place_edges.push(PlaceEdge {
                    place: index,
                    node_path: taxonomy.node(idx).path.clone(),
                    source: place.position,
                    target,
                    style: EdgeStyle::for_place(&color, place.highlighted),
                });
            }
        }

        Ok(Self {
            width: config.width + config.place_list_width,
            height,
            margin_left: config.margin_left,
            margin_top: config.node_height,
            nodes,
            links,
            places,
            place_edges,
        })
    }

    /// Knopen die direct onder de synthetische wortel hangen.
    pub fn dimension_nodes(&self) -> impl Iterator<Item = &SceneNode> {
        self.nodes.iter().filter(|node| !node.path.contains('|'))
    }
}

/// Ordinale kleurschaal: elke nieuwe naam krijgt de volgende paletkleur.
#[derive(Debug, Default)]
struct ColorScale {
    assigned: HashMap<String, usize>,
}

impl ColorScale {
    fn color(&mut self, key: &str) -> (u8, u8, u8) {
        let next = self.assigned.len();
        let index = *self.assigned.entry(key.to_owned()).or_insert(next);
        PALETTE[index % PALETTE.len()]
    }

    /// Zoals d3 `rgb.brighter()`.
    fn brighter(&mut self, key: &str) -> String {
        const FLOOR: f64 = 30.0;
        let k = 0.7;
        let (r, g, b) = self.color(key);
        let channels = [f64::from(r), f64::from(g), f64::from(b)];
        if channels.iter().all(|c| *c == 0.0) {
            return hex([FLOOR; 3]);
        }
        hex(channels.map(|c| {
            let c = if c > 0.0 && c < FLOOR { FLOOR } else { c };
            (c / k).min(255.0)
        }))
    }
}

fn hex(channels: [f64; 3]) -> String {
    let [r, g, b] = channels.map(|c| c.round().clamp(0.0, 255.0) as u8);
    format!("#{r:02x}{g:02x}{b:02x}")
}
