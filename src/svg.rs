//! SVG-markup voor een [`TreeScene`].

use std::fmt::Write as _;

use crate::layout::NodePosition;
use crate::scene::TreeScene;

const NODE_RADIUS: f64 = 4.5;

/// Render de complete `<svg>`-markup van de boom.
#[must_use]
pub fn render_tree(scene: &TreeScene) -> String {
    let mut out = String::with_capacity(256 + scene.nodes.len() * 160);
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" id="tree-svg" width="{}" height="{}">"#,
        num(scene.width),
        num(scene.height)
    );
    let _ = write!(
        out,
        r#"<g transform="translate({},{})">"#,
        num(scene.margin_left),
        num(scene.margin_top)
    );

    for link in &scene.links {
        let _ = write!(
            out,
            r#"<path class="link" fill="none" d="{}"/>"#,
            diagonal(link.source, link.target)
        );
    }

    for edge in &scene.place_edges {
        let style = &edge.style;
        let _ = write!(
            out,
            r#"<path class="place-link" fill="none" stroke="{}" stroke-width="{}px" stroke-opacity="{}""#,
            escape(&style.stroke),
            num(style.width),
            num(style.opacity)
        );
        if let Some(dash) = style.dash {
            let _ = write!(out, r#" stroke-dasharray="{dash}""#);
        }
        let _ = write!(out, r#" d="{}"/>"#, diagonal(edge.source, edge.target));
    }

    for node in &scene.nodes {
        let _ = write!(
            out,
            r#"<g class="node" transform="translate({},{})"><circle r="{}"/><text dx="-8" dy="10" text-anchor="end">{}</text></g>"#,
            num(node.position.x),
            num(node.position.y),
            num(NODE_RADIUS),
            escape(&node.name)
        );
    }

    for place in &scene.places {
        let class = if place.highlighted { "place highlighted" } else { "place" };
        let _ = write!(
            out,
            r#"<g class="{class}" transform="translate({},{})"><circle r="{}"/><text dx="8" dy="3">{}</text></g>"#,
            num(place.position.x),
            num(place.position.y),
            num(NODE_RADIUS),
            escape(&place.name)
        );
    }

    out.push_str("</g></svg>");
    out
}

/// Horizontale kubische curve zoals d3 `svg.diagonal` met omgewisselde assen.
#[must_use]
pub fn diagonal(source: NodePosition, target: NodePosition) -> String {
    let mid = (source.x + target.x) / 2.0;
    format!(
        "M{},{}C{},{} {},{} {},{}",
        num(source.x),
        num(source.y),
        num(mid),
        num(source.y),
        num(mid),
        num(target.y),
        num(target.x),
        num(target.y)
    )
}

fn num(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let text = format!("{value:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_owned()
    }
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
