//! DOM-uitvoer: resultatentabel, boom-SVG en marker-elementen.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};

use crate::map::{LabelFrame, OverlayId};
use crate::table::ResultRow;

pub const RESULTS_BODY_ID: &str = "results-body";
pub const TREE_CONTAINER_ID: &str = "tree";

const DOT_SIZE_PX: u32 = 6;

pub fn document() -> Option<Document> {
    web_sys::window()?.document()
}

/// Vervang de tabelrijen. Klikken worden door de pagina via `data-row`
/// doorgegeven aan `Viewer::select_row`.
pub fn render_rows(
    document: &Document,
    tbody: &Element,
    rows: &[ResultRow],
    selected: Option<usize>,
) -> Result<(), JsValue> {
    tbody.set_inner_html("");
    for (index, row) in rows.iter().enumerate() {
        let tr = document.create_element("tr")?;
        tr.set_class_name("cat");
        if selected == Some(index) {
            tr.class_list().add_1("selected")?;
        }
        tr.set_attribute("data-row", &index.to_string())?;
        tr.set_attribute("title", &row.cats)?;
        tr.set_attribute("style", &format!("opacity: {:.3}", row.opacity))?;

        for text in [
            row.text.clone(),
            row.coverage_text(),
            row.ambiguity_text(),
            row.score_text(),
        ] {
            let td = document.create_element("td")?;
            td.set_text_content(Some(&text));
            tr.append_child(&td)?;
        }
        tbody.append_child(&tr)?;
    }
    Ok(())
}

pub fn mount_tree(container: &Element, svg: &str) {
    container.set_inner_html(svg);
}

/// Marker-element: tekstlabel onder een stip op het ankerpunt.
pub fn create_label(document: &Document, id: OverlayId, text: &str) -> Result<HtmlElement, JsValue> {
    let root = html_element(document.create_element("div")?)?;
    root.set_class_name("marker");
    root.set_attribute("data-overlay", &id.0.to_string())?;
    root.set_attribute("style", "position: absolute; display: none")?;

    let label = document.create_element("span")?;
    label.set_class_name("marker-text");
    label.set_attribute(
        "style",
        "position: relative; left: -50%; top: 8px; white-space: nowrap; \
         border: 1px solid blue; padding: 2px; border-radius: 3px; \
         background-color: rgba(255, 255, 255, 0.9)",
    )?;
    label.set_text_content(Some(text));

    let dot = document.create_element("span")?;
    dot.set_class_name("marker-dot");
    let half = DOT_SIZE_PX / 2;
    dot.set_attribute(
        "style",
        &format!(
            "position: absolute; height: {DOT_SIZE_PX}px; width: {DOT_SIZE_PX}px; \
             top: -{half}px; left: -{half}px; background: brown; border-radius: {half}px"
        ),
    )?;

    root.append_child(&label)?;
    root.append_child(&dot)?;
    Ok(root)
}

/// Zet positie, tekst en doorzichtigheid van een gemonteerd label.
pub fn apply_frame(element: &HtmlElement, frame: &LabelFrame) -> Result<(), JsValue> {
    let style = element.style();
    style.set_property("left", &format!("{:.1}px", frame.left))?;
    style.set_property("top", &format!("{:.1}px", frame.top))?;
    style.set_property("opacity", &format!("{:.2}", frame.opacity))?;
    style.set_property("display", if frame.visible { "block" } else { "none" })?;
    if let Some(text) = element.query_selector(".marker-text")? {
        if text.text_content().as_deref() != Some(frame.text.as_str()) {
            text.set_text_content(Some(&frame.text));
        }
    }
    Ok(())
}

fn html_element(element: Element) -> Result<HtmlElement, JsValue> {
    element
        .dyn_into::<HtmlElement>()
        .map_err(|_| JsValue::from_str("element is geen HtmlElement"))
}
