//! Taxonomieboom per dimensie, opgebouwd uit de categoriecodes van punten.
//!
//! Een knoop wordt geïdentificeerd door zijn pad (`"dim0|P|PPL"`). Opnieuw
//! invoegen van een bestaand pad levert de bestaande knoop op.

use std::collections::HashMap;

use thiserror::Error;

use crate::model::{DIMENSIONS, Point};

/// Weergavenamen voor de dimensieknopen, in dimensievolgorde.
pub const DIMENSION_LABELS: [&str; DIMENSIONS] = ["Feature type", "Location", "Population"];

const ROOT_NAME: &str = "Taxonomy";
const RAW_ROOT: &str = "_";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaxonomyError {
    #[error("leeg taxonomiepad")]
    EmptyPath,
    /// Een punt verwijst naar een knoop die niet in de boom staat. Dit kan
    /// alleen bij een interne fout, want de boom is uit dezelfde punten gebouwd.
    #[error("geen taxonomieknoop `{path}` voor punt `{point}`")]
    MissingNode { path: String, point: String },
}

/// Index van een knoop in de [`Taxonomy`]-arena.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeIdx(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub struct TaxonomyNode {
    /// Volledig pad, tevens identiteit.
    pub path: String,
    /// Laatste segment van het pad, zoals de backend het levert.
    pub code: String,
    pub name: String,
    pub depth: usize,
    pub dimension: Option<usize>,
    pub parent: Option<NodeIdx>,
    pub children: Vec<NodeIdx>,
}

#[derive(Debug, Clone)]
pub struct Taxonomy {
    nodes: Vec<TaxonomyNode>,
    index: HashMap<String, NodeIdx>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::new()
    }
}

impl Taxonomy {
    pub const ROOT: NodeIdx = NodeIdx(0);

    #[must_use]
    pub fn new() -> Self {
        let root = TaxonomyNode {
            path: String::new(),
            code: String::new(),
            name: ROOT_NAME.to_owned(),
            depth: 0,
            dimension: None,
            parent: None,
            children: Vec::new(),
        };
        Self {
            nodes: vec![root],
            index: HashMap::new(),
        }
    }

    /// Bouw de drie dimensiebomen uit alle codes van de gegeven punten.
    pub fn from_points<'a, I>(points: I, labels: &NodeLabeler<'_>) -> Result<Self, TaxonomyError>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut taxonomy = Self::new();
        for point in points {
            for (dimension, code) in point.cat.iter().enumerate() {
                taxonomy.insert_path(&dimension_segments(dimension, code))?;
            }
        }
        taxonomy.apply_labels(labels);
        Ok(taxonomy)
    }

    /// Voeg een pad in, inclusief alle ontbrekende voorvoegsels.
    pub fn insert_path<S: AsRef<str>>(&mut self, segments: &[S]) -> Result<NodeIdx, TaxonomyError> {
        if segments.is_empty() {
            return Err(TaxonomyError::EmptyPath);
        }

        let mut parent = Self::ROOT;
        let mut path = String::new();
        for (depth, segment) in segments.iter().enumerate() {
            let segment = segment.as_ref();
            if depth > 0 {
                path.push('|');
            }
            path.push_str(segment);

            parent = match self.index.get(&path) {
                Some(existing) => *existing,
                None => self.push_child(parent, &path, segment, depth + 1),
            };
        }
        Ok(parent)
    }

    fn push_child(&mut self, parent: NodeIdx, path: &str, segment: &str, depth: usize) -> NodeIdx {
        let idx = NodeIdx(self.nodes.len());
        let dimension = match self.nodes[parent.0].dimension {
            Some(dimension) => Some(dimension),
            None => parse_dimension(segment),
        };
        self.nodes.push(TaxonomyNode {
            path: path.to_owned(),
            code: segment.to_owned(),
            name: segment.to_owned(),
            depth,
            dimension,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(idx);
        self.index.insert(path.to_owned(), idx);
        idx
    }

    /// Ken weergavenamen toe aan alle knopen behalve de wortel.
    pub fn apply_labels(&mut self, labels: &NodeLabeler<'_>) {
        for node in self.nodes.iter_mut().skip(1) {
            node.name = labels.label(node);
        }
    }

    #[must_use]
    pub fn node(&self, idx: NodeIdx) -> &TaxonomyNode {
        &self.nodes[idx.0]
    }

    #[must_use]
    pub fn nodes(&self) -> &[TaxonomyNode] {
        &self.nodes
    }

    #[must_use]
    pub fn find(&self, path: &str) -> Option<NodeIdx> {
        self.index.get(path).copied()
    }

    /// Aantal knopen zonder de synthetische wortel.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bovenste knoop van elke dimensie, gesorteerd op dimensie.
    #[must_use]
    pub fn dimension_roots(&self) -> Vec<NodeIdx> {
        let mut roots = self.nodes[Self::ROOT.0].children.clone();
        roots.sort_by_key(|idx| (self.nodes[idx.0].dimension, idx.0));
        roots
    }

    /// Knoop die de code van `point` in `dimension` representeert.
    pub fn point_node(&self, point: &Point, dimension: usize) -> Result<NodeIdx, TaxonomyError> {
        let path = dimension_segments(dimension, &point.cat[dimension]).join("|");
        self.find(&path).ok_or_else(|| TaxonomyError::MissingNode {
            path,
            point: point.name.clone(),
        })
    }
}

/// `"_|P|PPL"` in dimensie 0 wordt `["dim0", "P", "PPL"]`.
#[must_use]
pub fn dimension_segments(dimension: usize, code: &str) -> Vec<String> {
    std::iter::once(format!("dim{dimension}"))
        .chain(code.split('|').skip(1).map(str::to_owned))
        .collect()
}

fn parse_dimension(segment: &str) -> Option<usize> {
    segment.strip_prefix("dim")?.parse().ok()
}

/// Bepaalt de weergavenaam van taxonomieknopen.
#[derive(Debug, Clone, Copy)]
pub struct NodeLabeler<'a> {
    overrides: Option<&'a HashMap<String, String>>,
}

impl<'a> NodeLabeler<'a> {
    #[must_use]
    pub fn new(overrides: &'a HashMap<String, String>) -> Self {
        Self {
            overrides: Some(overrides),
        }
    }

    #[must_use]
    pub fn plain() -> Self {
        Self { overrides: None }
    }

    /// Volgorde: tekst van de backend (op pad, daarna op ruwe `_`-code),
    /// vaste dimensielabel, populatieklasse, ruwe code.
    #[must_use]
    pub fn label(&self, node: &TaxonomyNode) -> String {
        if let Some(text) = self.lookup(node) {
            return text.to_owned();
        }
        if node.depth == 1 {
            if let Some(label) = node.dimension.and_then(|d| DIMENSION_LABELS.get(d)) {
                return (*label).to_owned();
            }
        }
        if node.dimension == Some(2) {
            if let Some(label) = population_label(&node.code) {
                return label;
            }
        }
        node.code.clone()
    }

    fn lookup(&self, node: &TaxonomyNode) -> Option<&'a str> {
        let overrides = self.overrides?;
        if let Some(text) = overrides.get(&node.path) {
            return Some(text.as_str());
        }
        // De ruwe wortel `_` is gedeeld door alle dimensies en telt niet mee.
        let (_, rest) = node.path.split_once('|')?;
        overrides
            .get(&format!("{RAW_ROOT}|{rest}"))
            .map(String::as_str)
    }
}

/// `Prominent1` is elke bewoonde plaats, `ProminentN` heeft minstens 10^(N-1) inwoners.
#[must_use]
pub fn population_label(code: &str) -> Option<String> {
    let tier: u32 = code.strip_prefix("Prominent")?.parse().ok()?;
    match tier {
        0 => None,
        1 => Some("pop > 0".to_owned()),
        _ => {
            let threshold = 10_u64.checked_pow(tier - 1)?;
            Some(format!("pop \u{2265} {}", group_thousands(threshold)))
        }
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
