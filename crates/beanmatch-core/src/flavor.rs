//! Fixed coffee-tasting vocabulary: ten flavor terms arranged as five
//! bipolar axes, plus the value types built on top of it.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::error::{Error, Result};
use crate::vector::is_zero;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlavorTerm {
    Sweet,
    Bitter,
    Acid,
    Smooth,
    Fruit,
    Nut,
    Citrus,
    Chocolate,
    Floral,
    Wood,
}

impl FlavorTerm {
    pub const ALL: [FlavorTerm; 10] = [
        FlavorTerm::Sweet,
        FlavorTerm::Bitter,
        FlavorTerm::Acid,
        FlavorTerm::Smooth,
        FlavorTerm::Fruit,
        FlavorTerm::Nut,
        FlavorTerm::Citrus,
        FlavorTerm::Chocolate,
        FlavorTerm::Floral,
        FlavorTerm::Wood,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sweet => "sweet",
            Self::Bitter => "bitter",
            Self::Acid => "acid",
            Self::Smooth => "smooth",
            Self::Fruit => "fruit",
            Self::Nut => "nut",
            Self::Citrus => "citrus",
            Self::Chocolate => "chocolate",
            Self::Floral => "floral",
            Self::Wood => "wood",
        }
    }

    /// Position in [`FlavorTerm::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for FlavorTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One taste dimension; `left` and `right` are its opposite poles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Axis {
    pub left: FlavorTerm,
    pub right: FlavorTerm,
}

pub const AXES: [Axis; 5] = [
    Axis { left: FlavorTerm::Sweet, right: FlavorTerm::Bitter },
    Axis { left: FlavorTerm::Acid, right: FlavorTerm::Smooth },
    Axis { left: FlavorTerm::Fruit, right: FlavorTerm::Nut },
    Axis { left: FlavorTerm::Citrus, right: FlavorTerm::Chocolate },
    Axis { left: FlavorTerm::Floral, right: FlavorTerm::Wood },
];

impl Axis {
    /// `"{left}_{right}"`, the key used by slider preferences.
    pub fn label(&self) -> String {
        format!("{}_{}", self.left, self.right)
    }

    pub fn from_label(label: &str) -> Option<Axis> {
        AXES.iter().copied().find(|axis| axis.label() == label)
    }
}

/// Strength score in `[0, 1]` for every one of the ten flavor terms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "BTreeMap<FlavorTerm, f32>", try_from = "BTreeMap<FlavorTerm, f32>")]
pub struct FlavorVector {
    scores: [f32; 10],
}

impl FlavorVector {
    pub fn uniform(score: f32) -> Self {
        Self { scores: [score.clamp(0.0, 1.0); 10] }
    }

    pub fn get(&self, term: FlavorTerm) -> f32 {
        self.scores[term.index()]
    }

    /// Sets a score, clamped into `[0, 1]`.
    pub fn set(&mut self, term: FlavorTerm, score: f32) {
        self.scores[term.index()] = score.clamp(0.0, 1.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (FlavorTerm, f32)> + '_ {
        FlavorTerm::ALL.iter().map(move |&t| (t, self.scores[t.index()]))
    }
}

impl From<FlavorVector> for BTreeMap<FlavorTerm, f32> {
    fn from(v: FlavorVector) -> Self {
        v.iter().collect()
    }
}

impl TryFrom<BTreeMap<FlavorTerm, f32>> for FlavorVector {
    type Error = String;

    fn try_from(map: BTreeMap<FlavorTerm, f32>) -> std::result::Result<Self, Self::Error> {
        let mut v = FlavorVector::uniform(0.0);
        for term in FlavorTerm::ALL {
            let score = map.get(&term).ok_or_else(|| format!("flavor vector is missing '{term}'"))?;
            v.set(term, *score);
        }
        Ok(v)
    }
}

/// Slider positions keyed by axis label, each in `[-1, 1]`.
///
/// Negative leans toward the axis' left term, positive toward the right term,
/// zero (or an absent label) is neutral. Labels outside the fixed five axes
/// are carried but ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SliderPreferences(HashMap<String, f32>);

impl SliderPreferences {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, label: impl Into<String>, weight: f32) -> Self {
        self.0.insert(label.into(), weight);
        self
    }

    pub fn set(&mut self, label: impl Into<String>, weight: f32) {
        self.0.insert(label.into(), weight);
    }

    pub fn weight(&self, axis: &Axis) -> f32 {
        self.0.get(&axis.label()).copied().unwrap_or(0.0)
    }

    /// Rejects non-finite or out-of-range weights on the known axes.
    pub fn validate(&self) -> Result<()> {
        for axis in &AXES {
            let w = self.weight(axis);
            if !w.is_finite() || !(-1.0..=1.0).contains(&w) {
                return Err(Error::InvalidInput(format!("slider '{}' must be within [-1, 1], got {w}", axis.label())));
            }
        }
        Ok(())
    }
}

impl FromIterator<(String, f32)> for SliderPreferences {
    fn from_iter<I: IntoIterator<Item = (String, f32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Attraction (`positive`) and aversion (`negative`) query embeddings.
/// Each side is unit length, or all zeros when no slider pointed that way.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryEmbeddingPair {
    pub positive: Vec<f32>,
    pub negative: Vec<f32>,
}

impl QueryEmbeddingPair {
    pub fn has_positive(&self) -> bool {
        !is_zero(&self.positive)
    }

    pub fn has_negative(&self) -> bool {
        !is_zero(&self.negative)
    }
}
