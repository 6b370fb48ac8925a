//! Rings, ring segments, and the [`RingCollection`] behind the circular plot.

pub mod annotation;
pub mod blast;
pub mod genomad;
mod segment;

#[cfg(test)]
mod tests;

#[doc(inline)]
pub use segment::RingSegment;

use crate::utils::create_uuid;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use strum::EnumIter;

/// Default fill color for new rings.
pub const DEFAULT_RING_COLOR: &str = "#d3d3d3";

/// Default radial height for new rings.
pub const DEFAULT_RING_HEIGHT: u32 = 20;

// ----------------------------------------------------------------------------
// Ring Type
// ----------------------------------------------------------------------------

/// The kind of data track a [`Ring`] represents.
#[derive(Clone, Copy, Debug, Default, Deserialize, EnumIter, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RingType {
    /// Plain data track without a dedicated source.
    #[default]
    Generic,
    /// Base track spanning the full reference sequence.
    Reference,
    /// Nucleotide identity track from a BLAST comparison.
    Blast,
    /// Interval feature track, for example from genome annotations.
    Annotation,
    /// Free-text point labels, always the outermost track of its group.
    Label,
    /// geNomad plasmid/virus/chromosome classification track.
    Genomad,
}

impl Display for RingType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RingType::Generic => "generic",
            RingType::Reference => "reference",
            RingType::Blast => "blast",
            RingType::Annotation => "annotation",
            RingType::Label => "label",
            RingType::Genomad => "genomad",
        };
        write!(f, "{name}")
    }
}

impl FromStr for RingType {
    type Err = color_eyre::eyre::Report;

    fn from_str(ring_type: &str) -> Result<Self, Self::Err> {
        let ring_type = match ring_type {
            "generic" => RingType::Generic,
            "reference" => RingType::Reference,
            "blast" => RingType::Blast,
            "annotation" => RingType::Annotation,
            "label" => RingType::Label,
            "genomad" => RingType::Genomad,
            _ => Err(color_eyre::eyre::eyre!("Unknown ring type: {ring_type}"))?,
        };
        Ok(ring_type)
    }
}

impl RingType {
    /// Default display title for rings of this type.
    pub fn default_title(&self) -> &'static str {
        match self {
            RingType::Generic => "Ring",
            RingType::Reference => "Reference Ring",
            RingType::Blast => "BLAST Ring",
            RingType::Annotation => "Annotation Ring",
            RingType::Label => "Label Ring",
            RingType::Genomad => "Genomad Ring",
        }
    }
}

// ----------------------------------------------------------------------------
// Ring Reference
// ----------------------------------------------------------------------------

/// The reference sequence a ring is plotted against.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RingReferenceSequence {
    pub id: String,
    #[serde(default)]
    pub length: u64,
}

/// The (session, reference file, sequence) context a ring belongs to.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct RingReference {
    pub session_id: String,
    pub reference_id: String,
    pub sequence: RingReferenceSequence,
}

impl RingReference {
    pub fn new(session_id: &str, reference_id: &str, sequence_id: &str, length: u64) -> Self {
        RingReference {
            session_id: session_id.to_string(),
            reference_id: reference_id.to_string(),
            sequence: RingReferenceSequence {
                id: sequence_id.to_string(),
                length,
            },
        }
    }

    /// Rings are grouped for ordering by reference file and sequence only.
    /// Session identity enters the display filter, not the group key.
    pub fn same_group(&self, other: &RingReference) -> bool {
        self.reference_id == other.reference_id && self.sequence.id == other.sequence.id
    }

    /// Full equality on all three context components, used by the display filter.
    pub fn matches(&self, other: &RingReference) -> bool {
        self.session_id == other.session_id && self.same_group(other)
    }
}

// ----------------------------------------------------------------------------
// Ring
// ----------------------------------------------------------------------------

/// One concentric data track of the circular genome plot.
///
/// The `id` is generated once at creation and never reused; `index` is the
/// 0-based position among rings of the same group and is reassigned by the
/// [`RingCollection`] on every insertion or removal.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Ring {
    pub id: String,
    pub index: usize,
    pub visible: bool,
    pub color: String,
    pub height: u32,
    #[serde(rename = "type")]
    pub ring_type: RingType,
    pub title: String,
    pub reference: RingReference,
    #[serde(default)]
    pub data: Vec<RingSegment>,
}

impl Ring {
    /// Returns a new empty ring of the given type with default styling.
    pub fn new(ring_type: RingType, reference: &RingReference) -> Self {
        Ring {
            id: create_uuid(false),
            index: 0,
            visible: true,
            color: DEFAULT_RING_COLOR.to_string(),
            height: DEFAULT_RING_HEIGHT,
            ring_type,
            title: ring_type.default_title().to_string(),
            reference: reference.clone(),
            data: Vec::new(),
        }
    }

    /// Returns a reference ring with a single segment spanning the sequence.
    pub fn from_reference(reference: &RingReference) -> Self {
        let segment = RingSegment::new(0, reference.sequence.length, &reference.sequence.id);
        Ring::new(RingType::Reference, reference).with_data(vec![segment])
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.color = color.to_string();
        self
    }

    pub fn with_data(mut self, data: Vec<RingSegment>) -> Self {
        self.data = data;
        self
    }
}

// ----------------------------------------------------------------------------
// Ring Collection
// ----------------------------------------------------------------------------

/// Ordered collection of rings, possibly spanning multiple reference groups.
///
/// The collection owns ordering: indices within a group always form a
/// contiguous `0..n` sequence, and a label ring, when present, stays the
/// outermost (highest index) ring of its group. All mutations are silent
/// no-ops when the target ring or segment does not exist, so interface
/// actions holding stale identifiers cannot fail.
///
/// ## Examples
///
/// ```rust
/// use brick::ring::{Ring, RingCollection, RingReference, RingType};
///
/// let reference = RingReference::new("session", "ref", "chr1", 4_000_000);
///
/// let mut rings = RingCollection::new();
/// rings.insert(Ring::from_reference(&reference));
/// rings.insert(Ring::new(RingType::Label, &reference));
/// rings.insert(Ring::new(RingType::Blast, &reference));
///
/// // the label ring remains outermost
/// let view = rings.filtered(Some(&reference));
/// assert_eq!(view.last().unwrap().ring_type, RingType::Label);
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct RingCollection {
    rings: Vec<Ring>,
}

impl From<Vec<Ring>> for RingCollection {
    fn from(rings: Vec<Ring>) -> Self {
        RingCollection { rings }
    }
}

impl RingCollection {
    pub fn new() -> Self {
        RingCollection { rings: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    /// All rings in insertion order, without group scoping.
    pub fn rings(&self) -> &[Ring] {
        &self.rings
    }

    /// Consume the collection, returning the underlying rings.
    pub fn into_rings(self) -> Vec<Ring> {
        self.rings
    }

    /// Get a ring by identifier.
    pub fn get(&self, id: &str) -> Option<&Ring> {
        self.rings.iter().find(|ring| ring.id == id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Ring> {
        self.rings.iter_mut().find(|ring| ring.id == id)
    }

    /// Positions of the group members of `reference`, sorted by ring index.
    fn group_positions(&self, reference: &RingReference) -> Vec<usize> {
        self.rings
            .iter()
            .enumerate()
            .filter(|(_, ring)| ring.reference.same_group(reference))
            .sorted_by_key(|(_, ring)| ring.index)
            .map(|(position, _)| position)
            .collect()
    }

    /// Insert a ring into its reference group.
    ///
    /// Label rings merge into an existing outermost label ring instead of
    /// creating a second one; their segments are appended with exact
    /// duplicates skipped. Non-label rings inserted into a group whose
    /// outermost ring is a label ring are placed immediately inside it.
    /// Rings of other groups are never renumbered.
    pub fn insert(&mut self, mut ring: Ring) {
        let group = self.group_positions(&ring.reference);
        let trailing_label = group
            .last()
            .copied()
            .filter(|&position| self.rings[position].ring_type == RingType::Label);

        if ring.ring_type == RingType::Label {
            match trailing_label {
                // merge into the existing outermost label ring
                Some(position) => {
                    let target = &mut self.rings[position];
                    for segment in ring.data {
                        if !target.data.contains(&segment) {
                            target.data.push(segment);
                        }
                    }
                }
                None => {
                    ring.index = match group.last() {
                        Some(&position) => self.rings[position].index + 1,
                        None => 0,
                    };
                    self.rings.push(ring);
                }
            }
        } else {
            match trailing_label {
                // insert immediately inside the outermost label ring
                Some(position) => {
                    ring.index = group.len() - 1;
                    self.rings[position].index += 1;
                    self.rings.push(ring);
                }
                None => {
                    ring.index = group.len();
                    self.rings.push(ring);
                }
            }
        }
    }

    /// Remove a ring and close the index gap among the given group members.
    ///
    /// Remaining rings whose identifier is in `group_member_ids` are re-sorted
    /// by their current index and assigned contiguous indices starting at 0;
    /// rings outside the group keep their indices untouched. Unknown
    /// identifiers are a no-op.
    pub fn remove(&mut self, id: &str, group_member_ids: &[String]) {
        self.rings.retain(|ring| ring.id != id);

        let mut members: Vec<&mut Ring> = self
            .rings
            .iter_mut()
            .filter(|ring| group_member_ids.contains(&ring.id))
            .collect();
        members.sort_by_key(|ring| ring.index);

        for (index, ring) in members.into_iter().enumerate() {
            ring.index = index;
        }
    }

    /// Swap the ring with its inner neighbor (index - 1) within the collection.
    pub fn move_inward(&mut self, id: &str) {
        let Some(position) = self.rings.iter().position(|ring| ring.id == id) else {
            return;
        };
        let index = self.rings[position].index;
        if index == 0 {
            return;
        }
        if let Some(partner) = self
            .rings
            .iter()
            .position(|ring| ring.index == index - 1 && ring.id != id)
        {
            self.rings[partner].index = index;
            self.rings[position].index = index - 1;
        }
    }

    /// Swap the ring with its outer neighbor (index + 1) within the collection.
    pub fn move_outward(&mut self, id: &str, max_index: usize) {
        let Some(position) = self.rings.iter().position(|ring| ring.id == id) else {
            return;
        };
        let index = self.rings[position].index;
        if index == max_index {
            return;
        }
        if let Some(partner) = self
            .rings
            .iter()
            .position(|ring| ring.index == index + 1 && ring.id != id)
        {
            self.rings[partner].index = index;
            self.rings[position].index = index + 1;
        }
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) {
        if let Some(ring) = self.get_mut(id) {
            ring.visible = visible;
        }
    }

    pub fn set_color(&mut self, id: &str, color: &str) {
        if let Some(ring) = self.get_mut(id) {
            ring.color = color.to_string();
        }
    }

    pub fn set_title(&mut self, id: &str, title: &str) {
        if let Some(ring) = self.get_mut(id) {
            ring.title = title.to_string();
        }
    }

    /// Rings of the active reference, innermost first.
    ///
    /// Matches on all three context components (session, reference file,
    /// sequence). A `None` reference returns every ring without ordering
    /// guarantees across groups. The view is recomputed on each call.
    pub fn filtered(&self, reference: Option<&RingReference>) -> Vec<&Ring> {
        match reference {
            Some(reference) => self
                .rings
                .iter()
                .filter(|ring| ring.reference.matches(reference))
                .sorted_by_key(|ring| ring.index)
                .collect(),
            None => self.rings.iter().collect(),
        }
    }

    /// Highest ring index among the group members of `reference`.
    pub fn max_index(&self, reference: &RingReference) -> Option<usize> {
        self.rings
            .iter()
            .filter(|ring| ring.reference.same_group(reference))
            .map(|ring| ring.index)
            .max()
    }

    // ------------------------------------------------------------------------
    // Label segment operations

    fn label_mut(&mut self, ring_id: &str, label_identifier: &str) -> Option<&mut RingSegment> {
        self.get_mut(ring_id)?
            .data
            .iter_mut()
            .find(|segment| segment.label_identifier.as_deref() == Some(label_identifier))
    }

    pub fn set_label_text(&mut self, ring_id: &str, label_identifier: &str, text: &str) {
        if let Some(segment) = self.label_mut(ring_id, label_identifier) {
            segment.text = text.to_string();
        }
    }

    pub fn set_label_position(&mut self, ring_id: &str, label_identifier: &str, start: u64, end: u64) {
        if let Some(segment) = self.label_mut(ring_id, label_identifier) {
            segment.start = start;
            segment.end = end;
        }
    }

    pub fn set_label_line_length(&mut self, ring_id: &str, label_identifier: &str, length: f64) {
        if let Some(segment) = self.label_mut(ring_id, label_identifier) {
            segment.line_length = Some(length);
        }
    }

    pub fn set_label_line_width(&mut self, ring_id: &str, label_identifier: &str, width: f64) {
        if let Some(segment) = self.label_mut(ring_id, label_identifier) {
            segment.line_width = Some(width);
        }
    }

    pub fn set_label_line_angle(&mut self, ring_id: &str, label_identifier: &str, angle: f64) {
        if let Some(segment) = self.label_mut(ring_id, label_identifier) {
            segment.line_angle = Some(angle);
        }
    }

    pub fn set_label_line_color(&mut self, ring_id: &str, label_identifier: &str, color: &str) {
        if let Some(segment) = self.label_mut(ring_id, label_identifier) {
            segment.line_color = Some(color.to_string());
        }
    }

    pub fn set_label_text_size(&mut self, ring_id: &str, label_identifier: &str, size: f64) {
        if let Some(segment) = self.label_mut(ring_id, label_identifier) {
            segment.text_size = Some(size);
        }
    }

    pub fn set_label_text_color(&mut self, ring_id: &str, label_identifier: &str, color: &str) {
        if let Some(segment) = self.label_mut(ring_id, label_identifier) {
            segment.text_color = Some(color.to_string());
        }
    }

    /// Drop the matching label segment(s) from the ring data.
    pub fn remove_label(&mut self, ring_id: &str, label_identifier: &str) {
        if let Some(ring) = self.get_mut(ring_id) {
            ring.data
                .retain(|segment| segment.label_identifier.as_deref() != Some(label_identifier));
        }
    }
}
