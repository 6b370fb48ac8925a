//! Interval and point features drawn on a [`Ring`](crate::ring::Ring).

use crate::utils::create_uuid;

use serde::{Deserialize, Serialize};

// ----------------------------------------------------------------------------
// Ring Segment
// ----------------------------------------------------------------------------

/// One annotated interval or point feature on a ring.
///
/// `start`/`end` are coordinates along the reference sequence (0-based, end
/// exclusive); point-like label segments use `start == end`. Style fields are
/// optional and only serialized when set, so the same record covers plain
/// segments, free-text labels, and geNomad score windows. Field names follow
/// the wire format of the visualization layer (camelCase for style fields).
///
/// ## Examples
///
/// ```rust
/// use brick::ring::RingSegment;
///
/// let segment = RingSegment::new(0, 4012712, "99.98% nucleotide identity");
/// assert!(segment.label_identifier.is_none());
///
/// let label = RingSegment::label(320551, 320551, "dnaA");
/// assert!(label.label_identifier.is_some());
/// ```
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RingSegment {
    pub start: u64,
    pub end: u64,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    // Free-text label styling, present only on label ring segments. The
    // identifier addresses one label for point edits from the interface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_opacity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_angle: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_opacity: Option<f64>,

    // geNomad per-window prediction scores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plasmid: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virus: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chromosome: Option<f64>,
}

impl RingSegment {
    /// Returns a plain interval segment.
    pub fn new(start: u64, end: u64, text: &str) -> Self {
        RingSegment {
            start,
            end,
            text: text.to_string(),
            ..Default::default()
        }
    }

    /// Returns a free-text label segment with a generated identifier.
    pub fn label(start: u64, end: u64, text: &str) -> Self {
        RingSegment {
            start,
            end,
            text: text.to_string(),
            label_identifier: Some(create_uuid(false)),
            ..Default::default()
        }
    }

    /// Returns a geNomad score window segment.
    pub fn genomad(
        start: u64,
        end: u64,
        text: &str,
        plasmid: f64,
        virus: f64,
        chromosome: f64,
    ) -> Self {
        RingSegment {
            start,
            end,
            text: text.to_string(),
            plasmid: Some(plasmid),
            virus: Some(virus),
            chromosome: Some(chromosome),
            ..Default::default()
        }
    }

    /// Set the segment color in place.
    pub fn with_color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    /// Length of the interval covered by this segment.
    pub fn length(&self) -> u64 {
        self.end.saturating_sub(self.start)
    }
}
