//! JSON exports and the radial arc layout for downstream renderers.

use crate::ring::Ring;
use crate::session::Session;

use color_eyre::eyre::{eyre, Report, Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::fs::File;
use std::io::Write;
use std::path::Path;

// ----------------------------------------------------------------------------
// Radial Layout
// ----------------------------------------------------------------------------

/// Base radius and inter-ring spacing of the ring stack, in pixels.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct LayoutOptions {
    pub radius: f64,
    pub gap: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        LayoutOptions {
            radius: 200.0,
            gap: 5.0,
        }
    }
}

/// One renderable arc of the circular plot.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ArcSegment {
    pub inner: f64,
    pub outer: f64,
    pub start: u64,
    pub end: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub text: String,
}

/// Transform a ring stack into renderable arcs, innermost ring first.
///
/// Rings are stacked outwards from the base radius. Hidden rings are skipped
/// without reserving radial space, and segments without their own color fall
/// back to the ring color.
pub fn radial_layout(rings: &[&Ring], options: &LayoutOptions) -> Vec<ArcSegment> {
    let mut arcs = Vec::new();
    let mut radius = options.radius;

    for ring in rings {
        if !ring.visible {
            continue;
        }
        let height = ring.height as f64;
        for segment in &ring.data {
            arcs.push(ArcSegment {
                inner: radius,
                outer: radius + height,
                start: segment.start,
                end: segment.end,
                color: segment.color.clone().or_else(|| Some(ring.color.clone())),
                text: segment.text.clone(),
            });
        }
        radius += height + options.gap;
    }

    arcs
}

// ----------------------------------------------------------------------------
// JSON Export
// ----------------------------------------------------------------------------

/// Write a serializable value as pretty-printed JSON with a trailing newline.
pub fn write_json<T, P>(value: &T, path: &P) -> Result<(), Report>
where
    T: Serialize,
    P: AsRef<Path> + Debug,
{
    let mut file = File::create(path.as_ref())
        .wrap_err(eyre!("Failed to create export file: {path:?}"))?;
    let output =
        serde_json::to_string_pretty(value).wrap_err("Failed to serialize export data")?;
    file.write_all(format!("{}\n", output).as_bytes())
        .wrap_err(eyre!("Failed to write export file: {path:?}"))?;
    Ok(())
}

/// Export only the ring array of a session.
pub fn write_rings<P>(session: &Session, path: &P) -> Result<(), Report>
where
    P: AsRef<Path> + Debug,
{
    write_json(&session.rings, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::{Ring, RingReference, RingSegment, RingType};

    fn reference() -> RingReference {
        RingReference::new("s-1", "ref-1", "chr1", 4_000_000)
    }

    #[test]
    fn arcs_stack_outwards_with_gaps() {
        let reference = reference();
        let inner = Ring::from_reference(&reference);
        let outer = Ring::new(RingType::Blast, &reference)
            .with_data(vec![RingSegment::new(0, 1000, "hit")]);

        let options = LayoutOptions::default();
        let arcs = radial_layout(&[&inner, &outer], &options);

        assert_eq!(arcs.len(), 2);
        assert_eq!((arcs[0].inner, arcs[0].outer), (200.0, 220.0));
        assert_eq!((arcs[1].inner, arcs[1].outer), (225.0, 245.0));
    }

    #[test]
    fn hidden_rings_reserve_no_radial_space() {
        let reference = reference();
        let mut hidden = Ring::from_reference(&reference);
        hidden.visible = false;
        let outer = Ring::new(RingType::Blast, &reference)
            .with_data(vec![RingSegment::new(0, 1000, "hit")]);

        let arcs = radial_layout(&[&hidden, &outer], &LayoutOptions::default());

        assert_eq!(arcs.len(), 1);
        assert_eq!(arcs[0].inner, 200.0);
    }

    #[test]
    fn segment_color_falls_back_to_ring_color() {
        let reference = reference();
        let ring = Ring::new(RingType::Annotation, &reference)
            .with_color("#6ea8ab")
            .with_data(vec![
                RingSegment::new(0, 100, "a").with_color("#000000"),
                RingSegment::new(200, 300, "b"),
            ]);

        let arcs = radial_layout(&[&ring], &LayoutOptions::default());
        assert_eq!(arcs[0].color.as_deref(), Some("#000000"));
        assert_eq!(arcs[1].color.as_deref(), Some("#6ea8ab"));
    }

    #[test]
    fn export_is_pretty_printed_json() -> Result<(), Report> {
        let arcs = vec![ArcSegment {
            inner: 200.0,
            outer: 220.0,
            start: 0,
            end: 1000,
            color: None,
            text: String::new(),
        }];

        let file = tempfile::NamedTempFile::new()?;
        write_json(&arcs, &file.path())?;

        let written = std::fs::read_to_string(file.path())?;
        assert!(written.starts_with("[\n  {\n    \"inner\": 200.0"));
        assert!(written.ends_with('\n'));
        Ok(())
    }
}
