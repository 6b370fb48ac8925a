use crate::ring::{Ring, RingCollection, RingReference, RingSegment, RingType};

use color_eyre::eyre::{Report, Result};
use itertools::Itertools;

fn reference() -> RingReference {
    RingReference::new("session-a", "ref-1", "chr1", 4_000_000)
}

fn other_reference() -> RingReference {
    RingReference::new("session-a", "ref-2", "plasmid-1", 120_000)
}

fn group_indices(rings: &RingCollection, reference: &RingReference) -> Vec<usize> {
    rings
        .rings()
        .iter()
        .filter(|ring| ring.reference.same_group(reference))
        .map(|ring| ring.index)
        .sorted()
        .collect()
}

fn group_ids(rings: &RingCollection, reference: &RingReference) -> Vec<String> {
    rings
        .rings()
        .iter()
        .filter(|ring| ring.reference.same_group(reference))
        .map(|ring| ring.id.clone())
        .collect()
}

#[test]
fn insert_assigns_contiguous_indices() -> Result<(), Report> {
    let reference = reference();
    let mut rings = RingCollection::new();

    for i in 0..5 {
        rings.insert(Ring::new(RingType::Blast, &reference));
        let expected: Vec<usize> = (0..=i).collect();
        assert_eq!(group_indices(&rings, &reference), expected);
    }
    Ok(())
}

#[test]
fn label_insert_into_empty_group_starts_at_zero() -> Result<(), Report> {
    let mut rings = RingCollection::new();
    rings.insert(Ring::new(RingType::Label, &reference()));

    assert_eq!(rings.len(), 1);
    assert_eq!(rings.rings()[0].index, 0);
    Ok(())
}

#[test]
fn label_merge_grows_data_not_ring_count() -> Result<(), Report> {
    let reference = reference();
    let mut rings = RingCollection::new();

    rings.insert(Ring::from_reference(&reference));
    rings.insert(
        Ring::new(RingType::Label, &reference)
            .with_data(vec![RingSegment::label(100, 100, "dnaA")]),
    );
    assert_eq!(rings.len(), 2);

    rings.insert(
        Ring::new(RingType::Label, &reference)
            .with_data(vec![RingSegment::label(900, 900, "gyrB")]),
    );

    assert_eq!(rings.len(), 2);
    let label = rings
        .filtered(Some(&reference))
        .last()
        .cloned()
        .cloned()
        .expect("label ring present");
    assert_eq!(label.ring_type, RingType::Label);
    assert_eq!(label.data.len(), 2);
    assert_eq!(group_indices(&rings, &reference), vec![0, 1]);
    Ok(())
}

#[test]
fn label_merge_skips_exact_duplicates() -> Result<(), Report> {
    let reference = reference();
    let duplicate = RingSegment::label(100, 100, "dnaA");

    let mut rings = RingCollection::new();
    rings.insert(Ring::new(RingType::Label, &reference).with_data(vec![duplicate.clone()]));
    rings.insert(
        Ring::new(RingType::Label, &reference)
            .with_data(vec![duplicate, RingSegment::label(500, 500, "recA")]),
    );

    let label = rings.rings()[0].clone();
    assert_eq!(label.data.len(), 2);
    Ok(())
}

#[test]
fn non_label_insert_keeps_label_outermost() -> Result<(), Report> {
    let reference = reference();
    let mut rings = RingCollection::new();

    rings.insert(Ring::from_reference(&reference));
    rings.insert(Ring::new(RingType::Label, &reference));

    for _ in 0..3 {
        rings.insert(Ring::new(RingType::Blast, &reference));
        let view = rings.filtered(Some(&reference));
        assert_eq!(view.last().expect("non-empty view").ring_type, RingType::Label);
    }

    assert_eq!(group_indices(&rings, &reference), vec![0, 1, 2, 3, 4]);
    Ok(())
}

#[test]
fn insert_does_not_renumber_other_groups() -> Result<(), Report> {
    let reference = reference();
    let other = other_reference();
    let mut rings = RingCollection::new();

    rings.insert(Ring::from_reference(&other));
    rings.insert(Ring::new(RingType::Annotation, &other));
    let before: Vec<usize> = group_indices(&rings, &other);

    rings.insert(Ring::from_reference(&reference));
    rings.insert(Ring::new(RingType::Blast, &reference));

    assert_eq!(group_indices(&rings, &other), before);
    Ok(())
}

#[test]
fn remove_reindexes_group_members_only() -> Result<(), Report> {
    let reference = reference();
    let other = other_reference();
    let mut rings = RingCollection::new();

    rings.insert(Ring::from_reference(&reference));
    rings.insert(Ring::new(RingType::Blast, &reference));
    rings.insert(Ring::new(RingType::Annotation, &reference));
    rings.insert(Ring::from_reference(&other));
    rings.insert(Ring::new(RingType::Blast, &other));

    let members = group_ids(&rings, &reference);
    let removed = members[1].clone();
    let outside_before: Vec<usize> = group_indices(&rings, &other);

    rings.remove(&removed, &members);

    assert_eq!(rings.get(&removed), None);
    assert_eq!(group_indices(&rings, &reference), vec![0, 1]);
    assert_eq!(group_indices(&rings, &other), outside_before);
    Ok(())
}

#[test]
fn remove_unknown_id_is_a_noop() -> Result<(), Report> {
    let reference = reference();
    let mut rings = RingCollection::new();
    rings.insert(Ring::from_reference(&reference));

    let members = group_ids(&rings, &reference);
    rings.remove("missing", &members);

    assert_eq!(rings.len(), 1);
    assert_eq!(group_indices(&rings, &reference), vec![0]);
    Ok(())
}

#[test]
fn filtered_matches_all_reference_components() -> Result<(), Report> {
    let reference = reference();
    let mut foreign = reference.clone();
    foreign.session_id = "session-b".to_string();

    let mut rings = RingCollection::new();
    rings.insert(Ring::from_reference(&reference));
    rings.insert(Ring::new(RingType::Blast, &foreign));

    // same ordering group, distinct display contexts
    assert_eq!(group_indices(&rings, &reference), vec![0, 1]);
    assert_eq!(rings.filtered(Some(&reference)).len(), 1);
    assert_eq!(rings.filtered(Some(&foreign)).len(), 1);
    assert_eq!(rings.filtered(None).len(), 2);
    Ok(())
}

#[test]
fn filtered_view_is_sorted_and_current() -> Result<(), Report> {
    let reference = reference();
    let mut rings = RingCollection::new();

    rings.insert(Ring::from_reference(&reference));
    rings.insert(Ring::new(RingType::Blast, &reference));
    rings.insert(Ring::new(RingType::Annotation, &reference));

    let view = rings.filtered(Some(&reference));
    let indices: Vec<usize> = view.iter().map(|ring| ring.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);

    // the view reflects later mutations on recomputation
    let id = view[0].id.clone();
    rings.set_title(&id, "Mycobacterium sp. SMC-2");
    assert_eq!(rings.filtered(Some(&reference))[0].title, "Mycobacterium sp. SMC-2");
    Ok(())
}

#[test]
fn move_inward_swaps_with_inner_neighbor() -> Result<(), Report> {
    let reference = reference();
    let mut rings = RingCollection::new();

    rings.insert(Ring::from_reference(&reference));
    rings.insert(Ring::new(RingType::Blast, &reference));

    let outer = rings.filtered(Some(&reference))[1].id.clone();
    rings.move_inward(&outer);

    assert_eq!(rings.get(&outer).expect("ring present").index, 0);
    assert_eq!(group_indices(&rings, &reference), vec![0, 1]);

    // already innermost, nothing to do
    rings.move_inward(&outer);
    assert_eq!(rings.get(&outer).expect("ring present").index, 0);
    Ok(())
}

#[test]
fn move_outward_respects_boundary() -> Result<(), Report> {
    let reference = reference();
    let mut rings = RingCollection::new();

    rings.insert(Ring::from_reference(&reference));
    rings.insert(Ring::new(RingType::Blast, &reference));

    let max_index = rings.max_index(&reference).expect("group not empty");
    let inner = rings.filtered(Some(&reference))[0].id.clone();
    let outer = rings.filtered(Some(&reference))[1].id.clone();

    rings.move_outward(&outer, max_index);
    assert_eq!(rings.get(&outer).expect("ring present").index, max_index);

    rings.move_outward(&inner, max_index);
    assert_eq!(rings.get(&inner).expect("ring present").index, max_index);
    assert_eq!(rings.get(&outer).expect("ring present").index, 0);
    Ok(())
}

#[test]
fn point_mutations_are_silent_on_unknown_ids() -> Result<(), Report> {
    let reference = reference();
    let mut rings = RingCollection::new();
    rings.insert(Ring::from_reference(&reference));

    rings.set_visible("missing", false);
    rings.set_color("missing", "#000000");
    rings.set_title("missing", "nothing");

    let ring = &rings.rings()[0];
    assert!(ring.visible);
    assert_eq!(ring.color, super::DEFAULT_RING_COLOR);
    Ok(())
}

#[test]
fn point_mutations_apply_by_id() -> Result<(), Report> {
    let reference = reference();
    let mut rings = RingCollection::new();
    rings.insert(Ring::from_reference(&reference));

    let id = rings.rings()[0].id.clone();
    rings.set_visible(&id, false);
    rings.set_color(&id, "#6ea8ab");
    rings.set_title(&id, "SMC-2");

    let ring = rings.get(&id).expect("ring present");
    assert!(!ring.visible);
    assert_eq!(ring.color, "#6ea8ab");
    assert_eq!(ring.title, "SMC-2");
    Ok(())
}

#[test]
fn label_segment_edits_by_identifier() -> Result<(), Report> {
    let reference = reference();
    let segment = RingSegment::label(100, 100, "dnaA");
    let label_id = segment.label_identifier.clone().expect("identifier set");

    let mut rings = RingCollection::new();
    rings.insert(Ring::new(RingType::Label, &reference).with_data(vec![segment]));
    let ring_id = rings.rings()[0].id.clone();

    rings.set_label_text(&ring_id, &label_id, "dnaA (truncated)");
    rings.set_label_position(&ring_id, &label_id, 250, 250);
    rings.set_label_line_length(&ring_id, &label_id, 42.0);
    rings.set_label_line_angle(&ring_id, &label_id, 15.0);
    rings.set_label_line_color(&ring_id, &label_id, "#31333f");
    rings.set_label_text_color(&ring_id, &label_id, "#31333f");

    let segment = rings.rings()[0].data[0].clone();
    assert_eq!(segment.text, "dnaA (truncated)");
    assert_eq!((segment.start, segment.end), (250, 250));
    assert_eq!(segment.line_length, Some(42.0));
    assert_eq!(segment.line_angle, Some(15.0));
    assert_eq!(segment.line_color.as_deref(), Some("#31333f"));
    assert_eq!(segment.text_color.as_deref(), Some("#31333f"));

    rings.remove_label(&ring_id, &label_id);
    assert!(rings.rings()[0].data.is_empty());
    Ok(())
}

#[test]
fn label_edits_on_unknown_identifiers_are_silent() -> Result<(), Report> {
    let reference = reference();
    let mut rings = RingCollection::new();
    rings.insert(
        Ring::new(RingType::Label, &reference)
            .with_data(vec![RingSegment::label(100, 100, "dnaA")]),
    );
    let ring_id = rings.rings()[0].id.clone();

    rings.set_label_text(&ring_id, "missing", "changed");
    rings.set_label_text("missing", "missing", "changed");
    rings.remove_label(&ring_id, "missing");

    assert_eq!(rings.rings()[0].data.len(), 1);
    assert_eq!(rings.rings()[0].data[0].text, "dnaA");
    Ok(())
}
