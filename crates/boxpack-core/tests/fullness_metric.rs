use boxpack_core::Packer;

#[test]
fn empty_packer_reports_full() {
    let packer: Packer = Packer::new(100.0, 100.0);
    assert_eq!(packer.fullness(), 1.0);
}

/// Test an exact tiling that needs one rotated placement
#[test]
fn exact_tiling_reports_full() {
    let mut packer = Packer::new(120.0, 80.0);
    packer.add_box(60.0, 80.0, "tall");
    packer.add_box(60.0, 40.0, "upper");
    packer.add_box(60.0, 40.0, "lower");
    assert_eq!(packer.pack().len(), 3);
    assert_eq!(packer.free_count(), 0);
    assert_eq!(packer.fullness(), 1.0);
}

#[test]
fn reachable_free_space_does_not_count_against_fullness() {
    // half-full container, remaining band open to the boundary
    let mut packer = Packer::new(100.0, 100.0);
    packer.add_box(100.0, 50.0, "half");
    packer.pack();
    assert_eq!(packer.fullness(), 1.0);
}

#[test]
fn sealed_pocket_lowers_fullness() {
    let mut packer = Packer::new(100.0, 100.0);
    packer.add_box(60.0, 60.0, "corner");
    packer.pack();
    assert!((packer.fullness() - 0.6).abs() < 1e-12);
}

#[test]
fn cache_survives_reads_and_invalidates_on_changes() {
    let mut packer = Packer::new(100.0, 100.0);
    packer.add_box(100.0, 50.0, "half");
    packer.pack();
    assert_eq!(packer.fullness(), 1.0);
    assert_eq!(packer.fullness(), 1.0);

    // a rejected box leaves the layout alone but still refreshes the metric
    packer.add_box(200.0, 300.0, "impossible");
    packer.pack();
    assert_eq!(packer.fullness(), 1.0);

    // growing the container seals yesterday's boundary band
    packer.resize_container(100.0, 120.0);
    assert_eq!(packer.fullness(), 0.5);
}
