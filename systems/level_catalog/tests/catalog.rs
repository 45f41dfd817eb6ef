use std::collections::HashSet;

use snake3d_core::Cell;
use snake3d_level_catalog::Catalog;

#[test]
fn every_authored_level_passes_validation() {
    let catalog = Catalog::new();
    catalog
        .validate()
        .unwrap_or_else(|(index, error)| panic!("level {}: {error}", index.get()));
}

#[test]
fn catalog_has_ten_levels_with_distinct_names() {
    let catalog = Catalog::new();
    assert_eq!(catalog.len(), 10);

    let names: HashSet<&str> = catalog.iter().map(|descriptor| descriptor.name()).collect();
    assert_eq!(names.len(), 10);
}

#[test]
fn walls_always_land_inside_their_bounds() {
    let catalog = Catalog::new();
    for descriptor in catalog.iter() {
        let bounds = descriptor.bounds();
        for cell in descriptor.wall_cells() {
            assert!(
                bounds.contains(cell),
                "{}: wall {cell:?} outside bounds",
                descriptor.name()
            );
        }
    }
}

#[test]
fn spawns_keep_every_orthogonal_exit_clear() {
    let catalog = Catalog::new();
    for descriptor in catalog.iter() {
        let walls = descriptor.wall_cells();
        let spawn = descriptor.spawn().cell();
        assert!(!walls.contains(&spawn), "{}", descriptor.name());
        for (dx, dz) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let near = Cell::new(spawn.x() + dx, spawn.z() + dz);
            if descriptor.bounds().contains(near) {
                assert!(
                    !walls.contains(&near),
                    "{}: wall {near:?} blocks the spawn",
                    descriptor.name()
                );
            }
        }
    }
}
