//! Integration tests for materials over the substance registry.

use amalgam_core::reference::{HomogeneousReference, Reference, SubstanceReference};
use amalgam_matter::{codec, Material, Matter, Shape};

fn water() -> Reference {
    HomogeneousReference::new("water").into()
}

fn benzene() -> Reference {
    HomogeneousReference::new("benzene").into()
}

#[test]
fn proportion_invariant_across_operation_sequences() {
    let mut material = Material::of_substance(water(), Shape::sphere(0.1), 5.0, 998.2);

    material.add_constituent(benzene(), 0.3).unwrap();
    material
        .add_constituents([
            (Reference::from(SubstanceReference::new("steel")), 0.1),
            (Reference::from(HomogeneousReference::new("ethanol")), 0.05),
        ])
        .unwrap();
    material.remove_constituent(&benzene());
    material.remove_constituents(|reference, share| reference.id() == "steel" && share > 0.0);

    let sum: f64 = material.constituents.iter().map(|(_, share)| share).sum();
    assert!((sum - 1.0).abs() < 1e-12, "sum was {sum}");
    for (_, share) in material.constituents.iter() {
        assert!(share > 0.0 && share <= 1.0, "share {share} out of (0, 1]");
    }
}

#[test]
fn split_preserves_composition_per_band() {
    let mut material = Material::of_substance(water(), Shape::sphere(0.2), 1.0, 930.0);
    material.add_constituent(benzene(), 0.5).unwrap();

    let composite = material.split(&[0.8]).unwrap();

    // Only mass bands change; each layer still reports the 50/50 blend
    assert!((composite.components[0].proportion_of(&water()) - 0.5).abs() < 1e-12);
    assert!((composite.components[0].mass - 0.8).abs() < 1e-12);
    assert!((composite.components[1].mass - 0.2).abs() < 1e-12);
    assert_eq!(composite.shape, material.shape);
}

#[test]
fn material_roundtrip_with_resolution() {
    let mut material = Material::of_substance(water(), Shape::cuboid([0.2, 0.2, 0.2]), 8.0, 998.2)
        .with_temperature(300.0);
    material.add_constituent(benzene(), 0.25).unwrap();

    let text = codec::encode(&material.clone().into()).unwrap();
    let decoded = codec::decode(&text).unwrap();
    let Matter::Material(recovered) = decoded else {
        panic!("expected a plain material");
    };
    assert_eq!(recovered, material);

    // References stay self-contained values and resolve on demand
    for (reference, _) in recovered.constituents.iter() {
        assert!(!reference.substance().is_none(), "{reference} went stale");
    }
}

#[test]
fn composite_roundtrip_disambiguates() {
    let material = Material::of_substance(water(), Shape::sphere(0.3), 12.0, 998.2);
    let composite = material.split(&[0.5, 0.25, 0.25]).unwrap();

    let text = codec::encode(&composite.clone().into()).unwrap();
    let decoded = codec::decode(&text).unwrap();
    assert!(decoded.is_composite());
    assert_eq!(decoded, Matter::Composite(composite));
}

#[test]
fn stale_material_references_degrade_to_none() {
    let material = Material::of_substance(
        SubstanceReference::new("discontinued-substance"),
        Shape::origin(),
        1.0,
        1000.0,
    );
    let text = codec::encode(&material.into()).unwrap();
    let Matter::Material(recovered) = codec::decode(&text).unwrap() else {
        panic!("expected a plain material");
    };
    let (reference, share) = recovered.constituents.iter().next().unwrap();
    assert_eq!(share, 1.0);
    assert!(reference.substance().is_none());
}

#[test]
fn empty_material_reset_after_bulk_removal() {
    let mut material = Material::of_substance(water(), Shape::sphere(1.0), 3.0, 998.2)
        .with_temperature(310.0);
    material.add_constituent(benzene(), 0.4).unwrap();
    material.remove_constituents(|_, _| true);
    assert_eq!(material, Material::empty());
}
