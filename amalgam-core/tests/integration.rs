//! Integration tests covering round trips across the substance hierarchy.

use amalgam_core::{
    codec, registry, Chemical, HomogeneousReference, HomogeneousSubstance, Mixture, Reference,
    Solution, Substance, SubstanceReference,
};

fn sample_chemical() -> Substance {
    Substance::Chemical(
        Chemical::new(
            "test-ethanol",
            "Ethanol",
            "C2H6O".parse().unwrap(),
            789.3,
            159.05,
            351.44,
        )
        .with_categories(["organic", "solvent"]),
    )
}

fn sample_uniform() -> Substance {
    Substance::HomogeneousSubstance(
        HomogeneousSubstance::new("test-cellulose", "Cellulose", 1500.0, 533.0, 533.0)
            .with_categories(["biological", "polymer"])
            .with_molar_mass(162.14),
    )
}

fn sample_mixture() -> Substance {
    let mut brass = Mixture::new("test-brass", "Brass").with_categories(["alloy"]);
    brass
        .add_constituents([
            (HomogeneousReference::new("copper"), 0.63),
            (HomogeneousReference::new("zinc"), 0.37),
        ])
        .unwrap();
    Substance::Mixture(brass)
}

fn sample_solution() -> Substance {
    Substance::Solution(
        Solution::new("test-brine", "Brine", HomogeneousReference::new("water"))
            .with_solute(HomogeneousReference::new("sodium-chloride"), 0.035)
            .unwrap(),
    )
}

fn all_samples() -> Vec<Substance> {
    vec![
        sample_chemical(),
        sample_uniform(),
        sample_mixture(),
        sample_solution(),
    ]
}

#[test]
fn every_variant_roundtrips_through_the_sum_type() {
    for original in all_samples() {
        let text = codec::encode(&original).unwrap();
        let decoded = codec::decode(&text).unwrap();
        assert_eq!(decoded, original, "round trip for {}", original.id());
        assert_eq!(decoded.discriminator(), original.discriminator());
    }
}

#[test]
fn homogeneous_variants_roundtrip_through_the_capability_paths() {
    for original in [sample_chemical(), sample_uniform()] {
        let text = codec::encode(&original).unwrap();
        let strict = codec::decode_homogeneous(&text).unwrap();
        assert_eq!(strict, original);
        let lenient = codec::decode_homogeneous_lenient(&text).unwrap();
        assert_eq!(lenient, original);
    }
}

#[test]
fn concrete_codecs_roundtrip() {
    let text = codec::encode(&sample_chemical()).unwrap();
    let chemical = codec::decode_chemical(&text).unwrap();
    assert_eq!(Substance::Chemical(chemical), sample_chemical());

    let text = codec::encode(&sample_solution()).unwrap();
    let solution = codec::decode_solution(&text).unwrap();
    assert_eq!(Substance::Solution(solution), sample_solution());
}

#[test]
fn registry_entries_roundtrip() {
    for original in registry::all() {
        let text = codec::encode(original).unwrap();
        let decoded = codec::decode(&text).unwrap();
        assert_eq!(&decoded, original, "round trip for {}", original.id());
    }
}

#[test]
fn constituent_maps_serialize_as_token_keyed_objects() {
    let value = codec::encode_value(&sample_mixture()).unwrap();
    let constituents = value["constituents"].as_object().unwrap();
    assert!((constituents["HR:copper"].as_f64().unwrap() - 0.63).abs() < 1e-12);
    assert!((constituents["HR:zinc"].as_f64().unwrap() - 0.37).abs() < 1e-12);

    let value = codec::encode_value(&sample_solution()).unwrap();
    let constituents = value["constituents"].as_object().unwrap();
    assert!(constituents.keys().all(|key| key.starts_with("HR:")));
    assert_eq!(value["solvent"], "HR:water");
}

#[test]
fn reference_equality_is_symmetric() {
    let water = registry::catalog::water();
    let by_sr = SubstanceReference::new("water");
    let by_hr = HomogeneousReference::new("water");

    assert!(by_sr == *water);
    assert!(*water == by_sr);
    assert!(by_hr == *water);
    assert!(*water == by_hr);
    assert_eq!(by_sr.id(), water.reference().id());

    // Kind compatibility: HR never equals a composite
    let brass = registry::catalog::brass();
    let brass_hr = HomogeneousReference::new("brass");
    assert!(brass_hr != *brass);
    assert!(*brass != brass_hr);
    let brass_sr = SubstanceReference::new("brass");
    assert!(brass_sr == *brass);

    // The empty sentinel equals nothing
    assert!(SubstanceReference::empty() != *water);

    let as_general = Reference::from(by_sr);
    assert!(as_general == *water);
    assert!(*water == as_general);
}

#[test]
fn references_resolve_after_roundtrip_without_registry_refetch() {
    // A decoded mixture's references are self-contained value objects; they
    // resolve against the registry only when asked.
    let text = codec::encode(&sample_mixture()).unwrap();
    let decoded = codec::decode(&text).unwrap();
    let Substance::Mixture(mixture) = decoded else {
        panic!("expected mixture");
    };
    let copper = HomogeneousReference::new("copper");
    assert!((mixture.proportion_of(&copper) - 0.63).abs() < 1e-12);
    assert_eq!(copper.substance().name(), "Copper");
}

#[test]
fn stale_references_degrade_to_none() {
    let mut orphaned = Mixture::new("orphaned", "Orphaned");
    orphaned
        .add_constituent(HomogeneousReference::new("unobtainium"), 1.0)
        .unwrap();
    let text = codec::encode(&Substance::Mixture(orphaned)).unwrap();
    let decoded = codec::decode(&text).unwrap();
    let Substance::Mixture(mixture) = decoded else {
        panic!("expected mixture");
    };
    let (reference, share) = mixture.constituents.iter().next().unwrap();
    assert_eq!(share, 1.0);
    assert!(reference.substance().is_none());
}

#[test]
fn substances_in_collections_roundtrip() {
    let originals = all_samples();
    let text = serde_json::to_string(&originals).unwrap();
    let decoded: Vec<Substance> = serde_json::from_str(&text).unwrap();
    assert_eq!(decoded, originals);
}

#[test]
fn proportion_invariant_survives_mixed_mutation() {
    let mut mixture = Mixture::new("scratch", "Scratch");
    let parts = ["water", "ethanol", "glycerol", "benzene"];
    for (i, id) in parts.iter().enumerate() {
        mixture
            .add_constituent(HomogeneousReference::new(*id), 0.2 + 0.1 * i as f64)
            .unwrap();
        let sum: f64 = mixture.constituents.iter().map(|(_, share)| share).sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }
    mixture.remove_constituent(&HomogeneousReference::new("ethanol"));
    let sum: f64 = mixture.constituents.iter().map(|(_, share)| share).sum();
    assert!((sum - 1.0).abs() < 1e-12);
    for (_, share) in mixture.constituents.iter() {
        assert!(share > 0.0 && share <= 1.0);
    }
}
