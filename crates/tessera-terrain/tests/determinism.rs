//! Cross-module determinism and seamlessness properties.

use tessera_terrain::{
    BiomeKind, FieldParams, HeightmapParams, HeightmapSampler, MaskGrid, Seed, SimplexNoise,
    StructureKind, StructureLayer, TileCoord, fractal_noise, generate_field, hash_field,
    tile_seed,
};

#[test]
fn test_reference_sample_abc() {
    let noise = SimplexNoise::new(&Seed::from("abc"));
    let value = fractal_noise(&noise, 3.7, -2.1, 4, 2.0, 0.5);
    assert_eq!(
        value.to_bits(),
        0xbfc9_f499_25a0_10ef,
        "Reference sample drifted: {value}"
    );
    assert_eq!(value, -0.20277704560442752);
}

#[test]
fn test_reference_sample_stable_across_instances() {
    let a = HeightmapSampler::new(HeightmapParams::with_seed("abc"));
    // Building an unrelated sampler in between must not perturb anything.
    let _other = HeightmapSampler::new(HeightmapParams::with_seed("zzz"));
    let b = HeightmapSampler::new(HeightmapParams::with_seed("abc"));
    assert_eq!(
        a.fractal(3.7, -2.1, 4).to_bits(),
        b.fractal(3.7, -2.1, 4).to_bits()
    );
}

#[test]
fn test_generation_order_does_not_matter() {
    let params = FieldParams {
        resolution: 12,
        ..FieldParams::new("order", BiomeKind::Canyon)
    };
    let east = params.for_tile(TileCoord::new(1, 0));

    let home_first = hash_field(&generate_field(&params, None).unwrap());
    let _ = generate_field(&east, None).unwrap();
    let home_second = hash_field(&generate_field(&params, None).unwrap());
    assert_eq!(home_first, home_second);
}

#[test]
fn test_home_tile_identity() {
    for seed in ["abc", "", "seed with spaces", "ünïcödé"] {
        assert_eq!(tile_seed(&Seed::from(seed), 0, 0), seed);
    }
}

#[test]
fn test_seam_continuity_across_resolutions() {
    for resolution in [1, 7, 32, 100] {
        for tile_size in [10.0, 33.3, 250.0] {
            let params = FieldParams {
                resolution,
                tile_size,
                ..FieldParams::new("seams", BiomeKind::Alien)
            };
            let home = generate_field(&params, None).unwrap();
            let east = generate_field(&params.for_tile(TileCoord::new(1, 0)), None).unwrap();
            let last = home.size() - 1;
            for iz in 0..home.size() {
                assert_eq!(
                    home.world_position(last as u32, iz as u32),
                    east.world_position(0, iz as u32),
                    "World positions diverge at res={resolution} size={tile_size}"
                );
                assert_eq!(
                    home.get(last, iz).unwrap().height.to_bits(),
                    east.get(0, iz).unwrap().height.to_bits(),
                    "Heights diverge at res={resolution} size={tile_size} row={iz}"
                );
            }
        }
    }
}

#[test]
fn test_structure_layer_flattens_home_tile() {
    let grid = MaskGrid::new(10, 10.0);
    let mut layer = StructureLayer::new(grid);
    layer.place(StructureKind::Pyramid, 5, 5);

    let params = FieldParams {
        resolution: 50,
        flatten_target: -0.1,
        ..FieldParams::new("flat", BiomeKind::Grassland)
    };
    let mask = layer.mask();
    let field = generate_field(&params, Some(&mask)).unwrap();

    // Cell (5, 5) spans local [0, 10)²; vertex step is 2 units.
    for iz in 26..30 {
        for ix in 26..30 {
            assert_eq!(field.get(ix, iz).unwrap().final_height, -0.1);
        }
    }

    // Far outside the padding ring.
    let s = field.get(5, 5).unwrap();
    assert_eq!(s.final_height, s.height);
}
