use nimbus_volume::bake::quantize;
use nimbus_volume::{VolumeRecipe, bake};
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    // Every baked voxel lands at the expected index, and two bakes agree
    #[test]
    fn small_bakes_are_deterministic(seed in any::<u32>(), size in 1usize..5) {
        let a = bake(&VolumeRecipe::detail(size, seed)).unwrap();
        let b = bake(&VolumeRecipe::detail(size, seed)).unwrap();
        prop_assert_eq!(a.as_bytes().len(), size * size * size * 4);
        prop_assert_eq!(a.as_bytes(), b.as_bytes());
    }
}

proptest! {
    #[test]
    fn quantize_is_monotone(a in -1e4f64..1e4, b in -1e4f64..1e4) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(quantize(lo) <= quantize(hi));
    }
}
