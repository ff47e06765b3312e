//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use supercluster::PointFeature;

/// Deterministic scatter of `n` points over the inhabited latitudes.
pub fn scattered_points(n: usize) -> Vec<PointFeature> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = || {
        state ^= state << 13;
        state ^= state >> 7;
        state ^= state << 17;
        (state >> 11) as f64 / (1u64 << 53) as f64
    };

    (0..n)
        .map(|i| {
            let lng = next() * 360.0 - 180.0;
            let lat = next() * 140.0 - 70.0;
            PointFeature::new(lng, lat)
                .with_id(i as u64)
                .with_property("weight", (i % 7) as u64)
        })
        .collect()
}

/// Four points within a few meters of (0, 0) plus one far away.
pub fn tight_group_and_outlier() -> Vec<PointFeature> {
    vec![
        PointFeature::new(0.0, 0.0).with_id(0u64),
        PointFeature::new(0.0001, 0.0).with_id(1u64),
        PointFeature::new(0.0, 0.0001).with_id(2u64),
        PointFeature::new(0.0001, 0.0001).with_id(3u64),
        PointFeature::new(100.0, 45.0).with_id(4u64),
    ]
}

/// A 10x10 grid with 0.01 degree spacing around (10, 10).
pub fn dense_grid() -> Vec<PointFeature> {
    let mut points = Vec::new();
    for i in 0..10 {
        for j in 0..10 {
            let id = (i * 10 + j) as u64;
            points.push(
                PointFeature::new(10.0 + i as f64 * 0.01, 10.0 + j as f64 * 0.01).with_id(id),
            );
        }
    }
    points
}

pub fn feature_ids(features: &[PointFeature]) -> Vec<u64> {
    let mut ids: Vec<u64> = features
        .iter()
        .map(|f| match &f.id {
            Some(supercluster::FeatureId::Number(n)) => *n,
            other => panic!("unexpected id {:?}", other),
        })
        .collect();
    ids.sort_unstable();
    ids
}
