use peakcore::interface::Peak;

/// Ring of synthetic peaks around the observer, nearest first.
pub fn peak_ring(count: usize, spacing_deg: f64, nearest_km: f64) -> Vec<Peak> {
    (0..count)
        .map(|i| {
            let distance = nearest_km + i as f64 * 1.5;
            let height = 300.0 + 40.0 * i as f64;
            let visual_elevation = (height / (distance * 1000.0)).atan();
            Peak::new(
                i as u32 + 1,
                format!("Peak {}", i + 1),
                (i as f64 * spacing_deg).rem_euclid(360.0),
                distance,
                height,
                visual_elevation,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_is_sorted_nearest_first() {
        let peaks = peak_ring(6, 75.0, 2.0);
        assert_eq!(peaks.len(), 6);
        assert!(peaks.windows(2).all(|pair| pair[0].distance < pair[1].distance));
        assert!(peaks.iter().all(|peak| (0.0..360.0).contains(&peak.bearing_deg)));
    }
}
