//! Elevation bands used to color the terrain.
//!
//! Bands are discrete: a sample picks exactly one band by strict `<` comparison
//! against ascending upper bounds, with no blending at band edges.

/// Elevation band, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElevationBand {
    /// Open water.
    Water,
    /// Wet sand at the shoreline.
    Sand,
    /// Dry beach.
    Beach,
    /// Grassy lowland.
    Lowland,
    /// Dense jungle on the hills.
    Jungle,
    /// Bare rock.
    Mountain,
    /// Snow caps.
    Snow,
}

impl ElevationBand {
    /// Every band in ascending order.
    pub const ALL: [ElevationBand; 7] = [
        ElevationBand::Water,
        ElevationBand::Sand,
        ElevationBand::Beach,
        ElevationBand::Lowland,
        ElevationBand::Jungle,
        ElevationBand::Mountain,
        ElevationBand::Snow,
    ];

    /// Exclusive upper bound of each band below `Snow`.
    pub const THRESHOLDS: [(ElevationBand, f32); 6] = [
        (ElevationBand::Water, 0.20),
        (ElevationBand::Sand, 0.25),
        (ElevationBand::Beach, 0.30),
        (ElevationBand::Lowland, 0.45),
        (ElevationBand::Jungle, 0.60),
        (ElevationBand::Mountain, 0.75),
    ];

    /// Band for a height-field sample. Values outside `[0, 1]` land in `Water` or `Snow`.
    pub fn classify(sample: f32) -> Self {
        Self::THRESHOLDS
            .iter()
            .find(|(_, upper)| sample < *upper)
            .map(|(band, _)| *band)
            .unwrap_or(ElevationBand::Snow)
    }

    /// Vertex color for the band.
    pub fn color(self) -> [f32; 3] {
        match self {
            ElevationBand::Water => [0.10, 0.30, 0.70],
            ElevationBand::Sand => [0.76, 0.70, 0.50],
            ElevationBand::Beach => [0.90, 0.85, 0.60],
            ElevationBand::Lowland => [0.35, 0.60, 0.25],
            ElevationBand::Jungle => [0.12, 0.40, 0.15],
            ElevationBand::Mountain => [0.45, 0.42, 0.40],
            ElevationBand::Snow => [0.95, 0.95, 0.98],
        }
    }

    /// Position in [`ElevationBand::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Count of lattice points per elevation band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BandHistogram {
    counts: [usize; 7],
}

impl BandHistogram {
    /// Classify every sample.
    pub fn from_samples(samples: &[f32]) -> Self {
        let mut counts = [0usize; 7];
        for &s in samples {
            counts[ElevationBand::classify(s).index()] += 1;
        }
        Self { counts }
    }

    pub fn count(&self, band: ElevationBand) -> usize {
        self.counts[band.index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// `(band, count)` pairs in ascending band order.
    pub fn iter(&self) -> impl Iterator<Item = (ElevationBand, usize)> + '_ {
        ElevationBand::ALL.iter().map(|&b| (b, self.count(b)))
    }
}
