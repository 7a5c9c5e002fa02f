use dimer_core::derive_substream_seed;

const PREVIEW_STREAM: u64 = 0x5052_4556;
const SAMPLE_STREAM: u64 = 0x4346_5450;

/// Seed of the preview chain's random stream.
pub fn preview_seed(master_seed: u64) -> u64 {
    derive_substream_seed(master_seed, PREVIEW_STREAM)
}

/// Master seed of the `sample_index`-th exact sample.
pub fn sample_seed(master_seed: u64, sample_index: u64) -> u64 {
    derive_substream_seed(master_seed ^ SAMPLE_STREAM, sample_index)
}

/// Seed of the block prepended by epoch `epoch_index` (zero based).
pub fn epoch_seed(sample_seed: u64, epoch_index: usize) -> u64 {
    derive_substream_seed(sample_seed, epoch_index as u64)
}
