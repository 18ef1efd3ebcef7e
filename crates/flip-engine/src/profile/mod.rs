//! Frame duration sampling.

use std::time::Instant;

pub const RECORD_LEN: usize = 64;

/// Ring buffer of the last [`RECORD_LEN`] samples.
///
/// `push` advances the cursor before writing, so the first sample lands in
/// slot 1 and slot 0 stays at zero until the buffer wraps. Statistics over
/// `view().data` include that zero during the first 63 pushes.
#[derive(Debug, Clone)]
pub struct ProfileRecord {
    record: [f32; RECORD_LEN],
    offset: usize,
}

/// Raw storage plus the slot of the most recent sample.
#[derive(Debug, Copy, Clone)]
pub struct ProfileView<'a> {
    pub data: &'a [f32],
    pub offset: usize,
}

impl ProfileView<'_> {
    /// Samples from oldest to newest.
    pub fn chronological(&self) -> impl Iterator<Item = f32> + '_ {
        let (head, tail) = self.data.split_at(self.offset + 1);
        tail.iter().chain(head.iter()).copied()
    }
}

impl Default for ProfileRecord {
    fn default() -> Self {
        Self { record: [0.0; RECORD_LEN], offset: 0 }
    }
}

impl ProfileRecord {
    pub fn push(&mut self, value: f32) {
        self.offset = (self.offset + 1) % RECORD_LEN;
        self.record[self.offset] = value;
    }

    /// Most recent sample.
    pub fn front(&self) -> f32 {
        self.record[self.offset]
    }

    pub fn view(&self) -> ProfileView<'_> {
        ProfileView { data: &self.record, offset: self.offset }
    }

    pub fn stats(&self) -> ProfileStats {
        stats(&self.record)
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ProfileStats {
    pub min: f32,
    pub mean: f32,
    pub max: f32,
}

/// Min, mean and max of `data`; all zero for an empty slice.
pub fn stats(data: &[f32]) -> ProfileStats {
    if data.is_empty() {
        return ProfileStats::default();
    }

    let (min, max, sum) = data.iter().fold(
        (f32::INFINITY, f32::NEG_INFINITY, 0.0),
        |(min, max, sum), &v| (min.min(v), max.max(v), sum + v),
    );
    ProfileStats { min, mean: sum / data.len() as f32, max }
}

/// Scope guard pushing its lifetime, in milliseconds, into a record on drop.
#[must_use = "the sample is recorded when the guard is dropped"]
pub struct Profile<'a> {
    record: &'a mut ProfileRecord,
    start: Instant,
}

impl<'a> Profile<'a> {
    pub fn new(record: &'a mut ProfileRecord) -> Self {
        Self { record, start: Instant::now() }
    }
}

impl Drop for Profile<'_> {
    fn drop(&mut self) {
        let ms = self.start.elapsed().as_secs_f64() * 1000.0;
        self.record.push(ms as f32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_sample_lands_in_slot_one() {
        let mut r = ProfileRecord::default();
        r.push(5.0);
        let view = r.view();
        assert_eq!(view.offset, 1);
        assert_eq!(view.data[0], 0.0);
        assert_eq!(view.data[1], 5.0);
        assert_eq!(r.front(), 5.0);
    }

    #[test]
    fn wraps_after_capacity() {
        let mut r = ProfileRecord::default();
        for i in 1..=65 {
            r.push(i as f32);
        }
        assert_eq!(r.front(), 65.0);

        let ordered: Vec<f32> = r.view().chronological().collect();
        let expected: Vec<f32> = (2..=65).map(|i| i as f32).collect();
        assert_eq!(ordered, expected);
    }

    #[test]
    fn stats_cover_min_mean_max() {
        let s = stats(&[1.0, 2.0, 6.0]);
        assert_eq!(s, ProfileStats { min: 1.0, mean: 3.0, max: 6.0 });
        assert_eq!(stats(&[]), ProfileStats::default());
    }

    #[test]
    fn stats_include_unwritten_slot_zero() {
        let mut r = ProfileRecord::default();
        r.push(4.0);
        let s = r.stats();
        assert_eq!(s.min, 0.0);
        assert_eq!(s.max, 4.0);
    }

    #[test]
    fn guard_records_on_drop() {
        let mut r = ProfileRecord::default();
        {
            let _p = Profile::new(&mut r);
        }
        assert_eq!(r.view().offset, 1);
        assert!(r.front() >= 0.0);
    }
}
