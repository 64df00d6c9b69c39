#[derive(Clone, Debug)]
pub struct Rng {
    state: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(0x6d2b79f5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        t ^ (t >> 14)
    }

    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / 4_294_967_296.0
    }

    pub fn int(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = (max as i64 - min as i64 + 1) as f64;
        min + (self.next_f64() * span).floor() as i32
    }

    pub fn chance(&mut self, probability: f64) -> bool {
        self.next_f64() < probability
    }

    pub fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        ((self.next_f64() * len as f64).floor() as usize).min(len - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::Rng;

    #[test]
    fn same_seed_produces_same_sequence() {
        let mut a = Rng::new(42);
        let mut b = Rng::new(42);
        for _ in 0..1_000 {
            assert_eq!(a.next_u32(), b.next_u32());
        }
    }

    #[test]
    fn int_stays_inside_inclusive_range() {
        let mut rng = Rng::new(7);
        let mut saw_min = false;
        let mut saw_max = false;
        for _ in 0..5_000 {
            let value = rng.int(2, 3);
            assert!((2..=3).contains(&value));
            saw_min |= value == 2;
            saw_max |= value == 3;
        }
        assert!(saw_min && saw_max);
        assert_eq!(rng.int(5, 5), 5);
        assert_eq!(rng.int(9, 1), 9);
    }

    #[test]
    fn pick_index_never_overflows() {
        let mut rng = Rng::new(3);
        assert_eq!(rng.pick_index(0), 0);
        for _ in 0..2_000 {
            assert!(rng.pick_index(5) < 5);
        }
    }
}
