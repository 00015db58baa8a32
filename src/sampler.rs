use rand::Rng;

/// Fixed-capacity uniform sample over a stream of unknown length (Algorithm R).
///
/// After `n` offers every item has been kept with probability `min(1, k / n)`,
/// so the sample is not biased towards the first lines of a cluster.
#[derive(Debug)]
pub struct Reservoir<T> {
    capacity: usize,
    seen: usize,
    items: Vec<T>,
}

impl<T> Reservoir<T> {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, seen: 0, items: Vec::with_capacity(capacity.min(64)) }
    }

    pub fn offer<R: Rng + ?Sized>(&mut self, item: T, rng: &mut R) {
        self.seen += 1;
        if self.items.len() < self.capacity {
            self.items.push(item);
            return;
        }
        if self.capacity == 0 {
            return;
        }
        let j = rng.gen_range(0..self.seen);
        if j < self.capacity {
            self.items[j] = item;
        }
    }

    pub fn seen(&self) -> usize {
        self.seen
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

/// Draws up to `k` items uniformly at random from `items`.
pub fn sample<T, I, R>(items: I, k: usize, rng: &mut R) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    R: Rng + ?Sized,
{
    let mut r = Reservoir::new(k);
    for item in items {
        r.offer(item, rng);
    }
    r.into_vec()
}
