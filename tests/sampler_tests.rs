use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use textcluster::sampler::{sample, Reservoir};

#[test]
fn returns_everything_when_fewer_than_k() {
    let mut rng = StdRng::seed_from_u64(1);
    let got = sample(vec!["a", "b", "c"], 5, &mut rng);
    assert_eq!(got, vec!["a", "b", "c"]);
}

#[test]
fn caps_at_k_distinct_members() {
    let mut rng = StdRng::seed_from_u64(2);
    let items: Vec<usize> = (0..100).collect();
    let got = sample(items.iter().copied(), 5, &mut rng);
    assert_eq!(got.len(), 5);
    let uniq: HashSet<_> = got.iter().collect();
    assert_eq!(uniq.len(), 5);
    assert!(got.iter().all(|i| *i < 100));
}

#[test]
fn same_seed_same_sample() {
    let items: Vec<usize> = (0..50).collect();
    let a = sample(items.iter().copied(), 3, &mut StdRng::seed_from_u64(9));
    let b = sample(items.iter().copied(), 3, &mut StdRng::seed_from_u64(9));
    assert_eq!(a, b);
}

#[test]
fn late_items_are_not_starved() {
    // Pick 1 of 4, many times: each item should land near 1/4 of the draws.
    let mut rng = StdRng::seed_from_u64(42);
    let mut hits = [0usize; 4];
    for _ in 0..2000 {
        let got = sample(0..4usize, 1, &mut rng);
        hits[got[0]] += 1;
    }
    for (i, h) in hits.iter().enumerate() {
        assert!((350..=650).contains(h), "item {i} drawn {h} times");
    }
}

#[test]
fn reservoir_counts_offers() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut r = Reservoir::new(2);
    for i in 0..7 {
        r.offer(i, &mut rng);
    }
    assert_eq!(r.seen(), 7);
    assert_eq!(r.into_vec().len(), 2);
}
