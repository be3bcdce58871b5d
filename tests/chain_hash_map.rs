// ChainHashMap integration suite.
//
// Each test documents what behavior is being verified. The core
// invariants exercised:
// - Latest-write-wins: `get(k)` returns the most recent `put` value.
// - Uniqueness: re-putting a key replaces in place, len unchanged.
// - Absence: never-inserted and removed keys are not found.
// - Growth: crossing the fill threshold doubles capacity and keeps
//   every pair.
// - Zero hash: a key whose hash is 0 is stored like any other.
// - Chain relinking: removing a contiguous range removes exactly it.
use chain_hashmap::{ChainHashMap, Config, HashedKeys, IdentityKeys, NoRelease, StrKeys};

// Test: string-keyed lookups.
// Verifies: two string keys map to their own values.
#[test]
fn string_table_simple() {
    let mut m = ChainHashMap::new(StrKeys).expect("construct string map");
    m.put("charlie", 12usize).expect("insert charlie");
    m.put("bob", 38usize).expect("insert bob");

    assert_eq!(m.get(&"charlie"), Some(&12));
    assert_eq!(m.get(&"bob"), Some(&38));
    assert_eq!(m.get(&"alice"), None);
    assert_eq!(m.len(), 2);
}

// Test: integer keys with owned string values released by a hook.
// Assumes: key 0 hashes to 0 under identity hashing.
// Verifies: the zero key survives several resizes and is found.
#[test]
fn integer_keys_with_zero() {
    let mut m = ChainHashMap::with_release(IdentityKeys, NoRelease, drop::<String>)
        .expect("construct map");
    for i in 0..1000usize {
        m.put(i, format!("VALUE: {i}")).expect("insert keypair");
    }

    let ret = m.get(&0).expect("key 0 present");
    assert_eq!(ret, "VALUE: 0");
    assert_eq!(m.len(), 1000);
    assert!(m.capacity() >= 2048);
    for i in 0..1000usize {
        assert_eq!(m.get(&i).map(String::as_str), Some(format!("VALUE: {i}").as_str()));
    }
}

// Test: removal of a contiguous mid-range.
// Verifies: keys 500..700 are gone, every other key keeps its value,
// len drops by exactly 200.
#[test]
fn remove_mid_range() {
    let mut m = ChainHashMap::new(IdentityKeys).expect("construct map");
    for i in 0..1000usize {
        m.put(i, i * 3).expect("insert");
    }
    for i in 500..700usize {
        assert!(m.remove(&i), "key {i} should be removable");
    }
    assert_eq!(m.len(), 800);
    for i in 0..1000usize {
        if (500..700).contains(&i) {
            assert_eq!(m.get(&i), None, "key {i} should be absent");
        } else {
            assert_eq!(m.get(&i), Some(&(i * 3)), "key {i} should be intact");
        }
    }
}

// Test: mid-range removal when every slot carries a long chain.
// Assumes: a small fixed table with fill rate 1.0 keeps chains deep
// until growth.
// Verifies: chain relinking for head, middle and tail removals.
#[test]
fn remove_mid_range_with_deep_chains() {
    let config = Config::new().initial_capacity(8).fill_rate(1.0);
    let mut m = ChainHashMap::with_config(IdentityKeys, NoRelease, NoRelease, config)
        .expect("construct map");
    for i in 0..7usize {
        m.put(i * 8, i).expect("insert");
    }
    assert_eq!(m.stats().longest_chain, 7);
    for i in 2..5usize {
        assert!(m.remove(&(i * 8)));
    }
    for i in 0..7usize {
        let expected = if (2..5).contains(&i) { None } else { Some(&i) };
        assert_eq!(m.get(&(i * 8)), expected);
    }
    assert_eq!(m.stats().chain_nodes, 3);
}

// Test: remove semantics on present and absent keys.
// Verifies: len decrements by one on hit, unchanged on miss.
#[test]
fn remove_present_and_absent() {
    let mut m = ChainHashMap::new(StrKeys).expect("construct map");
    m.put("a".to_string(), 1).unwrap();
    m.put("b".to_string(), 2).unwrap();
    assert!(m.remove(&"a".to_string()));
    assert_eq!(m.len(), 1);
    assert!(!m.remove(&"a".to_string()));
    assert!(!m.remove(&"zzz".to_string()));
    assert_eq!(m.len(), 1);
    assert_eq!(m.get(&"a".to_string()), None);
    assert_eq!(m.get(&"b".to_string()), Some(&2));
}

// Test: latest write wins and len counts unique keys.
#[test]
fn latest_put_wins() {
    let mut m = ChainHashMap::new(IdentityKeys).expect("construct map");
    for round in 0..3u32 {
        for k in 0..50u32 {
            m.put(k, k + round).unwrap();
        }
    }
    assert_eq!(m.len(), 50);
    for k in 0..50u32 {
        assert_eq!(m.get(&k), Some(&(k + 2)));
    }
    for k in 50..100u32 {
        assert_eq!(m.get(&k), None);
    }
}

// Test: capacity doubling at the threshold.
// Assumes: default capacity 128, fill rate 0.6 (threshold 76).
// Verifies: every insert before the threshold keeps capacity, the
// threshold insert doubles it, and all pairs are retained.
#[test]
fn growth_at_threshold() {
    let mut m = ChainHashMap::new(HashedKeys::new()).expect("construct map");
    for i in 0..75u64 {
        m.put(i, i.to_string()).unwrap();
        assert_eq!(m.capacity(), 128);
    }
    m.put(75u64, "75".to_string()).unwrap();
    assert_eq!(m.capacity(), 256);
    for i in 0..76u64 {
        assert_eq!(m.get(&i), Some(&i.to_string()));
    }
}

// Test: pointer identity keys.
// Verifies: distinct allocations with equal content are distinct keys.
#[test]
fn pointer_identity_keys() {
    let a = Box::new(5u32);
    let b = Box::new(5u32);
    let pa: *const u32 = &*a;
    let pb: *const u32 = &*b;

    let mut m = ChainHashMap::new(IdentityKeys).expect("construct map");
    m.put(pa, "a").unwrap();
    m.put(pb, "b").unwrap();
    assert_eq!(m.get(&pa), Some(&"a"));
    assert_eq!(m.get(&pb), Some(&"b"));
    assert_eq!(m.get(&core::ptr::null()), None);

    // The null pointer hashes to zero and is still a valid key.
    m.put(core::ptr::null(), "null").unwrap();
    assert_eq!(m.get(&core::ptr::null()), Some(&"null"));
}

// Test: the error type of a rejected put is displayable and chains its cause.
#[test]
fn put_error_reports_cause() {
    let config = Config::new().node_budget(0);
    let mut m = ChainHashMap::with_config(IdentityKeys, NoRelease, NoRelease, config)
        .expect("construct map");
    m.put(1usize, 'x').unwrap();
    let err = m.put(129usize, 'y').unwrap_err();
    assert_eq!(err.to_string(), "put rejected: chain node budget of 0 exhausted");
    assert!(std::error::Error::source(&err).is_some());
    assert_eq!(m.len(), 1);
}

// Test: null/null pairs through the public `Nullable` surface.
// Verifies: `put_nullable(null, null)` stores nothing, while a null key
// with a live value is an ordinary entry.
#[test]
fn null_pair_is_dropped_by_put_nullable() {
    let v = 9u32;
    let pv: *const u32 = &v;
    let null = core::ptr::null::<u32>();

    let mut m = ChainHashMap::new(IdentityKeys).expect("construct map");
    m.put_nullable(null, null).expect("null pair accepted");
    assert!(m.is_empty());
    m.put_nullable(null, pv).expect("null key stored");
    assert_eq!(m.len(), 1);
    assert_eq!(m.get(&null), Some(&pv));
}
