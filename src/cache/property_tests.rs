//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store against a plain HashMap model.

use proptest::prelude::*;
use std::collections::HashMap;
use std::thread::sleep;
use std::time::Duration;

use crate::cache::{Ttl, TtlStore};
use crate::error::CacheError;

fn new_store() -> TtlStore {
    TtlStore::new(Duration::ZERO, Duration::ZERO)
}

// == Strategies ==
/// Generates cache keys from a small alphabet so operations collide often
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-e]{1,2}"
}

fn value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,32}"
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Delete { key: String },
    Rename { from: String, to: String },
    Flush,
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        4 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        3 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        2 => key_strategy().prop_map(|key| CacheOp::Delete { key }),
        2 => (key_strategy(), key_strategy())
            .prop_map(|(from, to)| CacheOp::Rename { from, to }),
        1 => Just(CacheOp::Flush),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Any sequence of operations on never-expiring entries behaves like a
    // HashMap, and reads are counted as hits or misses.
    #[test]
    fn prop_matches_hashmap_model(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let store = new_store();
        let mut model: HashMap<String, String> = HashMap::new();
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    store.set(key.clone(), value.clone(), Ttl::Never);
                    model.insert(key, value);
                }
                CacheOp::Get { key } => {
                    let got = store.get_as::<String>(&key);
                    prop_assert_eq!(got.as_ref(), model.get(&key));
                    if got.is_some() {
                        expected_hits += 1;
                    } else {
                        expected_misses += 1;
                    }
                }
                CacheOp::Delete { key } => {
                    let result = store.delete(&key);
                    match model.remove(&key) {
                        Some(_) => {
                            prop_assert!(result.is_ok());
                        }
                        None => {
                            prop_assert_eq!(result, Err(CacheError::KeyNotFound(key)));
                        }
                    }
                }
                CacheOp::Rename { from, to } => {
                    let result = store.rename_key(&from, to.clone());
                    if !model.contains_key(&from) {
                        prop_assert_eq!(result, Err(CacheError::KeyNotFound(from)));
                    } else if model.contains_key(&to) {
                        prop_assert_eq!(result, Err(CacheError::KeyAlreadyExists(to)));
                    } else {
                        prop_assert!(result.is_ok());
                        let value = model.remove(&from).unwrap();
                        model.insert(to, value);
                    }
                }
                CacheOp::Flush => {
                    store.flush_all();
                    model.clear();
                }
            }
            prop_assert_eq!(store.count(), model.len());
        }

        let all = store.get_all();
        prop_assert_eq!(all.len(), model.len());
        for (key, value) in &model {
            prop_assert_eq!(all[key].downcast_ref::<String>(), Some(value));
            prop_assert!(store.exist(key));
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
    }

    // Storing then retrieving before expiration returns the stored value.
    #[test]
    fn prop_roundtrip_storage(
        key in key_strategy(),
        value in value_strategy(),
        ttl_secs in 0u64..3600
    ) {
        let store = new_store();

        store.set(key.clone(), value.clone(), Duration::from_secs(ttl_secs));

        prop_assert_eq!(store.get_as::<String>(&key), Some(value));
    }

    // Renaming moves the value and leaves nothing behind.
    #[test]
    fn prop_rename_moves_value(value in value_strategy()) {
        let store = new_store();
        store.set("from", value.clone(), Ttl::Never);

        store.rename_key("from", "to").unwrap();

        prop_assert!(store.get("from").is_none());
        prop_assert_eq!(store.get_as::<String>("to"), Some(value));
        prop_assert_eq!(store.count(), 1);
    }

    // Incrementing keeps the stored integer type and matches wrapping addition.
    #[test]
    fn prop_increment_wrapping_i64(start in any::<i64>(), delta in any::<i64>()) {
        let store = new_store();
        store.set("n", start, Ttl::Never);

        store.increment("n", delta).unwrap();

        prop_assert_eq!(store.get_as::<i64>("n"), Some(start.wrapping_add(delta)));
    }

    #[test]
    fn prop_increment_wrapping_u8(start in any::<u8>(), delta in any::<i16>()) {
        let store = new_store();
        store.set("n", start, Ttl::Never);

        store.increment("n", delta).unwrap();

        prop_assert_eq!(store.get_as::<u8>("n"), Some(start.wrapping_add(delta as u8)));
    }

    // Non-numeric values reject increments and stay untouched.
    #[test]
    fn prop_increment_non_numeric_unchanged(value in value_strategy(), delta in any::<i32>()) {
        let store = new_store();
        store.set("s", value.clone(), Ttl::Never);

        let result = store.increment("s", delta);

        let rejected = matches!(result, Err(CacheError::NotNumeric { .. }));
        prop_assert!(rejected);
        prop_assert_eq!(store.get_as::<String>("s"), Some(value));
    }

    // After a flush nothing is readable or present.
    #[test]
    fn prop_flush_all_empties(keys in prop::collection::vec(key_strategy(), 0..20)) {
        let store = new_store();
        for key in &keys {
            store.set(key.clone(), 1u8, Ttl::Never);
        }

        store.flush_all();

        prop_assert_eq!(store.count(), 0);
        for key in &keys {
            prop_assert!(store.get(key).is_none());
        }
    }
}

// Separate proptest block with fewer cases for time-sensitive TTL tests
proptest! {
    #![proptest_config(ProptestConfig::with_cases(5))]

    // After the TTL elapses, reads miss but the entry is still structurally
    // present until a sweep removes it.
    #[test]
    fn prop_ttl_expiration_behavior(key in key_strategy(), value in value_strategy()) {
        let store = new_store();

        store.set(key.clone(), value.clone(), Duration::from_millis(20));
        prop_assert_eq!(store.get_as::<String>(&key), Some(value));

        sleep(Duration::from_millis(40));

        prop_assert!(store.get(&key).is_none(), "Entry should not be found after TTL expires");
        prop_assert!(store.exist(&key));
        prop_assert_eq!(store.count(), 1);

        prop_assert_eq!(store.purge_expired(), 1);
        prop_assert!(!store.exist(&key));
    }
}
