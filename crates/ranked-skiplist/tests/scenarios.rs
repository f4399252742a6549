#![allow(unused_crate_dependencies, reason = "These are tests, not the main crate.")]

use std::{borrow::Borrow, cell::Cell};

use ranked_skiplist::{
    ConfigError, CreateError, DefaultComparator, Found, InsertOutcome, InvalidHandle,
    RankedSkiplist, SkiplistBuilder, SkiplistConfig,
};


fn alphabet() -> impl Iterator<Item = String> {
    (b'a'..=b'z').map(|letter| char::from(letter).to_string())
}

#[test]
fn alphabet_ranks_and_tail() {
    let mut list: RankedSkiplist<String, _> = RankedSkiplist::new(DefaultComparator);

    for (index, letter) in alphabet().enumerate() {
        match list.insert_copy(letter.as_str()).unwrap() {
            InsertOutcome::Inserted { rank, .. } => assert_eq!(rank, index + 1),
            InsertOutcome::Rejected { .. } => panic!("{letter} was rejected"),
        }
    }

    assert_eq!(list.len(), 26);
    for (index, letter) in alphabet().enumerate() {
        assert_eq!(list.rank_of(letter.as_str()), Some(index + 1));
    }

    let z = list.find("z").unwrap();
    assert_eq!(z.rank, 26);
    assert_eq!(list.tail(), Some(z.handle));

    assert_eq!(list.delete(z.handle).unwrap(), "z");
    assert!(list.find("z").is_none());
    assert_eq!(list.len(), 25);

    let y = list.find("y").unwrap();
    assert_eq!(y.rank, 25);
    assert_eq!(list.tail(), Some(y.handle));
}

#[test]
fn duplicate_is_rejected_with_existing_rank() {
    let mut list: RankedSkiplist<String, _> = RankedSkiplist::new(DefaultComparator);

    for letter in ["a", "b", "c"] {
        assert!(list.insert_copy(letter).unwrap().is_inserted());
    }
    let b = list.find("b").unwrap();

    let outcome = list.insert(String::from("b")).unwrap();
    assert_eq!(
        outcome,
        InsertOutcome::Rejected { existing: b.handle, rank: 2, value: String::from("b") },
    );
    assert_eq!(list.len(), 3);
    assert!(list.iter().eq(["a", "b", "c"]));
}

#[test]
fn empty_list_operations() {
    let mut list: RankedSkiplist<u64, _> = RankedSkiplist::new(DefaultComparator);

    assert!(list.is_empty());
    assert!(list.find(&1).is_none());
    assert!(list.remove(&1).is_none());
    assert!(list.tail().is_none());
    assert!(list.first_value().is_none());
    assert!(list.last_value().is_none());
    assert_eq!(list.iter().len(), 0);
    assert!(list.cursor().next(&list).is_none());

    list.clear();
    assert!(list.is_empty());
}

#[test]
fn single_value() {
    let mut list = RankedSkiplist::new(DefaultComparator);

    let handle = list.insert(7_i8).unwrap().handle();
    assert_eq!(list.first(), Some(handle));
    assert_eq!(list.tail(), Some(handle));
    assert_eq!(list.find(&7), Some(Found { handle, rank: 1 }));

    assert_eq!(list.delete(handle), Ok(7));
    assert!(list.tail().is_none());
    assert!(list.first().is_none());
    assert_eq!(list.height(), 1);
}

#[test]
fn stale_handles_are_rejected() {
    let mut list = RankedSkiplist::new(DefaultComparator);

    let old = list.insert(1_u32).unwrap().handle();
    assert_eq!(list.delete(old), Ok(1));
    assert_eq!(list.delete(old), Err(InvalidHandle));
    assert!(list.get(old).is_none());

    // The new node may reuse the old node's memory, but not its handle.
    let new = list.insert(2).unwrap().handle();
    assert_ne!(new, old);
    assert_eq!(list.delete(old), Err(InvalidHandle));
    assert_eq!(list.get(new), Some(&2));

    list.clear();
    assert_eq!(list.delete(new), Err(InvalidHandle));
}

#[test]
fn lookups_by_borrowed_form() {
    let mut list: RankedSkiplist<Vec<u8>, _> = RankedSkiplist::new(DefaultComparator);

    for bytes in [&b"beta"[..], &b"alpha"[..], &b"gamma"[..]] {
        let _outcome = list.insert_copy(bytes).unwrap();
    }

    assert_eq!(list.rank_of(&b"gamma"[..]), Some(3));
    assert!(list.contains(&b"alpha"[..]));
    assert!(!list.contains(&b"delta"[..]));
    assert_eq!(list.remove(&b"beta"[..]), Some(b"beta".to_vec()));
    assert_eq!(list.rank_of(&b"gamma"[..]), Some(2));
}

#[test]
fn borrowed_values_outlive_the_list() {
    let words: Vec<String> = ["kiwi", "banana", "cherry"].map(String::from).into();

    let mut list = RankedSkiplist::new(|lhs: &&str, rhs: &&str| Ord::cmp(lhs, rhs));
    for word in &words {
        let _outcome = list.insert(word.as_str()).unwrap();
    }

    assert_eq!(list.first_value(), Some(&"banana"));
    assert_eq!(list.last_value(), Some(&"kiwi"));
    list.clear();
    drop(list);

    assert_eq!(words.len(), 3);
}

#[test]
fn copies_are_only_made_when_inserted() {
    #[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
    struct Key(u32);

    #[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
    struct Stored(Key);

    thread_local! {
        static COPIES: Cell<usize> = const { Cell::new(0) };
    }

    impl Borrow<Key> for Stored {
        fn borrow(&self) -> &Key {
            &self.0
        }
    }

    impl ToOwned for Key {
        type Owned = Stored;

        fn to_owned(&self) -> Stored {
            COPIES.with(|copies| copies.set(copies.get() + 1));
            Stored(Key(self.0))
        }
    }

    let mut list: RankedSkiplist<Stored, _> = RankedSkiplist::new(DefaultComparator);

    assert!(list.insert_copy(&Key(2)).unwrap().is_inserted());
    assert!(list.insert_copy(&Key(1)).unwrap().is_inserted());
    assert_eq!(COPIES.with(Cell::get), 2);

    let outcome = list.insert_copy(&Key(2)).unwrap();
    assert!(matches!(outcome, InsertOutcome::Rejected { rank: 2, value: &Key(2), .. }));
    assert_eq!(COPIES.with(Cell::get), 2);

    assert_eq!(list.remove(&Key(1)), Some(Stored(Key(1))));
    assert_eq!(list.rank_of(&Key(2)), Some(1));
}

#[test]
fn builder_and_config_errors() {
    let missing = SkiplistBuilder::<DefaultComparator>::new().build::<u8>();
    assert!(matches!(missing, Err(CreateError::Config(ConfigError::MissingComparator))));

    let too_tall = SkiplistConfig { max_height: 33, ..SkiplistConfig::new() };
    assert!(matches!(
        RankedSkiplist::<u8, _>::with_config(DefaultComparator, too_tall),
        Err(CreateError::Config(ConfigError::MaxHeightOutOfRange { max_height: 33 })),
    ));

    let bad_probability = SkiplistBuilder::new()
        .comparator(DefaultComparator)
        .promotion_probability(f64::NAN)
        .build::<u8>();
    assert!(matches!(
        bad_probability,
        Err(CreateError::Config(ConfigError::InvalidPromotionProbability { .. })),
    ));
}
