//! Property-based tests for quarry using proptest.

use proptest::prelude::*;
use quarry::{Clause, Direction, Entity, Specification, Value};

// ============================================================================
// Test helpers
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
struct Item {
    id: usize,
    group: u8,
    score: Option<i64>,
    name: String,
    active: bool,
}

impl Entity for Item {
    fn field_value(&self, field: &str) -> Value<'_> {
        match field {
            "id" => Value::from(self.id),
            "group" => Value::from(self.group),
            "score" => Value::from(self.score),
            "name" => Value::from(&self.name),
            "active" => Value::from(self.active),
            _ => Value::None,
        }
    }
}

fn items_strategy(max: usize) -> impl Strategy<Value = Vec<Item>> {
    prop::collection::vec(
        (
            0u8..4,
            prop::option::weighted(0.8, -50i64..50),
            "[a-c]{1,3}",
            any::<bool>(),
        ),
        0..max,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(id, (group, score, name, active))| Item {
                id,
                group,
                score,
                name,
                active,
            })
            .collect()
    })
}

fn clause_strategy() -> impl Strategy<Value = Clause> {
    prop_oneof![
        (-50i64..50).prop_map(|n| Clause::gt("score", n)),
        (-50i64..50).prop_map(|n| Clause::lte("score", n)),
        (0u8..4).prop_map(|g| Clause::eq("group", g)),
        any::<bool>().prop_map(|b| Clause::eq("active", b)),
        "[a-c]".prop_map(|s| Clause::contains("name", &s)),
        Just(Clause::is_null("score")),
    ]
}

fn spec(var: &'static str, clause: Clause) -> Specification<Item> {
    Specification::builder()
        .bound_to(var)
        .where_(clause)
        .expect("generated clauses are valid")
        .build()
}

fn ids(found: &[&Item]) -> Vec<usize> {
    found.iter().map(|item| item.id).collect()
}

fn direction(desc: bool) -> Direction {
    if desc {
        Direction::Descending
    } else {
        Direction::Ascending
    }
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// where(p).and(q) holds exactly when p and q both hold.
    #[test]
    fn chained_and_is_conjunction(
        items in items_strategy(40),
        p in clause_strategy(),
        q in clause_strategy(),
    ) {
        let chained = Specification::<Item>::builder()
            .criteria(|c| c.where_(p.clone())?.and(q.clone()))
            .unwrap()
            .build();
        let (sp, sq) = (spec("x", p), spec("x", q));

        for item in &items {
            prop_assert_eq!(
                chained.is_satisfied_by(item),
                sp.is_satisfied_by(item) && sq.is_satisfied_by(item)
            );
        }
    }

    /// where(p).or(q) holds exactly when p or q holds.
    #[test]
    fn chained_or_is_disjunction(
        items in items_strategy(40),
        p in clause_strategy(),
        q in clause_strategy(),
    ) {
        let chained = Specification::<Item>::builder()
            .criteria(|c| c.where_(p.clone())?.or(q.clone()))
            .unwrap()
            .build();
        let (sp, sq) = (spec("x", p), spec("x", q));

        for item in &items {
            prop_assert_eq!(
                chained.is_satisfied_by(item),
                sp.is_satisfied_by(item) || sq.is_satisfied_by(item)
            );
        }
    }

    /// Composition across variables is associative and commutative.
    #[test]
    fn composition_laws(
        items in items_strategy(40),
        a in clause_strategy(),
        b in clause_strategy(),
        c in clause_strategy(),
    ) {
        let (a, b, c) = (spec("a", a), spec("b", b), spec("c", c));

        for item in &items {
            prop_assert_eq!((&a & &b).is_satisfied_by(item), (&b & &a).is_satisfied_by(item));
            prop_assert_eq!((&a | &b).is_satisfied_by(item), (&b | &a).is_satisfied_by(item));
            prop_assert_eq!(
                (&(&a & &b) & &c).is_satisfied_by(item),
                (&a & &(&b & &c)).is_satisfied_by(item)
            );
            prop_assert_eq!(
                (&(&a | &b) | &c).is_satisfied_by(item),
                (&a | &(&b | &c)).is_satisfied_by(item)
            );
            prop_assert_eq!((!&a).is_satisfied_by(item), !a.is_satisfied_by(item));
        }
    }

    /// Filtering keeps input order and never grows the collection.
    #[test]
    fn filter_is_an_ordered_subsequence(
        items in items_strategy(60),
        clause in clause_strategy(),
    ) {
        let spec = spec("x", clause);
        let found = ids(&spec.filter(&items));
        let expected: Vec<usize> = items
            .iter()
            .filter(|item| spec.is_satisfied_by(item))
            .map(|item| item.id)
            .collect();
        prop_assert_eq!(&found, &expected);
        prop_assert_eq!(spec.count(&items), found.len());
        prop_assert_eq!(spec.any(&items), !found.is_empty());
        prop_assert_eq!(spec.find(&items).map(|item| item.id), found.first().copied());
    }

    /// A three-level chain orders like the equivalent tuple key.
    #[test]
    fn sort_chain_is_lexicographic(
        items in items_strategy(60),
        desc in any::<[bool; 3]>(),
    ) {
        let spec = Specification::<Item>::builder()
            .order_by("group", direction(desc[0]))
            .and_then(|b| b.then_by("score", direction(desc[1])))
            .and_then(|b| b.nulls_last())
            .and_then(|b| b.then_by("name", direction(desc[2])))
            .unwrap()
            .build();

        let sorted = spec.filter(&items);
        for pair in sorted.windows(2) {
            let (x, y) = (pair[0], pair[1]);
            let by_group = direction(desc[0]).apply(x.group.cmp(&y.group));
            let by_score = match (x.score, y.score) {
                (Some(a), Some(b)) => direction(desc[1]).apply(a.cmp(&b)),
                (a, b) => a.is_none().cmp(&b.is_none()),
            };
            let by_name = direction(desc[2]).apply(x.name.cmp(&y.name));
            let key = by_group.then(by_score).then(by_name);
            prop_assert!(key.is_le());
            if key.is_eq() {
                prop_assert!(x.id < y.id, "stable sort violated");
            }
        }
    }

    /// NullsFirst puts every null first whatever the direction.
    #[test]
    fn nulls_first_leads(items in items_strategy(60), desc in any::<bool>()) {
        let spec = Specification::<Item>::builder()
            .order_by("score", direction(desc))
            .and_then(|b| b.nulls_first())
            .unwrap()
            .build();

        let sorted = spec.filter(&items);
        let nulls = items.iter().filter(|item| item.score.is_none()).count();
        prop_assert!(sorted[..nulls].iter().all(|item| item.score.is_none()));
        prop_assert!(sorted[nulls..].iter().all(|item| item.score.is_some()));
    }

    /// skip/take slice the filtered, sorted result.
    #[test]
    fn window_slices_sorted_result(
        items in items_strategy(60),
        skip in 0usize..70,
        take in 1usize..20,
    ) {
        let ordered = Specification::<Item>::builder()
            .order_by("name", Direction::Ascending)
            .unwrap()
            .build();
        let paged = ordered.to_builder().skip(skip).take(take).unwrap().build();

        let all = ordered.filter(&items);
        let expected: Vec<usize> = ids(&all).into_iter().skip(skip).take(take).collect();
        prop_assert_eq!(ids(&paged.filter(&items)), expected);
    }

    /// Pages partition the sorted result.
    #[test]
    fn pages_partition_the_result(items in items_strategy(60), size in 1usize..10) {
        let ordered = Specification::<Item>::builder()
            .order_by("id", Direction::Descending)
            .unwrap()
            .build();
        let all = ids(&ordered.filter(&items));

        let pages = all.len().div_ceil(size);
        let mut stitched = Vec::new();
        for number in 1..=pages {
            let page = ordered.to_builder().page(number, size).unwrap().build();
            let chunk = ids(&page.filter(&items));
            prop_assert!(!chunk.is_empty() && chunk.len() <= size);
            stitched.extend(chunk);
        }
        prop_assert_eq!(stitched, all);
    }

    /// Serialization preserves what a specification selects.
    #[test]
    fn json_round_trip_selects_the_same_items(
        items in items_strategy(30),
        a in clause_strategy(),
        b in clause_strategy(),
    ) {
        let spec = &spec("a", a) | &!&spec("b", b);
        let json = serde_json::to_string(&spec).unwrap();
        let back: Specification<Item> = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(ids(&back.filter(&items)), ids(&spec.filter(&items)));
    }
}

// ============================================================================
// Edge cases
// ============================================================================

#[test]
fn empty_collection() {
    let items: Vec<Item> = Vec::new();
    let spec = spec("x", Clause::eq("active", true));
    assert!(spec.filter(&items).is_empty());
    assert_eq!(spec.count(&items), 0);
    assert!(!spec.any(&items));
    assert!(spec.find(&items).is_none());
}

#[test]
fn skip_at_or_past_the_end_is_empty() {
    let items: Vec<Item> = (0..5)
        .map(|id| Item {
            id,
            group: 0,
            score: None,
            name: "a".into(),
            active: true,
        })
        .collect();
    for skip in [5, 100] {
        let spec = Specification::<Item>::builder().skip(skip).build();
        assert!(spec.filter(&items).is_empty());
    }
}

#[test]
fn take_zero_is_rejected() {
    assert!(Specification::<Item>::builder().take(0).is_err());
}
