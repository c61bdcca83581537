use super::*;
use crate::test_utils::single_type;
use crate::vocabulary::Type;

#[test]
fn new_checks_arity() {
    let (_, preds) = single_type(&[("R", 2)]);
    let err = Instance::new(Arc::clone(&preds[0]), [0]).unwrap_err();
    assert_eq!(
        err,
        InstanceError::ArityMismatch {
            predicate: "R".to_string(),
            arity: 2,
            indices: 1,
        }
    );
    assert!(Instance::new(Arc::clone(&preds[0]), [0, 1]).is_ok());
}

#[test]
fn max_and_renamed() {
    let (_, preds) = single_type(&[("R", 2), ("Z", 0)]);
    let r = Instance::new(Arc::clone(&preds[0]), [2, 0]).unwrap();
    assert_eq!(r.max(), Some(2));
    assert_eq!(r.renamed(|i| i + 1).indices(), &[3, 1]);

    let z = Instance::new(Arc::clone(&preds[1]), std::iter::empty()).unwrap();
    assert_eq!(z.max(), None);
    assert_eq!(z.to_string(), "Z()");
}

#[test]
fn list_enumerates_patterns_lexicographically() {
    let (_, preds) = single_type(&[("R", 2)]);
    let list = InstanceList::new(preds, 3);
    assert_eq!(list.len(), 9);
    let patterns: Vec<Vec<u32>> = (0..list.len())
        .map(|i| list.get(i).unwrap().indices().to_vec())
        .collect();
    assert_eq!(patterns[0], vec![0, 0]);
    assert_eq!(patterns[1], vec![0, 1]);
    assert_eq!(patterns[5], vec![1, 2]);
    assert_eq!(patterns[6], vec![2, 0]);
    assert_eq!(patterns[8], vec![2, 2]);
}

#[test]
fn list_orders_predicates_and_dedups() {
    let (_, preds) = single_type(&[("Q", 1), ("P", 1)]);
    let list = InstanceList::new(
        vec![Arc::clone(&preds[0]), Arc::clone(&preds[1]), Arc::clone(&preds[0])],
        2,
    );
    let names: Vec<&str> = (0..list.len())
        .map(|i| list.get(i).unwrap().predicate().name())
        .collect();
    assert_eq!(names, vec!["P", "P", "Q", "Q"]);
}

#[test]
fn zero_variables_keeps_only_nullary() {
    let (_, preds) = single_type(&[("R", 2), ("Z", 0)]);
    let list = InstanceList::new(preds, 0);
    assert_eq!(list.len(), 1);
    assert_eq!(list.get(0).unwrap().predicate().name(), "Z");
}

#[test]
fn index_of_round_trips_get() {
    let (_, preds) = single_type(&[("P", 1), ("R", 2)]);
    let list = InstanceList::new(preds, 2);
    for i in 0..list.len() {
        assert_eq!(list.index_of(list.get(i).unwrap()), Some(i));
    }
    let (_, other) = single_type(&[("S", 1)]);
    let stray = Instance::new(Arc::clone(&other[0]), [0]).unwrap();
    assert_eq!(list.index_of(&stray), None);
}

#[test]
fn candidates_list_body_then_head() {
    let (_, preds) = single_type(&[("P", 1)]);
    let list = InstanceList::new(preds, 2);
    let sides: Vec<(Side, usize)> = list.candidates().map(|c| (c.side(), c.index())).collect();
    assert_eq!(
        sides,
        vec![(Side::Body, 0), (Side::Body, 1), (Side::Head, 0), (Side::Head, 1)]
    );
}

#[test]
fn sequence_order_agrees_with_compare_per_side() {
    let (_, preds) = single_type(&[("P", 1), ("R", 2)]);
    let list = InstanceList::new(preds, 3);
    for side in [Side::Body, Side::Head] {
        for i in 1..list.len() {
            let a = list.positioned(i - 1, side).unwrap();
            let b = list.positioned(i, side).unwrap();
            assert_eq!(a.compare(&b), Ordering::Less);
        }
    }
}

#[test]
fn positioned_equality_ignores_sequence_number() {
    let (_, preds) = single_type(&[("P", 1)]);
    let p = Instance::new(Arc::clone(&preds[0]), [0]).unwrap();
    let a = PositionedInstance::new(p.clone(), Side::Body, 0);
    let b = PositionedInstance::new(p.clone(), Side::Body, 7);
    assert_eq!(a, b);
    assert_ne!(a, a.with_side(Side::Head));
    assert_eq!(a.with_side(Side::Head).index(), 0);
    assert_eq!(b.to_string(), "P(x0)@body#7");
}

#[test]
fn compare_puts_side_between_predicate_and_pattern() {
    let (_, preds) = single_type(&[("P", 1), ("Q", 1)]);
    let p0 = Instance::new(Arc::clone(&preds[0]), [0]).unwrap();
    let p1 = Instance::new(Arc::clone(&preds[0]), [1]).unwrap();
    let q0 = Instance::new(Arc::clone(&preds[1]), [0]).unwrap();

    let head_p0 = PositionedInstance::new(p0, Side::Head, 0);
    let body_p1 = PositionedInstance::new(p1, Side::Body, 1);
    let body_q0 = PositionedInstance::new(q0, Side::Body, 2);

    assert_eq!(body_p1.compare(&head_p0), Ordering::Less);
    assert_eq!(head_p0.compare(&body_q0), Ordering::Less);
}

#[test]
fn predicate_order_breaks_ties_by_type_name() {
    let a = Type::new("a");
    let b = Type::new("b");
    let pa = Arc::new(Predicate::new("P", vec![a]));
    let pb = Arc::new(Predicate::new("P", vec![b]));
    let list = InstanceList::new(vec![Arc::clone(&pb), Arc::clone(&pa)], 1);
    assert_eq!(list.get(0).unwrap().predicate(), &pa);
    assert_eq!(list.get(1).unwrap().predicate(), &pb);
}
