use ednio::{decode_from_text, encode_to_text, Atom, Value};
use num::BigInt;
use proptest::prelude::*;

fn roundtrip(v: &Value) -> Value {
    let text = encode_to_text(v).unwrap();
    decode_from_text(&text).unwrap()
}

fn arb_atom() -> impl Strategy<Value = Atom> {
    prop_oneof![
        Just(Atom::Nil),
        any::<bool>().prop_map(Atom::Bool),
        any::<i64>().prop_map(Atom::from),
        any::<f64>().prop_filter("finite", |x| x.is_finite()).prop_map(Atom::from),
        ".*".prop_map(|s: String| Atom::from(s.as_str())),
    ]
}

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = arb_atom().prop_map(Value::Atom);
    leaf.prop_recursive(4, 64, 8, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..8).prop_map(Value::seq),
            prop::collection::vec(arb_atom(), 0..8).prop_map(Value::set),
            prop::collection::vec(("[a-z]{1,6}", inner), 0..8).prop_map(Value::map),
        ]
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn scalars_survive(a in arb_atom()) {
        let v = Value::Atom(a);
        prop_assert_eq!(roundtrip(&v), v);
    }

    #[test]
    fn big_integers_survive(digits in "-?[1-9][0-9]{0,60}") {
        let n: BigInt = digits.parse().unwrap();
        let v = Value::from(ednio::number::Number::Integer(n));
        prop_assert_eq!(roundtrip(&v), v);
    }

    #[test]
    fn nested_values_survive(v in arb_value()) {
        prop_assert_eq!(roundtrip(&v), v);
    }
}
