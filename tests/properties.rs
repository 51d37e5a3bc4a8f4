use json_workbench as jwb;
use json_workbench::{DiffEntry, DiffKind, PathKey, StructuralPath};
use proptest::prelude::*;
use serde_json::{json, Value};

fn arb_json() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|n| json!(n)),
        "[a-z ]{0,4}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec(("[a-c]{1,2}", inner), 0..4)
                .prop_map(|kvs| Value::Object(kvs.into_iter().collect())),
        ]
    })
}

fn arb_path() -> impl Strategy<Value = StructuralPath> {
    let key = prop_oneof![
        (0usize..1000).prop_map(PathKey::Index),
        "[a-z_][a-z0-9_ .]{0,5}".prop_map(PathKey::Key),
    ];
    prop::collection::vec(key, 0..6).prop_map(StructuralPath::from)
}

type Row = (String, &'static str, Option<String>, Option<String>);

fn rows(entries: &[DiffEntry], swap: bool) -> Vec<Row> {
    let mut out: Vec<Row> = entries
        .iter()
        .map(|e| {
            let (kind, old, new) = if swap {
                let kind = match e.kind {
                    DiffKind::Added => DiffKind::Removed,
                    DiffKind::Removed => DiffKind::Added,
                    DiffKind::Modified => DiffKind::Modified,
                };
                (kind, &e.new_value, &e.old_value)
            } else {
                (e.kind, &e.old_value, &e.new_value)
            };
            let kind = match kind {
                DiffKind::Added => "added",
                DiffKind::Removed => "removed",
                DiffKind::Modified => "modified",
            };
            (
                jwb::tree::path_key(&e.path),
                kind,
                old.as_ref().map(Value::to_string),
                new.as_ref().map(Value::to_string),
            )
        })
        .collect();
    out.sort();
    out
}

proptest! {
    #[test]
    fn pointer_round_trip(p in arb_path()) {
        let pointer = jwb::to_pointer(&p);
        prop_assert_eq!(jwb::parse_pointer(&pointer).unwrap(), p);
    }

    #[test]
    fn compare_with_self_is_empty(a in arb_json()) {
        prop_assert!(jwb::compare(&a, &a).is_empty());
    }

    #[test]
    fn compare_is_symmetric(a in arb_json(), b in arb_json()) {
        let forward = jwb::compare(&a, &b);
        let backward = jwb::compare(&b, &a);
        prop_assert_eq!(rows(&forward, false), rows(&backward, true));
    }

    #[test]
    fn diff_paths_address_their_values(a in arb_json(), b in arb_json()) {
        for e in jwb::compare(&a, &b) {
            if let Some(old) = &e.old_value {
                prop_assert_eq!(jwb::tree::lookup(&a, &e.path), Some(old));
            }
            if let Some(new) = &e.new_value {
                prop_assert_eq!(jwb::tree::lookup(&b, &e.path), Some(new));
            }
        }
    }

    #[test]
    fn resolve_is_deterministic(a in arb_json(), offset in 0usize..64) {
        let text = serde_json::to_string_pretty(&a).unwrap();
        prop_assert_eq!(jwb::resolve(&text, offset), jwb::resolve(&text, offset));
    }

    #[test]
    fn resolved_path_exists_in_document(a in arb_json(), offset in 0usize..200) {
        let text = serde_json::to_string(&a).unwrap();
        let p = jwb::resolve(&text, offset);
        // The one path that may not exist: index 0 of an empty array whose
        // closing bracket holds the cursor.
        let found = jwb::tree::lookup(&a, &p).is_some()
            || (p.last() == Some(&PathKey::Index(0))
                && p.parent().and_then(|parent| jwb::tree::lookup(&a, &parent).cloned())
                    == Some(json!([])));
        prop_assert!(found, "path {} not in {}", p, text);
    }

    #[test]
    fn wildcard_matches_children(a in arb_json()) {
        let via_query = jwb::query_text(&a.to_string(), "$.*").unwrap();
        let via_tree: Vec<Value> = jwb::tree::children(&a)
            .into_iter()
            .map(|(_, v)| v.clone())
            .collect();
        prop_assert_eq!(via_query, via_tree);
    }
}
