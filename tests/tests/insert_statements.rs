use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use strata::stmt::{Condition, FieldSetting, Insert};
use tests::{trace_init, twitter};

#[test]
fn connected_insert_covers_the_timeline() {
    let fix = twitter();
    let index = fix.timeline_index(&[fix.body]);

    let insert = Insert::new(
        &fix.schema,
        fix.tweet,
        vec![
            FieldSetting::new(fix.tweet_id, 5i64),
            FieldSetting::new(fix.body, "hi"),
        ],
        vec![Condition::eq(fix.tweet_user, 7i64)],
    )
    .unwrap();

    assert!(insert.modifies_index(&fix.schema, &index));
    assert!(insert.requires_insert(&index));
    assert!(!insert.requires_delete(&index));

    assert_eq!(
        insert.given_fields(&fix.schema),
        BTreeSet::from([fix.tweet_id, fix.body, fix.user_id])
    );

    // Every index field is already given; no support read needed.
    assert_eq!(insert.support_queries(&fix.schema, &index).unwrap(), vec![]);
}

#[test]
fn support_query_fetches_the_missing_city() {
    trace_init();

    let fix = twitter();
    let index = fix.timeline_index(&[fix.body, fix.city]);

    let insert = Insert::new(
        &fix.schema,
        fix.tweet,
        vec![
            FieldSetting::new(fix.tweet_id, 5i64),
            FieldSetting::new(fix.body, "hi"),
        ],
        vec![Condition::eq(fix.tweet_user, 7i64)],
    )
    .unwrap();

    let queries = insert.support_queries(&fix.schema, &index).unwrap();
    assert_eq!(queries.len(), 1);

    let query = &queries[0];
    assert_eq!(query.entity(), fix.user);
    assert_eq!(query.select(), &BTreeSet::from([fix.city]));
    assert_eq!(query.query().key_path().entities(), &[fix.user]);
    assert_eq!(query.index(), index.id());

    let condition = query.conditions().get(fix.user_id).unwrap();
    assert!(condition.op.is_eq());
    assert_eq!(condition.value, Some(7i64.into()));

    assert_eq!(
        query.unparse(&fix.schema),
        "SELECT User.City FROM User WHERE User.UserId = 7"
    );

    // The derived read is a statement in its own right: to run it, the
    // executor must supply the connected identifier.
    assert_eq!(
        query.query().given_fields(),
        BTreeSet::from([fix.user_id])
    );
}

#[test]
fn connection_crosses_a_reverse_oriented_path() {
    let fix = twitter();
    let forward = fix.timeline_index(&[fix.body, fix.city]);
    let reverse = fix.reverse_timeline_index(&[fix.body, fix.city]);

    let insert = Insert::new(
        &fix.schema,
        fix.tweet,
        vec![
            FieldSetting::new(fix.tweet_id, 5i64),
            FieldSetting::new(fix.body, "hi"),
        ],
        vec![Condition::eq(fix.tweet_user, 7i64)],
    )
    .unwrap();

    // The connection key only appears on the reverse path as its pair.
    assert!(insert.modifies_index(&fix.schema, &reverse));

    let forward_queries = insert.support_queries(&fix.schema, &forward).unwrap();
    let reverse_queries = insert.support_queries(&fix.schema, &reverse).unwrap();
    assert_eq!(reverse_queries.len(), 1);

    // Pruned down to User, both orientations derive the same read; only
    // the index tag differs.
    assert_eq!(forward_queries[0].query(), reverse_queries[0].query());
    assert_ne!(forward_queries[0].index(), reverse_queries[0].index());
}

#[test]
fn insert_completeness() {
    // For a modified multi-entity index, the given fields and the derived
    // select set together cover everything the index materializes.
    let fix = twitter();
    let index = fix.timeline_index(&[fix.body, fix.city]);

    let insert = Insert::new(
        &fix.schema,
        fix.tweet,
        vec![FieldSetting::new(fix.tweet_id, 5i64)],
        vec![Condition::eq(fix.tweet_user, 7i64)],
    )
    .unwrap();

    let mut covered = insert.given_fields(&fix.schema);
    for query in insert.support_queries(&fix.schema, &index).unwrap() {
        covered.extend(query.select().iter().copied());
    }

    assert!(index.all_fields().is_subset(&covered));
}

#[test]
fn single_entity_index_needs_no_support() {
    let fix = twitter();
    let index = fix.tweet_index(&[]);

    let insert = Insert::new(
        &fix.schema,
        fix.tweet,
        vec![FieldSetting::new(fix.tweet_id, 9i64)],
        vec![],
    )
    .unwrap();

    assert!(insert.modifies_index(&fix.schema, &index));
    assert_eq!(insert.support_queries(&fix.schema, &index).unwrap(), vec![]);
}

#[test]
fn unconnected_insert_misses_the_timeline() {
    let fix = twitter();
    let index = fix.timeline_index(&[fix.body]);

    // Without a connection the new tweet cannot join to any user row.
    let insert = Insert::new(
        &fix.schema,
        fix.tweet,
        vec![
            FieldSetting::new(fix.tweet_id, 9i64),
            FieldSetting::new(fix.body, "hi"),
        ],
        vec![],
    )
    .unwrap();

    assert!(!insert.modifies_index(&fix.schema, &index));
    assert_eq!(insert.support_queries(&fix.schema, &index).unwrap(), vec![]);
}

#[test]
fn support_queries_are_idempotent() {
    let fix = twitter();
    let index = fix.timeline_index(&[fix.body, fix.city]);

    let insert = Insert::new(
        &fix.schema,
        fix.tweet,
        vec![FieldSetting::new(fix.tweet_id, 5i64)],
        vec![Condition::eq(fix.tweet_user, 7i64)],
    )
    .unwrap();

    let first = insert.support_queries(&fix.schema, &index).unwrap();
    let second = insert.support_queries(&fix.schema, &index).unwrap();

    assert_eq!(first, second);
    assert_eq!(first[0].correlation(), second[0].correlation());
}

#[test]
fn insert_must_set_its_identifier() {
    let fix = twitter();

    let err = Insert::new(
        &fix.schema,
        fix.tweet,
        vec![FieldSetting::new(fix.body, "hi")],
        vec![],
    )
    .unwrap_err();

    assert!(err.is_invalid_statement());
    assert!(err.to_string().contains("must set its own identifier"));
}

#[test]
fn connections_must_use_foreign_keys() {
    let fix = twitter();

    let err = Insert::new(
        &fix.schema,
        fix.tweet,
        vec![FieldSetting::new(fix.tweet_id, 5i64)],
        vec![Condition::eq(fix.body, "hi")],
    )
    .unwrap_err();

    assert!(err.is_invalid_statement());
    assert!(err.to_string().contains("not a foreign key"));
}

#[test]
fn unparse_round_trip_form() {
    let fix = twitter();

    let insert = Insert::new(
        &fix.schema,
        fix.tweet,
        vec![
            FieldSetting::new(fix.tweet_id, 5i64),
            FieldSetting::new(fix.body, "hi"),
        ],
        vec![Condition::eq(fix.tweet_user, 7i64)],
    )
    .unwrap();

    assert_eq!(
        insert.unparse(&fix.schema),
        "INSERT INTO Tweet SET TweetId = 5, Body = \"hi\" AND CONNECT TO User(7)"
    );
}
