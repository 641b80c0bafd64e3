use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use strata::graph::KeyPath;
use strata::stmt::{Condition, FieldSetting, Update};
use tests::twitter;

#[test]
fn payload_update_stays_in_place() {
    let fix = twitter();
    let index = fix.tweet_index(&[fix.body]);

    let update = Update::new(
        &fix.schema,
        KeyPath::from_entity(&fix.schema, fix.tweet),
        vec![FieldSetting::new(fix.body, "new")],
        vec![Condition::eq(fix.tweet_id, 5i64)],
    )
    .unwrap();

    assert!(update.modifies_index(&fix.schema, &index));
    assert!(update.requires_insert(&index));

    // Body is payload, not placement: the row is rewritten in place.
    assert!(!update.requires_delete(&index));

    // The condition already pins the placement key; nothing to re-read.
    assert_eq!(update.support_queries(&fix.schema, &index).unwrap(), vec![]);
}

#[test]
fn key_update_forces_full_row_refetch() {
    let fix = twitter();
    let index = fix.tweet_index(&[fix.body]);

    let update = Update::new(
        &fix.schema,
        KeyPath::from_entity(&fix.schema, fix.tweet),
        vec![FieldSetting::new(fix.tweet_id, 6i64)],
        vec![Condition::eq(fix.tweet_id, 5i64)],
    )
    .unwrap();

    // The placement key changed: the old row is unreachable in place.
    assert!(update.requires_delete(&index));

    let queries = update.support_queries(&fix.schema, &index).unwrap();
    assert_eq!(queries.len(), 1);

    let query = &queries[0];
    assert_eq!(query.entity(), fix.tweet);
    assert_eq!(query.select(), &BTreeSet::from([fix.body]));
    assert_eq!(
        query.unparse(&fix.schema),
        "SELECT Tweet.Body FROM Tweet WHERE Tweet.TweetId = 5"
    );
}

#[test]
fn locality_of_payload_updates() {
    // If the settings touch no hash/order field, the old placement remains
    // valid and the support select excludes condition-covered fields.
    let fix = twitter();
    let index = fix.timeline_index(&[fix.body]);

    let update = Update::new(
        &fix.schema,
        KeyPath::from_entity(&fix.schema, fix.tweet),
        vec![FieldSetting::new(fix.body, "new")],
        vec![Condition::eq(fix.tweet_id, 5i64)],
    )
    .unwrap();

    assert!(!update.requires_delete(&index));

    let queries = update.support_queries(&fix.schema, &index).unwrap();
    assert_eq!(queries.len(), 1);

    let query = &queries[0];
    assert_eq!(query.select(), &BTreeSet::from([fix.user_id]));
    assert!(!query.select().contains(&fix.tweet_id));

    // The read walks the index's own path to recover the placement.
    assert_eq!(
        query.query().key_path().entities(),
        &[fix.tweet, fix.user]
    );
    assert!(query.conditions().contains(fix.tweet_id));
}

#[test]
fn updating_the_joined_entity_reaches_across_the_path() {
    let fix = twitter();
    let index = fix.timeline_index(&[fix.city]);

    // A user moved: every timeline row carrying City is stale.
    let update = Update::new(
        &fix.schema,
        KeyPath::from_entity(&fix.schema, fix.user),
        vec![FieldSetting::new(fix.city, "Berlin")],
        vec![Condition::eq(fix.user_id, 3i64)],
    )
    .unwrap();

    assert!(update.modifies_index(&fix.schema, &index));
    assert!(!update.requires_delete(&index));

    let queries = update.support_queries(&fix.schema, &index).unwrap();
    assert_eq!(queries.len(), 1);

    let query = &queries[0];
    assert_eq!(query.entity(), fix.tweet);
    assert_eq!(query.select(), &BTreeSet::from([fix.tweet_id]));
    assert_eq!(
        query.unparse(&fix.schema),
        "SELECT Tweet.TweetId FROM Tweet.User WHERE User.UserId = 3"
    );
}

#[test]
fn unrelated_update_is_conservative() {
    let fix = twitter();
    let index = fix.tweet_index(&[fix.body]);

    let update = Update::new(
        &fix.schema,
        KeyPath::from_entity(&fix.schema, fix.user),
        vec![FieldSetting::new(fix.city, "Berlin")],
        vec![Condition::eq(fix.user_id, 3i64)],
    )
    .unwrap();

    assert!(!update.modifies_index(&fix.schema, &index));
    assert_eq!(update.support_queries(&fix.schema, &index).unwrap(), vec![]);
}

#[test]
fn given_fields_exclude_settings() {
    // Settings are deliberately not given: the prior values of non-updated
    // fields must be re-read from the store.
    let fix = twitter();

    let update = Update::new(
        &fix.schema,
        KeyPath::from_entity(&fix.schema, fix.tweet),
        vec![FieldSetting::new(fix.body, "new")],
        vec![Condition::eq(fix.tweet_id, 5i64)],
    )
    .unwrap();

    assert_eq!(
        update.given_fields(&fix.schema),
        BTreeSet::from([fix.tweet_id])
    );
}

#[test]
fn update_must_set_something() {
    let fix = twitter();

    let err = Update::new(
        &fix.schema,
        KeyPath::from_entity(&fix.schema, fix.tweet),
        vec![],
        vec![Condition::eq(fix.tweet_id, 5i64)],
    )
    .unwrap_err();

    assert!(err.is_invalid_statement());
    assert!(err.to_string().contains("at least one field"));
}

#[test]
fn conditions_must_stay_on_the_path() {
    let fix = twitter();

    let err = Update::new(
        &fix.schema,
        KeyPath::from_entity(&fix.schema, fix.tweet),
        vec![FieldSetting::new(fix.body, "new")],
        vec![Condition::eq(fix.user_id, 3i64)],
    )
    .unwrap_err();

    assert!(err.is_invalid_statement());
    assert!(err.to_string().contains("off the statement's path"));
}

#[test]
fn unparse_round_trip_form() {
    let fix = twitter();

    let update = Update::new(
        &fix.schema,
        KeyPath::from_entity(&fix.schema, fix.tweet),
        vec![FieldSetting::new(fix.body, "new")],
        vec![Condition::eq(fix.tweet_id, 5i64)],
    )
    .unwrap();

    assert_eq!(
        update.unparse(&fix.schema),
        "UPDATE Tweet FROM Tweet SET Body = \"new\" WHERE Tweet.TweetId = 5"
    );
}
