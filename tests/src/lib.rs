use strata::graph::KeyPath;
use strata::schema::{EntityId, FieldId, Index, ScalarTy};
use strata::Schema;

/// The User/Tweet model every scenario runs against.
pub struct Twitter {
    pub schema: Schema,

    pub user: EntityId,
    pub tweet: EntityId,

    /// User.UserId
    pub user_id: FieldId,
    /// User.City
    pub city: FieldId,
    /// Tweet.TweetId
    pub tweet_id: FieldId,
    /// Tweet.Body
    pub body: FieldId,
    /// Tweet.User foreign key
    pub tweet_user: FieldId,
    /// User.Tweets, the materialized reverse of Tweet.User
    pub user_tweets: FieldId,
}

pub fn twitter() -> Twitter {
    let mut builder = Schema::builder();
    builder
        .entity("User")
        .id("UserId", ScalarTy::I64)
        .field("City", ScalarTy::Text);
    builder
        .entity("Tweet")
        .id("TweetId", ScalarTy::I64)
        .field("Body", ScalarTy::Text)
        .foreign_key("User", "User", "Tweets");
    let schema = builder.build().unwrap();

    let user = schema.entity_by_name("User").unwrap().id;
    let tweet = schema.entity_by_name("Tweet").unwrap().id;

    let field = |entity: EntityId, name: &str| {
        schema.entity(entity).field_by_name(name).unwrap().id
    };

    Twitter {
        user,
        tweet,
        user_id: field(user, "UserId"),
        city: field(user, "City"),
        tweet_id: field(tweet, "TweetId"),
        body: field(tweet, "Body"),
        tweet_user: field(tweet, "User"),
        user_tweets: field(user, "Tweets"),
        schema,
    }
}

impl Twitter {
    /// A user's timeline: Tweet joined to User, placed by UserId, ordered
    /// by TweetId, carrying `extras` as payload.
    pub fn timeline_index(&self, extras: &[FieldId]) -> Index {
        let path = KeyPath::new(&self.schema, vec![self.tweet_id, self.tweet_user]).unwrap();
        Index::new(
            &self.schema,
            path,
            [self.user_id],
            vec![self.tweet_id],
            extras.iter().copied(),
        )
        .unwrap()
    }

    /// The timeline walked from the user's side: User joined out to its
    /// tweets through the reverse key.
    pub fn reverse_timeline_index(&self, extras: &[FieldId]) -> Index {
        let path = KeyPath::new(&self.schema, vec![self.user_id, self.user_tweets]).unwrap();
        Index::new(
            &self.schema,
            path,
            [self.user_id],
            vec![self.tweet_id],
            extras.iter().copied(),
        )
        .unwrap()
    }

    /// A single-entity index over Tweet, placed by TweetId.
    pub fn tweet_index(&self, extras: &[FieldId]) -> Index {
        let path = KeyPath::from_entity(&self.schema, self.tweet);
        Index::new(
            &self.schema,
            path,
            [self.tweet_id],
            vec![],
            extras.iter().copied(),
        )
        .unwrap()
    }
}

/// Wire a subscriber for tests that want derivation events on stderr.
pub fn trace_init() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}
