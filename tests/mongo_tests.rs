// tests/mongo_tests.rs
//
// These run against a live MongoDB. Set MONGO_URI (with a database name) and
// run `cargo test -- --ignored`.

use article_hub::{
    db::{
        self, RetryPolicy,
        articles::{CategoryStore, MongoCategoryStore},
        users::{MongoUserStore, UserChanges, UserFilter, UserStore},
    },
    models::{
        article::ArticleCategory,
        user::{Role, Status, User},
    },
};
use mongodb::Database;

async fn connect() -> Database {
    let uri = std::env::var("MONGO_URI").expect("MONGO_URI must be set");
    db::connect(&uri, None, &RetryPolicy::default())
        .await
        .expect("Failed to connect to MongoDB for testing.")
}

#[tokio::test]
#[ignore = "requires a running MongoDB (MONGO_URI)"]
async fn category_index_creation_is_idempotent() {
    let database = connect().await;

    let first = db::create_category_index(&database).await.unwrap();
    let second = db::create_category_index(&database).await.unwrap();
    assert_eq!(first, second);

    let names = database
        .collection::<mongodb::bson::Document>(db::ARTICLE_CATEGORIES)
        .list_index_names()
        .await
        .unwrap();
    assert_eq!(names.iter().filter(|name| **name == first).count(), 1);
}

#[tokio::test]
#[ignore = "requires a running MongoDB (MONGO_URI)"]
async fn user_store_round_trip() {
    let database = connect().await;
    let store = MongoUserStore::new(&database);
    let email = format!("u_{}@example.com", &uuid::Uuid::new_v4().to_string()[..8]);

    let user = User::new(
        "Mongo Test".into(),
        email.clone(),
        "hash".into(),
        Role::Viewer,
        Status::Pending,
        true,
    );
    store.insert(&user).await.unwrap();

    let approved = UserFilter::by_email(&email).with_status(Status::Approved);
    assert!(store.find_one(approved.clone()).await.unwrap().is_none());

    let changes = UserChanges {
        status: Some(Status::Approved),
        ..Default::default()
    };
    assert!(store.update(user.id, changes).await.unwrap());
    assert!(store.find_one(approved).await.unwrap().is_some());

    assert!(store.delete(user.id).await.unwrap());
    assert!(store.find_by_id(user.id).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "requires a running MongoDB (MONGO_URI)"]
async fn category_store_round_trip() {
    let database = connect().await;
    let store = MongoCategoryStore::new(&database);

    let category = ArticleCategory::new(format!("cat-{}", uuid::Uuid::new_v4()));
    store.insert(&category).await.unwrap();

    let found = store.find_by_id(category.id).await.unwrap().unwrap();
    assert_eq!(found.name, category.name);

    assert!(store.delete(category.id).await.unwrap());
    assert!(!store.delete(category.id).await.unwrap());
}
