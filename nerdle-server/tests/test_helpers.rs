#![allow(dead_code)]

use migration::{Migrator, MigratorTrait};
use nerdle_core::{NerdleStore, SessionSettings, demo};
use nerdle_persistence::SqlStore;
use nerdle_persistence::connection::connect_to_memory_database;
use nerdle_server::create_routes;
use nerdle_server::websocket::ConnectionManager;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use warp::Filter;
use warp::http::Response;
use warp::hyper::body::Bytes;

/// Test setup backed by an in-memory SQLite database
pub struct TestServerSetup {
    pub connection_manager: Arc<ConnectionManager>,
    pub store: Arc<SqlStore>,
}

impl TestServerSetup {
    /// Empty, migrated database for the demo week
    pub async fn new() -> Self {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        Self {
            connection_manager: Arc::new(ConnectionManager::new()),
            store: Arc::new(SqlStore::new(db, demo::demo_week())),
        }
    }

    /// Database seeded with the demo league
    pub async fn seeded() -> Self {
        let setup = Self::new().await;
        setup.store.seed_demo_data().await.unwrap();
        setup
    }

    pub fn routes(
        &self,
    ) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone + 'static {
        let store: Arc<dyn NerdleStore> = self.store.clone();
        create_routes(self.connection_manager.clone(), store, test_settings())
    }

    pub async fn get(&self, path: &str) -> Response<Bytes> {
        warp::test::request()
            .method("GET")
            .path(path)
            .reply(&self.routes())
            .await
    }

    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Response<Bytes> {
        warp::test::request()
            .method("POST")
            .path(path)
            .json(body)
            .reply(&self.routes())
            .await
    }
}

pub fn test_settings() -> SessionSettings {
    SessionSettings {
        ack_delay: Duration::from_millis(50),
        ..SessionSettings::default()
    }
}

pub fn parse_body<T: serde::de::DeserializeOwned>(response: &Response<Bytes>) -> T {
    serde_json::from_slice(response.body()).expect("Response should be valid JSON")
}
