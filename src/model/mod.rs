use std::sync::Arc;

mod database;
pub use database::DbConnection;

pub mod entity;

mod error;
pub use error::{DatabaseError, DatabaseResult};

mod resource;
pub use resource::{ResourceType, ResourceTyped};

pub mod store;
pub use store::{MemoryStore, PgStore, Store};

/// Handle to the row store shared by every request.
#[derive(Clone)]
pub struct ModelManager {
    store: Arc<dyn Store>,
}

impl std::fmt::Debug for ModelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelManager")
            .field("store", &self.store.kind())
            .finish()
    }
}

impl ModelManager {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub fn postgres(conn: DbConnection) -> Self {
        Self::new(Arc::new(PgStore::new(conn)))
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }
}
