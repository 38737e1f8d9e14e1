use std::marker::PhantomData;
use std::sync::Arc;

use sea_orm::{DbConn, DbErr, EntityTrait, Select};

use mirrorpost_core::error::RepoError;

/// Generic PostgreSQL repository over one SeaORM entity.
///
/// Repositories of different entities share one pool through the `Arc`.
pub struct PostgresRepository<E>
where
    E: EntityTrait,
{
    db: Arc<DbConn>,
    _entity: PhantomData<E>,
}

impl<E> PostgresRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: Arc<DbConn>) -> Self {
        Self {
            db,
            _entity: PhantomData,
        }
    }

    pub(crate) fn conn(&self) -> &DbConn {
        &self.db
    }

    /// Run a select expecting at most one row, converting it to the domain type.
    pub(crate) async fn fetch_one<T>(&self, select: Select<E>) -> Result<Option<T>, RepoError>
    where
        T: TryFrom<E::Model, Error = RepoError>,
    {
        select
            .one(self.conn())
            .await
            .map_err(db_err)?
            .map(T::try_from)
            .transpose()
    }

    /// Run a select, converting every row to the domain type.
    pub(crate) async fn fetch_all<T>(&self, select: Select<E>) -> Result<Vec<T>, RepoError>
    where
        T: TryFrom<E::Model, Error = RepoError>,
    {
        select
            .all(self.conn())
            .await
            .map_err(db_err)?
            .into_iter()
            .map(T::try_from)
            .collect()
    }
}

/// Classify a SeaORM error into the repository taxonomy.
pub(crate) fn db_err(err: DbErr) -> RepoError {
    match err {
        DbErr::ConnectionAcquire(e) => RepoError::Connection(e.to_string()),
        DbErr::Conn(e) => RepoError::Connection(e.to_string()),
        DbErr::RecordNotFound(_) => RepoError::NotFound,
        other => {
            let msg = other.to_string();
            if msg.contains("duplicate") || msg.contains("unique") {
                RepoError::Constraint(msg)
            } else {
                RepoError::Query(msg)
            }
        }
    }
}

/// `%needle%` for a LIKE against a lower-cased column, with wildcards escaped.
pub(crate) fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
