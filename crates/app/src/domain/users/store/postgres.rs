//! PostgreSQL Users Store

use async_trait::async_trait;
use jiff_sqlx::Timestamp as SqlxTimestamp;
use sqlx::{FromRow, Postgres, QueryBuilder, Row, Transaction, postgres::PgRow, query, query_as};

use roster::users::{User, UserFilter, UserId};

use crate::{
    database::Db,
    domain::users::store::{StoreError, UsersStore, UsersTransaction},
};

const GET_USER_SQL: &str = include_str!("../sql/get_user.sql");
const LIST_USERS_SQL: &str = include_str!("../sql/list_users.sql");
const CREATE_USER_SQL: &str = include_str!("../sql/create_user.sql");
const UPDATE_USER_SQL: &str = include_str!("../sql/update_user.sql");
const DELETE_USER_SQL: &str = include_str!("../sql/delete_user.sql");

/// PostgreSQL-backed users store.
#[derive(Debug, Clone)]
pub struct PgUsersStore {
    db: Db,
}

impl PgUsersStore {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UsersStore for PgUsersStore {
    async fn begin(&self) -> Result<Box<dyn UsersTransaction>, StoreError> {
        let tx = self.db.begin().await?;

        Ok(Box::new(PgUsersTransaction { tx }))
    }
}

#[derive(Debug)]
struct PgUsersTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UsersTransaction for PgUsersTransaction {
    async fn select_by_key(&mut self, id: &UserId) -> Result<Option<User>, StoreError> {
        let row = query_as::<Postgres, UserRow>(GET_USER_SQL)
            .bind(id.as_str())
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(row.map(UserRow::into_user))
    }

    async fn select_by_filter(&mut self, filter: &UserFilter) -> Result<Vec<User>, StoreError> {
        let mut builder = QueryBuilder::<Postgres>::new(LIST_USERS_SQL);

        if let Some(prefix) = &filter.id_prefix {
            builder.push(" AND starts_with(id, ").push_bind(prefix.clone()).push(")");
        }

        if let Some(text) = &filter.name_contains {
            builder
                .push(" AND strpos(display_name, ")
                .push_bind(text.clone())
                .push(") > 0");
        }

        if let Some(active) = filter.active {
            builder.push(" AND active = ").push_bind(active);
        }

        builder.push(" ORDER BY id");

        let rows = builder
            .build_query_as::<UserRow>()
            .fetch_all(&mut *self.tx)
            .await?;

        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }

    async fn insert(&mut self, user: &User) -> Result<u64, StoreError> {
        let rows_affected = query(CREATE_USER_SQL)
            .bind(user.id.as_str())
            .bind(&user.display_name)
            .bind(&user.secret)
            .bind(&user.contact)
            .bind(user.note.as_deref())
            .bind(user.active)
            .bind(SqlxTimestamp::from(user.created_at))
            .bind(SqlxTimestamp::from(user.updated_at))
            .execute(&mut *self.tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn update_by_key(&mut self, user: &User) -> Result<u64, StoreError> {
        let rows_affected = query(UPDATE_USER_SQL)
            .bind(user.id.as_str())
            .bind(&user.display_name)
            .bind(&user.secret)
            .bind(&user.contact)
            .bind(user.note.as_deref())
            .bind(user.active)
            .bind(SqlxTimestamp::from(user.updated_at))
            .execute(&mut *self.tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn delete_by_key(&mut self, id: &UserId) -> Result<u64, StoreError> {
        let rows_affected = query(DELETE_USER_SQL)
            .bind(id.as_str())
            .execute(&mut *self.tx)
            .await?
            .rows_affected();

        Ok(rows_affected)
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;

        Ok(())
    }
}

struct UserRow(User);

impl UserRow {
    fn into_user(self) -> User {
        self.0
    }
}

impl<'r> FromRow<'r, PgRow> for UserRow {
    fn from_row(row: &'r PgRow) -> sqlx::Result<Self> {
        Ok(Self(User {
            id: UserId::new(row.try_get::<String, _>("id")?),
            display_name: row.try_get("display_name")?,
            secret: row.try_get("secret")?,
            contact: row.try_get("contact")?,
            note: row.try_get("note")?,
            active: row.try_get("active")?,
            created_at: row.try_get::<SqlxTimestamp, _>("created_at")?.to_jiff(),
            updated_at: row.try_get::<SqlxTimestamp, _>("updated_at")?.to_jiff(),
        }))
    }
}
