//! Postgres-backed store implementations.
//!
//! The event row owns its attendance list as a JSONB column, so the
//! registration admission check can be expressed as a single conditional
//! `UPDATE` — the database serializes concurrent registrations per row and
//! the capacity invariant holds without any service-tier locking.
//!
//! SQLx errors are mapped to `DomainError::Store` except the unique
//! violation on `users.email` (code 23505), which maps to `DuplicateEmail`.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use skillbridge_core::{DomainError, DomainResult, EventId, UserId};
use skillbridge_events::{
    Attendance, AttendanceStatus, Category, Event, EventPatch, EventQuery, EventStore, PriceFilter,
    SortField, SortOrder,
};
use skillbridge_identity::{ProfileUpdate, User, UserStore};

const UNIQUE_VIOLATION: &str = "23505";

/// Create the backing tables if they do not exist yet.
pub async fn migrate(pool: &PgPool) -> DomainResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id            UUID PRIMARY KEY,
            name          TEXT NOT NULL,
            email         TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            bio           TEXT NOT NULL DEFAULT '',
            skills        TEXT[] NOT NULL DEFAULT '{}',
            interests     TEXT[] NOT NULL DEFAULT '{}',
            avatar        TEXT NOT NULL DEFAULT '',
            created_at    TIMESTAMPTZ NOT NULL,
            updated_at    TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(store_err)?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            id            UUID PRIMARY KEY,
            title         TEXT NOT NULL,
            description   TEXT NOT NULL,
            date          TIMESTAMPTZ NOT NULL,
            price         DOUBLE PRECISION NOT NULL DEFAULT 0,
            category      TEXT NOT NULL,
            skills        TEXT[] NOT NULL DEFAULT '{}',
            image         TEXT NOT NULL,
            max_attendees INTEGER NOT NULL CHECK (max_attendees >= 1),
            host          UUID NOT NULL REFERENCES users (id),
            attendees     JSONB NOT NULL DEFAULT '[]',
            location      TEXT NOT NULL,
            created_at    TIMESTAMPTZ NOT NULL,
            updated_at    TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(store_err)?;

    Ok(())
}

fn store_err(e: sqlx::Error) -> DomainError {
    DomainError::store(e.to_string())
}

fn user_from_row(row: &PgRow) -> DomainResult<User> {
    Ok(User {
        id: UserId::from_uuid(row.try_get("id").map_err(store_err)?),
        name: row.try_get("name").map_err(store_err)?,
        email: row.try_get("email").map_err(store_err)?,
        password_hash: row.try_get("password_hash").map_err(store_err)?,
        bio: row.try_get("bio").map_err(store_err)?,
        skills: row.try_get("skills").map_err(store_err)?,
        interests: row.try_get("interests").map_err(store_err)?,
        avatar: row.try_get("avatar").map_err(store_err)?,
        created_at: row.try_get("created_at").map_err(store_err)?,
        updated_at: row.try_get("updated_at").map_err(store_err)?,
    })
}

fn event_from_row(row: &PgRow) -> DomainResult<Event> {
    let category: String = row.try_get("category").map_err(store_err)?;
    let attendees: serde_json::Value = row.try_get("attendees").map_err(store_err)?;
    let max_attendees: i32 = row.try_get("max_attendees").map_err(store_err)?;

    Ok(Event {
        id: EventId::from_uuid(row.try_get("id").map_err(store_err)?),
        title: row.try_get("title").map_err(store_err)?,
        description: row.try_get("description").map_err(store_err)?,
        date: row.try_get("date").map_err(store_err)?,
        price: row.try_get("price").map_err(store_err)?,
        category: category.parse::<Category>()?,
        skills: row.try_get("skills").map_err(store_err)?,
        image: row.try_get("image").map_err(store_err)?,
        max_attendees: max_attendees as u32,
        host: UserId::from_uuid(row.try_get("host").map_err(store_err)?),
        attendees: serde_json::from_value::<Vec<Attendance>>(attendees)
            .map_err(|e| DomainError::store(format!("corrupt attendees column: {e}")))?,
        location: row.try_get("location").map_err(store_err)?,
        created_at: row.try_get("created_at").map_err(store_err)?,
        updated_at: row.try_get("updated_at").map_err(store_err)?,
    })
}

const EVENT_COLUMNS: &str = "id, title, description, date, price, category, skills, image, \
                             max_attendees, host, attendees, location, created_at, updated_at";

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

/// Postgres-backed user store.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: Arc<PgPool>,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }
}

#[async_trait]
impl UserStore for PostgresUserStore {
    async fn insert(&self, user: User) -> DomainResult<User> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password_hash, bio, skills, interests, avatar,
                               created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(*user.id.as_uuid())
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.bio)
        .bind(&user.skills)
        .bind(&user.interests)
        .bind(&user.avatar)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&*self.pool)
        .await;

        match result {
            Ok(_) => Ok(user),
            Err(e) => {
                if e.as_database_error()
                    .and_then(|d| d.code())
                    .is_some_and(|code| code == UNIQUE_VIOLATION)
                {
                    Err(DomainError::DuplicateEmail)
                } else {
                    Err(store_err(e))
                }
            }
        }
    }

    async fn find_by_id(&self, id: UserId) -> DomainResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(store_err)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> DomainResult<Option<User>> {
        let row = sqlx::query("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&*self.pool)
            .await
            .map_err(store_err)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: ProfileUpdate,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<User>> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        let row = sqlx::query("SELECT * FROM users WHERE id = $1 FOR UPDATE")
            .bind(*id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(store_err)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut user = user_from_row(&row)?;
        update.apply(&mut user, now);

        sqlx::query(
            r#"
            UPDATE users
            SET name = $2, bio = $3, skills = $4, interests = $5, avatar = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(*id.as_uuid())
        .bind(&user.name)
        .bind(&user.bio)
        .bind(&user.skills)
        .bind(&user.interests)
        .bind(&user.avatar)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;
        Ok(Some(user))
    }
}

/// Postgres-backed event store.
#[derive(Debug, Clone)]
pub struct PostgresEventStore {
    pool: Arc<PgPool>,
}

impl PostgresEventStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    async fn fetch(&self, id: EventId) -> DomainResult<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&*self.pool)
            .await
            .map_err(store_err)?;

        row.as_ref().map(event_from_row).transpose()
    }
}

#[async_trait]
impl EventStore for PostgresEventStore {
    async fn insert(&self, event: Event) -> DomainResult<Event> {
        let attendees = serde_json::to_value(&event.attendees)
            .map_err(|e| DomainError::store(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO events (id, title, description, date, price, category, skills, image,
                                max_attendees, host, attendees, location, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(*event.id.as_uuid())
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.date)
        .bind(event.price)
        .bind(event.category.as_str())
        .bind(&event.skills)
        .bind(&event.image)
        .bind(event.max_attendees as i32)
        .bind(*event.host.as_uuid())
        .bind(attendees)
        .bind(&event.location)
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&*self.pool)
        .await
        .map_err(store_err)?;

        Ok(event)
    }

    async fn find(&self, id: EventId) -> DomainResult<Option<Event>> {
        self.fetch(id).await
    }

    async fn list(&self, query: &EventQuery) -> DomainResult<(Vec<Event>, u64)> {
        let mut conds: Vec<String> = Vec::new();
        let mut next_bind = 1usize;

        let search = query.filter.search.as_ref().map(|s| {
            let cond = format!("(title ILIKE ${next_bind} OR description ILIKE ${next_bind})");
            conds.push(cond);
            next_bind += 1;
            format!("%{}%", escape_like(s))
        });

        let category = query.filter.category.map(|c| {
            conds.push(format!("category = ${next_bind}"));
            next_bind += 1;
            c.as_str()
        });

        match query.filter.price {
            Some(PriceFilter::Free) => conds.push("price = 0".to_string()),
            Some(PriceFilter::Paid) => conds.push("price > 0".to_string()),
            None => {}
        }

        let where_sql = if conds.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conds.join(" AND "))
        };

        let order_col = match query.sort {
            SortField::Date => "date",
            SortField::Price => "price",
            SortField::Title => "title",
            SortField::CreatedAt => "created_at",
        };
        let order_dir = match query.order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };

        let count_sql = format!("SELECT COUNT(*) AS total FROM events {where_sql}");
        let page_sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events {where_sql} \
             ORDER BY {order_col} {order_dir} LIMIT ${next_bind} OFFSET ${}",
            next_bind + 1
        );

        let mut count_query = sqlx::query(&count_sql);
        let mut page_query = sqlx::query(&page_sql);
        if let Some(pattern) = &search {
            count_query = count_query.bind(pattern);
            page_query = page_query.bind(pattern);
        }
        if let Some(category) = category {
            count_query = count_query.bind(category);
            page_query = page_query.bind(category);
        }
        page_query = page_query
            .bind(i64::from(query.page.limit))
            .bind(query.page.offset() as i64);

        let total: i64 = count_query
            .fetch_one(&*self.pool)
            .await
            .map_err(store_err)?
            .try_get("total")
            .map_err(store_err)?;

        let rows = page_query.fetch_all(&*self.pool).await.map_err(store_err)?;
        let events = rows
            .iter()
            .map(event_from_row)
            .collect::<DomainResult<Vec<Event>>>()?;

        Ok((events, total as u64))
    }

    async fn update(
        &self,
        id: EventId,
        patch: EventPatch,
        now: DateTime<Utc>,
    ) -> DomainResult<Option<Event>> {
        let mut tx = self.pool.begin().await.map_err(store_err)?;

        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 FOR UPDATE");
        let row = sqlx::query(&sql)
            .bind(*id.as_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(store_err)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut event = event_from_row(&row)?;
        patch.apply(&mut event, now);

        sqlx::query(
            r#"
            UPDATE events
            SET title = $2, description = $3, date = $4, price = $5, category = $6, skills = $7,
                image = $8, max_attendees = $9, location = $10, updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(*id.as_uuid())
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.date)
        .bind(event.price)
        .bind(event.category.as_str())
        .bind(&event.skills)
        .bind(&event.image)
        .bind(event.max_attendees as i32)
        .bind(&event.location)
        .bind(event.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(store_err)?;

        tx.commit().await.map_err(store_err)?;
        Ok(Some(event))
    }

    async fn delete(&self, id: EventId) -> DomainResult<bool> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&*self.pool)
            .await
            .map_err(store_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn register_attendee(
        &self,
        id: EventId,
        user: UserId,
        now: DateTime<Utc>,
    ) -> DomainResult<Event> {
        let entry = serde_json::to_value(Attendance {
            user_id: user,
            status: AttendanceStatus::Confirmed,
            registered_at: now,
        })
        .map_err(|e| DomainError::store(e.to_string()))?;

        // One conditional UPDATE: drop any lingering cancelled entry for the
        // user, append the confirmed one, guarded by the not-present and
        // not-full predicates. Postgres row locking serializes concurrent
        // registrations against the same event.
        let sql = format!(
            r#"
            UPDATE events
            SET attendees = (
                    SELECT COALESCE(jsonb_agg(a), '[]'::jsonb)
                    FROM jsonb_array_elements(attendees) a
                    WHERE a->>'user_id' <> $3
                ) || jsonb_build_array($2::jsonb),
                updated_at = $4
            WHERE id = $1
              AND NOT EXISTS (
                    SELECT 1 FROM jsonb_array_elements(attendees) a
                    WHERE a->>'user_id' = $3 AND a->>'status' <> 'cancelled'
                )
              AND (
                    SELECT COUNT(*) FROM jsonb_array_elements(attendees) a
                    WHERE a->>'status' = 'confirmed'
                ) < max_attendees
            RETURNING {EVENT_COLUMNS}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(*id.as_uuid())
            .bind(entry)
            .bind(user.to_string())
            .bind(now)
            .fetch_optional(&*self.pool)
            .await
            .map_err(store_err)?;

        if let Some(row) = row {
            return event_from_row(&row);
        }

        // The guard failed; re-read to say why. The answer can only be
        // advisory — the authoritative decision already happened above.
        let event = self.fetch(id).await?.ok_or(DomainError::NotFound)?;
        if event.has_active_registration(user) {
            Err(DomainError::AlreadyRegistered)
        } else {
            Err(DomainError::EventFull)
        }
    }

    async fn remove_attendee(&self, id: EventId, user: UserId) -> DomainResult<Event> {
        let sql = format!(
            r#"
            UPDATE events
            SET attendees = (
                    SELECT COALESCE(jsonb_agg(a), '[]'::jsonb)
                    FROM jsonb_array_elements(attendees) a
                    WHERE a->>'user_id' <> $2
                ),
                updated_at = $3
            WHERE id = $1
              AND EXISTS (
                    SELECT 1 FROM jsonb_array_elements(attendees) a
                    WHERE a->>'user_id' = $2
                )
            RETURNING {EVENT_COLUMNS}
            "#
        );

        let row = sqlx::query(&sql)
            .bind(*id.as_uuid())
            .bind(user.to_string())
            .bind(Utc::now())
            .fetch_optional(&*self.pool)
            .await
            .map_err(store_err)?;

        if let Some(row) = row {
            return event_from_row(&row);
        }

        match self.fetch(id).await? {
            Some(_) => Err(DomainError::NotRegistered),
            None => Err(DomainError::NotFound),
        }
    }

    async fn hosted_by(&self, user: UserId) -> DomainResult<Vec<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE host = $1 ORDER BY date ASC");
        let rows = sqlx::query(&sql)
            .bind(*user.as_uuid())
            .fetch_all(&*self.pool)
            .await
            .map_err(store_err)?;

        rows.iter().map(event_from_row).collect()
    }

    async fn registered_for(&self, user: UserId) -> DomainResult<Vec<Event>> {
        let sql = format!(
            r#"
            SELECT {EVENT_COLUMNS} FROM events
            WHERE EXISTS (
                SELECT 1 FROM jsonb_array_elements(attendees) a
                WHERE a->>'user_id' = $1 AND a->>'status' <> 'cancelled'
            )
            ORDER BY date ASC
            "#
        );
        let rows = sqlx::query(&sql)
            .bind(user.to_string())
            .fetch_all(&*self.pool)
            .await
            .map_err(store_err)?;

        rows.iter().map(event_from_row).collect()
    }
}
