//! SQLite identity store.
//!
//! Transactional source-of-truth backend. Game-identity columns carry
//! `COLLATE NOCASE` so claim checks and lookups compare case-insensitively
//! in SQL, and warning records cascade when a member record is deleted.
//! Check-then-act mutations additionally serialize on an in-process write
//! guard, so a live link can never interleave with a reconciliation write.

use crate::error::{StoreError, StoreResult};
use crate::traits::{ApplicationStore, BanStore, LinkWrite, MemberStore, WarningStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guildlink_types::{
    ApplicationDraft, ApplicationRecord, BanRecord, Birthday, GameId, MemberRecord,
    MembershipStatus, PlatformId, SlotState, StageOneAnswers, StageTwoAnswers, WarningRecord,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::collections::HashSet;
use std::path::Path;
use tokio::sync::Mutex;

/// Sentinel for a provisioned, never-linked main identity.
const UNKNOWN: &str = "Unknown";
/// Sentinel for every other empty field.
const DASH: &str = "-";

/// SQLite-backed identity store.
pub struct SqliteIdentityStore {
    pool: SqlitePool,
    /// Serialization point for check-then-act mutations.
    write_guard: Mutex<()>,
}

impl SqliteIdentityStore {
    /// Open (creating if missing) a database file and initialize the schema.
    pub async fn connect(path: impl AsRef<Path>) -> StoreResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    /// An in-memory database, one connection so all statements share it.
    pub async fn in_memory() -> StoreResult<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> StoreResult<Self> {
        let store = Self {
            pool,
            write_guard: Mutex::new(()),
        };
        store.init_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(&self) -> StoreResult<()> {
        let statements = [
            r#"
            CREATE TABLE IF NOT EXISTS members (
                platform_id TEXT PRIMARY KEY,
                main_game_id TEXT NOT NULL COLLATE NOCASE DEFAULT 'Unknown',
                main_status TEXT NOT NULL DEFAULT '-',
                alt_game_id TEXT NOT NULL COLLATE NOCASE DEFAULT '-',
                alt_status TEXT NOT NULL DEFAULT '-',
                watchlist_reason TEXT NOT NULL DEFAULT '-',
                warning_count INTEGER NOT NULL DEFAULT 0,
                last_warning_at TEXT NOT NULL DEFAULT '-',
                birthday TEXT NOT NULL DEFAULT '-'
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS warnings (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                platform_id TEXT NOT NULL
                    REFERENCES members(platform_id) ON DELETE CASCADE,
                reason TEXT NOT NULL,
                issued_at TEXT NOT NULL
            )
            "#,
            r#"CREATE INDEX IF NOT EXISTS warnings_platform_id ON warnings(platform_id)"#,
            r#"
            CREATE TABLE IF NOT EXISTS bans (
                platform_id TEXT PRIMARY KEY,
                reason TEXT NOT NULL,
                recorded_at TEXT NOT NULL
            )
            "#,
            r#"
            CREATE TABLE IF NOT EXISTS applications (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                submitted_at TEXT NOT NULL,
                platform_id TEXT NOT NULL,
                game_id TEXT NOT NULL,
                joined_how TEXT NOT NULL,
                timezone TEXT NOT NULL,
                has_commander_tag TEXT NOT NULL,
                content_preference TEXT NOT NULL,
                has_led_event TEXT NOT NULL,
                event_interest TEXT,
                changes_suggested TEXT
            )
            "#,
        ];

        for statement in statements {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

fn slot_columns(slot: &SlotState, sentinel: &str) -> (String, String) {
    match &slot.game_id {
        Some(game_id) => (game_id.as_str().to_string(), slot.status.as_str().to_string()),
        None => (sentinel.to_string(), DASH.to_string()),
    }
}

fn slot_from_columns(game_id: &str, status: &str) -> SlotState {
    if game_id == DASH || game_id.eq_ignore_ascii_case(UNKNOWN) {
        SlotState::unlinked()
    } else {
        SlotState::linked(GameId::new(game_id), MembershipStatus::from_store(status))
    }
}

fn timestamp_to_column(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339()
}

fn timestamp_from_column(value: &str) -> StoreResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Backend(format!("malformed timestamp {value:?}: {e}")))
}

fn member_from_row(row: &SqliteRow) -> StoreResult<MemberRecord> {
    let last_warning: String = row.try_get("last_warning_at")?;
    let birthday: String = row.try_get("birthday")?;
    let watchlist: String = row.try_get("watchlist_reason")?;
    let main_game_id: String = row.try_get("main_game_id")?;
    let main_status: String = row.try_get("main_status")?;
    let alt_game_id: String = row.try_get("alt_game_id")?;
    let alt_status: String = row.try_get("alt_status")?;

    Ok(MemberRecord {
        platform_id: PlatformId::new(row.try_get::<String, _>("platform_id")?),
        main: slot_from_columns(&main_game_id, &main_status),
        alt: slot_from_columns(&alt_game_id, &alt_status),
        watchlist_reason: (watchlist != DASH).then_some(watchlist),
        warning_count: row.try_get::<i64, _>("warning_count")? as u32,
        last_warning_at: if last_warning == DASH {
            None
        } else {
            Some(timestamp_from_column(&last_warning)?)
        },
        birthday: Birthday::parse(&birthday),
    })
}

fn warning_from_row(row: &SqliteRow) -> StoreResult<WarningRecord> {
    let issued_at: String = row.try_get("issued_at")?;
    Ok(WarningRecord {
        id: row.try_get("id")?,
        member: PlatformId::new(row.try_get::<String, _>("platform_id")?),
        reason: row.try_get("reason")?,
        issued_at: timestamp_from_column(&issued_at)?,
    })
}

fn ban_from_row(row: &SqliteRow) -> StoreResult<BanRecord> {
    let recorded_at: String = row.try_get("recorded_at")?;
    Ok(BanRecord {
        platform_id: PlatformId::new(row.try_get::<String, _>("platform_id")?),
        reason: row.try_get("reason")?,
        recorded_at: timestamp_from_column(&recorded_at)?,
    })
}

fn application_from_row(row: &SqliteRow) -> StoreResult<ApplicationRecord> {
    let submitted_at: String = row.try_get("submitted_at")?;
    Ok(ApplicationRecord {
        id: row.try_get("id")?,
        submitted_at: timestamp_from_column(&submitted_at)?,
        platform_id: PlatformId::new(row.try_get::<String, _>("platform_id")?),
        game_id: GameId::new(row.try_get::<String, _>("game_id")?),
        stage_one: StageOneAnswers {
            joined_how: row.try_get("joined_how")?,
            timezone: row.try_get("timezone")?,
            has_commander_tag: row.try_get("has_commander_tag")?,
        },
        stage_two: StageTwoAnswers {
            content_preference: row.try_get("content_preference")?,
            has_led_event: row.try_get("has_led_event")?,
            event_interest: row.try_get("event_interest")?,
            changes_suggested: row.try_get("changes_suggested")?,
        },
    })
}

/// Identifiers that can never name a real game account.
fn is_sentinel_identifier(identifier: &str) -> bool {
    identifier == DASH || identifier.eq_ignore_ascii_case(UNKNOWN)
}

#[async_trait]
impl MemberStore for SqliteIdentityStore {
    async fn ensure_member(&self, platform_id: &PlatformId) -> StoreResult<MemberRecord> {
        sqlx::query("INSERT OR IGNORE INTO members (platform_id) VALUES (?1)")
            .bind(platform_id.as_str())
            .execute(&self.pool)
            .await?;
        self.get_member(platform_id)
            .await?
            .ok_or_else(|| StoreError::UnknownMember(platform_id.clone()))
    }

    async fn get_member(&self, platform_id: &PlatformId) -> StoreResult<Option<MemberRecord>> {
        let row = sqlx::query("SELECT * FROM members WHERE platform_id = ?1")
            .bind(platform_id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(member_from_row).transpose()
    }

    async fn resolve_member(&self, identifier: &str) -> StoreResult<Option<MemberRecord>> {
        let row = sqlx::query("SELECT * FROM members WHERE platform_id = ?1")
            .bind(identifier)
            .fetch_optional(&self.pool)
            .await?;
        if let Some(row) = row {
            return Ok(Some(member_from_row(&row)?));
        }
        if is_sentinel_identifier(identifier) {
            return Ok(None);
        }
        for query in [
            "SELECT * FROM members WHERE main_game_id = ?1",
            "SELECT * FROM members WHERE alt_game_id = ?1",
        ] {
            let row = sqlx::query(query)
                .bind(identifier)
                .fetch_optional(&self.pool)
                .await?;
            if let Some(row) = row {
                return Ok(Some(member_from_row(&row)?));
            }
        }
        Ok(None)
    }

    async fn list_members(&self) -> StoreResult<Vec<MemberRecord>> {
        let rows = sqlx::query("SELECT * FROM members ORDER BY platform_id")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(member_from_row).collect()
    }

    async fn delete_member(&self, platform_id: &PlatformId) -> StoreResult<bool> {
        let _guard = self.write_guard.lock().await;
        let result = sqlx::query("DELETE FROM members WHERE platform_id = ?1")
            .bind(platform_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn commit_link(
        &self,
        platform_id: &PlatformId,
        write: LinkWrite,
    ) -> StoreResult<MemberRecord> {
        let _guard = self.write_guard.lock().await;
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT OR IGNORE INTO members (platform_id) VALUES (?1)")
            .bind(platform_id.as_str())
            .execute(&mut *tx)
            .await?;

        // Uniqueness re-check against committed state. NOCASE collation on
        // the identity columns makes the comparison case-insensitive.
        for slot in [&write.main, &write.alt].into_iter().flatten() {
            if let Some(game_id) = &slot.game_id {
                let holder = sqlx::query(
                    "SELECT platform_id FROM members \
                     WHERE platform_id <> ?1 \
                       AND (main_game_id = ?2 OR alt_game_id = ?2) \
                     LIMIT 1",
                )
                .bind(platform_id.as_str())
                .bind(game_id.as_str())
                .fetch_optional(&mut *tx)
                .await?;
                if let Some(row) = holder {
                    return Err(StoreError::ClaimConflict {
                        game_id: game_id.clone(),
                        holder: PlatformId::new(row.try_get::<String, _>("platform_id")?),
                    });
                }
            }
        }

        let row = sqlx::query("SELECT * FROM members WHERE platform_id = ?1")
            .bind(platform_id.as_str())
            .fetch_one(&mut *tx)
            .await?;
        let mut record = member_from_row(&row)?;
        if let Some(main) = write.main {
            record.main = main;
        }
        if let Some(alt) = write.alt {
            record.alt = alt;
        }

        let (main_game_id, main_status) = slot_columns(&record.main, UNKNOWN);
        let (alt_game_id, alt_status) = slot_columns(&record.alt, DASH);
        sqlx::query(
            "UPDATE members \
             SET main_game_id = ?2, main_status = ?3, alt_game_id = ?4, alt_status = ?5 \
             WHERE platform_id = ?1",
        )
        .bind(platform_id.as_str())
        .bind(main_game_id)
        .bind(main_status)
        .bind(alt_game_id)
        .bind(alt_status)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(record)
    }

    async fn set_statuses(
        &self,
        platform_id: &PlatformId,
        main: MembershipStatus,
        alt: MembershipStatus,
    ) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE members SET main_status = ?2, alt_status = ?3 WHERE platform_id = ?1",
        )
        .bind(platform_id.as_str())
        .bind(main.as_str())
        .bind(alt.as_str())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::UnknownMember(platform_id.clone()));
        }
        Ok(())
    }

    async fn set_birthday(
        &self,
        platform_id: &PlatformId,
        birthday: Option<Birthday>,
    ) -> StoreResult<()> {
        let value = birthday.map_or_else(|| DASH.to_string(), |b| b.to_string());
        let result = sqlx::query("UPDATE members SET birthday = ?2 WHERE platform_id = ?1")
            .bind(platform_id.as_str())
            .bind(value)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::UnknownMember(platform_id.clone()));
        }
        Ok(())
    }

    async fn set_watchlist(
        &self,
        platform_id: &PlatformId,
        reason: Option<String>,
    ) -> StoreResult<()> {
        let value = reason.unwrap_or_else(|| DASH.to_string());
        let result = sqlx::query("UPDATE members SET watchlist_reason = ?2 WHERE platform_id = ?1")
            .bind(platform_id.as_str())
            .bind(value)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::UnknownMember(platform_id.clone()));
        }
        Ok(())
    }

    async fn claimed_game_ids(&self) -> StoreResult<HashSet<String>> {
        let rows = sqlx::query("SELECT main_game_id, alt_game_id FROM members")
            .fetch_all(&self.pool)
            .await?;
        let mut claimed = HashSet::new();
        for row in rows {
            for column in ["main_game_id", "alt_game_id"] {
                let value: String = row.try_get(column)?;
                if !is_sentinel_identifier(&value) {
                    claimed.insert(value.to_ascii_lowercase());
                }
            }
        }
        Ok(claimed)
    }
}

#[async_trait]
impl WarningStore for SqliteIdentityStore {
    async fn record_warning(
        &self,
        member: &PlatformId,
        reason: &str,
        issued_at: DateTime<Utc>,
        purge_before: DateTime<Utc>,
    ) -> StoreResult<(WarningRecord, u32)> {
        let _guard = self.write_guard.lock().await;
        let mut tx = self.pool.begin().await?;

        let exists = sqlx::query("SELECT 1 FROM members WHERE platform_id = ?1")
            .bind(member.as_str())
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(StoreError::UnknownMember(member.clone()));
        }

        sqlx::query("DELETE FROM warnings WHERE platform_id = ?1 AND issued_at < ?2")
            .bind(member.as_str())
            .bind(timestamp_to_column(purge_before))
            .execute(&mut *tx)
            .await?;

        let inserted = sqlx::query(
            "INSERT INTO warnings (platform_id, reason, issued_at) VALUES (?1, ?2, ?3)",
        )
        .bind(member.as_str())
        .bind(reason)
        .bind(timestamp_to_column(issued_at))
        .execute(&mut *tx)
        .await?;
        let warning_id = inserted.last_insert_rowid();

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM warnings WHERE platform_id = ?1")
                .bind(member.as_str())
                .fetch_one(&mut *tx)
                .await?;

        sqlx::query(
            "UPDATE members SET warning_count = ?2, last_warning_at = ?3 WHERE platform_id = ?1",
        )
        .bind(member.as_str())
        .bind(total)
        .bind(timestamp_to_column(issued_at))
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok((
            WarningRecord {
                id: warning_id,
                member: member.clone(),
                reason: reason.to_string(),
                issued_at,
            },
            total as u32,
        ))
    }

    async fn warnings_for(&self, member: &PlatformId) -> StoreResult<Vec<WarningRecord>> {
        let rows = sqlx::query(
            "SELECT * FROM warnings WHERE platform_id = ?1 ORDER BY issued_at ASC, id ASC",
        )
        .bind(member.as_str())
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(warning_from_row).collect()
    }

    async fn remove_warning(&self, member: &PlatformId, warning_id: i64) -> StoreResult<u32> {
        let _guard = self.write_guard.lock().await;
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM warnings WHERE id = ?1 AND platform_id = ?2")
            .bind(warning_id)
            .bind(member.as_str())
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::UnknownWarning(warning_id));
        }

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM warnings WHERE platform_id = ?1")
                .bind(member.as_str())
                .fetch_one(&mut *tx)
                .await?;
        sqlx::query("UPDATE members SET warning_count = ?2 WHERE platform_id = ?1")
            .bind(member.as_str())
            .bind(total)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(total as u32)
    }
}

#[async_trait]
impl BanStore for SqliteIdentityStore {
    async fn upsert_ban(&self, ban: BanRecord) -> StoreResult<()> {
        sqlx::query("INSERT OR REPLACE INTO bans (platform_id, reason, recorded_at) VALUES (?1, ?2, ?3)")
            .bind(ban.platform_id.as_str())
            .bind(&ban.reason)
            .bind(timestamp_to_column(ban.recorded_at))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_ban(&self, platform_id: &PlatformId) -> StoreResult<Option<BanRecord>> {
        let row = sqlx::query("SELECT * FROM bans WHERE platform_id = ?1")
            .bind(platform_id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(ban_from_row).transpose()
    }

    async fn list_bans(&self) -> StoreResult<Vec<BanRecord>> {
        let rows = sqlx::query("SELECT * FROM bans ORDER BY recorded_at DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(ban_from_row).collect()
    }

    async fn delete_ban(&self, platform_id: &PlatformId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM bans WHERE platform_id = ?1")
            .bind(platform_id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ApplicationStore for SqliteIdentityStore {
    async fn insert_application(
        &self,
        draft: ApplicationDraft,
        submitted_at: DateTime<Utc>,
    ) -> StoreResult<ApplicationRecord> {
        let inserted = sqlx::query(
            "INSERT INTO applications \
             (submitted_at, platform_id, game_id, joined_how, timezone, has_commander_tag, \
              content_preference, has_led_event, event_interest, changes_suggested) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        )
        .bind(timestamp_to_column(submitted_at))
        .bind(draft.platform_id.as_str())
        .bind(draft.game_id.as_str())
        .bind(&draft.stage_one.joined_how)
        .bind(&draft.stage_one.timezone)
        .bind(&draft.stage_one.has_commander_tag)
        .bind(&draft.stage_two.content_preference)
        .bind(&draft.stage_two.has_led_event)
        .bind(&draft.stage_two.event_interest)
        .bind(&draft.stage_two.changes_suggested)
        .execute(&self.pool)
        .await?;

        Ok(ApplicationRecord {
            id: inserted.last_insert_rowid(),
            submitted_at,
            platform_id: draft.platform_id,
            game_id: draft.game_id,
            stage_one: draft.stage_one,
            stage_two: draft.stage_two,
        })
    }

    async fn list_applications(&self) -> StoreResult<Vec<ApplicationRecord>> {
        let rows = sqlx::query("SELECT * FROM applications ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(application_from_row).collect()
    }

    async fn get_application(&self, id: i64) -> StoreResult<Option<ApplicationRecord>> {
        let row = sqlx::query("SELECT * FROM applications WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(application_from_row).transpose()
    }

    async fn delete_application(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM applications WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn linked(name: &str) -> Option<SlotState> {
        Some(SlotState::linked(GameId::new(name), MembershipStatus::Member))
    }

    async fn store() -> SqliteIdentityStore {
        SqliteIdentityStore::in_memory().await.unwrap()
    }

    #[tokio::test]
    async fn test_provisioned_member_round_trips_sentinels() {
        let store = store().await;
        let d1 = PlatformId::new("d1");
        let record = store.ensure_member(&d1).await.unwrap();
        assert_eq!(record, MemberRecord::provisioned(d1));
    }

    #[tokio::test]
    async fn test_commit_link_conflict_is_case_insensitive_and_atomic() {
        let store = store().await;
        let d1 = PlatformId::new("d1");
        let d2 = PlatformId::new("d2");

        store
            .commit_link(
                &d1,
                LinkWrite {
                    main: linked("Foo.1234"),
                    alt: None,
                },
            )
            .await
            .unwrap();

        let err = store
            .commit_link(
                &d2,
                LinkWrite {
                    main: linked("FOO.1234"),
                    alt: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ClaimConflict { holder, .. } if holder == d1));

        // The losing claim rolled back, including the implicit provisioning.
        let d2_record = store.get_member(&d2).await.unwrap();
        assert!(d2_record.is_none() || !d2_record.unwrap().is_linked());
    }

    #[tokio::test]
    async fn test_member_delete_cascades_warnings() {
        let store = store().await;
        let d1 = PlatformId::new("d1");
        store.ensure_member(&d1).await.unwrap();
        let now = Utc::now();
        store
            .record_warning(&d1, "afk", now, now - Duration::days(90))
            .await
            .unwrap();

        assert!(store.delete_member(&d1).await.unwrap());
        assert!(store.warnings_for(&d1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_warning_count_tracks_table() {
        let store = store().await;
        let d1 = PlatformId::new("d1");
        store.ensure_member(&d1).await.unwrap();
        let now = Utc::now();
        let cutoff = now - Duration::days(90);

        let (first, total) = store.record_warning(&d1, "one", now, cutoff).await.unwrap();
        assert_eq!(total, 1);
        let (_, total) = store.record_warning(&d1, "two", now, cutoff).await.unwrap();
        assert_eq!(total, 2);

        let total = store.remove_warning(&d1, first.id).await.unwrap();
        assert_eq!(total, 1);
        let record = store.get_member(&d1).await.unwrap().unwrap();
        assert_eq!(record.warning_count, 1);

        let err = store.remove_warning(&d1, first.id).await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownWarning(_)));
    }

    #[tokio::test]
    async fn test_application_round_trip_and_delete() {
        let store = store().await;
        let draft = ApplicationDraft {
            platform_id: PlatformId::new("d1"),
            game_id: GameId::new("Foo.1234"),
            stage_one: StageOneAnswers {
                joined_how: "through a friend".into(),
                timezone: "UTC+2".into(),
                has_commander_tag: "yes".into(),
            },
            stage_two: StageTwoAnswers {
                content_preference: "raids".into(),
                has_led_event: "no".into(),
                event_interest: Some("training runs".into()),
                changes_suggested: None,
            },
        };

        let record = store
            .insert_application(draft, Utc::now())
            .await
            .unwrap();
        assert_eq!(
            store.get_application(record.id).await.unwrap().as_ref(),
            Some(&record)
        );
        assert!(store.delete_application(record.id).await.unwrap());
        assert!(!store.delete_application(record.id).await.unwrap());
    }
}
