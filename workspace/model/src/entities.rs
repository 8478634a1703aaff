//! This file serves as the root for all SeaORM entity modules.
//! We define the data models for the attendance tracking application
//! here: registered user accounts, submitted attendance records, and
//! the server-side login sessions that bind a cookie to an account.

pub mod attendance_record;
pub mod auth_session;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::attendance_record::Entity as AttendanceRecord;
    pub use super::auth_session::Entity as AuthSession;
    pub use super::user::Entity as User;
}

#[cfg(test)]
mod test {
    use chrono::{TimeZone, Utc};
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, ModelTrait, QueryFilter, QueryOrder, Set,
    };

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        // Connect to the SQLite database
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        // Try to apply migrations first
        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await?;

        // Create one account per role
        let lecturer = user::ActiveModel {
            username: Set("dr_amadi".to_string()),
            password_hash: Set("$argon2id$stub".to_string()),
            role: Set(user::Role::Lecturer),
            active: Set(true),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let student = user::ActiveModel {
            username: Set("jane".to_string()),
            password_hash: Set("$argon2id$stub".to_string()),
            role: Set(user::Role::Student),
            active: Set(true),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Submit two attendance records
        let first = attendance_record::ActiveModel {
            name: Set("Jane Doe".to_string()),
            matric_no: Set("U001".to_string()),
            course: Set("CS101".to_string()),
            timestamp: Set(Utc.with_ymd_and_hms(2024, 5, 14, 9, 0, 0).unwrap()),
            active: Set(true),
            latitude: Set(Some(6.5244)),
            longitude: Set(Some(3.3792)),
            accuracy: Set(Some(15.0)),
            location_name: Set(Some("Lecture Hall B".to_string())),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let second = attendance_record::ActiveModel {
            name: Set("John Okoro".to_string()),
            matric_no: Set("U002".to_string()),
            course: Set("CS101".to_string()),
            timestamp: Set(Utc.with_ymd_and_hms(2024, 5, 14, 9, 5, 0).unwrap()),
            active: Set(true),
            latitude: Set(None),
            longitude: Set(None),
            accuracy: Set(None),
            location_name: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // The unique index on matric_no rejects a second row for the same student
        let duplicate = attendance_record::ActiveModel {
            name: Set("Jane Doe".to_string()),
            matric_no: Set("U001".to_string()),
            course: Set("MTH202".to_string()),
            timestamp: Set(Utc.with_ymd_and_hms(2024, 5, 14, 9, 10, 0).unwrap()),
            active: Set(true),
            latitude: Set(None),
            longitude: Set(None),
            accuracy: Set(None),
            location_name: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await;
        assert!(duplicate.is_err(), "duplicate matric_no must be rejected by the store");

        // Row count is unchanged after the rejected insert
        let records = AttendanceRecord::find()
            .order_by_desc(attendance_record::Column::Timestamp)
            .all(&db)
            .await?;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, second.id, "listing must be newest first");
        assert_eq!(records[1].id, first.id);
        assert_eq!(records[1].location_name.as_deref(), Some("Lecture Hall B"));

        // Open a session for the student and walk the relation back
        let session = auth_session::ActiveModel {
            token: Set("8e6f2c4a-stub-token".to_string()),
            user_id: Set(student.id),
            expires_at: Set(Utc.with_ymd_and_hms(2099, 1, 1, 0, 0, 0).unwrap()),
        }
        .insert(&db)
        .await?;

        let session_owner = session.find_related(User).one(&db).await?.unwrap();
        assert_eq!(session_owner.username, "jane");
        assert_eq!(session_owner.role, user::Role::Student);

        // Deleting a user cascades to their sessions
        lecturer.delete(&db).await?;
        let sessions = AuthSession::find()
            .filter(auth_session::Column::UserId.eq(student.id))
            .all(&db)
            .await?;
        assert_eq!(sessions.len(), 1);

        Ok(())
    }
}
