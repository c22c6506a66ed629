use rusqlite::Connection;
use serde::Deserialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{Role, User};

#[derive(Debug, Default, Deserialize)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
}

pub fn update_user(conn: &Connection, user_id: &str, patch: UserPatch) -> Result<User, AppError> {
    let mut user = queries::get_user(conn, user_id)?
        .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))?;

    if let Some(name) = patch.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("name must not be empty".to_string()));
        }
        user.name = name.to_string();
    }
    if let Some(email) = patch.email {
        let email = email.trim().to_lowercase();
        if !email.contains('@') {
            return Err(AppError::Validation(format!("invalid email: {email}")));
        }
        if queries::email_taken_by_other(conn, &email, user_id)? {
            return Err(AppError::Validation(format!("email already in use: {email}")));
        }
        user.email = email;
    }
    if let Some(phone) = patch.phone {
        let phone = phone.trim();
        user.phone = (!phone.is_empty()).then(|| phone.to_string());
    }
    if let Some(role) = patch.role {
        user.role =
            Role::parse(&role).ok_or_else(|| AppError::Validation(format!("unknown role: {role}")))?;
    }

    queries::update_user(conn, &user)?;
    Ok(user)
}

/// Deletes a non-admin user and their bookings. Returns the removed user and
/// how many bookings went with them.
pub fn delete_user(conn: &Connection, user_id: &str) -> Result<(User, usize), AppError> {
    let user = queries::get_user(conn, user_id)?
        .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))?;

    if user.role == Role::Admin {
        return Err(AppError::Forbidden("administrators cannot be deleted".to_string()));
    }

    let owned = queries::count_hotels_owned_by(conn, user_id)?;
    if owned > 0 {
        return Err(AppError::Validation(format!(
            "user {user_id} still owns {owned} hotel(s)"
        )));
    }

    let removed = queries::delete_user_with_bookings(conn, user_id)?
        .ok_or_else(|| AppError::NotFound(format!("user {user_id}")))?;
    Ok((user, removed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn setup_db() -> Connection {
        let conn = db::init_db(":memory:").unwrap();
        conn.execute_batch(
            "INSERT INTO users (id, email, name, role) VALUES ('admin-1', 'admin@example.com', 'Admin', 'ADMIN');
             INSERT INTO users (id, email, name, role) VALUES ('owner-1', 'owner@example.com', 'Owner', 'OWNER');
             INSERT INTO users (id, email, name, role) VALUES ('u-1', 'guest@example.com', 'Guest', 'USER');
             INSERT INTO hotels (id, owner_id, name, city, price_per_night) VALUES ('h-1', 'owner-1', 'Hotel', 'Nice', 70.0);
             INSERT INTO bookings (id, user_id, hotel_id, check_in, check_out, total_price)
                 VALUES ('b-1', 'u-1', 'h-1', '2025-01-01', '2025-01-02', 70.0);
             INSERT INTO bookings (id, user_id, hotel_id, check_in, check_out, total_price)
                 VALUES ('b-2', 'u-1', 'h-1', '2025-02-01', '2025-02-03', 140.0);",
        )
        .unwrap();
        conn
    }

    #[test]
    fn test_delete_user_removes_bookings() {
        let conn = setup_db();
        let (user, removed) = delete_user(&conn, "u-1").unwrap();
        assert_eq!(user.email, "guest@example.com");
        assert_eq!(removed, 2);
        assert!(queries::get_user(&conn, "u-1").unwrap().is_none());
        assert!(queries::list_bookings(&conn).unwrap().is_empty());
    }

    #[test]
    fn test_admin_cannot_be_deleted() {
        let conn = setup_db();
        let err = delete_user(&conn, "admin-1").unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
        assert!(queries::get_user(&conn, "admin-1").unwrap().is_some());
    }

    #[test]
    fn test_owner_with_hotels_cannot_be_deleted() {
        let conn = setup_db();
        let err = delete_user(&conn, "owner-1").unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_delete_missing_user() {
        let conn = setup_db();
        let err = delete_user(&conn, "ghost").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn test_update_user_fields() {
        let conn = setup_db();
        let user = update_user(
            &conn,
            "u-1",
            UserPatch {
                name: Some(" Renamed ".to_string()),
                email: Some("NEW@Example.com".to_string()),
                phone: Some("".to_string()),
                role: Some("owner".to_string()),
            },
        )
        .unwrap();
        assert_eq!(user.name, "Renamed");
        assert_eq!(user.email, "new@example.com");
        assert_eq!(user.phone, None);
        assert_eq!(user.role, Role::Owner);

        let stored = queries::get_user(&conn, "u-1").unwrap().unwrap();
        assert_eq!(stored.email, "new@example.com");
    }

    #[test]
    fn test_update_user_duplicate_email() {
        let conn = setup_db();
        let err = update_user(
            &conn,
            "u-1",
            UserPatch {
                email: Some("Owner@Example.com".to_string()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let stored = queries::get_user(&conn, "u-1").unwrap().unwrap();
        assert_eq!(stored.email, "guest@example.com");

        // Re-submitting the user's own address is fine
        let user = update_user(
            &conn,
            "u-1",
            UserPatch {
                email: Some("guest@example.com".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(user.email, "guest@example.com");
    }

    #[test]
    fn test_update_user_validation() {
        let conn = setup_db();
        let err = update_user(
            &conn,
            "u-1",
            UserPatch {
                email: Some("not-an-email".to_string()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = update_user(
            &conn,
            "u-1",
            UserPatch {
                role: Some("SUPERUSER".to_string()),
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
