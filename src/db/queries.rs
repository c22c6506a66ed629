use anyhow::Context;
use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use serde::Serialize;

use super::{DATE_FORMAT, TIMESTAMP_FORMAT};
use crate::models::{
    AuditEvent, AuditKind, Booking, BookingDetails, BookingStatus, Hotel, HotelStatus,
    HotelWithOwner, OwnerSummary, Role, StatusFilter, User, UserSummary,
};

pub fn now_timestamp() -> String {
    Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(s: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .with_context(|| format!("malformed timestamp: {s}"))
}

/// Turns free-text search input into a `LIKE` pattern (escape char `\`).
/// Blank input means no filtering.
fn like_pattern(search: Option<&str>) -> Option<String> {
    let term = search.map(str::trim).filter(|t| !t.is_empty())?;
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    Some(format!("%{escaped}%"))
}

fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).with_context(|| format!("malformed date: {s}"))
}

// ── Users ──

const USER_COLUMNS: &str = "u.id, u.email, u.name, u.role, u.phone, u.photo_url, u.created_at";

fn parse_user_row(row: &rusqlite::Row) -> anyhow::Result<User> {
    let role_str: String = row.get(3)?;
    let created_at_str: String = row.get(6)?;

    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        role: Role::parse(&role_str).with_context(|| format!("unknown user role: {role_str}"))?,
        phone: row.get(4)?,
        photo_url: row.get(5)?,
        created_at: parse_timestamp(&created_at_str)?,
    })
}

pub fn insert_user(conn: &Connection, user: &User) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO users (id, email, name, role, phone, photo_url, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            user.id,
            user.email,
            user.name,
            user.role.as_str(),
            user.phone,
            user.photo_url,
            user.created_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_user(conn: &Connection, id: &str) -> anyhow::Result<Option<User>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users u WHERE u.id = ?1");
    let user = conn
        .query_row(&sql, params![id], |row| Ok(parse_user_row(row)))
        .optional()?;
    user.transpose()
}

/// Lists users newest first. `search` matches name or email.
pub fn list_users(conn: &Connection, search: Option<&str>) -> anyhow::Result<Vec<UserSummary>> {
    let sql = format!(
        "SELECT {USER_COLUMNS}, (SELECT COUNT(*) FROM bookings b WHERE b.user_id = u.id)
         FROM users u
         WHERE (?1 IS NULL OR u.name LIKE ?1 ESCAPE '\\' OR u.email LIKE ?1 ESCAPE '\\')
         ORDER BY u.created_at DESC, u.rowid DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![like_pattern(search)], |row| {
        let bookings_count: i64 = row.get(7)?;
        Ok(parse_user_row(row).map(|user| UserSummary {
            user,
            bookings_count,
        }))
    })?;

    let mut users = vec![];
    for row in rows {
        users.push(row??);
    }
    Ok(users)
}

/// Whether `email` belongs to a user other than `user_id`.
pub fn email_taken_by_other(conn: &Connection, email: &str, user_id: &str) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE email = ?1 AND id != ?2",
        params![email, user_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn update_user(conn: &Connection, user: &User) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE users SET email = ?1, name = ?2, role = ?3, phone = ?4 WHERE id = ?5",
        params![user.email, user.name, user.role.as_str(), user.phone, user.id],
    )?;
    Ok(count > 0)
}

pub fn count_hotels_owned_by(conn: &Connection, user_id: &str) -> anyhow::Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM hotels WHERE owner_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?;
    Ok(count)
}

/// Removes a user together with their bookings. Returns the number of
/// bookings removed, or `None` when the user did not exist.
pub fn delete_user_with_bookings(conn: &Connection, user_id: &str) -> anyhow::Result<Option<usize>> {
    let tx = conn.unchecked_transaction()?;

    let removed_bookings = tx.execute("DELETE FROM bookings WHERE user_id = ?1", params![user_id])?;
    let removed_users = tx.execute("DELETE FROM users WHERE id = ?1", params![user_id])?;

    if removed_users == 0 {
        tx.rollback()?;
        return Ok(None);
    }

    tx.commit()?;
    Ok(Some(removed_bookings))
}

// ── Hotels ──

const HOTEL_COLUMNS: &str = "id, owner_id, name, description, city, address, country, price_per_night, rating, status, rejection_reason, created_at, updated_at";
const HOTEL_COLUMNS_H: &str = "h.id, h.owner_id, h.name, h.description, h.city, h.address, h.country, h.price_per_night, h.rating, h.status, h.rejection_reason, h.created_at, h.updated_at";

fn parse_hotel_row(row: &rusqlite::Row) -> anyhow::Result<Hotel> {
    let status_str: String = row.get(9)?;
    let created_at_str: String = row.get(11)?;
    let updated_at_str: String = row.get(12)?;

    Ok(Hotel {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        city: row.get(4)?,
        address: row.get(5)?,
        country: row.get(6)?,
        price_per_night: row.get(7)?,
        rating: row.get(8)?,
        status: HotelStatus::parse(&status_str)
            .with_context(|| format!("unknown hotel status: {status_str}"))?,
        rejection_reason: row.get(10)?,
        created_at: parse_timestamp(&created_at_str)?,
        updated_at: parse_timestamp(&updated_at_str)?,
    })
}

fn parse_hotel_with_owner_row(row: &rusqlite::Row) -> anyhow::Result<HotelWithOwner> {
    let hotel = parse_hotel_row(row)?;
    let owner = OwnerSummary {
        id: row.get(13)?,
        name: row.get(14)?,
        email: row.get(15)?,
    };
    Ok(HotelWithOwner { hotel, owner })
}

pub fn create_hotel(conn: &Connection, hotel: &Hotel) -> anyhow::Result<()> {
    conn.execute(
        &format!(
            "INSERT INTO hotels ({HOTEL_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)"
        ),
        params![
            hotel.id,
            hotel.owner_id,
            hotel.name,
            hotel.description,
            hotel.city,
            hotel.address,
            hotel.country,
            hotel.price_per_night,
            hotel.rating,
            hotel.status.as_str(),
            hotel.rejection_reason,
            hotel.created_at.format(TIMESTAMP_FORMAT).to_string(),
            hotel.updated_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn get_hotel(conn: &Connection, id: &str) -> anyhow::Result<Option<Hotel>> {
    let sql = format!("SELECT {HOTEL_COLUMNS} FROM hotels WHERE id = ?1");
    let hotel = conn
        .query_row(&sql, params![id], |row| Ok(parse_hotel_row(row)))
        .optional()?;
    hotel.transpose()
}

pub fn get_hotel_with_owner(conn: &Connection, id: &str) -> anyhow::Result<Option<HotelWithOwner>> {
    let sql = format!(
        "SELECT {HOTEL_COLUMNS_H}, u.id, u.name, u.email
         FROM hotels h JOIN users u ON u.id = h.owner_id
         WHERE h.id = ?1"
    );
    let hotel = conn
        .query_row(&sql, params![id], |row| Ok(parse_hotel_with_owner_row(row)))
        .optional()?;
    hotel.transpose()
}

/// Lists hotels matching `filter`, newest first. Legacy status spellings
/// match the canonical status they stand for.
pub fn list_hotels(conn: &Connection, filter: StatusFilter) -> anyhow::Result<Vec<HotelWithOwner>> {
    let spellings: &[&str] = match filter {
        StatusFilter::All => &[],
        StatusFilter::Only(status) => status.spellings(),
    };

    let where_clause = if spellings.is_empty() {
        String::new()
    } else {
        let placeholders = (1..=spellings.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!("WHERE h.status IN ({placeholders})")
    };

    let sql = format!(
        "SELECT {HOTEL_COLUMNS_H}, u.id, u.name, u.email
         FROM hotels h JOIN users u ON u.id = h.owner_id
         {where_clause}
         ORDER BY h.created_at DESC, h.rowid DESC"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(spellings.iter()), |row| {
        Ok(parse_hotel_with_owner_row(row))
    })?;

    let mut hotels = vec![];
    for row in rows {
        hotels.push(row??);
    }
    Ok(hotels)
}

/// Sets status and rejection reason in one statement. Returns the updated
/// row, or `None` when no hotel has this id.
pub fn update_hotel_status(
    conn: &Connection,
    id: &str,
    status: HotelStatus,
    rejection_reason: Option<&str>,
) -> anyhow::Result<Option<Hotel>> {
    let sql = format!(
        "UPDATE hotels SET status = ?1, rejection_reason = ?2, updated_at = ?3
         WHERE id = ?4
         RETURNING {HOTEL_COLUMNS}"
    );
    let hotel = conn
        .query_row(
            &sql,
            params![status.as_str(), rejection_reason, now_timestamp(), id],
            |row| Ok(parse_hotel_row(row)),
        )
        .optional()?;
    hotel.transpose()
}

// ── Bookings ──

const BOOKING_COLUMNS_B: &str = "b.id, b.user_id, b.hotel_id, b.check_in, b.check_out, b.total_price, b.status, b.created_at, b.updated_at";

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let check_in_str: String = row.get(3)?;
    let check_out_str: String = row.get(4)?;
    let status_str: String = row.get(6)?;
    let created_at_str: String = row.get(7)?;
    let updated_at_str: String = row.get(8)?;

    Ok(Booking {
        id: row.get(0)?,
        user_id: row.get(1)?,
        hotel_id: row.get(2)?,
        check_in: parse_date(&check_in_str)?,
        check_out: parse_date(&check_out_str)?,
        total_price: row.get(5)?,
        status: BookingStatus::parse(&status_str),
        created_at: parse_timestamp(&created_at_str)?,
        updated_at: parse_timestamp(&updated_at_str)?,
    })
}

fn parse_booking_details_row(row: &rusqlite::Row) -> anyhow::Result<BookingDetails> {
    Ok(BookingDetails {
        booking: parse_booking_row(row)?,
        user_name: row.get(9)?,
        user_email: row.get(10)?,
        hotel_name: row.get(11)?,
        hotel_city: row.get(12)?,
    })
}

pub fn create_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, user_id, hotel_id, check_in, check_out, total_price, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            booking.id,
            booking.user_id,
            booking.hotel_id,
            booking.check_in.format(DATE_FORMAT).to_string(),
            booking.check_out.format(DATE_FORMAT).to_string(),
            booking.total_price,
            booking.status.as_str(),
            booking.created_at.format(TIMESTAMP_FORMAT).to_string(),
            booking.updated_at.format(TIMESTAMP_FORMAT).to_string(),
        ],
    )?;
    Ok(())
}

pub fn list_bookings(conn: &Connection) -> anyhow::Result<Vec<Booking>> {
    let sql = format!("SELECT {BOOKING_COLUMNS_B} FROM bookings b ORDER BY b.created_at DESC, b.rowid DESC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn list_bookings_for_user(conn: &Connection, user_id: &str) -> anyhow::Result<Vec<Booking>> {
    let sql = format!(
        "SELECT {BOOKING_COLUMNS_B} FROM bookings b WHERE b.user_id = ?1
         ORDER BY b.created_at DESC, b.rowid DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

/// Lists bookings newest first. `search` matches guest name, guest email or
/// hotel name.
pub fn list_booking_details(
    conn: &Connection,
    search: Option<&str>,
) -> anyhow::Result<Vec<BookingDetails>> {
    let sql = format!(
        "SELECT {BOOKING_COLUMNS_B}, u.name, u.email, h.name, h.city
         FROM bookings b
         JOIN users u ON u.id = b.user_id
         JOIN hotels h ON h.id = b.hotel_id
         WHERE (?1 IS NULL
                OR u.name LIKE ?1 ESCAPE '\\'
                OR u.email LIKE ?1 ESCAPE '\\'
                OR h.name LIKE ?1 ESCAPE '\\')
         ORDER BY b.created_at DESC, b.rowid DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![like_pattern(search)], |row| {
        Ok(parse_booking_details_row(row))
    })?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn get_booking_details(conn: &Connection, id: &str) -> anyhow::Result<Option<BookingDetails>> {
    let sql = format!(
        "SELECT {BOOKING_COLUMNS_B}, u.name, u.email, h.name, h.city
         FROM bookings b
         JOIN users u ON u.id = b.user_id
         JOIN hotels h ON h.id = b.hotel_id
         WHERE b.id = ?1"
    );
    let booking = conn
        .query_row(&sql, params![id], |row| Ok(parse_booking_details_row(row)))
        .optional()?;
    booking.transpose()
}

/// Moves a booking to `next` only if it is still in `current`. Returns false
/// when the row was missing or had already moved on.
pub fn update_booking_status(
    conn: &Connection,
    id: &str,
    current: &BookingStatus,
    next: &BookingStatus,
) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
        params![next.as_str(), now_timestamp(), id, current.as_str()],
    )?;
    Ok(count > 0)
}

// ── Stats ──

#[derive(Debug, Clone, Default, Serialize)]
pub struct PlatformTotals {
    pub total_users: i64,
    pub total_hotels: i64,
    pub total_bookings: i64,
    pub total_revenue: f64,
    pub recent_bookings: i64,
    pub active_hotels: i64,
    pub pending_bookings: i64,
    pub completed_bookings: i64,
}

pub fn get_platform_totals(conn: &Connection) -> anyhow::Result<PlatformTotals> {
    let week_ago = (Utc::now().naive_utc() - chrono::Duration::days(7))
        .format(TIMESTAMP_FORMAT)
        .to_string();
    let active = HotelStatus::Active.spellings();

    let total_users = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
    let total_hotels = conn.query_row("SELECT COUNT(*) FROM hotels", [], |row| row.get(0))?;
    let total_bookings = conn.query_row("SELECT COUNT(*) FROM bookings", [], |row| row.get(0))?;
    let total_revenue = conn.query_row(
        "SELECT COALESCE(SUM(total_price), 0.0) FROM bookings WHERE status IN ('CONFIRMED', 'COMPLETED')",
        [],
        |row| row.get(0),
    )?;
    let recent_bookings = conn.query_row(
        "SELECT COUNT(*) FROM bookings WHERE created_at >= ?1",
        params![week_ago],
        |row| row.get(0),
    )?;
    let active_hotels = conn.query_row(
        "SELECT COUNT(*) FROM hotels WHERE status IN (?1, ?2)",
        params![active[0], active[1]],
        |row| row.get(0),
    )?;
    let pending_bookings = conn.query_row(
        "SELECT COUNT(*) FROM bookings WHERE status = 'PENDING'",
        [],
        |row| row.get(0),
    )?;
    let completed_bookings = conn.query_row(
        "SELECT COUNT(*) FROM bookings WHERE status = 'COMPLETED'",
        [],
        |row| row.get(0),
    )?;

    Ok(PlatformTotals {
        total_users,
        total_hotels,
        total_bookings,
        total_revenue,
        recent_bookings,
        active_hotels,
        pending_bookings,
        completed_bookings,
    })
}

// ── Audit Log ──

fn parse_audit_row(row: &rusqlite::Row) -> anyhow::Result<AuditEvent> {
    let kind_str: String = row.get(2)?;
    let created_at_str: String = row.get(5)?;
    Ok(AuditEvent {
        id: row.get(0)?,
        action: row.get(1)?,
        kind: AuditKind::parse(&kind_str)
            .with_context(|| format!("unknown audit kind: {kind_str}"))?,
        actor: row.get(3)?,
        details: row.get(4)?,
        created_at: parse_timestamp(&created_at_str)?,
    })
}

pub fn insert_audit_event(
    conn: &Connection,
    action: &str,
    kind: AuditKind,
    actor: &str,
    details: &str,
) -> anyhow::Result<AuditEvent> {
    let stamp = now_timestamp();
    conn.execute(
        "INSERT INTO audit_log (action, kind, actor, details, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![action, kind.as_str(), actor, details, stamp],
    )?;
    let created_at = parse_timestamp(&stamp)?;
    Ok(AuditEvent {
        id: conn.last_insert_rowid(),
        action: action.to_string(),
        kind,
        actor: actor.to_string(),
        details: details.to_string(),
        created_at,
    })
}

/// Filters applied to the audit log listing.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub kind: Option<AuditKind>,
    /// Matches action, actor or details.
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Audit entries newest first, one page at a time.
pub fn list_audit_events(conn: &Connection, filter: &AuditFilter) -> anyhow::Result<Vec<AuditEvent>> {
    let mut stmt = conn.prepare(
        "SELECT id, action, kind, actor, details, created_at
         FROM audit_log
         WHERE (?1 IS NULL OR kind = ?1)
           AND (?2 IS NULL
                OR action LIKE ?2 ESCAPE '\\'
                OR actor LIKE ?2 ESCAPE '\\'
                OR details LIKE ?2 ESCAPE '\\')
         ORDER BY id DESC LIMIT ?3 OFFSET ?4",
    )?;
    let rows = stmt.query_map(
        params![
            filter.kind.map(|k| k.as_str()),
            like_pattern(filter.search.as_deref()),
            filter.limit,
            filter.offset,
        ],
        |row| Ok(parse_audit_row(row)),
    )?;

    let mut events = vec![];
    for row in rows {
        events.push(row??);
    }
    Ok(events)
}

pub fn count_audit_events(conn: &Connection, filter: &AuditFilter) -> anyhow::Result<i64> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM audit_log
         WHERE (?1 IS NULL OR kind = ?1)
           AND (?2 IS NULL
                OR action LIKE ?2 ESCAPE '\\'
                OR actor LIKE ?2 ESCAPE '\\'
                OR details LIKE ?2 ESCAPE '\\')",
        params![
            filter.kind.map(|k| k.as_str()),
            like_pattern(filter.search.as_deref()),
        ],
        |row| row.get(0),
    )?;
    Ok(count)
}

pub fn get_audit_events_since(conn: &Connection, since_id: i64) -> anyhow::Result<Vec<AuditEvent>> {
    let mut stmt = conn.prepare(
        "SELECT id, action, kind, actor, details, created_at
         FROM audit_log WHERE id > ?1
         ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![since_id], |row| Ok(parse_audit_row(row)))?;

    let mut events = vec![];
    for row in rows {
        events.push(row??);
    }
    Ok(events)
}
