use anyhow::{anyhow, Context, Result};
use chrono::NaiveDate;
use rusqlite::{ffi, params, Connection, Row};

use crate::db::{
    connection::Database,
    helpers::{day_range_bounds, format_timestamp, parse_datetime, parse_optional_datetime},
    models::{Completion, NewWasteLog, WasteLog},
};

const SELECT_COLUMNS: &str = "SELECT log_id, zone_id, vehicle_id, worker_id, collection_start_time,
        collection_end_time, weight_collected, created_date, created_by, updated_date, updated_by
 FROM waste_logs";

fn row_to_waste_log(row: &Row) -> Result<WasteLog> {
    let start: String = row.get("collection_start_time")?;
    let end: Option<String> = row.get("collection_end_time")?;
    let created_date: String = row.get("created_date")?;
    let updated_date: String = row.get("updated_date")?;

    Ok(WasteLog {
        log_id: row.get("log_id")?,
        zone_id: row.get("zone_id")?,
        vehicle_id: row.get("vehicle_id")?,
        worker_id: row.get("worker_id")?,
        collection_start_time: parse_datetime(&start, "collection_start_time")?,
        collection_end_time: parse_optional_datetime(end, "collection_end_time")?,
        weight_collected: row.get("weight_collected")?,
        created_date: parse_datetime(&created_date, "created_date")?,
        created_by: row.get("created_by")?,
        updated_date: parse_datetime(&updated_date, "updated_date")?,
        updated_by: row.get("updated_by")?,
    })
}

/// Result of inserting a new log.
#[derive(Debug)]
pub enum InsertOutcome {
    Created(WasteLog),
    /// The active-triple index rejected the row.
    ActiveLogConflict,
}

/// Queries over `waste_logs` bound to one connection or transaction.
pub struct WasteLogRepository<'a> {
    conn: &'a Connection,
}

impl<'a> WasteLogRepository<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn find_by_id(&self, log_id: i64) -> Result<Option<WasteLog>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SELECT_COLUMNS} WHERE log_id = ?1"))?;
        let mut rows = stmt.query(params![log_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_waste_log(row)?)),
            None => Ok(None),
        }
    }

    /// The in-progress log for a worker/zone/vehicle triple, if any.
    pub fn find_active(
        &self,
        worker_id: &str,
        zone_id: &str,
        vehicle_id: &str,
    ) -> Result<Option<WasteLog>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_COLUMNS}
             WHERE worker_id = ?1 AND zone_id = ?2 AND vehicle_id = ?3
               AND collection_end_time IS NULL
             LIMIT 1"
        ))?;
        let mut rows = stmt.query(params![worker_id, zone_id, vehicle_id])?;
        match rows.next()? {
            Some(row) => Ok(Some(row_to_waste_log(row)?)),
            None => Ok(None),
        }
    }

    pub fn insert(&self, log: &NewWasteLog) -> Result<InsertOutcome> {
        let created = format_timestamp(&log.created_date);
        let inserted = self.conn.execute(
            "INSERT INTO waste_logs (
                zone_id, vehicle_id, worker_id, collection_start_time,
                collection_end_time, weight_collected,
                created_date, created_by, updated_date, updated_by
             ) VALUES (?1, ?2, ?3, ?4, NULL, NULL, ?5, ?6, ?5, ?6)",
            params![
                log.zone_id,
                log.vehicle_id,
                log.worker_id,
                format_timestamp(&log.collection_start_time),
                created,
                log.created_by,
            ],
        );

        match inserted {
            Ok(_) => {}
            // Only the active-triple index raises a unique violation here;
            // CHECK and NOT NULL failures stay store errors.
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                return Ok(InsertOutcome::ActiveLogConflict);
            }
            Err(err) => return Err(err).context("failed to insert waste log"),
        }

        let log_id = self.conn.last_insert_rowid();
        let stored = self
            .find_by_id(log_id)?
            .ok_or_else(|| anyhow!("waste log {log_id} not found after insert"))?;
        Ok(InsertOutcome::Created(stored))
    }

    /// Close an active log. Returns `false` when no active row matched.
    pub fn complete(&self, log_id: i64, completion: &Completion) -> Result<bool> {
        let rows_affected = self
            .conn
            .execute(
                "UPDATE waste_logs
                 SET collection_end_time = ?1,
                     weight_collected = ?2,
                     updated_date = ?3,
                     updated_by = ?4
                 WHERE log_id = ?5 AND collection_end_time IS NULL",
                params![
                    format_timestamp(&completion.collection_end_time),
                    completion.weight_collected,
                    format_timestamp(&completion.updated_date),
                    completion.updated_by,
                    log_id,
                ],
            )
            .context("failed to complete waste log")?;
        Ok(rows_affected == 1)
    }

    /// Logs for a zone whose collection started within the given days.
    pub fn find_by_zone_between(
        &self,
        zone_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WasteLog>> {
        self.find_between("zone_id", zone_id, start, end)
    }

    /// Logs for a vehicle whose collection started within the given days.
    pub fn find_by_vehicle_between(
        &self,
        vehicle_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WasteLog>> {
        self.find_between("vehicle_id", vehicle_id, start, end)
    }

    pub fn count_active(&self) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM waste_logs WHERE collection_end_time IS NULL",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn find_between(
        &self,
        column: &'static str,
        value: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WasteLog>> {
        let (lower, upper) = day_range_bounds(start, end);
        let mut stmt = self.conn.prepare(&format!(
            "{SELECT_COLUMNS}
             WHERE {column} = ?1
               AND collection_start_time >= ?2
               AND collection_start_time < ?3
             ORDER BY collection_start_time ASC, log_id ASC"
        ))?;

        let mut rows = stmt.query(params![value, lower, upper])?;
        let mut logs = Vec::new();
        while let Some(row) = rows.next()? {
            logs.push(row_to_waste_log(row)?);
        }
        Ok(logs)
    }
}

impl Database {
    pub async fn get_waste_log(&self, log_id: i64) -> Result<Option<WasteLog>> {
        self.execute(move |conn| WasteLogRepository::new(conn).find_by_id(log_id))
            .await
    }

    pub async fn count_active_logs(&self) -> Result<i64> {
        self.execute(|conn| WasteLogRepository::new(conn).count_active())
            .await
    }

    pub async fn zone_logs_between(
        &self,
        zone_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WasteLog>> {
        let zone_id = zone_id.to_string();
        self.execute(move |conn| {
            WasteLogRepository::new(conn).find_by_zone_between(&zone_id, start, end)
        })
        .await
    }

    pub async fn vehicle_logs_between(
        &self,
        vehicle_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WasteLog>> {
        let vehicle_id = vehicle_id.to_string();
        self.execute(move |conn| {
            WasteLogRepository::new(conn).find_by_vehicle_between(&vehicle_id, start, end)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn open() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let mut conn = Connection::open(dir.path().join("repo.sqlite3")).unwrap();
        crate::db::migrations::run_migrations(&mut conn).unwrap();
        (dir, conn)
    }

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    fn new_log(zone: &str, vehicle: &str, worker: &str, start: DateTime<Utc>) -> NewWasteLog {
        NewWasteLog {
            zone_id: zone.into(),
            vehicle_id: vehicle.into(),
            worker_id: worker.into(),
            collection_start_time: start,
            created_date: start,
            created_by: "SYSTEM".into(),
        }
    }

    fn created(outcome: InsertOutcome) -> WasteLog {
        match outcome {
            InsertOutcome::Created(log) => log,
            InsertOutcome::ActiveLogConflict => panic!("unexpected conflict"),
        }
    }

    fn completion(end: DateTime<Utc>, weight: f64) -> Completion {
        Completion {
            collection_end_time: end,
            weight_collected: weight,
            updated_date: end,
            updated_by: "SYSTEM".into(),
        }
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let (_dir, conn) = open();
        let repo = WasteLogRepository::new(&conn);

        let first = created(repo.insert(&new_log("Z001", "RT001", "W001", at(1, 8))).unwrap());
        let second = created(repo.insert(&new_log("Z001", "RT002", "W002", at(1, 9))).unwrap());

        assert!(second.log_id > first.log_id);
        assert!(first.is_active());
        assert_eq!(first.created_date, first.updated_date);
        assert_eq!(first.weight_collected, None);
    }

    #[test]
    fn unique_index_rejects_second_active_triple() {
        let (_dir, conn) = open();
        let repo = WasteLogRepository::new(&conn);
        created(repo.insert(&new_log("Z001", "RT001", "W001", at(1, 8))).unwrap());

        let outcome = repo.insert(&new_log("Z001", "RT001", "W001", at(1, 9))).unwrap();

        assert!(matches!(outcome, InsertOutcome::ActiveLogConflict));
        assert_eq!(repo.count_active().unwrap(), 1);
    }

    #[test]
    fn completed_triple_can_start_again() {
        let (_dir, conn) = open();
        let repo = WasteLogRepository::new(&conn);
        let log = created(repo.insert(&new_log("Z001", "RT001", "W001", at(1, 8))).unwrap());
        assert!(repo.complete(log.log_id, &completion(at(1, 10), 12.0)).unwrap());

        let again = repo.insert(&new_log("Z001", "RT001", "W001", at(1, 11))).unwrap();

        assert!(matches!(again, InsertOutcome::Created(_)));
    }

    #[test]
    fn complete_only_touches_active_rows() {
        let (_dir, conn) = open();
        let repo = WasteLogRepository::new(&conn);
        let log = created(repo.insert(&new_log("Z001", "RT001", "W001", at(1, 8))).unwrap());

        assert!(repo.complete(log.log_id, &completion(at(1, 10), 12.5)).unwrap());
        assert!(!repo.complete(log.log_id, &completion(at(1, 11), 99.0)).unwrap());

        let stored = repo.find_by_id(log.log_id).unwrap().unwrap();
        assert_eq!(stored.collection_end_time, Some(at(1, 10)));
        assert_eq!(stored.weight_collected, Some(12.5));
        assert!(repo.find_active("W001", "Z001", "RT001").unwrap().is_none());
    }

    #[test]
    fn range_queries_include_whole_end_day() {
        let (_dir, conn) = open();
        let repo = WasteLogRepository::new(&conn);
        created(repo.insert(&new_log("Z001", "RT001", "W001", at(1, 0))).unwrap());
        created(repo.insert(&new_log("Z001", "RT002", "W002", at(2, 23))).unwrap());
        created(repo.insert(&new_log("Z001", "RT003", "W003", at(3, 0))).unwrap());
        created(repo.insert(&new_log("Z002", "RT001", "W004", at(2, 12))).unwrap());

        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let zone = repo.find_by_zone_between("Z001", start, end).unwrap();
        let vehicle = repo.find_by_vehicle_between("RT001", start, end).unwrap();

        let vehicles: Vec<&str> = zone.iter().map(|l| l.vehicle_id.as_str()).collect();
        assert_eq!(vehicles, vec!["RT001", "RT002"]);
        assert_eq!(vehicle.len(), 2);
    }

    #[test]
    fn other_constraint_failures_are_errors() {
        let (_dir, conn) = open();
        conn.execute_batch(
            "CREATE TRIGGER reject_z999 BEFORE INSERT ON waste_logs
             WHEN NEW.zone_id = 'Z999'
             BEGIN SELECT RAISE(ABORT, 'zone closed'); END;",
        )
        .unwrap();
        let repo = WasteLogRepository::new(&conn);

        let result = repo.insert(&new_log("Z999", "RT001", "W001", at(1, 8)));

        assert!(result.is_err());
        assert_eq!(repo.count_active().unwrap(), 0);
    }

    #[test]
    fn missing_id_is_none() {
        let (_dir, conn) = open();

        assert!(WasteLogRepository::new(&conn).find_by_id(404).unwrap().is_none());
    }
}
