//! In-memory fakes for the core's ports, used by the validator tests. They
//! honor the same atomicity contract as the MySQL adapters: one record per
//! (employee, day), close only while still open.

use crate::core::ports::{AttendanceStore, InsertOutcome, OfficeRegistry};
use crate::model::attendance::AttendanceRecord;
use crate::model::office::OfficeGeofence;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

pub struct InMemoryOfficeRegistry {
    offices: Vec<OfficeGeofence>,
}

impl InMemoryOfficeRegistry {
    pub fn new(offices: Vec<OfficeGeofence>) -> Self {
        Self { offices }
    }
}

#[async_trait]
impl OfficeRegistry for InMemoryOfficeRegistry {
    async fn active_geofences(&self) -> anyhow::Result<Vec<OfficeGeofence>> {
        Ok(self.offices.iter().filter(|o| o.active).cloned().collect())
    }
}

#[derive(Default)]
pub struct InMemoryAttendanceStore {
    records: Mutex<HashMap<(u64, NaiveDate), AttendanceRecord>>,
    next_id: AtomicU64,
}

impl InMemoryAttendanceStore {
    pub fn snapshot(&self) -> Vec<AttendanceRecord> {
        self.records.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl AttendanceStore for InMemoryAttendanceStore {
    async fn find(
        &self,
        employee_id: u64,
        day: NaiveDate,
    ) -> anyhow::Result<Option<AttendanceRecord>> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&(employee_id, day))
            .cloned())
    }

    async fn insert_new(&self, mut record: AttendanceRecord) -> anyhow::Result<InsertOutcome> {
        let mut records = self.records.lock().unwrap();
        let key = (record.employee_id, record.date);
        if records.contains_key(&key) {
            return Ok(InsertOutcome::DuplicateDay);
        }
        record.id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        records.insert(key, record.clone());
        Ok(InsertOutcome::Inserted(record))
    }

    async fn close_open(&self, record: &AttendanceRecord) -> anyhow::Result<bool> {
        let mut records = self.records.lock().unwrap();
        let key = (record.employee_id, record.date);
        match records.get_mut(&key) {
            Some(existing) if existing.is_open() => {
                *existing = record.clone();
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
