//! OptoSaaS Core Library
//!
//! Multi-tenant performance analytics for optical-retail franchises.
//!
//! # Architecture
//!
//! ```text
//! Patient Records (SQLite)
//!         │
//!         ▼
//! ┌───────────────────────────────┐
//! │        RecordFilter           │
//! │  branch / staff / date range  │
//! └───────────────┬───────────────┘
//!                 │
//!         ┌───────▼───────┐
//!         │   aggregate   │
//!         │  (pure, no I/O)│
//!         └───────┬───────┘
//!                 │
//!     ┌───────────┼───────────┐
//!     │           │           │
//!     ▼           ▼           ▼
//! Dashboard   Leaderboard   Export
//! Metrics      Rankings    (JSON/CSV)
//! ```
//!
//! # Core Principle
//!
//! **Aggregation never fails.** Empty or sparse data produces zeroed metrics,
//! never errors and never NaN. All percentage and per-unit figures degrade to
//! zero when their denominator is zero.
//!
//! # Modules
//!
//! - [`db`]: SQLite persistence layer (franchises, branches, staff, records)
//! - [`models`]: Domain types (PatientRecord, Staff, AppointmentType, etc.)
//! - [`metrics`]: Filtering, aggregation and leaderboard ranking
//! - [`export`]: JSON and CSV report generation

pub mod db;
pub mod export;
pub mod metrics;
pub mod models;

// Re-export commonly used types
pub use db::{Database, DbError};
pub use export::{LeaderboardReport, MetricsReport};
pub use metrics::{
    aggregate, rank, DashboardMetrics, Leaderboard, LeaderboardMetric, RecordFilter,
    StaffDirectory, StaffRoleField,
};
pub use models::{
    AppointmentType, ArrivalStatus, Branch, Franchise, PatientRecord, Payments, Staff, StaffRole,
    StaffStatus,
};

// =========================================================================
// Top-Level Error Type
// =========================================================================

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] db::DbError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

// =========================================================================
// Main API Object
// =========================================================================

/// Facade tying the persistence layer to the metrics pipeline.
///
/// Each dashboard call loads the franchise's records and staff roster, then
/// hands them to the pure aggregation functions in [`metrics`].
pub struct DashboardCore {
    db: Database,
}

impl DashboardCore {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> CoreResult<Self> {
        Ok(Self {
            db: Database::open(path)?,
        })
    }

    /// Create an in-memory instance (for testing).
    pub fn open_in_memory() -> CoreResult<Self> {
        Ok(Self {
            db: Database::open_in_memory()?,
        })
    }

    /// Direct access to the underlying database.
    pub fn db(&self) -> &Database {
        &self.db
    }

    // =========================================================================
    // Tenant Operations
    // =========================================================================

    /// Register a new franchise.
    pub fn create_franchise(&self, name: String) -> CoreResult<Franchise> {
        let franchise = self.db.insert_franchise(&Franchise::new(name))?;
        Ok(franchise)
    }

    /// Add a branch to a franchise.
    pub fn create_branch(&self, franchise_id: i64, name: String) -> CoreResult<Branch> {
        if self.db.get_franchise(franchise_id)?.is_none() {
            return Err(CoreError::NotFound(format!("franchise {}", franchise_id)));
        }
        let branch = self.db.insert_branch(&Branch::new(franchise_id, name))?;
        Ok(branch)
    }

    /// Add a staff member to a franchise roster.
    pub fn create_staff(&self, staff: Staff) -> CoreResult<Staff> {
        Ok(self.db.insert_staff(&staff)?)
    }

    // =========================================================================
    // Record Operations
    // =========================================================================

    /// Persist a new patient record.
    ///
    /// Rejects records whose outcome label does not belong to the appointment
    /// type's catalog.
    pub fn save_record(&self, record: &PatientRecord) -> CoreResult<()> {
        if !record.outcome_is_valid() {
            return Err(CoreError::InvalidInput(format!(
                "outcome {:?} is not valid for {}",
                record.outcome,
                record.appointment_type.label()
            )));
        }
        self.db.insert_record(record)?;
        Ok(())
    }

    /// Update an existing patient record, with the same outcome validation
    /// as [`save_record`](Self::save_record).
    pub fn update_record(&self, record: &PatientRecord) -> CoreResult<()> {
        if !record.outcome_is_valid() {
            return Err(CoreError::InvalidInput(format!(
                "outcome {:?} is not valid for {}",
                record.outcome,
                record.appointment_type.label()
            )));
        }
        if !self.db.update_record(record)? {
            return Err(CoreError::NotFound(format!("record {}", record.record_id)));
        }
        Ok(())
    }

    /// Fetch a single record by id.
    pub fn get_record(&self, record_id: &str) -> CoreResult<Option<PatientRecord>> {
        Ok(self.db.get_record(record_id)?)
    }

    // =========================================================================
    // Dashboard Operations
    // =========================================================================

    /// Compute dashboard metrics for a franchise over the filter's period.
    pub fn metrics_for(
        &self,
        franchise_id: i64,
        filter: &RecordFilter,
    ) -> CoreResult<DashboardMetrics> {
        let (records, staff) = self.load_period(franchise_id, filter)?;
        Ok(aggregate(&records, &staff, filter))
    }

    /// Rank a franchise's staff on one metric for one role field.
    pub fn leaderboard_for(
        &self,
        franchise_id: i64,
        filter: &RecordFilter,
        field: StaffRoleField,
        metric: LeaderboardMetric,
    ) -> CoreResult<Leaderboard> {
        let (records, staff) = self.load_period(franchise_id, filter)?;
        Ok(rank(&records, &staff, filter, field, metric))
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// Export dashboard metrics as pretty-printed JSON.
    pub fn export_metrics_json(
        &self,
        franchise_id: i64,
        filter: &RecordFilter,
    ) -> CoreResult<String> {
        let metrics = self.metrics_for(franchise_id, filter)?;
        Ok(MetricsReport::new(filter, metrics).to_json()?)
    }

    /// Export dashboard metrics as CSV.
    pub fn export_metrics_csv(
        &self,
        franchise_id: i64,
        filter: &RecordFilter,
    ) -> CoreResult<String> {
        let metrics = self.metrics_for(franchise_id, filter)?;
        Ok(MetricsReport::new(filter, metrics).to_csv())
    }

    /// Export a staff leaderboard as CSV.
    pub fn export_leaderboard_csv(
        &self,
        franchise_id: i64,
        filter: &RecordFilter,
        field: StaffRoleField,
        metric: LeaderboardMetric,
    ) -> CoreResult<String> {
        let leaderboard = self.leaderboard_for(franchise_id, filter, field, metric)?;
        Ok(LeaderboardReport::new(filter, leaderboard).to_csv())
    }

    fn load_period(
        &self,
        franchise_id: i64,
        filter: &RecordFilter,
    ) -> CoreResult<(Vec<PatientRecord>, Vec<Staff>)> {
        let records =
            self.db
                .list_records_in_range(franchise_id, filter.date_from, filter.date_to)?;
        let staff = self.db.list_staff(franchise_id)?;
        Ok((records, staff))
    }
}
