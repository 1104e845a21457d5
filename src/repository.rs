//! Persistence boundary.
//!
//! Generation never touches storage. Callers load employees, shifts and
//! rules before a run and hand the finished schedule back in one piece;
//! [`RosterRepository::replace_schedule`] swaps the whole stored snapshot,
//! never part of it.
//!
//! - [`InMemoryRepository`]: process-local, for tests and embedding.
//! - [`JsonFileRepository`]: one JSON document per record kind in a data
//!   directory, replaced through a temporary file and a rename.
//!
//! Every repository carries a [`RunLock`]. Whoever replaces the schedule
//! holds it for the duration, so two services over the same repository
//! cannot generate at the same time.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::RepositoryError;
use crate::models::{Employee, RuleConfig, Schedule, Shift};

/// Everything a roster deployment stores.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterData {
    pub employees: Vec<Employee>,
    pub shifts: Vec<Shift>,
    pub rules: RuleConfig,
    pub schedule: Schedule,
}

/// Exclusive claim on a roster for one generation or commit.
///
/// Clones share the claim.
#[derive(Debug, Clone, Default)]
pub struct RunLock(Arc<AtomicBool>);

/// Releases its [`RunLock`] when dropped.
#[derive(Debug)]
pub struct RunLease<'a>(&'a AtomicBool);

impl RunLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the roster, or returns `None` if it is already held.
    pub fn try_acquire(&self) -> Option<RunLease<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunLease(&self.0))
    }

    pub fn is_held(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Drop for RunLease<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Storage abstraction so the service can be exercised in isolation.
pub trait RosterRepository: Send + Sync {
    /// The claim shared by everything that replaces this roster's schedule.
    fn run_lock(&self) -> &RunLock;

    fn employees(&self) -> Result<Vec<Employee>, RepositoryError>;
    fn shifts(&self) -> Result<Vec<Shift>, RepositoryError>;
    fn rules(&self) -> Result<RuleConfig, RepositoryError>;
    fn schedule(&self) -> Result<Schedule, RepositoryError>;

    fn save_employees(&self, employees: &[Employee]) -> Result<(), RepositoryError>;
    fn save_shifts(&self, shifts: &[Shift]) -> Result<(), RepositoryError>;
    fn save_rules(&self, rules: &RuleConfig) -> Result<(), RepositoryError>;

    /// Replaces the stored schedule as a whole.
    fn replace_schedule(&self, schedule: &Schedule) -> Result<(), RepositoryError>;

    /// Stores employees, shifts and rules together.
    ///
    /// The default saves them one after another, so a failure part way
    /// leaves the earlier records replaced. Implementations narrow or
    /// close that window where their storage allows.
    fn save_configuration(
        &self,
        employees: &[Employee],
        shifts: &[Shift],
        rules: &RuleConfig,
    ) -> Result<(), RepositoryError> {
        self.save_employees(employees)?;
        self.save_shifts(shifts)?;
        self.save_rules(rules)
    }

    /// Loads every stored record.
    fn load(&self) -> Result<RosterData, RepositoryError> {
        Ok(RosterData {
            employees: self.employees()?,
            shifts: self.shifts()?,
            rules: self.rules()?,
            schedule: self.schedule()?,
        })
    }
}

// ======================== In memory ========================

/// Process-local repository.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    data: Mutex<RosterData>,
    run_lock: RunLock,
}

impl InMemoryRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository holding `data`.
    pub fn with_data(data: RosterData) -> Self {
        Self {
            data: Mutex::new(data),
            run_lock: RunLock::new(),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, RosterData>, RepositoryError> {
        self.data
            .lock()
            .map_err(|_| RepositoryError::Unavailable("repository lock poisoned".into()))
    }
}

impl RosterRepository for InMemoryRepository {
    fn run_lock(&self) -> &RunLock {
        &self.run_lock
    }

    fn employees(&self) -> Result<Vec<Employee>, RepositoryError> {
        Ok(self.lock()?.employees.clone())
    }

    fn shifts(&self) -> Result<Vec<Shift>, RepositoryError> {
        Ok(self.lock()?.shifts.clone())
    }

    fn rules(&self) -> Result<RuleConfig, RepositoryError> {
        Ok(self.lock()?.rules.clone())
    }

    fn schedule(&self) -> Result<Schedule, RepositoryError> {
        Ok(self.lock()?.schedule.clone())
    }

    fn save_employees(&self, employees: &[Employee]) -> Result<(), RepositoryError> {
        self.lock()?.employees = employees.to_vec();
        Ok(())
    }

    fn save_shifts(&self, shifts: &[Shift]) -> Result<(), RepositoryError> {
        self.lock()?.shifts = shifts.to_vec();
        Ok(())
    }

    fn save_rules(&self, rules: &RuleConfig) -> Result<(), RepositoryError> {
        self.lock()?.rules = rules.clone();
        Ok(())
    }

    fn replace_schedule(&self, schedule: &Schedule) -> Result<(), RepositoryError> {
        self.lock()?.schedule = schedule.clone();
        Ok(())
    }

    fn save_configuration(
        &self,
        employees: &[Employee],
        shifts: &[Shift],
        rules: &RuleConfig,
    ) -> Result<(), RepositoryError> {
        let mut data = self.lock()?;
        data.employees = employees.to_vec();
        data.shifts = shifts.to_vec();
        data.rules = rules.clone();
        Ok(())
    }

    fn load(&self) -> Result<RosterData, RepositoryError> {
        Ok(self.lock()?.clone())
    }
}

// ======================== JSON files ========================

const EMPLOYEES_FILE: &str = "employees.json";
const SHIFTS_FILE: &str = "shifts.json";
const RULES_FILE: &str = "rules.json";
const SCHEDULE_FILE: &str = "schedule.json";

/// JSON documents in a data directory.
///
/// Missing files read as empty (or default) records. Each write goes to a
/// uniquely named temporary file in the same directory which is then
/// renamed over the target, so readers see either the old or the new
/// document and concurrent writers never share a temporary file.
///
/// Clones share the directory and the [`RunLock`]. Instances opened
/// separately on one directory do not share the lock.
#[derive(Debug, Clone)]
pub struct JsonFileRepository {
    dir: PathBuf,
    run_lock: RunLock,
}

impl JsonFileRepository {
    /// Opens (and creates if needed) a data directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            run_lock: RunLock::new(),
        })
    }

    /// The data directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read<T: DeserializeOwned + Default>(&self, name: &str) -> Result<T, RepositoryError> {
        let path = self.dir.join(name);
        if !path.exists() {
            return Ok(T::default());
        }
        let reader = BufReader::new(File::open(&path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Serializes `value` into a fresh temporary file next to the targets.
    ///
    /// The file is removed if it is dropped without being persisted.
    fn stage<T: Serialize + ?Sized>(&self, value: &T) -> Result<NamedTempFile, RepositoryError> {
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            serde_json::to_writer_pretty(&mut writer, value)?;
            writer.flush()?;
        }
        tmp.as_file().sync_all()?;
        Ok(tmp)
    }

    fn persist(&self, staged: NamedTempFile, name: &str) -> Result<(), RepositoryError> {
        let path = self.dir.join(name);
        staged.persist(&path).map_err(|e| e.error)?;
        debug!(path = %path.display(), "stored");
        Ok(())
    }

    fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), RepositoryError> {
        let staged = self.stage(value)?;
        self.persist(staged, name)
    }
}

impl RosterRepository for JsonFileRepository {
    fn run_lock(&self) -> &RunLock {
        &self.run_lock
    }

    fn employees(&self) -> Result<Vec<Employee>, RepositoryError> {
        self.read(EMPLOYEES_FILE)
    }

    fn shifts(&self) -> Result<Vec<Shift>, RepositoryError> {
        self.read(SHIFTS_FILE)
    }

    fn rules(&self) -> Result<RuleConfig, RepositoryError> {
        self.read(RULES_FILE)
    }

    fn schedule(&self) -> Result<Schedule, RepositoryError> {
        self.read(SCHEDULE_FILE)
    }

    fn save_employees(&self, employees: &[Employee]) -> Result<(), RepositoryError> {
        self.write(EMPLOYEES_FILE, employees)
    }

    fn save_shifts(&self, shifts: &[Shift]) -> Result<(), RepositoryError> {
        self.write(SHIFTS_FILE, shifts)
    }

    fn save_rules(&self, rules: &RuleConfig) -> Result<(), RepositoryError> {
        self.write(RULES_FILE, rules)
    }

    fn replace_schedule(&self, schedule: &Schedule) -> Result<(), RepositoryError> {
        self.write(SCHEDULE_FILE, schedule)
    }

    /// All three documents are serialized before any is replaced, so an
    /// encoding or write failure stores nothing. The renames that follow
    /// are not atomic as a group.
    fn save_configuration(
        &self,
        employees: &[Employee],
        shifts: &[Shift],
        rules: &RuleConfig,
    ) -> Result<(), RepositoryError> {
        let employees = self.stage(employees)?;
        let shifts = self.stage(shifts)?;
        let rules = self.stage(rules)?;
        self.persist(employees, EMPLOYEES_FILE)?;
        self.persist(shifts, SHIFTS_FILE)?;
        self.persist(rules, RULES_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime, Weekday};

    fn sample_schedule() -> Schedule {
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let mut s = Schedule::with_days([d], ["A"]);
        s.day_mut(d).unwrap().assign("E1", "A");
        s
    }

    fn sample_shift() -> Shift {
        Shift::new(
            "A",
            NaiveTime::from_hms_opt(7, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(15, 0, 0).unwrap(),
        )
    }

    #[test]
    fn test_in_memory_round_trip() {
        let repo = InMemoryRepository::new();
        repo.save_employees(&[Employee::new("E1")]).unwrap();
        repo.replace_schedule(&sample_schedule()).unwrap();

        let data = repo.load().unwrap();
        assert_eq!(data.employees.len(), 1);
        assert_eq!(data.schedule, sample_schedule());
        assert!(data.shifts.is_empty());
    }

    #[test]
    fn test_json_missing_files_default() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::open(dir.path().join("data")).unwrap();

        assert!(repo.employees().unwrap().is_empty());
        assert!(repo.schedule().unwrap().is_empty());
        assert_eq!(repo.rules().unwrap(), RuleConfig::default());
    }

    #[test]
    fn test_json_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::open(dir.path()).unwrap();
        repo.save_employees(&[Employee::new("E1").with_rest_day(Weekday::Mon)])
            .unwrap();
        repo.save_shifts(&[sample_shift()]).unwrap();
        repo.save_rules(&RuleConfig::default().with_max_consecutive_days(6))
            .unwrap();
        repo.replace_schedule(&sample_schedule()).unwrap();

        let reopened = JsonFileRepository::open(dir.path()).unwrap();
        let data = reopened.load().unwrap();
        assert_eq!(data.employees[0].rest_day, Some(Weekday::Mon));
        assert_eq!(data.shifts[0].id, "A");
        assert_eq!(data.rules.max_consecutive_days, 6);
        assert_eq!(data.schedule, sample_schedule());
    }

    #[test]
    fn test_json_replace_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::open(dir.path()).unwrap();
        repo.replace_schedule(&sample_schedule()).unwrap();
        repo.replace_schedule(&Schedule::new()).unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![SCHEDULE_FILE.to_string()]);
        assert!(repo.schedule().unwrap().is_empty());
    }

    #[test]
    fn test_run_lock_released_on_drop() {
        let lock = RunLock::new();
        let shared = lock.clone();
        {
            let _lease = lock.try_acquire().unwrap();
            assert!(shared.is_held());
            assert!(shared.try_acquire().is_none());
        }
        assert!(!shared.is_held());
        assert!(shared.try_acquire().is_some());
    }

    #[test]
    fn test_json_clones_share_run_lock() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::open(dir.path()).unwrap();
        let clone = repo.clone();
        let _lease = repo.run_lock().try_acquire().unwrap();
        assert!(clone.run_lock().is_held());
    }

    #[test]
    fn test_json_concurrent_writers() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::open(dir.path()).unwrap();
        let lists: Vec<Vec<Employee>> = (0..4)
            .map(|w| (0..50).map(|i| Employee::new(format!("W{w}-E{i}"))).collect())
            .collect();

        let handles: Vec<_> = lists
            .iter()
            .cloned()
            .map(|list| {
                let repo = repo.clone();
                std::thread::spawn(move || {
                    for _ in 0..20 {
                        repo.save_employees(&list).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let stored = repo.employees().unwrap();
        assert!(lists.contains(&stored));
        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![EMPLOYEES_FILE.to_string()]);
    }

    #[test]
    fn test_save_configuration() {
        let employees = [Employee::new("E1")];
        let shifts = [sample_shift()];
        let rules = RuleConfig::default().with_max_consecutive_days(3);

        let memory = InMemoryRepository::new();
        memory.save_configuration(&employees, &shifts, &rules).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let json = JsonFileRepository::open(dir.path()).unwrap();
        json.save_configuration(&employees, &shifts, &rules).unwrap();

        for data in [memory.load().unwrap(), json.load().unwrap()] {
            assert_eq!(data.employees, employees.to_vec());
            assert_eq!(data.shifts, shifts.to_vec());
            assert_eq!(data.rules, rules);
        }
    }

    #[test]
    fn test_json_schedule_shape() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonFileRepository::open(dir.path()).unwrap();
        repo.replace_schedule(&sample_schedule()).unwrap();

        let raw = fs::read_to_string(dir.path().join(SCHEDULE_FILE)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["2024-01-02"]["assignments"]["E1"], "A");
        assert_eq!(value["2024-01-02"]["shift_counts"]["A"], 1);
    }

    #[test]
    fn test_json_invalid_document() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(RULES_FILE), "{not json").unwrap();
        let repo = JsonFileRepository::open(dir.path()).unwrap();
        assert!(matches!(repo.rules(), Err(RepositoryError::Json(_))));
    }
}
