//! Workbook store: the `Employees`, `Shift_Rules` and `Attendance_Log`
//! sheets kept as CSV files in one directory.
//!
//! HR edits the directory and the shift rules outside the portal, so every
//! call re-reads the workbook from disk under the lock. Writes are applied to
//! that fresh copy and flushed before the lock is released, so a check and the
//! write that depends on it can never interleave with another request. The
//! file work runs on the blocking pool.

use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use actix_web::web;
use async_trait::async_trait;
use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::{
    AttendanceStore, InsertOutcome, StoreError, StoreResult, UpdateOutcome,
    row::{
        self, ATTENDANCE_HEADER, COL_PUNCH_OUT, Columns, EMPLOYEE_COLUMNS, SHIFT_COLUMNS,
    },
};
use crate::model::{
    attendance::{AttendanceRecord, PunchOut},
    employee::Employee,
    shift_rule::ShiftRule,
};

pub const EMPLOYEES: &str = "Employees";
pub const SHIFT_RULES: &str = "Shift_Rules";
pub const ATTENDANCE_LOG: &str = "Attendance_Log";

/// One sheet: a header row and the data rows under it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Sheet {
    pub fn read<R: io::Read>(reader: R) -> Result<Self, csv::Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut records = rdr.records();
        let header = match records.next() {
            Some(first) => first?.iter().map(str::to_string).collect(),
            None => Vec::new(),
        };
        let rows = records
            .map(|r| r.map(|rec| rec.iter().map(str::to_string).collect()))
            .collect::<Result<Vec<Vec<String>>, _>>()?;

        Ok(Self { header, rows })
    }

    pub fn write<W: io::Write>(&self, writer: W) -> Result<(), csv::Error> {
        let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);
        wtr.write_record(&self.header)?;
        for row in &self.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Appends a row and returns its sheet row number.
    pub fn append_row(&mut self, row: Vec<String>) -> usize {
        self.rows.push(row);
        row::sheet_row(self.rows.len() - 1)
    }

    /// Writes one cell addressed the way the hosted sheet does (1-based row
    /// including the header, 1-based column). Returns false for the header
    /// row or a row past the end.
    pub fn update_cell(&mut self, row: usize, column: usize, value: String) -> bool {
        let Some(index) = row.checked_sub(2) else {
            return false;
        };
        let Some(cells) = self.rows.get_mut(index) else {
            return false;
        };
        if column == 0 {
            return false;
        }
        if cells.len() < column {
            cells.resize(column, String::new());
        }
        cells[column - 1] = value;
        true
    }
}

struct Workbook {
    employees: Sheet,
    employee_columns: Columns,
    shifts: Sheet,
    shift_columns: Columns,
    attendance: Sheet,
}

fn sheet_path(dir: &Path, sheet: &str) -> PathBuf {
    dir.join(format!("{sheet}.csv"))
}

impl Workbook {
    fn new(employees: Sheet, shifts: Sheet, mut attendance: Sheet) -> StoreResult<Self> {
        let employee_columns = Columns::resolve(&employees.header, &EMPLOYEE_COLUMNS)
            .map_err(|column| StoreError::MissingColumn {
                sheet: EMPLOYEES.to_string(),
                column,
            })?;
        let shift_columns = Columns::resolve(&shifts.header, &SHIFT_COLUMNS).map_err(|column| {
            StoreError::MissingColumn {
                sheet: SHIFT_RULES.to_string(),
                column,
            }
        })?;

        if attendance.header.is_empty() {
            attendance.header = ATTENDANCE_HEADER.iter().map(|h| h.to_string()).collect();
        }

        Ok(Self {
            employees,
            employee_columns,
            shifts,
            shift_columns,
            attendance,
        })
    }

    /// Reads all three sheets. A missing attendance log reads as empty.
    fn load(dir: &Path) -> StoreResult<Self> {
        let employees = Sheet::read(File::open(sheet_path(dir, EMPLOYEES))?)?;
        let shifts = Sheet::read(File::open(sheet_path(dir, SHIFT_RULES))?)?;
        let attendance = match File::open(sheet_path(dir, ATTENDANCE_LOG)) {
            Ok(file) => Sheet::read(file)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Sheet::default(),
            Err(e) => return Err(e.into()),
        };
        Self::new(employees, shifts, attendance)
    }

    fn find_employee(&self, email: &str) -> Option<Employee> {
        self.employees
            .rows
            .iter()
            .map(|cells| row::employee_from_row(&self.employee_columns, cells))
            .find(|e| e.email == email)
    }

    /// Only the matching row is parsed; bad rows for other shifts don't matter.
    fn find_shift(&self, shift_name: &str) -> StoreResult<Option<ShiftRule>> {
        let found = self
            .shifts
            .rows
            .iter()
            .enumerate()
            .find(|(_, cells)| self.shift_columns.get(cells, 0) == shift_name);
        let Some((i, cells)) = found else {
            return Ok(None);
        };

        row::shift_from_row(&self.shift_columns, cells)
            .map(Some)
            .map_err(|reason| StoreError::MalformedRow {
                sheet: SHIFT_RULES.to_string(),
                row: row::sheet_row(i),
                reason,
            })
    }

    fn list_shifts(&self) -> Vec<ShiftRule> {
        self.shifts
            .rows
            .iter()
            .enumerate()
            .filter_map(|(i, cells)| match row::shift_from_row(&self.shift_columns, cells) {
                Ok(rule) => Some(rule),
                Err(reason) => {
                    warn!(row = row::sheet_row(i), %reason, "Skipping unreadable shift rule");
                    None
                }
            })
            .collect()
    }

    /// Index of the first log row for `email` dated `date`.
    fn daily_position(&self, email: &str, date: NaiveDate) -> Option<usize> {
        self.attendance.rows.iter().enumerate().find_map(|(i, cells)| {
            if row::row_email(cells) != email {
                return None;
            }
            match row::row_date(cells) {
                Some(d) if d == date => Some(i),
                Some(_) => None,
                None => {
                    debug!(
                        row = row::sheet_row(i),
                        date = row::cell(cells, row::COL_DATE),
                        "Skipping attendance row with unreadable date"
                    );
                    None
                }
            }
        })
    }

    fn find_daily_record(
        &self,
        email: &str,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let Some(i) = self.daily_position(email, date) else {
            return Ok(None);
        };
        row::attendance_from_row(&self.attendance.rows[i], date)
            .map(Some)
            .map_err(|reason| StoreError::MalformedRow {
                sheet: ATTENDANCE_LOG.to_string(),
                row: row::sheet_row(i),
                reason,
            })
    }
}

/// The workbook and where it lives, shared with the blocking pool.
struct Shared {
    dir: Option<PathBuf>,
    book: Mutex<Workbook>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Workbook> {
        self.book.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks the workbook, re-reading it from disk when it has a directory.
    fn fresh(&self) -> StoreResult<MutexGuard<'_, Workbook>> {
        let mut book = self.lock();
        if let Some(dir) = &self.dir {
            *book = Workbook::load(dir)?;
        }
        Ok(book)
    }

    fn persist(&self, attendance: &Sheet) -> StoreResult<()> {
        let Some(dir) = &self.dir else {
            return Ok(());
        };
        let path = sheet_path(dir, ATTENDANCE_LOG);
        let tmp = path.with_extension("csv.tmp");
        attendance.write(File::create(&tmp)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn insert_punch_in(&self, record: &AttendanceRecord) -> StoreResult<InsertOutcome> {
        let mut book = self.fresh()?;
        if book.daily_position(&record.email, record.date).is_some() {
            return Ok(InsertOutcome::AlreadyExists);
        }

        let sheet_row = book.attendance.append_row(row::attendance_to_row(record));
        if let Err(e) = self.persist(&book.attendance) {
            book.attendance.rows.pop();
            return Err(e);
        }

        debug!(sheet_row, email = %record.email, "Attendance row appended");
        Ok(InsertOutcome::Inserted)
    }

    fn complete_punch_out(
        &self,
        email: &str,
        date: NaiveDate,
        punch_out: &PunchOut,
    ) -> StoreResult<UpdateOutcome> {
        let mut book = self.fresh()?;
        let Some(i) = book.daily_position(email, date) else {
            return Ok(UpdateOutcome::Missing);
        };
        if !row::cell(&book.attendance.rows[i], COL_PUNCH_OUT).is_empty() {
            return Ok(UpdateOutcome::AlreadyClosed);
        }

        let previous = book.attendance.rows[i].clone();
        let sheet_row = row::sheet_row(i);
        for (column, value) in row::punch_out_cells(punch_out) {
            book.attendance.update_cell(sheet_row, column, value);
        }
        if let Err(e) = self.persist(&book.attendance) {
            book.attendance.rows[i] = previous;
            return Err(e);
        }

        debug!(sheet_row, email, "Attendance row closed");
        Ok(UpdateOutcome::Updated)
    }
}

pub struct SheetStore {
    shared: Arc<Shared>,
}

impl SheetStore {
    /// Checks that the workbook in `dir` is readable. A missing attendance
    /// log starts empty and is created on the first punch.
    pub fn open(dir: impl Into<PathBuf>) -> StoreResult<Self> {
        let dir = dir.into();
        let book = Workbook::load(&dir)?;

        if !sheet_path(&dir, ATTENDANCE_LOG).exists() {
            warn!(dir = %dir.display(), "No attendance log yet, starting empty");
        }
        info!(
            dir = %dir.display(),
            employees = book.employees.rows.len(),
            shifts = book.shifts.rows.len(),
            attendance = book.attendance.rows.len(),
            "Workbook loaded"
        );

        Ok(Self::with(Some(dir), book))
    }

    /// Workbook held only in memory.
    pub fn from_csv(employees: &str, shifts: &str, attendance: &str) -> StoreResult<Self> {
        let book = Workbook::new(
            Sheet::read(employees.as_bytes())?,
            Sheet::read(shifts.as_bytes())?,
            Sheet::read(attendance.as_bytes())?,
        )?;
        Ok(Self::with(None, book))
    }

    fn with(dir: Option<PathBuf>, book: Workbook) -> Self {
        Self {
            shared: Arc::new(Shared {
                dir,
                book: Mutex::new(book),
            }),
        }
    }

    /// Attendance log as of the last call.
    pub fn attendance_log(&self) -> Sheet {
        self.shared.lock().attendance.clone()
    }

    /// Runs `op` against the workbook on the blocking pool.
    async fn run<T, F>(&self, op: F) -> StoreResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Shared) -> StoreResult<T> + Send + 'static,
    {
        let shared = Arc::clone(&self.shared);
        web::block(move || op(&shared)).await?
    }
}

#[async_trait]
impl AttendanceStore for SheetStore {
    async fn find_employee(&self, email: &str) -> StoreResult<Option<Employee>> {
        let email = email.to_string();
        self.run(move |s| Ok(s.fresh()?.find_employee(&email))).await
    }

    async fn find_shift(&self, shift_name: &str) -> StoreResult<Option<ShiftRule>> {
        let shift_name = shift_name.to_string();
        self.run(move |s| s.fresh()?.find_shift(&shift_name)).await
    }

    async fn list_shifts(&self) -> StoreResult<Vec<ShiftRule>> {
        self.run(|s| Ok(s.fresh()?.list_shifts())).await
    }

    async fn find_daily_record(
        &self,
        email: &str,
        date: NaiveDate,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let email = email.to_string();
        self.run(move |s| s.fresh()?.find_daily_record(&email, date)).await
    }

    async fn insert_punch_in(&self, record: &AttendanceRecord) -> StoreResult<InsertOutcome> {
        let record = record.clone();
        self.run(move |s| s.insert_punch_in(&record)).await
    }

    async fn complete_punch_out(
        &self,
        email: &str,
        date: NaiveDate,
        punch_out: &PunchOut,
    ) -> StoreResult<UpdateOutcome> {
        let email = email.to_string();
        let punch_out = punch_out.clone();
        self.run(move |s| s.complete_punch_out(&email, date, &punch_out)).await
    }
}
