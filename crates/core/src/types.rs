/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Calendar dates (hire dates, due dates, payroll periods) carry no time zone.
pub type Date = chrono::NaiveDate;

/// Monetary amounts and quantities. Stored as `NUMERIC(14,2)`.
pub type Money = rust_decimal::Decimal;
