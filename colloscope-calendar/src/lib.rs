pub use education::{parse_records, VacationCalendar, DEFAULT_ENDPOINT};

pub mod education;
