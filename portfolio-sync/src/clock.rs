use chrono::DateTime;
use chrono::Utc;

/// Source of the current time, replaceable in tests.
#[derive(Default)]
pub struct Clock;

#[mockall::automock]
impl Clock {
    pub fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
