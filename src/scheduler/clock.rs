use chrono::{DateTime, Local};

/// Source of the current local time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

#[cfg(test)]
pub mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::TimeDelta;

    use super::*;

    /// Clock that only moves when told to.
    #[derive(Clone)]
    pub struct ManualClock(Arc<Mutex<DateTime<Local>>>);

    impl ManualClock {
        pub fn new(now: DateTime<Local>) -> Self {
            Self(Arc::new(Mutex::new(now)))
        }

        pub fn set(&self, now: DateTime<Local>) {
            *self.0.lock().unwrap() = now;
        }

        pub fn advance(&self, by: TimeDelta) {
            *self.0.lock().unwrap() += by;
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Local> {
            *self.0.lock().unwrap()
        }
    }
}
