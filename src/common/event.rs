use chrono::{DateTime, Utc};

pub trait DomainEvent: Clone {
    fn event_type(&self) -> &'static str;
    fn aggregate_id(&self) -> &str;
    /// Simulation tick the event happened on.
    fn tick(&self) -> u64;
    fn occurred_at(&self) -> DateTime<Utc>;
}
