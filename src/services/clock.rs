use chrono::{DateTime, NaiveDate, Utc};

/// Fuente de tiempo inyectable
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Fecha de hoy en UTC (la que usa el selector de fecha)
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Reloj detenido, para tests deterministas
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
