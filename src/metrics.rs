use std::collections::BTreeMap;
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Metric {
    Count,
    Create,
    Save,
    Delete,
}

impl Metric {
    pub const ALL: [Metric; 4] = [Metric::Count, Metric::Create, Metric::Save, Metric::Delete];

    /// Key used by the actuator JSON view.
    pub fn name(&self) -> &'static str {
        match self {
            Metric::Count => "counter.count",
            Metric::Create => "counter.create",
            Metric::Save => "counter.save",
            Metric::Delete => "counter.delete",
        }
    }

    fn prometheus_name(&self) -> &'static str {
        match self {
            Metric::Count => "reservations_count",
            Metric::Create => "reservations_create_total",
            Metric::Save => "reservations_save_total",
            Metric::Delete => "reservations_delete_total",
        }
    }

    fn help(&self) -> &'static str {
        match self {
            Metric::Count => "Reservations created minus reservations removed",
            Metric::Create => "Reservations created through the hypermedia surface",
            Metric::Save => "Reservations updated through the hypermedia surface",
            Metric::Delete => "Reservations removed",
        }
    }
}

/// Process-wide reservation counters, registered in their own prometheus registry.
#[derive(Clone)]
pub struct CounterService {
    registry: Registry,
    count: IntGauge,
    create: IntCounter,
    save: IntCounter,
    delete: IntCounter,
}

impl CounterService {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let count = IntGauge::new(Metric::Count.prometheus_name(), Metric::Count.help())?;
        registry.register(Box::new(count.clone()))?;
        let counter = |metric: Metric| -> prometheus::Result<IntCounter> {
            let counter = IntCounter::new(metric.prometheus_name(), metric.help())?;
            registry.register(Box::new(counter.clone()))?;
            Ok(counter)
        };
        let create = counter(Metric::Create)?;
        let save = counter(Metric::Save)?;
        let delete = counter(Metric::Delete)?;

        Ok(Self {
            registry,
            count,
            create,
            save,
            delete,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn increment(&self, metric: Metric) {
        match metric {
            Metric::Count => self.count.inc(),
            Metric::Create => self.create.inc(),
            Metric::Save => self.save.inc(),
            Metric::Delete => self.delete.inc(),
        }
    }

    /// Only the live count goes down; the others are monotonic counters.
    pub fn decrement_count(&self) {
        self.count.dec();
    }

    pub fn get(&self, metric: Metric) -> i64 {
        match metric {
            Metric::Count => self.count.get(),
            Metric::Create => self.create.get() as i64,
            Metric::Save => self.save.get() as i64,
            Metric::Delete => self.delete.get() as i64,
        }
    }

    pub fn snapshot(&self) -> BTreeMap<&'static str, i64> {
        Metric::ALL
            .iter()
            .map(|metric| (metric.name(), self.get(*metric)))
            .collect()
    }

    /// Prometheus text exposition of every registered metric.
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }
}
