//! Image load results on their way from the browser to the engine.
//!
//! A result that arrives while the engine is borrowed is parked in a
//! `ReportQueue` and delivered on the next entry into the engine, so no
//! ticket is ever lost.

use flappy_engine::{Engine, EngineResult, ImageInfo, LoadTicket};

/// One host report for a load ticket.
#[derive(Debug, Clone, PartialEq)]
pub enum HostReport {
    Loaded(LoadTicket, ImageInfo),
    Failed(LoadTicket, String),
}

impl HostReport {
    pub fn ticket(&self) -> LoadTicket {
        match self {
            HostReport::Loaded(ticket, _) | HostReport::Failed(ticket, _) => *ticket,
        }
    }

    pub fn apply(&self, engine: &mut Engine) -> EngineResult<()> {
        match self {
            HostReport::Loaded(ticket, info) => engine.asset_loaded(*ticket, *info),
            HostReport::Failed(ticket, reason) => engine.asset_failed(*ticket, reason),
        }
    }
}

/// Reports waiting for the engine, oldest first.
#[derive(Debug, Default)]
pub struct ReportQueue {
    reports: Vec<HostReport>,
}

impl ReportQueue {
    pub fn defer(&mut self, report: HostReport) {
        log::error!("Engine busy; deferring report for load {}", report.ticket());
        self.reports.push(report);
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Deliver every parked report. Returns how many were delivered.
    pub fn flush(self, engine: &mut Engine) -> usize {
        for report in &self.reports {
            if let Err(err) = report.apply(engine) {
                log::error!("{}", err);
            }
        }
        self.reports.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flappy_engine::{AssetDescriptor, EngineConfig, LoadRequest};

    fn engine_with_two_loads() -> (Engine, Vec<LoadTicket>) {
        let (mut engine, _) = Engine::headless(EngineConfig::default());
        let tickets = engine
            .load_assets(
                LoadRequest::new()
                    .with_asset(AssetDescriptor::new("bg.png").named("background"))
                    .with_asset(AssetDescriptor::new("bird.png").named("bird")),
            )
            .unwrap();
        engine.take_pending_loads();
        (engine, tickets)
    }

    #[test]
    fn deferred_reports_reach_the_engine_in_order() {
        let (mut engine, tickets) = engine_with_two_loads();
        let mut queue = ReportQueue::default();
        queue.defer(HostReport::Failed(tickets[1], "busy".into()));
        queue.defer(HostReport::Loaded(tickets[0], ImageInfo::new(288, 512)));
        assert_eq!(queue.len(), 2);
        assert!(!engine.is_ready());

        assert_eq!(queue.flush(&mut engine), 2);
        assert!(engine.assets().get("background").is_some());
        assert_eq!(engine.loader().failures().count(), 1);

        engine.retry_load(tickets[1]);
        let mut queue = ReportQueue::default();
        queue.defer(HostReport::Loaded(tickets[1], ImageInfo::new(34, 24)));
        queue.flush(&mut engine);
        assert!(engine.is_ready());
    }

    #[test]
    fn stale_report_does_not_stop_the_flush() {
        let (mut engine, tickets) = engine_with_two_loads();
        let mut queue = ReportQueue::default();
        queue.defer(HostReport::Loaded(LoadTicket(99), ImageInfo::new(1, 1)));
        queue.defer(HostReport::Loaded(tickets[0], ImageInfo::new(1, 1)));
        queue.defer(HostReport::Loaded(tickets[1], ImageInfo::new(1, 1)));
        assert_eq!(queue.flush(&mut engine), 3);
        assert!(engine.is_ready());
        assert_eq!(engine.assets().entity_count(), 2);
    }
}
