use crate::{
    core::dashboard::SelectedLocation,
    input::events::DashboardEvent,
    layers::active::ActiveLayer,
    prelude::{HashMap, VecDeque},
};

/// User input the dashboard understands
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// A location picked by city search or geolocation
    SelectLocation(SelectedLocation),
    SetActiveLayer(ActiveLayer),
    /// Upstream connectivity flag; false pauses polling
    SetConnected(bool),
    ZoomIn,
    ZoomOut,
    ResetView,
    RequestFullscreen,
    /// Stop the driver and tear the dashboard down
    Shutdown,
}

/// Event listener callback type
pub type EventCallback = Box<dyn Fn(&DashboardEvent) + Send + Sync>;

/// Event management system for the dashboard
#[derive(Default)]
pub struct EventManager {
    /// Event listeners by event kind
    listeners: HashMap<String, Vec<EventCallback>>,
    /// Event queue for processing
    event_queue: VecDeque<DashboardEvent>,
}

impl EventManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an event listener
    pub fn on<F>(&mut self, event_kind: &str, callback: F)
    where
        F: Fn(&DashboardEvent) + Send + Sync + 'static,
    {
        self.listeners
            .entry(event_kind.to_string())
            .or_default()
            .push(Box::new(callback));
    }

    /// Emit an event to the queue
    pub fn emit(&mut self, event: DashboardEvent) {
        self.event_queue.push_back(event);
    }

    /// Process all queued events
    pub fn process_events(&mut self) -> Vec<DashboardEvent> {
        let events: Vec<_> = self.event_queue.drain(..).collect();

        for event in &events {
            if let Some(callbacks) = self.listeners.get(event.kind()) {
                for callback in callbacks {
                    callback(event);
                }
            }
        }

        events
    }

    /// Get number of pending events
    pub fn pending_events(&self) -> usize {
        self.event_queue.len()
    }
}

impl std::fmt::Debug for EventManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventManager")
            .field("listeners", &self.listeners.len())
            .field("pending", &self.event_queue.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    #[test]
    fn test_listeners_receive_matching_kind() {
        let mut manager = EventManager::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        manager.on("layerchanged", move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        manager.emit(DashboardEvent::LayerChanged {
            from: ActiveLayer::Lightning,
            to: ActiveLayer::Radar,
        });
        manager.emit(DashboardEvent::SurfaceReady);
        assert_eq!(manager.pending_events(), 2);

        let events = manager.process_events();
        assert_eq!(events.len(), 2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(manager.pending_events(), 0);
    }
}
