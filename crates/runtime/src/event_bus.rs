use crate::frame::Frame;

#[derive(Debug, Clone, PartialEq)]
pub struct Stamped<E> {
    pub frame_index: u64,
    pub event: E,
}

type Listener<E> = Box<dyn FnMut(&E)>;

/// Push-style event queue.
///
/// Listeners see each event synchronously as it is emitted; the event is
/// also queued until the host drains it.
pub struct EventBus<E> {
    events: Vec<Stamped<E>>,
    listeners: Vec<Listener<E>>,
}

impl<E> Default for EventBus<E> {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            listeners: Vec::new(),
        }
    }
}

impl<E: std::fmt::Debug> std::fmt::Debug for EventBus<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("events", &self.events)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl<E> EventBus<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&E) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn emit(&mut self, frame: Frame, event: E) {
        for listener in &mut self.listeners {
            listener(&event);
        }
        self.events.push(Stamped {
            frame_index: frame.index,
            event,
        });
    }

    pub fn events(&self) -> &[Stamped<E>] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<Stamped<E>> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::EventBus;
    use crate::frame::Frame;

    #[test]
    fn records_events_with_frame_index() {
        let mut bus = EventBus::new();
        bus.emit(Frame::new(2), "moved");
        assert_eq!(bus.events().len(), 1);
        assert_eq!(bus.events()[0].frame_index, 2);
        assert_eq!(bus.events()[0].event, "moved");
    }

    #[test]
    fn listeners_see_events_in_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let mut bus = EventBus::new();
        bus.subscribe(move |e: &u32| sink.borrow_mut().push(*e));
        bus.emit(Frame::default(), 1);
        bus.emit(Frame::default(), 2);
        assert_eq!(*seen.borrow(), vec![1, 2]);
    }

    #[test]
    fn drain_clears_queue() {
        let mut bus = EventBus::new();
        bus.emit(Frame::default(), ());
        assert_eq!(bus.drain().len(), 1);
        assert!(bus.events().is_empty());
    }
}
