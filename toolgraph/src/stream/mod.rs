//! Streaming types for graph runs.
//!
//! `CompiledStateGraph::stream` emits one event per selected mode after every node step.

use std::fmt::Debug;

/// Stream mode selector: which kinds of events to emit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StreamMode {
    /// Emit full state after each node completes.
    Values,
    /// Emit the node id together with the state after that node.
    Updates,
}

/// Streamed event emitted while running a graph.
#[derive(Clone, Debug)]
pub enum StreamEvent<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// Full state snapshot after a node finishes.
    Values(S),
    /// Node id and the state it produced.
    Updates { node_id: String, state: S },
}

impl<S> StreamEvent<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    /// State carried by either variant.
    pub fn state(&self) -> &S {
        match self {
            StreamEvent::Values(s) | StreamEvent::Updates { state: s, .. } => s,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct DummyState(i32);

    /// **Scenario**: StreamEvent variants carry expected data.
    #[test]
    fn stream_event_variants_hold_data() {
        let values = StreamEvent::Values(DummyState(1));
        assert_eq!(values.state(), &DummyState(1));

        let updates = StreamEvent::Updates {
            node_id: "n1".into(),
            state: DummyState(2),
        };
        match &updates {
            StreamEvent::Updates { node_id, .. } => assert_eq!(node_id, "n1"),
            _ => panic!("expected Updates variant"),
        }
        assert_eq!(updates.state(), &DummyState(2));
    }
}
