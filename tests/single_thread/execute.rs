//! Single-threaded generic protocol execution
use herb::{
    beacon::{MsgOut, Node, Status, StepOutput},
    collections::TypedUsize,
};
use std::collections::VecDeque;

/// (from, to, bytes) deliveries awaiting dispatch, pairwise FIFO
pub type Queue = VecDeque<(usize, usize, Vec<u8>)>;

/// Start every node, then deliver messages until the queue runs dry.
/// Panics unless every node reaches the terminal state.
pub fn execute_until_done(nodes: &mut [Node]) {
    let node_count = nodes.len();
    let mut queue = Queue::new();

    for from in 0..node_count {
        let step = nodes[from].start().expect("start failure");
        enqueue(&mut queue, from, node_count, step);
    }
    while let Some((from, to, bytes)) = queue.pop_front() {
        let step = nodes[to]
            .msg_in(TypedUsize::from_usize(from), &bytes)
            .expect("msg_in failure");
        enqueue(&mut queue, to, node_count, step);
    }

    for (index, node) in nodes.iter().enumerate() {
        assert_eq!(node.status(), Status::Done, "node {} is not done", index);
    }
}

pub fn enqueue(queue: &mut Queue, from: usize, node_count: usize, step: StepOutput) {
    for msg_out in step.msgs_out {
        match msg_out {
            MsgOut::Bcast { bytes } => {
                for to in (0..node_count).filter(|&to| to != from) {
                    queue.push_back((from, to, bytes.clone()));
                }
            }
            MsgOut::P2p { to, bytes } => queue.push_back((from, to.as_usize(), bytes)),
        }
    }
}
