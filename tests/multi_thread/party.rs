use herb::{
    beacon::{MsgOut, Node, Status},
    collections::TypedUsize,
};
use std::sync::mpsc::{self, Receiver, Sender};

/// (from, bytes) as tagged by the transport
pub type Delivery = (usize, Vec<u8>);

/// Point-to-point channels with pairwise FIFO delivery
#[derive(Clone)]
pub struct Router {
    senders: Vec<Sender<Delivery>>,
}

impl Router {
    pub fn new(node_count: usize) -> (Self, Vec<Receiver<Delivery>>) {
        // can't build two vecs from one iterator
        // so we need to do it the old-fashioned way
        let mut senders = Vec::with_capacity(node_count);
        let mut receivers = Vec::with_capacity(node_count);
        for _ in 0..node_count {
            let (sender, receiver) = mpsc::channel();
            senders.push(sender);
            receivers.push(receiver);
        }
        (Self { senders }, receivers)
    }

    /// Deliver one outgoing message. Peers that already terminated have
    /// dropped their mailbox; sends to them are silently skipped.
    pub fn send(&self, from: usize, msg_out: MsgOut) {
        match msg_out {
            MsgOut::Bcast { bytes } => {
                for (to, sender) in self.senders.iter().enumerate() {
                    if to != from {
                        let _ = sender.send((from, bytes.clone()));
                    }
                }
            }
            MsgOut::P2p { to, bytes } => {
                let _ = self.senders[to.as_usize()].send((from, bytes));
            }
        }
    }
}

/// One node's event loop: start, then dequeue the mailbox until done
pub fn execute_node(mut node: Node, mailbox: Receiver<Delivery>, router: Router) -> Node {
    let my_id = node.my_id().as_usize();

    let step = node.start().expect("start failure");
    for msg_out in step.msgs_out {
        router.send(my_id, msg_out);
    }

    while node.status() == Status::InProgress {
        let (from, bytes) = mailbox.recv().expect("recv failure");
        let step = node
            .msg_in(TypedUsize::from_usize(from), &bytes)
            .expect("msg_in failure");
        for msg_out in step.msgs_out {
            router.send(my_id, msg_out);
        }
    }
    node
}
