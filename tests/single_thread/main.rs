use herb::{
    beacon::{new_node, BeaconConfig, Node, SecretSeedKey, Status},
    collections::TypedUsize,
};
use num_bigint_dig::BigUint;
use num_traits::One;
use rand::RngCore;
use std::convert::TryFrom;
use tracing_test::traced_test; // enable logs in tests

mod execute;

fn new_nodes(
    threshold: usize,
    node_count: usize,
    safe_prime: u64,
    round_max: u64,
    replier_index: Option<usize>,
) -> Vec<Node> {
    (0..node_count)
        .map(|index| {
            let config = BeaconConfig::new(
                threshold,
                node_count,
                BigUint::from(safe_prime),
                round_max,
                replier_index == Some(index),
            )
            .expect("config failure");

            let mut seed = [0u8; 64];
            rand::thread_rng().fill_bytes(&mut seed);
            let seed_key = SecretSeedKey::try_from(&seed[..]).expect("seed key failure");

            new_node(
                config,
                TypedUsize::from_usize(index),
                &seed_key,
                b"integration-session",
            )
            .expect("new_node failure")
        })
        .collect()
}

#[test]
#[traced_test]
fn dkg_only_ten_nodes() {
    // t = 6, n = 10, p = 1019, no beacon rounds: every node exits key
    // generation with the same group key and an empty output log
    let mut nodes = new_nodes(6, 10, 1019, 0, None);
    execute::execute_until_done(&mut nodes);

    let h = nodes[0].key_share().expect("no key share").group().h().clone();
    let p = BigUint::from(1019u64);
    for node in nodes.iter() {
        let key_share = node.key_share().expect("no key share");
        assert_eq!(key_share.group().h(), &h);
        assert!(node.outputs().is_empty());

        // the public-key shares multiply out to the group key
        let product = key_share
            .group()
            .pk_shares()
            .iter()
            .fold(BigUint::one(), |acc, (_, pk_share)| acc * pk_share % &p);
        assert_eq!(product, h);
    }
}

// no `traced_test` here: capturing a hundred rounds of debug logs dwarfs
// the protocol work itself
#[test]
fn hundred_rounds_with_replier() {
    // t = 6, n = 10, p = 100043, 100 rounds, node 0 designated replier
    let round_max = 100u64;
    let mut nodes = new_nodes(6, 10, 100043, round_max, Some(0));
    execute::execute_until_done(&mut nodes);

    // the replier reports exactly 100 (round, output) pairs with rounds
    // strictly increasing and every output in [0, p)
    let replier = nodes.iter().find(|node| node.is_replier()).expect("no replier");
    let outputs = replier.outputs();
    assert_eq!(outputs.len() as u64, round_max);
    let p = BigUint::from(100043u64);
    let mut prev_round = 0u64;
    for output in outputs.iter() {
        assert!(output.round() > prev_round);
        prev_round = output.round();
        assert!(output.value() < &p);
    }
    assert_eq!(prev_round, round_max);

    // agreement: every node derives the identical value in every round
    for node in nodes.iter() {
        assert_eq!(node.outputs(), outputs);
    }
}

#[test]
#[traced_test]
fn out_of_order_delivery() {
    // Withhold every message to one node from the moment it enters round 1,
    // then replay the backlog newest-first: round-2 traffic lands before the
    // round-1 traffic it depends on. The node must bucket the early messages
    // by round and drain both rounds once the backlog arrives.
    let (t, n, round_max) = (2, 3, 2u64);
    let mut nodes = new_nodes(t, n, 1019, round_max, None);

    let mut queue = execute::Queue::new();
    for from in 0..n {
        let step = nodes[from].start().expect("start failure");
        execute::enqueue(&mut queue, from, n, step);
    }

    let mut held = Vec::new();
    while let Some((from, to, bytes)) = queue.pop_front() {
        if to == 0 && nodes[0].round_current() >= 1 {
            held.push((from, to, bytes));
            continue;
        }
        let step = nodes[to]
            .msg_in(TypedUsize::from_usize(from), &bytes)
            .expect("msg_in failure");
        execute::enqueue(&mut queue, to, n, step);
    }

    // the cut-off node is still in round 1; its peers finished round 1 and
    // are stuck in round 2 waiting for its ciphertext
    assert_eq!(nodes[0].round_current(), 1);
    assert!(nodes[0].outputs().is_empty());
    for node in nodes.iter().skip(1) {
        assert_eq!(node.round_current(), 2);
        assert_eq!(node.outputs().len(), 1);
    }

    // replay the backlog in reverse round order
    for delivery in held.into_iter().rev() {
        queue.push_back(delivery);
    }
    while let Some((from, to, bytes)) = queue.pop_front() {
        let step = nodes[to]
            .msg_in(TypedUsize::from_usize(from), &bytes)
            .expect("msg_in failure");
        execute::enqueue(&mut queue, to, n, step);
    }

    for node in nodes.iter() {
        assert_eq!(node.status(), Status::Done);
        assert_eq!(node.outputs(), nodes[0].outputs());
        assert_eq!(node.outputs().len() as u64, round_max);
    }
}
