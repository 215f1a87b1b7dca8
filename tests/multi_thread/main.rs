use herb::{
    beacon::{new_node, BeaconConfig, Node, SecretSeedKey, Status},
    collections::TypedUsize,
};
use num_bigint_dig::BigUint;
use rand::RngCore;
use std::{convert::TryFrom, sync::mpsc, thread};

mod party;
use party::Router;

fn set_up_logs() {
    // set up an event subscriber for logs
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn spawn_and_collect(
    threshold: usize,
    node_count: usize,
    safe_prime: u64,
    round_max: u64,
) -> Vec<Node> {
    let nodes: Vec<Node> = (0..node_count)
        .map(|index| {
            let config = BeaconConfig::new(
                threshold,
                node_count,
                BigUint::from(safe_prime),
                round_max,
                false,
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
        .collect();

    let (router, receivers) = Router::new(node_count);
    let (result_sender, result_receiver) = mpsc::channel();

    for (node, receiver) in nodes.into_iter().zip(receivers.into_iter()) {
        let router = router.clone();
        let result_sender = result_sender.clone();
        thread::spawn(move || result_sender.send(party::execute_node(node, receiver, router)));
    }

    drop(result_sender); // so that result_receiver can close

    let results: Vec<Node> = result_receiver.into_iter().collect();
    assert_eq!(results.len(), node_count);
    results
}

#[test]
fn dkg_only() {
    set_up_logs();
    let results = spawn_and_collect(6, 10, 1019, 0);

    let h = results[0].key_share().expect("no key share").group().h().clone();
    for node in results.iter() {
        assert_eq!(node.status(), Status::Done);
        assert_eq!(node.key_share().expect("no key share").group().h(), &h);
        assert!(node.outputs().is_empty());
    }
}

#[test]
fn beacon_rounds() {
    set_up_logs();
    let round_max = 10u64;
    let results = spawn_and_collect(3, 5, 100043, round_max);

    let h = results[0].key_share().expect("no key share").group().h().clone();
    for node in results.iter() {
        assert_eq!(node.status(), Status::Done);
        assert_eq!(node.key_share().expect("no key share").group().h(), &h);
        assert_eq!(node.outputs().len() as u64, round_max);
    }

    // agreement on every round output, whatever order the nodes finished in
    for round in 0..round_max as usize {
        let value = results[0].outputs()[round].value();
        for node in results.iter() {
            assert_eq!(node.outputs()[round].round(), round as u64 + 1);
            assert_eq!(node.outputs()[round].value(), value);
        }
    }
}
