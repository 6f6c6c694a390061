//! Randomized interleavings of mount/unmount/send/restart/read must keep a
//! binding behaviorally equivalent to a trivial reference model, never
//! double-unsubscribe, and never leave a cache entry while unobserved.

use proptest::prelude::*;

use statom::{ActorHandle, ActorLogic, BindError, Command, MachineBinding, SnapshotBridge, Source};
use statom_harness::{TestGraph, TestHandle, TestLogic};

#[derive(Clone, Copy, Debug)]
struct Inc;

fn counter() -> TestLogic<i32, Inc> {
    TestLogic::new(0, |s, _| s + 1)
}

#[derive(Clone, Copy, Debug)]
enum Op {
    Mount,
    Unmount,
    Send,
    Restart,
    Read,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Mount),
        Just(Op::Unmount),
        Just(Op::Send),
        Just(Op::Restart),
        Just(Op::Read),
    ]
}

proptest! {
    /// The binding tracks a reference model: `constructed` flips on
    /// reads/mounts and clears on restart/unmount, and the observable value
    /// is exactly the number of increments since the last construction.
    #[test]
    fn machine_binding_matches_reference_model(
        ops in proptest::collection::vec(op_strategy(), 0..60)
    ) {
        let graph = TestGraph::new();
        let binding = MachineBinding::new(Source::value(counter()));

        let mut mounted = false;
        let mut constructed = false;
        let mut value = 0i32;

        for op in ops {
            match op {
                Op::Mount => {
                    // Graphs only mount on the 0 -> 1 observer edge.
                    if !mounted {
                        binding.mount(&graph).unwrap();
                        mounted = true;
                        if !constructed {
                            constructed = true;
                            value = 0;
                        }
                    }
                }
                Op::Unmount => {
                    binding.unmount();
                    if mounted {
                        mounted = false;
                        // Last-observer departure disposes the owned actor.
                        constructed = false;
                    }
                }
                Op::Send => {
                    if constructed {
                        binding.write(Command::Event(Inc)).unwrap();
                        value += 1;
                    } else {
                        prop_assert_eq!(
                            binding.write(Command::Event(Inc)),
                            Err(BindError::NotInitialized)
                        );
                    }
                }
                Op::Restart => {
                    if constructed {
                        binding.write(Command::Restart).unwrap();
                        constructed = false;
                    } else {
                        prop_assert_eq!(
                            binding.write(Command::Restart),
                            Err(BindError::NotInitialized)
                        );
                    }
                }
                Op::Read => {
                    let read = binding.read(&graph).unwrap();
                    if !constructed {
                        constructed = true;
                        value = 0;
                    }
                    prop_assert_eq!(read, value);
                }
            }

            prop_assert_eq!(binding.is_observed(), mounted);
            if let Some(handle) = binding.actor().peek() {
                // At most one live subscription, ever.
                prop_assert!(handle.subscriber_count() <= 1);
            }
        }
    }

    /// The snapshot bridge always reads the actor's latest state, observed
    /// or not, and carries cache and subscription only while observed and
    /// attached.
    #[test]
    fn snapshot_bridge_tracks_latest_state(
        ops in proptest::collection::vec(0u8..5, 0..60)
    ) {
        let graph = TestGraph::new();
        let handle = counter().spawn();
        handle.start();
        let bridge = SnapshotBridge::<TestHandle<i32, Inc>, TestGraph>::of_handle(handle.clone());

        let mut observed = false;
        let mut pushed = 0i32;

        for op in ops {
            match op {
                0 => {
                    if !observed {
                        bridge.mount(&graph).unwrap();
                        observed = true;
                    }
                }
                1 => {
                    bridge.unmount();
                    observed = false;
                }
                2 => {
                    pushed += 1;
                    handle.push(pushed);
                }
                3 => {
                    prop_assert_eq!(bridge.read(&graph).unwrap(), pushed);
                }
                _ => {
                    // Detach mid-observation; the next read re-attaches.
                    bridge.detach();
                }
            }

            if !observed {
                prop_assert!(!bridge.has_cached());
                prop_assert!(!bridge.is_attached());
            }
            prop_assert!(handle.subscriber_count() <= 1);
        }

        // Whatever the interleaving, a final read sees the latest state.
        prop_assert_eq!(bridge.read(&graph).unwrap(), pushed);
    }
}
